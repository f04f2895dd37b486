use smallvec::smallvec;

use crate::{
    io::{Error, PrimitiveType, PrimitiveValue},
    mesh::Face,
    vertex::{ColorVertex, PointVertex},
};
use super::*;


fn names<F>(table: &[PropertyDescriptor<F>]) -> Vec<&'static str> {
    table.iter().map(|d| d.name).collect()
}

#[test]
fn table_sizes() {
    let expected = [
        (VertexKind::Point, 3, 3),
        (VertexKind::Point2d, 2, 2),
        (VertexKind::PointWithScalar, 4, 4),
        (VertexKind::PointWithNormal, 6, 6),
        (VertexKind::PointWithColor, 9, 6),
        (VertexKind::PointWithColor2d, 8, 5),
        (VertexKind::PointWithNormalAndColor, 12, 9),
    ];

    for &(kind, read, write) in &expected {
        for &precision in &[PrimitiveType::Float32, PrimitiveType::Float64] {
            assert_eq!(describe_for_read(kind, precision).unwrap().len(), read, "{:?}", kind);
            assert_eq!(describe_for_write(kind, precision).unwrap().len(), write, "{:?}", kind);
        }
    }
}

#[test]
fn unknown_precision() {
    assert!(describe_for_read(VertexKind::Point, PrimitiveType::Int32).is_none());
    assert!(describe_for_write(VertexKind::Point, PrimitiveType::Uint8).is_none());
}

#[test]
fn table_names_and_types() {
    let write = describe_for_write(VertexKind::PointWithNormalAndColor, PrimitiveType::Float64)
        .unwrap();
    assert_eq!(names(write), ["x", "y", "z", "nx", "ny", "nz", "red", "green", "blue"]);

    for d in write {
        assert!(!d.is_list());
        assert_eq!(d.mem_type, PrimitiveType::Float64);
        match d.field {
            VertexField::Color(_) => assert_eq!(d.disk_type, PrimitiveType::Uint8),
            _ => assert_eq!(d.disk_type, PrimitiveType::Float64),
        }
    }

    let value = describe_for_write(VertexKind::PointWithScalar, PrimitiveType::Float32).unwrap();
    assert_eq!(names(value), ["x", "y", "z", "value"]);
    assert_eq!(value[3].field, VertexField::Value);

    let flat = describe_for_write(VertexKind::PointWithColor2d, PrimitiveType::Float32).unwrap();
    assert_eq!(names(flat), ["x", "y", "red", "green", "blue"]);
}

#[test]
fn aliases_only_when_reading() {
    let read = describe_for_read(VertexKind::PointWithColor, PrimitiveType::Float32).unwrap();
    let write = describe_for_write(VertexKind::PointWithColor, PrimitiveType::Float32).unwrap();

    assert_eq!(&read[..6], write);
    assert_eq!(names(&read[6..]), ["diffuse_red", "diffuse_green", "diffuse_blue"]);
    assert_eq!(read[6].field, read[3].field);

    assert!(!names(write).iter().any(|n| n.starts_with("diffuse_")));
}

#[test]
fn topology_tables() {
    let read = face_properties_for_read();
    assert_eq!(names(read), ["vertex_indices", "vertex_index"]);
    assert!(read.iter().all(|d| d.field == FaceField::VertexIndices));

    let write = face_properties_for_write();
    assert_eq!(names(write), ["vertex_indices"]);
    assert_eq!(write[0].property_type().to_string(), "list uchar int");
    assert_eq!(write[0].mem_type, PrimitiveType::Uint32);

    let grid = grid_properties();
    assert_eq!(names(grid), ["vertex_indices"]);
    assert_eq!(grid[0].property_type().to_string(), "list uint int");
    assert_eq!(grid[0].mem_type, PrimitiveType::Int32);
}

#[test]
fn validate_accepts_custom_tables() {
    use PrimitiveType::{Float32, Float64, Int16};

    // Fewer fields, different disk types and reordering are all fine.
    let table = [
        PropertyDescriptor::scalar("z", Int16, Float32, VertexField::Position(2)),
        PropertyDescriptor::scalar("x", Float64, Float32, VertexField::Position(0)),
    ];
    assert!(validate::<PointVertex<f32>>(&table).is_ok());
}

#[test]
fn validate_rejects_broken_tables() {
    use PrimitiveType::{Float32, Float64, Int32, Uint32, Uint8};

    fn assert_invalid<E: Element>(table: &[PropertyDescriptor<E::Field>]) {
        match validate::<E>(table) {
            Err(Error::InvalidDescriptor { .. }) | Err(Error::UnsupportedConversion { .. }) => {}
            other => panic!("expected error for {:?}, got {:?}", table, other),
        }
    }

    // Duplicate name
    assert_invalid::<PointVertex<f32>>(&[
        PropertyDescriptor::scalar("x", Float32, Float32, VertexField::Position(0)),
        PropertyDescriptor::scalar("x", Float32, Float32, VertexField::Position(1)),
    ]);

    // Field that doesn't exist
    assert_invalid::<PointVertex<f32>>(&[
        PropertyDescriptor::scalar("nx", Float32, Float32, VertexField::Normal(0)),
    ]);
    assert_invalid::<PointVertex<f32>>(&[
        PropertyDescriptor::scalar("w", Float32, Float32, VertexField::Position(3)),
    ]);

    // Wrong in-memory type
    assert_invalid::<ColorVertex<f32>>(&[
        PropertyDescriptor::scalar("red", Uint8, Float64, VertexField::Color(0)),
    ]);

    // Shape mismatch
    assert_invalid::<PointVertex<f32>>(&[
        PropertyDescriptor::list("x", Uint8, Float32, Float32, VertexField::Position(0)),
    ]);
    assert_invalid::<Face>(&[
        PropertyDescriptor::scalar("vertex_indices", Int32, Uint32, FaceField::VertexIndices),
    ]);

    // Signed list length
    assert_invalid::<Face>(&[
        PropertyDescriptor::list("vertex_indices", Int32, Int32, Uint32, FaceField::VertexIndices),
    ]);
}

#[test]
fn coerce_values() {
    let v = Value::Scalar(PrimitiveValue::Uint8(200)).coerce(PrimitiveType::Float32);
    assert_eq!(v, Value::Scalar(PrimitiveValue::Float32(200.0)));

    let list = Value::List(smallvec![PrimitiveValue::Int32(1), PrimitiveValue::Int32(300)]);
    assert!(list.is_list());
    assert_eq!(
        list.coerce(PrimitiveType::Uint8),
        Value::List(smallvec![PrimitiveValue::Uint8(1), PrimitiveValue::Uint8(44)]),
    );
}

#[test]
fn field_shapes() {
    assert_eq!(
        PointVertex::<f64>::field_shape(VertexField::Position(1)),
        Some(FieldShape::Scalar(PrimitiveType::Float64)),
    );
    assert_eq!(PointVertex::<f64>::field_shape(VertexField::Value), None);
    assert_eq!(
        Face::field_shape(FaceField::VertexIndices),
        Some(FieldShape::List(PrimitiveType::Uint32)),
    );
    assert!(FieldShape::List(PrimitiveType::Int32).is_list());
}
