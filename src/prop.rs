//! Property descriptors: the binding between PLY properties and record
//! fields.
//!
//! A [`PropertyDescriptor`] says which PLY property feeds which field of a
//! record, which type the property has on disk and which type the field has
//! in memory. Records expose their fields through the [`Element`] trait using
//! a small `Field` token (e.g. [`VertexField::Color`]`(0)`) instead of byte
//! offsets. Reader and writer only ever talk to records through that trait,
//! so one implementation works for all record types.
//!
//! The built-in tables for all vertex kinds, faces and grids live in a
//! process-wide registry that is built (and validated) on first use.

use std::fmt;

use fxhash::FxHashMap;
use log::debug;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::{
    cast,
    io::{Error, PrimitiveType, PrimitiveValue, ply::raw::PropertyType},
    mesh::{Face, GridRow},
    vertex::{
        Color2dVertex, ColorVertex, OrientedColorVertex, OrientedVertex, Point2dVertex,
        PointVertex, ValueVertex, Vertex,
    },
};


#[cfg(test)]
mod tests;


// ===========================================================================
// ===== Descriptors and values
// ===========================================================================

/// Meta data of a list property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMeta {
    /// The type the length of the list is stored as on disk. Always an
    /// unsigned integer type.
    pub len_type: PrimitiveType,
}

/// Describes how one PLY property maps to one field of a record.
///
/// `F` is the field token type of the record, see [`Element::Field`].
/// Several descriptors can point to the same field under different names
/// (aliases).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDescriptor<F> {
    /// The property name in the PLY header.
    pub name: &'static str,

    /// The type of the property on disk. When reading, the type that is
    /// actually found in the file takes precedence.
    pub disk_type: PrimitiveType,

    /// The type of the field in memory.
    pub mem_type: PrimitiveType,

    pub field: F,

    /// `Some` if this is a list property.
    pub list: Option<ListMeta>,
}

impl<F> PropertyDescriptor<F> {
    pub fn scalar(
        name: &'static str,
        disk_type: PrimitiveType,
        mem_type: PrimitiveType,
        field: F,
    ) -> Self {
        Self { name, disk_type, mem_type, field, list: None }
    }

    pub fn list(
        name: &'static str,
        len_type: PrimitiveType,
        disk_type: PrimitiveType,
        mem_type: PrimitiveType,
        field: F,
    ) -> Self {
        Self {
            name,
            disk_type,
            mem_type,
            field,
            list: Some(ListMeta { len_type }),
        }
    }

    pub fn is_list(&self) -> bool {
        self.list.is_some()
    }

    /// The on-disk type as written into a header.
    pub fn property_type(&self) -> PropertyType {
        match self.list {
            None => PropertyType::Scalar(self.disk_type),
            Some(meta) => PropertyType::List {
                len_type: meta.len_type,
                scalar_type: self.disk_type,
            },
        }
    }
}

/// A dynamically typed field value.
///
/// Four entries are stored inline, which covers triangles and quads.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(PrimitiveValue),
    List(SmallVec<[PrimitiveValue; 4]>),
}

impl Value {
    /// Converts the value (or every entry of the list) to `to`, see
    /// [`cast::convert`].
    pub fn coerce(self, to: PrimitiveType) -> Value {
        match self {
            Value::Scalar(v) => Value::Scalar(cast::convert(v, to)),
            Value::List(mut list) => {
                for v in &mut list {
                    *v = cast::convert(*v, to);
                }
                Value::List(list)
            }
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            Value::Scalar(_) => false,
            Value::List(_) => true,
        }
    }
}

/// The shape and in-memory type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Scalar(PrimitiveType),

    /// A list; the type is the one of the entries.
    List(PrimitiveType),
}

impl FieldShape {
    pub fn mem_type(&self) -> PrimitiveType {
        match *self {
            FieldShape::Scalar(ty) | FieldShape::List(ty) => ty,
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            FieldShape::Scalar(_) => false,
            FieldShape::List(_) => true,
        }
    }
}

/// A record that can be read from or written to a PLY element.
///
/// Records are created with `Default` and then filled field by field. Fields
/// that are not present in a file keep their default value.
pub trait Element: Default {
    /// Token addressing one field of the record.
    type Field: Copy + fmt::Debug + PartialEq;

    /// Returns the shape of `field`, or `None` if this record type does not
    /// have such a field.
    fn field_shape(field: Self::Field) -> Option<FieldShape>;

    /// Returns the current value of `field` (in its in-memory type).
    fn field(&self, field: Self::Field) -> Option<Value>;

    /// Stores `value` in `field`. `value` already has to have the in-memory
    /// type of the field; no conversion is done here.
    fn set_field(&mut self, field: Self::Field, value: Value) -> Result<(), Error>;
}

/// Field tokens of all vertex records. Components are numbered from 0
/// (`x`/`red`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexField {
    Position(u8),
    Normal(u8),
    Color(u8),
    Value,
}

/// The only field of [`Face`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceField {
    VertexIndices,
}

/// The only field of [`GridRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridField {
    VertexIndices,
}

/// The seven vertex record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    Point,
    Point2d,
    PointWithScalar,
    PointWithNormal,
    PointWithColor,
    PointWithColor2d,
    PointWithNormalAndColor,
}

impl VertexKind {
    pub const ALL: [VertexKind; 7] = [
        VertexKind::Point,
        VertexKind::Point2d,
        VertexKind::PointWithScalar,
        VertexKind::PointWithNormal,
        VertexKind::PointWithColor,
        VertexKind::PointWithColor2d,
        VertexKind::PointWithNormalAndColor,
    ];

    /// Number of position components: 2 or 3.
    pub fn dimension(&self) -> usize {
        match self {
            VertexKind::Point2d | VertexKind::PointWithColor2d => 2,
            _ => 3,
        }
    }

    pub fn has_value(&self) -> bool {
        *self == VertexKind::PointWithScalar
    }

    pub fn has_normal(&self) -> bool {
        match self {
            VertexKind::PointWithNormal | VertexKind::PointWithNormalAndColor => true,
            _ => false,
        }
    }

    pub fn has_color(&self) -> bool {
        match self {
            VertexKind::PointWithColor
            | VertexKind::PointWithColor2d
            | VertexKind::PointWithNormalAndColor => true,
            _ => false,
        }
    }
}


// ===========================================================================
// ===== Validation
// ===========================================================================

/// Checks that `table` can be used with records of type `E`.
///
/// Every descriptor has to address an existing field with the declared shape
/// and in-memory type, list descriptors need an unsigned count type, the
/// disk → memory conversion has to be supported and names have to be unique.
pub fn validate<E: Element>(table: &[PropertyDescriptor<E::Field>]) -> Result<(), Error> {
    let probe = E::default();

    for (i, d) in table.iter().enumerate() {
        if table[..i].iter().any(|other| other.name == d.name) {
            return Err(Error::invalid_descriptor(d.name, "name is used more than once"));
        }

        let shape = E::field_shape(d.field).ok_or_else(|| {
            Error::invalid_descriptor(d.name, format!("record has no field {:?}", d.field))
        })?;

        match (shape, d.list) {
            (FieldShape::Scalar(_), None) => {}
            (FieldShape::List(_), Some(meta)) => {
                cast::check_conversion(meta.len_type, PrimitiveType::Uint32, true)?;
            }
            (FieldShape::Scalar(_), Some(_)) => {
                return Err(Error::invalid_descriptor(d.name, "list descriptor for scalar field"));
            }
            (FieldShape::List(_), None) => {
                return Err(Error::invalid_descriptor(d.name, "scalar descriptor for list field"));
            }
        }

        if shape.mem_type() != d.mem_type {
            let msg = format!("field has type '{}', not '{}'", shape.mem_type(), d.mem_type);
            return Err(Error::invalid_descriptor(d.name, msg));
        }

        cast::check_conversion(d.disk_type, d.mem_type, false)?;

        match probe.field(d.field) {
            Some(ref v) if v.is_list() == shape.is_list() => {}
            _ => {
                let msg = format!("field {:?} does not resolve on a default record", d.field);
                return Err(Error::invalid_descriptor(d.name, msg));
            }
        }
    }

    Ok(())
}


// ===========================================================================
// ===== Registry
// ===========================================================================

/// The read and write table of one record type.
#[derive(Debug)]
struct Tables<F> {
    read: Vec<PropertyDescriptor<F>>,
    write: Vec<PropertyDescriptor<F>>,
}

#[derive(Debug)]
struct Registry {
    vertex: FxHashMap<(VertexKind, PrimitiveType), Tables<VertexField>>,
    face: Tables<FaceField>,
    grid: Tables<GridField>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::build);

impl Registry {
    fn build() -> Self {
        let mut vertex = FxHashMap::default();

        macro_rules! register {
            ($($ty:ident),*) => {
                $(
                    register::<$ty<f32>>(&mut vertex);
                    register::<$ty<f64>>(&mut vertex);
                )*
            }
        }

        register!(
            PointVertex,
            Point2dVertex,
            ValueVertex,
            OrientedVertex,
            ColorVertex,
            Color2dVertex,
            OrientedColorVertex
        );

        let face = face_tables();
        check::<Face>(&face, "face");
        let grid = grid_tables();
        check::<GridRow>(&grid, "grid");

        debug!("built property registry with {} vertex tables", vertex.len());

        Self { vertex, face, grid }
    }
}

fn register<V: Vertex>(
    map: &mut FxHashMap<(VertexKind, PrimitiveType), Tables<VertexField>>,
) {
    let precision = <V::Real as crate::io::Primitive>::TY;
    let tables = vertex_tables(V::KIND, precision);
    check::<V>(&tables, V::KIND);
    map.insert((V::KIND, precision), tables);
}

/// A broken built-in table is a bug in this crate, not a runtime condition.
fn check<E: Element>(tables: &Tables<E::Field>, what: impl fmt::Debug) {
    let res = validate::<E>(&tables.read).and_then(|_| validate::<E>(&tables.write));
    if let Err(e) = res {
        panic!("built-in property table for {:?} is invalid: {}", what, e);
    }
}

fn vertex_tables(kind: VertexKind, precision: PrimitiveType) -> Tables<VertexField> {
    let real = |name: &'static str, field: VertexField| {
        PropertyDescriptor::scalar(name, precision, precision, field)
    };
    let color = |name: &'static str, field: VertexField| {
        PropertyDescriptor::scalar(name, PrimitiveType::Uint8, precision, field)
    };

    let mut write = Vec::new();
    for (i, &name) in ["x", "y", "z"][..kind.dimension()].iter().enumerate() {
        write.push(real(name, VertexField::Position(i as u8)));
    }
    if kind.has_value() {
        write.push(real("value", VertexField::Value));
    }
    if kind.has_normal() {
        for (i, &name) in ["nx", "ny", "nz"].iter().enumerate() {
            write.push(real(name, VertexField::Normal(i as u8)));
        }
    }
    if kind.has_color() {
        for (i, &name) in ["red", "green", "blue"].iter().enumerate() {
            write.push(color(name, VertexField::Color(i as u8)));
        }
    }

    // Some exporters call the color channels `diffuse_*`. They are only
    // accepted, never written.
    let mut read = write.clone();
    if kind.has_color() {
        for (i, &name) in ["diffuse_red", "diffuse_green", "diffuse_blue"].iter().enumerate() {
            read.push(color(name, VertexField::Color(i as u8)));
        }
    }

    Tables { read, write }
}

fn face_tables() -> Tables<FaceField> {
    use PrimitiveType::{Int32, Uint32, Uint8};

    let indices = |name| PropertyDescriptor::list(name, Uint8, Int32, Uint32, FaceField::VertexIndices);
    Tables {
        read: vec![indices("vertex_indices"), indices("vertex_index")],
        write: vec![indices("vertex_indices")],
    }
}

fn grid_tables() -> Tables<GridField> {
    use PrimitiveType::{Int32, Uint32};

    let indices = PropertyDescriptor::list(
        "vertex_indices",
        Uint32,
        Int32,
        Int32,
        GridField::VertexIndices,
    );
    Tables {
        read: vec![indices],
        write: vec![indices],
    }
}

/// Returns the read table of the given vertex kind with the given in-memory
/// precision (`Float32` or `Float64`).
///
/// The read table can contain more names than the write table (aliases).
/// Returns `None` for any other precision.
pub fn describe_for_read(
    kind: VertexKind,
    precision: PrimitiveType,
) -> Option<&'static [PropertyDescriptor<VertexField>]> {
    REGISTRY.vertex.get(&(kind, precision)).map(|t| &t.read[..])
}

/// Returns the write table of the given vertex kind with the given in-memory
/// precision (`Float32` or `Float64`). Returns `None` for any other precision.
pub fn describe_for_write(
    kind: VertexKind,
    precision: PrimitiveType,
) -> Option<&'static [PropertyDescriptor<VertexField>]> {
    REGISTRY.vertex.get(&(kind, precision)).map(|t| &t.write[..])
}

/// `vertex_indices` and its alias `vertex_index`.
pub fn face_properties_for_read() -> &'static [PropertyDescriptor<FaceField>] {
    &REGISTRY.face.read
}

/// `vertex_indices` as `list uchar int`.
pub fn face_properties_for_write() -> &'static [PropertyDescriptor<FaceField>] {
    &REGISTRY.face.write
}

/// `vertex_indices` as `list uint int`.
pub fn grid_properties() -> &'static [PropertyDescriptor<GridField>] {
    &REGISTRY.grid.read
}
