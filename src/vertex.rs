//! The seven vertex record shapes.
//!
//! All records are generic over their precision `R` (`f32` or `f64`) which is
//! used for every field in memory. Colors are stored as plain numbers as
//! well: a `uchar` channel of 255 becomes `255.0`, not `1.0`.
//!
//! Apart from reading and writing, records support the few value operations
//! needed for resampling: [`add`][Vertex::add], [`scale`][Vertex::scale] and
//! [`transform`][Vertex::transform].

use std::fmt;

use cgmath::{
    prelude::*,
    Matrix3, Matrix4, Point2, Point3, Vector3, Vector4,
};

use crate::{
    io::{Error, Primitive},
    math::Real,
    prop::{
        self, Element, FieldShape, PropertyDescriptor, Value, VertexField, VertexKind,
    },
};




/// A vertex record.
///
/// Fields are addressed by [`VertexField`] tokens. Every field of a record
/// is a scalar of type `Self::Real`.
pub trait Vertex: Element<Field = VertexField> + Copy + fmt::Debug + PartialEq {
    type Real: Real;

    /// `Point3` for 3D records, `Point2` for 2D records.
    type Position: Copy + fmt::Debug + PartialEq;

    const KIND: VertexKind;

    /// Creates a record at the given position with all other fields at their
    /// default (zero).
    fn from_position(position: Self::Position) -> Self;

    fn position(&self) -> Self::Position;

    /// Component-wise sum of all attributes.
    fn add(&self, other: &Self) -> Self;

    /// Multiplies all attributes with `s`.
    fn scale(&self, s: Self::Real) -> Self;

    /// Applies the homogeneous matrix `m` to the position (including the
    /// division by `w`). Normals are multiplied with the upper left 3×3 block
    /// of `m`. This is only correct for rotations and uniform scaling; the
    /// inverse transpose is *not* used. Scalar values and colors are not
    /// changed.
    ///
    /// 2D positions are treated as `(x, y, 0, 1)`.
    fn transform(&self, m: &Matrix4<Self::Real>) -> Self;

    /// Returns the field addressed by `field`, or `None` if this record does
    /// not have it.
    fn slot(&self, field: VertexField) -> Option<&Self::Real>;

    fn slot_mut(&mut self, field: VertexField) -> Option<&mut Self::Real>;

    /// The built-in read table for this record, including aliases.
    fn read_properties() -> &'static [PropertyDescriptor<VertexField>] {
        // The registry contains both precisions of all kinds and `Real` is
        // only implemented for `f32` and `f64`.
        prop::describe_for_read(Self::KIND, <Self::Real as Primitive>::TY).unwrap()
    }

    /// The built-in write table for this record.
    fn write_properties() -> &'static [PropertyDescriptor<VertexField>] {
        prop::describe_for_write(Self::KIND, <Self::Real as Primitive>::TY).unwrap()
    }
}


// ===========================================================================
// ===== Helpers
// ===========================================================================

fn at3<R>(v: &impl AsRef<[R; 3]>, i: u8) -> Option<&R> {
    v.as_ref().get(usize::from(i))
}

fn at3_mut<R>(v: &mut impl AsMut<[R; 3]>, i: u8) -> Option<&mut R> {
    v.as_mut().get_mut(usize::from(i))
}

fn at2<R>(v: &impl AsRef<[R; 2]>, i: u8) -> Option<&R> {
    v.as_ref().get(usize::from(i))
}

fn at2_mut<R>(v: &mut impl AsMut<[R; 2]>, i: u8) -> Option<&mut R> {
    v.as_mut().get_mut(usize::from(i))
}

fn add3<R: Real>(a: Point3<R>, b: Point3<R>) -> Point3<R> {
    Point3::from_vec(a.to_vec() + b.to_vec())
}

fn add2<R: Real>(a: Point2<R>, b: Point2<R>) -> Point2<R> {
    Point2::from_vec(a.to_vec() + b.to_vec())
}

fn transform_point3<R: Real>(p: Point3<R>, m: &Matrix4<R>) -> Point3<R> {
    Point3::from_homogeneous(m * p.to_homogeneous())
}

fn transform_point2<R: Real>(p: Point2<R>, m: &Matrix4<R>) -> Point2<R> {
    let v = m * Vector4::new(p.x, p.y, R::zero(), R::one());
    Point2::new(v.x / v.w, v.y / v.w)
}

fn transform_normal<R: Real>(n: Vector3<R>, m: &Matrix4<R>) -> Vector3<R> {
    let linear = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
    linear * n
}

fn origin3<R: Real>() -> Point3<R> {
    Point3::origin()
}

fn origin2<R: Real>() -> Point2<R> {
    Point2::origin()
}

/// Stores `value` in `slot`. Used by all `Element::set_field` impls below.
fn set_slot<R: Real>(slot: Option<&mut R>, field: VertexField, value: Value) -> Result<(), Error> {
    let slot = slot.ok_or_else(|| {
        Error::invalid_descriptor(&format!("{:?}", field), "record has no such field")
    })?;

    match value {
        Value::Scalar(v) => {
            *slot = R::from_primitive_value(v).ok_or(Error::UnsupportedConversion {
                from: v.ty(),
                to: R::TY,
            })?;
            Ok(())
        }
        Value::List(_) => {
            Err(Error::invalid_descriptor(&format!("{:?}", field), "expected a scalar value"))
        }
    }
}

macro_rules! impl_element {
    ($ty:ident) => {
        impl<R: Real> Element for $ty<R> {
            type Field = VertexField;

            fn field_shape(field: VertexField) -> Option<FieldShape> {
                Self::default().slot(field).map(|_| FieldShape::Scalar(R::TY))
            }

            fn field(&self, field: VertexField) -> Option<Value> {
                self.slot(field).map(|v| Value::Scalar(v.to_primitive_value()))
            }

            fn set_field(&mut self, field: VertexField, value: Value) -> Result<(), Error> {
                set_slot(self.slot_mut(field), field, value)
            }
        }
    }
}


// ===========================================================================
// ===== The records
// ===========================================================================

/// Only a 3D position (`x y z`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointVertex<R: Real> {
    pub position: Point3<R>,
}

impl<R: Real> Default for PointVertex<R> {
    fn default() -> Self {
        Self { position: origin3() }
    }
}

impl_element!(PointVertex);

impl<R: Real> Vertex for PointVertex<R> {
    type Real = R;
    type Position = Point3<R>;
    const KIND: VertexKind = VertexKind::Point;

    fn from_position(position: Point3<R>) -> Self {
        Self { position }
    }

    fn position(&self) -> Point3<R> {
        self.position
    }

    fn add(&self, other: &Self) -> Self {
        Self { position: add3(self.position, other.position) }
    }

    fn scale(&self, s: R) -> Self {
        Self { position: self.position * s }
    }

    fn transform(&self, m: &Matrix4<R>) -> Self {
        Self { position: transform_point3(self.position, m) }
    }

    fn slot(&self, field: VertexField) -> Option<&R> {
        match field {
            VertexField::Position(i) => at3(&self.position, i),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: VertexField) -> Option<&mut R> {
        match field {
            VertexField::Position(i) => at3_mut(&mut self.position, i),
            _ => None,
        }
    }
}


/// Only a 2D position (`x y`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2dVertex<R: Real> {
    pub position: Point2<R>,
}

impl<R: Real> Default for Point2dVertex<R> {
    fn default() -> Self {
        Self { position: origin2() }
    }
}

impl_element!(Point2dVertex);

impl<R: Real> Vertex for Point2dVertex<R> {
    type Real = R;
    type Position = Point2<R>;
    const KIND: VertexKind = VertexKind::Point2d;

    fn from_position(position: Point2<R>) -> Self {
        Self { position }
    }

    fn position(&self) -> Point2<R> {
        self.position
    }

    fn add(&self, other: &Self) -> Self {
        Self { position: add2(self.position, other.position) }
    }

    fn scale(&self, s: R) -> Self {
        Self { position: self.position * s }
    }

    fn transform(&self, m: &Matrix4<R>) -> Self {
        Self { position: transform_point2(self.position, m) }
    }

    fn slot(&self, field: VertexField) -> Option<&R> {
        match field {
            VertexField::Position(i) => at2(&self.position, i),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: VertexField) -> Option<&mut R> {
        match field {
            VertexField::Position(i) => at2_mut(&mut self.position, i),
            _ => None,
        }
    }
}


/// A 3D position with one scalar `value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueVertex<R: Real> {
    pub position: Point3<R>,
    pub value: R,
}

impl<R: Real> ValueVertex<R> {
    pub fn new(position: Point3<R>, value: R) -> Self {
        Self { position, value }
    }
}

impl<R: Real> Default for ValueVertex<R> {
    fn default() -> Self {
        Self::new(origin3(), R::zero())
    }
}

impl_element!(ValueVertex);

impl<R: Real> Vertex for ValueVertex<R> {
    type Real = R;
    type Position = Point3<R>;
    const KIND: VertexKind = VertexKind::PointWithScalar;

    fn from_position(position: Point3<R>) -> Self {
        Self::new(position, R::zero())
    }

    fn position(&self) -> Point3<R> {
        self.position
    }

    fn add(&self, other: &Self) -> Self {
        Self::new(add3(self.position, other.position), self.value + other.value)
    }

    fn scale(&self, s: R) -> Self {
        Self::new(self.position * s, self.value * s)
    }

    fn transform(&self, m: &Matrix4<R>) -> Self {
        Self::new(transform_point3(self.position, m), self.value)
    }

    fn slot(&self, field: VertexField) -> Option<&R> {
        match field {
            VertexField::Position(i) => at3(&self.position, i),
            VertexField::Value => Some(&self.value),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: VertexField) -> Option<&mut R> {
        match field {
            VertexField::Position(i) => at3_mut(&mut self.position, i),
            VertexField::Value => Some(&mut self.value),
            _ => None,
        }
    }
}


/// A 3D position with a normal (`nx ny nz`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedVertex<R: Real> {
    pub position: Point3<R>,
    pub normal: Vector3<R>,
}

impl<R: Real> OrientedVertex<R> {
    pub fn new(position: Point3<R>, normal: Vector3<R>) -> Self {
        Self { position, normal }
    }
}

impl<R: Real> Default for OrientedVertex<R> {
    fn default() -> Self {
        Self::new(origin3(), Vector3::zero())
    }
}

impl_element!(OrientedVertex);

impl<R: Real> Vertex for OrientedVertex<R> {
    type Real = R;
    type Position = Point3<R>;
    const KIND: VertexKind = VertexKind::PointWithNormal;

    fn from_position(position: Point3<R>) -> Self {
        Self::new(position, Vector3::zero())
    }

    fn position(&self) -> Point3<R> {
        self.position
    }

    fn add(&self, other: &Self) -> Self {
        Self::new(add3(self.position, other.position), self.normal + other.normal)
    }

    fn scale(&self, s: R) -> Self {
        Self::new(self.position * s, self.normal * s)
    }

    fn transform(&self, m: &Matrix4<R>) -> Self {
        Self::new(transform_point3(self.position, m), transform_normal(self.normal, m))
    }

    fn slot(&self, field: VertexField) -> Option<&R> {
        match field {
            VertexField::Position(i) => at3(&self.position, i),
            VertexField::Normal(i) => at3(&self.normal, i),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: VertexField) -> Option<&mut R> {
        match field {
            VertexField::Position(i) => at3_mut(&mut self.position, i),
            VertexField::Normal(i) => at3_mut(&mut self.normal, i),
            _ => None,
        }
    }
}


/// A 3D position with a color (`red green blue`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorVertex<R: Real> {
    pub position: Point3<R>,
    pub color: Vector3<R>,
}

impl<R: Real> ColorVertex<R> {
    pub fn new(position: Point3<R>, color: Vector3<R>) -> Self {
        Self { position, color }
    }
}

impl<R: Real> Default for ColorVertex<R> {
    fn default() -> Self {
        Self::new(origin3(), Vector3::zero())
    }
}

impl_element!(ColorVertex);

impl<R: Real> Vertex for ColorVertex<R> {
    type Real = R;
    type Position = Point3<R>;
    const KIND: VertexKind = VertexKind::PointWithColor;

    fn from_position(position: Point3<R>) -> Self {
        Self::new(position, Vector3::zero())
    }

    fn position(&self) -> Point3<R> {
        self.position
    }

    fn add(&self, other: &Self) -> Self {
        Self::new(add3(self.position, other.position), self.color + other.color)
    }

    fn scale(&self, s: R) -> Self {
        Self::new(self.position * s, self.color * s)
    }

    fn transform(&self, m: &Matrix4<R>) -> Self {
        Self::new(transform_point3(self.position, m), self.color)
    }

    fn slot(&self, field: VertexField) -> Option<&R> {
        match field {
            VertexField::Position(i) => at3(&self.position, i),
            VertexField::Color(i) => at3(&self.color, i),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: VertexField) -> Option<&mut R> {
        match field {
            VertexField::Position(i) => at3_mut(&mut self.position, i),
            VertexField::Color(i) => at3_mut(&mut self.color, i),
            _ => None,
        }
    }
}


/// A 2D position with a color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color2dVertex<R: Real> {
    pub position: Point2<R>,
    pub color: Vector3<R>,
}

impl<R: Real> Color2dVertex<R> {
    pub fn new(position: Point2<R>, color: Vector3<R>) -> Self {
        Self { position, color }
    }
}

impl<R: Real> Default for Color2dVertex<R> {
    fn default() -> Self {
        Self::new(origin2(), Vector3::zero())
    }
}

impl_element!(Color2dVertex);

impl<R: Real> Vertex for Color2dVertex<R> {
    type Real = R;
    type Position = Point2<R>;
    const KIND: VertexKind = VertexKind::PointWithColor2d;

    fn from_position(position: Point2<R>) -> Self {
        Self::new(position, Vector3::zero())
    }

    fn position(&self) -> Point2<R> {
        self.position
    }

    fn add(&self, other: &Self) -> Self {
        Self::new(add2(self.position, other.position), self.color + other.color)
    }

    fn scale(&self, s: R) -> Self {
        Self::new(self.position * s, self.color * s)
    }

    fn transform(&self, m: &Matrix4<R>) -> Self {
        Self::new(transform_point2(self.position, m), self.color)
    }

    fn slot(&self, field: VertexField) -> Option<&R> {
        match field {
            VertexField::Position(i) => at2(&self.position, i),
            VertexField::Color(i) => at3(&self.color, i),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: VertexField) -> Option<&mut R> {
        match field {
            VertexField::Position(i) => at2_mut(&mut self.position, i),
            VertexField::Color(i) => at3_mut(&mut self.color, i),
            _ => None,
        }
    }
}


/// A 3D position with normal and color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedColorVertex<R: Real> {
    pub position: Point3<R>,
    pub normal: Vector3<R>,
    pub color: Vector3<R>,
}

impl<R: Real> OrientedColorVertex<R> {
    pub fn new(position: Point3<R>, normal: Vector3<R>, color: Vector3<R>) -> Self {
        Self { position, normal, color }
    }
}

impl<R: Real> Default for OrientedColorVertex<R> {
    fn default() -> Self {
        Self::new(origin3(), Vector3::zero(), Vector3::zero())
    }
}

impl_element!(OrientedColorVertex);

impl<R: Real> Vertex for OrientedColorVertex<R> {
    type Real = R;
    type Position = Point3<R>;
    const KIND: VertexKind = VertexKind::PointWithNormalAndColor;

    fn from_position(position: Point3<R>) -> Self {
        Self::new(position, Vector3::zero(), Vector3::zero())
    }

    fn position(&self) -> Point3<R> {
        self.position
    }

    fn add(&self, other: &Self) -> Self {
        Self::new(
            add3(self.position, other.position),
            self.normal + other.normal,
            self.color + other.color,
        )
    }

    fn scale(&self, s: R) -> Self {
        Self::new(self.position * s, self.normal * s, self.color * s)
    }

    fn transform(&self, m: &Matrix4<R>) -> Self {
        Self::new(
            transform_point3(self.position, m),
            transform_normal(self.normal, m),
            self.color,
        )
    }

    fn slot(&self, field: VertexField) -> Option<&R> {
        match field {
            VertexField::Position(i) => at3(&self.position, i),
            VertexField::Normal(i) => at3(&self.normal, i),
            VertexField::Color(i) => at3(&self.color, i),
            VertexField::Value => None,
        }
    }

    fn slot_mut(&mut self, field: VertexField) -> Option<&mut R> {
        match field {
            VertexField::Position(i) => at3_mut(&mut self.position, i),
            VertexField::Normal(i) => at3_mut(&mut self.normal, i),
            VertexField::Color(i) => at3_mut(&mut self.color, i),
            VertexField::Value => None,
        }
    }
}
