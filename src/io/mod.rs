//! Everything related to file IO: the PLY reader and writer, the primitive
//! type system shared by disk and memory, and the error type.

use std::{
    fmt,
    io,
    str::FromStr,
};

use failure::Fail;

use crate::math::PrimitiveNum;


pub mod parse;
pub mod ply;

#[cfg(test)]
mod tests;


// ==========================================================================
// ===== Errors
// ==========================================================================

/// Everything that can go wrong while reading or writing a mesh.
#[derive(Debug, Fail)]
pub enum Error {
    /// The file could not be opened (reading) or created (writing).
    #[fail(display = "cannot open '{}': {}", path, cause)]
    FileOpen {
        path: String,
        #[cause]
        cause: io::Error,
    },

    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    /// The header does not follow the PLY grammar. Nothing of the body has
    /// been read at this point.
    #[fail(display = "malformed PLY header: {}", _0)]
    MalformedHeader(#[cause] parse::Error),

    /// A value in the body could not be parsed (e.g. an invalid ASCII
    /// literal).
    #[fail(display = "malformed PLY body: {}", _0)]
    MalformedBody(#[cause] parse::Error),

    /// The stream ended in the middle of an element.
    #[fail(display = "unexpected end of data in PLY body (at byte {})", offset)]
    TruncatedStream {
        offset: usize,
    },

    /// A value of type `from` was handed to a slot of type `to` (or a list
    /// count type that is not an unsigned integer was used).
    #[fail(display = "cannot convert '{}' to '{}'", from, to)]
    UnsupportedConversion {
        from: PrimitiveType,
        to: PrimitiveType,
    },

    /// A property descriptor does not fit the record it is used with.
    #[fail(display = "invalid property descriptor '{}': {}", name, reason)]
    InvalidDescriptor {
        name: String,
        reason: String,
    },

    #[fail(display = "face {} has {} vertices, but only triangles are allowed", face, len)]
    NonTriangularFace {
        face: usize,
        len: usize,
    },

    #[fail(
        display = "index {} in face {} is out of range (there are {} vertices)",
        index, face, vertex_count
    )]
    IndexOutOfRange {
        face: usize,
        index: i64,
        vertex_count: usize,
    },

    #[fail(display = "grid row {} has {} cells, but the grid is {} cells wide", row, len, width)]
    RaggedGrid {
        row: usize,
        len: usize,
        width: usize,
    },

    #[fail(
        display = "list property '{}' has {} entries which does not fit into its length type '{}'",
        name, len, len_type
    )]
    ListTooLong {
        name: String,
        len: usize,
        len_type: PrimitiveType,
    },

    /// A required element group (e.g. `vertex`) is not defined in the header.
    #[fail(display = "no '{}' element in PLY file", _0)]
    MissingElement(String),

    /// An element group exists, but none of the properties needed to
    /// interpret it (e.g. `vertex_indices` for `face`).
    #[fail(display = "element '{}' has none of the properties {:?}", element, expected)]
    MissingProperty {
        element: String,
        expected: Vec<&'static str>,
    },
}

impl Error {
    /// Converts an error that occured while parsing the header.
    pub(crate) fn in_header(e: parse::Error) -> Self {
        match e {
            parse::Error::Io(e) => Error::Io(e),
            other => Error::MalformedHeader(other),
        }
    }

    /// Converts an error that occured while parsing an element of the body.
    pub(crate) fn in_body(e: parse::Error) -> Self {
        match e {
            parse::Error::Io(e) => Error::Io(e),
            parse::Error::UnexpectedEof(offset) => Error::TruncatedStream { offset },
            other => Error::MalformedBody(other),
        }
    }

    pub(crate) fn invalid_descriptor(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidDescriptor {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}


// ==========================================================================
// ===== Primitives
// ==========================================================================

/// Represents the type of an IO primitive.
///
/// The same eight types are used to describe a property on disk and a field
/// in memory. This is closely related to [`PrimitiveValue`] (which represents
/// an IO primitive value) and [`Primitive`] (which is a trait abstracting over
/// the closed set of IO primitive types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl PrimitiveType {
    /// Returns the type name used in the PLY header (e.g. `short` for
    /// `Int16`).
    pub fn ply_type_name(&self) -> &'static str {
        match *self {
            PrimitiveType::Int8 => "char",
            PrimitiveType::Uint8 => "uchar",
            PrimitiveType::Int16 => "short",
            PrimitiveType::Uint16 => "ushort",
            PrimitiveType::Int32 => "int",
            PrimitiveType::Uint32 => "uint",
            PrimitiveType::Float32 => "float",
            PrimitiveType::Float64 => "double",
        }
    }

    /// Returns the number of bytes a value of this type occupies in a binary
    /// file.
    pub fn len(&self) -> usize {
        match self {
            PrimitiveType::Int8 | PrimitiveType::Uint8 => 1,
            PrimitiveType::Int16 | PrimitiveType::Uint16 => 2,
            PrimitiveType::Int32 | PrimitiveType::Uint32 | PrimitiveType::Float32 => 4,
            PrimitiveType::Float64 => 8,
        }
    }

    /// Returns `true` if and only if the type is either `Float32` or
    /// `Float64`.
    pub fn is_floating_point(&self) -> bool {
        *self == PrimitiveType::Float32 || *self == PrimitiveType::Float64
    }

    /// Returns `true` if and only if the type is one of `Uint8`, `Uint16` or
    /// `Uint32`.
    pub fn is_unsigned_integer(&self) -> bool {
        match self {
            PrimitiveType::Uint8 | PrimitiveType::Uint16 | PrimitiveType::Uint32 => true,
            _ => false,
        }
    }

    /// The largest list length a list count of this type can hold, or `None`
    /// if this type cannot be used as list count.
    pub fn max_list_len(&self) -> Option<u64> {
        match self {
            PrimitiveType::Uint8 => Some(u8::max_value().into()),
            PrimitiveType::Uint16 => Some(u16::max_value().into()),
            PrimitiveType::Uint32 => Some(u32::max_value().into()),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.ply_type_name().fmt(f)
    }
}

/// The error emitted when the `FromStr` implementation for `PrimitiveType`
/// cannot parse the given string.
pub struct PrimitiveTypeParseError(String);

impl fmt::Display for PrimitiveTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\" is not a valid PLY scalar type", self.0)
    }
}

impl fmt::Debug for PrimitiveTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for PrimitiveType {
    type Err = PrimitiveTypeParseError;

    /// Parses the classic PLY names (`uchar`, `float`, ...) as well as the
    /// sized names some exporters use (`uint8`, `float32`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "char" | "int8" => Ok(PrimitiveType::Int8),
            "uchar" | "uint8" => Ok(PrimitiveType::Uint8),
            "short" | "int16" => Ok(PrimitiveType::Int16),
            "ushort" | "uint16" => Ok(PrimitiveType::Uint16),
            "int" | "int32" => Ok(PrimitiveType::Int32),
            "uint" | "uint32" => Ok(PrimitiveType::Uint32),
            "float" | "float32" => Ok(PrimitiveType::Float32),
            "double" | "float64" => Ok(PrimitiveType::Float64),
            other => Err(PrimitiveTypeParseError(other.to_string())),
        }
    }
}

/// Represents an IO primitive value.
///
/// This is closely related to [`PrimitiveType`] (which represents only the
/// type of IO primitives) and [`Primitive`] (which is a trait abstracting over
/// the closed set of IO primitive types).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Float32(f32),
    Float64(f64),
}

impl PrimitiveValue {
    /// Returns the type of this value.
    pub fn ty(&self) -> PrimitiveType {
        match self {
            PrimitiveValue::Int8(_) => PrimitiveType::Int8,
            PrimitiveValue::Uint8(_) => PrimitiveType::Uint8,
            PrimitiveValue::Int16(_) => PrimitiveType::Int16,
            PrimitiveValue::Uint16(_) => PrimitiveType::Uint16,
            PrimitiveValue::Int32(_) => PrimitiveType::Int32,
            PrimitiveValue::Uint32(_) => PrimitiveType::Uint32,
            PrimitiveValue::Float32(_) => PrimitiveType::Float32,
            PrimitiveValue::Float64(_) => PrimitiveType::Float64,
        }
    }

    /// Returns the value as unsigned integer, or `None` if the value does not
    /// have an unsigned integer type. Used for list counts.
    pub fn as_unsigned_integer(&self) -> Option<u32> {
        match *self {
            PrimitiveValue::Uint8(v) => Some(v.into()),
            PrimitiveValue::Uint16(v) => Some(v.into()),
            PrimitiveValue::Uint32(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrimitiveValue::Int8(v) => v.fmt(f),
            PrimitiveValue::Uint8(v) => v.fmt(f),
            PrimitiveValue::Int16(v) => v.fmt(f),
            PrimitiveValue::Uint16(v) => v.fmt(f),
            PrimitiveValue::Int32(v) => v.fmt(f),
            PrimitiveValue::Uint32(v) => v.fmt(f),
            PrimitiveValue::Float32(v) => v.fmt(f),
            PrimitiveValue::Float64(v) => v.fmt(f),
        }
    }
}

mod internal {
    pub trait DoNotImplement {}
}

/// Abstracts over all IO primitive types.
///
/// Note that this trait is exactly implemented for the types that are included
/// in [`PrimitiveType`] and [`PrimitiveValue`]. Thus, this is a closed set of
/// implementing types (unusual for a trait). As a consequence, you are not
/// supposed to implement this trait for your own types! That's why this trait
/// has a supertrait called `DoNotImplement`. Said supertrait is crate-private,
/// so you can't implement it for other types.
pub trait Primitive: PrimitiveNum + internal::DoNotImplement {
    /// The type represented as this [`PrimitiveType`] value.
    const TY: PrimitiveType;

    /// Returns the primitive as a [`PrimitiveValue`] (basically dynamic
    /// typing).
    ///
    /// The implementation of this method always returns a value with the same
    /// type as specified in `Self::TY`.
    fn to_primitive_value(&self) -> PrimitiveValue;

    /// Returns the inner value if `value` has exactly the type `Self::TY`,
    /// `None` otherwise. This does *not* cast between types, see
    /// [`cast::convert`][crate::cast::convert] for that.
    fn from_primitive_value(value: PrimitiveValue) -> Option<Self>;
}

macro_rules! impl_primitive {
    ($ty:ident, $variant:ident) => {
        impl internal::DoNotImplement for $ty {}
        impl Primitive for $ty {
            const TY: PrimitiveType = PrimitiveType::$variant;
            fn to_primitive_value(&self) -> PrimitiveValue {
                PrimitiveValue::$variant(*self)
            }
            fn from_primitive_value(value: PrimitiveValue) -> Option<Self> {
                match value {
                    PrimitiveValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    }
}

impl_primitive!(i8,  Int8);
impl_primitive!(u8,  Uint8);
impl_primitive!(i16, Int16);
impl_primitive!(u16, Uint16);
impl_primitive!(i32, Int32);
impl_primitive!(u32, Uint32);
impl_primitive!(f32, Float32);
impl_primitive!(f64, Float64);
