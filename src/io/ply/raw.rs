//! The header model of a PLY file: element groups, their properties and the
//! types of those properties.
//!
//! These types only describe the *layout* of a file. They don't hold any
//! element data: element values flow directly between the stream and the
//! typed records (see `codec`).

use std::{
    fmt,
    io::{self, Write},
    ops,
};

use derive_more::{Add, AddAssign, From};

use crate::io::PrimitiveType;
use super::Format;


// ===========================================================================
// ===== Strongly typed wrapper for certain things
// ===========================================================================

/// Index of a specific property in the ordered list of properties of one
/// element group. Can be used to index a [`PropVec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, From, Add, AddAssign)]
pub struct PropIndex(pub u16);

impl PropIndex {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// A vector that holds data for each property. Can be indexed by
/// [`PropIndex`].
///
/// This is simply a wrapper around a `Vec` to use strong typing. This should
/// only be indexed with `PropIndex`.
#[derive(Debug, Clone, PartialEq, From)]
pub struct PropVec<T>(Vec<T>);

impl<T> PropVec<T> {
    pub fn new() -> Self {
        PropVec(Vec::new())
    }

    /// Iterates over all entries together with their index.
    pub fn indexed(&self) -> impl Iterator<Item = (PropIndex, &T)> {
        self.0.iter().enumerate().map(|(i, t)| (PropIndex(i as u16), t))
    }
}

impl<T> Default for PropVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ops::Index<PropIndex> for PropVec<T> {
    type Output = T;
    fn index(&self, idx: PropIndex) -> &Self::Output {
        &self.0[idx.as_usize()]
    }
}

impl<T> ops::Deref for PropVec<T> {
    type Target = Vec<T>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> ops::DerefMut for PropVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}


// ===========================================================================
// ===== Header definitions
// ===========================================================================

/// The header definition of one element group.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub name: String,

    /// Number of elements in this group.
    pub count: u64,

    /// Definitions for all properties of elements in this group.
    pub property_defs: PropVec<PropertyDef>,
}

impl ElementDef {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
            property_defs: PropVec::new(),
        }
    }
}

/// The header definition of one property of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: PropertyType,
}

/// The on-disk type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(PrimitiveType),

    /// A list of values, prefixed by its length. `len_type` is always an
    /// unsigned integer type (checked while parsing the header).
    List {
        len_type: PrimitiveType,
        scalar_type: PrimitiveType,
    }
}

impl PropertyType {
    pub fn len_type(&self) -> Option<PrimitiveType> {
        match self {
            PropertyType::Scalar(_) => None,
            PropertyType::List { len_type, .. } => Some(*len_type),
        }
    }

    pub fn is_list(&self) -> bool {
        self.len_type().is_some()
    }
}

impl fmt::Display for PropertyType {
    /// Formats the type like in a header line, e.g. `list uchar int`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyType::Scalar(ty) => ty.fmt(f),
            PropertyType::List { len_type, scalar_type } => {
                write!(f, "list {} {}", len_type, scalar_type)
            }
        }
    }
}

/// Everything stored in the header of a PLY file.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub format: Format,
    pub comments: Vec<String>,
    pub obj_info: Vec<String>,
    pub elements: Vec<ElementDef>,
}

impl Header {
    /// Writes the header including the final `end_header` line. The header is
    /// always ASCII, independent of `self.format`.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        // Magic signature
        w.write_all(b"ply\n")?;

        let format_line = match self.format {
            Format::Ascii => b"format ascii 1.0\n" as &[_],
            Format::BinaryBigEndian => b"format binary_big_endian 1.0\n",
            Format::BinaryLittleEndian => b"format binary_little_endian 1.0\n",
        };
        w.write_all(format_line)?;

        for comment in &self.comments {
            writeln!(w, "comment {}", comment)?;
        }
        for info in &self.obj_info {
            writeln!(w, "obj_info {}", info)?;
        }

        for element_def in &self.elements {
            writeln!(w, "element {} {}", element_def.name, element_def.count)?;
            for prop in &*element_def.property_defs {
                writeln!(w, "property {} {}", prop.ty, prop.name)?;
            }
        }

        w.write_all(b"end_header\n")
    }
}
