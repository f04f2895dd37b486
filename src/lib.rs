//! Reading and writing PLY files into strongly typed vertex records.
//!
//! The central piece of this crate is a data driven *property binding*: every
//! record type comes with a table of [`PropertyDescriptor`]s that says which
//! PLY property feeds which field of the record, which type the property has
//! on disk and which type the field has in memory. The same machinery is used
//! for all record types, so reading a `ColorVertex<f64>` from a file with
//! `uchar` colors works exactly like reading a `PointVertex<f32>`.
//!
//! ```no_run
//! use plyvert::{prelude::*, ColorVertex, io::ply};
//!
//! # fn main() -> Result<(), plyvert::io::Error> {
//! let data = ply::read_polygons::<ColorVertex<f32>>(
//!     "bunny.ply",
//!     ColorVertex::<f32>::read_properties(),
//! )?;
//!
//! println!("{} vertices, {} faces", data.vertices.len(), data.topology.len());
//! if !data.present.is_present("red") {
//!     println!("file has no vertex colors");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cast;
pub mod io;
pub mod math;
pub mod mesh;
pub mod prelude;
pub mod prop;
pub mod vertex;

pub use self::{
    mesh::{Face, Grid, GridRow, TriangleIndex, assemble_grid, assemble_polygons, assemble_triangles},
    prop::{
        Element, FaceField, FieldShape, GridField, ListMeta, PropertyDescriptor, Value,
        VertexField, VertexKind,
    },
    vertex::{
        Color2dVertex, ColorVertex, OrientedColorVertex, OrientedVertex, Point2dVertex,
        PointVertex, ValueVertex, Vertex,
    },
};
