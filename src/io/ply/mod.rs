//! Reading and writing PLY files.
//!
//! The functions in this module work on paths. [`Reader`] and [`Writer`] offer
//! the same operations on any `io::Read` or `io::Write`.
//!
//! Every read needs a list of property descriptors saying which properties
//! to look for. Usually, that's the built-in table of the record type (e.g.
//! `ColorVertex::<f32>::read_properties()`). Properties in the file that are
//! not requested are skipped, requested properties missing in the file keep
//! their default value. Which properties were actually found is reported in
//! [`PlyData::present`].
//!
//! ```no_run
//! use plyvert::{prelude::*, OrientedVertex, io::ply::{self, Config}};
//!
//! # fn main() -> Result<(), plyvert::io::Error> {
//! let data = ply::read_triangles::<OrientedVertex<f64>>(
//!     "in.ply",
//!     OrientedVertex::<f64>::read_properties(),
//! )?;
//!
//! ply::write_triangles(
//!     "out.ply",
//!     &data.vertices,
//!     OrientedVertex::<f64>::write_properties(),
//!     &data.topology,
//!     Config::binary().add_comment("converted"),
//! )?;
//! # Ok(())
//! # }
//! ```

use std::{
    fs::File,
    io::BufWriter,
    path::Path,
};

use crate::{
    io::Error,
    mesh::{Grid, TriangleIndex},
    prop::{Element, PropertyDescriptor},
};


pub mod raw;
mod binding;
mod codec;
mod read;
mod write;



pub use self::{
    binding::{Presence, PresenceFlags},
    read::Reader,
    write::{Config, Writer},
};


/// The encoding of the body of a PLY file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Ascii,
    BinaryBigEndian,
    BinaryLittleEndian,
}

impl Format {
    /// Returns the binary format with the native endianess.
    pub fn binary_native() -> Self {
        #[cfg(target_endian = "big")]
        {
            Format::BinaryBigEndian
        }

        #[cfg(target_endian = "little")]
        {
            Format::BinaryLittleEndian
        }
    }

    pub fn is_binary(&self) -> bool {
        *self != Format::Ascii
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Ascii
    }
}

/// The result of reading a PLY file.
///
/// `T` is the topology: `()` for point clouds, `Vec<Vec<u32>>` for polygons,
/// `Vec<TriangleIndex>` for triangles or `Grid<i32>` for grids.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyData<V, T = ()> {
    pub vertices: Vec<V>,
    pub topology: T,
    pub format: Format,

    /// One entry per requested vertex property.
    pub present: PresenceFlags,

    /// The `comment` lines of the header, without the `comment ` prefix.
    pub comments: Vec<String>,

    /// The `obj_info` lines of the header, without the `obj_info ` prefix.
    pub obj_info: Vec<String>,
}

impl<V, T> PlyData<V, T> {
    /// Returns a writer configuration with the format, comments and
    /// `obj_info` lines of this file. Useful to write a file back unchanged.
    pub fn config(&self) -> Config {
        let mut config = Config::new(self.format);
        for comment in &self.comments {
            config = config.add_comment(comment.clone());
        }
        for info in &self.obj_info {
            config = config.add_obj_info(info.clone());
        }
        config
    }
}


// ===========================================================================
// ===== Path based API
// ===========================================================================

fn create(path: &Path, config: Config) -> Result<Writer<BufWriter<File>>, Error> {
    let file = File::create(path).map_err(|cause| Error::FileOpen {
        path: path.display().to_string(),
        cause,
    })?;

    Ok(config.into_writer(BufWriter::new(file)))
}

/// Reads only the vertices of the file at `path`. Other element groups are
/// skipped.
pub fn read_points<V: Element>(
    path: impl AsRef<Path>,
    props: &[PropertyDescriptor<V::Field>],
) -> Result<PlyData<V>, Error> {
    Reader::open(path)?.read_points(props)
}

/// Reads vertices and the faces of the `face` group as index lists. A file
/// without `face` group results in zero faces.
pub fn read_polygons<V: Element>(
    path: impl AsRef<Path>,
    props: &[PropertyDescriptor<V::Field>],
) -> Result<PlyData<V, Vec<Vec<u32>>>, Error> {
    Reader::open(path)?.read_polygons(props)
}

/// Like [`read_polygons`], but every face has to be a triangle.
pub fn read_triangles<V: Element>(
    path: impl AsRef<Path>,
    props: &[PropertyDescriptor<V::Field>],
) -> Result<PlyData<V, Vec<TriangleIndex>>, Error> {
    Reader::open(path)?.read_triangles(props)
}

/// Reads vertices and the `grid` group.
pub fn read_grid<V: Element>(
    path: impl AsRef<Path>,
    props: &[PropertyDescriptor<V::Field>],
) -> Result<PlyData<V, Grid<i32>>, Error> {
    Reader::open(path)?.read_grid(props)
}

pub fn write_points<V: Element>(
    path: impl AsRef<Path>,
    vertices: &[V],
    props: &[PropertyDescriptor<V::Field>],
    config: Config,
) -> Result<(), Error> {
    create(path.as_ref(), config)?.write_points(vertices, props)
}

pub fn write_polygons<V: Element>(
    path: impl AsRef<Path>,
    vertices: &[V],
    props: &[PropertyDescriptor<V::Field>],
    polygons: &[Vec<u32>],
    config: Config,
) -> Result<(), Error> {
    create(path.as_ref(), config)?.write_polygons(vertices, props, polygons)
}

pub fn write_triangles<V: Element>(
    path: impl AsRef<Path>,
    vertices: &[V],
    props: &[PropertyDescriptor<V::Field>],
    triangles: &[TriangleIndex],
    config: Config,
) -> Result<(), Error> {
    create(path.as_ref(), config)?.write_triangles(vertices, props, triangles)
}

pub fn write_grid<V: Element>(
    path: impl AsRef<Path>,
    vertices: &[V],
    props: &[PropertyDescriptor<V::Field>],
    grid: &Grid<i32>,
    config: Config,
) -> Result<(), Error> {
    create(path.as_ref(), config)?.write_grid(vertices, props, grid)
}
