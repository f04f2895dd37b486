//! Everything related to writing a PLY file.
//!
//! # Random notes on the format
//!
//! - Lines are always terminated by `'\n'`, never `"\r\n"`.
//! - The header only contains the element groups that are actually written:
//!   `vertex`, followed by `face` or `grid` if there is a topology.

use std::io::{self, Write};

use log::debug;

use crate::{
    io::Error,
    mesh::{self, Face, Grid, TriangleIndex},
    prop::{self, Element, PropertyDescriptor},
};
use super::{
    Format,
    codec::{self, Ascii, BinaryBe, BinaryLe, Encoder},
    raw::{ElementDef, Header, PropertyDef},
};


// ===========================================================================
// ===== PLY Config
// ===========================================================================

/// Used to configure and create a [`Writer`].
///
/// This is used to configure basic settings for the file to be written. Most
/// importantly, this is the file format. Additionally, you can add comments
/// and `obj_info` lines to the file header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    format: Format,
    comments: Vec<String>,
    obj_info: Vec<String>,
}

impl Config {
    /// Creates a new configuration with binary format (native endianness).
    pub fn binary() -> Self {
        Self::new(Format::binary_native())
    }

    /// Creates a new configuration with ASCII format.
    ///
    /// ASCII files are larger and slower to read and write than binary ones,
    /// but can be inspected with any text editor. The PLY file header is
    /// always ASCII.
    pub fn ascii() -> Self {
        Self::new(Format::Ascii)
    }

    /// Creates a new configuration with the given format.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            comments: vec![],
            obj_info: vec![],
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Adds a `comment` line to the file header.
    ///
    /// The given string must not contain `'\n'` or else this method panics.
    /// Note that there are probably other characters that could invalidate the
    /// file header or at least confuse some parsers. You should thus take care
    /// what strings you pass in.
    pub fn add_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();

        assert!(!comment.contains('\n'), "PLY comments must not contain '\\n'!");

        self.comments.push(comment);
        self
    }

    /// Adds an `obj_info` line to the file header. Same restrictions as for
    /// [`add_comment`][Config::add_comment] apply.
    pub fn add_obj_info(mut self, info: impl Into<String>) -> Self {
        let info = info.into();

        assert!(!info.contains('\n'), "PLY obj_info lines must not contain '\\n'!");

        self.obj_info.push(info);
        self
    }

    /// Creates a writer with the given `io::Write` instance and `self` as
    /// configuration.
    pub fn into_writer<W: io::Write>(self, writer: W) -> Writer<W> {
        Writer::new(self, writer)
    }
}


// ===========================================================================
// ===== PLY Writer
// ===========================================================================

/// A writer able to write binary and ASCII PLY files.
///
/// Every `write_*` method writes one complete file and consumes the writer.
///
/// # Example
///
/// ```
/// use std::{fs::File, io::BufWriter};
/// use plyvert::{
///     prelude::*, PointVertex,
///     io::{Error, ply::Config},
/// };
///
/// fn write_both_formats(vertices: &[PointVertex<f32>]) -> Result<(), Error> {
///     let props = PointVertex::<f32>::write_properties();
///
///     // We use `BufWriter` here because unbuffered file access is usually a
///     // lot slower.
///     let file_a = File::create("points_ascii.ply")?;
///     Config::ascii().into_writer(BufWriter::new(file_a)).write_points(vertices, props)?;
///
///     let file_b = File::create("points_binary.ply")?;
///     Config::binary().into_writer(BufWriter::new(file_b)).write_points(vertices, props)?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    config: Config,
    writer: W,
}

impl<W: io::Write> Writer<W> {
    /// Creates a new PLY writer with the given PLY config which will write to
    /// the given `io::Write` instance.
    pub fn new(config: Config, writer: W) -> Self {
        Self { config, writer }
    }

    /// Writes only vertices.
    pub fn write_points<V: Element>(
        self,
        vertices: &[V],
        props: &[PropertyDescriptor<V::Field>],
    ) -> Result<(), Error> {
        self.write_mesh::<V, Face>(vertices, props, None)
    }

    /// Writes vertices and the given polygons as `face` group. Fails if a
    /// polygon refers to a vertex that does not exist or has more indices
    /// than its count type can express.
    pub fn write_polygons<V: Element>(
        self,
        vertices: &[V],
        props: &[PropertyDescriptor<V::Field>],
        polygons: &[Vec<u32>],
    ) -> Result<(), Error> {
        let faces = polygons.iter().cloned().map(Face::from).collect::<Vec<_>>();
        let face_props = prop::face_properties_for_write();
        mesh::check_face_indices(&faces, vertices.len())?;
        for d in face_props {
            check_list_lens(d, faces.iter().map(|f| f.vertex_indices.len()))?;
        }

        let topology = ("face", &faces[..], face_props);
        self.write_mesh(vertices, props, Some(topology))
    }

    /// Writes vertices and the given triangles as `face` group.
    pub fn write_triangles<V: Element>(
        self,
        vertices: &[V],
        props: &[PropertyDescriptor<V::Field>],
        triangles: &[TriangleIndex],
    ) -> Result<(), Error> {
        let faces = triangles.iter().copied().map(Face::from).collect::<Vec<_>>();
        mesh::check_face_indices(&faces, vertices.len())?;
        let topology = ("face", &faces[..], prop::face_properties_for_write());
        self.write_mesh(vertices, props, Some(topology))
    }

    /// Writes vertices and the grid as `grid` group with one element per row.
    /// Every cell has to be `-1` or a valid vertex index.
    pub fn write_grid<V: Element>(
        self,
        vertices: &[V],
        props: &[PropertyDescriptor<V::Field>],
        grid: &Grid<i32>,
    ) -> Result<(), Error> {
        let grid_props = prop::grid_properties();
        mesh::check_grid_indices(grid, vertices.len())?;
        for d in grid_props {
            check_list_lens(d, grid.rows().map(|row| row.len()))?;
        }

        let rows = mesh::grid_rows(grid);
        let topology = ("grid", &rows[..], grid_props);
        self.write_mesh(vertices, props, Some(topology))
    }

    fn write_mesh<V: Element, T: Element>(
        mut self,
        vertices: &[V],
        props: &[PropertyDescriptor<V::Field>],
        topology: Option<(&str, &[T], &[PropertyDescriptor<T::Field>])>,
    ) -> Result<(), Error> {
        prop::validate::<V>(props)?;

        // ----- Header -----------------------------------------------------
        let mut elements = vec![element_def("vertex", vertices.len(), props)];
        if let Some((name, elems, elem_props)) = topology {
            elements.push(element_def(name, elems.len(), elem_props));
        }

        let header = Header {
            format: self.config.format,
            comments: self.config.comments.clone(),
            obj_info: self.config.obj_info.clone(),
            elements,
        };
        header.write_to(&mut self.writer)?;

        debug!(
            "wrote PLY header: {:?}, {} vertices{}",
            header.format,
            vertices.len(),
            topology.map(|(name, elems, _)| format!(", {} {} elements", elems.len(), name))
                .unwrap_or_default(),
        );

        // ----- Body -------------------------------------------------------
        match self.config.format {
            Format::Ascii => write_body::<Ascii, _, _, _>(&mut self.writer, vertices, props, topology)?,
            Format::BinaryBigEndian => {
                write_body::<BinaryBe, _, _, _>(&mut self.writer, vertices, props, topology)?
            }
            Format::BinaryLittleEndian => {
                write_body::<BinaryLe, _, _, _>(&mut self.writer, vertices, props, topology)?
            }
        }

        self.writer.flush()?;
        Ok(())
    }
}

/// Makes sure no list is longer than the count type of `desc` can express.
/// Scalar descriptors are ignored.
fn check_list_lens<F>(
    desc: &PropertyDescriptor<F>,
    mut lens: impl Iterator<Item = usize>,
) -> Result<(), Error> {
    let len_type = match desc.list {
        Some(meta) => meta.len_type,
        None => return Ok(()),
    };

    let max_len = len_type.max_list_len().unwrap_or(0);
    match lens.find(|&len| len as u64 > max_len) {
        Some(len) => Err(Error::ListTooLong { name: desc.name.to_string(), len, len_type }),
        None => Ok(()),
    }
}

fn element_def<F>(name: &str, count: usize, props: &[PropertyDescriptor<F>]) -> ElementDef {
    let mut def = ElementDef::new(name, count as u64);
    for d in props {
        def.property_defs.push(PropertyDef {
            name: d.name.to_string(),
            ty: d.property_type(),
        });
    }
    def
}

fn write_body<En, V, T, W>(
    w: &mut W,
    vertices: &[V],
    props: &[PropertyDescriptor<V::Field>],
    topology: Option<(&str, &[T], &[PropertyDescriptor<T::Field>])>,
) -> Result<(), Error>
where
    En: Encoder,
    V: Element,
    T: Element,
    W: Write,
{
    for v in vertices {
        codec::encode_element::<En, _, _>(w, props, v)?;
    }

    if let Some((_, elems, elem_props)) = topology {
        for elem in elems {
            codec::encode_element::<En, _, _>(w, elem_props, elem)?;
        }
    }

    Ok(())
}
