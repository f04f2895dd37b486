//! Everything related to reading a PLY file.
//!
//! # Random notes on the format
//!
//! - The PLY format description says "The header is a series of
//!   carriage-return terminated lines", but all files in the wild use
//!   `'\n'`. We accept `"\n"` and `"\r\n"`.
//! - Besides the classic type names (`uchar`, `float`, ...), some exporters
//!   use sized names (`uint8`, `float32`, ...). Both are accepted.
//! - Comments are kept verbatim: everything after `"comment "` belongs to
//!   the comment, including leading whitespace.

use std::{
    cmp::min,
    fs::File,
    io,
    path::Path,
};

use log::{debug, warn};

use crate::{
    io::{
        Error, PrimitiveType,
        parse::{self, Input, Span, debug_fmt_bytes, buf::Buffer},
    },
    mesh::{self, Face, Grid, GridRow, TriangleIndex},
    prop::{self, Element, PropertyDescriptor},
};
use super::{
    Format, PlyData,
    binding::{negotiate, PresenceFlags},
    codec::{self, Ascii, BinaryBe, BinaryLe, Decoder},
    raw::{ElementDef, Header, PropertyDef, PropertyType},
};


/// We don't trust the element counts in the header for preallocating more
/// than this many elements. Bigger groups still work, they just grow.
const MAX_PREALLOC: usize = 1 << 20;


// ===========================================================================
// ===== Header parsing
// ===========================================================================

/// One line of the header, without line break.
struct Line {
    text: String,
    span: Span,
}

impl Line {
    fn error(&self, msg: impl Into<String>) -> parse::Error {
        parse::Error::Custom(msg.into(), self.span)
    }

    /// Returns the text after `keyword` if the line starts with it, followed
    /// by the end of the line or one whitespace character. Only that single
    /// separator is removed, so comments keep their remaining text verbatim.
    fn strip_keyword(&self, keyword: &str) -> Option<&str> {
        let rest = self.text.strip_prefix(keyword)?;
        match rest.as_bytes().first() {
            None => Some(rest),
            Some(b) if b.is_ascii_whitespace() => Some(&rest[1..]),
            Some(_) => None,
        }
    }
}

/// Reads one header line including the line break.
fn next_line(buf: &mut impl Input) -> Result<Line, parse::Error> {
    let line = buf.take_until(b'\n', |sd| {
        let text = sd.assert_utf8()?;
        Ok(Line {
            text: text.strip_suffix('\r').unwrap_or(text).to_string(),
            span: sd.span,
        })
    })?;
    buf.expect_tag(b"\n")?;

    Ok(line)
}

fn parse_type(line: &Line, word: &str) -> Result<PrimitiveType, parse::Error> {
    word.parse::<PrimitiveType>().map_err(|e| line.error(e.to_string()))
}

/// Parses `element <name> <count>`.
fn parse_element(line: &Line, rest: &str) -> Result<ElementDef, parse::Error> {
    match rest.split_whitespace().collect::<Vec<_>>()[..] {
        [name, count] => {
            let count = count.parse::<u64>().map_err(|e| {
                line.error(format!("invalid integer as element count ({})", e))
            })?;

            Ok(ElementDef::new(name, count))
        }
        _ => Err(line.error("expected \"element <name> <count>\"")),
    }
}

/// Parses `property <type> <name>` or `property list <len type> <type>
/// <name>`.
fn parse_property(line: &Line, rest: &str) -> Result<PropertyDef, parse::Error> {
    match rest.split_whitespace().collect::<Vec<_>>()[..] {
        ["list", len_type, scalar_type, name] => {
            let len_type = parse_type(line, len_type)?;

            // Floating point or signed integer types don't make a lot of
            // sense as list length.
            if !len_type.is_unsigned_integer() {
                let msg = format!(
                    "only unsigned integers can be used to store list lengths (property '{}')",
                    name,
                );
                return Err(line.error(msg));
            }

            let scalar_type = parse_type(line, scalar_type)?;
            Ok(PropertyDef {
                name: name.to_string(),
                ty: PropertyType::List { len_type, scalar_type },
            })
        }
        [ty, name] if ty != "list" => {
            Ok(PropertyDef {
                name: name.to_string(),
                ty: PropertyType::Scalar(parse_type(line, ty)?),
            })
        }
        _ => Err(line.error("expected \"property <type> <name>\" or \
            \"property list <len type> <type> <name>\"")),
    }
}

fn parse_format(line: &Line, rest: &str) -> Result<Format, parse::Error> {
    let (format, version) = match rest.split_whitespace().collect::<Vec<_>>()[..] {
        [format, version] => (format, version),
        _ => return Err(line.error("expected \"format <format> 1.0\"")),
    };

    if version != "1.0" {
        return Err(line.error(format!("unsupported PLY version '{}'", version)));
    }

    match format {
        "ascii" => Ok(Format::Ascii),
        "binary_little_endian" => Ok(Format::BinaryLittleEndian),
        "binary_big_endian" => Ok(Format::BinaryBigEndian),
        other => {
            let len = min(other.len(), 50); // limit size of error string
            let msg = format!(
                "expected \"ascii\", \"binary_little_endian\" or \"binary_big_endian\", \
                    found {}",
                debug_fmt_bytes(&other.as_bytes()[..len]),
            );
            Err(line.error(msg))
        }
    }
}

/// Parses the whole header including the `end_header` line.
fn parse_header(buf: &mut impl Input) -> Result<Header, parse::Error> {
    // PLY files always start with `ply`. This serves as magic number.
    let magic = next_line(buf).map_err(|e| match e {
        parse::Error::Io(e) => parse::Error::Io(e),
        _ => parse::Error::Custom("not a PLY file (does not start with \"ply\")".into(), Span::new(0, 3)),
    })?;
    if magic.text != "ply" {
        return Err(magic.error("not a PLY file (does not start with \"ply\")"));
    }

    let mut format = None;
    let mut comments = Vec::new();
    let mut obj_info = Vec::new();
    let mut elements: Vec<ElementDef> = Vec::new();

    loop {
        let line = next_line(buf)?;

        if line.text.trim_end() == "end_header" {
            break;
        } else if let Some(comment) = line.strip_keyword("comment") {
            comments.push(comment.to_string());
        } else if let Some(info) = line.strip_keyword("obj_info") {
            obj_info.push(info.to_string());
        } else if let Some(rest) = line.strip_keyword("format") {
            // The format line has to come before everything else (except
            // comments).
            if format.is_some() || !elements.is_empty() {
                return Err(line.error("unexpected \"format\" line"));
            }
            format = Some(parse_format(&line, rest)?);
        } else if let Some(rest) = line.strip_keyword("element") {
            if format.is_none() {
                return Err(line.error("element definition before \"format\" line"));
            }
            elements.push(parse_element(&line, rest)?);
        } else if let Some(rest) = line.strip_keyword("property") {
            let prop = parse_property(&line, rest)?;
            let elem = elements.last_mut().ok_or_else(|| {
                line.error("property definition without preceding element definition")
            })?;
            elem.property_defs.push(prop);
        } else {
            let len = min(line.text.len(), 20);
            let msg = format!(
                "expected line starting with \"comment\", \"obj_info\", \"format\", \
                    \"element\", \"property\" or \"end_header\", found {}",
                debug_fmt_bytes(&line.text.as_bytes()[..len]),
            );
            return Err(line.error(msg));
        }
    }

    let format = format.ok_or_else(|| {
        parse::Error::Custom("missing \"format\" line".into(), Span::new(0, buf.offset()))
    })?;

    Ok(Header { format, comments, obj_info, elements })
}


// ===========================================================================
// ===== Definition of `Reader`
// ===========================================================================

/// Which topology element group a read is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topology {
    None,
    Faces,
    Grid,
}

/// Everything read from the body.
struct Body<V> {
    vertices: Vec<V>,
    present: PresenceFlags,
    faces: Vec<Face>,
    rows: Vec<GridRow>,
}

/// A reader able to read PLY files.
///
/// Creating a reader (with [`Reader::open`] or [`Reader::new`]) parses the
/// header. The body is read by one of the `read_*` methods, which consume
/// the reader.
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    buf: Buffer<R>,
    header: Header,
}

impl Reader<File> {
    /// Tries to open the file specified by the given path and creates a new
    /// `Reader` from that file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        // We don't need a `BufReader` here, because we will use our internal
        // parse buffer anyway.
        let file = File::open(path).map_err(|cause| Error::FileOpen {
            path: path.display().to_string(),
            cause,
        })?;

        Self::new(file)
    }
}

impl<R: io::Read> Reader<R> {
    /// Creates a new `Reader` from the given `io::Read` instance and parses
    /// the header of the given input.
    ///
    /// If you want to open a file, rather use [`Reader::open`].
    pub fn new(reader: R) -> Result<Self, Error> {
        let mut buf = Buffer::new(reader).map_err(Error::in_header)?;
        let header = parse_header(&mut buf).map_err(Error::in_header)?;

        debug!(
            "parsed PLY header: {:?}, {} element groups, {} comments",
            header.format,
            header.elements.len(),
            header.comments.len(),
        );

        Ok(Self { buf, header })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn format(&self) -> Format {
        self.header.format
    }

    pub fn read_points<V: Element>(
        self,
        props: &[PropertyDescriptor<V::Field>],
    ) -> Result<PlyData<V>, Error> {
        self.read_with(props, Topology::None, |_, _| Ok(()))
    }

    pub fn read_polygons<V: Element>(
        self,
        props: &[PropertyDescriptor<V::Field>],
    ) -> Result<PlyData<V, Vec<Vec<u32>>>, Error> {
        self.read_with(props, Topology::Faces, |body, vertex_count| {
            mesh::assemble_polygons(body.faces, vertex_count)
        })
    }

    pub fn read_triangles<V: Element>(
        self,
        props: &[PropertyDescriptor<V::Field>],
    ) -> Result<PlyData<V, Vec<TriangleIndex>>, Error> {
        self.read_with(props, Topology::Faces, |body, vertex_count| {
            mesh::check_face_indices(&body.faces, vertex_count)?;
            mesh::assemble_triangles(&body.faces)
        })
    }

    pub fn read_grid<V: Element>(
        self,
        props: &[PropertyDescriptor<V::Field>],
    ) -> Result<PlyData<V, Grid<i32>>, Error> {
        self.read_with(props, Topology::Grid, |body, vertex_count| {
            mesh::assemble_grid(body.rows, vertex_count)
        })
    }

    /// Reads the body and builds the topology with `assemble` from the
    /// decoded faces or grid rows.
    fn read_with<V, T, F>(
        mut self,
        props: &[PropertyDescriptor<V::Field>],
        topology: Topology,
        assemble: F,
    ) -> Result<PlyData<V, T>, Error>
    where
        V: Element,
        F: FnOnce(TopologyLists, usize) -> Result<T, Error>,
    {
        prop::validate::<V>(props)?;

        let body = match self.header.format {
            Format::Ascii => read_body::<Ascii, V, _>(&mut self.buf, &self.header, props, topology)?,
            Format::BinaryBigEndian => {
                read_body::<BinaryBe, V, _>(&mut self.buf, &self.header, props, topology)?
            }
            Format::BinaryLittleEndian => {
                read_body::<BinaryLe, V, _>(&mut self.buf, &self.header, props, topology)?
            }
        };

        let vertex_count = body.vertices.len();
        let lists = TopologyLists { faces: body.faces, rows: body.rows };
        let topology = assemble(lists, vertex_count)?;

        let Header { format, comments, obj_info, .. } = self.header;
        Ok(PlyData {
            vertices: body.vertices,
            topology,
            format,
            present: body.present,
            comments,
            obj_info,
        })
    }
}

/// The decoded topology elements, before assembling.
struct TopologyLists {
    faces: Vec<Face>,
    rows: Vec<GridRow>,
}

/// Reads all elements of the body. Element groups that are not needed are
/// skipped, but still parsed so that truncated files are detected.
fn read_body<D, V, I>(
    buf: &mut I,
    header: &Header,
    props: &[PropertyDescriptor<V::Field>],
    topology: Topology,
) -> Result<Body<V>, Error>
where
    D: Decoder,
    V: Element,
    I: Input,
{
    let mut body = None;
    let mut faces = Vec::new();
    let mut rows = Vec::new();

    for def in &header.elements {
        let capacity = min(def.count, MAX_PREALLOC as u64) as usize;

        match (def.name.as_str(), topology) {
            ("vertex", _) if body.is_none() => {
                let binding = negotiate(def, props);
                let mut vertices = Vec::with_capacity(capacity);
                for _ in 0..def.count {
                    vertices.push(codec::decode_element::<D, V, _>(buf, def, &binding)?);
                }

                debug!("read {} vertices", vertices.len());
                body = Some((vertices, binding.presence));
            }
            ("face", Topology::Faces) => {
                let binding = negotiate(def, prop::face_properties_for_read());
                require_any(def, &binding.presence)?;
                faces.reserve(capacity);
                for _ in 0..def.count {
                    faces.push(codec::decode_element::<D, Face, _>(buf, def, &binding)?);
                }
            }
            ("grid", Topology::Grid) => {
                let binding = negotiate(def, prop::grid_properties());
                require_any(def, &binding.presence)?;
                rows.reserve(capacity);
                for _ in 0..def.count {
                    rows.push(codec::decode_element::<D, GridRow, _>(buf, def, &binding)?);
                }
            }
            (name, _) => {
                match name {
                    "vertex" | "face" | "grid" => debug!("skipping element group '{}'", name),
                    _ => warn!("skipping unknown element group '{}'", name),
                }
                for _ in 0..def.count {
                    codec::skip_element::<D, _>(buf, def)?;
                }
            }
        }
    }

    let (vertices, present) = body.ok_or_else(|| Error::MissingElement("vertex".into()))?;
    Ok(Body { vertices, present, faces, rows })
}

/// Makes sure that at least one of the index properties exists.
fn require_any(def: &ElementDef, presence: &PresenceFlags) -> Result<(), Error> {
    if presence.any() {
        Ok(())
    } else {
        Err(Error::MissingProperty {
            element: def.name.clone(),
            expected: presence.iter().map(|p| p.name).collect(),
        })
    }
}
