//! Decoding and encoding single elements in the three PLY encodings.
//!
//! # Notes on the ASCII encoding
//!
//! - Values are separated by arbitrary whitespace. Elements are *not*
//!   required to be on separate lines, as some exporters wrap long lines.
//! - For writing, we simply use the `fmt::Display` impl of all types. Rust
//!   prints floats with the shortest representation that parses back to the
//!   same value, so ASCII files round trip exactly.

use std::{
    cmp::min,
    io::{self, Write},
};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use smallvec::SmallVec;

use crate::{
    cast,
    io::{
        Error, PrimitiveType, PrimitiveValue,
        parse::{self, Input, is_whitespace},
    },
    prop::{Element, PropertyDescriptor, Value},
};
use super::{
    binding::Binding,
    raw::{ElementDef, PropertyType},
};


/// Lists with a bigger length prefix are still read, we just don't trust the
/// prefix for preallocating.
const MAX_LIST_PREALLOC: usize = 64;


// ===========================================================================
// ===== Decoding
// ===========================================================================

/// Abstracts over the three encodings for reading.
pub(crate) trait Decoder {
    fn read_value(buf: &mut impl Input, ty: PrimitiveType) -> Result<PrimitiveValue, parse::Error>;
}

/// ASCII encoding.
pub(crate) enum Ascii {}

/// Binary big endian encoding.
pub(crate) enum BinaryBe {}

/// Binary little endian encoding.
pub(crate) enum BinaryLe {}

// Reads until the next whitespace and tries to parse the string as `$ty`.
macro_rules! ascii_parser {
    ($buf:ident, $ty:ident, $variant:ident) => {
        $buf.take_until(is_whitespace, |sd| {
            sd.assert_ascii()?
                .parse::<$ty>()
                .map(PrimitiveValue::$variant)
                .map_err(|e| {
                    let msg = format!(concat!("invalid '", stringify!($ty), "' literal: {}"), e);
                    sd.error(msg)
                })
        })
    }
}

impl Decoder for Ascii {
    fn read_value(buf: &mut impl Input, ty: PrimitiveType) -> Result<PrimitiveValue, parse::Error> {
        buf.skip_until(|b| !is_whitespace(b))?;

        match ty {
            PrimitiveType::Int8 => ascii_parser!(buf, i8, Int8),
            PrimitiveType::Uint8 => ascii_parser!(buf, u8, Uint8),
            PrimitiveType::Int16 => ascii_parser!(buf, i16, Int16),
            PrimitiveType::Uint16 => ascii_parser!(buf, u16, Uint16),
            PrimitiveType::Int32 => ascii_parser!(buf, i32, Int32),
            PrimitiveType::Uint32 => ascii_parser!(buf, u32, Uint32),
            PrimitiveType::Float32 => ascii_parser!(buf, f32, Float32),
            PrimitiveType::Float64 => ascii_parser!(buf, f64, Float64),
        }
    }
}

fn read_binary<B: ByteOrder, I: Input>(
    buf: &mut I,
    ty: PrimitiveType,
) -> Result<PrimitiveValue, parse::Error> {
    buf.with_bytes(ty.len(), |sd| {
        let d = sd.data;
        let v = match ty {
            PrimitiveType::Int8 => PrimitiveValue::Int8(d[0] as i8),
            PrimitiveType::Uint8 => PrimitiveValue::Uint8(d[0]),
            PrimitiveType::Int16 => PrimitiveValue::Int16(B::read_i16(d)),
            PrimitiveType::Uint16 => PrimitiveValue::Uint16(B::read_u16(d)),
            PrimitiveType::Int32 => PrimitiveValue::Int32(B::read_i32(d)),
            PrimitiveType::Uint32 => PrimitiveValue::Uint32(B::read_u32(d)),
            PrimitiveType::Float32 => PrimitiveValue::Float32(B::read_f32(d)),
            PrimitiveType::Float64 => PrimitiveValue::Float64(B::read_f64(d)),
        };

        Ok(v)
    })
}

impl Decoder for BinaryBe {
    fn read_value(buf: &mut impl Input, ty: PrimitiveType) -> Result<PrimitiveValue, parse::Error> {
        read_binary::<BigEndian, _>(buf, ty)
    }
}

impl Decoder for BinaryLe {
    fn read_value(buf: &mut impl Input, ty: PrimitiveType) -> Result<PrimitiveValue, parse::Error> {
        read_binary::<LittleEndian, _>(buf, ty)
    }
}

/// Reads one property value with its on-disk type.
fn read_property<D: Decoder, I: Input>(buf: &mut I, ty: PropertyType) -> Result<Value, Error> {
    match ty {
        PropertyType::Scalar(ty) => D::read_value(buf, ty).map(Value::Scalar).map_err(Error::in_body),
        PropertyType::List { len_type, scalar_type } => {
            // The header parser only accepts unsigned integer length types.
            let len = D::read_value(buf, len_type)
                .map_err(Error::in_body)?
                .as_unsigned_integer()
                .ok_or(Error::UnsupportedConversion { from: len_type, to: PrimitiveType::Uint32 })?;

            let mut list = SmallVec::with_capacity(min(len as usize, MAX_LIST_PREALLOC));
            for _ in 0..len {
                list.push(D::read_value(buf, scalar_type).map_err(Error::in_body)?);
            }

            Ok(Value::List(list))
        }
    }
}

/// Reads one element of the group `def`. Values of bound properties are
/// converted to their in-memory type and stored, all others are dropped.
pub(crate) fn decode_element<D, E, I>(
    buf: &mut I,
    def: &ElementDef,
    binding: &Binding<'_, E::Field>,
) -> Result<E, Error>
where
    D: Decoder,
    E: Element,
    I: Input,
{
    let mut out = E::default();

    // The order is important: the values are read in file order.
    for (idx, prop) in def.property_defs.indexed() {
        let value = read_property::<D, _>(buf, prop.ty)?;
        if let Some(d) = binding.slots[idx] {
            out.set_field(d.field, value.coerce(d.mem_type))?;
        }
    }

    Ok(out)
}

/// Reads one element of the group `def` and throws it away.
pub(crate) fn skip_element<D: Decoder, I: Input>(buf: &mut I, def: &ElementDef) -> Result<(), Error> {
    for prop in def.property_defs.iter() {
        read_property::<D, _>(buf, prop.ty)?;
    }

    Ok(())
}


// ===========================================================================
// ===== Encoding
// ===========================================================================

/// Abstracts over the three encodings for writing.
pub(crate) trait Encoder {
    fn write_value(w: &mut impl Write, v: PrimitiveValue) -> io::Result<()>;

    /// Writes a separator between two values. Only relevant for ASCII.
    fn separator(_w: &mut impl Write) -> io::Result<()> {
        Ok(())
    }

    /// Finishes one element. Only relevant for ASCII.
    fn finish_element(_w: &mut impl Write) -> io::Result<()> {
        Ok(())
    }
}

impl Encoder for Ascii {
    fn write_value(w: &mut impl Write, v: PrimitiveValue) -> io::Result<()> {
        write!(w, "{}", v)
    }

    fn separator(w: &mut impl Write) -> io::Result<()> {
        w.write_all(b" ")
    }

    fn finish_element(w: &mut impl Write) -> io::Result<()> {
        w.write_all(b"\n")
    }
}

fn write_binary<B: ByteOrder, W: Write>(w: &mut W, v: PrimitiveValue) -> io::Result<()> {
    match v {
        PrimitiveValue::Int8(v) => w.write_i8(v),
        PrimitiveValue::Uint8(v) => w.write_u8(v),
        PrimitiveValue::Int16(v) => w.write_i16::<B>(v),
        PrimitiveValue::Uint16(v) => w.write_u16::<B>(v),
        PrimitiveValue::Int32(v) => w.write_i32::<B>(v),
        PrimitiveValue::Uint32(v) => w.write_u32::<B>(v),
        PrimitiveValue::Float32(v) => w.write_f32::<B>(v),
        PrimitiveValue::Float64(v) => w.write_f64::<B>(v),
    }
}

impl Encoder for BinaryBe {
    fn write_value(w: &mut impl Write, v: PrimitiveValue) -> io::Result<()> {
        write_binary::<BigEndian, _>(w, v)
    }
}

impl Encoder for BinaryLe {
    fn write_value(w: &mut impl Write, v: PrimitiveValue) -> io::Result<()> {
        write_binary::<LittleEndian, _>(w, v)
    }
}

/// Writes the fields of `elem` listed in `props`, converted to their on-disk
/// types.
pub(crate) fn encode_element<En, E, W>(
    w: &mut W,
    props: &[PropertyDescriptor<E::Field>],
    elem: &E,
) -> Result<(), Error>
where
    En: Encoder,
    E: Element,
    W: Write,
{
    for (i, d) in props.iter().enumerate() {
        if i > 0 {
            En::separator(w)?;
        }

        let value = elem.field(d.field).ok_or_else(|| {
            Error::invalid_descriptor(d.name, format!("record has no field {:?}", d.field))
        })?;

        match (value, d.list) {
            (Value::Scalar(v), None) => En::write_value(w, cast::convert(v, d.disk_type))?,
            (Value::List(list), Some(meta)) => {
                let max_len = meta.len_type.max_list_len().unwrap_or(0);
                if list.len() as u64 > max_len {
                    return Err(Error::ListTooLong {
                        name: d.name.to_string(),
                        len: list.len(),
                        len_type: meta.len_type,
                    });
                }

                let len = PrimitiveValue::Uint32(list.len() as u32);
                En::write_value(w, cast::convert(len, meta.len_type))?;
                for v in list {
                    En::separator(w)?;
                    En::write_value(w, cast::convert(v, d.disk_type))?;
                }
            }
            (_, list) => {
                let msg = if list.is_some() {
                    "list descriptor for scalar field"
                } else {
                    "scalar descriptor for list field"
                };
                return Err(Error::invalid_descriptor(d.name, msg));
            }
        }
    }

    En::finish_element(w)?;
    Ok(())
}
