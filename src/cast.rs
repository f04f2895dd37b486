//! Casting between the PLY primitive types at runtime.
//!
//! A property can have one type on disk and another one in memory, e.g. a
//! `uchar` color channel that is stored in a `f32` field. This module bridges
//! the two. All casts are plain numeric casts with Rust's `as` semantics:
//!
//! - integer → integer: widening keeps the value, narrowing truncates
//!   silently (`300i32` becomes `44u8`), just like classic PLY tooling does.
//! - integer → float: the value is converted directly. There is *no*
//!   normalization: `255u8` becomes `255.0`, not `1.0`.
//! - float → integer: rounds towards zero and saturates at the bounds of the
//!   target type.
//! - float → float: changes precision only.
//!
//! Every pair of the eight primitive types can be converted that way. The
//! only place where a type is actually rejected is the length of a list
//! property, which has to be an unsigned integer (see [`check_conversion`]).
//!
//! ```
//! use plyvert::{cast, io::{PrimitiveType, PrimitiveValue}};
//!
//! let v = cast::convert(PrimitiveValue::Uint8(255), PrimitiveType::Float32);
//! assert_eq!(v, PrimitiveValue::Float32(255.0));
//!
//! let v = cast::convert(PrimitiveValue::Int32(300), PrimitiveType::Uint8);
//! assert_eq!(v, PrimitiveValue::Uint8(44));
//! ```

use num_traits::AsPrimitive;

use crate::io::{Error, PrimitiveType, PrimitiveValue};


/// Casts `x` into a `PrimitiveValue` of the type `$to`.
macro_rules! cast_to {
    ($x:expr, $to:expr) => {
        match $to {
            PrimitiveType::Int8 => PrimitiveValue::Int8($x.as_()),
            PrimitiveType::Uint8 => PrimitiveValue::Uint8($x.as_()),
            PrimitiveType::Int16 => PrimitiveValue::Int16($x.as_()),
            PrimitiveType::Uint16 => PrimitiveValue::Uint16($x.as_()),
            PrimitiveType::Int32 => PrimitiveValue::Int32($x.as_()),
            PrimitiveType::Uint32 => PrimitiveValue::Uint32($x.as_()),
            PrimitiveType::Float32 => PrimitiveValue::Float32($x.as_()),
            PrimitiveType::Float64 => PrimitiveValue::Float64($x.as_()),
        }
    }
}

/// Converts `value` into a value of type `to`. See the module documentation
/// for the exact semantics.
#[inline]
pub fn convert(value: PrimitiveValue, to: PrimitiveType) -> PrimitiveValue {
    if value.ty() == to {
        return value;
    }

    match value {
        PrimitiveValue::Int8(x) => cast_to!(x, to),
        PrimitiveValue::Uint8(x) => cast_to!(x, to),
        PrimitiveValue::Int16(x) => cast_to!(x, to),
        PrimitiveValue::Uint16(x) => cast_to!(x, to),
        PrimitiveValue::Int32(x) => cast_to!(x, to),
        PrimitiveValue::Uint32(x) => cast_to!(x, to),
        PrimitiveValue::Float32(x) => cast_to!(x, to),
        PrimitiveValue::Float64(x) => cast_to!(x, to),
    }
}

/// Like [`convert`], but first checks that `value` really has the type
/// `from` and that the pair `from → to` is supported.
pub fn convert_checked(
    value: PrimitiveValue,
    from: PrimitiveType,
    to: PrimitiveType,
) -> Result<PrimitiveValue, Error> {
    if value.ty() != from {
        return Err(Error::UnsupportedConversion { from: value.ty(), to });
    }
    check_conversion(from, to, false)?;

    Ok(convert(value, to))
}

/// Checks whether values of type `from` can be converted into `to`.
///
/// Plain values can always be converted. If `is_list_count` is `true`, `from`
/// is the type of the length of a list property: only `uchar`, `ushort` and
/// `uint` are allowed there, as a negative or fractional length would need a
/// conversion we refuse to guess.
pub fn check_conversion(
    from: PrimitiveType,
    to: PrimitiveType,
    is_list_count: bool,
) -> Result<(), Error> {
    if is_list_count && !from.is_unsigned_integer() {
        return Err(Error::UnsupportedConversion { from, to });
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    use PrimitiveType::*;
    use PrimitiveValue as V;

    #[test]
    fn same_type_is_identity() {
        assert_eq!(convert(V::Float64(0.1), Float64), V::Float64(0.1));
        assert_eq!(convert(V::Int8(-7), Int8), V::Int8(-7));
    }

    #[test]
    fn integer_widening() {
        assert_eq!(convert(V::Uint8(200), Uint32), V::Uint32(200));
        assert_eq!(convert(V::Int8(-3), Int32), V::Int32(-3));
        assert_eq!(convert(V::Uint16(65535), Int32), V::Int32(65535));
    }

    #[test]
    fn integer_narrowing_truncates() {
        assert_eq!(convert(V::Int32(300), Uint8), V::Uint8(44));
        assert_eq!(convert(V::Int32(-1), Uint32), V::Uint32(u32::max_value()));
        assert_eq!(convert(V::Uint32(70_000), Int16), V::Int16(4464));
    }

    #[test]
    fn integer_to_float_is_not_normalized() {
        assert_eq!(convert(V::Uint8(255), Float32), V::Float32(255.0));
        assert_eq!(convert(V::Uint8(0), Float64), V::Float64(0.0));
        assert_eq!(convert(V::Int16(-12), Float32), V::Float32(-12.0));
    }

    #[test]
    fn float_to_integer() {
        assert_eq!(convert(V::Float32(255.0), Uint8), V::Uint8(255));
        assert_eq!(convert(V::Float64(3.9), Int32), V::Int32(3));
        assert_eq!(convert(V::Float32(-1.0), Uint8), V::Uint8(0));
        assert_eq!(convert(V::Float32(1000.0), Uint8), V::Uint8(255));
    }

    #[test]
    fn float_precision() {
        assert_eq!(convert(V::Float32(0.5), Float64), V::Float64(0.5));
        assert_eq!(convert(V::Float64(0.1), Float32), V::Float32(0.1));
    }

    #[test]
    fn all_u8_values_survive_float_round_trip() {
        for i in 0..=255u8 {
            let f = convert(V::Uint8(i), Float32);
            assert_eq!(convert(f, Uint8), V::Uint8(i));
        }
    }

    #[test]
    fn list_counts_must_be_unsigned() {
        assert!(check_conversion(Uint8, Uint32, true).is_ok());
        assert!(check_conversion(Uint16, Uint32, true).is_ok());
        assert!(check_conversion(Uint32, Uint32, true).is_ok());

        match check_conversion(Int32, Uint32, true) {
            Err(Error::UnsupportedConversion { from: Int32, to: Uint32 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(check_conversion(Float32, Uint32, true).is_err());
    }

    #[test]
    fn plain_values_always_convert() {
        for &from in &[Int8, Uint8, Int16, Uint16, Int32, Uint32, Float32, Float64] {
            for &to in &[Int8, Uint8, Int16, Uint16, Int32, Uint32, Float32, Float64] {
                assert!(check_conversion(from, to, false).is_ok());
            }
        }
    }

    #[test]
    fn checked_rejects_wrong_source_type() {
        assert_eq!(
            convert_checked(V::Uint8(7), Uint8, Float64).unwrap(),
            V::Float64(7.0),
        );
        match convert_checked(V::Uint8(7), Int16, Float64) {
            Err(Error::UnsupportedConversion { from: Uint8, to: Float64 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
