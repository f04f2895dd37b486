use super::{
    Error, Primitive, PrimitiveType, PrimitiveValue,
    parse::{self, Span},
};


#[test]
fn type_names() {
    macro_rules! check {
        ($classic:literal $sized:literal => $variant:ident) => {{
            let exp = PrimitiveType::$variant;
            assert_eq!($classic.parse::<PrimitiveType>().unwrap(), exp);
            assert_eq!($sized.parse::<PrimitiveType>().unwrap(), exp);
            assert_eq!(exp.ply_type_name(), $classic);
            assert_eq!(exp.to_string(), $classic);
        }}
    }

    check!("char" "int8" => Int8);
    check!("uchar" "uint8" => Uint8);
    check!("short" "int16" => Int16);
    check!("ushort" "uint16" => Uint16);
    check!("int" "int32" => Int32);
    check!("uint" "uint32" => Uint32);
    check!("float" "float32" => Float32);
    check!("double" "float64" => Float64);
}

#[test]
fn invalid_type_names() {
    assert!("".parse::<PrimitiveType>().is_err());
    assert!("Float".parse::<PrimitiveType>().is_err());
    assert!("int64".parse::<PrimitiveType>().is_err());
    assert!("list".parse::<PrimitiveType>().is_err());
}

#[test]
fn type_properties() {
    assert_eq!(PrimitiveType::Uint8.len(), 1);
    assert_eq!(PrimitiveType::Int16.len(), 2);
    assert_eq!(PrimitiveType::Float32.len(), 4);
    assert_eq!(PrimitiveType::Float64.len(), 8);

    assert!(PrimitiveType::Float64.is_floating_point());
    assert!(!PrimitiveType::Int32.is_floating_point());
    assert!(PrimitiveType::Uint16.is_unsigned_integer());
    assert!(!PrimitiveType::Int8.is_unsigned_integer());

    assert_eq!(PrimitiveType::Uint8.max_list_len(), Some(255));
    assert_eq!(PrimitiveType::Uint16.max_list_len(), Some(65535));
    assert_eq!(PrimitiveType::Int32.max_list_len(), None);
}

#[test]
fn primitive_values() {
    assert_eq!(3u8.to_primitive_value(), PrimitiveValue::Uint8(3));
    assert_eq!((-1.5f64).to_primitive_value(), PrimitiveValue::Float64(-1.5));
    assert_eq!(PrimitiveValue::Int16(7).ty(), PrimitiveType::Int16);

    assert_eq!(u32::from_primitive_value(PrimitiveValue::Uint32(9)), Some(9));
    assert_eq!(u32::from_primitive_value(PrimitiveValue::Int32(9)), None);

    assert_eq!(PrimitiveValue::Uint16(300).as_unsigned_integer(), Some(300));
    assert_eq!(PrimitiveValue::Int32(3).as_unsigned_integer(), None);
}

#[test]
fn body_errors() {
    match Error::in_body(parse::Error::UnexpectedEof(17)) {
        Error::TruncatedStream { offset: 17 } => {}
        other => panic!("unexpected error: {:?}", other),
    }
    match Error::in_body(parse::Error::Custom("x".into(), Span::new(1, 2))) {
        Error::MalformedBody(_) => {}
        other => panic!("unexpected error: {:?}", other),
    }
    match Error::in_header(parse::Error::UnexpectedEof(3)) {
        Error::MalformedHeader(_) => {}
        other => panic!("unexpected error: {:?}", other),
    }
}
