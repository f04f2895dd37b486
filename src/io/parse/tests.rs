use super::{Error, Input, is_whitespace, buf::Buffer};


fn buffer(data: &[u8]) -> Buffer<&[u8]> {
    Buffer::new(data).unwrap()
}

#[test]
fn take_until_stops_at_stopper() {
    let mut buf = buffer(b"hello world");
    let word = buf.take_until(b' ', |sd| Ok(sd.data.to_vec())).unwrap();
    assert_eq!(word, b"hello");
    assert_eq!(buf.offset(), 5);
    assert_eq!(&*buf, b" world");
}

#[test]
fn take_until_accepts_eof_as_stopper() {
    let mut buf = buffer(b"  42");
    buf.skip_until(|b| !is_whitespace(b)).unwrap();
    let n = buf.take_until(is_whitespace, |sd| Ok(sd.assert_ascii()?.parse::<u32>().unwrap()))
        .unwrap();
    assert_eq!(n, 42);
    assert!(buf.is_eof().unwrap());
}

#[test]
fn take_until_at_eof_is_error() {
    let mut buf = buffer(b"");
    let res = buf.take_until(b' ', |_| Ok(()));
    match res {
        Err(Error::UnexpectedEof(0)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn prepare_beyond_end() {
    let mut buf = buffer(b"abc");
    assert!(buf.prepare(3).is_ok());
    match buf.prepare(4) {
        Err(Error::UnexpectedEof(3)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn expect_tag() {
    let mut buf = buffer(b"ply\nformat");
    assert!(buf.expect_tag(b"ply\n").is_ok());
    buf.prepare(6).unwrap();
    assert!(buf.starts_with(b"format"));
    match buf.expect_tag(b"element") {
        Err(Error::UnexpectedEof(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn grows_for_long_lines() {
    let mut data = vec![b'a'; 100_000];
    data.push(b'\n');
    let mut buf = buffer(&data);
    let len = buf.take_until(b'\n', |sd| Ok(sd.data.len())).unwrap();
    assert_eq!(len, 100_000);
    buf.prepare(1).unwrap();
    assert!(buf.starts_with(b"\n"));
}
