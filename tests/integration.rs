//! Integration tests: pack/unpack, offsets, streaming, and the compiled wrapper.

use structfmt::{
    calcsize, iter_unpack, pack, pack_into, spawn_iter_unpack, unpack, unpack_from, CodecError,
    Struct, Value,
};

fn collect(format: &str, buffer: &[u8]) -> Result<Vec<Value>, CodecError> {
    iter_unpack(format, buffer).collect()
}

#[test]
fn test_big_endian_short_then_int() {
    let bytes = pack(">hi", &[Value::I16(1), Value::I32(2)]).expect("pack");
    assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x00, 0x00, 0x02]);
    assert_eq!(calcsize(">hi").expect("size"), 6);
}

#[test]
fn test_little_endian_layout() {
    let bytes = pack("<HIq", &[Value::U16(0x0102), Value::U32(0x03040506), Value::I64(-1)])
        .expect("pack");
    assert_eq!(
        bytes,
        vec![0x02, 0x01, 0x06, 0x05, 0x04, 0x03, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
}

#[test]
fn test_network_order_matches_big_endian() {
    let values = [Value::U32(0xdeadbeef), Value::Float(1.5)];
    assert_eq!(
        pack("!If", &values).expect("network"),
        pack(">If", &values).expect("big")
    );
}

#[test]
fn test_round_trip_every_kind() {
    let format = "<bBhHiIlLqQfd?3s";
    let values = vec![
        Value::I8(-8),
        Value::U8(200),
        Value::I16(-1234),
        Value::U16(60000),
        Value::I32(-70000),
        Value::U32(4_000_000_000),
        Value::I32(i32::MIN),
        Value::U32(7),
        Value::I64(i64::MIN),
        Value::U64(u64::MAX),
        Value::Float(0.25),
        Value::Double(-2.5e100),
        Value::Bool(true),
        Value::from("abc"),
    ];
    let bytes = pack(format, &values).expect("pack");
    assert_eq!(bytes.len(), calcsize(format).expect("size"));
    assert_eq!(unpack(format, &bytes).expect("unpack"), values);
}

#[test]
fn test_repeat_count_equivalence() {
    let values = [Value::I16(1), Value::I16(-2), Value::I16(3)];
    assert_eq!(
        pack("3h", &values).expect("3h"),
        pack("hhh", &values).expect("hhh")
    );
}

#[test]
fn test_multi_digit_repeat_count() {
    let values: Vec<Value> = (0..12u8).map(Value::U8).collect();
    let bytes = pack("12B", &values).expect("pack");
    assert_eq!(bytes, (0..12u8).collect::<Vec<_>>());
    assert_eq!(unpack("12B", &bytes).expect("unpack"), values);
}

#[test]
fn test_size_additivity() {
    let a = "3h2q";
    let b = "5s?d";
    let joined = format!("{}{}", a, b);
    assert_eq!(
        calcsize(&joined).expect("joined"),
        calcsize(a).expect("a") + calcsize(b).expect("b")
    );
}

#[test]
fn test_pad_bytes() {
    let bytes = pack(">B2xB", &[Value::U8(1), Value::U8(2)]).expect("pack");
    assert_eq!(bytes, vec![1, 0, 0, 2]);
    assert_eq!(
        unpack(">B2xB", &[1, 9, 9, 2]).expect("unpack"),
        vec![Value::U8(1), Value::U8(2)]
    );
}

#[test]
fn test_text_is_one_value_per_item() {
    let bytes = pack("5s", &[Value::from("hello")]).expect("pack");
    assert_eq!(bytes, b"hello".to_vec());
    assert_eq!(unpack("5s", &bytes).expect("unpack"), vec![Value::from("hello")]);
}

#[test]
fn test_text_is_copied_verbatim() {
    // No padding to the declared length.
    let bytes = pack("5s", &[Value::from("hi")]).expect("pack");
    assert_eq!(bytes, b"hi".to_vec());
    let err = unpack("5s", &bytes).expect_err("short field");
    assert!(matches!(err, CodecError::SizeMismatch { expected: 5, actual: 2 }));
}

#[test]
fn test_non_utf8_text_comes_back_raw() {
    let buffer = [0, 7, b'c', b'a', b'f', 0xe9];
    let expected = vec![Value::U16(7), Value::Text(vec![b'c', b'a', b'f', 0xe9])];
    assert_eq!(unpack(">H4s", &buffer).expect("unpack"), expected);
    assert_eq!(collect(">H4s", &buffer).expect("iter"), expected);
    assert_eq!(expected[1].as_str(), None);
    assert_eq!(pack(">H4s", &expected).expect("pack"), buffer.to_vec());
}

#[test]
fn test_huge_pad_count_is_an_error() {
    let err = pack("9000000000000000000x", &[]).expect_err("unallocatable");
    assert!(matches!(err, CodecError::InvalidRepeatCount(_)));
    let err = calcsize("9223372036854775808x").expect_err("past isize::MAX");
    assert!(matches!(err, CodecError::InvalidRepeatCount(_)));
}

#[test]
fn test_unpack_size_mismatch_names_expected() {
    let err = unpack("i", &[0, 0]).expect_err("mismatch");
    assert!(matches!(err, CodecError::SizeMismatch { expected: 4, actual: 2 }));
    assert!(err.to_string().contains("4 bytes"));
}

#[test]
fn test_insufficient_arguments() {
    let err = pack("2i", &[Value::I32(1)]).expect_err("insufficient");
    assert!(matches!(err, CodecError::InsufficientArguments { expected: 2, got: 1 }));
}

#[test]
fn test_extra_arguments() {
    let err = pack("h", &[Value::I16(1), Value::I16(2), Value::I16(3)]).expect_err("extra");
    assert!(matches!(err, CodecError::ExtraArguments(2)));
}

#[test]
fn test_type_mismatch() {
    let err = pack("s", &[Value::I32(1)]).expect_err("text wanted");
    assert!(matches!(err, CodecError::TypeMismatch { code: 's', .. }));
    let err = pack("i", &[Value::from("1")]).expect_err("integer wanted");
    assert!(matches!(err, CodecError::TypeMismatch { code: 'i', found: "text", .. }));
    let err = pack("?", &[Value::U8(1)]).expect_err("bool wanted");
    assert!(matches!(err, CodecError::TypeMismatch { code: '?', .. }));
}

#[test]
fn test_integer_variants_are_interchangeable() {
    let a = pack("<h", &[Value::I64(-2)]).expect("i64 for h");
    let b = pack("<h", &[Value::I16(-2)]).expect("i16 for h");
    assert_eq!(a, b);
    assert!(pack("<f", &[Value::Double(0.5)]).is_ok());
}

#[test]
fn test_malformed_format_fails_before_output() {
    let err = pack("hz", &[Value::I16(1)]).expect_err("bad char");
    assert!(matches!(err, CodecError::BadChar('z')));
    let err = unpack("hz", &[0, 0]).expect_err("bad char");
    assert!(matches!(err, CodecError::BadChar('z')));
}

#[test]
fn test_pack_into_grows_with_zero_fill() {
    let mut buffer = vec![0xaa, 0xbb];
    let written = pack_into(">H", &mut buffer, 4, &[Value::U16(0x0102)]).expect("pack_into");
    assert_eq!(written, 2);
    assert_eq!(buffer, vec![0xaa, 0xbb, 0, 0, 1, 2]);
}

#[test]
fn test_pack_into_overwrites_in_place() {
    let mut buffer = vec![9u8; 6];
    pack_into("<H", &mut buffer, 1, &[Value::U16(0x0201)]).expect("pack_into");
    assert_eq!(buffer, vec![9, 1, 2, 9, 9, 9]);
}

#[test]
fn test_pack_into_propagates_pack_errors() {
    let mut buffer = vec![1, 2, 3];
    let err = pack_into("2h", &mut buffer, 0, &[Value::I16(1)]).expect_err("insufficient");
    assert!(matches!(err, CodecError::InsufficientArguments { .. }));
    assert_eq!(buffer, vec![1, 2, 3]);
}

#[test]
fn test_unpack_from_offset() {
    let buffer = [0xff, 0xff, 0x00, 0x05];
    assert_eq!(unpack_from(">H", &buffer, 2).expect("unpack_from"), vec![Value::U16(5)]);
    // Length is checked against the tail, not the whole buffer.
    let err = unpack_from(">H", &buffer, 1).expect_err("tail is 3 bytes");
    assert!(matches!(err, CodecError::SizeMismatch { expected: 2, actual: 3 }));
}

#[test]
fn test_unpack_from_out_of_range() {
    let err = unpack_from("B", &[1, 2], 2).expect_err("offset == len");
    assert!(matches!(err, CodecError::OffsetOutOfRange { offset: 2, len: 2 }));
}

#[test]
fn test_iter_unpack_matches_per_record_unpack() {
    let format = ">hB";
    let mut buffer = Vec::new();
    for i in 0..4i16 {
        buffer.extend(pack(format, &[Value::I16(i * 100), Value::U8(i as u8)]).expect("pack"));
    }
    let size = calcsize(format).expect("size");
    let mut expected = Vec::new();
    for chunk in buffer.chunks(size) {
        expected.extend(unpack(format, chunk).expect("unpack"));
    }
    assert_eq!(collect(format, &buffer).expect("iter"), expected);
    assert_eq!(expected.len(), 8);
}

#[test]
fn test_iter_unpack_not_multiple() {
    let mut it = iter_unpack("i", &[0u8; 6]);
    assert!(matches!(
        it.next(),
        Some(Err(CodecError::NotMultiple { record: 4, actual: 6 }))
    ));
    assert!(it.next().is_none());
}

#[test]
fn test_iter_unpack_zero_sized_format() {
    let err = collect("", &[]).expect_err("empty record");
    assert!(matches!(err, CodecError::EmptyRecord));
}

#[test]
fn test_iter_unpack_empty_buffer() {
    assert!(collect("h", &[]).expect("iter").is_empty());
}

#[test]
fn test_spawned_stream_yields_all_values() {
    let buffer: Vec<u8> = (1..=6).collect();
    let values: Vec<Value> = spawn_iter_unpack("<BH", buffer)
        .expect("spawn")
        .collect::<Result<_, _>>()
        .expect("values");
    assert_eq!(
        values,
        vec![Value::U8(1), Value::U16(0x0302), Value::U8(4), Value::U16(0x0605)]
    );
}

#[test]
fn test_spawned_stream_surfaces_single_error() {
    let items: Vec<_> = spawn_iter_unpack("i", vec![0u8; 5]).expect("spawn").collect();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(CodecError::NotMultiple { .. })));
}

#[test]
fn test_dropping_stream_stops_producer() {
    let buffer = vec![0u8; 4096];
    let mut stream = spawn_iter_unpack("B", buffer).expect("spawn");
    assert!(matches!(stream.next(), Some(Ok(Value::U8(0)))));
    // Drop joins the producer; this returns only if the producer stopped.
    drop(stream);
}

#[test]
fn test_compiled_struct_forwards_arguments() {
    let s = Struct::new(">hi").expect("compile");
    assert_eq!(s.size().expect("size"), 6);
    let bytes = s.pack(&[Value::I16(1), Value::I32(2)]).expect("pack");
    assert_eq!(bytes, vec![0, 1, 0, 0, 0, 2]);
    assert_eq!(s.unpack(&bytes).expect("unpack"), vec![Value::I16(1), Value::I32(2)]);

    let mut buffer = Vec::new();
    s.pack_into(&mut buffer, 2, &[Value::I16(3), Value::I32(4)]).expect("pack_into");
    assert_eq!(buffer, vec![0, 0, 0, 3, 0, 0, 0, 4]);
    assert_eq!(
        s.unpack_from(&buffer, 2).expect("unpack_from"),
        vec![Value::I16(3), Value::I32(4)]
    );

    let doubled = [bytes.clone(), bytes].concat();
    let streamed: Vec<Value> = s.iter_unpack(&doubled).collect::<Result<_, _>>().expect("iter");
    assert_eq!(streamed.len(), 4);
    let threaded: Vec<Value> = s
        .spawn_iter_unpack(doubled)
        .expect("spawn")
        .collect::<Result<_, _>>()
        .expect("stream");
    assert_eq!(streamed, threaded);
}

#[test]
fn test_compiled_struct_rejects_bad_format() {
    assert!(matches!(Struct::new("3"), Err(CodecError::MissingTypeCode(_))));
    let s: Struct = "<Q".parse().expect("from_str");
    assert_eq!(s.to_string(), "<Q");
    assert_eq!(s.format(), "<Q");
}
