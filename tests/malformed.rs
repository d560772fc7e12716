//! Hostile and truncated inputs must fail loudly, never decode wrong data

use lazy_static::lazy_static;
use proto_parse::{
    decode, encode, Cardinality, Error, FieldDef, FieldKind, Message, MessageSchema, Value,
};
use std::sync::Arc;

lazy_static! {
    static ref INNER: Arc<MessageSchema> = Arc::new(MessageSchema::new(
        "test.Inner",
        vec![FieldDef::new(1, "memo", FieldKind::String, Cardinality::Optional)],
    ));
    static ref SCHEMA: MessageSchema = MessageSchema::new(
        "test.Sample",
        vec![
            FieldDef::new(1, "count", FieldKind::Uint64, Cardinality::Optional),
            FieldDef::new(2, "memo", FieldKind::String, Cardinality::Optional),
            FieldDef::new(3, "stamp", FieldKind::Fixed64, Cardinality::Optional),
            FieldDef::new(
                4,
                "inner",
                FieldKind::Message(INNER.clone()),
                Cardinality::Optional
            ),
        ],
    );
}

/// Every truncation of a single-field encoding must fail; a shorter prefix
/// can never be mistaken for a complete smaller value.
fn assert_all_truncations_fail(bytes: &[u8]) {
    for cut in 1..bytes.len() {
        let err = decode(&bytes[..cut], &SCHEMA)
            .expect_err(&format!("decoded a {cut}-byte prefix of {bytes:02x?}"));
        assert!(
            matches!(
                err,
                Error::UnexpectedEndOfBuffer { .. } | Error::OverlongLength { .. }
            ),
            "unexpected error for {cut}-byte prefix: {err}"
        );
    }
}

#[test]
fn truncated_varint_field_fails() {
    let mut message = Message::new();
    message.set(1, Value::Uint64(u64::MAX));
    assert_all_truncations_fail(&encode(&message, &SCHEMA).unwrap());
}

#[test]
fn truncated_string_field_fails() {
    let mut message = Message::new();
    message.set(2, Value::String("a string long enough to cut anywhere".into()));
    assert_all_truncations_fail(&encode(&message, &SCHEMA).unwrap());
}

#[test]
fn truncated_fixed64_field_fails() {
    let mut message = Message::new();
    message.set(3, Value::Fixed64(0x0102_0304_0506_0708));
    assert_all_truncations_fail(&encode(&message, &SCHEMA).unwrap());
}

#[test]
fn truncated_nested_message_fails() {
    let mut inner = Message::new();
    inner.set(1, Value::String("nested memo".into()));
    let mut message = Message::new();
    message.set(4, Value::Message(inner));
    assert_all_truncations_fail(&encode(&message, &SCHEMA).unwrap());
}

#[test]
fn length_prefix_past_end_fails() {
    // field 2, LENGTH_DELIMITED, claims 100 bytes with 2 present
    let bytes = [0x12, 100, b'h', b'i'];
    assert!(matches!(
        decode(&bytes, &SCHEMA),
        Err(Error::OverlongLength {
            field: 2,
            declared: 100,
            remaining: 2,
        })
    ));
}

#[test]
fn eleven_byte_varint_fails() {
    let mut bytes = vec![0x08];
    bytes.extend([0xff; 11]);
    assert!(matches!(
        decode(&bytes, &SCHEMA),
        Err(Error::Varint { offset: 1 })
    ));
}

#[test]
fn unknown_wire_type_fails() {
    for bits in [6u8, 7] {
        let bytes = [(1 << 3) | bits, 0x00];
        assert!(matches!(
            decode(&bytes, &SCHEMA),
            Err(Error::UnknownWireType { value, offset: 0 }) if value == bits
        ));
    }
}

#[test]
fn group_wire_types_fail() {
    for bits in [3u8, 4] {
        let bytes = [(1 << 3) | bits];
        assert!(matches!(
            decode(&bytes, &SCHEMA),
            Err(Error::DeprecatedGroup { offset: 0 })
        ));
    }
}

#[test]
fn field_number_zero_fails() {
    let bytes = [0x00, 0x01];
    assert!(matches!(
        decode(&bytes, &SCHEMA),
        Err(Error::InvalidFieldNumber { offset: 0 })
    ));
}

#[test]
fn invalid_utf8_in_string_field_fails() {
    // field 2, two bytes, 0xc3 starts a sequence 0x28 cannot continue
    let bytes = [0x12, 0x02, 0xc3, 0x28];
    assert!(matches!(
        decode(&bytes, &SCHEMA),
        Err(Error::Utf8 { field: 2, .. })
    ));
}

#[test]
fn packed_framing_on_non_repeated_numeric_fails() {
    // field 1 is an optional uint64; length-delimited framing is only
    // accepted for repeated packable fields
    let bytes = [0x0a, 0x01, 0x05];
    assert!(matches!(
        decode(&bytes, &SCHEMA),
        Err(Error::WireTypeMismatch { field: 1, .. })
    ));
}

#[test]
fn malformed_nested_message_aborts_outer_decode() {
    // field 4 wraps an inner message whose string field claims more bytes
    // than the inner payload holds
    let bytes = [0x22, 0x04, 0x0a, 0x7f, b'h', b'i'];
    assert!(matches!(
        decode(&bytes, &SCHEMA),
        Err(Error::OverlongLength { field: 1, .. })
    ));
}

#[test]
fn mid_tag_truncation_is_distinct_from_clean_end() {
    // a two-byte tag cut after its continuation byte
    let bytes = [0x80];
    assert!(matches!(
        decode(&bytes, &SCHEMA),
        Err(Error::UnexpectedEndOfBuffer { .. })
    ));
}

#[test]
fn errors_format_with_context() {
    let err = decode(&[0x12, 100, b'h', b'i'], &SCHEMA).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("field 2"), "missing context: {text}");
    assert!(text.contains("100"), "missing context: {text}");
}
