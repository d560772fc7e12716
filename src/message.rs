//! The materialized form of a decoded protobuf message
//!
//! A [`Message`] maps field numbers to decoded [`Value`]s, keeps repeated
//! values in encounter order, and carries unrecognized fields byte-for-byte
//! so re-encoding loses nothing. String and bytes payloads borrow from the
//! input buffer; `Cow` lets callers build messages from owned data too.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// One decoded field payload
///
/// The variant records the schema kind the payload was decoded as, not just
/// the wire framing, so `sint32` and `int32` stay distinguishable after
/// decode and re-encode picks the right mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// 64-bit IEEE float
    Double(f64),
    /// 32-bit IEEE float
    Float(f32),
    /// `int32`
    Int32(i32),
    /// `int64`
    Int64(i64),
    /// `uint32`
    Uint32(u32),
    /// `uint64`
    Uint64(u64),
    /// `sint32`
    Sint32(i32),
    /// `sint64`
    Sint64(i64),
    /// `fixed32`
    Fixed32(u32),
    /// `fixed64`
    Fixed64(u64),
    /// `sfixed32`
    Sfixed32(i32),
    /// `sfixed64`
    Sfixed64(i64),
    /// `bool`
    Bool(bool),
    /// Enum wire value; unrecognized ordinals pass through untouched
    Enum(i32),
    /// `string`, borrowed from the input on decode
    String(Cow<'a, str>),
    /// `bytes`, borrowed from the input on decode
    Bytes(Cow<'a, [u8]>),
    /// Nested message
    Message(Message<'a>),
}

/// Values stored under one field number
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Non-repeated slot; last write wins
    Single(Value<'a>),
    /// Repeated container in encounter order
    Repeated(Vec<Value<'a>>),
}

/// An unrecognized field kept byte-for-byte for re-encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField<'a> {
    /// Field number the bytes were tagged with
    pub number: u32,
    /// Tag and payload exactly as they appeared on the wire
    pub bytes: Cow<'a, [u8]>,
}

/// A decoded (or to-be-encoded) protobuf message
///
/// Field numbers iterate in ascending order; values within a repeated field
/// keep the order they were pushed. Empty is a valid message: zero tag/value
/// pairs is a legal protobuf encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message<'a> {
    fields: BTreeMap<u32, FieldValue<'a>>,
    unknown: Vec<UnknownField<'a>>,
}

impl<'a> Message<'a> {
    /// Creates an empty message
    pub fn new() -> Self {
        Message::default()
    }

    /// Overwrites the single-value slot for a field
    pub fn set(&mut self, number: u32, value: Value<'a>) {
        self.fields.insert(number, FieldValue::Single(value));
    }

    /// Appends to a field's repeated container, creating it on first use
    ///
    /// Pushing onto a number previously written with [`Message::set`] turns
    /// the slot into a repeated container holding both values.
    pub fn push(&mut self, number: u32, value: Value<'a>) {
        if let Some(FieldValue::Repeated(values)) = self.fields.get_mut(&number) {
            values.push(value);
            return;
        }
        let values = match self.fields.remove(&number) {
            Some(FieldValue::Single(prev)) => vec![prev, value],
            _ => vec![value],
        };
        self.fields.insert(number, FieldValue::Repeated(values));
    }

    /// Records an unrecognized field's raw bytes, in encounter order
    pub fn push_unknown(&mut self, number: u32, bytes: impl Into<Cow<'a, [u8]>>) {
        self.unknown.push(UnknownField {
            number,
            bytes: bytes.into(),
        });
    }

    /// The value stored under a field number
    ///
    /// For a repeated field this is the last element, which matches the
    /// last-write-wins reading of a non-repeated slot.
    pub fn get(&self, number: u32) -> Option<&Value<'a>> {
        match self.fields.get(&number)? {
            FieldValue::Single(v) => Some(v),
            FieldValue::Repeated(values) => values.last(),
        }
    }

    /// All values stored under a field number, empty when absent
    pub fn get_repeated(&self, number: u32) -> &[Value<'a>] {
        match self.fields.get(&number) {
            Some(FieldValue::Single(v)) => std::slice::from_ref(v),
            Some(FieldValue::Repeated(values)) => values,
            None => &[],
        }
    }

    /// Iterates `(field number, slot)` pairs in ascending field-number order
    pub fn fields(&self) -> impl Iterator<Item = (u32, &FieldValue<'a>)> + '_ {
        self.fields.iter().map(|(n, fv)| (*n, fv))
    }

    /// Unrecognized fields in the order they were encountered
    pub fn unknown_fields(&self) -> &[UnknownField<'a>] {
        &self.unknown
    }

    /// True when the message holds no fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.unknown.is_empty()
    }
}
