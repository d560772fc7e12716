//! Message schemas handed to the codec by generated accessor code
//!
//! A [`MessageSchema`] is built once per message type, typically by codegen
//! from a `.proto` definition, and reused across every decode and encode
//! call. Field lookup is a binary search over a number-sorted table, so
//! dispatching a tag costs no runtime type inspection.

use crate::wire::{WireType, MAX_FIELD_NUMBER};
use std::sync::Arc;

/// Semantic type of a field, the schema-side counterpart of a wire type
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// 64-bit IEEE float, FIXED64 framing
    Double,
    /// 32-bit IEEE float, FIXED32 framing
    Float,
    /// Varint, sign-extended when negative
    Int32,
    /// Varint
    Int64,
    /// Varint
    Uint32,
    /// Varint
    Uint64,
    /// Zig-zag varint
    Sint32,
    /// Zig-zag varint
    Sint64,
    /// Four bytes little endian, unsigned
    Fixed32,
    /// Eight bytes little endian, unsigned
    Fixed64,
    /// Four bytes little endian, signed
    Sfixed32,
    /// Eight bytes little endian, signed
    Sfixed64,
    /// Varint, zero is false
    Bool,
    /// Varint holding the enum's int32 wire value
    Enum,
    /// Length-delimited utf-8
    String,
    /// Length-delimited raw bytes
    Bytes,
    /// Length-delimited nested message decoded with its own schema
    Message(Arc<MessageSchema>),
}

impl FieldKind {
    /// Wire framing a single value of this kind is encoded with
    ///
    /// Repeated packable kinds may additionally arrive length-delimited; the
    /// dispatcher handles that case from the cardinality and `packed` flag.
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::Uint32
            | FieldKind::Uint64
            | FieldKind::Sint32
            | FieldKind::Sint64
            | FieldKind::Bool
            | FieldKind::Enum => WireType::Varint,
            FieldKind::Fixed64 | FieldKind::Sfixed64 | FieldKind::Double => WireType::Fixed64,
            FieldKind::Fixed32 | FieldKind::Sfixed32 | FieldKind::Float => WireType::Fixed32,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => {
                WireType::LengthDelimited
            }
        }
    }

    /// Whether a repeated field of this kind may use the packed encoding
    ///
    /// Only numeric scalars pack; strings, bytes and messages always carry
    /// one tag per element.
    pub fn packable(&self) -> bool {
        !matches!(
            self,
            FieldKind::String | FieldKind::Bytes | FieldKind::Message(_)
        )
    }
}

/// How many values of a field a message may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one value; last write wins on the wire
    Optional,
    /// Exactly one value; tracked for generators, not enforced by the decoder
    Required,
    /// Any number of values, in encounter order
    Repeated,
}

/// One field entry in a message schema
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field number on the wire, in `1..=MAX_FIELD_NUMBER`
    pub number: u32,
    /// Field name, used in debug output only
    pub name: &'static str,
    /// Semantic type
    pub kind: FieldKind,
    /// How many values the field may carry
    pub cardinality: Cardinality,
    /// Repeated numeric values concatenated into one length-delimited blob
    pub packed: bool,
}

impl FieldDef {
    /// Creates an unpacked field definition
    ///
    /// Panics when `number` is outside the legal field-number range.
    pub fn new(number: u32, name: &'static str, kind: FieldKind, cardinality: Cardinality) -> Self {
        assert!(
            number >= 1 && number <= MAX_FIELD_NUMBER,
            "field number {number} out of range"
        );
        FieldDef {
            number,
            name,
            kind,
            cardinality,
            packed: false,
        }
    }

    /// Creates a packed repeated field definition
    ///
    /// Panics when the kind cannot pack or the number is out of range.
    pub fn packed(number: u32, name: &'static str, kind: FieldKind) -> Self {
        assert!(kind.packable(), "field {name} has a non-packable kind");
        let mut def = FieldDef::new(number, name, kind, Cardinality::Repeated);
        def.packed = true;
        def
    }
}

/// Field layout of one message type
///
/// Holds the fields sorted by number; built once and shared (behind [`Arc`]
/// for nested use) across all codec calls.
#[derive(Debug, Clone)]
pub struct MessageSchema {
    /// Message name, e.g. `"proto.Timestamp"`, used in debug output only
    pub name: &'static str,
    fields: Vec<FieldDef>,
}

impl MessageSchema {
    /// Builds a schema from its field definitions, sorting by field number
    ///
    /// Panics when two definitions share a number.
    pub fn new(name: &'static str, mut fields: Vec<FieldDef>) -> Self {
        fields.sort_by_key(|f| f.number);
        for pair in fields.windows(2) {
            assert!(
                pair[0].number != pair[1].number,
                "duplicate field number {} in {name}",
                pair[0].number
            );
        }
        MessageSchema { name, fields }
    }

    /// Looks up the definition for a field number, `None` when unknown
    ///
    /// An unknown number is not an error: the bytes may come from a newer
    /// schema revision, and the dispatcher preserves them verbatim.
    #[inline(always)]
    pub fn field(&self, number: u32) -> Option<&FieldDef> {
        self.fields
            .binary_search_by_key(&number, |f| f.number)
            .ok()
            .map(|i| &self.fields[i])
    }

    /// All field definitions in ascending field-number order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }
}
