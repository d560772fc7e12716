//! Schema-driven decode and encode entry points
//!
//! [`decode`] pulls tags off a [`BytesReader`] and dispatches each one
//! against the message's [`MessageSchema`]: known fields are converted to
//! their semantic type, unknown fields are captured verbatim. [`encode`]
//! walks a [`Message`] in canonical order (ascending field number, then the
//! preserved unknown fields) and writes it back out. Any field-level failure
//! aborts the whole operation; there is no partial decode.

use crate::errors::{Error, Result};
use crate::message::{FieldValue, Message, Value};
use crate::reader::BytesReader;
use crate::schema::{Cardinality, FieldDef, FieldKind, MessageSchema};
use crate::sizeofs::{
    sizeof_bool, sizeof_enum, sizeof_int32, sizeof_int64, sizeof_len, sizeof_sint32,
    sizeof_sint64, sizeof_tag, sizeof_uint32, sizeof_uint64,
};
use crate::wire::WireType;
use crate::writer::{Writer, WriterBackend};
use log::debug;
use std::borrow::Cow;

/// Decodes a whole message against its schema
///
/// The empty buffer decodes to the empty message; zero tag/value pairs is a
/// legal encoding.
pub fn decode<'a>(bytes: &'a [u8], schema: &MessageSchema) -> Result<Message<'a>> {
    let mut reader = BytesReader::from_bytes(bytes);
    decode_message(&mut reader, bytes, schema)
}

/// Encodes a message against its schema into a new buffer
///
/// Known fields are written in ascending field-number order, packed-eligible
/// repeated fields in the form the schema declares, and preserved unknown
/// fields afterwards, byte-for-byte as captured.
pub fn encode(message: &Message, schema: &MessageSchema) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded_len(message, schema)?);
    let mut writer = Writer::new(&mut out);
    write_message(&mut writer, message, schema)?;
    Ok(out)
}

/// Encodes a message into an existing writer, e.g. a fixed [`crate::BytesWriter`]
pub fn encode_into<W: WriterBackend>(
    writer: &mut Writer<W>,
    message: &Message,
    schema: &MessageSchema,
) -> Result<()> {
    write_message(writer, message, schema)
}

/// Exact number of bytes [`encode`] will produce for this message
pub fn encoded_len(message: &Message, schema: &MessageSchema) -> Result<usize> {
    let mut total = 0;
    for (number, slot) in message.fields() {
        let def = schema
            .field(number)
            .ok_or(Error::NoSuchField { field: number })?;
        match slot {
            FieldValue::Single(value) => total += field_len(def, value)?,
            FieldValue::Repeated(values) => total += repeated_len(def, values)?,
        }
    }
    for unknown in message.unknown_fields() {
        total += unknown.bytes.len();
    }
    Ok(total)
}

fn decode_message<'a>(
    reader: &mut BytesReader,
    bytes: &'a [u8],
    schema: &MessageSchema,
) -> Result<Message<'a>> {
    let mut message = Message::new();
    loop {
        let tag_start = reader.position();
        let tag = match reader.next_tag(bytes)? {
            Some(tag) => tag,
            None => break,
        };
        match schema.field(tag.field) {
            Some(def) => decode_field(reader, bytes, def, tag.wire_type, &mut message)?,
            None => {
                reader.skip_field(bytes, tag)?;
                let raw = &bytes[tag_start..reader.position()];
                debug!(
                    "{}: preserving unknown field {} ({} bytes)",
                    schema.name,
                    tag.field,
                    raw.len()
                );
                message.push_unknown(tag.field, raw);
            }
        }
    }
    Ok(message)
}

fn decode_field<'a>(
    reader: &mut BytesReader,
    bytes: &'a [u8],
    def: &FieldDef,
    wire_type: WireType,
    message: &mut Message<'a>,
) -> Result<()> {
    let element_wire = def.kind.wire_type();

    // A numeric kind arriving length-delimited is the packed form. Both
    // packed and unpacked representations of a repeated field must decode
    // into the same container, whatever the schema's own packed flag says.
    if wire_type == WireType::LengthDelimited && element_wire != WireType::LengthDelimited {
        if def.cardinality != Cardinality::Repeated || !def.kind.packable() {
            return Err(Error::WireTypeMismatch {
                field: def.number,
                actual: wire_type,
                expected: element_wire,
            });
        }
        let payload = reader.read_length_delimited(bytes, def.number)?;
        let mut packed = BytesReader::from_bytes(payload);
        while !packed.is_eof() {
            let value = read_scalar(&mut packed, payload, &def.kind, def.number)?;
            message.push(def.number, value);
        }
        return Ok(());
    }

    if wire_type != element_wire {
        return Err(Error::WireTypeMismatch {
            field: def.number,
            actual: wire_type,
            expected: element_wire,
        });
    }

    let value = read_value(reader, bytes, &def.kind, def.number)?;
    match def.cardinality {
        Cardinality::Repeated => message.push(def.number, value),
        _ => message.set(def.number, value),
    }
    Ok(())
}

fn read_value<'a>(
    reader: &mut BytesReader,
    bytes: &'a [u8],
    kind: &FieldKind,
    field: u32,
) -> Result<Value<'a>> {
    match kind {
        FieldKind::String => {
            let payload = reader.read_length_delimited(bytes, field)?;
            let s = ::std::str::from_utf8(payload).map_err(|source| Error::Utf8 { field, source })?;
            Ok(Value::String(Cow::Borrowed(s)))
        }
        FieldKind::Bytes => {
            let payload = reader.read_length_delimited(bytes, field)?;
            Ok(Value::Bytes(Cow::Borrowed(payload)))
        }
        FieldKind::Message(sub) => {
            let payload = reader.read_length_delimited(bytes, field)?;
            let mut nested = BytesReader::from_bytes(payload);
            Ok(Value::Message(decode_message(&mut nested, payload, sub)?))
        }
        scalar => read_scalar(reader, bytes, scalar, field),
    }
}

fn read_scalar<'a>(
    reader: &mut BytesReader,
    bytes: &[u8],
    kind: &FieldKind,
    field: u32,
) -> Result<Value<'a>> {
    Ok(match kind {
        FieldKind::Double => Value::Double(reader.read_double(bytes)?),
        FieldKind::Float => Value::Float(reader.read_float(bytes)?),
        FieldKind::Int32 => Value::Int32(reader.read_int32(bytes)?),
        FieldKind::Int64 => Value::Int64(reader.read_int64(bytes)?),
        FieldKind::Uint32 => Value::Uint32(reader.read_uint32(bytes)?),
        FieldKind::Uint64 => Value::Uint64(reader.read_uint64(bytes)?),
        FieldKind::Sint32 => Value::Sint32(reader.read_sint32(bytes)?),
        FieldKind::Sint64 => Value::Sint64(reader.read_sint64(bytes)?),
        FieldKind::Fixed32 => Value::Fixed32(reader.read_fixed32(bytes)?),
        FieldKind::Fixed64 => Value::Fixed64(reader.read_fixed64(bytes)?),
        FieldKind::Sfixed32 => Value::Sfixed32(reader.read_sfixed32(bytes)?),
        FieldKind::Sfixed64 => Value::Sfixed64(reader.read_sfixed64(bytes)?),
        FieldKind::Bool => Value::Bool(reader.read_bool(bytes)?),
        FieldKind::Enum => Value::Enum(reader.read_enum(bytes)?),
        FieldKind::String | FieldKind::Bytes | FieldKind::Message(_) => {
            return Err(Error::ValueKindMismatch { field })
        }
    })
}

fn write_message<W: WriterBackend>(
    writer: &mut Writer<W>,
    message: &Message,
    schema: &MessageSchema,
) -> Result<()> {
    for (number, slot) in message.fields() {
        let def = schema
            .field(number)
            .ok_or(Error::NoSuchField { field: number })?;
        match slot {
            FieldValue::Single(value) => write_field(writer, def, value)?,
            FieldValue::Repeated(values) => write_repeated(writer, def, values)?,
        }
    }
    for unknown in message.unknown_fields() {
        writer.write_raw(&unknown.bytes)?;
    }
    Ok(())
}

fn write_repeated<W: WriterBackend>(
    writer: &mut Writer<W>,
    def: &FieldDef,
    values: &[Value],
) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }
    if def.packed && def.kind.packable() {
        let mut payload = 0;
        for value in values {
            payload += scalar_len(&def.kind, value, def.number)?;
        }
        writer.write_tag(def.number, WireType::LengthDelimited)?;
        writer.write_varint(payload as u64)?;
        for value in values {
            write_scalar(writer, &def.kind, value, def.number)?;
        }
        return Ok(());
    }
    for value in values {
        write_field(writer, def, value)?;
    }
    Ok(())
}

fn write_field<W: WriterBackend>(writer: &mut Writer<W>, def: &FieldDef, value: &Value) -> Result<()> {
    match (&def.kind, value) {
        (FieldKind::String, Value::String(s)) => {
            writer.write_tag(def.number, WireType::LengthDelimited)?;
            writer.write_string(s)
        }
        (FieldKind::Bytes, Value::Bytes(b)) => {
            writer.write_tag(def.number, WireType::LengthDelimited)?;
            writer.write_bytes(b)
        }
        (FieldKind::Message(sub), Value::Message(nested)) => {
            writer.write_tag(def.number, WireType::LengthDelimited)?;
            writer.write_varint(encoded_len(nested, sub)? as u64)?;
            write_message(writer, nested, sub)
        }
        (kind, value) => {
            writer.write_tag(def.number, kind.wire_type())?;
            write_scalar(writer, kind, value, def.number)
        }
    }
}

fn write_scalar<W: WriterBackend>(
    writer: &mut Writer<W>,
    kind: &FieldKind,
    value: &Value,
    field: u32,
) -> Result<()> {
    match (kind, value) {
        (FieldKind::Double, Value::Double(v)) => writer.write_double(*v),
        (FieldKind::Float, Value::Float(v)) => writer.write_float(*v),
        (FieldKind::Int32, Value::Int32(v)) => writer.write_int32(*v),
        (FieldKind::Int64, Value::Int64(v)) => writer.write_int64(*v),
        (FieldKind::Uint32, Value::Uint32(v)) => writer.write_uint32(*v),
        (FieldKind::Uint64, Value::Uint64(v)) => writer.write_uint64(*v),
        (FieldKind::Sint32, Value::Sint32(v)) => writer.write_sint32(*v),
        (FieldKind::Sint64, Value::Sint64(v)) => writer.write_sint64(*v),
        (FieldKind::Fixed32, Value::Fixed32(v)) => writer.write_fixed32(*v),
        (FieldKind::Fixed64, Value::Fixed64(v)) => writer.write_fixed64(*v),
        (FieldKind::Sfixed32, Value::Sfixed32(v)) => writer.write_sfixed32(*v),
        (FieldKind::Sfixed64, Value::Sfixed64(v)) => writer.write_sfixed64(*v),
        (FieldKind::Bool, Value::Bool(v)) => writer.write_bool(*v),
        (FieldKind::Enum, Value::Enum(v)) => writer.write_enum(*v),
        _ => Err(Error::ValueKindMismatch { field }),
    }
}

fn field_len(def: &FieldDef, value: &Value) -> Result<usize> {
    Ok(match (&def.kind, value) {
        (FieldKind::String, Value::String(s)) => {
            sizeof_tag(def.number, WireType::LengthDelimited) + sizeof_len(s.len())
        }
        (FieldKind::Bytes, Value::Bytes(b)) => {
            sizeof_tag(def.number, WireType::LengthDelimited) + sizeof_len(b.len())
        }
        (FieldKind::Message(sub), Value::Message(nested)) => {
            sizeof_tag(def.number, WireType::LengthDelimited)
                + sizeof_len(encoded_len(nested, sub)?)
        }
        (kind, value) => {
            sizeof_tag(def.number, kind.wire_type()) + scalar_len(kind, value, def.number)?
        }
    })
}

fn repeated_len(def: &FieldDef, values: &[Value]) -> Result<usize> {
    if values.is_empty() {
        return Ok(0);
    }
    if def.packed && def.kind.packable() {
        let mut payload = 0;
        for value in values {
            payload += scalar_len(&def.kind, value, def.number)?;
        }
        return Ok(sizeof_tag(def.number, WireType::LengthDelimited) + sizeof_len(payload));
    }
    let mut total = 0;
    for value in values {
        total += field_len(def, value)?;
    }
    Ok(total)
}

fn scalar_len(kind: &FieldKind, value: &Value, field: u32) -> Result<usize> {
    Ok(match (kind, value) {
        (FieldKind::Double, Value::Double(_)) => 8,
        (FieldKind::Float, Value::Float(_)) => 4,
        (FieldKind::Int32, Value::Int32(v)) => sizeof_int32(*v),
        (FieldKind::Int64, Value::Int64(v)) => sizeof_int64(*v),
        (FieldKind::Uint32, Value::Uint32(v)) => sizeof_uint32(*v),
        (FieldKind::Uint64, Value::Uint64(v)) => sizeof_uint64(*v),
        (FieldKind::Sint32, Value::Sint32(v)) => sizeof_sint32(*v),
        (FieldKind::Sint64, Value::Sint64(v)) => sizeof_sint64(*v),
        (FieldKind::Fixed32, Value::Fixed32(_)) => 4,
        (FieldKind::Fixed64, Value::Fixed64(_)) => 8,
        (FieldKind::Sfixed32, Value::Sfixed32(_)) => 4,
        (FieldKind::Sfixed64, Value::Sfixed64(_)) => 8,
        (FieldKind::Bool, Value::Bool(v)) => sizeof_bool(*v),
        (FieldKind::Enum, Value::Enum(v)) => sizeof_enum(*v),
        _ => return Err(Error::ValueKindMismatch { field }),
    })
}
