//! A library to read and write binary protobuf messages against known schemas
//!
//! The reader is developed similarly to a pull reader: a cursor walks the
//! buffer tag by tag and a schema decides what each field number means. No
//! generated struct types are involved; decoding materializes a dynamic
//! [`Message`] and encoding writes one back out, preserving any fields the
//! schema does not know about.
//!
//! ```rust
//! use proto_parse::{decode, encode, Cardinality, FieldDef, FieldKind, MessageSchema, Value};
//!
//! let schema = MessageSchema::new(
//!     "proto.Timestamp",
//!     vec![
//!         FieldDef::new(1, "seconds", FieldKind::Int64, Cardinality::Optional),
//!         FieldDef::new(2, "nanos", FieldKind::Int32, Cardinality::Optional),
//!     ],
//! );
//!
//! let message = decode(&[0x08, 0x96, 0x01], &schema).expect("valid protobuf");
//! assert_eq!(message.get(1), Some(&Value::Int64(150)));
//!
//! let bytes = encode(&message, &schema).expect("well-formed message");
//! assert_eq!(bytes, [0x08, 0x96, 0x01]);
//! ```

#![deny(missing_docs)]

pub mod codec;
pub mod errors;
pub mod message;
pub mod reader;
pub mod schema;
pub mod sizeofs;
pub mod wire;
pub mod writer;

pub use crate::{
    codec::{decode, encode, encode_into, encoded_len},
    errors::{Error, Result},
    message::{FieldValue, Message, UnknownField, Value},
    reader::BytesReader,
    schema::{Cardinality, FieldDef, FieldKind, MessageSchema},
    wire::{Tag, WireType},
    writer::{BytesWriter, Writer, WriterBackend},
};
