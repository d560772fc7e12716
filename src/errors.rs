//! A module to handle decoding and encoding failures
//!
//! Every fallible operation in this crate returns [`Result`]. Decode errors
//! carry the byte offset or field number they originate from so a bad payload
//! can be pinned down without re-parsing.

use crate::wire::WireType;
use std::fmt;

/// An error while reading or writing protobuf bytes
#[derive(Debug)]
pub enum Error {
    /// A read reached past the end of the available bytes
    UnexpectedEndOfBuffer {
        /// Byte offset at which the cursor ran out of input
        offset: usize,
    },
    /// A varint still carried its continuation bit after ten bytes
    Varint {
        /// Byte offset of the first byte of the offending varint
        offset: usize,
    },
    /// A length prefix declared more bytes than the buffer holds
    OverlongLength {
        /// Field the length prefix belongs to
        field: u32,
        /// Length declared by the prefix
        declared: u64,
        /// Bytes actually remaining after the prefix
        remaining: usize,
    },
    /// A tag carried a wire type outside the supported set {0, 1, 2, 5}
    UnknownWireType {
        /// The 3-bit wire type value as read
        value: u8,
        /// Byte offset of the tag
        offset: usize,
    },
    /// A tag carried one of the deprecated group wire types (3 or 4)
    DeprecatedGroup {
        /// Byte offset of the tag
        offset: usize,
    },
    /// A tag carried field number zero or one past the 29-bit range
    InvalidFieldNumber {
        /// Byte offset of the tag
        offset: usize,
    },
    /// A field arrived with a wire type its schema entry cannot accept
    WireTypeMismatch {
        /// Field number from the tag
        field: u32,
        /// Wire type found on the wire
        actual: WireType,
        /// Wire type the schema expects for this field
        expected: WireType,
    },
    /// A string field's payload was not valid utf-8
    Utf8 {
        /// Field number of the string field
        field: u32,
        /// The underlying utf-8 error
        source: ::std::str::Utf8Error,
    },
    /// A message handed to the encoder holds a field number absent from the schema
    NoSuchField {
        /// The unmatched field number
        field: u32,
    },
    /// A message value's variant does not match the schema kind for its field
    ValueKindMismatch {
        /// Field number whose value disagrees with the schema
        field: u32,
    },
    /// The fixed-size output buffer filled up before the message was fully written
    OutputBufferTooSmall,
    /// Io error from a `std::io::Write` backend
    Io(::std::io::Error),
}

/// A wrapper for `Result<T, Error>`
pub type Result<T> = ::std::result::Result<T, Error>;

impl From<::std::io::Error> for Error {
    fn from(e: ::std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnexpectedEndOfBuffer { offset } => {
                write!(f, "unexpected end of buffer at offset {offset}")
            }
            Error::Varint { offset } => {
                write!(f, "varint at offset {offset} exceeds ten bytes")
            }
            Error::OverlongLength {
                field,
                declared,
                remaining,
            } => write!(
                f,
                "field {field} declares a length of {declared} bytes with only {remaining} remaining"
            ),
            Error::UnknownWireType { value, offset } => {
                write!(f, "unknown wire type {value} in tag at offset {offset}")
            }
            Error::DeprecatedGroup { offset } => {
                write!(f, "deprecated group wire type in tag at offset {offset}")
            }
            Error::InvalidFieldNumber { offset } => {
                write!(f, "invalid field number in tag at offset {offset}")
            }
            Error::WireTypeMismatch {
                field,
                actual,
                expected,
            } => write!(
                f,
                "field {field} arrived as {actual:?} but the schema expects {expected:?}"
            ),
            Error::Utf8 { field, source } => {
                write!(f, "string field {field} is not valid utf-8: {source}")
            }
            Error::NoSuchField { field } => {
                write!(f, "field {field} has no entry in the schema")
            }
            Error::ValueKindMismatch { field } => {
                write!(f, "value for field {field} does not match its schema kind")
            }
            Error::OutputBufferTooSmall => write!(f, "output buffer too small"),
            Error::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl ::std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Utf8 { source, .. } => Some(source),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
