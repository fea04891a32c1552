//! Error types for ABI operations

use thiserror::Error;

/// Error type for parsing, encoding, and decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("invalid abi type: {0}")]
    InvalidAbiType(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("invalid array length: expected {expected}, found {found}")]
    InvalidArray { expected: usize, found: usize },
    #[error("value out of range for {0}: {1}")]
    SizeOverflow(String, String), // type, value
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid length for bytes{expected}: found {found}")]
    InvalidBytesLength { expected: usize, found: usize },
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("selector mismatch: expected {expected}, found {found}")]
    InvalidSelector { expected: String, found: String },
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("invalid json: {0}")]
    Json(String),
}

/// Failure to read an encoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of buffer: need {len} bytes at offset {offset}")]
    EndOfBuffer { offset: usize, len: usize },
    #[error("offset or length does not fit in memory")]
    OffsetOverflow,
    #[error("length exceeded: {0} > {1}")]
    LengthExceeded(usize, usize), // found, max
    #[error("invalid bool")]
    InvalidBool,
    #[error("non-zero padding in {0}")]
    InvalidPadding(&'static str),
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    #[error("not enough topics: expected {0}, found {1}")]
    NotEnoughTopics(usize, usize), // expected, found
}
