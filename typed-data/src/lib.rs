//! Hash structured messages for signing.
//!
//! # Overview
//!
//! Typed data (EIP-712) is a structured message bound to a _domain_ (an application, a version,
//! a chain, and a contract). Hashing proceeds in two stages:
//!
//! 1. Every struct type is identified by its _type hash_: the Keccak-256 hash of its encoded
//!    type, `Name(type1 name1,...)` followed by the encoded types of every struct it references,
//!    sorted by name.
//! 2. A struct value is hashed as its type hash followed by one word per member. Scalars use their
//!    ABI word, `bytes` and `string` use the hash of their contents, nested structs use their own
//!    struct hash, and arrays use the hash of their concatenated element encodings.
//!
//! The digest that is signed is `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))`.
//!
//! # Example
//!
//! ```
//! use sigil_typed_data::TypedData;
//!
//! let typed_data = TypedData::from_json(r#"{
//!     "types": {
//!         "EIP712Domain": [{"name": "name", "type": "string"}, {"name": "chainId", "type": "uint256"}],
//!         "Greeting": [{"name": "text", "type": "string"}]
//!     },
//!     "primaryType": "Greeting",
//!     "domain": {"name": "Greeter", "chainId": 1},
//!     "message": {"text": "hello"}
//! }"#).unwrap();
//! let digest = typed_data.signing_hash().unwrap();
//! assert_eq!(digest.as_ref().len(), 32);
//! ```
//!
//! # Status
//!
//! `sigil-typed-data` is **ALPHA** software and is not yet recommended for production use.
//! Developers should expect breaking changes and occasional instability.

use thiserror::Error;

mod data;
pub mod domain;
mod hash;
pub mod typed_data;
pub mod types;

pub use data::Data;
pub use domain::Domain;
pub use sigil_cryptography::keccak256::Digest;
pub use typed_data::TypedData;
pub use types::{Member, Types};

/// Name of the struct describing a domain.
pub const EIP712_DOMAIN: &str = "EIP712Domain";

/// Deepest nesting of structs and arrays accepted in types and messages.
pub const MAX_DEPTH: usize = 64;

/// Errors that can occur when hashing typed data.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid struct type: {0}")]
    InvalidStructType(String),
    #[error("circular reference through {0}")]
    CircularReference(String),
    #[error("nesting deeper than {0}")]
    DepthExceeded(usize),
    #[error("missing field {field} of {name}")]
    MissingField { name: String, field: String },
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String), // type, reason
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("abi error: {0}")]
    Abi(#[from] sigil_abi::Error),
}
