//! Encode and decode contract calls, return values, events, and errors.
//!
//! # Overview
//!
//! Contracts expose an interface of functions, events, and errors whose parameters are described
//! by type descriptors ([ParamType]). Values crossing the interface are serialized into a sequence
//! of 32-byte words using a head/tail layout: static values are written in place, while dynamic
//! values (`bytes`, `string`, `T[]`, and anything containing them) are written after the head and
//! referenced by offset.
//!
//! This crate:
//! - Parses interface descriptions, both the JSON form and human-readable signatures
//! - Classifies types as static or dynamic
//! - Encodes native [Value]s and decodes untrusted input back into them
//! - Computes canonical signatures, 4-byte selectors, and event topics
//!
//! # Example
//!
//! ```
//! use sigil_abi::{Item, Value, U256, Address};
//!
//! // Parse a human-readable signature
//! let item: Item = "function transfer(address to, uint256 amount) returns (bool)"
//!     .parse()
//!     .unwrap();
//! let Item::Function(transfer) = item else { unreachable!() };
//! assert_eq!(transfer.signature(), "transfer(address,uint256)");
//! assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
//!
//! // Encode a call and decode it back
//! let args = vec![Value::Address(Address::repeat_byte(1)), Value::Uint(U256::from(10u64))];
//! let call = transfer.encode_input(&args).unwrap();
//! assert_eq!(call.len(), 4 + 2 * 32);
//! assert_eq!(transfer.decode_input(&call).unwrap(), args);
//! ```
//!
//! # Untrusted Input
//!
//! Decoding never reads outside the provided buffer and checks every claimed length against the
//! bytes that remain before allocating. By default, non-canonical words (dirty padding, booleans
//! other than 0 or 1) are rejected; see [decoder::Config] to relax this.
//!
//! # Status
//!
//! `sigil-abi` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

pub mod address;
pub mod classify;
pub mod decoder;
pub mod encoder;
mod error;
pub mod human;
pub mod interface;
pub mod item;
pub mod json;
pub mod revert;
pub mod signature;
pub mod types;
pub mod value;

pub use alloy_primitives::{Address, I256, U256};
pub use classify::{Category, Layout};
pub use decoder::{decode, decode_cfg, Config};
pub use encoder::{encode, encode_word};
pub use error::{DecodeError, Error};
pub use interface::Interface;
pub use item::{
    Constructor, CustomError, Event, Fallback, Function, Item, Receive, StateMutability,
};
pub use revert::{decode_revert, Revert};
pub use signature::{selector, signature, topic};
pub use types::{Param, ParamType};
pub use value::Value;

/// Size of a word (in bytes).
pub const WORD: usize = 32;
