//! Built-in revert payloads.
//!
//! A failed call returns revert data that is either empty, a reason string encoded as
//! `Error(string)`, a `Panic(uint256)` code raised by a failed compiler-inserted check, or a
//! custom error declared by the contract.

use crate::{
    decoder::decode, signature::SELECTOR_LENGTH, DecodeError, Error, ParamType, Value,
};
use alloy_primitives::U256;
use sigil_utils::hex_prefixed;
use std::fmt;

/// Selector of `Error(string)`.
pub const ERROR_SELECTOR: [u8; SELECTOR_LENGTH] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; SELECTOR_LENGTH] = [0x4e, 0x48, 0x7b, 0x71];

/// Decoded revert data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Revert {
    /// No revert data.
    Empty,
    /// `Error(string)`.
    Reason(String),
    /// `Panic(uint256)`.
    Panic(U256),
    /// Data with any other selector (usually a custom error).
    Custom {
        selector: [u8; SELECTOR_LENGTH],
        data: Vec<u8>,
    },
}

impl Revert {
    /// Returns a description of a panic code, if it is one the compiler emits.
    pub fn panic_reason(&self) -> Option<&'static str> {
        let Self::Panic(code) = self else {
            return None;
        };
        let code: u64 = (*code).try_into().ok()?;
        Some(match code {
            0x00 => "generic compiler panic",
            0x01 => "assertion failed",
            0x11 => "arithmetic overflow or underflow",
            0x12 => "division or modulo by zero",
            0x21 => "invalid enum value",
            0x22 => "invalid storage byte array encoding",
            0x31 => "pop from an empty array",
            0x32 => "array index out of bounds",
            0x41 => "memory allocation too large",
            0x51 => "call to a zero-initialized function",
            _ => return None,
        })
    }
}

impl fmt::Display for Revert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("reverted without data"),
            Self::Reason(reason) => write!(f, "reverted: {reason}"),
            Self::Panic(code) => match self.panic_reason() {
                Some(reason) => write!(f, "panic 0x{code:x}: {reason}"),
                None => write!(f, "panic 0x{code:x}"),
            },
            Self::Custom { selector, data } => write!(
                f,
                "custom error {} with {} bytes of data",
                hex_prefixed(selector),
                data.len()
            ),
        }
    }
}

/// Decodes revert data.
pub fn decode_revert(data: &[u8]) -> Result<Revert, Error> {
    if data.is_empty() {
        return Ok(Revert::Empty);
    }
    if data.len() < SELECTOR_LENGTH {
        return Err(DecodeError::EndOfBuffer {
            offset: 0,
            len: SELECTOR_LENGTH,
        }
        .into());
    }
    let (selector, args) = data.split_at(SELECTOR_LENGTH);
    if selector == ERROR_SELECTOR {
        let reason = decode(&[ParamType::String], args)?
            .pop()
            .and_then(|value| value.as_str().map(str::to_string))
            .ok_or_else(|| Error::InvalidParameter("missing revert reason".into()))?;
        return Ok(Revert::Reason(reason));
    }
    if selector == PANIC_SELECTOR {
        let code = decode(&[ParamType::Uint(256)], args)?
            .pop()
            .and_then(|value| value.as_uint())
            .ok_or_else(|| Error::InvalidParameter("missing panic code".into()))?;
        return Ok(Revert::Panic(code));
    }
    let mut prefix = [0u8; SELECTOR_LENGTH];
    prefix.copy_from_slice(selector);
    Ok(Revert::Custom {
        selector: prefix,
        data: args.to_vec(),
    })
}

/// Encodes `Error(reason)` revert data.
pub fn encode_reason(reason: &str) -> Result<Vec<u8>, Error> {
    let args = crate::encoder::encode(&[ParamType::String], &[Value::from(reason)])?;
    let mut data = ERROR_SELECTOR.to_vec();
    data.extend_from_slice(&args);
    Ok(data)
}
