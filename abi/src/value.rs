//! Native values.
//!
//! A [Value] tree mirrors a [ParamType] tree. Integers are held at full 256-bit width; the
//! declared width is enforced when a value is encoded (or parsed from text) against its
//! descriptor.

use crate::{address, types::write_list, Error, ParamType};
use alloy_primitives::{Address, I256, U256};
use sigil_utils::{from_hex, hex_prefixed, strip_prefix};
use std::fmt;

/// A value that can be encoded against a [ParamType].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// Value of a `uintN`.
    Uint(U256),
    /// Value of an `intN`.
    Int(I256),
    /// Value of a `bool`.
    Bool(bool),
    /// Value of an `address`.
    Address(Address),
    /// Value of a `bytesN` (exactly `N` bytes).
    FixedBytes(Vec<u8>),
    /// Value of `bytes`.
    Bytes(Vec<u8>),
    /// Value of `string`.
    String(String),
    /// Value of a `T[N]` (exactly `N` elements).
    FixedArray(Vec<Value>),
    /// Value of a `T[]`.
    Array(Vec<Value>),
    /// Value of a tuple.
    Tuple(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Uint(_) => "uint",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Address(_) => "address",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::FixedArray(_) => "fixed array",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
        }
    }

    /// Returns true if the shape of the value matches `kind` (variants, element counts, and
    /// fixed-bytes lengths). Integer ranges are not checked.
    pub fn matches(&self, kind: &ParamType) -> bool {
        match (kind, self) {
            (ParamType::Uint(_), Self::Uint(_))
            | (ParamType::Int(_), Self::Int(_))
            | (ParamType::Bool, Self::Bool(_))
            | (ParamType::Address, Self::Address(_))
            | (ParamType::Bytes, Self::Bytes(_))
            | (ParamType::String, Self::String(_)) => true,
            (ParamType::FixedBytes(len), Self::FixedBytes(bytes)) => bytes.len() == *len,
            (ParamType::FixedArray(elem, len), Self::FixedArray(items)) => {
                items.len() == *len && items.iter().all(|item| item.matches(elem))
            }
            (ParamType::Array(elem), Self::Array(items)) => {
                items.iter().all(|item| item.matches(elem))
            }
            (ParamType::Tuple(components), Self::Tuple(items)) => {
                components.len() == items.len()
                    && components
                        .iter()
                        .zip(items)
                        .all(|(component, item)| item.matches(&component.kind))
            }
            _ => false,
        }
    }

    /// Returns the unsigned integer, if this is one.
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the signed integer, if this is one.
    pub fn as_int(&self) -> Option<I256> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the address, if this is one.
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw bytes of a `bytes` or `bytesN` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) | Self::FixedBytes(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the elements of an array, fixed array, or tuple.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::FixedArray(items) | Self::Array(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Parses textual input against `kind`.
    ///
    /// Accepted forms: decimal or `0x`-hex integers (with a leading `-` for signed types),
    /// `true`/`false`, hex addresses (checksum verified when mixed-case), `0x`-hex byte strings,
    /// strings (optionally double-quoted; quotes are required inside arrays and tuples when the
    /// string contains a separator), `[a,b,...]` arrays, and `(a,b,...)` tuples.
    pub fn parse(kind: &ParamType, text: &str) -> Result<Self, Error> {
        let text = text.trim();
        match kind {
            ParamType::Uint(bits) => {
                let value = parse_magnitude(kind, text)?;
                crate::encoder::check_uint(*bits, &value)?;
                Ok(Self::Uint(value))
            }
            ParamType::Int(bits) => {
                let (negative, digits) = match text.strip_prefix('-') {
                    Some(digits) => (true, digits),
                    None => (false, text),
                };
                let magnitude = parse_magnitude(kind, digits)?;
                let value = signed(magnitude, negative)
                    .ok_or_else(|| Error::SizeOverflow(kind.to_string(), text.to_string()))?;
                crate::encoder::check_int(*bits, &value)?;
                Ok(Self::Int(value))
            }
            ParamType::Bool => match text {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(invalid(kind, text)),
            },
            ParamType::Address => Ok(Self::Address(address::parse_address(text)?)),
            ParamType::FixedBytes(len) => {
                let bytes = from_hex(text).ok_or_else(|| invalid(kind, text))?;
                if bytes.len() != *len {
                    return Err(Error::InvalidBytesLength {
                        expected: *len,
                        found: bytes.len(),
                    });
                }
                Ok(Self::FixedBytes(bytes))
            }
            ParamType::Bytes => Ok(Self::Bytes(
                from_hex(text).ok_or_else(|| invalid(kind, text))?,
            )),
            ParamType::String => Ok(Self::String(unquote(text))),
            ParamType::FixedArray(elem, len) => {
                let items = parse_list(kind, text, '[', ']', |_, item| Self::parse(elem, item))?;
                if items.len() != *len {
                    return Err(Error::InvalidArray {
                        expected: *len,
                        found: items.len(),
                    });
                }
                Ok(Self::FixedArray(items))
            }
            ParamType::Array(elem) => Ok(Self::Array(parse_list(
                kind,
                text,
                '[',
                ']',
                |_, item| Self::parse(elem, item),
            )?)),
            ParamType::Tuple(components) => {
                let items = parse_list(kind, text, '(', ')', |i, item| match components.get(i) {
                    Some(component) => Self::parse(&component.kind, item),
                    None => Err(Error::InvalidParameter(format!(
                        "too many values for {kind}"
                    ))),
                })?;
                if items.len() != components.len() {
                    return Err(Error::InvalidParameter(format!(
                        "expected {} values for {kind}, found {}",
                        components.len(),
                        items.len()
                    )));
                }
                Ok(Self::Tuple(items))
            }
        }
    }
}

fn invalid(kind: &ParamType, text: &str) -> Error {
    Error::InvalidParameter(format!("invalid {kind} literal: {text}"))
}

/// Parses a non-negative decimal or `0x`-hex literal.
fn parse_magnitude(kind: &ParamType, text: &str) -> Result<U256, Error> {
    let digits = strip_prefix(text);
    let radix = if digits.len() != text.len() { 16 } else { 10 };
    let well_formed = !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix as u32));
    if !well_formed {
        return Err(invalid(kind, text));
    }
    // The only failure left is a literal wider than 256 bits.
    U256::from_str_radix(digits, radix)
        .map_err(|_| Error::SizeOverflow(kind.to_string(), text.to_string()))
}

/// Applies a sign to a magnitude, returning `None` outside the 256-bit signed range.
fn signed(magnitude: U256, negative: bool) -> Option<I256> {
    let limit = U256::from(1u8) << 255;
    if negative {
        if magnitude > limit {
            return None;
        }
        Some(I256::from_raw(magnitude.wrapping_neg()))
    } else {
        if magnitude >= limit {
            return None;
        }
        Some(I256::from_raw(magnitude))
    }
}

/// Strips surrounding double quotes and resolves `\"` and `\\`.
fn unquote(text: &str) -> String {
    let Some(inner) = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return text.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Splits `open ... close` at top-level commas and parses each element.
fn parse_list(
    kind: &ParamType,
    text: &str,
    open: char,
    close: char,
    mut parse: impl FnMut(usize, &str) -> Result<Value, Error>,
) -> Result<Vec<Value>, Error> {
    let inner = text
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| invalid(kind, text))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        if quoted {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => quoted = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => quoted = true,
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.checked_sub(1).ok_or_else(|| invalid(kind, text))?,
            ',' if depth == 0 => {
                items.push(parse(items.len(), &inner[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || quoted {
        return Err(invalid(kind, text));
    }
    items.push(parse(items.len(), &inner[start..])?);
    Ok(items)
}

impl fmt::Display for Value {
    /// Renders the value in the textual form accepted by [Value::parse].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Address(value) => f.write_str(&address::to_checksum(value)),
            Self::FixedBytes(bytes) | Self::Bytes(bytes) => f.write_str(&hex_prefixed(bytes)),
            Self::String(value) => {
                f.write_str("\"")?;
                for c in value.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Self::FixedArray(items) | Self::Array(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_list(f, items)?;
                f.write_str(")")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<U256> for Value {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

impl From<I256> for Value {
    fn from(value: I256) -> Self {
        Self::Int(value)
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
