//! Head/tail encoding.
//!
//! A tuple is encoded as a head region followed by a tail region. Static members are written in
//! place in the head; each dynamic member contributes a one-word offset (measured from the start
//! of the tuple's own encoding) to its data in the tail. Arrays are encoded as tuples of their
//! elements, with dynamic arrays prefixed by their element count.
//!
//! All checks happen before any byte is handed back: on error, no partial encoding escapes.

use crate::{
    types::{valid_bits, MAX_BITS},
    Error, Param, ParamType, Value, WORD,
};
use alloy_primitives::{I256, U256};
use bytes::{BufMut, Bytes, BytesMut};

/// Encodes `values` as a tuple of `kinds`.
pub fn encode(kinds: &[ParamType], values: &[Value]) -> Result<Bytes, Error> {
    let kinds: Vec<&ParamType> = kinds.iter().collect();
    encode_refs(&kinds, values)
}

/// Encodes `values` as a tuple of the types of `params`.
pub fn encode_params(params: &[Param], values: &[Value]) -> Result<Bytes, Error> {
    let kinds: Vec<&ParamType> = params.iter().map(|p| &p.kind).collect();
    encode_refs(&kinds, values)
}

fn encode_refs(kinds: &[&ParamType], values: &[Value]) -> Result<Bytes, Error> {
    if kinds.len() != values.len() {
        return Err(Error::InvalidParameter(format!(
            "expected {} values, found {}",
            kinds.len(),
            values.len()
        )));
    }
    let mut buf = BytesMut::new();
    write_tuple(kinds.iter().copied(), values, &mut buf)?;
    Ok(buf.freeze())
}

/// Encodes a single scalar value as one word.
///
/// Fails with [Error::InvalidParameter] if `kind` is not a scalar type.
pub fn encode_word(kind: &ParamType, value: &Value) -> Result<[u8; WORD], Error> {
    if !kind.is_scalar() {
        return Err(Error::InvalidParameter(format!(
            "{kind} does not encode to a single word"
        )));
    }
    let mut word = [0u8; WORD];
    let mut buf = &mut word[..];
    write_value(kind, value, &mut buf)?;
    Ok(word)
}

/// Writes a tuple whose member types are yielded by `kinds`.
fn write_tuple<'a>(
    kinds: impl Iterator<Item = &'a ParamType> + Clone,
    values: &[Value],
    buf: &mut BytesMut,
) -> Result<(), Error> {
    let head_size = kinds
        .clone()
        .try_fold(0usize, |acc, kind| acc.checked_add(kind.head_size()))
        .ok_or_else(|| Error::InvalidParameter("encoding too large".to_string()))?;

    let mut tail = BytesMut::new();
    for (kind, value) in kinds.zip(values) {
        if kind.is_dynamic() {
            put_usize(head_size + tail.len(), buf);
            write_value(kind, value, &mut tail)?;
        } else {
            write_value(kind, value, buf)?;
        }
    }
    buf.put(tail);
    Ok(())
}

/// Writes the encoding of `value` (its head for static types, its full data for dynamic types).
fn write_value(kind: &ParamType, value: &Value, buf: &mut impl BufMut) -> Result<(), Error> {
    kind.check_width()?;
    match (kind, value) {
        (ParamType::Uint(bits), Value::Uint(v)) => {
            check_uint(*bits, v)?;
            buf.put_slice(&v.to_be_bytes::<WORD>());
        }
        (ParamType::Int(bits), Value::Int(v)) => {
            check_int(*bits, v)?;
            // Two's complement at 256 bits is already sign-extended to the full word.
            buf.put_slice(&v.into_raw().to_be_bytes::<WORD>());
        }
        (ParamType::Bool, Value::Bool(v)) => {
            buf.put_bytes(0, WORD - 1);
            buf.put_u8(u8::from(*v));
        }
        (ParamType::Address, Value::Address(v)) => {
            buf.put_bytes(0, WORD - 20);
            buf.put_slice(v.as_slice());
        }
        (ParamType::FixedBytes(len), Value::FixedBytes(v)) => {
            if v.len() != *len {
                return Err(Error::InvalidBytesLength {
                    expected: *len,
                    found: v.len(),
                });
            }
            buf.put_slice(v);
            buf.put_bytes(0, WORD - len);
        }
        (ParamType::Bytes, Value::Bytes(v)) => put_padded(v, buf),
        (ParamType::String, Value::String(v)) => put_padded(v.as_bytes(), buf),
        (ParamType::FixedArray(elem, len), Value::FixedArray(items)) => {
            if items.len() != *len {
                return Err(Error::InvalidArray {
                    expected: *len,
                    found: items.len(),
                });
            }
            write_nested(std::iter::repeat(elem.as_ref()).take(*len), items, buf)?;
        }
        (ParamType::Array(elem), Value::Array(items)) => {
            put_usize(items.len(), buf);
            write_nested(
                std::iter::repeat(elem.as_ref()).take(items.len()),
                items,
                buf,
            )?;
        }
        (ParamType::Tuple(components), Value::Tuple(items)) => {
            if items.len() != components.len() {
                return Err(Error::InvalidParameter(format!(
                    "expected {} values for {kind}, found {}",
                    components.len(),
                    items.len()
                )));
            }
            write_nested(components.iter().map(|c| &c.kind), items, buf)?;
        }
        _ => {
            return Err(Error::InvalidParameter(format!(
                "expected {kind}, found {}",
                value.describe()
            )))
        }
    }
    Ok(())
}

/// Writes a nested tuple. Offsets inside it are relative to its own start, so it is laid out in
/// a fresh buffer.
fn write_nested<'a>(
    kinds: impl Iterator<Item = &'a ParamType> + Clone,
    values: &[Value],
    buf: &mut impl BufMut,
) -> Result<(), Error> {
    let mut nested = BytesMut::new();
    write_tuple(kinds, values, &mut nested)?;
    buf.put_slice(&nested);
    Ok(())
}

/// Writes a length word followed by `data`, right-padded to a word boundary.
fn put_padded(data: &[u8], buf: &mut impl BufMut) {
    put_usize(data.len(), buf);
    buf.put_slice(data);
    buf.put_bytes(0, padding(data.len()));
}

fn put_usize(value: usize, buf: &mut impl BufMut) {
    buf.put_slice(&U256::from(value).to_be_bytes::<WORD>());
}

/// Bytes needed to pad `len` to a multiple of [WORD].
pub(crate) fn padding(len: usize) -> usize {
    (WORD - len % WORD) % WORD
}

/// Verifies that `value` fits in an unsigned integer of `bits` bits.
pub(crate) fn check_uint(bits: usize, value: &U256) -> Result<(), Error> {
    if !valid_bits(bits) {
        return Err(Error::InvalidAbiType(format!("uint{bits}")));
    }
    if value.bit_len() > bits {
        return Err(Error::SizeOverflow(format!("uint{bits}"), value.to_string()));
    }
    Ok(())
}

/// Verifies that `value` fits in a signed integer of `bits` bits.
pub(crate) fn check_int(bits: usize, value: &I256) -> Result<(), Error> {
    if !valid_bits(bits) {
        return Err(Error::InvalidAbiType(format!("int{bits}")));
    }
    if bits == MAX_BITS {
        return Ok(());
    }
    // Non-negative values need `bits - 1` magnitude bits; negative values `v` satisfy the same
    // bound on `-v - 1`, which is the bitwise complement of their two's complement form.
    let raw = value.into_raw();
    let magnitude = if value.is_negative() { !raw } else { raw };
    if magnitude.bit_len() > bits - 1 {
        return Err(Error::SizeOverflow(format!("int{bits}"), value.to_string()));
    }
    Ok(())
}
