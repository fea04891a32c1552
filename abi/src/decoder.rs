//! Head/tail decoding.
//!
//! The inverse of [crate::encoder]. Every word and every length-prefixed region is bounds-checked
//! before it is read, and every claimed length is checked against the bytes that remain before
//! anything is allocated for it, so untrusted input can neither read out of bounds nor trigger an
//! oversized allocation.
//!
//! Offsets may point anywhere, so several elements can share one region of the input. The total
//! output is therefore metered as well: each decoded scalar, array, and byte region is charged
//! against a budget proportional to the input length.

use crate::{classify::layout, encoder::check_uint, DecodeError, Error, Param, ParamType, Value, WORD};
use alloy_primitives::{Address, I256, U256};
use std::cell::Cell;
use tracing::trace;

/// Output words allowed per input word. A canonical encoding never needs more than one.
const OUTPUT_PER_WORD: usize = 2;

/// Configuration for decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Reject non-canonical words: booleans other than 0 or 1, integers whose unused high bits
    /// are not a zero (or sign) extension, addresses with non-zero upper bytes, and fixed-size
    /// byte arrays with non-zero padding.
    ///
    /// When unset, booleans are true if any byte is non-zero and the other types are truncated
    /// to their declared width.
    pub strict: bool,

    /// Largest array element count or byte length accepted.
    pub max_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: true,
            max_len: usize::MAX,
        }
    }
}

impl Config {
    /// Returns a configuration that accepts non-canonical words.
    pub fn tolerant() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }
}

/// Decodes `data` as a tuple of `kinds` using the default [Config].
pub fn decode(kinds: &[ParamType], data: &[u8]) -> Result<Vec<Value>, Error> {
    decode_cfg(kinds, data, &Config::default())
}

/// Decodes `data` as a tuple of `kinds`.
pub fn decode_cfg(kinds: &[ParamType], data: &[u8], cfg: &Config) -> Result<Vec<Value>, Error> {
    Decoder::new(data, cfg)
        .members(kinds.iter(), kinds.len(), 0)
        .inspect_err(|err| trace!(?err, len = data.len(), "rejected encoding"))
}

/// Decodes `data` as a tuple of the types of `params` using the default [Config].
pub fn decode_params(params: &[Param], data: &[u8]) -> Result<Vec<Value>, Error> {
    decode_params_cfg(params, data, &Config::default())
}

/// Decodes `data` as a tuple of the types of `params`.
pub fn decode_params_cfg(
    params: &[Param],
    data: &[u8],
    cfg: &Config,
) -> Result<Vec<Value>, Error> {
    Decoder::new(data, cfg)
        .members(params.iter().map(|p| &p.kind), params.len(), 0)
        .inspect_err(|err| trace!(?err, len = data.len(), "rejected encoding"))
}

/// Decodes a single word (e.g. an event topic) as a value of a static `kind`.
pub fn decode_word(kind: &ParamType, word: &[u8; WORD], cfg: &Config) -> Result<Value, Error> {
    if kind.is_dynamic() {
        return Err(Error::InvalidParameter(format!(
            "{kind} does not decode from a single word"
        )));
    }
    Decoder::new(word, cfg).value(kind, 0)
}

/// Returns the total head size of a tuple of `kinds`.
fn head_size<'k>(kinds: impl Iterator<Item = &'k ParamType>) -> Result<usize, DecodeError> {
    kinds
        .map(|kind| layout(kind).head_size)
        .try_fold(0usize, |acc, size| acc.checked_add(size))
        .ok_or(DecodeError::OffsetOverflow)
}

struct Decoder<'a> {
    data: &'a [u8],
    cfg: &'a Config,
    /// Output words left to produce.
    budget: Cell<usize>,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], cfg: &'a Config) -> Self {
        Self {
            data,
            cfg,
            budget: Cell::new((data.len() / WORD).saturating_mul(OUTPUT_PER_WORD)),
        }
    }

    /// Charges `words` of output against the budget.
    fn charge(&self, words: usize) -> Result<(), DecodeError> {
        let left = self.budget.get();
        if words > left {
            return Err(DecodeError::LengthExceeded(words, left));
        }
        self.budget.set(left - words);
        Ok(())
    }

    /// Returns the number of whole words from `offset` to the end of the input.
    fn words_after(&self, offset: usize) -> usize {
        self.data.len().saturating_sub(offset) / WORD
    }

    /// Returns the `len` bytes at `offset`.
    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = offset
            .checked_add(len)
            .ok_or(DecodeError::OffsetOverflow)?;
        self.data
            .get(offset..end)
            .ok_or(DecodeError::EndOfBuffer { offset, len })
    }

    fn word(&self, offset: usize) -> Result<[u8; WORD], DecodeError> {
        let mut word = [0u8; WORD];
        word.copy_from_slice(self.slice(offset, WORD)?);
        Ok(word)
    }

    /// Reads a word holding an offset or length.
    fn read_usize(&self, offset: usize) -> Result<usize, DecodeError> {
        let word = self.word(offset)?;
        let (high, low) = word.split_at(WORD - 8);
        if high.iter().any(|b| *b != 0) {
            return Err(DecodeError::OffsetOverflow);
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(low);
        usize::try_from(u64::from_be_bytes(bytes)).map_err(|_| DecodeError::OffsetOverflow)
    }

    /// Reads a length word and checks it against the configured maximum.
    fn read_len(&self, offset: usize) -> Result<usize, DecodeError> {
        let len = self.read_usize(offset)?;
        if len > self.cfg.max_len {
            return Err(DecodeError::LengthExceeded(len, self.cfg.max_len));
        }
        Ok(len)
    }

    /// Decodes a tuple of `count` members (yielded by `kinds`) whose encoding starts at `base`.
    fn members<'k>(
        &self,
        kinds: impl Iterator<Item = &'k ParamType> + Clone,
        count: usize,
        base: usize,
    ) -> Result<Vec<Value>, Error> {
        let head = head_size(kinds.clone())?;
        self.tuple(kinds, count, base, head)
    }

    /// Decodes a tuple of `count` members whose encoding starts at `base` and whose head is
    /// `head_size` bytes long.
    fn tuple<'k>(
        &self,
        kinds: impl Iterator<Item = &'k ParamType>,
        count: usize,
        base: usize,
        head_size: usize,
    ) -> Result<Vec<Value>, Error> {
        self.slice(base, head_size)?;

        // The head check above bounds `count` for every member with a non-empty head.
        let capacity = count
            .min(self.words_after(base))
            .min(self.budget.get());
        let mut values = Vec::with_capacity(capacity);
        let mut head = base;
        for kind in kinds {
            let layout = layout(kind);
            let value = if layout.dynamic {
                let offset = self.read_usize(head)?;
                let target = base
                    .checked_add(offset)
                    .ok_or(DecodeError::OffsetOverflow)?;
                self.value(kind, target)?
            } else {
                self.value(kind, head)?
            };
            values.push(value);
            head += layout.head_size;
        }
        Ok(values)
    }

    /// Decodes a value of `kind` whose encoding starts at `at`.
    fn value(&self, kind: &ParamType, at: usize) -> Result<Value, Error> {
        kind.check_width()?;
        if kind.is_scalar() {
            self.charge(1)?;
        }
        let strict = self.cfg.strict;
        match kind {
            ParamType::Uint(bits) => {
                let value = U256::from_be_bytes(self.word(at)?);
                if strict {
                    check_uint(*bits, &value).map_err(|_| DecodeError::InvalidPadding("uint"))?;
                    return Ok(Value::Uint(value));
                }
                Ok(Value::Uint(value & mask(*bits)))
            }
            ParamType::Int(bits) => {
                let raw = U256::from_be_bytes(self.word(at)?);
                let extended = sign_extend(raw, *bits);
                if strict && extended != raw {
                    return Err(DecodeError::InvalidPadding("int").into());
                }
                Ok(Value::Int(I256::from_raw(extended)))
            }
            ParamType::Bool => {
                let word = self.word(at)?;
                let (high, low) = word.split_at(WORD - 1);
                let padded = high.iter().any(|b| *b != 0);
                match (strict, padded, low[0]) {
                    (true, false, 0) => Ok(Value::Bool(false)),
                    (true, false, 1) => Ok(Value::Bool(true)),
                    (true, _, _) => Err(DecodeError::InvalidBool.into()),
                    (false, padded, low) => Ok(Value::Bool(padded || low != 0)),
                }
            }
            ParamType::Address => {
                let word = self.word(at)?;
                let (high, low) = word.split_at(WORD - 20);
                if strict && high.iter().any(|b| *b != 0) {
                    return Err(DecodeError::InvalidPadding("address").into());
                }
                Ok(Value::Address(Address::from_slice(low)))
            }
            ParamType::FixedBytes(len) => {
                let word = self.word(at)?;
                let (data, padding) = word.split_at(*len);
                if strict && padding.iter().any(|b| *b != 0) {
                    return Err(DecodeError::InvalidPadding("fixed bytes").into());
                }
                Ok(Value::FixedBytes(data.to_vec()))
            }
            ParamType::Bytes => Ok(Value::Bytes(self.bytes(at)?.to_vec())),
            ParamType::String => {
                let data = self.bytes(at)?;
                let string = std::str::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;
                Ok(Value::String(string.to_string()))
            }
            ParamType::FixedArray(elem, len) => {
                self.check_count(*len, at)?;
                let head = len
                    .checked_mul(layout(elem).head_size)
                    .ok_or(DecodeError::OffsetOverflow)?;
                Ok(Value::FixedArray(self.tuple(
                    std::iter::repeat(elem.as_ref()).take(*len),
                    *len,
                    at,
                    head,
                )?))
            }
            ParamType::Array(elem) => {
                let count = self.read_len(at)?;
                let start = at + WORD;
                self.check_count(count, start)?;
                self.charge(1)?;
                let head = count
                    .checked_mul(layout(elem).head_size)
                    .ok_or(DecodeError::OffsetOverflow)?;
                Ok(Value::Array(self.tuple(
                    std::iter::repeat(elem.as_ref()).take(count),
                    count,
                    start,
                    head,
                )?))
            }
            ParamType::Tuple(components) => Ok(Value::Tuple(self.members(
                components.iter().map(|c| &c.kind),
                components.len(),
                at,
            )?)),
        }
    }

    /// Checks that `count` array elements starting at `start` could each have a head word, even
    /// elements whose static encoding is empty.
    fn check_count(&self, count: usize, start: usize) -> Result<(), DecodeError> {
        if count > self.words_after(start) {
            return Err(DecodeError::EndOfBuffer {
                offset: start,
                len: count.saturating_mul(WORD),
            });
        }
        Ok(())
    }

    /// Reads a length-prefixed byte region.
    fn bytes(&self, at: usize) -> Result<&'a [u8], DecodeError> {
        let len = self.read_len(at)?;
        let data = self.slice(at + WORD, len)?;
        self.charge(1 + len.div_ceil(WORD))?;
        Ok(data)
    }
}

/// Returns a mask of the low `bits` bits.
fn mask(bits: usize) -> U256 {
    if bits >= 256 {
        return U256::MAX;
    }
    (U256::from(1u8) << bits) - U256::from(1u8)
}

/// Sign-extends the low `bits` bits of `raw` to 256 bits.
fn sign_extend(raw: U256, bits: usize) -> U256 {
    if bits >= 256 {
        return raw;
    }
    let mask = mask(bits);
    let low = raw & mask;
    if low.bit(bits - 1) {
        low | !mask
    } else {
        low
    }
}
