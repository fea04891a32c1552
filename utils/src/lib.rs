//! Leverage common functionality across the sigil primitives.

use std::fmt::Write as _;

/// Converts bytes to a lowercase hexadecimal string (without a `0x` prefix).
pub fn hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a `String` cannot fail.
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Converts bytes to a lowercase hexadecimal string prefixed with `0x`, the
/// conventional rendering of calldata, selectors, and digests.
pub fn hex_prefixed(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(2 + bytes.len() * 2);
    hex.push_str("0x");
    for byte in bytes {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Converts a hexadecimal string to bytes.
///
/// An optional `0x` (or `0X`) prefix is accepted. Returns `None` if the input has an odd number of
/// digits or contains a non-hexadecimal character.
pub fn from_hex(hex: &str) -> Option<Vec<u8>> {
    let hex = strip_prefix(hex);
    if hex.len() % 2 != 0 {
        return None;
    }
    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
        .collect()
}

/// Converts a hexadecimal string to bytes, stripping whitespace and/or a `0x` prefix. Commonly used
/// in testing to encode external test vectors (e.g. word-per-line calldata dumps) without
/// modification.
pub fn from_hex_formatted(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.replace(['\t', '\n', '\r', ' '], "");
    from_hex(&hex)
}

/// Returns `hex` without a leading `0x`/`0X`.
pub fn strip_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex)
}

/// Decodes a single ASCII hex digit.
fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
