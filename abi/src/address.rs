//! Textual addresses.
//!
//! Addresses are 20 bytes rendered as 40 hex digits. Mixed-case renderings carry an EIP-55
//! checksum: a hex letter is uppercase iff the matching nibble of the Keccak-256 hash of the
//! lowercase rendering is at least 8. All-lowercase and all-uppercase inputs carry no checksum.

use crate::Error;
use alloy_primitives::Address;
use sigil_utils::strip_prefix;
use std::str::FromStr;

/// Parses a `0x`-prefixed (or bare) 40-digit hex address, verifying the checksum of mixed-case
/// input.
pub fn parse_address(text: &str) -> Result<Address, Error> {
    let digits = strip_prefix(text.trim());
    if digits.len() != 40 {
        return Err(Error::InvalidAddress(text.to_string()));
    }
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(format!("0x{digits}"), None)
            .map_err(|err| Error::InvalidAddress(format!("{text} ({err})")));
    }
    Address::from_str(digits).map_err(|_| Error::InvalidAddress(text.to_string()))
}

/// Renders `address` with its EIP-55 checksum and a `0x` prefix.
pub fn to_checksum(address: &Address) -> String {
    address.to_checksum(None)
}
