//! Canonical signatures, selectors, and event topics.
//!
//! The canonical signature of an item is its name followed by the parenthesized, comma-separated
//! canonical strings of its input types, with no whitespace or parameter names (e.g.
//! `transfer(address,uint256)`). Selectors and topics are derived from the Keccak-256 hash of
//! that string.

use crate::{types::write_list, Param};
use sigil_cryptography::keccak256::{self, Digest};
use std::fmt::{self, Write};

/// Length of a function or error selector (in bytes).
pub const SELECTOR_LENGTH: usize = 4;

/// Renders the canonical signature `name(T1,T2,...)`.
pub fn signature(name: &str, params: &[Param]) -> String {
    let mut out = String::with_capacity(name.len() + 2 + params.len() * 8);
    out.push_str(name);
    // Writing to a String cannot fail.
    let _ = write!(out, "({})", Kinds(params));
    out
}

/// Returns the first four bytes of the Keccak-256 hash of `signature`.
pub fn selector(signature: &str) -> [u8; SELECTOR_LENGTH] {
    keccak256::hash(signature.as_bytes()).selector()
}

/// Returns the full Keccak-256 hash of `signature`.
pub fn topic(signature: &str) -> Digest {
    keccak256::hash(signature.as_bytes())
}

struct Kinds<'a>(&'a [Param]);

impl fmt::Display for Kinds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.0.iter().map(|p| &p.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamType;
    use sigil_utils::hex;

    #[test]
    fn test_signature() {
        let params = [
            Param::new("to", ParamType::Address),
            Param::new("amount", ParamType::Uint(256)),
        ];
        assert_eq!(signature("transfer", &params), "transfer(address,uint256)");
        assert_eq!(signature("f", &[]), "f()");
    }

    #[test]
    fn test_signature_expands_tuples() {
        let params = [Param::new(
            "orders",
            ParamType::array(ParamType::Tuple(vec![
                Param::new("maker", ParamType::Address),
                Param::new("amounts", ParamType::fixed_array(ParamType::Uint(128), 2)),
            ])),
        )];
        assert_eq!(
            signature("fill", &params),
            "fill((address,uint128[2])[])"
        );
    }

    #[test]
    fn test_selector() {
        assert_eq!(hex(&selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex(&selector("baz(uint32,bool)")), "cdcd77c0");
        assert_eq!(hex(&selector("bar(bytes3[2])")), "fce353f6");
        assert_eq!(hex(&selector("sam(bytes,bool,uint256[])")), "a5643bf2");
        assert_eq!(
            hex(&selector("f(uint256,uint32[],bytes10,bytes)")),
            "8be65246"
        );
    }

    #[test]
    fn test_topic() {
        assert_eq!(
            topic("Transfer(address,address,uint256)").to_string(),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_names_do_not_affect_selector() {
        let named = [Param::new("a", ParamType::Bool)];
        let unnamed = [Param::unnamed(ParamType::Bool)];
        assert_eq!(
            selector(&signature("g", &named)),
            selector(&signature("g", &unnamed))
        );
        assert_ne!(selector("g(bool)"), selector("g(uint8)"));
    }
}
