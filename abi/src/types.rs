//! Type descriptors.
//!
//! A [ParamType] is a closed tree: composite types own their children, so a descriptor can be
//! classified, rendered, and traversed without any lookup. Descriptors are immutable once parsed.

use crate::Error;
use std::{fmt, str::FromStr};

/// Largest integer width (in bits).
pub const MAX_BITS: usize = 256;

/// Largest fixed-bytes width (in bytes).
pub const MAX_FIXED_BYTES: usize = 32;

/// Deepest nesting of tuples and array dimensions accepted from textual descriptions.
pub const MAX_DEPTH: usize = 64;

/// The type of a single parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// `uintN`, with `N` in `8..=256` and a multiple of 8.
    Uint(usize),
    /// `intN`, with `N` in `8..=256` and a multiple of 8.
    Int(usize),
    /// `bool`.
    Bool,
    /// `address` (20 bytes).
    Address,
    /// `bytesN`, with `N` in `1..=32`.
    FixedBytes(usize),
    /// `bytes`.
    Bytes,
    /// `string`.
    String,
    /// `T[N]`.
    FixedArray(Box<ParamType>, usize),
    /// `T[]`.
    Array(Box<ParamType>),
    /// `(T1,T2,...)`.
    Tuple(Vec<Param>),
}

impl ParamType {
    /// Creates a tuple of unnamed components.
    pub fn tuple(kinds: impl IntoIterator<Item = ParamType>) -> Self {
        Self::Tuple(kinds.into_iter().map(Param::unnamed).collect())
    }

    /// Creates `T[]`.
    pub fn array(elem: ParamType) -> Self {
        Self::Array(Box::new(elem))
    }

    /// Creates `T[N]`.
    pub fn fixed_array(elem: ParamType, len: usize) -> Self {
        Self::FixedArray(Box::new(elem), len)
    }

    /// Returns true for types that occupy exactly one word and have no children.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Uint(_) | Self::Int(_) | Self::Bool | Self::Address | Self::FixedBytes(_)
        )
    }

    /// Verifies the width of an integer or fixed-bytes descriptor, which callers may build
    /// without going through the parser.
    pub(crate) fn check_width(&self) -> Result<(), Error> {
        let valid = match self {
            Self::Uint(bits) | Self::Int(bits) => valid_bits(*bits),
            Self::FixedBytes(len) => (1..=MAX_FIXED_BYTES).contains(len),
            _ => true,
        };
        if !valid {
            return Err(Error::InvalidAbiType(self.to_string()));
        }
        Ok(())
    }

    /// Parses an elementary (non-composite) type token such as `uint256` or `bytes32`.
    ///
    /// When `lenient` is set, the `uint`/`int` aliases are accepted and normalized to their 256-bit
    /// forms. Canonical inputs (JSON descriptions, signature strings) never use the aliases.
    pub fn elementary(token: &str, lenient: bool) -> Result<Self, Error> {
        match token {
            "address" => return Ok(Self::Address),
            "bool" => return Ok(Self::Bool),
            "string" => return Ok(Self::String),
            "bytes" => return Ok(Self::Bytes),
            "uint" if lenient => return Ok(Self::Uint(MAX_BITS)),
            "int" if lenient => return Ok(Self::Int(MAX_BITS)),
            _ => {}
        }
        if let Some(digits) = token.strip_prefix("uint") {
            return Ok(Self::Uint(bits(token, digits)?));
        }
        if let Some(digits) = token.strip_prefix("int") {
            return Ok(Self::Int(bits(token, digits)?));
        }
        if let Some(digits) = token.strip_prefix("bytes") {
            let len = number(token, digits)?;
            if !(1..=MAX_FIXED_BYTES).contains(&len) {
                return Err(Error::InvalidAbiType(token.to_string()));
            }
            return Ok(Self::FixedBytes(len));
        }
        Err(Error::InvalidAbiType(token.to_string()))
    }
}

/// Parses the length of a fixed array suffix (`[N]`).
pub(crate) fn array_len(digits: &str) -> Result<usize, Error> {
    let context = format!("[{digits}]");
    let len = number(&context, digits)?;
    if len == 0 {
        return Err(Error::InvalidAbiType(context));
    }
    Ok(len)
}

/// Parses a decimal literal without sign or leading zeros.
fn number(token: &str, digits: &str) -> Result<usize, Error> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    if !canonical {
        return Err(Error::InvalidAbiType(token.to_string()));
    }
    digits
        .parse()
        .map_err(|_| Error::InvalidAbiType(token.to_string()))
}

/// Returns true for integer widths in `8..=256` that are a multiple of 8.
pub(crate) fn valid_bits(bits: usize) -> bool {
    bits != 0 && bits <= MAX_BITS && bits % 8 == 0
}

fn bits(token: &str, digits: &str) -> Result<usize, Error> {
    let bits = number(token, digits)?;
    if !valid_bits(bits) {
        return Err(Error::InvalidAbiType(token.to_string()));
    }
    Ok(bits)
}

impl fmt::Display for ParamType {
    /// Renders the canonical type string: tuples expanded, no names, no whitespace.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Bool => f.write_str("bool"),
            Self::Address => f.write_str("address"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            Self::Array(elem) => write!(f, "{elem}[]"),
            Self::Tuple(components) => {
                f.write_str("(")?;
                write_list(f, components.iter().map(|c| &c.kind))?;
                f.write_str(")")
            }
        }
    }
}

/// Writes `items` separated by commas.
pub(crate) fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl FromStr for ParamType {
    type Err = Error;

    /// Parses a canonical type string such as `(uint256,address)[2][]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::human::parse_type(s)
    }
}

/// A named parameter of an interface item (or a component of a tuple).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    /// Parameter name (empty when unnamed). Decorative for encoding purposes.
    pub name: String,
    /// Parameter type.
    pub kind: ParamType,
    /// Whether the parameter is stored in a log topic (events only).
    pub indexed: bool,
    /// The `internalType` attribute of the JSON description, carried verbatim.
    pub internal_type: Option<String>,
}

impl Param {
    /// Creates a named, non-indexed parameter.
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: false,
            internal_type: None,
        }
    }

    /// Creates an unnamed, non-indexed parameter.
    pub fn unnamed(kind: ParamType) -> Self {
        Self::new(String::new(), kind)
    }

    /// Marks the parameter as indexed (or not).
    pub fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }
}

impl fmt::Display for Param {
    /// Renders the human-readable form: the type (tuple components keep their names), `indexed`
    /// if set, then the name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_named(f, &self.kind)?;
        if self.indexed {
            f.write_str(" indexed")?;
        }
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        Ok(())
    }
}

fn write_named(f: &mut fmt::Formatter<'_>, kind: &ParamType) -> fmt::Result {
    match kind {
        ParamType::Tuple(components) => {
            f.write_str("(")?;
            write_list(f, components)?;
            f.write_str(")")
        }
        ParamType::FixedArray(elem, len) => {
            write_named(f, elem)?;
            write!(f, "[{len}]")
        }
        ParamType::Array(elem) => {
            write_named(f, elem)?;
            f.write_str("[]")
        }
        _ => write!(f, "{kind}"),
    }
}

/// Splits a type string such as `Person[2][]` into its base (`Person`) and its array dimensions
/// in application order (`[Some(2), None]`, where `None` is a dynamic dimension).
pub fn split_dimensions(ty: &str) -> Result<(&str, Vec<Option<usize>>), Error> {
    let (base, mut rest) = match ty.find('[') {
        Some(i) => ty.split_at(i),
        None => (ty, ""),
    };
    let mut dimensions = Vec::new();
    while !rest.is_empty() {
        if dimensions.len() == MAX_DEPTH {
            return Err(Error::InvalidAbiType(format!(
                "more than {MAX_DEPTH} dimensions in {ty}"
            )));
        }
        let (digits, tail) = rest
            .strip_prefix('[')
            .and_then(|r| r.split_once(']'))
            .ok_or_else(|| Error::InvalidAbiType(ty.to_string()))?;
        dimensions.push(if digits.is_empty() {
            None
        } else {
            Some(array_len(digits)?)
        });
        rest = tail;
    }
    Ok((base, dimensions))
}

/// Wraps `base` in array dimensions as returned by [split_dimensions].
pub fn apply_dimensions(base: ParamType, dimensions: &[Option<usize>]) -> ParamType {
    dimensions.iter().fold(base, |kind, dim| match dim {
        Some(len) => ParamType::fixed_array(kind, *len),
        None => ParamType::array(kind),
    })
}

/// Collects the types of a parameter list.
pub fn kinds(params: &[Param]) -> Vec<ParamType> {
    params.iter().map(|p| p.kind.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("uint8", ParamType::Uint(8); "uint8")]
    #[test_case("uint256", ParamType::Uint(256); "uint256")]
    #[test_case("int16", ParamType::Int(16); "int16")]
    #[test_case("bytes1", ParamType::FixedBytes(1); "bytes1")]
    #[test_case("bytes32", ParamType::FixedBytes(32); "bytes32")]
    #[test_case("bytes", ParamType::Bytes; "bytes")]
    #[test_case("string", ParamType::String; "string")]
    #[test_case("address", ParamType::Address; "address")]
    #[test_case("bool", ParamType::Bool; "bool")]
    fn test_elementary(token: &str, expected: ParamType) {
        assert_eq!(ParamType::elementary(token, false).unwrap(), expected);
        assert_eq!(expected.to_string(), token);
    }

    #[test_case("uint7"; "width not a multiple of eight")]
    #[test_case("uint0"; "zero width")]
    #[test_case("uint264"; "width too large")]
    #[test_case("uint08"; "leading zero")]
    #[test_case("int"; "bare int alias")]
    #[test_case("uint"; "bare uint alias")]
    #[test_case("bytes0"; "empty fixed bytes")]
    #[test_case("bytes33"; "fixed bytes too large")]
    #[test_case("Uint256"; "wrong case")]
    #[test_case("uint-8"; "sign")]
    #[test_case("fixed128x18"; "decimal fixed point")]
    #[test_case("function"; "function pointer")]
    fn test_elementary_invalid(token: &str) {
        assert!(matches!(
            ParamType::elementary(token, false),
            Err(Error::InvalidAbiType(_))
        ));
    }

    #[test]
    fn test_elementary_aliases() {
        assert_eq!(
            ParamType::elementary("uint", true).unwrap(),
            ParamType::Uint(256)
        );
        assert_eq!(
            ParamType::elementary("int", true).unwrap(),
            ParamType::Int(256)
        );
    }

    #[test]
    fn test_array_len() {
        assert_eq!(array_len("3").unwrap(), 3);
        assert!(matches!(array_len("0"), Err(Error::InvalidAbiType(_))));
        assert!(matches!(array_len("03"), Err(Error::InvalidAbiType(_))));
        assert!(matches!(
            array_len("99999999999999999999999"),
            Err(Error::InvalidAbiType(_))
        ));
    }

    #[test]
    fn test_display_nested() {
        let kind = ParamType::array(ParamType::fixed_array(
            ParamType::Tuple(vec![
                Param::new("amount", ParamType::Uint(256)),
                Param::new("to", ParamType::Address),
                Param::new("inner", ParamType::tuple([ParamType::Bytes, ParamType::Bool])),
            ]),
            2,
        ));
        assert_eq!(kind.to_string(), "(uint256,address,(bytes,bool))[2][]");
    }

    #[test]
    fn test_param_display() {
        let param = Param::new(
            "orders",
            ParamType::array(ParamType::Tuple(vec![
                Param::new("maker", ParamType::Address),
                Param::unnamed(ParamType::Uint(256)),
            ])),
        );
        assert_eq!(param.to_string(), "(address maker,uint256)[] orders");
        let param = Param::new("from", ParamType::Address).with_indexed(true);
        assert_eq!(param.to_string(), "address indexed from");
    }

    #[test]
    fn test_split_dimensions() {
        assert_eq!(split_dimensions("uint8").unwrap(), ("uint8", vec![]));
        assert_eq!(
            split_dimensions("Person[2][]").unwrap(),
            ("Person", vec![Some(2), None])
        );
        assert_eq!(
            apply_dimensions(ParamType::Bool, &[Some(2), None]),
            ParamType::array(ParamType::fixed_array(ParamType::Bool, 2))
        );
        for ty in ["uint8[", "uint8[0]", "uint8[2]x", "uint8]["] {
            assert!(matches!(
                split_dimensions(ty),
                Err(Error::InvalidAbiType(_))
            ));
        }

        let deep = format!("uint8{}", "[]".repeat(MAX_DEPTH));
        assert_eq!(split_dimensions(&deep).unwrap().1.len(), MAX_DEPTH);
        let deeper = format!("uint8{}", "[]".repeat(MAX_DEPTH + 1));
        assert!(matches!(
            split_dimensions(&deeper),
            Err(Error::InvalidAbiType(_))
        ));
    }

    #[test]
    fn test_check_width() {
        for kind in [
            ParamType::Uint(0),
            ParamType::Uint(7),
            ParamType::Int(0),
            ParamType::Int(264),
            ParamType::FixedBytes(0),
            ParamType::FixedBytes(40),
        ] {
            assert!(matches!(kind.check_width(), Err(Error::InvalidAbiType(_))));
        }
        for kind in [
            ParamType::Uint(8),
            ParamType::Int(256),
            ParamType::FixedBytes(32),
            ParamType::String,
        ] {
            assert!(kind.check_width().is_ok());
        }
    }

    #[test]
    fn test_from_str() {
        let kind: ParamType = "(uint256,address)[2][]".parse().unwrap();
        assert_eq!(
            kind,
            ParamType::array(ParamType::fixed_array(
                ParamType::tuple([ParamType::Uint(256), ParamType::Address]),
                2
            ))
        );
        assert!(matches!(
            "uint".parse::<ParamType>(),
            Err(Error::InvalidAbiType(_))
        ));
    }
}
