//! Human-readable signatures.
//!
//! Parses the Solidity-like form of interface items:
//!
//! ```text
//! function transfer(address to, uint256 amount) external returns (bool)
//! event Transfer(address indexed from, address indexed to, uint256 value)
//! error InsufficientBalance(uint256 available, uint256 required)
//! constructor(string name) payable
//! balanceOf(address) view returns (uint256)
//! ```
//!
//! The leading keyword is optional (a bare signature is a function). Tuples are written inline,
//! optionally prefixed by `tuple`. Data locations and visibility are accepted and discarded.

use crate::{
    types::{array_len, MAX_DEPTH},
    Constructor, CustomError, Error, Event, Fallback, Function, Item, Param,
    ParamType, Receive, StateMutability,
};

const VISIBILITY: [&str; 4] = ["public", "external", "internal", "private"];
const LOCATIONS: [&str; 3] = ["memory", "calldata", "storage"];

/// Parses a single human-readable item.
pub fn parse_item(input: &str) -> Result<Item, Error> {
    let mut parser = Parser::new(input, true)?;
    let item = parser.item()?;
    parser.finish()?;
    Ok(item)
}

/// Parses a canonical type string such as `(uint256,address)[2][]`.
///
/// Unlike [parse_item], the `uint`/`int` aliases are rejected.
pub fn parse_type(input: &str) -> Result<ParamType, Error> {
    let mut parser = Parser::new(input, false)?;
    let kind = parser.kind()?;
    parser.finish()?;
    Ok(kind)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Number(&'a str),
    Open,
    Close,
    OpenBracket,
    CloseBracket,
    Comma,
}

fn lex(input: &str) -> Result<Vec<Token<'_>>, Error> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let token = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'(' => Token::Open,
            b')' => Token::Close,
            b'[' => Token::OpenBracket,
            b']' => Token::CloseBracket,
            b',' => Token::Comma,
            c if is_word(c) => {
                let start = i;
                while i < bytes.len() && is_word(bytes[i]) {
                    i += 1;
                }
                let word = &input[start..i];
                tokens.push(if c.is_ascii_digit() {
                    Token::Number(word)
                } else {
                    Token::Ident(word)
                });
                continue;
            }
            _ => {
                return Err(Error::InvalidSignature(format!(
                    "unexpected character at byte {i} of {input:?}"
                )))
            }
        };
        tokens.push(token);
        i += 1;
    }
    Ok(tokens)
}

fn is_word(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Accept the `uint`/`int` aliases.
    lenient: bool,
    /// Tuples and array dimensions currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, lenient: bool) -> Result<Self, Error> {
        Ok(Self {
            input,
            tokens: lex(input)?,
            pos: 0,
            lenient,
            depth: 0,
        })
    }

    /// Opens one level of nesting.
    fn nest(&mut self) -> Result<(), Error> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::InvalidSignature(format!(
                "nesting deeper than {MAX_DEPTH} in {:?}",
                self.input
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos + 1).copied()
    }

    fn error(&self, expected: &str) -> Error {
        let found = match self.peek() {
            Some(token) => format!("{token:?}"),
            None => "end of input".to_string(),
        };
        Error::InvalidSignature(format!(
            "expected {expected}, found {found} in {:?}",
            self.input
        ))
    }

    fn eat(&mut self, token: Token<'_>) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, token: Token<'_>, what: &str) -> Result<(), Error> {
        if self.eat(token) {
            return Ok(());
        }
        Err(self.error(what))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.eat(Token::Ident(keyword))
    }

    fn ident(&mut self, what: &str) -> Result<&'a str, Error> {
        match self.peek() {
            Some(Token::Ident(word)) => {
                self.pos += 1;
                Ok(word)
            }
            _ => Err(self.error(what)),
        }
    }

    fn finish(&self) -> Result<(), Error> {
        if self.pos < self.tokens.len() {
            return Err(self.error("end of input"));
        }
        Ok(())
    }

    fn item(&mut self) -> Result<Item, Error> {
        let keyword = match (self.peek(), self.peek_second()) {
            (Some(Token::Ident(word @ ("function" | "event" | "error"))), Some(Token::Ident(_)))
            | (
                Some(Token::Ident(word @ ("constructor" | "fallback" | "receive"))),
                Some(Token::Open),
            ) => {
                self.pos += 1;
                word
            }
            _ => "function",
        };

        match keyword {
            "event" => {
                let name = self.ident("event name")?.to_string();
                let inputs = self.params(true)?;
                let anonymous = self.eat_keyword("anonymous");
                Ok(Item::Event(Event {
                    name,
                    inputs,
                    anonymous,
                }))
            }
            "error" => {
                let name = self.ident("error name")?.to_string();
                let inputs = self.params(false)?;
                Ok(Item::Error(CustomError { name, inputs }))
            }
            "constructor" => {
                let inputs = self.params(false)?;
                let state_mutability = self.modifiers()?.unwrap_or_default();
                if !matches!(
                    state_mutability,
                    StateMutability::NonPayable | StateMutability::Payable
                ) {
                    return Err(Error::InvalidSignature(format!(
                        "constructor cannot be {state_mutability}"
                    )));
                }
                Ok(Item::Constructor(Constructor {
                    inputs,
                    state_mutability,
                }))
            }
            "fallback" => {
                self.expect(Token::Open, "(")?;
                self.expect(Token::Close, ")")?;
                let state_mutability = self.modifiers()?.unwrap_or_default();
                if !matches!(
                    state_mutability,
                    StateMutability::NonPayable | StateMutability::Payable
                ) {
                    return Err(Error::InvalidSignature(format!(
                        "fallback cannot be {state_mutability}"
                    )));
                }
                Ok(Item::Fallback(Fallback { state_mutability }))
            }
            "receive" => {
                self.expect(Token::Open, "(")?;
                self.expect(Token::Close, ")")?;
                match self.modifiers()? {
                    None | Some(StateMutability::Payable) => Ok(Item::Receive(Receive)),
                    Some(other) => Err(Error::InvalidSignature(format!(
                        "receive must be payable, found {other}"
                    ))),
                }
            }
            _ => {
                let name = self.ident("function name")?.to_string();
                let inputs = self.params(false)?;
                let state_mutability = self.modifiers()?.unwrap_or_default();
                let outputs = if self.eat_keyword("returns") {
                    self.params(false)?
                } else {
                    Vec::new()
                };
                Ok(Item::Function(Function {
                    name,
                    inputs,
                    outputs,
                    state_mutability,
                }))
            }
        }
    }

    /// Consumes visibility and state mutability keywords, returning the state mutability if one
    /// was given.
    fn modifiers(&mut self) -> Result<Option<StateMutability>, Error> {
        let mut state_mutability = None;
        while let Some(Token::Ident(word)) = self.peek() {
            if VISIBILITY.contains(&word) {
                self.pos += 1;
                continue;
            }
            let Some(found) = StateMutability::from_keyword(word) else {
                break;
            };
            if state_mutability.is_some() {
                return Err(self.error("a single state mutability"));
            }
            state_mutability = Some(found);
            self.pos += 1;
        }
        Ok(state_mutability)
    }

    /// Parses a parenthesized parameter list.
    fn params(&mut self, indexed: bool) -> Result<Vec<Param>, Error> {
        self.expect(Token::Open, "(")?;
        let mut params = Vec::new();
        if self.eat(Token::Close) {
            return Ok(params);
        }
        loop {
            params.push(self.param(indexed)?);
            if self.eat(Token::Close) {
                return Ok(params);
            }
            self.expect(Token::Comma, ", or )")?;
        }
    }

    fn param(&mut self, indexed: bool) -> Result<Param, Error> {
        let kind = self.kind()?;
        let mut param = Param::unnamed(kind);
        while let Some(Token::Ident(word)) = self.peek() {
            if word == "indexed" && indexed {
                param.indexed = true;
            } else if !LOCATIONS.contains(&word) {
                break;
            }
            self.pos += 1;
        }
        if let Some(Token::Ident(name)) = self.peek() {
            param.name = name.to_string();
            self.pos += 1;
        }
        Ok(param)
    }

    /// Parses a type with any array suffixes.
    fn kind(&mut self) -> Result<ParamType, Error> {
        let depth = self.depth;
        let mut kind = match (self.peek(), self.peek_second()) {
            (Some(Token::Open), _) => {
                self.nest()?;
                ParamType::Tuple(self.params(false)?)
            }
            (Some(Token::Ident("tuple")), Some(Token::Open)) => {
                self.pos += 1;
                self.nest()?;
                ParamType::Tuple(self.params(false)?)
            }
            (Some(Token::Ident(word)), _) => {
                self.pos += 1;
                ParamType::elementary(word, self.lenient)?
            }
            _ => return Err(self.error("type")),
        };
        while self.eat(Token::OpenBracket) {
            self.nest()?;
            kind = match self.peek() {
                Some(Token::CloseBracket) => ParamType::array(kind),
                Some(Token::Number(digits)) => {
                    self.pos += 1;
                    ParamType::fixed_array(kind, array_len(digits)?)
                }
                _ => return Err(self.error("array length or ]")),
            };
            self.expect(Token::CloseBracket, "]")?;
        }
        self.depth = depth;
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn function(item: Item) -> Function {
        match item {
            Item::Function(f) => f,
            other => panic!("expected function, found {other}"),
        }
    }

    #[test]
    fn test_bare_function() {
        let f = function(parse_item("transfer(address to, uint256 amount)").unwrap());
        assert_eq!(f.name, "transfer");
        assert_eq!(f.signature(), "transfer(address,uint256)");
        assert_eq!(f.inputs[0].name, "to");
        assert!(f.outputs.is_empty());
        assert_eq!(f.state_mutability, StateMutability::NonPayable);
    }

    #[test]
    fn test_full_function() {
        let f = function(
            parse_item(
                "function balances(address[] calldata owners, uint) external view returns (uint256[] memory)",
            )
            .unwrap(),
        );
        assert_eq!(f.signature(), "balances(address[],uint256)");
        assert_eq!(f.state_mutability, StateMutability::View);
        assert_eq!(f.outputs, vec![Param::unnamed(ParamType::array(ParamType::Uint(256)))]);
    }

    #[test]
    fn test_tuples() {
        let f = function(
            parse_item("fill(tuple(address maker, uint128[2] amounts)[] orders, (bool,bytes32) flag)")
                .unwrap(),
        );
        assert_eq!(f.signature(), "fill((address,uint128[2])[],(bool,bytes32))");
        let ParamType::Array(order) = &f.inputs[0].kind else {
            panic!("expected array");
        };
        let ParamType::Tuple(components) = order.as_ref() else {
            panic!("expected tuple");
        };
        assert_eq!(components[1].name, "amounts");
    }

    #[test]
    fn test_event() {
        let item =
            parse_item("event Transfer(address indexed from, address indexed to, uint256 value)")
                .unwrap();
        let Item::Event(event) = item else {
            panic!("expected event");
        };
        assert!(event.inputs[0].indexed && event.inputs[1].indexed);
        assert!(!event.inputs[2].indexed);
        assert!(!event.anonymous);
        assert_eq!(
            event.topic().to_string(),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );

        let item = parse_item("event Ping() anonymous").unwrap();
        assert!(matches!(item, Item::Event(Event { anonymous: true, .. })));
    }

    #[test]
    fn test_special_items() {
        assert!(matches!(
            parse_item("error Unauthorized(address)").unwrap(),
            Item::Error(_)
        ));
        assert_eq!(
            parse_item("constructor(string name) payable").unwrap(),
            Item::Constructor(Constructor {
                inputs: vec![Param::new("name", ParamType::String)],
                state_mutability: StateMutability::Payable,
            })
        );
        assert_eq!(
            parse_item("fallback() external").unwrap(),
            Item::Fallback(Fallback::default())
        );
        assert_eq!(
            parse_item("receive() external payable").unwrap(),
            Item::Receive(Receive)
        );
    }

    #[test]
    fn test_keyword_as_function_name() {
        // A keyword followed by `(` names a function unless it introduces a special item
        let f = function(parse_item("event(uint256)").unwrap());
        assert_eq!(f.signature(), "event(uint256)");
    }

    #[test]
    fn test_display_roundtrip() {
        for text in [
            "function transfer(address to, uint256 amount) returns (bool)",
            "function quote((uint256 a,address[2] b)[] legs) view returns (uint256, bytes)",
            "event Transfer(address indexed from, address indexed to, uint256 value)",
            "event Ping() anonymous",
            "error Unauthorized(address caller)",
            "constructor(string name) payable",
            "fallback() external payable",
            "receive() external payable",
        ] {
            let item = parse_item(text).unwrap();
            assert_eq!(item.to_string(), text);
            assert_eq!(parse_item(&item.to_string()).unwrap(), item);
        }
    }

    #[test_case("transfer(address,uint7)"; "bad width")]
    #[test_case("f(bytes0)"; "empty fixed bytes")]
    #[test_case("f(bytes33)"; "fixed bytes too large")]
    #[test_case("f(uint08)"; "leading zero")]
    #[test_case("f(uint256[0])"; "zero length array")]
    #[test_case("f(Foo)"; "unknown type")]
    #[test_case("f(tuple)"; "tuple without components")]
    fn test_invalid_type(input: &str) {
        assert!(matches!(parse_item(input), Err(Error::InvalidAbiType(_))));
    }

    #[test_case(""; "empty")]
    #[test_case("transfer"; "no parameters")]
    #[test_case("transfer(address,"; "unterminated")]
    #[test_case("transfer(address,)"; "trailing comma")]
    #[test_case("transfer(address) returns"; "returns without list")]
    #[test_case("transfer(address) extra"; "trailing token")]
    #[test_case("f(uint256[)"; "unterminated array")]
    #[test_case("f(uint256[x])"; "array length not a number")]
    #[test_case("f(address indexed a)"; "indexed outside an event")]
    #[test_case("f() view pure"; "two mutabilities")]
    #[test_case("receive() external view"; "receive not payable")]
    #[test_case("constructor() view"; "constructor view")]
    #[test_case("f(uint256 #)"; "bad character")]
    fn test_invalid_signature(input: &str) {
        assert!(matches!(parse_item(input), Err(Error::InvalidSignature(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}uint8{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_type(&nested(MAX_DEPTH)).is_ok());
        assert!(matches!(
            parse_type(&nested(MAX_DEPTH + 1)),
            Err(Error::InvalidSignature(_))
        ));

        // Far past the limit is rejected without exhausting the stack
        let input = format!("f({})", nested(100_000));
        assert!(matches!(parse_item(&input), Err(Error::InvalidSignature(_))));

        let dimensions = |count: usize| format!("uint8{}", "[]".repeat(count));
        assert!(parse_type(&dimensions(MAX_DEPTH)).is_ok());
        assert!(matches!(
            parse_type(&dimensions(100_000)),
            Err(Error::InvalidSignature(_))
        ));

        // Siblings do not add up
        let wide = format!("({})", vec![nested(MAX_DEPTH - 1); 4].join(","));
        assert!(parse_type(&wide).is_ok());
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(
            parse_type("(uint256,address)[2][]").unwrap(),
            ParamType::array(ParamType::fixed_array(
                ParamType::tuple([ParamType::Uint(256), ParamType::Address]),
                2
            ))
        );
        assert!(matches!(parse_type("uint"), Err(Error::InvalidAbiType(_))));
        assert!(matches!(
            parse_type("uint256 x"),
            Err(Error::InvalidSignature(_))
        ));
    }
}
