//! Interface items: functions, events, errors, constructors, and the fallback/receive entry points.

use crate::{
    decoder::{decode_cfg, decode_params_cfg, decode_word, Config},
    encoder::encode_params,
    json::RawItem,
    signature::{selector, signature, topic, SELECTOR_LENGTH},
    DecodeError, Error, Param, ParamType, Value, WORD,
};
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use sigil_cryptography::keccak256::Digest;
use sigil_utils::hex_prefixed;
use std::{fmt, str::FromStr};

/// Whether a callable reads or writes state and whether it accepts value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    /// Returns the keyword used in both the JSON and human-readable forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pure => "pure",
            Self::View => "view",
            Self::NonPayable => "nonpayable",
            Self::Payable => "payable",
        }
    }

    /// Parses a state mutability keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "pure" => Some(Self::Pure),
            "view" => Some(Self::View),
            "nonpayable" => Some(Self::NonPayable),
            "payable" => Some(Self::Payable),
            _ => None,
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A callable function.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Function {
    /// Returns the canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// Returns the 4-byte selector.
    pub fn selector(&self) -> [u8; SELECTOR_LENGTH] {
        selector(&self.signature())
    }

    /// Encodes a call: the selector followed by the encoded arguments.
    pub fn encode_input(&self, values: &[Value]) -> Result<Bytes, Error> {
        Ok(prefixed(&self.selector(), &encode_params(&self.inputs, values)?))
    }

    /// Encodes return values.
    pub fn encode_output(&self, values: &[Value]) -> Result<Bytes, Error> {
        encode_params(&self.outputs, values)
    }

    /// Decodes call data, verifying the selector.
    pub fn decode_input(&self, data: &[u8]) -> Result<Vec<Value>, Error> {
        self.decode_input_cfg(data, &Config::default())
    }

    /// Decodes call data with `cfg`, verifying the selector.
    pub fn decode_input_cfg(&self, data: &[u8], cfg: &Config) -> Result<Vec<Value>, Error> {
        let args = strip_selector(&self.selector(), data)?;
        decode_params_cfg(&self.inputs, args, cfg)
    }

    /// Decodes return data.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Value>, Error> {
        self.decode_output_cfg(data, &Config::default())
    }

    /// Decodes return data with `cfg`.
    pub fn decode_output_cfg(&self, data: &[u8], cfg: &Config) -> Result<Vec<Value>, Error> {
        decode_params_cfg(&self.outputs, data, cfg)
    }
}

/// An event emitted to the log.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
    /// Anonymous events do not store their topic hash as the first topic.
    pub anonymous: bool,
}

impl Event {
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// Returns the topic hash (the full Keccak-256 hash of the signature).
    pub fn topic(&self) -> Digest {
        topic(&self.signature())
    }

    /// Decodes a log entry into the event's inputs, in declaration order.
    ///
    /// Indexed inputs are read from `topics` and the rest from `data`. Indexed inputs that are not
    /// scalars are stored as the hash of their encoding, which cannot be inverted: they decode to
    /// the 32-byte topic as [Value::FixedBytes].
    pub fn decode_log(&self, topics: &[[u8; WORD]], data: &[u8]) -> Result<Vec<Value>, Error> {
        self.decode_log_cfg(topics, data, &Config::default())
    }

    /// Decodes a log entry with `cfg`.
    pub fn decode_log_cfg(
        &self,
        topics: &[[u8; WORD]],
        data: &[u8],
        cfg: &Config,
    ) -> Result<Vec<Value>, Error> {
        let indexed = self.inputs.iter().filter(|p| p.indexed).count();
        let expected = indexed + usize::from(!self.anonymous);
        if topics.len() < expected {
            return Err(DecodeError::NotEnoughTopics(expected, topics.len()).into());
        }
        let mut topics = topics.iter();
        if !self.anonymous {
            let expected = self.topic();
            if let Some(found) = topics.next().filter(|found| found[..] != expected[..]) {
                return Err(Error::InvalidSelector {
                    expected: hex_prefixed(&expected),
                    found: hex_prefixed(found),
                });
            }
        }

        let body: Vec<ParamType> = self
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect();
        let mut body = decode_cfg(&body, data, cfg)?.into_iter();

        let mut values = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let next = if input.indexed {
                topics.next().map(|topic| {
                    if input.kind.is_scalar() {
                        decode_word(&input.kind, topic, cfg)
                    } else {
                        Ok(Value::FixedBytes(topic.to_vec()))
                    }
                })
            } else {
                body.next().map(Ok)
            };
            let value = next.ok_or(DecodeError::NotEnoughTopics(expected, indexed))??;
            values.push(value);
        }
        Ok(values)
    }
}

/// A custom error raised by a revert.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomError {
    pub name: String,
    pub inputs: Vec<Param>,
}

impl CustomError {
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    pub fn selector(&self) -> [u8; SELECTOR_LENGTH] {
        selector(&self.signature())
    }

    /// Encodes revert data: the selector followed by the encoded arguments.
    pub fn encode(&self, values: &[Value]) -> Result<Bytes, Error> {
        Ok(prefixed(&self.selector(), &encode_params(&self.inputs, values)?))
    }

    /// Decodes revert data, verifying the selector.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<Value>, Error> {
        self.decode_cfg(data, &Config::default())
    }

    /// Decodes revert data with `cfg`, verifying the selector.
    pub fn decode_cfg(&self, data: &[u8], cfg: &Config) -> Result<Vec<Value>, Error> {
        let args = strip_selector(&self.selector(), data)?;
        decode_params_cfg(&self.inputs, args, cfg)
    }
}

/// The constructor of a contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Constructor {
    pub inputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Constructor {
    /// Encodes deployment data: `code` followed by the encoded arguments.
    pub fn encode_input(&self, code: &[u8], values: &[Value]) -> Result<Bytes, Error> {
        Ok(prefixed(code, &encode_params(&self.inputs, values)?))
    }

    /// Decodes constructor arguments (without the leading code).
    pub fn decode_input(&self, args: &[u8]) -> Result<Vec<Value>, Error> {
        decode_params_cfg(&self.inputs, args, &Config::default())
    }
}

/// The fallback function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fallback {
    pub state_mutability: StateMutability,
}

/// The receive function (always payable).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Receive;

/// An item of a contract interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "RawItem")]
pub enum Item {
    Function(Function),
    Event(Event),
    Error(CustomError),
    Constructor(Constructor),
    Fallback(Fallback),
    Receive(Receive),
}

impl Item {
    /// Returns the name of the item, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Function(f) => Some(&f.name),
            Self::Event(e) => Some(&e.name),
            Self::Error(e) => Some(&e.name),
            _ => None,
        }
    }

    /// Returns the inputs of the item.
    pub fn inputs(&self) -> &[Param] {
        match self {
            Self::Function(f) => &f.inputs,
            Self::Event(e) => &e.inputs,
            Self::Error(e) => &e.inputs,
            Self::Constructor(c) => &c.inputs,
            Self::Fallback(_) | Self::Receive(_) => &[],
        }
    }
}

impl FromStr for Item {
    type Err = Error;

    /// Parses a human-readable signature such as `function balanceOf(address) view returns (uint256)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::human::parse_item(s)
    }
}

impl From<Function> for Item {
    fn from(f: Function) -> Self {
        Self::Function(f)
    }
}

impl From<Event> for Item {
    fn from(e: Event) -> Self {
        Self::Event(e)
    }
}

impl From<CustomError> for Item {
    fn from(e: CustomError) -> Self {
        Self::Error(e)
    }
}

impl From<Constructor> for Item {
    fn from(c: Constructor) -> Self {
        Self::Constructor(c)
    }
}

impl fmt::Display for Item {
    /// Renders the human-readable form, which parses back to an equal item.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(func) => {
                write!(f, "function {}(", func.name)?;
                write_params(f, &func.inputs)?;
                f.write_str(")")?;
                if func.state_mutability != StateMutability::NonPayable {
                    write!(f, " {}", func.state_mutability)?;
                }
                if !func.outputs.is_empty() {
                    f.write_str(" returns (")?;
                    write_params(f, &func.outputs)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            Self::Event(event) => {
                write!(f, "event {}(", event.name)?;
                write_params(f, &event.inputs)?;
                f.write_str(")")?;
                if event.anonymous {
                    f.write_str(" anonymous")?;
                }
                Ok(())
            }
            Self::Error(error) => {
                write!(f, "error {}(", error.name)?;
                write_params(f, &error.inputs)?;
                f.write_str(")")
            }
            Self::Constructor(constructor) => {
                f.write_str("constructor(")?;
                write_params(f, &constructor.inputs)?;
                f.write_str(")")?;
                if constructor.state_mutability == StateMutability::Payable {
                    f.write_str(" payable")?;
                }
                Ok(())
            }
            Self::Fallback(fallback) => {
                f.write_str("fallback() external")?;
                if fallback.state_mutability == StateMutability::Payable {
                    f.write_str(" payable")?;
                }
                Ok(())
            }
            Self::Receive(_) => f.write_str("receive() external payable"),
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[Param]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{param}")?;
    }
    Ok(())
}

fn prefixed(prefix: &[u8], body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(prefix.len() + body.len());
    buf.put_slice(prefix);
    buf.put_slice(body);
    buf.freeze()
}

/// Returns the arguments following `expected`.
fn strip_selector<'a>(expected: &[u8; SELECTOR_LENGTH], data: &'a [u8]) -> Result<&'a [u8], Error> {
    if data.len() < SELECTOR_LENGTH {
        return Err(DecodeError::EndOfBuffer {
            offset: 0,
            len: SELECTOR_LENGTH,
        }
        .into());
    }
    let (found, args) = data.split_at(SELECTOR_LENGTH);
    if found != expected {
        return Err(Error::InvalidSelector {
            expected: hex_prefixed(expected),
            found: hex_prefixed(found),
        });
    }
    Ok(args)
}
