//! Contract interfaces.

use crate::{
    human::parse_item, json, signature::SELECTOR_LENGTH, Constructor, CustomError, Error, Event,
    Function, Item, Value, WORD,
};
use sigil_utils::hex_prefixed;
use tracing::debug;

/// An ordered collection of interface items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Interface {
    items: Vec<Item>,
}

impl Interface {
    /// Creates an interface from `items`.
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Parses a JSON interface description.
    pub fn from_json(input: &str) -> Result<Self, Error> {
        let interface = Self::new(json::parse_items(input)?);
        debug!(items = interface.items.len(), "parsed json interface");
        Ok(interface)
    }

    /// Parses a list of human-readable signatures.
    pub fn parse_human<'a>(signatures: impl IntoIterator<Item = &'a str>) -> Result<Self, Error> {
        let items = signatures
            .into_iter()
            .map(parse_item)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(items = items.len(), "parsed human-readable interface");
        Ok(Self::new(items))
    }

    /// Renders the interface as a JSON description.
    pub fn to_json(&self) -> Result<String, Error> {
        json::to_json(&self.items)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.items.iter().filter_map(|item| match item {
            Item::Event(e) => Some(e),
            _ => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &CustomError> {
        self.items.iter().filter_map(|item| match item {
            Item::Error(e) => Some(e),
            _ => None,
        })
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.items.iter().find_map(|item| match item {
            Item::Constructor(c) => Some(c),
            _ => None,
        })
    }

    /// Returns the first function named `name`.
    ///
    /// Overloads share a name; use [Interface::function_by_selector] to pick one.
    pub fn function(&self, name: &str) -> Result<&Function, Error> {
        self.functions()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::UnknownItem(name.to_string()))
    }

    pub fn function_by_selector(
        &self,
        selector: &[u8; SELECTOR_LENGTH],
    ) -> Result<&Function, Error> {
        self.functions()
            .find(|f| &f.selector() == selector)
            .ok_or_else(|| Error::UnknownItem(hex_prefixed(selector)))
    }

    pub fn event(&self, name: &str) -> Result<&Event, Error> {
        self.events()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::UnknownItem(name.to_string()))
    }

    /// Returns the non-anonymous event whose topic is `topic`.
    pub fn event_by_topic(&self, topic: &[u8; WORD]) -> Result<&Event, Error> {
        self.events()
            .find(|e| !e.anonymous && &e.topic().to_array() == topic)
            .ok_or_else(|| Error::UnknownItem(hex_prefixed(topic)))
    }

    pub fn error(&self, name: &str) -> Result<&CustomError, Error> {
        self.errors()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::UnknownItem(name.to_string()))
    }

    pub fn error_by_selector(
        &self,
        selector: &[u8; SELECTOR_LENGTH],
    ) -> Result<&CustomError, Error> {
        self.errors()
            .find(|e| &e.selector() == selector)
            .ok_or_else(|| Error::UnknownItem(hex_prefixed(selector)))
    }

    /// Decodes call data by looking up the function from its selector.
    pub fn decode_call(&self, data: &[u8]) -> Result<(&Function, Vec<Value>), Error> {
        let function = self.function_by_selector(&selector_of(data)?)?;
        Ok((function, function.decode_input(data)?))
    }

    /// Decodes revert data raised by one of the interface's custom errors.
    pub fn decode_error(&self, data: &[u8]) -> Result<(&CustomError, Vec<Value>), Error> {
        let error = self.error_by_selector(&selector_of(data)?)?;
        Ok((error, error.decode(data)?))
    }

    /// Decodes a log entry by looking up the event from its first topic.
    pub fn decode_log(
        &self,
        topics: &[[u8; WORD]],
        data: &[u8],
    ) -> Result<(&Event, Vec<Value>), Error> {
        let first = topics
            .first()
            .ok_or(crate::DecodeError::NotEnoughTopics(1, 0))?;
        let event = self.event_by_topic(first)?;
        Ok((event, event.decode_log(topics, data)?))
    }
}

fn selector_of(data: &[u8]) -> Result<[u8; SELECTOR_LENGTH], Error> {
    data.get(..SELECTOR_LENGTH)
        .and_then(|prefix| prefix.try_into().ok())
        .ok_or_else(|| {
            crate::DecodeError::EndOfBuffer {
                offset: 0,
                len: SELECTOR_LENGTH,
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    const ERC20: [&str; 6] = [
        "function balanceOf(address owner) view returns (uint256)",
        "function transfer(address to, uint256 amount) returns (bool)",
        "function transfer(address to, uint256 amount, bytes data) returns (bool)",
        "event Transfer(address indexed from, address indexed to, uint256 value)",
        "error InsufficientBalance(uint256 available, uint256 required)",
        "constructor(string name, string symbol)",
    ];

    #[test]
    fn test_parse_human() {
        let interface = Interface::parse_human(ERC20).unwrap();
        assert_eq!(interface.items().len(), 6);
        assert_eq!(interface.functions().count(), 3);
        assert_eq!(interface.events().count(), 1);
        assert_eq!(interface.errors().count(), 1);
        assert_eq!(interface.constructor().unwrap().inputs.len(), 2);
        assert!(matches!(
            interface.function("approve"),
            Err(Error::UnknownItem(_))
        ));
        assert!(matches!(
            Interface::parse_human(["function ("]),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_overloads_by_selector() {
        let interface = Interface::parse_human(ERC20).unwrap();
        assert_eq!(
            interface.function("transfer").unwrap().signature(),
            "transfer(address,uint256)"
        );
        let overload = interface
            .function_by_selector(&crate::signature::selector(
                "transfer(address,uint256,bytes)",
            ))
            .unwrap();
        assert_eq!(overload.inputs.len(), 3);
    }

    #[test]
    fn test_json_roundtrip() {
        let interface = Interface::parse_human(ERC20).unwrap();
        let json = interface.to_json().unwrap();
        assert_eq!(Interface::from_json(&json).unwrap(), interface);
    }

    #[test]
    fn test_decode_call_and_error() {
        let interface = Interface::parse_human(ERC20).unwrap();
        let values = vec![Value::Address(Address::repeat_byte(7)), Value::from(9u64)];
        let call = interface
            .function("transfer")
            .unwrap()
            .encode_input(&values)
            .unwrap();
        let (function, decoded) = interface.decode_call(&call).unwrap();
        assert_eq!(function.name, "transfer");
        assert_eq!(decoded, values);

        let error = interface.error("InsufficientBalance").unwrap();
        let data = error
            .encode(&[Value::from(1u64), Value::Uint(U256::from(2u64))])
            .unwrap();
        let (found, decoded) = interface.decode_error(&data).unwrap();
        assert_eq!(found.name, "InsufficientBalance");
        assert_eq!(decoded[1], Value::from(2u64));

        assert!(matches!(
            interface.decode_call(&[0, 0, 0, 0]),
            Err(Error::UnknownItem(_))
        ));
        assert!(matches!(
            interface.decode_call(&[0]),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_decode_log() {
        let interface = Interface::parse_human(ERC20).unwrap();
        let event = interface.event("Transfer").unwrap();
        let mut from = [0u8; WORD];
        from[31] = 1;
        let mut to = [0u8; WORD];
        to[31] = 2;
        let topics = [event.topic().to_array(), from, to];
        let data = U256::from(5u64).to_be_bytes::<WORD>();
        let (found, values) = interface.decode_log(&topics, &data).unwrap();
        assert_eq!(found.name, "Transfer");
        assert_eq!(values[2], Value::from(5u64));
        assert!(matches!(
            interface.decode_log(&[], &data),
            Err(Error::Decode(_))
        ));
    }
}
