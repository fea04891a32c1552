use sigil_abi::{Address, Value, I256, U256};
use std::collections::BTreeMap;

/// A typed-data value: an ABI value, a struct, or an array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Data {
    Atom(Value),
    Struct(BTreeMap<String, Data>),
    Array(Vec<Data>),
}

impl Data {
    /// Creates a struct value from `(member, value)` pairs.
    pub fn fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, Data)>) -> Self {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns a short description of the variant, for error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Atom(value) => value.describe(),
            Self::Struct(_) => "struct",
            Self::Array(_) => "array",
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Self::Atom(value)
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Self::Atom(value.into())
    }
}

impl From<u64> for Data {
    fn from(value: u64) -> Self {
        Self::Atom(value.into())
    }
}

impl From<U256> for Data {
    fn from(value: U256) -> Self {
        Self::Atom(value.into())
    }
}

impl From<I256> for Data {
    fn from(value: I256) -> Self {
        Self::Atom(value.into())
    }
}

impl From<Address> for Data {
    fn from(value: Address) -> Self {
        Self::Atom(value.into())
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Self::Atom(value.into())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Self::Atom(value.into())
    }
}
