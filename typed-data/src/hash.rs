//! Struct hashing.

use crate::{
    types::{element_type, Base},
    Data, Error, Types, MAX_DEPTH,
};
use sigil_abi::{encode_word, ParamType, Value, WORD};
use sigil_cryptography::{
    keccak256::{self, Digest},
    Hasher, Keccak256,
};
use std::collections::BTreeMap;

impl Types {
    /// Returns `keccak256(typeHash ‖ enc(member₁) ‖ ...)` for a value of struct `name`.
    ///
    /// Members are encoded in declaration order. Fields of `value` that are not declared members
    /// are ignored.
    pub fn hash_struct(&self, name: &str, value: &BTreeMap<String, Data>) -> Result<Digest, Error> {
        self.hash_nested(name, value, 0)
    }

    /// Hashes a struct found `depth` levels below the message.
    fn hash_nested(
        &self,
        name: &str,
        value: &BTreeMap<String, Data>,
        depth: usize,
    ) -> Result<Digest, Error> {
        let mut hasher = Keccak256::new();
        hasher.update(&self.type_hash(name)?);
        for member in self.members(name)? {
            let field = value.get(&member.name).ok_or_else(|| Error::MissingField {
                name: name.to_string(),
                field: member.name.clone(),
            })?;
            hasher.update(&self.encode_field(&member.kind, field, depth)?);
        }
        Ok(hasher.finalize())
    }

    /// Encodes a member of type `ty` as a single word.
    fn encode_field(&self, ty: &str, data: &Data, depth: usize) -> Result<[u8; WORD], Error> {
        if depth >= MAX_DEPTH {
            return Err(Error::DepthExceeded(MAX_DEPTH));
        }
        let (base, dimensions) = self.resolve(ty)?;
        if let Some(outer) = dimensions.last() {
            let Data::Array(items) = data else {
                return Err(invalid(ty, data));
            };
            if let Some(len) = outer {
                if items.len() != *len {
                    return Err(Error::InvalidValue(
                        ty.to_string(),
                        format!("expected {len} elements, found {}", items.len()),
                    ));
                }
            }
            let elem = element_type(ty);
            let mut hasher = Keccak256::new();
            for item in items {
                hasher.update(&self.encode_field(elem, item, depth + 1)?);
            }
            return Ok(hasher.finalize().to_array());
        }

        match (base, data) {
            (Base::Struct(name), Data::Struct(fields)) => {
                Ok(self.hash_nested(name, fields, depth + 1)?.to_array())
            }
            (Base::Atom(ParamType::Bytes), Data::Atom(Value::Bytes(bytes))) => {
                Ok(keccak256::hash(bytes).to_array())
            }
            (Base::Atom(ParamType::String), Data::Atom(Value::String(text))) => {
                Ok(keccak256::hash(text.as_bytes()).to_array())
            }
            (Base::Atom(kind), Data::Atom(value)) if kind.is_scalar() => {
                Ok(encode_word(&kind, value)?)
            }
            _ => Err(invalid(ty, data)),
        }
    }
}

fn invalid(ty: &str, data: &Data) -> Error {
    Error::InvalidValue(ty.to_string(), format!("found {}", data.describe()))
}
