//! Signing domains.

use crate::{Data, Digest, Error, Member, Types, EIP712_DOMAIN};
use sigil_abi::{Address, Value, U256};
use std::collections::BTreeMap;

/// The domain a message is bound to. Every field is optional; absent fields are left out of the
/// `EIP712Domain` struct entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Domain {
    pub name: Option<String>,
    pub version: Option<String>,
    pub chain_id: Option<U256>,
    pub verifying_contract: Option<Address>,
    pub salt: Option<[u8; 32]>,
}

impl Domain {
    /// Returns the members of the `EIP712Domain` struct for the fields that are present.
    pub fn members(&self) -> Vec<Member> {
        let mut members = Vec::with_capacity(5);
        if self.name.is_some() {
            members.push(Member::new("name", "string"));
        }
        if self.version.is_some() {
            members.push(Member::new("version", "string"));
        }
        if self.chain_id.is_some() {
            members.push(Member::new("chainId", "uint256"));
        }
        if self.verifying_contract.is_some() {
            members.push(Member::new("verifyingContract", "address"));
        }
        if self.salt.is_some() {
            members.push(Member::new("salt", "bytes32"));
        }
        members
    }

    /// Returns the present fields as struct data.
    pub fn data(&self) -> BTreeMap<String, Data> {
        let mut fields = BTreeMap::new();
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), Data::from(name.as_str()));
        }
        if let Some(version) = &self.version {
            fields.insert("version".to_string(), Data::from(version.as_str()));
        }
        if let Some(chain_id) = self.chain_id {
            fields.insert("chainId".to_string(), Data::from(chain_id));
        }
        if let Some(contract) = self.verifying_contract {
            fields.insert("verifyingContract".to_string(), Data::from(contract));
        }
        if let Some(salt) = self.salt {
            fields.insert(
                "salt".to_string(),
                Data::Atom(Value::FixedBytes(salt.to_vec())),
            );
        }
        fields
    }

    /// Returns the domain separator: the struct hash of the domain under the `EIP712Domain` type
    /// derived from the present fields.
    pub fn separator(&self) -> Result<Digest, Error> {
        Types::default()
            .with(EIP712_DOMAIN, self.members())?
            .hash_struct(EIP712_DOMAIN, &self.data())
    }
}
