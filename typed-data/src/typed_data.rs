//! Complete typed-data documents.

use crate::{
    types::{element_type, Base},
    Data, Digest, Domain, Error, Member, Types, EIP712_DOMAIN, MAX_DEPTH,
};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use sigil_abi::{address::parse_address, ParamType, Value};
use sigil_cryptography::{Hasher, Keccak256};
use std::collections::BTreeMap;
use tracing::debug;

/// Prefix of the signed digest (`\x19` followed by the typed-data version byte).
const PREFIX: [u8; 2] = [0x19, 0x01];

/// A message together with its types and domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedData {
    pub types: Types,
    pub primary_type: String,
    pub domain: Domain,
    pub message: BTreeMap<String, Data>,
}

impl TypedData {
    /// Parses a document in the `eth_signTypedData_v4` JSON format:
    ///
    /// ```json
    /// {
    ///     "types": { "EIP712Domain": [...], "Mail": [{"name": "contents", "type": "string"}] },
    ///     "primaryType": "Mail",
    ///     "domain": { "name": "Ether Mail", "chainId": 1 },
    ///     "message": { "contents": "Hello, Bob!" }
    /// }
    /// ```
    ///
    /// Message fields are converted according to their declared types. Integers may be JSON
    /// numbers or decimal/hex strings; bytes and addresses are hex strings.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: RawTypedData = serde_json::from_str(json)?;
        let types = Types::new(raw.types)?;
        let domain = Domain::try_from(raw.domain)?;
        let message = if raw.primary_type == EIP712_DOMAIN {
            BTreeMap::new()
        } else {
            fields(&types, &raw.primary_type, &raw.message, 0)?
        };
        debug!(
            primary_type = %raw.primary_type,
            fields = message.len(),
            "parsed typed data"
        );
        Ok(Self {
            types,
            primary_type: raw.primary_type,
            domain,
            message,
        })
    }

    /// Returns the domain separator.
    ///
    /// If the document declares `EIP712Domain`, that declaration is used. Otherwise the struct is
    /// derived from the fields present in the domain.
    pub fn domain_separator(&self) -> Result<Digest, Error> {
        if self.types.contains(EIP712_DOMAIN) {
            return self.types.hash_struct(EIP712_DOMAIN, &self.domain.data());
        }
        self.domain.separator()
    }

    /// Returns the struct hash of the message.
    pub fn struct_hash(&self) -> Result<Digest, Error> {
        self.types.hash_struct(&self.primary_type, &self.message)
    }

    /// Returns the digest to sign: `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))`.
    ///
    /// When the primary type is `EIP712Domain`, the message is omitted.
    pub fn signing_hash(&self) -> Result<Digest, Error> {
        let mut hasher = Keccak256::new();
        hasher.update(&PREFIX);
        hasher.update(&self.domain_separator()?);
        if self.primary_type != EIP712_DOMAIN {
            hasher.update(&self.struct_hash()?);
        }
        Ok(hasher.finalize())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypedData {
    types: BTreeMap<String, Vec<Member>>,
    primary_type: String,
    #[serde(default)]
    domain: RawDomain,
    #[serde(default)]
    message: Map<String, JsonValue>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDomain {
    name: Option<String>,
    version: Option<String>,
    chain_id: Option<JsonValue>,
    verifying_contract: Option<String>,
    salt: Option<String>,
}

impl TryFrom<RawDomain> for Domain {
    type Error = Error;

    fn try_from(raw: RawDomain) -> Result<Self, Self::Error> {
        let chain_id = match &raw.chain_id {
            Some(json) => match atom(&ParamType::Uint(256), "uint256", json)? {
                Value::Uint(chain_id) => Some(chain_id),
                _ => return Err(invalid("uint256", json)),
            },
            None => None,
        };
        let verifying_contract = raw
            .verifying_contract
            .as_deref()
            .map(parse_address)
            .transpose()?;
        let salt = match raw.salt.as_deref() {
            Some(text) => match Value::parse(&ParamType::FixedBytes(32), text)? {
                Value::FixedBytes(bytes) => Some(
                    bytes
                        .try_into()
                        .map_err(|_| Error::InvalidValue("bytes32".into(), text.into()))?,
                ),
                _ => return Err(Error::InvalidValue("bytes32".into(), text.into())),
            },
            None => None,
        };
        Ok(Self {
            name: raw.name,
            version: raw.version,
            chain_id,
            verifying_contract,
            salt,
        })
    }
}

/// Converts the declared members of struct `name` found in `json`. Undeclared fields are dropped
/// and missing ones are left out (hashing reports them).
fn fields(
    types: &Types,
    name: &str,
    json: &Map<String, JsonValue>,
    depth: usize,
) -> Result<BTreeMap<String, Data>, Error> {
    let mut out = BTreeMap::new();
    for member in types.members(name)? {
        if let Some(value) = json.get(&member.name) {
            out.insert(member.name.clone(), data(types, &member.kind, value, depth)?);
        }
    }
    Ok(out)
}

/// Converts `json` into data of type `ty`, found `depth` levels below the message.
fn data(types: &Types, ty: &str, json: &JsonValue, depth: usize) -> Result<Data, Error> {
    if depth >= MAX_DEPTH {
        return Err(Error::DepthExceeded(MAX_DEPTH));
    }
    let (base, dimensions) = types.resolve(ty)?;
    if !dimensions.is_empty() {
        let JsonValue::Array(items) = json else {
            return Err(invalid(ty, json));
        };
        let elem = element_type(ty);
        return Ok(Data::Array(
            items
                .iter()
                .map(|item| data(types, elem, item, depth + 1))
                .collect::<Result<_, _>>()?,
        ));
    }
    match (base, json) {
        (Base::Struct(name), JsonValue::Object(object)) => {
            Ok(Data::Struct(fields(types, name, object, depth + 1)?))
        }
        (Base::Struct(_), _) => Err(invalid(ty, json)),
        (Base::Atom(kind), json) => Ok(Data::Atom(atom(&kind, ty, json)?)),
    }
}

/// Converts `json` into an ABI value of type `kind`.
fn atom(kind: &ParamType, ty: &str, json: &JsonValue) -> Result<Value, Error> {
    match (kind, json) {
        (ParamType::String, JsonValue::String(text)) => Ok(Value::String(text.clone())),
        (ParamType::Bool, JsonValue::Bool(value)) => Ok(Value::Bool(*value)),
        (_, JsonValue::String(text)) => Ok(Value::parse(kind, text)?),
        (ParamType::Uint(_) | ParamType::Int(_), JsonValue::Number(number)) => {
            Ok(Value::parse(kind, &number.to_string())?)
        }
        _ => Err(invalid(ty, json)),
    }
}

fn invalid(ty: &str, json: &JsonValue) -> Error {
    Error::InvalidValue(ty.to_string(), format!("found {json}"))
}
