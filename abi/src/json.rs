//! The JSON interface description.
//!
//! An interface is a JSON array of items, each with a `type` (`function` when absent), a `name`,
//! `inputs`, and (for functions) `outputs` and `stateMutability`. Parameters carry a canonical
//! `type` string, with tuples written as `tuple` (plus any array suffixes) and their members listed
//! in `components`.

use crate::{
    types::{apply_dimensions, split_dimensions},
    Constructor, CustomError, Error, Event, Fallback, Function, Item, Param, ParamType, Receive,
    StateMutability,
};
use serde::{Deserialize, Serialize};

/// Parses a JSON interface description.
pub fn parse_items(json: &str) -> Result<Vec<Item>, Error> {
    let raw: Vec<RawItem> = serde_json::from_str(json).map_err(|e| Error::Json(e.to_string()))?;
    raw.into_iter().map(Item::try_from).collect()
}

/// Renders `items` as a JSON interface description.
pub fn to_json(items: &[Item]) -> Result<String, Error> {
    serde_json::to_string(items).map_err(|e| Error::Json(e.to_string()))
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawItem {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inputs: Option<Vec<RawParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outputs: Option<Vec<RawParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_mutability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anonymous: Option<bool>,
    // Pre-0.5 compilers describe mutability with these flags.
    #[serde(default, skip_serializing)]
    constant: Option<bool>,
    #[serde(default, skip_serializing)]
    payable: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Vec<RawParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indexed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    internal_type: Option<String>,
}

impl TryFrom<RawParam> for Param {
    type Error = Error;

    fn try_from(raw: RawParam) -> Result<Self, Self::Error> {
        let (base, dimensions) = split_dimensions(&raw.kind)?;
        let base = match (base, raw.components) {
            ("tuple", Some(components)) => ParamType::Tuple(params(components)?),
            ("tuple", None) => {
                return Err(Error::InvalidParameter(format!(
                    "{} without components",
                    raw.kind
                )))
            }
            (_, Some(_)) => {
                return Err(Error::InvalidParameter(format!(
                    "components on non-tuple type {}",
                    raw.kind
                )))
            }
            (base, None) => ParamType::elementary(base, false)?,
        };
        Ok(Self {
            name: raw.name,
            kind: apply_dimensions(base, &dimensions),
            indexed: raw.indexed.unwrap_or(false),
            internal_type: raw.internal_type,
        })
    }
}

fn params(raw: Vec<RawParam>) -> Result<Vec<Param>, Error> {
    raw.into_iter().map(Param::try_from).collect()
}

fn state_mutability(raw: &RawItem) -> Result<StateMutability, Error> {
    if let Some(word) = &raw.state_mutability {
        return StateMutability::from_keyword(word)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown state mutability {word}")));
    }
    Ok(match (raw.constant, raw.payable) {
        (Some(true), _) => StateMutability::View,
        (_, Some(true)) => StateMutability::Payable,
        _ => StateMutability::NonPayable,
    })
}

impl TryFrom<RawItem> for Item {
    type Error = Error;

    fn try_from(raw: RawItem) -> Result<Self, Error> {
        let state_mutability = state_mutability(&raw)?;
        let kind = raw.kind.unwrap_or_else(|| "function".to_string());
        let name = raw
            .name
            .ok_or_else(|| Error::InvalidParameter(format!("{kind} without a name")));
        let inputs = params(raw.inputs.unwrap_or_default())?;
        Ok(match kind.as_str() {
            "function" => Item::Function(Function {
                name: name?,
                inputs,
                outputs: params(raw.outputs.unwrap_or_default())?,
                state_mutability,
            }),
            "event" => Item::Event(Event {
                name: name?,
                inputs,
                anonymous: raw.anonymous.unwrap_or(false),
            }),
            "error" => Item::Error(CustomError {
                name: name?,
                inputs,
            }),
            "constructor" => Item::Constructor(Constructor {
                inputs,
                state_mutability,
            }),
            "fallback" => Item::Fallback(Fallback { state_mutability }),
            "receive" => Item::Receive(Receive),
            other => {
                return Err(Error::InvalidParameter(format!(
                    "unknown item type {other}"
                )))
            }
        })
    }
}

impl RawParam {
    fn new(param: &Param, event: bool) -> Self {
        let (kind, components) = type_string(&param.kind);
        Self {
            name: param.name.clone(),
            kind,
            components,
            indexed: event.then_some(param.indexed),
            internal_type: param.internal_type.clone(),
        }
    }
}

/// Returns the JSON `type` string of `kind` and, for tuples (or arrays of tuples), the components.
fn type_string(kind: &ParamType) -> (String, Option<Vec<RawParam>>) {
    match kind {
        ParamType::FixedArray(elem, len) => {
            let (base, components) = type_string(elem);
            (format!("{base}[{len}]"), components)
        }
        ParamType::Array(elem) => {
            let (base, components) = type_string(elem);
            (format!("{base}[]"), components)
        }
        ParamType::Tuple(components) => (
            "tuple".to_string(),
            Some(components.iter().map(|c| RawParam::new(c, false)).collect()),
        ),
        _ => (kind.to_string(), None),
    }
}

fn raw_params(params: &[Param], event: bool) -> Option<Vec<RawParam>> {
    Some(params.iter().map(|p| RawParam::new(p, event)).collect())
}

impl From<Item> for RawItem {
    fn from(item: Item) -> Self {
        let kind = |kind: &str| Some(kind.to_string());
        match item {
            Item::Function(f) => Self {
                kind: kind("function"),
                name: Some(f.name),
                inputs: raw_params(&f.inputs, false),
                outputs: raw_params(&f.outputs, false),
                state_mutability: Some(f.state_mutability.to_string()),
                ..Self::default()
            },
            Item::Event(e) => Self {
                kind: kind("event"),
                name: Some(e.name),
                inputs: raw_params(&e.inputs, true),
                anonymous: Some(e.anonymous),
                ..Self::default()
            },
            Item::Error(e) => Self {
                kind: kind("error"),
                name: Some(e.name),
                inputs: raw_params(&e.inputs, false),
                ..Self::default()
            },
            Item::Constructor(c) => Self {
                kind: kind("constructor"),
                inputs: raw_params(&c.inputs, false),
                state_mutability: Some(c.state_mutability.to_string()),
                ..Self::default()
            },
            Item::Fallback(f) => Self {
                kind: kind("fallback"),
                state_mutability: Some(f.state_mutability.to_string()),
                ..Self::default()
            },
            Item::Receive(_) => Self {
                kind: kind("receive"),
                state_mutability: Some(StateMutability::Payable.to_string()),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERC20: &str = r#"[
        {
            "type": "function",
            "name": "transfer",
            "inputs": [
                {"name": "to", "type": "address", "internalType": "address"},
                {"name": "amount", "type": "uint256", "internalType": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool", "internalType": "bool"}],
            "stateMutability": "nonpayable"
        },
        {
            "type": "event",
            "name": "Transfer",
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ],
            "anonymous": false
        },
        {"type": "error", "name": "Unauthorized", "inputs": []},
        {"type": "constructor", "inputs": [], "stateMutability": "payable"},
        {"type": "receive", "stateMutability": "payable"}
    ]"#;

    #[test]
    fn test_parse_items() {
        let items = parse_items(ERC20).unwrap();
        assert_eq!(items.len(), 5);
        let Item::Function(transfer) = &items[0] else {
            panic!("expected function");
        };
        assert_eq!(transfer.signature(), "transfer(address,uint256)");
        assert_eq!(transfer.inputs[0].internal_type.as_deref(), Some("address"));
        let Item::Event(event) = &items[1] else {
            panic!("expected event");
        };
        assert!(event.inputs[0].indexed && !event.inputs[2].indexed);
        assert!(matches!(items[2], Item::Error(_)));
        assert!(matches!(
            items[3],
            Item::Constructor(Constructor {
                state_mutability: StateMutability::Payable,
                ..
            })
        ));
        assert_eq!(items[4], Item::Receive(Receive));
    }

    #[test]
    fn test_tuple_components() {
        let json = r#"[{
            "name": "fill",
            "inputs": [{
                "name": "orders",
                "type": "tuple[2][]",
                "components": [
                    {"name": "maker", "type": "address"},
                    {"name": "legs", "type": "tuple[]", "components": [{"name": "x", "type": "int8"}]}
                ]
            }]
        }]"#;
        let items = parse_items(json).unwrap();
        let Item::Function(fill) = &items[0] else {
            panic!("expected function");
        };
        assert_eq!(fill.signature(), "fill((address,(int8)[])[2][])");
        assert_eq!(fill.state_mutability, StateMutability::NonPayable);
    }

    #[test]
    fn test_legacy_flags() {
        let json = r#"[
            {"name": "a", "inputs": [], "outputs": [], "constant": true},
            {"name": "b", "inputs": [], "outputs": [], "payable": true},
            {"name": "c", "inputs": [], "outputs": [], "constant": true, "stateMutability": "pure"}
        ]"#;
        let mutabilities: Vec<_> = parse_items(json)
            .unwrap()
            .into_iter()
            .map(|item| match item {
                Item::Function(f) => f.state_mutability,
                other => panic!("expected function, found {other}"),
            })
            .collect();
        assert_eq!(
            mutabilities,
            vec![
                StateMutability::View,
                StateMutability::Payable,
                StateMutability::Pure
            ]
        );
    }

    #[test]
    fn test_invalid() {
        let cases = [
            (r#"[{"name": "f", "inputs": [{"name": "x", "type": "tuple"}]}]"#, "param"),
            (
                r#"[{"name": "f", "inputs": [{"name": "x", "type": "uint8", "components": []}]}]"#,
                "param",
            ),
            (r#"[{"type": "function", "inputs": []}]"#, "param"),
            (r#"[{"type": "modifier", "name": "m"}]"#, "param"),
            (r#"[{"name": "f", "inputs": [{"name": "x", "type": "uint"}]}]"#, "type"),
            (r#"[{"name": "f", "inputs": [{"name": "x", "type": "bytes33"}]}]"#, "type"),
            (r#"{"not": "a list"}"#, "json"),
        ];
        for (json, expected) in cases {
            let result = parse_items(json);
            match expected {
                "param" => assert!(matches!(result, Err(Error::InvalidParameter(_))), "{json}"),
                "type" => assert!(matches!(result, Err(Error::InvalidAbiType(_))), "{json}"),
                _ => assert!(matches!(result, Err(Error::Json(_))), "{json}"),
            }
        }
    }

    #[test]
    fn test_item_from_raw() {
        // A missing type means function, which needs a name
        assert!(matches!(
            Item::try_from(RawItem::default()),
            Err(Error::InvalidParameter(_))
        ));

        let receive = RawItem {
            kind: Some("receive".into()),
            state_mutability: Some("payable".into()),
            ..RawItem::default()
        };
        assert_eq!(Item::try_from(receive).unwrap(), Item::Receive(Receive));

        let error = RawItem {
            kind: Some("error".into()),
            name: Some("Unauthorized".into()),
            ..RawItem::default()
        };
        let Item::Error(error) = Item::try_from(error).unwrap() else {
            panic!("expected error");
        };
        assert_eq!(error.signature(), "Unauthorized()");
    }

    #[test]
    fn test_json_roundtrip() {
        let items = parse_items(ERC20).unwrap();
        let json = to_json(&items).unwrap();
        assert_eq!(parse_items(&json).unwrap(), items);

        let tuple = vec![Item::Function(Function {
            name: "f".into(),
            inputs: vec![Param::new(
                "x",
                ParamType::array(ParamType::tuple([ParamType::Bool, ParamType::Bytes])),
            )],
            outputs: vec![],
            state_mutability: StateMutability::View,
        })];
        let json = to_json(&tuple).unwrap();
        assert!(json.contains(r#""type":"tuple[]""#));
        assert_eq!(parse_items(&json).unwrap(), tuple);
    }
}
