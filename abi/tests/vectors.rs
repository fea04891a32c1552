//! Encoding examples from the Solidity ABI specification.

use sigil_abi::{Function, Item, Value};
use sigil_utils::from_hex_formatted;

fn function(signature: &str) -> Function {
    match signature.parse::<Item>().unwrap() {
        Item::Function(f) => f,
        other => panic!("expected function, found {other}"),
    }
}

/// Parses each argument from text, encodes the call, and checks it against `expected`. Then
/// decodes the expected call data back into the same values.
fn check(signature: &str, args: &[&str], expected: &str) {
    let f = function(signature);
    let values: Vec<Value> = f
        .inputs
        .iter()
        .zip(args)
        .map(|(param, text)| Value::parse(&param.kind, text).unwrap())
        .collect();
    let expected = from_hex_formatted(expected).unwrap();
    let encoded = f.encode_input(&values).unwrap();
    assert_eq!(encoded.as_ref(), expected.as_slice(), "{signature}");
    assert_eq!(f.decode_input(&expected).unwrap(), values, "{signature}");
}

#[test]
fn test_static_arguments() {
    check(
        "baz(uint32 x, bool y)",
        &["69", "true"],
        "cdcd77c0
        0000000000000000000000000000000000000000000000000000000000000045
        0000000000000000000000000000000000000000000000000000000000000001",
    );
}

#[test]
fn test_fixed_array_of_fixed_bytes() {
    check(
        "bar(bytes3[2])",
        &["[0x616263,0x646566]"],
        "fce353f6
        6162630000000000000000000000000000000000000000000000000000000000
        6465660000000000000000000000000000000000000000000000000000000000",
    );
}

#[test]
fn test_dynamic_arguments() {
    check(
        "sam(bytes, bool, uint256[])",
        &["0x64617665", "true", "[1,2,3]"],
        "a5643bf2
        0000000000000000000000000000000000000000000000000000000000000060
        0000000000000000000000000000000000000000000000000000000000000001
        00000000000000000000000000000000000000000000000000000000000000a0
        0000000000000000000000000000000000000000000000000000000000000004
        6461766500000000000000000000000000000000000000000000000000000000
        0000000000000000000000000000000000000000000000000000000000000003
        0000000000000000000000000000000000000000000000000000000000000001
        0000000000000000000000000000000000000000000000000000000000000002
        0000000000000000000000000000000000000000000000000000000000000003",
    );
}

#[test]
fn test_mixed_arguments() {
    check(
        "f(uint256, uint32[], bytes10, bytes)",
        &[
            "0x123",
            "[0x456,0x789]",
            "0x31323334353637383930",
            "0x48656c6c6f2c20776f726c6421",
        ],
        "8be65246
        0000000000000000000000000000000000000000000000000000000000000123
        0000000000000000000000000000000000000000000000000000000000000080
        3132333435363738393000000000000000000000000000000000000000000000
        00000000000000000000000000000000000000000000000000000000000000e0
        0000000000000000000000000000000000000000000000000000000000000002
        0000000000000000000000000000000000000000000000000000000000000456
        0000000000000000000000000000000000000000000000000000000000000789
        000000000000000000000000000000000000000000000000000000000000000d
        48656c6c6f2c20776f726c642100000000000000000000000000000000000000",
    );
}

#[test]
fn test_nested_dynamic_arrays() {
    check(
        "g(uint256[][], string[])",
        &["[[1,2],[3]]", r#"["one","two","three"]"#],
        "2289b18c
        0000000000000000000000000000000000000000000000000000000000000040
        0000000000000000000000000000000000000000000000000000000000000140
        0000000000000000000000000000000000000000000000000000000000000002
        0000000000000000000000000000000000000000000000000000000000000040
        00000000000000000000000000000000000000000000000000000000000000a0
        0000000000000000000000000000000000000000000000000000000000000002
        0000000000000000000000000000000000000000000000000000000000000001
        0000000000000000000000000000000000000000000000000000000000000002
        0000000000000000000000000000000000000000000000000000000000000001
        0000000000000000000000000000000000000000000000000000000000000003
        0000000000000000000000000000000000000000000000000000000000000003
        0000000000000000000000000000000000000000000000000000000000000060
        00000000000000000000000000000000000000000000000000000000000000a0
        00000000000000000000000000000000000000000000000000000000000000e0
        0000000000000000000000000000000000000000000000000000000000000003
        6f6e650000000000000000000000000000000000000000000000000000000000
        0000000000000000000000000000000000000000000000000000000000000003
        74776f0000000000000000000000000000000000000000000000000000000000
        0000000000000000000000000000000000000000000000000000000000000005
        7468726565000000000000000000000000000000000000000000000000000000",
    );
}

#[test]
fn test_value_text_roundtrip() {
    let f = function("g(uint256[][], string[])");
    for (param, text) in f
        .inputs
        .iter()
        .zip(["[[1,2],[3]]", r#"["one","two","three"]"#])
    {
        let value = Value::parse(&param.kind, text).unwrap();
        assert_eq!(Value::parse(&param.kind, &value.to_string()).unwrap(), value);
    }
}
