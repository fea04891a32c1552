#![no_main]

use arbitrary::{Arbitrary, Result, Unstructured};
use libfuzzer_sys::fuzz_target;
use sigil_abi::{decode, decode_cfg, encode, Config, ParamType};

const MAX_DEPTH: usize = 3;

fn kind(u: &mut Unstructured<'_>, depth: usize) -> Result<ParamType> {
    let choices = if depth >= MAX_DEPTH { 7 } else { 10 };
    Ok(match u.choose_index(choices)? {
        0 => ParamType::Uint(8 * u.int_in_range(1..=32)?),
        1 => ParamType::Int(8 * u.int_in_range(1..=32)?),
        2 => ParamType::Bool,
        3 => ParamType::Address,
        4 => ParamType::FixedBytes(u.int_in_range(1..=32)?),
        5 => ParamType::Bytes,
        6 => ParamType::String,
        7 => ParamType::fixed_array(kind(u, depth + 1)?, u.int_in_range(1..=4)?),
        8 => ParamType::array(kind(u, depth + 1)?),
        _ => {
            // Arrays of empty tuples are bounded by the remaining words, so they do not
            // round trip.
            let count = u.int_in_range(1..=3)?;
            let components = (0..count)
                .map(|_| kind(u, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            ParamType::tuple(components)
        }
    })
}

#[derive(Debug)]
struct FuzzInput {
    kinds: Vec<ParamType>,
    data: Vec<u8>,
}

impl<'a> Arbitrary<'a> for FuzzInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let count = u.int_in_range(1..=4)?;
        let kinds = (0..count)
            .map(|_| kind(u, 0))
            .collect::<Result<Vec<_>>>()?;
        let data = u.arbitrary()?;
        Ok(Self { kinds, data })
    }
}

fn fuzz(input: FuzzInput) {
    // Tolerant decoding must never panic
    let _ = decode_cfg(&input.kinds, &input.data, &Config::tolerant());

    // Anything accepted in strict mode re-encodes to an equivalent encoding
    let Ok(values) = decode(&input.kinds, &input.data) else {
        return;
    };
    let encoded = encode(&input.kinds, &values).expect("decoded values must encode");
    let decoded = decode(&input.kinds, &encoded).expect("canonical encoding must decode");
    assert_eq!(values, decoded);
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
