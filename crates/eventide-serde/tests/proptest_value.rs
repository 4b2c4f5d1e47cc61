//! Property-based round-trip tests for the dynamic `Value` tree over the
//! in-memory `ValueSerializer`/`ValueDeserializer` back-end.

use eventide_serde::{Deserialize, Serialize, Value, ValueDeserializer, ValueSerializer};
use proptest::prelude::*;

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::Uint),
        (-1.0e12f64..1.0e12).prop_map(Value::Float),
        any::<char>().prop_map(Value::Char),
        ".{0,16}".prop_map(Value::Str),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::Seq),
            proptest::collection::vec((arb_key(), inner), 0..8).prop_map(|mut entries| {
                let mut seen = std::collections::HashSet::new();
                entries.retain(|(k, _)| seen.insert(k.clone()));
                Value::Map(entries)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn value_round_trips_through_in_memory_backend(value in arb_value()) {
        let written = value.serialize(ValueSerializer).expect("serialize");
        let read = Value::deserialize(&ValueDeserializer::new(&written)).expect("deserialize");
        prop_assert_eq!(read, value);
    }

    #[test]
    fn non_finite_floats_always_decode_as_none(v in prop_oneof![
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]) {
        let written = v.serialize(ValueSerializer).expect("serialize");
        prop_assert_eq!(written, Value::None);
    }

    #[test]
    fn vec_of_i64_round_trips(items in proptest::collection::vec(any::<i64>(), 0..32)) {
        let written = items.serialize(ValueSerializer).expect("serialize");
        let read: Vec<i64> = Deserialize::deserialize(&ValueDeserializer::new(&written)).expect("deserialize");
        prop_assert_eq!(read, items);
    }
}
