use beacon_core::constants::PII_KEYS;
use beacon_privacy::scrub_pii;
use proptest::prelude::*;
use serde_json::{Map, Value};

fn contains_pii_key(value: &Value) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| PII_KEYS.contains(&k.as_str()) || contains_pii_key(v)),
        _ => false,
    }
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(PII_KEYS.to_vec()).prop_map(str::to_string),
        "[a-z_]{1,8}",
    ]
}

fn arb_object() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop::collection::vec((arb_key(), inner), 0..6)
            .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map<_, _>>()))
    })
}

proptest! {
    #[test]
    fn scrubbed_objects_never_contain_pii_keys(input in arb_object()) {
        let out = Value::Object(scrub_pii(&input));
        prop_assert!(!contains_pii_key(&out));
    }

    #[test]
    fn scrubbing_is_idempotent(input in arb_object()) {
        let once = Value::Object(scrub_pii(&input));
        let twice = Value::Object(scrub_pii(&once));
        prop_assert_eq!(once, twice);
    }
}
