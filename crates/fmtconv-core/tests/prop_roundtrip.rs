/// Property-based roundtrip tests.
///
/// Uses `proptest` to generate random values and check that:
/// - JSON and YAML reproduce any value exactly, key order included
/// - XML reproduces a single-key mapping of string leaves exactly
/// - XML hands back any other mapping wrapped as `{"root": value}`
///
/// Strategies generate:
/// - Strings with edge cases (empty, keyword-like, number-like, unicode, escapes)
/// - Integers across the i64 and u64 range, floats with a short decimal expansion
/// - Nested mappings and sequences up to 3 levels deep
/// - XML element trees with attributes, text leaves and repeated children
use fmtconv_core::{decode, encode, Format, Map, Value};
use proptest::prelude::*;

// ============================================================================
// Strategies for JSON/YAML values
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,12}").unwrap()
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{0,20}",
        Just(String::new()),
        Just("true".to_string()),
        Just("null".to_string()),
        Just("~".to_string()),
        Just("42".to_string()),
        Just("3.14".to_string()),
        Just("-1".to_string()),
        Just(" padded ".to_string()),
        Just("- dash".to_string()),
        Just("key: value".to_string()),
        Just("# hash".to_string()),
        Just("caf\u{00e9} \u{03a9}".to_string()),
        Just("\u{4f60}\u{597d}".to_string()),
        Just("say \"hi\"".to_string()),
        Just("back\\slash".to_string()),
        Just("tab\there".to_string()),
    ]
}

fn arb_integer() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
    ]
}

/// Floats with at most four decimals and a non-zero fraction, so every
/// format prints them with a decimal point.
fn arb_float() -> impl Strategy<Value = Value> {
    (-100_000_000i64..100_000_000i64, 1u32..5u32).prop_filter_map(
        "must have a fractional part",
        |(mantissa, decimals)| {
            let f = mantissa as f64 / 10f64.powi(decimals as i32);
            (f.fract() != 0.0).then_some(Value::Float(f))
        },
    )
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_string().prop_map(Value::String),
        arb_integer(),
        arb_float(),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

fn arb_value_inner(depth: u32) -> BoxedStrategy<Value> {
    if depth == 0 {
        arb_scalar().boxed()
    } else {
        prop_oneof![
            4 => arb_scalar(),
            2 => prop::collection::vec((arb_key(), arb_value_inner(depth - 1)), 0..5)
                .prop_map(|pairs| pairs.into_iter().collect::<Value>()),
            2 => prop::collection::vec(arb_value_inner(depth - 1), 0..5)
                .prop_map(Value::Sequence),
        ]
        .boxed()
    }
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_value_inner(3)
}

// ============================================================================
// Strategies for XML-representable values
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,8}").unwrap()
}

/// Text that survives XML's whitespace trimming: no leading or trailing spaces.
fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9]{1,12}",
        "[a-zA-Z0-9][a-zA-Z0-9 <>&'\"]{0,10}[a-zA-Z0-9]",
        Just("Za\u{017c}\u{00f3}\u{0142}\u{0107} \u{03a9}".to_string()),
    ]
}

/// An element's content: a text leaf, or attributes followed by child elements.
fn arb_element_inner(depth: u32) -> BoxedStrategy<Value> {
    let leaf = prop_oneof![
        4 => arb_text().prop_map(Value::String),
        1 => Just(Value::Null),
    ];
    if depth == 0 {
        leaf.boxed()
    } else {
        let attributes = prop::collection::vec((arb_name(), arb_text()), 0..3);
        let children = prop::collection::vec(
            (arb_name(), arb_child(depth - 1)),
            1..4,
        );
        prop_oneof![
            2 => leaf,
            3 => (attributes, children).prop_map(|(attributes, children)| {
                let mut map = Map::new();
                for (name, text) in attributes {
                    map.insert(format!("@{name}"), Value::String(text));
                }
                for (name, child) in children {
                    map.insert(name, child);
                }
                Value::Mapping(map)
            }),
        ]
        .boxed()
    }
}

/// A child is one element or a run of at least two same-named elements.
fn arb_child(depth: u32) -> BoxedStrategy<Value> {
    prop_oneof![
        4 => arb_element_inner(depth),
        1 => prop::collection::vec(arb_element_inner(depth), 2..4).prop_map(Value::Sequence),
    ]
    .boxed()
}

fn arb_document() -> impl Strategy<Value = Value> {
    (arb_name(), arb_element_inner(3))
        .prop_map(|(name, content)| std::iter::once((name, content)).collect::<Value>())
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// decode_json(encode_json(v)) == v
    #[test]
    fn json_roundtrip_preserves_value(value in arb_value()) {
        let text = encode(Format::Json, &value).unwrap();
        let back = decode(Format::Json, &text).unwrap();
        prop_assert_eq!(&value, &back, "JSON: {}", text);
    }

    /// decode_yaml(encode_yaml(v)) == v
    #[test]
    fn yaml_roundtrip_preserves_value(value in arb_value()) {
        let text = encode(Format::Yaml, &value).unwrap();
        let back = decode(Format::Yaml, &text).unwrap();
        prop_assert_eq!(&value, &back, "YAML: {}", text);
    }

    /// JSON → YAML → JSON text is stable.
    #[test]
    fn json_yaml_json_is_stable(value in arb_value()) {
        let json = encode(Format::Json, &value).unwrap();
        let yaml = encode(Format::Yaml, &decode(Format::Json, &json).unwrap()).unwrap();
        let json_again = encode(Format::Json, &decode(Format::Yaml, &yaml).unwrap()).unwrap();
        prop_assert_eq!(json, json_again);
    }

    /// A single-key mapping of string leaves comes back unchanged.
    #[test]
    fn xml_roundtrip_single_key_mapping(value in arb_document()) {
        let text = encode(Format::Xml, &value).unwrap();
        let back = decode(Format::Xml, &text).unwrap();
        prop_assert_eq!(&value, &back, "XML: {}", text);
    }

    /// Any other mapping comes back under a synthetic root.
    #[test]
    fn xml_wraps_multi_key_mapping(
        first in arb_document(),
        second in arb_document(),
    ) {
        let mut map = Map::new();
        for doc in [first, second] {
            if let Value::Mapping(entries) = doc {
                map.extend(entries);
            }
        }
        prop_assume!(map.len() >= 2);
        let value = Value::Mapping(map);

        let text = encode(Format::Xml, &value).unwrap();
        let back = decode(Format::Xml, &text).unwrap();
        let expected: Value = std::iter::once(("root", value)).collect();
        prop_assert_eq!(&expected, &back, "XML: {}", text);
    }
}
