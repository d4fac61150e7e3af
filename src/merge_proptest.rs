//! Property-based tests for merging and interpolation.
//!
//! These tests use proptest to generate random JSON documents and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashMap;

    use crate::env::{interpolate_with, InterpolationOptions};
    use crate::merge::json::contains_merge_directive;
    use crate::merge::{deep_merge, strip_merge_directives, ArrayMergeStrategy};
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z ]{0,8}".prop_map(Value::String),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>())),
            ]
        })
    }

    fn object() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-z]{1,3}", value(), 0..5)
            .prop_map(|map| Value::Object(map.into_iter().collect::<Map<_, _>>()))
    }

    fn strategy() -> impl Strategy<Value = ArrayMergeStrategy> {
        prop_oneof![
            Just(ArrayMergeStrategy::Replace),
            Just(ArrayMergeStrategy::Append),
            Just(ArrayMergeStrategy::Prepend),
        ]
    }

    // ============================================================================
    // deep_merge property tests
    // ============================================================================

    proptest! {
        /// Property: merging two objects yields exactly the union of their keys
        #[test]
        fn deep_merge_keys_are_union(base in object(), overlay in object(), strategy in strategy()) {
            let merged = deep_merge(&base, &overlay, strategy);
            let merged = merged.as_object().unwrap();
            let base = base.as_object().unwrap();
            let overlay = overlay.as_object().unwrap();

            for key in merged.keys() {
                prop_assert!(base.contains_key(key) || overlay.contains_key(key));
            }
            for key in base.keys().chain(overlay.keys()) {
                prop_assert!(merged.contains_key(key), "missing key '{}'", key);
            }
        }

        /// Property: keys only in the overlay are copied through unchanged
        #[test]
        fn deep_merge_copies_overlay_only_keys(base in object(), overlay in object(), strategy in strategy()) {
            let merged = deep_merge(&base, &overlay, strategy);
            for (key, value) in overlay.as_object().unwrap() {
                if !base.as_object().unwrap().contains_key(key) {
                    prop_assert_eq!(&merged[key], value);
                }
            }
        }

        /// Property: keys only in the base are kept unchanged
        #[test]
        fn deep_merge_keeps_base_only_keys(base in object(), overlay in object(), strategy in strategy()) {
            let merged = deep_merge(&base, &overlay, strategy);
            for (key, value) in base.as_object().unwrap() {
                if !overlay.as_object().unwrap().contains_key(key) {
                    prop_assert_eq!(&merged[key], value);
                }
            }
        }

        /// Property: merging never mutates its inputs
        #[test]
        fn deep_merge_leaves_inputs_untouched(base in object(), overlay in object(), strategy in strategy()) {
            let base_before = base.clone();
            let overlay_before = overlay.clone();
            let _ = deep_merge(&base, &overlay, strategy);
            prop_assert_eq!(base, base_before);
            prop_assert_eq!(overlay, overlay_before);
        }

        /// Property: a non-object overlay replaces the base outright
        #[test]
        fn deep_merge_scalar_overlay_wins(base in object(), overlay in leaf(), strategy in strategy()) {
            prop_assert_eq!(deep_merge(&base, &overlay, strategy), overlay);
        }
    }

    // ============================================================================
    // strip_merge_directives property tests
    // ============================================================================

    proptest! {
        /// Property: stripping removes every directive, however deeply nested
        #[test]
        fn strip_leaves_no_directive(inner in value(), key in "[a-z]{1,3}") {
            let doc = json!({
                key.clone(): { "$arrayMerge": "append", "values": [inner.clone()] },
                "nested": { "list": { "$arrayMerge": "prepend", "values": [inner] } }
            });
            prop_assert!(contains_merge_directive(&doc));
            prop_assert!(!contains_merge_directive(&strip_merge_directives(&doc)));
        }

        /// Property: documents without directives are unchanged by stripping
        #[test]
        fn strip_is_identity_without_directives(doc in value()) {
            prop_assert_eq!(strip_merge_directives(&doc), doc);
        }
    }

    // ============================================================================
    // interpolation property tests
    // ============================================================================

    proptest! {
        /// Property: strings without `$` are never rewritten
        #[test]
        fn interpolation_without_dollar_is_identity(doc in value()) {
            let env: HashMap<String, String> = HashMap::new();
            let result = interpolate_with(&doc, InterpolationOptions { strict: true }, &env).unwrap();
            prop_assert_eq!(result, doc);
        }

        /// Property: a defined variable is substituted verbatim
        #[test]
        fn interpolation_substitutes_defined_value(name in "[A-Z_]{1,8}", value in "[a-z0-9 ]{0,12}") {
            let mut env = HashMap::new();
            env.insert(name.clone(), value.clone());
            let doc = json!(format!("<${{{}}}>", name));
            let result = interpolate_with(&doc, InterpolationOptions::default(), &env).unwrap();
            prop_assert_eq!(result, json!(format!("<{}>", value)));
        }
    }
}
