//! JSON-like value merging
//!
//! This module provides the recursive deep merge used to layer repository
//! content over a file's base content, and the pass that removes any merge
//! directives left over afterwards.
//!
//! ## Features
//!
//! - Deep merging of objects with recursive descent
//! - Array handling with replace, append, or prepend semantics
//! - Per-key `$arrayMerge` directives that override the ambient strategy
//!
//! ## Example
//!
//! ```
//! use repo_file_sync::merge::{deep_merge, ArrayMergeStrategy};
//! use serde_json::json;
//!
//! let base = json!({"a": [1, 2], "keep": true});
//! let overlay = json!({"a": {"$arrayMerge": "append", "values": [3]}});
//!
//! let merged = deep_merge(&base, &overlay, ArrayMergeStrategy::Replace);
//! assert_eq!(merged, json!({"a": [1, 2, 3], "keep": true}));
//! ```

use log::debug;
use serde_json::{Map, Value};

use super::{value_type_name, ArrayMergeStrategy, MergeDirective};

/// Deep-merge `overlay` onto `base`, returning a new value.
///
/// Neither input is modified and the result shares no structure with them.
///
/// For every key of `overlay`:
/// - Objects on both sides: merged recursively
/// - Merge directive: resolved against the base value, ignoring `strategy`
/// - Arrays on both sides: combined using `strategy`
/// - Anything else: the overlay value replaces the base value
///
/// Keys present only in `base` are kept unchanged. If either side is not an
/// object, the overlay replaces the base outright.
pub fn deep_merge(base: &Value, overlay: &Value, strategy: ArrayMergeStrategy) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map, strategy, ""))
        }
        _ => overlay.clone(),
    }
}

fn merge_maps(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
    strategy: ArrayMergeStrategy,
    path: &str,
) -> Map<String, Value> {
    let mut merged = base.clone();

    for (key, value) in overlay {
        let key_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };
        let resolved = merge_entry(base.get(key), value, strategy, &key_path);
        merged.insert(key.clone(), resolved);
    }

    merged
}

fn merge_entry(
    existing: Option<&Value>,
    value: &Value,
    strategy: ArrayMergeStrategy,
    path: &str,
) -> Value {
    if let Some(directive) = MergeDirective::parse(value) {
        debug!(
            "Applying {} directive at '{}' ({} values)",
            directive.strategy,
            path,
            directive.values.len()
        );
        return directive.apply(existing);
    }

    match (existing, value) {
        (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map, strategy, path))
        }
        (Some(Value::Array(base_items)), Value::Array(items)) => {
            if strategy == ArrayMergeStrategy::Replace {
                debug!(
                    "Replacing array at path '{}' (old size: {}, new size: {})",
                    path,
                    base_items.len(),
                    items.len()
                );
            }
            Value::Array(strategy.combine(base_items, items))
        }
        (Some(old), new) => {
            if value_type_name(old) != value_type_name(new) {
                debug!(
                    "Type mismatch at path '{}': replacing {} with {}",
                    path,
                    value_type_name(old),
                    value_type_name(new)
                );
            }
            new.clone()
        }
        (None, new) => new.clone(),
    }
}

/// Replace every remaining merge directive with its `values` array.
///
/// Directives survive a merge when nothing was merged against them: override
/// content is never merged, and a directive under a key missing from the base
/// has nothing to combine with. Directives nested inside a directive's values
/// are stripped as well. All other structure is copied unchanged.
pub fn strip_merge_directives(value: &Value) -> Value {
    if let Some(directive) = MergeDirective::parse(value) {
        return Value::Array(directive.values.iter().map(strip_merge_directives).collect());
    }

    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), strip_merge_directives(item)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_merge_directives).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
    }
}

/// Whether any object inside `value` still uses the reserved `$arrayMerge`
/// key.
pub fn contains_merge_directive(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.contains_key(super::ARRAY_MERGE_KEY) || map.values().any(contains_merge_directive)
        }
        Value::Array(items) => items.iter().any(contains_merge_directive),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}
