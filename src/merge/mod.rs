//! Merge operations for file content
//!
//! This module provides the deep-merge used to combine a file's base content
//! with repository-level content. Content is JSON-like (`serde_json::Value`)
//! whatever format the file is eventually rendered in.
//!
//! ## Array Merging
//!
//! Arrays at matching keys are combined according to an
//! [`ArrayMergeStrategy`]. The ambient strategy comes from the file (or the
//! document default); a [`MergeDirective`] placed in the overlay overrides it
//! for a single key:
//!
//! ```yaml
//! plugins:
//!   $arrayMerge: append
//!   values: [extra-plugin]
//! ```
//!
//! ## Submodules
//!
//! - json.rs - Recursive deep merge and directive stripping

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

pub mod json;

pub use json::{deep_merge, strip_merge_directives};

/// Reserved key marking a merge directive object.
pub const ARRAY_MERGE_KEY: &str = "$arrayMerge";

/// Key holding a merge directive's values.
pub const VALUES_KEY: &str = "values";

/// How arrays at matching keys are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayMergeStrategy {
    /// The overlay array discards the base array.
    #[default]
    Replace,
    /// Overlay items follow base items.
    Append,
    /// Overlay items precede base items.
    Prepend,
}

impl ArrayMergeStrategy {
    /// Combine two arrays under this strategy.
    pub fn combine(self, base: &[Value], values: &[Value]) -> Vec<Value> {
        match self {
            ArrayMergeStrategy::Replace => values.to_vec(),
            ArrayMergeStrategy::Append => base.iter().chain(values).cloned().collect(),
            ArrayMergeStrategy::Prepend => values.iter().chain(base).cloned().collect(),
        }
    }

    /// The token used for this strategy in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayMergeStrategy::Replace => "replace",
            ArrayMergeStrategy::Append => "append",
            ArrayMergeStrategy::Prepend => "prepend",
        }
    }
}

impl fmt::Display for ArrayMergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a strategy token is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl FromStr for ArrayMergeStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "replace" => Ok(ArrayMergeStrategy::Replace),
            "append" => Ok(ArrayMergeStrategy::Append),
            "prepend" => Ok(ArrayMergeStrategy::Prepend),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// A parsed `{ $arrayMerge, values }` object.
///
/// Only `append` and `prepend` are meaningful inside a directive; a directive
/// always wins over the ambient strategy for its key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeDirective<'a> {
    /// The strategy requested by the directive.
    pub strategy: ArrayMergeStrategy,
    /// The directive's values.
    pub values: &'a [Value],
}

impl<'a> MergeDirective<'a> {
    /// Recognize a merge directive.
    ///
    /// Returns `None` for anything that is not exactly an object holding a
    /// `$arrayMerge` of `append` or `prepend` and a `values` array.
    pub fn parse(value: &'a Value) -> Option<Self> {
        let map = value.as_object()?;
        let marker = map.get(ARRAY_MERGE_KEY)?;

        let directive = match (marker.as_str(), map.get(VALUES_KEY)) {
            (Some("append"), Some(Value::Array(values))) if map.len() == 2 => Some(Self {
                strategy: ArrayMergeStrategy::Append,
                values,
            }),
            (Some("prepend"), Some(Value::Array(values))) if map.len() == 2 => Some(Self {
                strategy: ArrayMergeStrategy::Prepend,
                values,
            }),
            _ => None,
        };

        if directive.is_none() {
            log::warn!(
                "Ignoring malformed {} object ({}); it will be kept as ordinary data",
                ARRAY_MERGE_KEY,
                marker
            );
        }
        directive
    }

    /// Apply the directive to an existing base value.
    ///
    /// A missing or non-array base counts as an empty array.
    pub fn apply(&self, base: Option<&Value>) -> Value {
        let base = base.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
        Value::Array(self.strategy.combine(base, self.values))
    }
}

/// Get a human-readable type name for a JSON value
///
/// Used for logging and error messages to describe the type of a value.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
