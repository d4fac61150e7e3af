//! # Environment Variable Interpolation
//!
//! Rewrites string values inside file content, substituting `${...}`
//! expressions with environment variable values.
//!
//! ## Syntax
//!
//! - `${NAME}` - the value of `NAME`. When `NAME` is undefined, strict mode
//!   fails and non-strict mode leaves the placeholder as written.
//! - `${NAME:-default}` - the value of `NAME`, or `default` when `NAME` is
//!   undefined. A variable set to the empty string counts as defined, so the
//!   default is *not* used for it.
//! - `${NAME:?message}` - the value of `NAME`; when undefined this always
//!   fails, in either mode, with an error naming `NAME` and `message`.
//!
//! `NAME` is made of ASCII letters, digits, and underscores. A `$` that does
//! not start one of these forms is copied verbatim; there is no escape syntax.
//! Substituted text is not scanned again.
//!
//! Only string values are rewritten. Object keys, numbers, booleans, and
//! nulls pass through unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_]+)(?::([-?])([^}]*))?\}").expect("placeholder pattern is valid")
});

/// A read-only source of environment variable values.
pub trait EnvSource {
    /// Look up a single variable. `None` means undefined; an empty string is
    /// a defined value.
    fn get(&self, name: &str) -> Option<String>;
}

/// The current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// Options controlling interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpolationOptions {
    /// Fail on an undefined `${NAME}` instead of leaving it in place.
    pub strict: bool,
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Interpolate every string in `value` against the process environment.
pub fn interpolate(value: &Value, options: InterpolationOptions) -> Result<Value> {
    interpolate_with(value, options, &ProcessEnv)
}

/// Interpolate every string in `value` against `env`.
pub fn interpolate_with<E>(value: &Value, options: InterpolationOptions, env: &E) -> Result<Value>
where
    E: EnvSource + ?Sized,
{
    match value {
        Value::String(text) => interpolate_str(text, options, env).map(Value::String),
        Value::Array(items) => items
            .iter()
            .map(|item| interpolate_with(item, options, env))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut resolved = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                resolved.insert(key.clone(), interpolate_with(item, options, env)?);
            }
            Ok(Value::Object(resolved))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
    }
}

/// Interpolate a single string.
pub fn interpolate_str<E>(input: &str, options: InterpolationOptions, env: &E) -> Result<String>
where
    E: EnvSource + ?Sized,
{
    let mut output = String::with_capacity(input.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        output.push_str(&input[last..whole.start()]);
        output.push_str(&resolve(&caps, whole.as_str(), options, env)?);
        last = whole.end();
    }

    output.push_str(&input[last..]);
    Ok(output)
}

fn resolve<E>(caps: &Captures<'_>, placeholder: &str, options: InterpolationOptions, env: &E) -> Result<String>
where
    E: EnvSource + ?Sized,
{
    let name = &caps[1];
    let modifier = caps.get(2).map(|m| m.as_str());
    let operand = caps.get(3).map_or("", |m| m.as_str());

    match (env.get(name), modifier) {
        (Some(value), _) => Ok(value),
        (None, Some("-")) => Ok(operand.to_string()),
        (None, Some("?")) => Err(Error::MissingEnvVar {
            name: name.to_string(),
            message: (!operand.is_empty()).then(|| operand.to_string()),
        }),
        (None, _) if options.strict => Err(Error::MissingEnvVar {
            name: name.to_string(),
            message: None,
        }),
        (None, _) => Ok(placeholder.to_string()),
    }
}
