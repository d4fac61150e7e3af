//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent a sync document and
//! the logic for loading one from YAML or JSON text.
//!
//! ## Key Components
//!
//! - **`RawDocument`**: The unvalidated document: declared files, an optional
//!   document-wide merge strategy, and the list of target repositories.
//!
//! - **`FileSpec`**: The base definition of one target file.
//!
//! - **`RawRepoEntry`**: One logical repository entry. Its `git` field may name
//!   a single URL or several, each of which becomes an independent target.
//!
//! - **`FileOverride`**: A per-repository change to one file: either `false`
//!   (exclude it) or an object carrying content and flags.
//!
//! ## Example
//!
//! ```yaml
//! mergeStrategy: append
//! files:
//!   .prettierrc.json:
//!     content:
//!       semi: false
//!       plugins: [prettier-plugin-sh]
//! repos:
//!   - git:
//!       - git@github.com:org/service-a.git
//!       - git@github.com:org/service-b.git
//!   - git: git@github.com:org/legacy.git
//!     files:
//!       .prettierrc.json:
//!         content:
//!           semi: true
//! ```
//!
//! The engine never calls the loader functions here; they exist so the
//! binary and library users have a single way to obtain a `RawDocument`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// The unvalidated input document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Declared target files, keyed by relative file name.
    #[serde(default)]
    pub files: BTreeMap<String, FileSpec>,
    /// Document-wide default array merge strategy.
    ///
    /// Kept as raw text so the validator can name an unrecognized value.
    #[serde(default)]
    pub merge_strategy: Option<String>,
    /// Target repositories, in declaration order.
    #[serde(default)]
    pub repos: Vec<RawRepoEntry>,
}

/// The base definition of a target file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSpec {
    /// Base content. Must be a mapping when present.
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Value>,
    /// Array merge strategy for this file, overriding the document default.
    #[serde(default)]
    pub merge_strategy: Option<String>,
    /// Whether an existing file in the target repository is left alone.
    #[serde(default)]
    pub create_only: Option<bool>,
}

/// One logical repository entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRepoEntry {
    /// Clone URL(s). Missing when the document omits the field.
    #[serde(default)]
    pub git: Option<GitTarget>,
    /// Per-file changes for this entry.
    #[serde(default)]
    pub files: BTreeMap<String, FileOverride>,
}

/// A single clone URL or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GitTarget {
    /// One URL.
    Single(String),
    /// Several URLs sharing the same file configuration.
    Many(Vec<String>),
}

impl GitTarget {
    /// The URLs this target expands to, in order.
    pub fn urls(&self) -> Vec<&str> {
        match self {
            GitTarget::Single(url) => vec![url.as_str()],
            GitTarget::Many(urls) => urls.iter().map(String::as_str).collect(),
        }
    }

    /// The first URL, used to identify the entry in diagnostics.
    pub fn first_url(&self) -> Option<&str> {
        match self {
            GitTarget::Single(url) => Some(url.as_str()),
            GitTarget::Many(urls) => urls.first().map(String::as_str),
        }
    }
}

/// A per-repository change to one declared file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FileOverride {
    /// `false` excludes the file; `true` keeps it unchanged.
    Toggle(bool),
    /// Content and flags for this repository.
    Settings(OverrideSettings),
}

impl FileOverride {
    /// Whether this override removes the file from the repository.
    pub fn is_excluded(&self) -> bool {
        matches!(self, FileOverride::Toggle(false))
    }

    /// The override settings, if this is not a plain toggle.
    pub fn settings(&self) -> Option<&OverrideSettings> {
        match self {
            FileOverride::Settings(settings) => Some(settings),
            FileOverride::Toggle(_) => None,
        }
    }
}

/// Repository-level settings for one file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideSettings {
    /// When true, `content` replaces the base content instead of merging.
    #[serde(default, rename = "override")]
    pub override_base: bool,
    /// Repository-level content.
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Value>,
    /// Overrides the file's `createOnly` flag.
    #[serde(default)]
    pub create_only: Option<bool>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it is not mistaken for
/// an absent field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Parses a YAML string into a `RawDocument`.
///
/// Since YAML is a superset of JSON, this also accepts JSON text.
pub fn parse_yaml(content: &str) -> Result<RawDocument> {
    serde_yaml::from_str(content).map_err(|err| Error::ConfigParse {
        message: err.to_string(),
        hint: hint_for(&err.to_string()),
    })
}

/// Parses a JSON string into a `RawDocument`.
pub fn parse_json(content: &str) -> Result<RawDocument> {
    serde_json::from_str(content).map_err(|err| Error::ConfigParse {
        message: err.to_string(),
        hint: hint_for(&err.to_string()),
    })
}

/// Parses a document, choosing JSON when the text is a JSON object and YAML
/// otherwise.
pub fn parse(content: &str) -> Result<RawDocument> {
    if content.trim_start().starts_with('{') {
        parse_json(content)
    } else {
        parse_yaml(content)
    }
}

/// Reads and parses a document from disk.
///
/// Files ending in `.json` are parsed as JSON; anything else as YAML.
pub fn from_file(path: &Path) -> Result<RawDocument> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json(&content)
    } else {
        parse_yaml(&content)
    }
}

fn hint_for(message: &str) -> Option<String> {
    if message.contains("GitTarget") {
        Some("'git' must be a URL string or a list of URL strings".to_string())
    } else if message.contains("FileOverride") {
        Some("a repo file entry must be 'false' or a mapping with 'content', 'override', or 'createOnly'".to_string())
    } else if message.contains("invalid type") && message.contains("repos") {
        Some("'repos' must be a list of repository entries".to_string())
    } else {
        None
    }
}
