//! # Repo File Sync Library
//!
//! This library computes, for every target repository named in a sync
//! document, the exact content of every file that should be written there.
//! It is used by the `repo-file-sync` command-line tool but performs no git,
//! network, or filesystem work of its own: it takes a parsed document and
//! returns an in-memory result for an orchestration layer to materialize.
//!
//! ## Quick Example
//!
//! ```
//! use repo_file_sync::{config, normalize};
//! use std::collections::HashMap;
//!
//! let doc = config::parse_yaml(r#"
//! files:
//!   .prettierrc.json:
//!     content:
//!       semi: false
//!       plugins: [prettier-plugin-sh]
//!     mergeStrategy: append
//! repos:
//!   - git: [git@github.com:org/a.git, git@github.com:org/b.git]
//!     files:
//!       .prettierrc.json:
//!         content:
//!           plugins: [prettier-plugin-toml]
//! "#).unwrap();
//!
//! let env: HashMap<String, String> = HashMap::new();
//! let config = normalize::normalize_with_env(&doc, &env).unwrap();
//!
//! assert_eq!(config.repos.len(), 2);
//! let file = &config.repos[0].files[0];
//! assert_eq!(
//!     file.content["plugins"],
//!     serde_json::json!(["prettier-plugin-sh", "prettier-plugin-toml"])
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The document schema (`RawDocument`) and
//!   loaders for YAML and JSON text.
//! - **Validation (`validation`)**: Rejects malformed documents with errors
//!   that name the offending repo, file, or value.
//! - **Merging (`merge`)**: Deep merge of JSON-like values with replace,
//!   append, or prepend array semantics and per-key `$arrayMerge` directives.
//! - **Interpolation (`env`)**: `${NAME}`, `${NAME:-default}`, and
//!   `${NAME:?message}` substitution from the environment.
//! - **Normalization (`normalize`)**: The pipeline tying the above together.
//! - **Rendering (`format`)**: Serializes resolved content to JSON or YAML
//!   text by file extension.
//!
//! ## Execution Flow
//!
//! `normalize::normalize` executes the following steps:
//!
//! 1.  **Validation**: Check the whole document, failing on the first problem.
//! 2.  **Resolution**: Compute each file's content per repo entry in override,
//!     inherit, or merge mode, stripping leftover merge directives.
//! 3.  **Interpolation**: Substitute environment variables in strict mode.
//! 4.  **Expansion**: Emit one `RepoConfig` per git URL, each owning its own
//!     copy of the files.

pub mod config;
pub mod env;
pub mod error;
pub mod format;
pub mod merge;
pub mod normalize;
pub mod path;
pub mod validation;

#[cfg(test)]
mod merge_proptest;
