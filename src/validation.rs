//! # Document Validation
//!
//! Structural and semantic checks run on a [`RawDocument`] before any merge
//! work happens. Validation never modifies the document and stops at the
//! first violation.
//!
//! ## Passes
//!
//! The checks run as whole passes, in this order:
//!
//! 1. Base content of every declared file is an object.
//! 2. `repos` is non-empty and every entry has a non-empty `git` target.
//! 3. Every repo override names a declared file, and every included
//!    (repo, file) pair has content to write (`override: true` must bring its
//!    own content).
//! 4. Merge strategies, document default then per file, are recognized.
//! 5. Declared file names are safe relative paths.
//! 6. Every `$arrayMerge` object is a well-formed merge directive.
//!
//! Repos are visited in declaration order, so the error always names the
//! lowest-index offending entry. Files are visited in name order.

use serde_json::Value;

use crate::config::{GitTarget, RawDocument, RawRepoEntry};
use crate::error::{Error, Result};
use crate::merge::{value_type_name, ArrayMergeStrategy, ARRAY_MERGE_KEY, VALUES_KEY};
use crate::path::validate_file_name;

/// Validate a raw document.
pub fn validate(doc: &RawDocument) -> Result<()> {
    check_base_content(doc)?;
    check_repos(doc)?;
    check_repo_files(doc)?;
    check_merge_strategies(doc)?;
    check_file_names(doc)?;
    check_directives(doc)?;
    Ok(())
}

/// Parse a strategy token, naming `context` on failure.
pub fn parse_strategy(value: &str, context: &str) -> Result<ArrayMergeStrategy> {
    value.parse().map_err(|_| Error::InvalidMergeStrategy {
        value: value.to_string(),
        context: context.to_string(),
    })
}

fn check_base_content(doc: &RawDocument) -> Result<()> {
    for (file_name, spec) in &doc.files {
        if let Some(content) = &spec.content {
            require_object(content, file_name, None)?;
        }
    }
    Ok(())
}

fn check_repos(doc: &RawDocument) -> Result<()> {
    if doc.repos.is_empty() {
        return Err(Error::MissingRepos);
    }

    for (index, repo) in doc.repos.iter().enumerate() {
        match &repo.git {
            None => return Err(Error::MissingGitField { index }),
            Some(GitTarget::Many(urls)) if urls.is_empty() => {
                return Err(Error::EmptyGitArray { index })
            }
            Some(target) => {
                if target.urls().iter().any(|url| url.trim().is_empty()) {
                    return Err(Error::MissingGitField { index });
                }
            }
        }
    }
    Ok(())
}

fn check_repo_files(doc: &RawDocument) -> Result<()> {
    for (index, repo) in doc.repos.iter().enumerate() {
        if let Some(file_name) = repo.files.keys().find(|name| !doc.files.contains_key(*name)) {
            return Err(Error::UnknownFile {
                index,
                file_name: file_name.clone(),
            });
        }

        for (file_name, spec) in &doc.files {
            check_repo_file(index, repo, file_name, spec.content.is_some())?;
        }
    }
    Ok(())
}

fn check_repo_file(
    index: usize,
    repo: &RawRepoEntry,
    file_name: &str,
    has_base_content: bool,
) -> Result<()> {
    let entry = repo.files.get(file_name);
    if entry.is_some_and(|entry| entry.is_excluded()) {
        return Ok(());
    }

    let settings = entry.and_then(|entry| entry.settings());
    let override_content = settings.and_then(|s| s.content.as_ref());

    if let Some(content) = override_content {
        require_object(content, file_name, Some(index))?;
    }

    if settings.is_some_and(|s| s.override_base) && override_content.is_none() {
        return Err(Error::OverrideWithoutContent {
            file_name: file_name.to_string(),
            git_url: repo
                .git
                .as_ref()
                .and_then(GitTarget::first_url)
                .unwrap_or_default()
                .to_string(),
        });
    }

    if !has_base_content && override_content.is_none() {
        return Err(Error::MissingContent {
            index,
            file_name: file_name.to_string(),
        });
    }
    Ok(())
}

fn check_merge_strategies(doc: &RawDocument) -> Result<()> {
    if let Some(value) = &doc.merge_strategy {
        parse_strategy(value, "the document default")?;
    }
    for (file_name, spec) in &doc.files {
        if let Some(value) = &spec.merge_strategy {
            parse_strategy(value, &format!("file '{}'", file_name))?;
        }
    }
    Ok(())
}

fn check_file_names(doc: &RawDocument) -> Result<()> {
    doc.files.keys().try_for_each(|name| validate_file_name(name))
}

fn check_directives(doc: &RawDocument) -> Result<()> {
    for (file_name, spec) in &doc.files {
        if let Some(content) = &spec.content {
            check_directive_tree(content, file_name, "")?;
        }
    }
    for repo in &doc.repos {
        for (file_name, entry) in &repo.files {
            if let Some(content) = entry.settings().and_then(|s| s.content.as_ref()) {
                check_directive_tree(content, file_name, "")?;
            }
        }
    }
    Ok(())
}

fn check_directive_tree(value: &Value, file_name: &str, path: &str) -> Result<()> {
    match value {
        Value::Object(map) => {
            if let Some(marker) = map.get(ARRAY_MERGE_KEY) {
                directive_problem(marker, map.get(VALUES_KEY), map.len()).map_or(Ok(()), |reason| {
                    Err(Error::InvalidMergeDirective {
                        file_name: file_name.to_string(),
                        path: display_path(path),
                        reason,
                    })
                })?;
            }
            for (key, item) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                check_directive_tree(item, file_name, &child)?;
            }
            Ok(())
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_directive_tree(item, file_name, &format!("{}[{}]", path, i))),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
    }
}

fn directive_problem(marker: &Value, values: Option<&Value>, len: usize) -> Option<String> {
    match marker.as_str() {
        Some("append") | Some("prepend") => {}
        Some(other) => {
            return Some(format!(
                "'{}' must be 'append' or 'prepend', found '{}'",
                ARRAY_MERGE_KEY, other
            ))
        }
        None => {
            return Some(format!(
                "'{}' must be a string, found {}",
                ARRAY_MERGE_KEY,
                value_type_name(marker)
            ))
        }
    }

    match values {
        Some(Value::Array(_)) if len == 2 => None,
        Some(Value::Array(_)) => Some(format!(
            "a directive may only contain '{}' and '{}'",
            ARRAY_MERGE_KEY, VALUES_KEY
        )),
        Some(other) => Some(format!(
            "'{}' must be an array, found {}",
            VALUES_KEY,
            value_type_name(other)
        )),
        None => Some(format!("missing '{}' array", VALUES_KEY)),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

fn require_object(content: &Value, file_name: &str, repo_index: Option<usize>) -> Result<()> {
    if content.is_object() {
        Ok(())
    } else {
        Err(Error::InvalidContentType {
            file_name: file_name.to_string(),
            repo_index,
            found: value_type_name(content),
        })
    }
}
