//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for
//! `repo-file-sync`. It uses the `thiserror` library to create a single
//! `Error` enum that covers every failure the loader and the normalization
//! engine can report.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Every variant carries the element that caused
//!   the failure (repo index, file name, or variable name) so a message can be
//!   understood without the original document at hand.
//!
//! - **`ErrorKind`**: A coarse classification of `Error` variants, useful for
//!   callers that want to react to a category of failure rather than match on
//!   every variant.
//!
//! - **`FileNameViolation`**: The distinct reasons a target file name can be
//!   rejected.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! All errors are fail-fast: the engine never produces partial output and
//! never retries.

use std::fmt;

use thiserror::Error;

/// The reasons a target file name is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNameViolation {
    /// The name is empty.
    Empty,
    /// The name contains a `..` path segment.
    PathTraversal,
    /// The name is an absolute path.
    Absolute,
    /// The name contains a newline, carriage return, or null byte.
    ControlCharacters,
}

impl fmt::Display for FileNameViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            FileNameViolation::Empty => "file name must not be empty",
            FileNameViolation::PathTraversal => "path traversal ('..') is not allowed",
            FileNameViolation::Absolute => "absolute paths are not allowed",
            FileNameViolation::ControlCharacters => {
                "newline, carriage return, and null characters are not allowed"
            }
        };
        f.write_str(reason)
    }
}

/// Coarse category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field (repos, git, content) is absent.
    MissingRequiredField,
    /// A field is present but has the wrong shape.
    InvalidFieldShape,
    /// An unrecognized array merge strategy token.
    InvalidMergeStrategy,
    /// An unsafe target file name.
    InvalidFileName,
    /// `override: true` without content.
    OverrideWithoutContent,
    /// A referenced environment variable is not defined.
    MissingEnvVar,
    /// Reading or parsing the document failed before the engine ran.
    Load,
}

/// Main error type for repo-file-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// The document has no repositories to sync to.
    #[error("Config validation error: 'repos' must be a non-empty sequence")]
    MissingRepos,

    /// A repo entry has no usable `git` field.
    #[error("Config validation error: repo at index {index} is missing required field 'git'")]
    MissingGitField { index: usize },

    /// A repo entry's `git` field is an empty sequence.
    #[error("Config validation error: repo at index {index} has an empty 'git' array")]
    EmptyGitArray { index: usize },

    /// Content was given but is not a mapping.
    #[error(
        "Config validation error: content for '{file_name}'{} must be an object, found {found}",
        repo_index.map(|i| format!(" in repo at index {}", i)).unwrap_or_default()
    )]
    InvalidContentType {
        file_name: String,
        /// Set when the offending content is a per-repo override.
        repo_index: Option<usize>,
        found: &'static str,
    },

    /// Neither base nor repo-level content exists for a file.
    #[error("Config validation error: repo at index {index} has no content for '{file_name}' (no base content and no override content)")]
    MissingContent { index: usize, file_name: String },

    /// A repo entry configures a file that is not declared at the top level.
    #[error("Config validation error: repo at index {index} references undeclared file '{file_name}'")]
    UnknownFile { index: usize, file_name: String },

    /// An object uses the reserved `$arrayMerge` key but is not a valid
    /// merge directive.
    #[error("Config validation error: invalid $arrayMerge directive in '{file_name}' at '{path}': {reason}")]
    InvalidMergeDirective {
        file_name: String,
        /// Dotted key path to the offending object.
        path: String,
        reason: String,
    },

    /// `override: true` was set without any content to use.
    #[error("Config validation error: repo {git_url} sets 'override: true' for '{file_name}' but provides no content")]
    OverrideWithoutContent { file_name: String, git_url: String },

    /// An unrecognized merge strategy.
    #[error("Config validation error: invalid mergeStrategy '{value}' for {context} (expected one of: replace, append, prepend)")]
    InvalidMergeStrategy { value: String, context: String },

    /// An unsafe target file name.
    #[error("Config validation error: invalid file name {file_name:?}: {reason}")]
    InvalidFileName {
        file_name: String,
        reason: FileNameViolation,
    },

    /// A referenced environment variable is undefined.
    #[error("Missing required environment variable: {name}{}", message.as_ref().map(|m| format!(" ({})", m)).unwrap_or_default())]
    MissingEnvVar {
        name: String,
        /// The message supplied by a `${NAME:?message}` expression.
        message: Option<String>,
    },

    /// An error occurred while parsing the configuration document.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred while rendering content.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingRepos | Error::MissingGitField { .. } | Error::MissingContent { .. } => {
                ErrorKind::MissingRequiredField
            }
            Error::EmptyGitArray { .. }
            | Error::InvalidContentType { .. }
            | Error::UnknownFile { .. }
            | Error::InvalidMergeDirective { .. } => ErrorKind::InvalidFieldShape,
            Error::InvalidMergeStrategy { .. } => ErrorKind::InvalidMergeStrategy,
            Error::InvalidFileName { .. } => ErrorKind::InvalidFileName,
            Error::OverrideWithoutContent { .. } => ErrorKind::OverrideWithoutContent,
            Error::MissingEnvVar { .. } => ErrorKind::MissingEnvVar,
            Error::ConfigParse { .. } | Error::Io(_) | Error::Serialization { .. } => {
                ErrorKind::Load
            }
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
