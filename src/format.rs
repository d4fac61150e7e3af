//! Rendering resolved content to file text
//!
//! The output format follows the target file's extension: `.yaml` and `.yml`
//! render as YAML, everything else as pretty-printed JSON. Rendered text
//! always ends with a single trailing newline.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::normalize::FileContent;

/// Text format for a rendered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty JSON with two-space indentation.
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// Pick the format for a target file name.
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("yaml") | Some("yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown format '{}' (expected json or yaml)", other)),
        }
    }
}

/// Render a value in the given format.
pub fn render(content: &Value, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(content).map_err(|err| Error::Serialization {
                message: format!("Failed to serialize JSON: {}", err),
            })?
        }
        OutputFormat::Yaml => serde_yaml::to_string(content).map_err(|err| Error::Serialization {
            message: format!("Failed to serialize YAML: {}", err),
        })?,
    };
    Ok(ensure_trailing_newline(text))
}

/// Render a resolved file using the format implied by its name.
pub fn render_file(file: &FileContent) -> Result<String> {
    render(&file.content, OutputFormat::from_file_name(&file.file_name))
}

fn ensure_trailing_newline(mut content: String) -> String {
    while content.ends_with("\n\n") {
        content.pop();
    }
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}
