//! # Render Command Implementation
//!
//! This module implements the `render` subcommand, which runs the full
//! normalization pipeline and prints the result.
//!
//! ## Functionality
//!
//! - **Config Output**: By default prints the normalized configuration, one
//!   entry per target repository, as JSON or YAML.
//! - **File Output**: With `--files`, prints the rendered body of every file
//!   for every target under a `==> <gitUrl>: <fileName>` header, formatted
//!   by the file's extension.
//!
//! Environment variables are resolved strictly: any undefined `${NAME}`
//! aborts the command before anything is printed.

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use repo_file_sync::config;
use repo_file_sync::format::{self, OutputFormat};
use repo_file_sync::normalize::{self, Config};

use crate::output::{emoji, file_header, OutputConfig};

/// Normalize a sync configuration and print the result
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Path to the configuration file to render (YAML or JSON).
    #[arg(short, long, value_name = "FILE", default_value = "repo-file-sync.yaml")]
    pub config: PathBuf,

    /// Format for the normalized configuration (json or yaml).
    ///
    /// Ignored with `--files`, where each file uses its own extension.
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    pub format: OutputFormat,

    /// Print rendered file bodies instead of the normalized configuration.
    #[arg(long)]
    pub files: bool,
}

/// Execute the `render` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: RenderArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let doc = config::from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let normalized = match normalize::normalize(&doc) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", emoji(&out, "❌", "[ERR]"), e);
            return Err(anyhow::anyhow!("Normalization failed: {}", e));
        }
    };
    info!(
        "Normalized {} target repositories from {}",
        normalized.repos.len(),
        args.config.display()
    );

    let text = if args.files {
        render_files(&normalized)?
    } else {
        render_config(&normalized, args.format)?
    };
    print!("{}", text);
    Ok(())
}

fn render_config(config: &Config, output_format: OutputFormat) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize configuration")?;
    Ok(format::render(&value, output_format)?)
}

fn render_files(config: &Config) -> Result<String> {
    let mut text = String::new();
    for repo in &config.repos {
        for file in &repo.files {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&file_header(&repo.git_url, &file.file_name));
            text.push('\n');
            text.push_str(&format::render_file(file)?);
        }
    }
    Ok(text)
}
