//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which loads a sync
//! configuration and checks it without producing any output files.
//!
//! ## Functionality
//!
//! - **Parsing**: Loads the YAML or JSON document.
//! - **Validation**: Runs every structural check the normalizer relies on,
//!   reporting the first problem found.
//! - **Summary**: Counts shared files, repo entries, and the target
//!   repositories they expand to.
//!
//! This command is a safe, read-only operation. Environment variables are not
//! resolved here; `render` reports missing ones.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use repo_file_sync::config::{self, RawDocument};
use repo_file_sync::validation;

use crate::output::{emoji, OutputConfig};

/// Validate a sync configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate (YAML or JSON).
    #[arg(short, long, value_name = "FILE", default_value = "repo-file-sync.yaml")]
    pub config: PathBuf,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config_path = &args.config;
    println!(
        "{} Validating configuration: {}",
        emoji(&out, "🔍", "[SCAN]"),
        config_path.display()
    );

    let doc = match config::from_file(config_path) {
        Ok(doc) => {
            println!(
                "{} Configuration file parsed successfully",
                emoji(&out, "✅", "[OK]")
            );
            doc
        }
        Err(e) => {
            println!(
                "{} Configuration parsing failed: {}",
                emoji(&out, "❌", "[ERR]"),
                e
            );
            return Err(anyhow::anyhow!("Configuration parsing failed: {}", e));
        }
    };

    if let Err(e) = validation::validate(&doc) {
        println!("{} Validation failed: {}", emoji(&out, "❌", "[ERR]"), e);
        return Err(anyhow::anyhow!("Validation failed: {}", e));
    }

    let summary = Summary::of(&doc);
    println!("\n{} Configuration Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Shared files: {}", summary.files);
    println!("   Repo entries: {}", summary.entries);
    println!("   Target repositories: {}", summary.targets);

    println!("\n{} Configuration is valid", emoji(&out, "✅", "[OK]"));
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct Summary {
    files: usize,
    entries: usize,
    targets: usize,
}

impl Summary {
    fn of(doc: &RawDocument) -> Self {
        Self {
            files: doc.files.len(),
            entries: doc.repos.len(),
            targets: doc
                .repos
                .iter()
                .filter_map(|entry| entry.git.as_ref())
                .map(|git| git.urls().len())
                .sum(),
        }
    }
}
