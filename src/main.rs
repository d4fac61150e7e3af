//! # Repo File Sync CLI
//!
//! This is the binary entry point for the `repo-file-sync` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging from the global `--log-level` flag.
//! - Executing the appropriate command and translating library errors into
//!   user-friendly output.
//!
//! The normalization logic lives in the `repo_file_sync` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
