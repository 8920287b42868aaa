//! # idreg-cli — CLI Tool for the Identity Registry
//!
//! Provides the `idreg` command-line interface.
//!
//! ## Subcommands
//!
//! - `idreg replay` — Execute a YAML or JSON call script against a fresh
//!   registry and check each step's expected outcome.
//! - `idreg codes` — Print the registry error-code taxonomy.
//!
//! ```bash
//! idreg replay scenarios/recovery.yaml --height 1000
//! idreg replay calls.json --format json
//! idreg codes
//! ```

pub mod codes;
pub mod replay;

use clap::ValueEnum;

/// Output format shared by all subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One pretty-printed JSON document.
    Json,
}
