//! Command-line argument definitions for the metascope CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, the artifact to produce, and logging verbosity.

use clap::{Parser, ValueEnum};

/// Artifact written by the CLI.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// The metamodel export document
    #[default]
    Export,
    /// The object-relationship graph of the entities
    Graph,
}

/// Command-line arguments for the metascope metamodel tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the type universe description (TOML)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output JSON file
    #[arg(short, long, default_value = "metamodel.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Artifact to produce
    #[arg(long, value_enum, default_value_t = Mode::Export)]
    pub mode: Mode,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
