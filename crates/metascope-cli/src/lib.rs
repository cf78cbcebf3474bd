//! CLI logic for the metascope metamodel tool.
//!
//! This module reads a type universe description, runs the export or graph
//! pipeline, and writes the result as pretty-printed JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Mode};

use std::fs;

use log::info;
use serde::Serialize;

use metascope::{MetamodelBuilder, MetascopeError};

/// Run the metascope CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `MetascopeError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed type universe descriptions
/// - Duplicate logical type names
/// - JSON serialization errors
pub fn run(args: &Args) -> Result<(), MetascopeError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        mode:? = args.mode;
        "Processing type universe"
    );

    let app_config = config::load_config(args.config.as_ref(), &args.input)?;

    let source = fs::read_to_string(&args.input)?;

    let builder = MetamodelBuilder::new(app_config);
    let universe = builder.load_universe(&source)?;

    let json = match args.mode {
        Mode::Export => to_json(&builder.export(&universe)?)?,
        Mode::Graph => to_json(&builder.object_graph(&universe))?,
    };

    fs::write(&args.output, json)?;

    info!(output_file = args.output; "JSON exported successfully");

    Ok(())
}

fn to_json(value: &impl Serialize) -> Result<String, MetascopeError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| MetascopeError::Serialization(err.to_string()))
}
