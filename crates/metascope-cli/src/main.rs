//! metascope CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use metascope::MetascopeError;
use metascope_cli::{Args, Mode, error_adapter::to_reportables};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);

    let artifact = match args.mode {
        Mode::Export => "metamodel export",
        Mode::Graph => "object graph",
    };
    info!(input = args.input.as_str(), artifact; "Starting metascope");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = metascope_cli::run(&args) {
        let reports = report(&err);
        error!(reports, artifact; "No output written");
        process::exit(1);
    }

    info!(output = args.output.as_str(), artifact; "Completed successfully");
}

/// Install `env_logger` at `level`, falling back to `warn` for unknown levels.
fn init_logger(level: &str) {
    let filter = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();
}

/// Render `err` through miette, one report per colliding logical type.
///
/// Returns the number of reports written.
fn report(err: &MetascopeError) -> usize {
    let handler = GraphicalReportHandler::new();
    let reportables = to_reportables(err);

    for reportable in &reportables {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, reportable) {
            Ok(()) => error!("{rendered}"),
            Err(_) => error!("{reportable}"),
        }
    }
    reportables.len()
}
