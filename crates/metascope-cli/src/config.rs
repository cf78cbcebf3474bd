//! Configuration discovery for the CLI.
//!
//! The export configuration is looked up in these places, first hit wins:
//!
//! 1. the path given with `--config` (which must exist),
//! 2. `metascope.toml` next to the type universe file,
//! 3. `metascope/config.toml` in the working directory,
//! 4. `config.toml` in the platform configuration directory.
//!
//! When none of them exists the default configuration is used.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use metascope::{MetascopeError, config::AppConfig};

/// Name of the configuration file looked up beside the universe file.
pub const SIBLING_CONFIG: &str = "metascope.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for MetascopeError {
    fn from(err: ConfigError) -> Self {
        MetascopeError::Config(err.to_string())
    }
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSource {
    Explicit,
    UniverseSibling,
    WorkingDirectory,
    Platform,
}

/// Candidate configuration files for a universe at `universe_path`, in lookup order.
fn candidates(universe_path: &Path) -> Vec<(ConfigSource, PathBuf)> {
    let mut candidates = Vec::with_capacity(3);

    let universe_dir = universe_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    candidates.push((
        ConfigSource::UniverseSibling,
        universe_dir.join(SIBLING_CONFIG),
    ));

    candidates.push((
        ConfigSource::WorkingDirectory,
        PathBuf::from("metascope/config.toml"),
    ));

    match ProjectDirs::from("com", "metascope", "metascope") {
        Some(dirs) => candidates.push((
            ConfigSource::Platform,
            dirs.config_dir().join("config.toml"),
        )),
        None => debug!("Could not determine platform-specific config directory"),
    }
    candidates
}

/// Find and load the configuration for the universe at `universe_path`.
///
/// # Errors
///
/// Returns [`MetascopeError::Config`] when the explicit path does not exist
/// or the file found cannot be parsed.
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
    universe_path: impl AsRef<Path>,
) -> Result<AppConfig, MetascopeError> {
    if let Some(path) = explicit_path {
        return load_config_file(ConfigSource::Explicit, path.as_ref());
    }

    for (source, path) in candidates(universe_path.as_ref()) {
        if path.exists() {
            return load_config_file(source, &path);
        }
        debug!(source:?, path = path.display().to_string(); "No configuration file");
    }

    info!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(source: ConfigSource, path: &Path) -> Result<AppConfig, MetascopeError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }
    info!(source:?, path = path.display().to_string(); "Loading configuration");

    let content = fs::read_to_string(path)?;
    let config = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    Ok(config)
}
