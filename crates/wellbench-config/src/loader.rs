//! Configuration loading
//!
//! Resolution order:
//! 1. explicit path (must exist)
//! 2. `$WELLBENCH_CONFIG`
//! 3. `<config dir>/wellbench/config.toml`
//! 4. built-in defaults

use crate::config::{BenchConfig, ConfigError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "WELLBENCH_CONFIG";

/// Loads [`BenchConfig`] from TOML
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, falling back to built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<BenchConfig, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            debug!("Using config from ${}: {}", CONFIG_ENV, path);
            return Self::load_from_file(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => {
                debug!("No config file found, using built-in sweeps");
                Ok(BenchConfig::default())
            }
        }
    }

    /// Load and validate a specific file
    pub fn load_from_file(path: &Path) -> Result<BenchConfig, ConfigError> {
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::load_from_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn load_from_str(content: &str) -> Result<BenchConfig, ConfigError> {
        let config: BenchConfig =
            toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<string>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }
}

/// `<config dir>/wellbench/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wellbench").join("config.toml"))
}
