//! Effective configuration: config file (or built-ins) plus CLI overrides

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use wellbench_config::{BenchConfig, ConfigLoader};

use crate::cli::Cli;

/// Values given on the command line that beat the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub runs: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub sweeps: Vec<String>,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            runs: cli.runs,
            output_dir: cli.output_dir.clone(),
            sweeps: cli.sweeps.clone(),
        }
    }
}

impl Overrides {
    pub fn apply(&self, config: &mut BenchConfig) -> Result<()> {
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.retain_sweeps(&self.sweeps)?;
        config.validate().context("invalid command line override")?;
        Ok(())
    }
}

/// Load configuration with CLI overrides
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<BenchConfig> {
    let mut config = ConfigLoader::load(path).context("failed to load configuration")?;
    overrides.apply(&mut config)?;

    debug!(
        "Effective config: {} run(s), output {}, {} sweep(s)",
        config.runs,
        config.output_dir.display(),
        config.sweeps.len()
    );
    Ok(config)
}
