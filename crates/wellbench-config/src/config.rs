//! Top-level driver configuration and the built-in sweep profiles

use crate::profile::{AxisConfig, Derivation, ExecutableConfig, Metric, SweepProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Default number of trials per grid point
pub const DEFAULT_RUNS: u32 = 5;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`BenchConfig`]
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },

    /// Config could not be serialized
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Config is well formed but unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A requested sweep is not configured
    #[error("unknown sweep '{0}'")]
    UnknownSweep(String),
}

/// Process runner settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Kill a benchmark that runs longer than this many seconds.
    ///
    /// Unset by default: benchmarks report their own `TIMEOUT`.
    #[serde(default)]
    pub watchdog_secs: Option<u64>,
}

/// Complete driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Trials per grid point
    #[serde(default = "default_runs")]
    pub runs: u32,
    /// Directory for snapshots and render artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Process runner settings
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Configured sweeps, run in order
    #[serde(default)]
    pub sweeps: Vec<SweepProfile>,
}

fn default_runs() -> u32 {
    DEFAULT_RUNS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("bench-results")
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            output_dir: default_output_dir(),
            runner: RunnerConfig::default(),
            sweeps: builtin_sweeps(),
        }
    }
}

impl BenchConfig {
    /// Check the invariants the sweep driver relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs == 0 {
            return Err(ConfigError::Invalid("runs must be at least 1".into()));
        }
        if self.runner.watchdog_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "runner.watchdog_secs must be positive when set".into(),
            ));
        }

        let mut names = HashSet::new();
        for sweep in &self.sweeps {
            if !names.insert(sweep.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate sweep name '{}'",
                    sweep.name
                )));
            }
            validate_sweep(sweep)?;
        }
        Ok(())
    }

    /// Look up a sweep by name
    pub fn sweep(&self, name: &str) -> Result<&SweepProfile, ConfigError> {
        self.sweeps
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownSweep(name.to_string()))
    }

    /// Keep only the named sweeps, in configured order
    pub fn retain_sweeps(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        for name in names {
            self.sweep(name)?;
        }
        self.sweeps.retain(|s| names.contains(&s.name));
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn validate_sweep(sweep: &SweepProfile) -> Result<(), ConfigError> {
    if sweep.axes.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "sweep '{}' has no axes",
            sweep.name
        )));
    }
    if sweep.executables.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "sweep '{}' has no executables",
            sweep.name
        )));
    }
    if sweep.metrics.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "sweep '{}' exports no metrics",
            sweep.name
        )));
    }
    if sweep.mesh && sweep.axes.len() != 2 {
        return Err(ConfigError::Invalid(format!(
            "mesh sweep '{}' needs exactly two axes, found {}",
            sweep.name,
            sweep.axes.len()
        )));
    }

    let mut axes = HashSet::new();
    for axis in &sweep.axes {
        if !axes.insert(axis.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "sweep '{}' repeats axis '{}'",
                sweep.name, axis.name
            )));
        }
    }
    match &sweep.derive {
        Derivation::Axis(name) if !axes.contains(name.as_str()) => {
            return Err(ConfigError::Invalid(format!(
                "sweep '{}' derives from unknown axis '{}'",
                sweep.name, name
            )));
        }
        Derivation::Axis(_) | Derivation::FirstCount | Derivation::CountSum if sweep.mesh => {
            return Err(ConfigError::Invalid(format!(
                "mesh sweep '{}' must be keyed by point",
                sweep.name
            )));
        }
        Derivation::Point if !sweep.mesh && sweep.axes.len() != 1 => {
            return Err(ConfigError::Invalid(format!(
                "line sweep '{}' keyed by point needs exactly one axis, found {}",
                sweep.name,
                sweep.axes.len()
            )));
        }
        _ => {}
    }
    Ok(())
}

/// Sweeps compiled into the driver
///
/// Upper bounds were hand-tuned against the MemoryWell build tree; override
/// them from a config file rather than editing these.
pub fn builtin_sweeps() -> Vec<SweepProfile> {
    vec![
        SweepProfile {
            name: "memwell-threads".to_string(),
            title: Some("MemoryWell throughput by thread pairs".to_string()),
            derive: Derivation::Axis("pairs".to_string()),
            metrics: vec![Metric::Operations, Metric::CpuTime, Metric::WallTime],
            mesh: false,
            axes: vec![AxisConfig::list("pairs", "-t", vec![0, 1, 2, 4, 8])
                .with_label("thread pairs")],
            executables: vec![ExecutableConfig::new("build-release/benchmark/well_bench")
                .with_args(["-s", "5"])],
        },
        SweepProfile {
            name: "nbuf-reservation".to_string(),
            title: Some("nbuf cpu time by reservation".to_string()),
            derive: Derivation::Axis("reservation".to_string()),
            metrics: vec![Metric::CpuTime],
            mesh: false,
            axes: vec![AxisConfig::powers_of_two("reservation", "-r", 1, 8)],
            executables: vec![
                ExecutableConfig::new("test/NBUF_DO_SPL"),
                ExecutableConfig::new("test/NBUF_DO_XCH"),
                ExecutableConfig::new("test/NBUF_DO_MTX"),
            ],
        },
        SweepProfile {
            name: "nbuf-mesh".to_string(),
            title: Some("nbuf cpu time by block count and size".to_string()),
            derive: Derivation::Point,
            metrics: vec![Metric::CpuTime],
            mesh: true,
            axes: vec![
                AxisConfig::powers_of_two("block_count", "-c", 2, 8).with_label("block count"),
                AxisConfig::powers_of_two("block_size", "-s", 3, 8)
                    .with_label("block size (log2)"),
            ],
            executables: vec![
                ExecutableConfig::new("build-debug/test/nbuf_test_cas").with_args(["-r", "1"])
            ],
        },
    ]
}
