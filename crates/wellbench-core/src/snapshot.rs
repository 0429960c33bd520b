//! On-disk snapshot of one executable's aggregated series
//!
//! Written once per sweep and executable, tagged with the commit it was
//! measured at, so plots can be regenerated without rerunning anything.

use crate::aggregate::{AggregatedSeries, Derivation};
use crate::grid::{Axis, Grid, GridError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wellbench_config::Metric;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "commit-id")]
    pub commit_id: String,
    pub sweep: String,
    pub title: String,
    pub executable: String,
    pub generated_at: DateTime<Utc>,
    pub runs: u32,
    pub derive: Derivation,
    pub mesh: bool,
    pub metrics: Vec<Metric>,
    /// Coordinate axis labels, one for a line and two for a mesh
    pub labels: Vec<String>,
    pub axes: Vec<Axis>,
    pub series: AggregatedSeries,
}

impl Snapshot {
    /// `<sweep>__<executable>.json`
    pub fn file_name(sweep: &str, executable: &str) -> String {
        let exe: String = executable
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}__{}.json", sweep, exe)
    }

    pub fn grid(&self) -> std::result::Result<Grid, GridError> {
        Grid::from_axes(self.axes.clone())
    }

    /// Write pretty JSON into `dir`, returning the file path
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(Self::file_name(&self.sweep, &self.executable));
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        })
    }
}
