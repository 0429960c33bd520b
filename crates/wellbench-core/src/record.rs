//! Parsed measurement records
//!
//! Every metric is optional: "not recorded" is a different thing from a
//! recorded zero, and aggregation only averages values that exist.

use serde::{Deserialize, Serialize};
use std::fmt;
use wellbench_config::Metric;

/// `trial N of M`, 1-based as printed by the benchmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub trial: u32,
    pub total: u32,
}

impl RunId {
    pub fn new(trial: u32, total: u32) -> Self {
        Self { trial, total }
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trial, self.total)
    }
}

/// Outcome reported on a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    Ok,
    /// The benchmark gave up; timing metrics are always missing
    Timeout,
    /// Progress marker with no verdict (`<count>-><count2>` only)
    Progress,
}

impl TrialStatus {
    pub fn is_timeout(self) -> bool {
        matches!(self, TrialStatus::Timeout)
    }
}

/// The `<count>[-><count2>]` pair on a status line, typically TX -> RX threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub first: u64,
    pub second: Option<u64>,
}

impl Counts {
    pub fn sum(&self) -> u64 {
        self.first + self.second.unwrap_or(0)
    }
}

/// Metric values of one trial
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub cpu_secs: Option<f64>,
    pub wall_secs: Option<f64>,
    pub operations: Option<u64>,
}

impl Metrics {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::CpuTime => self.cpu_secs,
            Metric::WallTime => self.wall_secs,
            Metric::Operations => self.operations.map(|ops| ops as f64),
        }
    }

    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.get(*m).is_none())
    }
}

/// One logical trial extracted from a benchmark report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub run: RunId,
    /// Concurrency primitive that produced the record
    pub variant: String,
    pub status: TrialStatus,
    pub counts: Option<Counts>,
    pub metrics: Metrics,
}

impl MeasurementRecord {
    pub fn is_timeout(&self) -> bool {
        self.status.is_timeout()
    }
}
