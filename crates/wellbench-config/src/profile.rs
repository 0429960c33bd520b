//! Sweep profile types
//!
//! A profile names one sweep: the axes that make up its grid, the
//! executables run at every grid point, and how results are keyed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A numeric metric reported by the benchmark executables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// `cpu time <float>s`
    CpuTime,
    /// `wall time <float>s`
    WallTime,
    /// `operations <int>`
    Operations,
}

impl Metric {
    /// All metrics, in report order
    pub const ALL: [Metric; 3] = [Metric::CpuTime, Metric::WallTime, Metric::Operations];

    /// Short identifier used in artifact keys
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::CpuTime => "cpu_time",
            Metric::WallTime => "wall_time",
            Metric::Operations => "operations",
        }
    }

    /// Axis label for plots
    pub fn label(self) -> &'static str {
        match self {
            Metric::CpuTime => "cpu time (s)",
            Metric::WallTime => "wall time (s)",
            Metric::Operations => "operations",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu_time" | "cpu" => Ok(Metric::CpuTime),
            "wall_time" | "wall" => Ok(Metric::WallTime),
            "operations" | "ops" => Ok(Metric::Operations),
            other => Err(format!("unknown metric '{}'", other)),
        }
    }
}

/// How the configuration coordinate of a result is derived
///
/// Derivation is applied to every trial before grouping, so two trials that
/// were labelled differently can still land on the same coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "axis")]
pub enum Derivation {
    /// Every axis value of the grid point
    #[default]
    Point,
    /// A single named axis of the grid point
    Axis(String),
    /// First count of the status line (`<count>-><count2>`)
    FirstCount,
    /// Sum of both status-line counts, e.g. TX + RX threads
    CountSum,
}

/// Generator rule for the values of one axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisRule {
    /// Explicit ordered values
    List {
        /// Values in sweep order
        values: Vec<u64>,
    },
    /// `2^from .. 2^to`, upper exponent exclusive
    PowersOfTwo {
        /// First exponent
        from: u32,
        /// Exclusive upper exponent
        to: u32,
    },
}

/// One axis of a sweep grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Axis name, unique within a profile
    pub name: String,
    /// Human readable label for plots (defaults to the name)
    #[serde(default)]
    pub label: Option<String>,
    /// Command-line flag the value is passed with, e.g. `-r`
    pub flag: String,
    /// How values are produced
    pub rule: AxisRule,
}

impl AxisConfig {
    /// Axis with explicit values
    pub fn list(name: &str, flag: &str, values: Vec<u64>) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            flag: flag.to_string(),
            rule: AxisRule::List { values },
        }
    }

    /// Axis of powers of two, upper exponent exclusive
    pub fn powers_of_two(name: &str, flag: &str, from: u32, to: u32) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            flag: flag.to_string(),
            rule: AxisRule::PowersOfTwo { from, to },
        }
    }

    /// Set the plot label
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Label for plots
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// One benchmark executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableConfig {
    /// Path to the executable
    pub path: PathBuf,
    /// Display name, used as the variant when the report names none
    #[serde(default)]
    pub name: Option<String>,
    /// Arguments passed before the swept flags
    #[serde(default)]
    pub args: Vec<String>,
}

impl ExecutableConfig {
    /// Executable with no fixed arguments
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            name: None,
            args: Vec::new(),
        }
    }

    /// Add fixed arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Display name; falls back to the file name of the path
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A complete sweep definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepProfile {
    /// Profile name, used for artifact file names
    pub name: String,
    /// Plot title
    #[serde(default)]
    pub title: Option<String>,
    /// Render as a 2-D mesh (requires exactly two axes)
    #[serde(default)]
    pub mesh: bool,
    /// Metrics to export for rendering
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
    /// Coordinate derivation for aggregation
    #[serde(default)]
    pub derive: Derivation,
    /// Grid axes, outermost first
    pub axes: Vec<AxisConfig>,
    /// Executables run at every grid point
    pub executables: Vec<ExecutableConfig>,
}

fn default_metrics() -> Vec<Metric> {
    vec![Metric::CpuTime]
}

impl SweepProfile {
    /// Plot title; falls back to the profile name
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}
