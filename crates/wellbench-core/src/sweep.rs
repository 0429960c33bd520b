//! Sweep driver
//!
//! Runs every executable of a profile at every grid point, one trial at a
//! time, and aggregates the parsed records. Nothing runs concurrently: the
//! benchmarks measure concurrency primitives and must not compete with the
//! driver for cores.

use crate::aggregate::{AggregatedSeries, Aggregator, Derivation};
use crate::error::{Result, SweepError};
use crate::export::{self, RenderData, RenderRequest};
use crate::grid::Grid;
use crate::parser::{LogParser, ParseOptions};
use crate::record::{MeasurementRecord, RunId};
use crate::runner::{Invocation, ProcessRunner};
use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use wellbench_config::{Metric, SweepProfile};

/// A validated sweep, ready to run
#[derive(Debug, Clone)]
pub struct SweepPlan {
    profile: SweepProfile,
    grid: Grid,
    runs: u32,
}

impl SweepPlan {
    /// Expand the grid; mesh problems surface here, before anything runs
    pub fn from_profile(profile: &SweepProfile, runs: u32) -> Result<Self> {
        if runs == 0 {
            return Err(SweepError::NoRuns(profile.name.clone()));
        }
        let grid = Grid::from_config(&profile.axes)?;
        if profile.mesh {
            grid.require_mesh()?;
        }

        Ok(Self {
            profile: profile.clone(),
            grid,
            runs,
        })
    }

    pub fn profile(&self) -> &SweepProfile {
        &self.profile
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Total number of processes the sweep will start
    pub fn invocation_count(&self) -> usize {
        self.grid.len() * self.profile.executables.len() * self.runs as usize
    }

    /// Labels of the coordinate axes the results are keyed by
    pub fn labels(&self) -> Vec<String> {
        coordinate_labels(&self.profile)
    }

    /// Run the whole sweep, aborting on the first fatal error
    pub fn execute(&self, runner: &dyn ProcessRunner) -> Result<SweepOutcome> {
        info!(
            "Sweep '{}': {} point(s) x {} executable(s) x {} run(s)",
            self.profile.name,
            self.grid.len(),
            self.profile.executables.len(),
            self.runs
        );

        let points = self.grid.points();
        let mut results = Vec::with_capacity(self.profile.executables.len());

        for exe in &self.profile.executables {
            let name = exe.display_name();
            let mut aggregator = Aggregator::new(self.profile.derive.clone());

            for point in &points {
                let invocation = Invocation::for_point(exe, &self.profile.axes, point);
                for trial in 0..self.runs {
                    let records = self.run_trial(runner, &invocation, &name, trial)?;
                    aggregator.ingest(point, trial as usize, &records)?;
                }
            }

            let series = aggregator.finish();
            for entry in series.insufficient() {
                warn!(
                    "{}: no valid samples for {} ({} trial(s), {} timed out)",
                    name, entry.key, entry.trials, entry.timeouts
                );
            }
            info!("{}: aggregated {} key(s)", name, series.len());
            results.push(ExecutableResult { name, series });
        }

        Ok(SweepOutcome {
            sweep: self.profile.name.clone(),
            title: self.profile.display_title().to_string(),
            derive: self.profile.derive.clone(),
            mesh: self.profile.mesh,
            metrics: self.profile.metrics.clone(),
            labels: self.labels(),
            runs: self.runs,
            grid: self.grid.clone(),
            results,
        })
    }

    fn run_trial(
        &self,
        runner: &dyn ProcessRunner,
        invocation: &Invocation,
        variant: &str,
        trial: u32,
    ) -> Result<Vec<MeasurementRecord>> {
        debug!("[{}/{}] {}", trial + 1, self.runs, invocation.display());

        let output = runner.run(invocation)?;
        let stdout = output.stdout_utf8(invocation)?;

        let parser = LogParser::new(ParseOptions {
            fallback_variant: variant.to_string(),
            fallback_run: RunId::new(trial + 1, self.runs),
        });
        let records = parser.parse(stdout).map_err(|source| SweepError::Parse {
            command: invocation.display(),
            stdout: stdout.to_string(),
            source,
        })?;

        if records.is_empty() {
            return Err(SweepError::NoRecords {
                command: invocation.display(),
                stdout: stdout.to_string(),
            });
        }
        Ok(records)
    }
}

/// Snapshots combine only when they describe the same sweep layout
fn check_compatible(first: &Snapshot, other: &Snapshot) -> Result<()> {
    let mismatch = |field, expected: String, found: String| {
        Err(SweepError::SnapshotMismatch {
            field,
            expected,
            found,
        })
    };

    if other.sweep != first.sweep {
        return mismatch("sweep", format!("'{}'", first.sweep), format!("'{}'", other.sweep));
    }
    if other.axes != first.axes {
        return mismatch("axes", format!("{:?}", first.axes), format!("{:?}", other.axes));
    }
    if other.derive != first.derive {
        return mismatch("derive", format!("{:?}", first.derive), format!("{:?}", other.derive));
    }
    if other.mesh != first.mesh {
        return mismatch("mesh", first.mesh.to_string(), other.mesh.to_string());
    }
    if other.metrics != first.metrics {
        return mismatch("metrics", format!("{:?}", first.metrics), format!("{:?}", other.metrics));
    }
    Ok(())
}

fn coordinate_labels(profile: &SweepProfile) -> Vec<String> {
    let label = |name: &str| {
        profile
            .axes
            .iter()
            .find(|axis| axis.name == name)
            .map(|axis| axis.display_label().to_string())
            .unwrap_or_else(|| name.to_string())
    };

    if profile.mesh {
        return profile
            .axes
            .iter()
            .map(|axis| axis.display_label().to_string())
            .collect();
    }
    match &profile.derive {
        Derivation::Point => profile
            .axes
            .iter()
            .take(1)
            .map(|axis| axis.display_label().to_string())
            .collect(),
        Derivation::Axis(name) => vec![label(name)],
        Derivation::FirstCount => vec!["threads".to_string()],
        Derivation::CountSum => vec!["total threads".to_string()],
    }
}

/// Aggregated series of one executable
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableResult {
    pub name: String,
    pub series: AggregatedSeries,
}

/// Everything a finished sweep produced
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub sweep: String,
    pub title: String,
    pub derive: Derivation,
    pub mesh: bool,
    pub metrics: Vec<Metric>,
    pub labels: Vec<String>,
    pub runs: u32,
    pub grid: Grid,
    pub results: Vec<ExecutableResult>,
}

impl SweepOutcome {
    /// One snapshot per executable
    pub fn snapshots(&self, commit_id: &str, generated_at: DateTime<Utc>) -> Vec<Snapshot> {
        self.results
            .iter()
            .map(|result| Snapshot {
                commit_id: commit_id.to_string(),
                sweep: self.sweep.clone(),
                title: self.title.clone(),
                executable: result.name.clone(),
                generated_at,
                runs: self.runs,
                derive: self.derive.clone(),
                mesh: self.mesh,
                metrics: self.metrics.clone(),
                labels: self.labels.clone(),
                axes: self.grid.axes().to_vec(),
                series: result.series.clone(),
            })
            .collect()
    }

    /// Reassemble a sweep from its saved snapshots
    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> Result<Self> {
        let first = snapshots.first().ok_or(SweepError::NoSnapshots)?;
        for other in &snapshots[1..] {
            check_compatible(first, other)?;
        }

        let grid = first.grid()?;
        if first.mesh {
            grid.require_mesh()?;
        }

        let mut outcome = Self {
            sweep: first.sweep.clone(),
            title: first.title.clone(),
            derive: first.derive.clone(),
            mesh: first.mesh,
            metrics: first.metrics.clone(),
            labels: first.labels.clone(),
            runs: first.runs,
            grid,
            results: Vec::with_capacity(snapshots.len()),
        };
        outcome.results = snapshots
            .into_iter()
            .map(|snapshot| ExecutableResult {
                name: snapshot.executable,
                series: snapshot.series,
            })
            .collect();
        Ok(outcome)
    }

    /// Renderer hand-off, one entry per metric
    pub fn render(&self, commit_id: Option<&str>) -> Result<Vec<RenderData>> {
        let aggregates: Vec<&AggregatedSeries> = self.results.iter().map(|r| &r.series).collect();
        let request = RenderRequest {
            title: &self.title,
            commit_id,
            labels: &self.labels,
            metrics: &self.metrics,
            mesh: self.mesh.then_some(&self.grid),
        };
        Ok(export::render(&request, &aggregates)?)
    }
}
