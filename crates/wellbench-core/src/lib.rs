//! Sweep, run, parse and aggregate MemoryWell micro-benchmarks
//!
//! The pipeline for one sweep:
//!
//! 1. [`grid`] expands the profile's axes into configuration points
//! 2. [`runner`] runs each executable once per point and trial
//! 3. [`parser`] turns each report into measurement records
//! 4. [`aggregate`] averages the records per coordinate and variant
//! 5. [`export`] reshapes the means into line or mesh series
//!
//! [`sweep::SweepPlan`] drives all of it.
//!
//! ```rust,no_run
//! use wellbench_config::BenchConfig;
//! use wellbench_core::{SweepPlan, SystemRunner};
//!
//! # fn main() -> Result<(), wellbench_core::SweepError> {
//! let config = BenchConfig::default();
//! let plan = SweepPlan::from_profile(&config.sweeps[0], config.runs)?;
//! let outcome = plan.execute(&SystemRunner::new())?;
//! for data in outcome.render(None)? {
//!     println!("{} / {}", data.title, data.metric);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod git;
pub mod grid;
pub mod parser;
pub mod record;
pub mod runner;
pub mod snapshot;
pub mod sweep;

pub use aggregate::{AggregatedSeries, AggregationKey, Aggregator, Derivation, MetricMean, SeriesEntry};
pub use error::SweepError;
pub use export::{LineSeries, MeshSeries, RenderData, RenderForm};
pub use grid::{ConfigurationPoint, Grid, GridError};
pub use parser::{LogParser, ParseError, ParseOptions};
pub use record::{MeasurementRecord, Metrics, RunId, TrialStatus};
pub use runner::{Invocation, ProcessRunner, RunOutput, RunnerError, SystemRunner};
pub use snapshot::Snapshot;
pub use sweep::{ExecutableResult, SweepOutcome, SweepPlan};
pub use wellbench_config::Metric;
