//! Error types for a sweep

use crate::aggregate::AggregateError;
use crate::export::ExportError;
use crate::grid::GridError;
use crate::parser::ParseError;
use crate::runner::RunnerError;
use crate::snapshot::SnapshotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("failed to parse output of `{command}`: {source}\n--- stdout ---\n{stdout}")]
    Parse {
        command: String,
        stdout: String,
        #[source]
        source: ParseError,
    },

    #[error("`{command}` reported no measurements\n--- stdout ---\n{stdout}")]
    NoRecords { command: String, stdout: String },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("sweep '{0}' needs at least one run")]
    NoRuns(String),

    #[error("snapshot {field} {found} cannot be combined with {expected}")]
    SnapshotMismatch {
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("no snapshots given")]
    NoSnapshots,
}

pub type Result<T> = std::result::Result<T, SweepError>;
