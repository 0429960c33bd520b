//! Benchmark report parsing
//!
//! Reports interleave status lines and timing lines:
//!
//! ```text
//! 1/3 WELL_MTX-SPIN; 1->1 OK
//! cpu time 0.50s; wall time 0.30s
//! 2/3 WELL_MTX-SPIN; 1->1 TIMEOUT
//! 3/3 WELL_MTX-SPIN; 1->1 OK
//! cpu time 0.55s; wall time 0.35s
//! ```
//!
//! The parser walks the text once, line by line, and closes each trial as
//! soon as its timing arrives. A timing line always belongs to the status
//! line that is currently open; anything that breaks that pairing is a
//! [`ParseError::Mismatch`] instead of a guess. Lines matching none of the
//! patterns are log noise and skipped.
//!
//! Reports without any status line (the plain `well_bench` output) yield one
//! record per timing line, named after [`ParseOptions::fallback_variant`].

use crate::record::{Counts, MeasurementRecord, Metrics, RunId, TrialStatus};
use regex::{Captures, Regex};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::trace;

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*([0-9]\w*)/([0-9]\w*)\s+([A-Za-z_][\w.+-]*);?\s+([0-9]\w*)(?:->([0-9]\w*))?(?:\s+(OK|TIMEOUT)(?:\s.*)?)?\s*$",
    )
    .expect("status line regex")
});

static TIMING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*cpu time:?\s+([0-9][0-9.]*)s(?:;\s*wall time:?\s+([0-9][0-9.]*)s)?\s*$")
        .expect("timing line regex")
});

static OPERATIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*operations:?\s+(\S+)\s*$").expect("operations regex"));

static TXRX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*TX threads\s+([^\s;]+);\s*RX threads\s+(\S+)\s*$").expect("tx/rx regex")
});

static PAIRS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*thread pairs\s+(\S+)\s*$").expect("thread pairs regex"));

/// Why correlated lines could not be paired
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    /// A status line was never followed by its timing line
    StatusWithoutTiming { run: RunId },
    /// A timing line arrived with no open status line
    TimingWithoutStatus,
    /// A status line appeared after plain timing records
    StatusAfterPlainRecords,
    /// Two `operations` lines for one trial
    DuplicateOperations,
    /// A trial was skipped, repeated or started out of order
    RunGap { expected: u32, got: RunId },
    /// The report stopped before the last announced trial
    IncompleteRun { last: RunId },
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKind::StatusWithoutTiming { run } => {
                write!(f, "status line for trial {} has no timing line", run)
            }
            MismatchKind::TimingWithoutStatus => {
                f.write_str("timing line has no preceding status line")
            }
            MismatchKind::StatusAfterPlainRecords => {
                f.write_str("status line follows timing lines without status")
            }
            MismatchKind::DuplicateOperations => {
                f.write_str("more than one operations line for a single trial")
            }
            MismatchKind::RunGap { expected, got } => {
                write!(f, "expected trial {}, found {}", expected, got)
            }
            MismatchKind::IncompleteRun { last } => {
                write!(f, "report ends after trial {}", last)
            }
        }
    }
}

/// Report parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("parse mismatch at line {line}: {kind} ({status_lines} status lines, {timing_lines} timing lines so far)")]
    Mismatch {
        line: usize,
        kind: MismatchKind,
        status_lines: usize,
        timing_lines: usize,
    },

    #[error("line {line}: malformed {field} '{token}'")]
    NumericFormat {
        line: usize,
        field: &'static str,
        token: String,
    },

    #[error("line {line}: trial {run} is out of range")]
    InvalidRunId { line: usize, run: RunId },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Defaults for reports that do not name themselves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Variant for records without a status line
    pub fallback_variant: String,
    /// Run id for records without a status line
    pub fallback_run: RunId,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fallback_variant: "unknown".to_string(),
            fallback_run: RunId::new(1, 1),
        }
    }
}

/// Extracts [`MeasurementRecord`]s from report text
#[derive(Debug, Clone, Default)]
pub struct LogParser {
    options: ParseOptions,
}

impl LogParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a complete report
    pub fn parse(&self, text: &str) -> Result<Vec<MeasurementRecord>> {
        let mut state = ParseState::new(&self.options);

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;

            if let Some(caps) = STATUS_RE.captures(line) {
                let status = parse_status(&caps, line_no)?;
                state.on_status(status, line_no)?;
            } else if let Some(caps) = TIMING_RE.captures(line) {
                let cpu = parse_num::<f64>(&caps, 1, "cpu time", line_no)?;
                let wall = caps
                    .get(2)
                    .map(|_| parse_num::<f64>(&caps, 2, "wall time", line_no))
                    .transpose()?;
                state.on_timing(cpu, wall, line_no)?;
            } else if let Some(caps) = OPERATIONS_RE.captures(line) {
                let ops = parse_num::<u64>(&caps, 1, "operations", line_no)?;
                state.on_operations(ops, line_no)?;
            } else if let Some(caps) = TXRX_RE.captures(line) {
                let tx = parse_num::<u64>(&caps, 1, "TX threads", line_no)?;
                let rx = parse_num::<u64>(&caps, 2, "RX threads", line_no)?;
                state.echo_counts = Some(Counts {
                    first: tx,
                    second: Some(rx),
                });
            } else if let Some(caps) = PAIRS_RE.captures(line) {
                let pairs = parse_num::<u64>(&caps, 1, "thread pairs", line_no)?;
                state.echo_counts = Some(Counts {
                    first: pairs,
                    second: Some(pairs),
                });
            } else {
                trace!(line = line_no, "skipping noise: {}", line);
            }
        }

        state.finish(text.lines().count())
    }
}

/// A status line waiting for its timing
#[derive(Debug)]
struct OpenTrial {
    run: RunId,
    variant: String,
    status: TrialStatus,
    counts: Counts,
    /// A TIMEOUT trial already swallowed the timing line the benchmark printed
    timing_consumed: bool,
}

/// Trials of one variant and thread configuration, numbered `1..=total`
#[derive(Debug)]
struct Sequence {
    variant: String,
    counts: Counts,
    last: RunId,
}

impl Sequence {
    fn continues(&self, trial: &OpenTrial) -> bool {
        self.variant == trial.variant
            && self.counts == trial.counts
            && self.last.total == trial.run.total
    }

    fn is_complete(&self) -> bool {
        self.last.trial == self.last.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Undecided,
    Status,
    Plain,
}

struct ParseState<'a> {
    options: &'a ParseOptions,
    mode: Mode,
    open: Option<OpenTrial>,
    sequence: Option<Sequence>,
    pending_ops: Option<u64>,
    echo_counts: Option<Counts>,
    status_lines: usize,
    timing_lines: usize,
    records: Vec<MeasurementRecord>,
}

impl<'a> ParseState<'a> {
    fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            mode: Mode::Undecided,
            open: None,
            sequence: None,
            pending_ops: None,
            echo_counts: None,
            status_lines: 0,
            timing_lines: 0,
            records: Vec::new(),
        }
    }

    fn mismatch(&self, line: usize, kind: MismatchKind) -> ParseError {
        ParseError::Mismatch {
            line,
            kind,
            status_lines: self.status_lines,
            timing_lines: self.timing_lines,
        }
    }

    fn on_status(&mut self, next: OpenTrial, line: usize) -> Result<()> {
        if self.mode == Mode::Plain {
            return Err(self.mismatch(line, MismatchKind::StatusAfterPlainRecords));
        }
        self.mode = Mode::Status;
        self.close_open(line)?;
        self.advance(&next, line)?;
        self.status_lines += 1;
        self.open = Some(next);
        Ok(())
    }

    /// Trials run `1..=total` without gaps; a new sequence starts only once
    /// the previous one is complete
    fn advance(&mut self, next: &OpenTrial, line: usize) -> Result<()> {
        let expected = match &self.sequence {
            Some(seq) if seq.continues(next) => seq.last.trial + 1,
            Some(seq) if !seq.is_complete() => {
                return Err(self.mismatch(line, MismatchKind::IncompleteRun { last: seq.last }));
            }
            _ => 1,
        };
        if next.run.trial != expected {
            return Err(self.mismatch(
                line,
                MismatchKind::RunGap {
                    expected,
                    got: next.run,
                },
            ));
        }

        self.sequence = Some(Sequence {
            variant: next.variant.clone(),
            counts: next.counts,
            last: next.run,
        });
        Ok(())
    }

    fn on_timing(&mut self, cpu: f64, wall: Option<f64>, line: usize) -> Result<()> {
        self.timing_lines += 1;

        if self.mode == Mode::Undecided {
            self.mode = Mode::Plain;
        }

        if self.mode == Mode::Plain {
            let metrics = Metrics {
                cpu_secs: Some(cpu),
                wall_secs: wall,
                operations: self.pending_ops.take(),
            };
            self.records.push(MeasurementRecord {
                run: self.options.fallback_run,
                variant: self.options.fallback_variant.clone(),
                status: TrialStatus::Ok,
                counts: self.echo_counts.take(),
                metrics,
            });
            return Ok(());
        }

        match self.open.take() {
            Some(mut open) if open.status.is_timeout() => {
                if open.timing_consumed {
                    return Err(self.mismatch(line, MismatchKind::TimingWithoutStatus));
                }
                // Timed-out trials keep missing metrics whatever was printed
                open.timing_consumed = true;
                self.open = Some(open);
                Ok(())
            }
            Some(open) => {
                let metrics = Metrics {
                    cpu_secs: Some(cpu),
                    wall_secs: wall,
                    operations: self.pending_ops.take(),
                };
                self.push(open, metrics);
                Ok(())
            }
            None => Err(self.mismatch(line, MismatchKind::TimingWithoutStatus)),
        }
    }

    fn on_operations(&mut self, ops: u64, line: usize) -> Result<()> {
        if self.pending_ops.is_some() {
            return Err(self.mismatch(line, MismatchKind::DuplicateOperations));
        }
        self.pending_ops = Some(ops);
        Ok(())
    }

    /// Close the open trial before a new status line or end of text
    fn close_open(&mut self, line: usize) -> Result<()> {
        match self.open.take() {
            Some(open) if open.status.is_timeout() => {
                self.pending_ops = None;
                self.push(open, Metrics::default());
                Ok(())
            }
            Some(open) => Err(self.mismatch(
                line,
                MismatchKind::StatusWithoutTiming { run: open.run },
            )),
            None => Ok(()),
        }
    }

    fn push(&mut self, open: OpenTrial, metrics: Metrics) {
        self.records.push(MeasurementRecord {
            run: open.run,
            variant: open.variant,
            status: open.status,
            counts: Some(open.counts),
            metrics,
        });
    }

    fn finish(mut self, last_line: usize) -> Result<Vec<MeasurementRecord>> {
        self.close_open(last_line)?;
        if let Some(seq) = self.sequence.as_ref().filter(|seq| !seq.is_complete()) {
            return Err(self.mismatch(last_line, MismatchKind::IncompleteRun { last: seq.last }));
        }
        Ok(self.records)
    }
}

fn parse_status(caps: &Captures<'_>, line: usize) -> Result<OpenTrial> {
    let trial = parse_num::<u32>(caps, 1, "trial", line)?;
    let total = parse_num::<u32>(caps, 2, "trial total", line)?;
    let run = RunId::new(trial, total);
    if trial == 0 || trial > total {
        return Err(ParseError::InvalidRunId { line, run });
    }

    let first = parse_num::<u64>(caps, 4, "count", line)?;
    let second = caps
        .get(5)
        .map(|_| parse_num::<u64>(caps, 5, "count", line))
        .transpose()?;

    let status = match caps.get(6).map(|m| m.as_str()) {
        Some("OK") => TrialStatus::Ok,
        Some("TIMEOUT") => TrialStatus::Timeout,
        _ => TrialStatus::Progress,
    };

    Ok(OpenTrial {
        run,
        variant: caps[3].to_string(),
        status,
        counts: Counts { first, second },
        timing_consumed: false,
    })
}

fn parse_num<T: FromStr>(
    caps: &Captures<'_>,
    group: usize,
    field: &'static str,
    line: usize,
) -> Result<T> {
    let token = caps.get(group).map(|m| m.as_str()).unwrap_or_default();
    token.parse::<T>().map_err(|_| ParseError::NumericFormat {
        line,
        field,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Vec<MeasurementRecord>> {
        LogParser::default().parse(text)
    }

    const THREE_TRIALS: &str = "1/3 WELL_MTX-SPIN; 1->1 OK\n\
        cpu time 0.50s; wall time 0.30s\n\
        2/3 WELL_MTX-SPIN; 1->1 OK\n\
        cpu time 0.60s; wall time 0.40s\n\
        3/3 WELL_MTX-SPIN; 1->1 OK\n\
        cpu time 0.55s; wall time 0.35s\n";

    #[test]
    fn pairs_status_and_timing_lines() {
        let records = parse(THREE_TRIALS).unwrap();
        assert_eq!(records.len(), 3);

        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.run, RunId::new(i as u32 + 1, 3));
            assert_eq!(record.variant, "WELL_MTX-SPIN");
            assert_eq!(record.status, TrialStatus::Ok);
            assert_eq!(
                record.counts,
                Some(Counts {
                    first: 1,
                    second: Some(1)
                })
            );
            assert!(record.metrics.cpu_secs.is_some());
            assert!(record.metrics.wall_secs.is_some());
        }
        assert_eq!(records[1].metrics.cpu_secs, Some(0.60));
        assert_eq!(records[2].metrics.wall_secs, Some(0.35));
    }

    #[test]
    fn tolerates_surrounding_noise() {
        let text = "Running tests...\n\
            secs 1; blk_size 8; blk_count 16; reservation 1\n\
            \x20 1/1 WELL_XCH-SPIN 4 OK\n\
            tx blocks 100; rx blocks 100; waits 3\n\
            \tcpu time 0.66s; wall time 0.70s  \n\
            done\n";
        let records = parse(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].variant, "WELL_XCH-SPIN");
        assert_eq!(
            records[0].counts,
            Some(Counts {
                first: 4,
                second: None
            })
        );
        assert_eq!(records[0].metrics.cpu_secs, Some(0.66));
    }

    #[test]
    fn timeout_retained_with_missing_metrics() {
        let text = "1/2 WELL_SPL-SPIN; 2->2 TIMEOUT\n\
            2/2 WELL_SPL-SPIN; 2->2 OK\n\
            cpu time 1.25s; wall time 0.75s\n";
        let records = parse(text).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_timeout());
        assert!(records[0].metrics.is_empty());
        assert_eq!(records[1].metrics.cpu_secs, Some(1.25));
    }

    #[test]
    fn timeout_swallows_its_own_timing_line() {
        let text = "1/1 WELL_CAS; 1->1 TIMEOUT\n\
            operations 12\n\
            cpu time 9.00s; wall time 9.00s\n";
        let records = parse(text).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_timeout());
        assert_eq!(records[0].metrics, Metrics::default());
    }

    #[test]
    fn trailing_timeout_closed_at_end_of_text() {
        let text = "1/1 WELL_CAS; 1->1 TIMEOUT\n";
        let records = parse(text).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].metrics.is_empty());
    }

    #[test]
    fn exchange_progress_marker_pairs_like_ok() {
        let text = "1/1 WELL_DO_XCH-SPIN; 2->3\ncpu time 0.10s; wall time 0.20s\n";
        let records = parse(text).unwrap();
        assert_eq!(records[0].status, TrialStatus::Progress);
        assert_eq!(records[0].counts.unwrap().sum(), 5);
    }

    #[test]
    fn missing_timing_is_a_mismatch_not_a_short_zip() {
        let text = "1/2 WELL_MTX; 1->1 OK\n\
            2/2 WELL_MTX; 1->1 OK\n\
            cpu time 0.50s; wall time 0.30s\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Mismatch {
                line: 2,
                kind: MismatchKind::StatusWithoutTiming { .. },
                ..
            }
        ));
    }

    #[test]
    fn extra_timing_is_a_mismatch() {
        let text = "1/1 WELL_MTX; 1->1 OK\n\
            cpu time 0.50s; wall time 0.30s\n\
            cpu time 0.51s; wall time 0.31s\n";
        let err = parse(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::Mismatch {
                line: 3,
                kind: MismatchKind::TimingWithoutStatus,
                status_lines: 1,
                timing_lines: 2,
            }
        );
    }

    #[test]
    fn unterminated_status_at_end_is_a_mismatch() {
        let err = parse("1/1 WELL_MTX; 1->1 OK\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Mismatch {
                kind: MismatchKind::StatusWithoutTiming { .. },
                ..
            }
        ));
    }

    #[test]
    fn skipped_trial_is_a_gap() {
        let text = "1/3 WELL_MTX; 1->1 OK\n\
            cpu time 0.50s; wall time 0.30s\n\
            3/3 WELL_MTX; 1->1 OK\n\
            cpu time 0.55s; wall time 0.35s\n";
        assert_eq!(
            parse(text).unwrap_err(),
            ParseError::Mismatch {
                line: 3,
                kind: MismatchKind::RunGap {
                    expected: 2,
                    got: RunId::new(3, 3)
                },
                status_lines: 1,
                timing_lines: 1,
            }
        );
    }

    #[test]
    fn repeated_trial_is_a_gap() {
        let text = "1/2 WELL_MTX; 1->1 OK\n\
            cpu time 0.50s\n\
            1/2 WELL_MTX; 1->1 OK\n\
            cpu time 0.50s\n";
        assert!(matches!(
            parse(text).unwrap_err(),
            ParseError::Mismatch {
                line: 3,
                kind: MismatchKind::RunGap { expected: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn truncated_report_is_incomplete() {
        let err = parse("1/3 WELL_MTX; 1->1 OK\ncpu time 0.50s\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Mismatch {
                line: 2,
                kind: MismatchKind::IncompleteRun { last },
                ..
            } if last == RunId::new(1, 3)
        ));
        assert!(err.to_string().contains("report ends after trial 1/3"));
    }

    #[test]
    fn sequence_cut_short_before_next_configuration() {
        let text = "1/2 WELL_DO_XCH-SPIN; 1->1\n\
            cpu time 0.10s\n\
            1/2 WELL_DO_XCH-SPIN; 1->2\n\
            cpu time 0.20s\n\
            2/2 WELL_DO_XCH-SPIN; 1->2\n\
            cpu time 0.20s\n";
        assert!(matches!(
            parse(text).unwrap_err(),
            ParseError::Mismatch {
                line: 3,
                kind: MismatchKind::IncompleteRun { .. },
                ..
            }
        ));
    }

    #[test]
    fn consecutive_configurations_each_restart_at_one() {
        let text = "1/2 WELL_DO_XCH-SPIN; 1->1\n\
            cpu time 0.10s\n\
            2/2 WELL_DO_XCH-SPIN; 1->1\n\
            cpu time 0.11s\n\
            1/2 WELL_DO_XCH-SPIN; 1->2\n\
            cpu time 0.20s\n\
            2/2 WELL_DO_XCH-SPIN; 1->2\n\
            cpu time 0.21s\n";
        let records = parse(text).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[2].run, RunId::new(1, 2));
    }

    #[test]
    fn malformed_timing_is_a_numeric_error() {
        let text = "1/1 WELL_MTX; 1->1 OK\ncpu time 0.6.6s; wall time 0.30s\n";
        let err = parse(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::NumericFormat {
                line: 2,
                field: "cpu time",
                token: "0.6.6".to_string(),
            }
        );
    }

    #[test]
    fn malformed_count_is_a_numeric_error() {
        let err = parse("1/1 WELL_MTX; 1x->1 OK\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::NumericFormat { field: "count", .. }
        ));
    }

    #[test]
    fn out_of_range_trial_rejected() {
        let err = parse("4/3 WELL_MTX; 1->1 OK\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidRunId {
                line: 1,
                run: RunId::new(4, 3)
            }
        );
    }

    #[test]
    fn plain_report_uses_fallbacks() {
        let parser = LogParser::new(ParseOptions {
            fallback_variant: "well_bench".to_string(),
            fallback_run: RunId::new(2, 5),
        });
        let text = "operations 123456\n\
            thread pairs 2\n\
            waits: 17\n\
            cpu time 1.9990s; wall time 1.0004s\n";
        let records = parser.parse(text).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.variant, "well_bench");
        assert_eq!(record.run, RunId::new(2, 5));
        assert_eq!(record.metrics.operations, Some(123456));
        assert_eq!(record.metrics.cpu_secs, Some(1.999));
        assert_eq!(record.counts.unwrap().sum(), 4);
    }

    #[test]
    fn colon_form_without_wall_time() {
        let text = "numiter 100000000; blk_size 16; blk_count 8; reservation 4\n\
            TX/RX reservation 4\n\
            cpu time: 30.9824s\n";
        let records = parse(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metrics.cpu_secs, Some(30.9824));
        assert_eq!(records[0].metrics.wall_secs, None);
    }

    #[test]
    fn tx_rx_echo_line_sets_counts() {
        let text = "TX threads 3; RX threads 1\ncpu time 0.25s; wall time 0.20s\n";
        let records = parse(text).unwrap();
        assert_eq!(
            records[0].counts,
            Some(Counts {
                first: 3,
                second: Some(1)
            })
        );
    }

    #[test]
    fn status_after_plain_records_rejected() {
        let text = "cpu time 0.25s; wall time 0.20s\n1/1 WELL_MTX; 1->1 OK\n";
        assert!(matches!(
            parse(text).unwrap_err(),
            ParseError::Mismatch {
                kind: MismatchKind::StatusAfterPlainRecords,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_operations_rejected() {
        let text = "operations 1\noperations 2\ncpu time 0.1s\n";
        assert!(matches!(
            parse(text).unwrap_err(),
            ParseError::Mismatch {
                kind: MismatchKind::DuplicateOperations,
                ..
            }
        ));
    }

    #[test]
    fn zero_operations_is_recorded() {
        let records = parse("operations 0\ncpu time 0.1s\n").unwrap();
        assert_eq!(records[0].metrics.operations, Some(0));
    }

    #[test]
    fn empty_text_has_no_records() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("nothing to see\n").unwrap().is_empty());
    }
}
