//! Trial aggregation
//!
//! Records are grouped by [`AggregationKey`] (derived coordinate + variant)
//! and every metric is averaged over the trials that actually reported it.
//! A key whose trials all came back empty (e.g. every run timed out) stays
//! in the output as [`MetricMean::NoData`] so the coordinate list downstream
//! remains complete.

use crate::grid::ConfigurationPoint;
use crate::record::MeasurementRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use wellbench_config::Metric;

pub use wellbench_config::Derivation;

/// Decimal places kept in aggregated means
pub const MEAN_PRECISION: i32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("point {point}: expected trial {expected}, got trial {got}")]
    NonContiguousTrial {
        point: usize,
        expected: usize,
        got: usize,
    },

    #[error("record {run} of '{variant}' has no counts to derive a coordinate from")]
    MissingCounts { variant: String, run: String },

    #[error("point {point} has no axis '{axis}'")]
    UnknownAxis { point: usize, axis: String },
}

pub type Result<T> = std::result::Result<T, AggregateError>;

/// Grouping identity for averaging
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AggregationKey {
    pub coordinate: Vec<u64>,
    pub variant: String,
}

impl std::fmt::Display for AggregationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let coords: Vec<String> = self.coordinate.iter().map(u64::to_string).collect();
        write!(f, "({}) {}", coords.join(", "), self.variant)
    }
}

/// Mean of one metric for one key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricMean {
    Mean { value: f64, samples: usize },
    NoData,
}

impl MetricMean {
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricMean::Mean { value, .. } => Some(*value),
            MetricMean::NoData => None,
        }
    }

    pub fn samples(&self) -> usize {
        match self {
            MetricMean::Mean { samples, .. } => *samples,
            MetricMean::NoData => 0,
        }
    }

    fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return MetricMean::NoData;
        }
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        MetricMean::Mean {
            value: round_to(mean, MEAN_PRECISION),
            samples: samples.len(),
        }
    }
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Aggregated values for one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub key: AggregationKey,
    /// Generation index of the first grid point that produced this key
    pub point_index: usize,
    /// Records that contributed, timed out or not
    pub trials: usize,
    pub timeouts: usize,
    pub metrics: BTreeMap<Metric, MetricMean>,
}

impl SeriesEntry {
    pub fn mean(&self, metric: Metric) -> MetricMean {
        self.metrics.get(&metric).copied().unwrap_or(MetricMean::NoData)
    }

    /// At least one metric has a sample
    pub fn has_data(&self) -> bool {
        self.metrics.values().any(|m| m.samples() > 0)
    }
}

/// Ordered key -> aggregate mapping
///
/// Entries follow grid generation order, then first-seen variant order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSeries {
    entries: Vec<SeriesEntry>,
}

impl AggregatedSeries {
    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &AggregationKey) -> Option<&SeriesEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Variants in first-seen order
    pub fn variants(&self) -> Vec<&str> {
        let mut variants: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !variants.contains(&entry.key.variant.as_str()) {
                variants.push(&entry.key.variant);
            }
        }
        variants
    }

    /// Distinct coordinates in entry order
    pub fn coordinates(&self) -> Vec<&[u64]> {
        let mut coords: Vec<&[u64]> = Vec::new();
        for entry in &self.entries {
            if !coords.contains(&entry.key.coordinate.as_slice()) {
                coords.push(&entry.key.coordinate);
            }
        }
        coords
    }

    /// Keys with no valid sample for any metric
    pub fn insufficient(&self) -> impl Iterator<Item = &SeriesEntry> {
        self.entries.iter().filter(|e| !e.has_data())
    }
}

#[derive(Debug)]
struct Slot {
    key: AggregationKey,
    point_index: usize,
    seq: usize,
    trials: usize,
    timeouts: usize,
    samples: BTreeMap<Metric, Vec<f64>>,
}

/// Accumulates trials for one sweep
///
/// Owns all accumulation state; build a fresh one per sweep.
#[derive(Debug)]
pub struct Aggregator {
    derivation: Derivation,
    slots: Vec<Slot>,
    index: HashMap<AggregationKey, usize>,
    next_trial: HashMap<usize, usize>,
}

impl Aggregator {
    pub fn new(derivation: Derivation) -> Self {
        Self {
            derivation,
            slots: Vec::new(),
            index: HashMap::new(),
            next_trial: HashMap::new(),
        }
    }

    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    /// Add the records of one trial at one grid point
    ///
    /// Trials of a point must arrive as `0, 1, 2, ...`.
    pub fn ingest(
        &mut self,
        point: &ConfigurationPoint,
        trial: usize,
        records: &[MeasurementRecord],
    ) -> Result<()> {
        let expected = self.next_trial.get(&point.index()).copied().unwrap_or(0);
        if trial != expected {
            return Err(AggregateError::NonContiguousTrial {
                point: point.index(),
                expected,
                got: trial,
            });
        }

        // Derive every coordinate before touching state so a bad record
        // leaves the aggregator unchanged
        let coordinates = records
            .iter()
            .map(|record| derive_coordinate(&self.derivation, point, record))
            .collect::<Result<Vec<_>>>()?;

        self.next_trial.insert(point.index(), expected + 1);

        for (record, coordinate) in records.iter().zip(coordinates) {
            let key = AggregationKey {
                coordinate,
                variant: record.variant.clone(),
            };
            let slot_idx = match self.index.get(&key) {
                Some(idx) => *idx,
                None => {
                    let idx = self.slots.len();
                    self.slots.push(Slot {
                        key: key.clone(),
                        point_index: point.index(),
                        seq: idx,
                        trials: 0,
                        timeouts: 0,
                        samples: BTreeMap::new(),
                    });
                    self.index.insert(key, idx);
                    idx
                }
            };

            let slot = &mut self.slots[slot_idx];
            slot.point_index = slot.point_index.min(point.index());
            slot.trials += 1;
            if record.is_timeout() {
                slot.timeouts += 1;
            }
            for metric in Metric::ALL {
                let samples = slot.samples.entry(metric).or_default();
                if let Some(value) = record.metrics.get(metric) {
                    samples.push(value);
                }
            }
        }

        Ok(())
    }

    /// Snapshot the current means; does not consume accumulated state
    pub fn finish(&self) -> AggregatedSeries {
        let mut order: Vec<&Slot> = self.slots.iter().collect();
        order.sort_by_key(|slot| (slot.point_index, slot.seq));

        let entries = order
            .into_iter()
            .map(|slot| SeriesEntry {
                key: slot.key.clone(),
                point_index: slot.point_index,
                trials: slot.trials,
                timeouts: slot.timeouts,
                metrics: Metric::ALL
                    .iter()
                    .map(|metric| {
                        let samples = slot.samples.get(metric).map(Vec::as_slice).unwrap_or(&[]);
                        (*metric, MetricMean::from_samples(samples))
                    })
                    .collect(),
            })
            .collect();

        AggregatedSeries { entries }
    }
}

fn derive_coordinate(
    derivation: &Derivation,
    point: &ConfigurationPoint,
    record: &MeasurementRecord,
) -> Result<Vec<u64>> {
    let counts = || {
        record.counts.ok_or_else(|| AggregateError::MissingCounts {
            variant: record.variant.clone(),
            run: record.run.to_string(),
        })
    };

    match derivation {
        Derivation::Point => Ok(point.values()),
        Derivation::Axis(axis) => point
            .get(axis)
            .map(|value| vec![value])
            .ok_or_else(|| AggregateError::UnknownAxis {
                point: point.index(),
                axis: axis.clone(),
            }),
        Derivation::FirstCount => Ok(vec![counts()?.first]),
        Derivation::CountSum => Ok(vec![counts()?.sum()]),
    }
}

/// Aggregate a complete ordered batch in one go
pub fn aggregate<'a, I>(derivation: Derivation, batches: I) -> Result<AggregatedSeries>
where
    I: IntoIterator<Item = (&'a ConfigurationPoint, usize, &'a [MeasurementRecord])>,
{
    let mut aggregator = Aggregator::new(derivation);
    for (point, trial, records) in batches {
        aggregator.ingest(point, trial, records)?;
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{AxisSpec, Grid};
    use crate::record::{Counts, Metrics, RunId, TrialStatus};
    use proptest::prelude::*;

    fn record(variant: &str, counts: (u64, u64), cpu: Option<f64>) -> MeasurementRecord {
        MeasurementRecord {
            run: RunId::new(1, 1),
            variant: variant.to_string(),
            status: if cpu.is_some() {
                TrialStatus::Ok
            } else {
                TrialStatus::Timeout
            },
            counts: Some(Counts {
                first: counts.0,
                second: Some(counts.1),
            }),
            metrics: Metrics {
                cpu_secs: cpu,
                wall_secs: cpu.map(|c| c / 2.0),
                operations: None,
            },
        }
    }

    fn grid(values: Vec<u64>) -> Vec<ConfigurationPoint> {
        Grid::new(vec![AxisSpec::list("threads", values)])
            .unwrap()
            .points()
    }

    #[test]
    fn mean_rounds_to_three_places() {
        let points = grid(vec![1]);
        let mut agg = Aggregator::new(Derivation::Axis("threads".into()));
        for (trial, cpu) in [0.60, 0.64, 0.68].into_iter().enumerate() {
            agg.ingest(&points[0], trial, &[record("MTX", (1, 1), Some(cpu))])
                .unwrap();
        }

        let series = agg.finish();
        let entry = &series.entries()[0];
        assert_eq!(
            entry.mean(Metric::CpuTime),
            MetricMean::Mean {
                value: 0.64,
                samples: 3
            }
        );
        assert_eq!(entry.mean(Metric::Operations), MetricMean::NoData);
    }

    #[test]
    fn variants_never_merge() {
        let points = grid(vec![2]);
        let series = aggregate(
            Derivation::Point,
            [(
                &points[0],
                0,
                &[record("MTX", (1, 1), Some(1.0)), record("XCH", (1, 1), Some(2.0))][..],
            )],
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.variants(), vec!["MTX", "XCH"]);
    }

    #[test]
    fn timeouts_excluded_from_mean_but_counted() {
        let points = grid(vec![1]);
        let mut agg = Aggregator::new(Derivation::Point);
        agg.ingest(&points[0], 0, &[record("SPL", (1, 1), Some(0.5))])
            .unwrap();
        agg.ingest(&points[0], 1, &[record("SPL", (1, 1), None)])
            .unwrap();

        let entry = agg.finish().entries()[0].clone();
        assert_eq!(entry.trials, 2);
        assert_eq!(entry.timeouts, 1);
        assert_eq!(entry.mean(Metric::CpuTime).value(), Some(0.5));
        assert_eq!(entry.mean(Metric::CpuTime).samples(), 1);
    }

    #[test]
    fn all_timeouts_keep_key_with_no_data() {
        let points = grid(vec![1, 2]);
        let mut agg = Aggregator::new(Derivation::Point);
        agg.ingest(&points[0], 0, &[record("CAS", (1, 1), None)])
            .unwrap();
        agg.ingest(&points[1], 0, &[record("CAS", (2, 2), Some(0.3))])
            .unwrap();

        let series = agg.finish();
        assert_eq!(series.len(), 2);
        assert!(!series.entries()[0].has_data());
        assert_eq!(series.entries()[0].mean(Metric::CpuTime), MetricMean::NoData);
        assert_eq!(series.insufficient().count(), 1);
    }

    #[test]
    fn zero_values_are_averaged() {
        let points = grid(vec![1]);
        let mut agg = Aggregator::new(Derivation::Point);
        agg.ingest(&points[0], 0, &[record("MTX", (1, 1), Some(0.0))])
            .unwrap();
        agg.ingest(&points[0], 1, &[record("MTX", (1, 1), Some(1.0))])
            .unwrap();
        assert_eq!(
            agg.finish().entries()[0].mean(Metric::CpuTime).value(),
            Some(0.5)
        );
    }

    #[test]
    fn count_sum_merges_differently_labelled_trials() {
        let points = grid(vec![1, 2]);
        let mut agg = Aggregator::new(Derivation::CountSum);
        agg.ingest(&points[0], 0, &[record("MTX", (3, 1), Some(1.0))])
            .unwrap();
        agg.ingest(&points[1], 0, &[record("MTX", (2, 2), Some(2.0))])
            .unwrap();

        let series = agg.finish();
        assert_eq!(series.len(), 1);
        let entry = &series.entries()[0];
        assert_eq!(entry.key.coordinate, vec![4]);
        assert_eq!(entry.trials, 2);
        assert_eq!(entry.mean(Metric::CpuTime).value(), Some(1.5));
    }

    #[test]
    fn order_follows_generation_not_arrival() {
        let points = grid(vec![8, 4]);
        let mut agg = Aggregator::new(Derivation::Axis("threads".into()));
        // Point 1 arrives first
        agg.ingest(&points[1], 0, &[record("B", (1, 1), Some(1.0))])
            .unwrap();
        agg.ingest(&points[0], 0, &[record("A", (1, 1), Some(1.0))])
            .unwrap();

        let series = agg.finish();
        let coords: Vec<u64> = series.entries().iter().map(|e| e.key.coordinate[0]).collect();
        assert_eq!(coords, vec![8, 4]);
    }

    #[test]
    fn trials_must_be_contiguous() {
        let points = grid(vec![1]);
        let mut agg = Aggregator::new(Derivation::Point);
        let err = agg
            .ingest(&points[0], 1, &[record("MTX", (1, 1), Some(1.0))])
            .unwrap_err();
        assert_eq!(
            err,
            AggregateError::NonContiguousTrial {
                point: 0,
                expected: 0,
                got: 1
            }
        );
    }

    #[test]
    fn count_derivation_needs_counts() {
        let points = grid(vec![1]);
        let mut plain = record("MTX", (1, 1), Some(1.0));
        plain.counts = None;
        let mut agg = Aggregator::new(Derivation::FirstCount);
        assert!(matches!(
            agg.ingest(&points[0], 0, &[plain]),
            Err(AggregateError::MissingCounts { .. })
        ));
        // Failed ingest leaves the trial slot open
        agg.ingest(&points[0], 0, &[record("MTX", (1, 1), Some(1.0))])
            .unwrap();
    }

    proptest! {
        #[test]
        fn finish_is_idempotent(cpus in proptest::collection::vec(proptest::option::of(0.0f64..10.0), 1..12)) {
            let points = grid(vec![1, 2, 4]);
            let mut agg = Aggregator::new(Derivation::Point);
            let mut trials = [0usize; 3];
            for (i, cpu) in cpus.iter().enumerate() {
                let p = i % 3;
                agg.ingest(&points[p], trials[p], &[record("V", (1, 1), *cpu)]).unwrap();
                trials[p] += 1;
            }
            prop_assert_eq!(agg.finish(), agg.finish());
        }

        #[test]
        fn same_records_aggregate_identically(
            derivation in prop_oneof![
                Just(Derivation::Point),
                Just(Derivation::FirstCount),
                Just(Derivation::CountSum),
            ],
            trials in proptest::collection::vec(
                (0usize..2, (1u64..4, 1u64..4), proptest::option::of(0.0f64..10.0)),
                1..16,
            ),
        ) {
            let points = grid(vec![1, 2, 4]);
            let mut next_trial = [0usize; 3];
            let batches: Vec<(usize, usize, Vec<MeasurementRecord>)> = trials
                .iter()
                .enumerate()
                .map(|(i, (variant, counts, cpu))| {
                    let p = i % 3;
                    let trial = next_trial[p];
                    next_trial[p] += 1;
                    (p, trial, vec![record(["MTX", "XCH"][*variant], *counts, *cpu)])
                })
                .collect();
            let batch_refs = || {
                batches
                    .iter()
                    .map(|(p, trial, records)| (&points[*p], *trial, records.as_slice()))
            };

            let first = aggregate(derivation.clone(), batch_refs()).unwrap();
            let second = aggregate(derivation, batch_refs()).unwrap();

            let counted: usize = first.entries().iter().map(|e| e.trials).sum();
            prop_assert_eq!(counted, trials.len());
            prop_assert_eq!(first, second);
        }
    }
}
