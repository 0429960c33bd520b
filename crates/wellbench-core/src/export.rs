//! Reshaping aggregated series for the renderer
//!
//! Everything here is pure data in, data out. The renderer receives
//! [`RenderData`] and is responsible only for drawing.

use crate::aggregate::{AggregatedSeries, AggregationKey};
use crate::grid::{Axis, Grid, GridError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use wellbench_config::Metric;

/// Number of ticks on a surface colour bar
pub const COLORBAR_TICKS: usize = 20;

/// Longest tick label, in characters
pub const TICK_LABEL_WIDTH: usize = 5;

/// max/min ratio from which an axis is drawn on a log2 scale
pub const LOG_SCALE_RATIO: u64 = 16;

const SUFFIXES: [&str; 7] = ["", "K", "M", "G", "T", "P", "E"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("line series needs one-dimensional coordinates, got {0:?}")]
    NotLine(Vec<u64>),

    #[error("series key {0} is not a point of the grid")]
    OffGrid(AggregationKey),

    #[error("series key {0} is reported by more than one executable")]
    DuplicateKey(AggregationKey),

    #[error("expected {expected} axis label(s), got {got}")]
    Labels { expected: usize, got: usize },

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Linear,
    Log2,
}

/// Tick positions with their labels, same length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTicks {
    pub scale: Scale,
    pub positions: Vec<f64>,
    pub labels: Vec<String>,
}

/// Human readable magnitude: `1500` -> `"2 K"`, `1000000` -> `"1 M"`
pub fn human_format(value: u64) -> String {
    let mut magnitude = 0;
    let mut scaled = value as f64;
    while scaled >= 1000.0 && magnitude < SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        magnitude += 1;
    }

    // 999_600 rounds up to the next suffix
    let mut rounded = scaled.round();
    if rounded >= 1000.0 && magnitude < SUFFIXES.len() - 1 {
        rounded = (rounded / 1000.0).round();
        magnitude += 1;
    }

    if magnitude == 0 {
        format!("{}", rounded as u64)
    } else {
        format!("{} {}", rounded as u64, SUFFIXES[magnitude])
    }
}

/// Whether the values span enough orders of magnitude for a log2 axis
pub fn spans_magnitudes(values: &[u64]) -> bool {
    let positive: Vec<u64> = values.iter().copied().filter(|v| *v > 0).collect();
    if positive.len() != values.len() {
        return false;
    }
    match (positive.iter().min(), positive.iter().max()) {
        (Some(min), Some(max)) => max / min >= LOG_SCALE_RATIO,
        _ => false,
    }
}

/// log2 tick positions labelled with [`human_format`]
///
/// Zero has no logarithm and is skipped.
pub fn log2_ticks(values: &[u64]) -> AxisTicks {
    let kept: Vec<u64> = values.iter().copied().filter(|v| *v > 0).collect();
    AxisTicks {
        scale: Scale::Log2,
        positions: kept.iter().map(|v| (*v as f64).log2()).collect(),
        labels: kept.iter().map(|v| human_format(*v)).collect(),
    }
}

/// Ticks for a grid axis: log2 when it spans magnitudes, plain otherwise
pub fn axis_ticks(values: &[u64]) -> AxisTicks {
    if spans_magnitudes(values) {
        return log2_ticks(values);
    }
    AxisTicks {
        scale: Scale::Linear,
        positions: values.iter().map(|v| *v as f64).collect(),
        labels: values.iter().map(u64::to_string).collect(),
    }
}

/// `count` evenly spaced ticks starting at `min`, stepping towards `max`
pub fn linear_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let step = (max - min) / count as f64;
    (0..count).map(|i| min + step * i as f64).collect()
}

/// Tick label cut to [`TICK_LABEL_WIDTH`] characters
pub fn tick_label(value: f64) -> String {
    value.to_string().chars().take(TICK_LABEL_WIDTH).collect()
}

/// Colour bar over the present values, `None` when there are none
pub fn colorbar(values: &[Option<f64>]) -> Option<AxisTicks> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let min = present.iter().copied().reduce(f64::min)?;
    let max = present.iter().copied().reduce(f64::max)?;

    let positions = linear_ticks(min, max, COLORBAR_TICKS);
    let labels = positions.iter().map(|p| tick_label(*p)).collect();
    Some(AxisTicks {
        scale: Scale::Linear,
        positions,
        labels,
    })
}

/// Y values of one variant, aligned with [`LineSeries::x_values`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantLine {
    pub variant: String,
    /// `None` where the variant has no data at that x
    pub values: Vec<Option<f64>>,
}

/// One-dimensional form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    /// Sorted ascending
    pub x_values: Vec<u64>,
    pub x_ticks: AxisTicks,
    pub y_series: Vec<VariantLine>,
}

impl LineSeries {
    pub fn build(aggregates: &[&AggregatedSeries], metric: Metric) -> Result<Self> {
        let mut points: HashMap<(u64, &str), Option<f64>> = HashMap::new();
        let mut variants: Vec<&str> = Vec::new();
        let mut x_values: Vec<u64> = Vec::new();

        for series in aggregates {
            for entry in series.entries() {
                let x = match entry.key.coordinate.as_slice() {
                    [x] => *x,
                    other => return Err(ExportError::NotLine(other.to_vec())),
                };
                let variant = entry.key.variant.as_str();
                if points
                    .insert((x, variant), entry.mean(metric).value())
                    .is_some()
                {
                    return Err(ExportError::DuplicateKey(entry.key.clone()));
                }
                if !variants.contains(&variant) {
                    variants.push(variant);
                }
                x_values.push(x);
            }
        }

        x_values.sort_unstable();
        x_values.dedup();

        let y_series = variants
            .into_iter()
            .map(|variant| VariantLine {
                variant: variant.to_string(),
                values: x_values
                    .iter()
                    .map(|x| points.get(&(*x, variant)).copied().flatten())
                    .collect(),
            })
            .collect();

        Ok(Self {
            x_ticks: axis_ticks(&x_values),
            x_values,
            y_series,
        })
    }
}

/// Surface of one variant over the mesh grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub variant: String,
    /// Row-major in grid generation order, `rows.len() * cols.len()` cells
    pub values: Vec<Option<f64>>,
    pub colorbar: Option<AxisTicks>,
}

/// Two-dimensional form; rows follow axis 0, columns axis 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSeries {
    pub rows: Axis,
    pub cols: Axis,
    pub row_ticks: AxisTicks,
    pub col_ticks: AxisTicks,
    pub surfaces: Vec<Surface>,
}

impl MeshSeries {
    /// Series must be keyed by full grid point
    pub fn build(aggregates: &[&AggregatedSeries], grid: &Grid, metric: Metric) -> Result<Self> {
        grid.require_mesh()?;
        let points = grid.points();
        let on_grid: HashSet<Vec<u64>> = points.iter().map(|p| p.values()).collect();

        let mut cells: HashMap<&AggregationKey, Option<f64>> = HashMap::new();
        let mut variants: Vec<&str> = Vec::new();
        for series in aggregates {
            for entry in series.entries() {
                if !on_grid.contains(&entry.key.coordinate) {
                    return Err(ExportError::OffGrid(entry.key.clone()));
                }
                if cells.insert(&entry.key, entry.mean(metric).value()).is_some() {
                    return Err(ExportError::DuplicateKey(entry.key.clone()));
                }
                if !variants.contains(&entry.key.variant.as_str()) {
                    variants.push(&entry.key.variant);
                }
            }
        }

        let surfaces = variants
            .into_iter()
            .map(|variant| {
                let values: Vec<Option<f64>> = points
                    .iter()
                    .map(|point| {
                        let key = AggregationKey {
                            coordinate: point.values(),
                            variant: variant.to_string(),
                        };
                        cells.get(&key).copied().flatten()
                    })
                    .collect();
                Surface {
                    variant: variant.to_string(),
                    colorbar: colorbar(&values),
                    values,
                }
            })
            .collect();

        let axes = grid.axes();
        let (rows, cols) = (axes[0].clone(), axes[1].clone());
        Ok(Self {
            row_ticks: axis_ticks(&rows.values),
            col_ticks: axis_ticks(&cols.values),
            rows,
            cols,
            surfaces,
        })
    }

    /// Cell of a surface, `None` when out of range or without data
    pub fn value(&self, surface: usize, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows.values.len() || col >= self.cols.values.len() {
            return None;
        }
        self.surfaces
            .get(surface)?
            .values
            .get(row * self.cols.values.len() + col)
            .copied()
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderForm {
    Line(LineSeries),
    Mesh(MeshSeries),
}

/// Hand-off to the external renderer, one per metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderData {
    pub title: String,
    pub commit_id: Option<String>,
    pub metric: Metric,
    /// Line: `[x, y]`; mesh: `[rows, cols, z]`
    pub axis_labels: Vec<String>,
    pub form: RenderForm,
}

/// What to render and how to label it
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub title: &'a str,
    pub commit_id: Option<&'a str>,
    /// Labels of the coordinate axes: one for a line, two for a mesh
    pub labels: &'a [String],
    pub metrics: &'a [Metric],
    /// Mesh form over this grid; line form when `None`
    pub mesh: Option<&'a Grid>,
}

/// Build one [`RenderData`] per requested metric
pub fn render(request: &RenderRequest<'_>, aggregates: &[&AggregatedSeries]) -> Result<Vec<RenderData>> {
    let expected = if request.mesh.is_some() { 2 } else { 1 };
    if request.labels.len() != expected {
        return Err(ExportError::Labels {
            expected,
            got: request.labels.len(),
        });
    }

    request
        .metrics
        .iter()
        .map(|metric| {
            let form = match request.mesh {
                Some(grid) => RenderForm::Mesh(MeshSeries::build(aggregates, grid, *metric)?),
                None => RenderForm::Line(LineSeries::build(aggregates, *metric)?),
            };
            let mut axis_labels = request.labels.to_vec();
            axis_labels.push(metric.label().to_string());

            Ok(RenderData {
                title: request.title.to_string(),
                commit_id: request.commit_id.map(str::to_string),
                metric: *metric,
                axis_labels,
                form,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Aggregator, Derivation};
    use crate::grid::AxisSpec;
    use crate::record::{MeasurementRecord, Metrics, RunId, TrialStatus};

    fn record(variant: &str, cpu: Option<f64>) -> MeasurementRecord {
        MeasurementRecord {
            run: RunId::new(1, 1),
            variant: variant.to_string(),
            status: if cpu.is_some() {
                TrialStatus::Ok
            } else {
                TrialStatus::Timeout
            },
            counts: None,
            metrics: Metrics {
                cpu_secs: cpu,
                ..Metrics::default()
            },
        }
    }

    fn line_series(variant: &str, grid: &Grid, cpus: &[Option<f64>]) -> AggregatedSeries {
        let mut agg = Aggregator::new(Derivation::Axis(grid.axes()[0].name.clone()));
        for (point, cpu) in grid.points().iter().zip(cpus) {
            agg.ingest(point, 0, &[record(variant, *cpu)]).unwrap();
        }
        agg.finish()
    }

    #[test]
    fn human_format_rounds_at_thousands() {
        assert_eq!(human_format(0), "0");
        assert_eq!(human_format(999), "999");
        assert_eq!(human_format(1500), "2 K");
        assert_eq!(human_format(4096), "4 K");
        assert_eq!(human_format(1_000_000), "1 M");
        assert_eq!(human_format(999_600), "1 M");
        assert_eq!(human_format(3_000_000_000), "3 G");
    }

    #[test]
    fn log2_ticks_label_with_magnitudes() {
        let ticks = log2_ticks(&[0, 2, 1024, 1 << 20]);
        assert_eq!(ticks.positions, vec![1.0, 10.0, 20.0]);
        assert_eq!(ticks.labels, vec!["2", "1 K", "1 M"]);
    }

    #[test]
    fn axis_ticks_switch_to_log_scale() {
        assert_eq!(axis_ticks(&[2, 4, 8]).scale, Scale::Linear);
        assert_eq!(axis_ticks(&[2, 4, 8, 16, 32]).scale, Scale::Log2);
        // Zero forces a linear axis
        assert_eq!(axis_ticks(&[0, 1, 2, 4, 8, 16]).scale, Scale::Linear);
    }

    #[test]
    fn colorbar_has_twenty_truncated_ticks() {
        let bar = colorbar(&[Some(0.123456), None, Some(2.123456)]).unwrap();
        assert_eq!(bar.positions.len(), COLORBAR_TICKS);
        assert_eq!(bar.positions[0], 0.123456);
        assert!(bar.labels.iter().all(|l| l.chars().count() <= TICK_LABEL_WIDTH));
        assert_eq!(bar.labels[0], "0.123");
        assert!(colorbar(&[None, None]).is_none());
    }

    #[test]
    fn linear_ticks_step_from_min() {
        assert_eq!(linear_ticks(0.0, 1.0, 4), vec![0.0, 0.25, 0.5, 0.75]);
        assert!(linear_ticks(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn line_sorted_by_x_with_gaps() {
        let grid_a = Grid::new(vec![AxisSpec::list("threads", vec![4, 1])]).unwrap();
        let grid_b = Grid::new(vec![AxisSpec::list("threads", vec![2])]).unwrap();
        let a = line_series("MTX", &grid_a, &[Some(0.4), Some(0.1)]);
        let b = line_series("XCH", &grid_b, &[Some(0.2)]);

        let line = LineSeries::build(&[&a, &b], Metric::CpuTime).unwrap();
        assert_eq!(line.x_values, vec![1, 2, 4]);
        assert_eq!(line.y_series[0].variant, "MTX");
        assert_eq!(line.y_series[0].values, vec![Some(0.1), None, Some(0.4)]);
        assert_eq!(line.y_series[1].values, vec![None, Some(0.2), None]);
    }

    #[test]
    fn line_keeps_no_data_coordinate() {
        let grid = Grid::new(vec![AxisSpec::list("threads", vec![1, 2])]).unwrap();
        let series = line_series("SPL", &grid, &[None, Some(0.5)]);
        let line = LineSeries::build(&[&series], Metric::CpuTime).unwrap();
        assert_eq!(line.x_values, vec![1, 2]);
        assert_eq!(line.y_series[0].values, vec![None, Some(0.5)]);
    }

    #[test]
    fn line_rejects_duplicate_keys() {
        let grid = Grid::new(vec![AxisSpec::list("threads", vec![1])]).unwrap();
        let a = line_series("MTX", &grid, &[Some(0.1)]);
        let err = LineSeries::build(&[&a, &a], Metric::CpuTime).unwrap_err();
        assert!(matches!(err, ExportError::DuplicateKey(_)));
    }

    #[test]
    fn mesh_is_row_major_in_generation_order() {
        let grid = Grid::new(vec![
            AxisSpec::list("count", vec![4, 8]),
            AxisSpec::list("size", vec![16, 32, 64]),
        ])
        .unwrap();
        let mut agg = Aggregator::new(Derivation::Point);
        for point in grid.points() {
            let cpu = point.index() as f64;
            agg.ingest(&point, 0, &[record("CAS", Some(cpu))]).unwrap();
        }
        let series = agg.finish();

        let mesh = MeshSeries::build(&[&series], &grid, Metric::CpuTime).unwrap();
        assert_eq!(mesh.rows.values, vec![4, 8]);
        assert_eq!(mesh.cols.values, vec![16, 32, 64]);
        let flat: Vec<f64> = mesh.surfaces[0].values.iter().flatten().copied().collect();
        assert_eq!(flat, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(mesh.value(0, 1, 2), Some(5.0));
        assert_eq!(mesh.value(0, 2, 0), None);
    }

    #[test]
    fn mesh_rejects_line_keys() {
        let grid = Grid::new(vec![
            AxisSpec::list("count", vec![4, 8]),
            AxisSpec::list("size", vec![16, 32]),
        ])
        .unwrap();
        let mut agg = Aggregator::new(Derivation::Axis("count".into()));
        agg.ingest(&grid.points()[0], 0, &[record("CAS", Some(1.0))])
            .unwrap();
        let err = MeshSeries::build(&[&agg.finish()], &grid, Metric::CpuTime).unwrap_err();
        assert!(matches!(err, ExportError::OffGrid(_)));
    }

    #[test]
    fn render_one_per_metric() {
        let grid = Grid::new(vec![AxisSpec::list("threads", vec![1, 2])]).unwrap();
        let series = line_series("MTX", &grid, &[Some(0.1), Some(0.2)]);
        let labels = vec!["threads".to_string()];
        let request = RenderRequest {
            title: "well",
            commit_id: Some("abc1234"),
            labels: &labels,
            metrics: &[Metric::CpuTime, Metric::WallTime],
            mesh: None,
        };

        let rendered = render(&request, &[&series]).unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1].axis_labels, vec!["threads", "wall time (s)"]);
        assert_eq!(rendered[0].commit_id.as_deref(), Some("abc1234"));

        let json = serde_json::to_value(&rendered[0]).unwrap();
        assert_eq!(json["form"]["kind"], "line");
        assert_eq!(json["form"]["x_values"], serde_json::json!([1, 2]));
    }

    #[test]
    fn render_checks_label_count() {
        let grid = Grid::new(vec![AxisSpec::list("threads", vec![1])]).unwrap();
        let series = line_series("MTX", &grid, &[Some(0.1)]);
        let request = RenderRequest {
            title: "well",
            commit_id: None,
            labels: &[],
            metrics: &[Metric::CpuTime],
            mesh: None,
        };
        assert_eq!(
            render(&request, &[&series]).unwrap_err(),
            ExportError::Labels {
                expected: 1,
                got: 0
            }
        );
    }
}
