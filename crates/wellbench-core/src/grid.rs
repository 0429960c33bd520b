//! Sweep grid generation
//!
//! A grid is the Cartesian product of its axes, enumerated row-major with
//! the first axis outermost. The order is part of the contract: mesh
//! reshaping downstream relies on it and never re-sorts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use wellbench_config::{AxisConfig, AxisRule};

/// Grid construction errors, raised before any benchmark runs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no axes")]
    NoAxes,

    #[error("axis '{0}' produces no values")]
    EmptyAxis(String),

    #[error("axis '{0}' appears more than once")]
    DuplicateAxis(String),

    #[error("axis '{axis}' lists {value} more than once")]
    DuplicateValue { axis: String, value: u64 },

    #[error("axis '{axis}': 2^{exp} does not fit in 64 bits")]
    Overflow { axis: String, exp: u32 },

    #[error("mesh needs exactly two axes, grid has {0}")]
    MeshAxisCount(usize),

    #[error("mesh axis '{axis}' has {len} value(s), needs at least 2")]
    MeshAxisTooShort { axis: String, len: usize },
}

/// Values of one axis, explicit or generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisValues {
    List(Vec<u64>),
    /// `2^from_exp .. 2^to_exp`, upper exponent exclusive
    PowersOfTwo { from_exp: u32, to_exp: u32 },
}

impl AxisValues {
    fn expand(&self, axis: &str) -> Result<Vec<u64>, GridError> {
        match self {
            AxisValues::List(values) => Ok(values.clone()),
            AxisValues::PowersOfTwo { from_exp, to_exp } => (*from_exp..*to_exp)
                .map(|exp| {
                    1u64.checked_shl(exp).ok_or_else(|| GridError::Overflow {
                        axis: axis.to_string(),
                        exp,
                    })
                })
                .collect(),
        }
    }
}

/// A named axis specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSpec {
    pub name: String,
    pub values: AxisValues,
}

impl AxisSpec {
    pub fn list(name: &str, values: Vec<u64>) -> Self {
        Self {
            name: name.to_string(),
            values: AxisValues::List(values),
        }
    }

    pub fn powers_of_two(name: &str, from_exp: u32, to_exp: u32) -> Self {
        Self {
            name: name.to_string(),
            values: AxisValues::PowersOfTwo { from_exp, to_exp },
        }
    }
}

impl From<&AxisConfig> for AxisSpec {
    fn from(config: &AxisConfig) -> Self {
        let values = match &config.rule {
            AxisRule::List { values } => AxisValues::List(values.clone()),
            AxisRule::PowersOfTwo { from, to } => AxisValues::PowersOfTwo {
                from_exp: *from,
                to_exp: *to,
            },
        };
        Self {
            name: config.name.clone(),
            values,
        }
    }
}

/// An axis after expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub values: Vec<u64>,
}

/// One cell of the sweep grid
///
/// `index` is the generation ordinal; coordinates follow axis order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigurationPoint {
    index: usize,
    coords: Vec<(String, u64)>,
}

impl ConfigurationPoint {
    /// Generation ordinal within the grid
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of a named axis
    pub fn get(&self, axis: &str) -> Option<u64> {
        self.coords
            .iter()
            .find(|(name, _)| name == axis)
            .map(|(_, value)| *value)
    }

    /// Axis values in axis order
    pub fn values(&self) -> Vec<u64> {
        self.coords.iter().map(|(_, value)| *value).collect()
    }

    /// `(axis, value)` pairs in axis order
    pub fn coords(&self) -> &[(String, u64)] {
        &self.coords
    }
}

impl std::fmt::Display for ConfigurationPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .coords
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Expanded sweep grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    axes: Vec<Axis>,
}

impl Grid {
    /// Expand and validate axis specifications
    pub fn new(specs: Vec<AxisSpec>) -> Result<Self, GridError> {
        if specs.is_empty() {
            return Err(GridError::NoAxes);
        }

        let mut seen = HashSet::new();
        let mut axes = Vec::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.name.clone()) {
                return Err(GridError::DuplicateAxis(spec.name));
            }
            let values = spec.values.expand(&spec.name)?;
            if values.is_empty() {
                return Err(GridError::EmptyAxis(spec.name));
            }
            let mut distinct = HashSet::with_capacity(values.len());
            if let Some(&value) = values.iter().find(|v| !distinct.insert(**v)) {
                return Err(GridError::DuplicateValue {
                    axis: spec.name,
                    value,
                });
            }
            axes.push(Axis {
                name: spec.name,
                values,
            });
        }

        Ok(Self { axes })
    }

    /// Build from profile axis configs
    pub fn from_config(axes: &[AxisConfig]) -> Result<Self, GridError> {
        Self::new(axes.iter().map(AxisSpec::from).collect())
    }

    /// Rebuild from already expanded axes, e.g. out of a snapshot
    pub fn from_axes(axes: Vec<Axis>) -> Result<Self, GridError> {
        Self::new(
            axes.into_iter()
                .map(|axis| AxisSpec {
                    name: axis.name,
                    values: AxisValues::List(axis.values),
                })
                .collect(),
        )
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Per-axis lengths, outermost first
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.values.len()).collect()
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the grid can be reshaped into a rectangular surface
    pub fn require_mesh(&self) -> Result<(), GridError> {
        if self.axes.len() != 2 {
            return Err(GridError::MeshAxisCount(self.axes.len()));
        }
        for axis in &self.axes {
            if axis.values.len() < 2 {
                return Err(GridError::MeshAxisTooShort {
                    axis: axis.name.clone(),
                    len: axis.values.len(),
                });
            }
        }
        Ok(())
    }

    /// All points, row-major, first axis outermost
    pub fn points(&self) -> Vec<ConfigurationPoint> {
        let shape = self.shape();
        let total = self.len();
        let mut points = Vec::with_capacity(total);

        for index in 0..total {
            // Decompose the ordinal; the last axis varies fastest
            let mut rem = index;
            let mut coords = vec![(String::new(), 0u64); shape.len()];
            for (slot, axis) in self.axes.iter().enumerate().rev() {
                let len = shape[slot];
                coords[slot] = (axis.name.clone(), axis.values[rem % len]);
                rem /= len;
            }
            points.push(ConfigurationPoint { index, coords });
        }

        points
    }
}
