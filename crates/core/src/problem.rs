//! Status, problem and snapshot types published after each update cycle.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metric_names::*;
use crate::metrics::Metric;
use crate::types::PlantId;

/// Known status of a single metric. An unknown status is represented as
/// `None` wherever a status is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Ok,
    Low,
    High,
}

impl MetricStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => STATUS_OK,
            Self::Low => STATUS_LOW,
            Self::High => STATUS_HIGH,
        }
    }

    /// `true` for `Low` and `High`.
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Low | Self::High)
    }
}

impl fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall state of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantState {
    Ok,
    Problem,
    #[default]
    Unknown,
}

impl PlantState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => PLANT_STATE_OK,
            Self::Problem => PLANT_STATE_PROBLEM,
            Self::Unknown => PLANT_STATE_UNKNOWN,
        }
    }
}

impl fmt::Display for PlantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active LOW/HIGH condition on an enabled metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantProblem {
    pub metric: Metric,
    /// Always `Low` or `High`.
    pub status: MetricStatus,
    /// Current value rendered for display.
    pub current: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// State of one plant as of its last completed update cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub plant_id: PlantId,
    pub state: PlantState,
    pub problems: Vec<PlantProblem>,
    /// Last evaluated status per metric; `None` means unknown.
    pub statuses: BTreeMap<Metric, Option<MetricStatus>>,
    pub triggers: BTreeMap<Metric, bool>,
}

impl PlantSnapshot {
    /// Empty snapshot for a plant that has not been updated yet.
    pub fn new(plant_id: impl Into<PlantId>) -> Self {
        Self {
            plant_id: plant_id.into(),
            ..Self::default()
        }
    }

    pub fn problem_count(&self) -> usize {
        self.problems.len()
    }

    pub fn has_problem(&self) -> bool {
        self.state == PlantState::Problem
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
