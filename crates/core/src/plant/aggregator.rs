//! Per-plant aggregation of metric statuses.
//!
//! [`PlantAggregator`] owns the hysteresis memory for every metric of one
//! plant. Each [`update`](PlantAggregator::update) evaluates all metrics,
//! derives the problem list and overall state, and only then publishes the
//! finished [`PlantSnapshot`], so observers never see a half-updated plant.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::EvaluationIssue;
use crate::metrics::{Bound, Metric};
use crate::plant::thresholds::{assess, HysteresisState};
use crate::problem::{MetricStatus, PlantProblem, PlantSnapshot, PlantState};
use crate::reading::{format_value, Reading};
use crate::types::PlantId;

/// Snapshot shared between a plant's aggregator (single writer) and any
/// number of observers.
pub type SharedSnapshot = Arc<RwLock<PlantSnapshot>>;

/// Read a shared snapshot, recovering from a poisoned lock.
///
/// Writers replace the whole snapshot in one assignment, so a poisoned
/// lock still holds a complete value.
pub fn read_snapshot(shared: &SharedSnapshot) -> PlantSnapshot {
    shared
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Upstream source of readings, thresholds and trigger flags for one plant.
pub trait PlantSensors {
    fn current_value(&self, metric: Metric) -> Reading;
    fn threshold(&self, metric: Metric, bound: Bound) -> Reading;
    fn is_trigger_enabled(&self, metric: Metric) -> bool;
}

/// Receiver of published snapshots (change notifications).
pub trait SnapshotSink: Send + Sync {
    fn publish(&self, snapshot: &PlantSnapshot);
}

// ---------------------------------------------------------------------------
// PlantAggregator
// ---------------------------------------------------------------------------

/// Per-plant status aggregator.
pub struct PlantAggregator<S> {
    plant_id: PlantId,
    sensors: S,
    states: BTreeMap<Metric, HysteresisState>,
    snapshot: SharedSnapshot,
    sink: Option<Arc<dyn SnapshotSink>>,
}

impl<S: PlantSensors> PlantAggregator<S> {
    /// Create an aggregator with every metric in the unknown state.
    pub fn new(plant_id: impl Into<PlantId>, sensors: S) -> Self {
        let plant_id = plant_id.into();
        let snapshot = Arc::new(RwLock::new(PlantSnapshot::new(plant_id.clone())));
        Self {
            plant_id,
            sensors,
            states: Metric::ALL
                .into_iter()
                .map(|m| (m, HysteresisState::UNKNOWN))
                .collect(),
            snapshot,
            sink: None,
        }
    }

    /// Attach a sink notified after every update that changes the snapshot.
    pub fn with_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn plant_id(&self) -> &PlantId {
        &self.plant_id
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    /// Mutable access to the inputs; changes take effect on the next update.
    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    /// Handle to the published snapshot, for registering with a directory.
    pub fn shared_snapshot(&self) -> SharedSnapshot {
        Arc::clone(&self.snapshot)
    }

    /// Copy of the last published snapshot.
    pub fn snapshot(&self) -> PlantSnapshot {
        read_snapshot(&self.snapshot)
    }

    /// Stored status for one metric; `None` means unknown.
    pub fn metric_status(&self, metric: Metric) -> Option<MetricStatus> {
        self.states.get(&metric).and_then(|s| s.status())
    }

    /// Run one evaluation cycle and publish the result.
    ///
    /// Idempotent for unchanged inputs. The sink is only notified when the
    /// snapshot differs from the previously published one.
    pub fn update(&mut self) -> PlantSnapshot {
        let mut problems = Vec::new();
        let mut statuses = BTreeMap::new();
        let mut triggers = BTreeMap::new();

        for metric in Metric::ALL {
            let descriptor = metric.descriptor();
            let current = self.sensors.current_value(metric);
            let min = self.sensors.threshold(metric, Bound::Min);
            let max = self.sensors.threshold(metric, Bound::Max);
            let enabled = self.sensors.is_trigger_enabled(metric);

            let previous = self.states.get(&metric).copied().unwrap_or_default();
            let assessment = assess(descriptor.checks, current, min, max, previous);
            let next = assessment.state;

            match assessment.issue {
                Some(issue @ EvaluationIssue::MisconfiguredRange { .. }) => {
                    tracing::warn!(plant_id = %self.plant_id, %metric, %issue, "Misconfigured threshold range");
                }
                Some(issue) => {
                    tracing::debug!(plant_id = %self.plant_id, %metric, %issue, "Metric status unknown");
                }
                None => {}
            }

            if next != previous {
                tracing::info!(
                    plant_id = %self.plant_id,
                    %metric,
                    from = status_label(previous),
                    to = status_label(next),
                    "Metric status changed"
                );
            }

            if enabled {
                if let (Some(status), Some(value)) = (next.status(), current.value()) {
                    if status.is_problem() {
                        problems.push(PlantProblem {
                            metric,
                            status,
                            current: format_value(value),
                            min: min.value(),
                            max: max.value(),
                        });
                    }
                }
            }

            self.states.insert(metric, next);
            statuses.insert(metric, next.status());
            triggers.insert(metric, enabled);
        }

        let state = overall_state(&statuses, &triggers);
        let snapshot = PlantSnapshot {
            plant_id: self.plant_id.clone(),
            state,
            problems,
            statuses,
            triggers,
        };

        let changed = {
            let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            let changed = *guard != snapshot;
            if changed {
                if guard.state != snapshot.state {
                    tracing::info!(
                        plant_id = %self.plant_id,
                        from = %guard.state,
                        to = %snapshot.state,
                        problems = snapshot.problems.len(),
                        "Plant state changed"
                    );
                }
                *guard = snapshot.clone();
            }
            changed
        };

        if changed {
            if let Some(sink) = &self.sink {
                sink.publish(&snapshot);
            }
        }

        snapshot
    }
}

/// Roll metric statuses into the plant state.
///
/// Unknown when no metric has a status; problem when any metric with its
/// trigger enabled is LOW/HIGH; ok otherwise.
pub fn overall_state(
    statuses: &BTreeMap<Metric, Option<MetricStatus>>,
    triggers: &BTreeMap<Metric, bool>,
) -> PlantState {
    if statuses.values().all(Option::is_none) {
        return PlantState::Unknown;
    }

    let problem = statuses.iter().any(|(metric, status)| {
        triggers.get(metric).copied().unwrap_or(true) && status.is_some_and(|s| s.is_problem())
    });

    if problem {
        PlantState::Problem
    } else {
        PlantState::Ok
    }
}

fn status_label(state: HysteresisState) -> &'static str {
    state.status().map_or("unknown", |s| s.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
