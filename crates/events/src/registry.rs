//! Global "any plant has a problem" registry.
//!
//! The registry observes plants through a [`PlantDirectory`]; it never
//! owns or evaluates them. The aggregate is computed on read from the
//! directory's current snapshots, so a missed notification can delay the
//! `plant.global_problems_changed` event but never make a read stale.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use plant_monitor_core::{DeviceId, PlantDirectory, PlantId};

use crate::bus::{EventBus, PlantEvent, EVENT_GLOBAL_PROBLEMS_CHANGED};
use crate::subscription::{Subscription, SubscriptionId};

/// One plant with at least one active problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantProblemSummary {
    pub plant_id: PlantId,
    pub friendly_name: String,
    pub problem_count: usize,
    pub device_id: Option<DeviceId>,
}

/// Detail payload of the global signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetail {
    pub plants_with_problems: Vec<PlantProblemSummary>,
    pub total_problems: usize,
    /// All tracked plants, healthy or not.
    pub total_plants: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalProblemStatus {
    pub any_problem: bool,
    pub detail: ProblemDetail,
}

/// Tracks the active plants and derives the global problem signal.
///
/// All access goes through `&mut self` for writes, so membership changes
/// are serialized by whoever owns the registry.
pub struct GlobalProblemRegistry<D: PlantDirectory> {
    directory: Arc<D>,
    bus: Arc<EventBus>,
    tracked: BTreeSet<PlantId>,
    subscription: Option<Subscription>,
    last_any_problem: Option<bool>,
}

impl<D: PlantDirectory> GlobalProblemRegistry<D> {
    /// Create an empty registry. Call [`refresh_membership`](Self::refresh_membership)
    /// to start tracking.
    pub fn new(directory: Arc<D>, bus: Arc<EventBus>) -> Self {
        Self {
            directory,
            bus,
            tracked: BTreeSet::new(),
            subscription: None,
            last_any_problem: None,
        }
    }

    /// Re-read membership from the directory.
    ///
    /// No-op when the set is unchanged. Otherwise the old subscription is
    /// torn down and, for a non-empty set, a single new one covering every
    /// plant is installed. Returns whether membership changed.
    pub fn refresh_membership(&mut self) -> bool {
        let current = self.directory.list_active_plants();
        if current == self.tracked {
            tracing::debug!(plants = current.len(), "Plant membership unchanged");
            return false;
        }

        let added = current.difference(&self.tracked).count();
        let removed = self.tracked.difference(&current).count();

        // Tear down before installing so at most one subscription is live.
        self.subscription = None;
        if !current.is_empty() {
            self.subscription = Some(Subscription::new(&self.bus, current.clone()));
        }
        self.tracked = current;

        tracing::info!(
            plants = self.tracked.len(),
            added,
            removed,
            "Plant membership changed"
        );
        true
    }

    /// True if any tracked plant is currently in PROBLEM state.
    pub fn any_problem(&self) -> bool {
        self.tracked
            .iter()
            .filter_map(|id| self.directory.snapshot(id))
            .any(|snap| snap.has_problem())
    }

    pub fn detail(&self) -> ProblemDetail {
        let mut detail = ProblemDetail {
            total_plants: self.tracked.len(),
            ..Default::default()
        };

        for plant_id in &self.tracked {
            let Some(snapshot) = self.directory.snapshot(plant_id) else {
                continue;
            };
            let problem_count = snapshot.problem_count();
            if problem_count == 0 {
                continue;
            }
            detail.total_problems += problem_count;
            detail.plants_with_problems.push(PlantProblemSummary {
                plant_id: plant_id.clone(),
                friendly_name: self
                    .directory
                    .display_name(plant_id)
                    .unwrap_or_else(|| plant_id.clone()),
                problem_count,
                device_id: self.directory.device_id(plant_id),
            });
        }
        detail
    }

    pub fn status(&self) -> GlobalProblemStatus {
        GlobalProblemStatus {
            any_problem: self.any_problem(),
            detail: self.detail(),
        }
    }

    /// Drain pending change notifications.
    ///
    /// When a covered plant changed, recomputes the signal, publishes
    /// `plant.global_problems_changed` and returns the new status.
    pub fn process_notifications(&mut self) -> Option<GlobalProblemStatus> {
        let changed = self.subscription.as_mut().is_some_and(|s| s.drain());
        if !changed {
            return None;
        }

        let status = self.status();
        if self.last_any_problem != Some(status.any_problem) {
            tracing::info!(
                any_problem = status.any_problem,
                total_problems = status.detail.total_problems,
                "Global problem signal changed"
            );
            self.last_any_problem = Some(status.any_problem);
        }

        match serde_json::to_value(&status) {
            Ok(payload) => self
                .bus
                .publish(PlantEvent::new(EVENT_GLOBAL_PROBLEMS_CHANGED).with_payload(payload)),
            Err(e) => tracing::warn!(error = %e, "Global status payload not serialisable"),
        }
        Some(status)
    }

    pub fn tracked_plants(&self) -> &BTreeSet<PlantId> {
        &self.tracked
    }

    /// Identity of the installed subscription, if any.
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(Subscription::id)
    }

    /// Drop the subscription and forget all tracked plants.
    pub fn shutdown(&mut self) {
        self.subscription = None;
        self.tracked.clear();
        self.last_any_problem = None;
        tracing::info!("Global problem registry shut down");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
