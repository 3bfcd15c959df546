//! Change-notification subscription covering a fixed set of plants.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast::{self, error::TryRecvError};

use plant_monitor_core::PlantId;

use crate::bus::{EventBus, PlantEvent, EVENT_PLANT_STATE_CHANGED};

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Subscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A live listener for `plant.state_changed` events of the covered plants.
///
/// Dropping the subscription detaches its receiver from the bus.
pub struct Subscription {
    id: SubscriptionId,
    plants: BTreeSet<PlantId>,
    receiver: broadcast::Receiver<PlantEvent>,
}

impl Subscription {
    pub fn new(bus: &EventBus, plants: BTreeSet<PlantId>) -> Self {
        let id = SubscriptionId::next();
        tracing::debug!(subscription = %id, plants = plants.len(), "Subscription installed");
        Self {
            id,
            plants,
            receiver: bus.subscribe(),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn plants(&self) -> &BTreeSet<PlantId> {
        &self.plants
    }

    pub fn covers(&self, plant_id: &PlantId) -> bool {
        self.plants.contains(plant_id)
    }

    /// Consume every queued event without blocking.
    ///
    /// Returns `true` if any covered plant changed. A lagged receiver has
    /// lost events and is reported as changed.
    pub fn drain(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if event.event_type == EVENT_PLANT_STATE_CHANGED
                        && event.plant_id.as_ref().is_some_and(|id| self.covers(id))
                    {
                        changed = true;
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(subscription = %self.id, skipped, "Subscription lagged");
                    changed = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    tracing::debug!(subscription = %self.id, "Event bus closed");
                    break;
                }
            }
        }
        changed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        tracing::debug!(subscription = %self.id, "Subscription torn down");
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("plants", &self.plants)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
