//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`PlantEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` between plant aggregators
//! (publishers) and the global problem registry (subscriber).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use plant_monitor_core::{PlantId, PlantSnapshot, SnapshotSink};

/// A plant finished an update cycle with a changed snapshot.
pub const EVENT_PLANT_STATE_CHANGED: &str = "plant.state_changed";

/// The aggregate "any plant has a problem" signal was recomputed.
pub const EVENT_GLOBAL_PROBLEMS_CHANGED: &str = "plant.global_problems_changed";

// ---------------------------------------------------------------------------
// PlantEvent
// ---------------------------------------------------------------------------

/// A change notification.
///
/// Constructed via [`PlantEvent::new`] and enriched with
/// [`for_plant`](PlantEvent::for_plant) and
/// [`with_payload`](PlantEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantEvent {
    /// Dot-separated event name, e.g. `"plant.state_changed"`.
    pub event_type: String,

    /// The plant the event is about, if any.
    pub plant_id: Option<PlantId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlantEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            plant_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the plant the event is about.
    pub fn for_plant(mut self, plant_id: impl Into<PlantId>) -> Self {
        self.plant_id = Some(plant_id.into());
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// `plant.state_changed` event carrying the full snapshot.
    pub fn state_changed(snapshot: &PlantSnapshot) -> Self {
        let payload = serde_json::to_value(snapshot).unwrap_or_else(|e| {
            tracing::warn!(plant_id = %snapshot.plant_id, error = %e, "Snapshot payload not serialisable");
            serde_json::Value::Null
        });
        Self::new(EVENT_PLANT_STATE_CHANGED)
            .for_plant(snapshot.plant_id.clone())
            .with_payload(payload)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PlantEvent`].
///
/// # Usage
///
/// ```rust
/// use plant_monitor_events::bus::{EventBus, PlantEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlantEvent::new("plant.state_changed").for_plant("plant.fern"));
/// assert!(rx.try_recv().is_ok());
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlantEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: PlantEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlantEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SnapshotSink for EventBus {
    fn publish(&self, snapshot: &PlantSnapshot) {
        EventBus::publish(self, PlantEvent::state_changed(snapshot));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use plant_monitor_core::PlantState;

    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = PlantEvent::new("test.created")
            .for_plant("plant.fern")
            .with_payload(serde_json::json!({"key": "value"}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "test.created");
        assert_eq!(received.plant_id.as_deref(), Some("plant.fern"));
        assert_eq!(received.payload["key"], "value");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlantEvent::new("multi.test"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "multi.test");
        assert_eq!(e2.event_type, "multi.test");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(PlantEvent::new("orphan.event"));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = PlantEvent::new("bare.event");
        assert_eq!(event.event_type, "bare.event");
        assert!(event.plant_id.is_none());
        assert!(event.payload.is_object());
    }

    #[test]
    fn snapshot_sink_publishes_state_changed() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let mut snapshot = PlantSnapshot::new("plant.fern");
        snapshot.state = PlantState::Problem;
        SnapshotSink::publish(&bus, &snapshot);

        let event = rx.try_recv().expect("event should be queued");
        assert_eq!(event.event_type, EVENT_PLANT_STATE_CHANGED);
        assert_eq!(event.plant_id.as_deref(), Some("plant.fern"));
        assert_eq!(event.payload["state"], "problem");
    }
}
