//! Change notifications and the global problem registry.
//!
//! Plant aggregators publish `plant.state_changed` events on an
//! [`EventBus`]; the [`GlobalProblemRegistry`] subscribes for the plants it
//! tracks and publishes `plant.global_problems_changed` in turn.

pub mod bus;
pub mod registry;
pub mod subscription;

pub use bus::{
    EventBus, PlantEvent, DEFAULT_CAPACITY, EVENT_GLOBAL_PROBLEMS_CHANGED,
    EVENT_PLANT_STATE_CHANGED,
};
pub use registry::{GlobalProblemRegistry, GlobalProblemStatus, PlantProblemSummary, ProblemDetail};
pub use subscription::{Subscription, SubscriptionId};
