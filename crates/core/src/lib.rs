//! Plant health evaluation core.
//!
//! Turns sensor readings and configured limits into per-metric statuses
//! with hysteresis, rolls them into a per-plant state and problem list,
//! and keeps the directory of active plants that the global problem
//! registry observes.

pub mod definition;
pub mod error;
pub mod metric_names;
pub mod metrics;
pub mod plant;
pub mod problem;
pub mod reading;
pub mod types;

pub use definition::{parse_definitions, Limits, PlantDefinition};
pub use error::{CoreError, EvaluationIssue};
pub use metrics::{Bound, CheckSides, Metric, MetricDescriptor};
pub use plant::aggregator::{PlantAggregator, PlantSensors, SharedSnapshot, SnapshotSink};
pub use plant::catalog::{PlantCatalog, PlantDirectory};
pub use plant::inputs::SensorInputs;
pub use plant::thresholds::{assess, evaluate, Assessment, HysteresisState};
pub use problem::{MetricStatus, PlantProblem, PlantSnapshot, PlantState};
pub use reading::Reading;
pub use types::{DeviceId, PlantId};
