use crate::metrics::Bound;
use crate::types::PlantId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Plant not found: {0}")]
    NotFound(PlantId),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}

/// A condition the evaluator absorbs instead of failing.
///
/// Returned alongside the computed state so callers can log it; it never
/// aborts an aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EvaluationIssue {
    #[error("current reading is missing, unavailable or unknown")]
    MissingReading,

    #[error("{bound:?} threshold is missing, unavailable or unknown")]
    MissingThreshold { bound: Bound },

    #[error("threshold range is empty or inverted (min {min} >= max {max})")]
    MisconfiguredRange { min: f64, max: f64 },
}
