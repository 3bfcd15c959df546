//! Plant definitions as loaded from configuration.
//!
//! A definition names the plant, its owning device, per-metric limits and
//! per-metric trigger flags. Missing limits fall back to the metric's
//! default range and missing trigger flags default to enabled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::metrics::{Bound, Metric};
use crate::types::{DeviceId, PlantId};

/// Configured min/max for one metric. Either side may be omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// A plant as declared in the plant definitions file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlantDefinition {
    #[validate(length(min = 1, max = 128))]
    pub id: PlantId,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    pub device_id: Option<DeviceId>,
    #[serde(default)]
    pub limits: BTreeMap<Metric, Limits>,
    #[serde(default)]
    pub triggers: BTreeMap<Metric, bool>,
}

impl PlantDefinition {
    /// Definition with default limits and all triggers enabled.
    pub fn new(id: impl Into<PlantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_id: None,
            limits: BTreeMap::new(),
            triggers: BTreeMap::new(),
        }
    }

    pub fn with_device(mut self, device_id: impl Into<DeviceId>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_limits(mut self, metric: Metric, min: f64, max: f64) -> Self {
        self.limits.insert(
            metric,
            Limits {
                min: Some(min),
                max: Some(max),
            },
        );
        self
    }

    pub fn with_trigger(mut self, metric: Metric, enabled: bool) -> Self {
        self.triggers.insert(metric, enabled);
        self
    }

    /// Effective limit for a metric, falling back to the metric's default.
    pub fn limit(&self, metric: Metric, bound: Bound) -> f64 {
        let configured = self.limits.get(&metric).and_then(|l| match bound {
            Bound::Min => l.min,
            Bound::Max => l.max,
        });
        configured.unwrap_or_else(|| metric.descriptor().default_limit(bound))
    }

    pub fn trigger_enabled(&self, metric: Metric) -> bool {
        self.triggers.get(&metric).copied().unwrap_or(true)
    }

    /// Validate field lengths.
    ///
    /// Inverted limits are accepted; the evaluator treats them as a
    /// runtime misconfiguration.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        Ok(())
    }
}

/// Parse and validate a JSON array of plant definitions.
///
/// Rejects duplicate ids.
pub fn parse_definitions(json: &str) -> Result<Vec<PlantDefinition>, CoreError> {
    let definitions: Vec<PlantDefinition> = serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("Invalid plant definitions: {e}")))?;

    let mut seen = std::collections::HashSet::new();
    for def in &definitions {
        def.check()?;
        if !seen.insert(def.id.as_str()) {
            return Err(CoreError::Conflict(format!(
                "Plant '{}' is defined more than once",
                def.id
            )));
        }
    }
    Ok(definitions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
