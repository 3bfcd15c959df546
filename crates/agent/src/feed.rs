//! Newline-delimited JSON feed of sensor and membership events.
//!
//! Each line is one object tagged by `type`:
//!
//! ```json
//! {"type": "reading", "plant": "plant.fern", "metric": "moisture", "value": 12.5}
//! {"type": "threshold", "plant": "plant.fern", "metric": "moisture", "bound": "min", "value": "unavailable"}
//! {"type": "trigger", "plant": "plant.fern", "metric": "co2", "enabled": false}
//! {"type": "register", "plant": {"id": "plant.cactus", "name": "Cactus"}}
//! {"type": "unregister", "plant": "plant.cactus"}
//! {"type": "rename", "plant": "plant.fern", "name": "Boston Fern"}
//! ```

use serde::{Deserialize, Serialize};

use plant_monitor_core::{Bound, Metric, PlantDefinition, PlantId, Reading};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedCommand {
    /// New current value for a metric (number or host state string).
    Reading {
        plant: PlantId,
        metric: Metric,
        #[serde(default)]
        value: Reading,
    },
    /// New value for a min/max threshold. `value` is required; `null`
    /// marks the threshold as missing.
    Threshold {
        plant: PlantId,
        metric: Metric,
        bound: Bound,
        value: Reading,
    },
    Trigger {
        plant: PlantId,
        metric: Metric,
        enabled: bool,
    },
    Register {
        plant: PlantDefinition,
    },
    Unregister {
        plant: PlantId,
    },
    /// Set or clear the user-assigned display name.
    Rename {
        plant: PlantId,
        #[serde(default)]
        name: Option<String>,
    },
}

impl FeedCommand {
    /// The plant the command targets.
    pub fn plant_id(&self) -> &PlantId {
        match self {
            Self::Reading { plant, .. }
            | Self::Threshold { plant, .. }
            | Self::Trigger { plant, .. }
            | Self::Unregister { plant }
            | Self::Rename { plant, .. } => plant,
            Self::Register { plant } => &plant.id,
        }
    }
}

/// Parse one feed line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<FeedCommand>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
