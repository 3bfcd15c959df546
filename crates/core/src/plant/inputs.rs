//! In-memory sensor inputs for one plant.
//!
//! [`SensorInputs`] implements [`PlantSensors`] over plain maps. Hosts
//! that hold readings elsewhere implement the trait directly instead.

use std::collections::HashMap;

use crate::definition::PlantDefinition;
use crate::metrics::{Bound, Metric};
use crate::plant::aggregator::PlantSensors;
use crate::reading::Reading;

/// Latest readings, thresholds and trigger flags for a plant.
///
/// Readings start `Absent`; thresholds and triggers are seeded from a
/// [`PlantDefinition`].
#[derive(Debug, Clone, Default)]
pub struct SensorInputs {
    readings: HashMap<Metric, Reading>,
    thresholds: HashMap<(Metric, Bound), Reading>,
    triggers: HashMap<Metric, bool>,
}

impl SensorInputs {
    /// Seed thresholds and trigger flags from a definition.
    pub fn from_definition(definition: &PlantDefinition) -> Self {
        let mut inputs = Self::default();
        for metric in Metric::ALL {
            for bound in [Bound::Min, Bound::Max] {
                inputs.thresholds.insert(
                    (metric, bound),
                    Reading::from_f64(definition.limit(metric, bound)),
                );
            }
            inputs
                .triggers
                .insert(metric, definition.trigger_enabled(metric));
        }
        inputs
    }

    pub fn set_reading(&mut self, metric: Metric, reading: impl Into<Reading>) {
        self.readings.insert(metric, reading.into());
    }

    pub fn set_threshold(&mut self, metric: Metric, bound: Bound, value: impl Into<Reading>) {
        self.thresholds.insert((metric, bound), value.into());
    }

    pub fn set_trigger(&mut self, metric: Metric, enabled: bool) {
        self.triggers.insert(metric, enabled);
    }

    /// Drop the reading source for a metric (the external sensor was removed).
    pub fn clear_reading(&mut self, metric: Metric) {
        self.readings.remove(&metric);
    }
}

impl PlantSensors for SensorInputs {
    fn current_value(&self, metric: Metric) -> Reading {
        self.readings.get(&metric).copied().unwrap_or_default()
    }

    fn threshold(&self, metric: Metric, bound: Bound) -> Reading {
        self.thresholds
            .get(&(metric, bound))
            .copied()
            .unwrap_or_default()
    }

    fn is_trigger_enabled(&self, metric: Metric) -> bool {
        self.triggers.get(&metric).copied().unwrap_or(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
