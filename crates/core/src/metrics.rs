//! Monitored plant metrics and their static descriptor table.
//!
//! Every metric is evaluated the same way; the only per-metric data is
//! held in [`MetricDescriptor`] so the aggregator can iterate
//! [`Metric::ALL`] generically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metric_names::*;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// A semantic metric monitored for every plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Moisture,
    Temperature,
    Conductivity,
    Illuminance,
    Humidity,
    Dli,
    Co2,
    SoilTemperature,
}

impl Metric {
    /// All metrics, in evaluation order.
    pub const ALL: [Metric; 8] = [
        Metric::Moisture,
        Metric::Temperature,
        Metric::Conductivity,
        Metric::Illuminance,
        Metric::Humidity,
        Metric::Dli,
        Metric::Co2,
        Metric::SoilTemperature,
    ];

    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        self.descriptor().name
    }

    /// Static descriptor for this metric.
    pub fn descriptor(&self) -> &'static MetricDescriptor {
        match self {
            Self::Moisture => &DESCRIPTORS[0],
            Self::Temperature => &DESCRIPTORS[1],
            Self::Conductivity => &DESCRIPTORS[2],
            Self::Illuminance => &DESCRIPTORS[3],
            Self::Humidity => &DESCRIPTORS[4],
            Self::Dli => &DESCRIPTORS[5],
            Self::Co2 => &DESCRIPTORS[6],
            Self::SoilTemperature => &DESCRIPTORS[7],
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                CoreError::UnknownMetric(format!(
                    "'{s}'. Must be one of: {}",
                    VALID_METRIC_NAMES.join(", ")
                ))
            })
    }
}

/// Which end of a metric's range a threshold refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Min,
    Max,
}

/// Which boundary crossings a metric reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSides {
    Both,
    /// Only values below `min`; `max` may be absent.
    LowOnly,
    /// Only values above `max` are a problem; `min` still feeds the band width.
    HighOnly,
}

impl CheckSides {
    pub fn checks_low(self) -> bool {
        !matches!(self, Self::HighOnly)
    }

    pub fn checks_high(self) -> bool {
        !matches!(self, Self::LowOnly)
    }

    /// Whether a threshold on `bound` must hold a value.
    pub fn checks(self, bound: Bound) -> bool {
        match bound {
            Bound::Min => self.checks_low(),
            Bound::Max => self.checks_high(),
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor table
// ---------------------------------------------------------------------------

/// Static per-metric data: name, unit, checked sides and default limits.
#[derive(Debug, Clone, Copy)]
pub struct MetricDescriptor {
    pub metric: Metric,
    pub name: &'static str,
    pub unit: &'static str,
    pub checks: CheckSides,
    pub default_min: f64,
    pub default_max: f64,
}

impl MetricDescriptor {
    /// Default limit for the given bound.
    pub fn default_limit(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Min => self.default_min,
            Bound::Max => self.default_max,
        }
    }
}

/// Descriptor table, indexed in [`Metric::ALL`] order.
pub static DESCRIPTORS: [MetricDescriptor; 8] = [
    MetricDescriptor {
        metric: Metric::Moisture,
        name: METRIC_MOISTURE,
        unit: "%",
        checks: CheckSides::Both,
        default_min: 20.0,
        default_max: 60.0,
    },
    MetricDescriptor {
        metric: Metric::Temperature,
        name: METRIC_TEMPERATURE,
        unit: "°C",
        checks: CheckSides::Both,
        default_min: 10.0,
        default_max: 40.0,
    },
    MetricDescriptor {
        metric: Metric::Conductivity,
        name: METRIC_CONDUCTIVITY,
        unit: "µS/cm",
        checks: CheckSides::Both,
        default_min: 500.0,
        default_max: 3000.0,
    },
    MetricDescriptor {
        metric: Metric::Illuminance,
        name: METRIC_ILLUMINANCE,
        unit: "lx",
        checks: CheckSides::HighOnly,
        default_min: 0.0,
        default_max: 100_000.0,
    },
    MetricDescriptor {
        metric: Metric::Humidity,
        name: METRIC_HUMIDITY,
        unit: "%",
        checks: CheckSides::Both,
        default_min: 20.0,
        default_max: 60.0,
    },
    MetricDescriptor {
        metric: Metric::Dli,
        name: METRIC_DLI,
        unit: "mol/d⋅m²",
        checks: CheckSides::Both,
        default_min: 2.0,
        default_max: 30.0,
    },
    MetricDescriptor {
        metric: Metric::Co2,
        name: METRIC_CO2,
        unit: "ppm",
        checks: CheckSides::Both,
        default_min: 400.0,
        default_max: 2000.0,
    },
    MetricDescriptor {
        metric: Metric::SoilTemperature,
        name: METRIC_SOIL_TEMPERATURE,
        unit: "°C",
        checks: CheckSides::Both,
        default_min: 10.0,
        default_max: 40.0,
    },
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
