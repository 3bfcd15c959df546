//! Canonical metric and status name constants.
//!
//! These are the snake_case names used in plant definition files, the
//! agent feed protocol, and event payloads.

pub const METRIC_MOISTURE: &str = "moisture";
pub const METRIC_TEMPERATURE: &str = "temperature";
pub const METRIC_CONDUCTIVITY: &str = "conductivity";
pub const METRIC_ILLUMINANCE: &str = "illuminance";
pub const METRIC_HUMIDITY: &str = "humidity";
/// Daily light integral (mol/m²/day) over the last completed period.
pub const METRIC_DLI: &str = "dli";
pub const METRIC_CO2: &str = "co2";
pub const METRIC_SOIL_TEMPERATURE: &str = "soil_temperature";

/// All valid metric names, in evaluation order.
pub const VALID_METRIC_NAMES: &[&str] = &[
    METRIC_MOISTURE,
    METRIC_TEMPERATURE,
    METRIC_CONDUCTIVITY,
    METRIC_ILLUMINANCE,
    METRIC_HUMIDITY,
    METRIC_DLI,
    METRIC_CO2,
    METRIC_SOIL_TEMPERATURE,
];

/// Host state strings that mark a reading as missing.
pub const STATE_UNAVAILABLE: &str = "unavailable";
pub const STATE_UNKNOWN: &str = "unknown";

/// Per-metric status strings.
pub const STATUS_OK: &str = "ok";
pub const STATUS_LOW: &str = "low";
pub const STATUS_HIGH: &str = "high";

/// Overall plant state strings.
pub const PLANT_STATE_OK: &str = "ok";
pub const PLANT_STATE_PROBLEM: &str = "problem";
pub const PLANT_STATE_UNKNOWN: &str = "unknown";
