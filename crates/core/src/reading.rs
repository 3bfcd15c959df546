//! Sensor readings and threshold values as supplied by the host.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::metric_names::{STATE_UNAVAILABLE, STATE_UNKNOWN};

/// A current sensor value or threshold as seen by the core.
///
/// `Unavailable` and `Unknown` mirror the host's sentinel states; `Absent`
/// means no source is configured at all.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Reading {
    Value(f64),
    Unavailable,
    Unknown,
    #[default]
    Absent,
}

impl Reading {
    /// Parse a host state string.
    ///
    /// Non-numeric and non-finite strings are treated as `Unknown` rather
    /// than rejected.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "" => Self::Absent,
            STATE_UNAVAILABLE => Self::Unavailable,
            STATE_UNKNOWN => Self::Unknown,
            _ => match raw.parse::<f64>() {
                Ok(v) => Self::from_f64(v),
                Err(_) => Self::Unknown,
            },
        }
    }

    /// Wrap a number, mapping NaN and infinities to `Unknown`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Unknown
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Absent, Self::from_f64)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.write_str(&format_value(*v)),
            Self::Unavailable => f.write_str(STATE_UNAVAILABLE),
            Self::Unknown => f.write_str(STATE_UNKNOWN),
            Self::Absent => f.write_str("absent"),
        }
    }
}

/// Render a value for display: integral values keep one decimal (`5.0`),
/// everything else uses the shortest round-tripping form (`20.5`).
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

/// Wire form: a number, a host state string, or `null` for `Absent`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawReading {
    Number(f64),
    Text(String),
    Null(Option<()>),
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match self {
            Self::Value(v) => RawReading::Number(*v),
            Self::Unavailable => RawReading::Text(STATE_UNAVAILABLE.to_string()),
            Self::Unknown => RawReading::Text(STATE_UNKNOWN.to_string()),
            Self::Absent => RawReading::Null(None),
        };
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawReading::deserialize(deserializer)? {
            RawReading::Number(v) => Self::from_f64(v),
            RawReading::Text(s) => Self::parse(&s),
            RawReading::Null(_) => Self::Absent,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_sentinels() {
        assert_eq!(Reading::parse("unavailable"), Reading::Unavailable);
        assert_eq!(Reading::parse("unknown"), Reading::Unknown);
        assert_eq!(Reading::parse(""), Reading::Absent);
    }

    #[test]
    fn parses_numbers() {
        assert_eq!(Reading::parse("21.5"), Reading::Value(21.5));
        assert_eq!(Reading::parse(" 40 "), Reading::Value(40.0));
    }

    #[test]
    fn garbage_and_non_finite_become_unknown() {
        assert_eq!(Reading::parse("wet"), Reading::Unknown);
        assert_eq!(Reading::parse("NaN"), Reading::Unknown);
        assert_eq!(Reading::parse("inf"), Reading::Unknown);
    }

    #[test]
    fn display_keeps_one_decimal_for_integers() {
        assert_eq!(format_value(5.0), "5.0");
        assert_eq!(format_value(20.5), "20.5");
        assert_eq!(format_value(100000.0), "100000.0");
    }

    #[test]
    fn deserializes_numbers_strings_and_null() {
        let parsed: Vec<Reading> =
            serde_json::from_str(r#"[12.5, "7", "unavailable", "unknown", null]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Reading::Value(12.5),
                Reading::Value(7.0),
                Reading::Unavailable,
                Reading::Unknown,
                Reading::Absent,
            ]
        );
    }

    #[test]
    fn serializes_absent_as_null() {
        let json = serde_json::to_value([Reading::Value(3.0), Reading::Absent]).unwrap();
        assert_eq!(json, serde_json::json!([3.0, null]));
    }
}
