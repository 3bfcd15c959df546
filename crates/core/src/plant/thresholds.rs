//! Threshold evaluation engine with hysteresis.
//!
//! Pure logic: the caller supplies the current reading, both bounds and the
//! previous [`HysteresisState`], and receives the next state by value.
//!
//! Entering LOW/HIGH uses the hard boundary. Once a problem is held, the
//! value must travel `band` past the boundary before it clears, where `band`
//! is [`HYSTERESIS_FRACTION`] of the configured range. A fresh state (no
//! previous status) is classified strictly by boundary.

use serde::{Deserialize, Serialize};

use crate::error::EvaluationIssue;
use crate::metrics::{Bound, CheckSides};
use crate::problem::MetricStatus;
use crate::reading::Reading;

/// Width of the hysteresis dead zone as a fraction of `max - min`.
pub const HYSTERESIS_FRACTION: f64 = 0.05;

/// Last known status of one metric of one plant.
///
/// `None` means no usable reading yet, or the inputs went missing and the
/// memory was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HysteresisState {
    status: Option<MetricStatus>,
}

impl HysteresisState {
    pub const UNKNOWN: HysteresisState = HysteresisState { status: None };

    pub fn new(status: MetricStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn status(&self) -> Option<MetricStatus> {
        self.status
    }

    pub fn is_unknown(&self) -> bool {
        self.status.is_none()
    }

    pub fn is_problem(&self) -> bool {
        self.status.is_some_and(|s| s.is_problem())
    }
}

impl From<Option<MetricStatus>> for HysteresisState {
    fn from(status: Option<MetricStatus>) -> Self {
        Self { status }
    }
}

/// Result of [`assess`]: the next state plus any absorbed input issue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub state: HysteresisState,
    pub issue: Option<EvaluationIssue>,
}

/// Evaluate a metric checked on both sides.
pub fn evaluate(
    current: Reading,
    min: Reading,
    max: Reading,
    previous: HysteresisState,
) -> HysteresisState {
    assess(CheckSides::Both, current, min, max, previous).state
}

/// Evaluate a metric and report why the result is unknown or degenerate.
///
/// Never fails: missing inputs yield [`HysteresisState::UNKNOWN`] and a
/// `MissingReading`/`MissingThreshold` issue. Only the sides named by
/// `checks` are compared; an absent bound on one of them counts as missing.
/// An empty or inverted range is evaluated with a zero band and reported as
/// `MisconfiguredRange`.
pub fn assess(
    checks: CheckSides,
    current: Reading,
    min: Reading,
    max: Reading,
    previous: HysteresisState,
) -> Assessment {
    let value = match current {
        Reading::Value(v) => v,
        _ => return unknown(EvaluationIssue::MissingReading),
    };

    let min = match resolve_bound(min, Bound::Min, checks) {
        Ok(b) => b,
        Err(issue) => return unknown(issue),
    };
    let max = match resolve_bound(max, Bound::Max, checks) {
        Ok(b) => b,
        Err(issue) => return unknown(issue),
    };

    let low_limit = min.filter(|_| checks.checks_low());
    let high_limit = max.filter(|_| checks.checks_high());

    let mut issue = None;
    let band = match (min, max) {
        (Some(lo), Some(hi)) => {
            if lo >= hi {
                issue = Some(EvaluationIssue::MisconfiguredRange { min: lo, max: hi });
            }
            band_width(lo, hi)
        }
        (Some(bound), None) | (None, Some(bound)) => bound.abs() * HYSTERESIS_FRACTION,
        (None, None) => 0.0,
    };

    let status = classify(value, low_limit, high_limit, band, previous.status());
    Assessment {
        state: HysteresisState::new(status),
        issue,
    }
}

/// Dead-zone width for a range; zero when the range is empty or inverted.
pub fn band_width(min: f64, max: f64) -> f64 {
    if max > min {
        (max - min) * HYSTERESIS_FRACTION
    } else {
        0.0
    }
}

fn classify(
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
    band: f64,
    previous: Option<MetricStatus>,
) -> MetricStatus {
    if let Some(lo) = min {
        if value < lo {
            return MetricStatus::Low;
        }
    }
    if let Some(hi) = max {
        if value > hi {
            return MetricStatus::High;
        }
    }

    match (previous, min, max) {
        (Some(MetricStatus::Low), Some(lo), _) if value < lo + band => MetricStatus::Low,
        (Some(MetricStatus::High), _, Some(hi)) if value > hi - band => MetricStatus::High,
        _ => MetricStatus::Ok,
    }
}

/// Resolve one threshold.
///
/// A bound on a checked side must hold a value. On an unchecked side an
/// absent bound is allowed and only drops out of the band computation.
fn resolve_bound(
    bound: Reading,
    which: Bound,
    checks: CheckSides,
) -> Result<Option<f64>, EvaluationIssue> {
    match bound {
        Reading::Value(v) => Ok(Some(v)),
        Reading::Absent if !checks.checks(which) => Ok(None),
        Reading::Absent | Reading::Unavailable | Reading::Unknown => {
            Err(EvaluationIssue::MissingThreshold { bound: which })
        }
    }
}

fn unknown(issue: EvaluationIssue) -> Assessment {
    Assessment {
        state: HysteresisState::UNKNOWN,
        issue: Some(issue),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const FRESH: HysteresisState = HysteresisState::UNKNOWN;

    fn low() -> HysteresisState {
        HysteresisState::new(MetricStatus::Low)
    }

    fn high() -> HysteresisState {
        HysteresisState::new(MetricStatus::High)
    }

    fn status(current: f64, min: f64, max: f64, previous: HysteresisState) -> Option<MetricStatus> {
        evaluate(current.into(), min.into(), max.into(), previous).status()
    }

    #[test]
    fn below_min_is_low_on_first_reading() {
        for current in [-5.0, 0.0, 10.0, 19.99] {
            assert_eq!(status(current, 20.0, 60.0, FRESH), Some(MetricStatus::Low));
        }
    }

    #[test]
    fn above_max_is_high_on_first_reading() {
        assert_eq!(status(60.01, 20.0, 60.0, FRESH), Some(MetricStatus::High));
        assert_eq!(status(500.0, 20.0, 60.0, FRESH), Some(MetricStatus::High));
    }

    #[test]
    fn low_holds_inside_band_and_clears_at_band_edge() {
        // band = (60 - 20) * 0.05 = 2.0
        assert_eq!(status(20.0, 20.0, 60.0, low()), Some(MetricStatus::Low));
        assert_eq!(status(21.99, 20.0, 60.0, low()), Some(MetricStatus::Low));
        assert_eq!(status(22.0, 20.0, 60.0, low()), Some(MetricStatus::Ok));
        assert_eq!(status(40.0, 20.0, 60.0, low()), Some(MetricStatus::Ok));
    }

    #[test]
    fn high_holds_inside_band_and_clears_at_band_edge() {
        assert_eq!(status(60.0, 20.0, 60.0, high()), Some(MetricStatus::High));
        assert_eq!(status(59.0, 20.0, 60.0, high()), Some(MetricStatus::High));
        assert_eq!(status(58.0, 20.0, 60.0, high()), Some(MetricStatus::Ok));
        assert_eq!(status(57.0, 20.0, 60.0, high()), Some(MetricStatus::Ok));
    }

    #[test]
    fn fresh_state_inside_band_is_ok() {
        assert_eq!(status(21.0, 20.0, 60.0, FRESH), Some(MetricStatus::Ok));
        assert_eq!(status(59.0, 20.0, 60.0, FRESH), Some(MetricStatus::Ok));
    }

    #[test]
    fn ok_state_inside_band_stays_ok() {
        let ok = HysteresisState::new(MetricStatus::Ok);
        assert_eq!(status(20.5, 20.0, 60.0, ok), Some(MetricStatus::Ok));
    }

    #[test]
    fn low_can_jump_straight_to_high() {
        assert_eq!(status(70.0, 20.0, 60.0, low()), Some(MetricStatus::High));
    }

    #[test]
    fn scenario_a_moisture() {
        let s1 = evaluate(15.0.into(), 20.0.into(), 60.0.into(), FRESH);
        assert_eq!(s1.status(), Some(MetricStatus::Low));
        let s2 = evaluate(20.5.into(), 20.0.into(), 60.0.into(), s1);
        assert_eq!(s2.status(), Some(MetricStatus::Low));
        let s3 = evaluate(23.0.into(), 20.0.into(), 60.0.into(), s2);
        assert_eq!(s3.status(), Some(MetricStatus::Ok));
    }

    #[test]
    fn scenario_b_temperature() {
        // band = (40 - 10) * 0.05 = 1.5
        let s1 = evaluate(8.0.into(), 10.0.into(), 40.0.into(), FRESH);
        assert_eq!(s1.status(), Some(MetricStatus::Low));
        let s2 = evaluate(11.0.into(), 10.0.into(), 40.0.into(), s1);
        assert_eq!(s2.status(), Some(MetricStatus::Low));
        let s3 = evaluate(12.0.into(), 10.0.into(), 40.0.into(), s2);
        assert_eq!(s3.status(), Some(MetricStatus::Ok));
    }

    #[test]
    fn scenario_e_unavailable_resets_memory() {
        let s1 = evaluate(15.0.into(), 20.0.into(), 60.0.into(), FRESH);
        assert_eq!(s1.status(), Some(MetricStatus::Low));
        let s2 = evaluate(Reading::Unavailable, 20.0.into(), 60.0.into(), s1);
        assert!(s2.is_unknown());
        let s3 = evaluate(21.0.into(), 20.0.into(), 60.0.into(), s2);
        assert_eq!(s3.status(), Some(MetricStatus::Ok));
    }

    #[test]
    fn missing_inputs_are_unknown_regardless_of_previous() {
        for previous in [FRESH, low(), high(), HysteresisState::new(MetricStatus::Ok)] {
            for (current, min, max) in [
                (Reading::Unavailable, Reading::Value(20.0), Reading::Value(60.0)),
                (Reading::Unknown, Reading::Value(20.0), Reading::Value(60.0)),
                (Reading::Absent, Reading::Value(20.0), Reading::Value(60.0)),
                (Reading::Value(5.0), Reading::Unavailable, Reading::Value(60.0)),
                (Reading::Value(5.0), Reading::Value(20.0), Reading::Unknown),
            ] {
                assert!(evaluate(current, min, max, previous).is_unknown());
            }
        }
    }

    #[test]
    fn assess_reports_missing_reading_and_threshold() {
        let a = assess(CheckSides::Both, Reading::Unknown, 1.0.into(), 2.0.into(), FRESH);
        assert_matches!(a.issue, Some(EvaluationIssue::MissingReading));

        let a = assess(CheckSides::Both, 1.5.into(), Reading::Unavailable, 2.0.into(), low());
        assert_matches!(
            a.issue,
            Some(EvaluationIssue::MissingThreshold { bound: Bound::Min })
        );
        assert!(a.state.is_unknown());
    }

    #[test]
    fn both_bounds_absent_is_unknown() {
        let a = assess(CheckSides::Both, 1.0.into(), Reading::Absent, Reading::Absent, FRESH);
        assert!(a.state.is_unknown());
        assert_matches!(a.issue, Some(EvaluationIssue::MissingThreshold { .. }));
    }

    #[test]
    fn absent_bound_on_checked_side_is_unknown() {
        // A dropped min must not turn a two-sided check into a max-only one.
        let a = assess(CheckSides::Both, 1.0.into(), Reading::Absent, 60.0.into(), low());
        assert!(a.state.is_unknown());
        assert_matches!(
            a.issue,
            Some(EvaluationIssue::MissingThreshold { bound: Bound::Min })
        );

        let s = evaluate(99.0.into(), 20.0.into(), Reading::Absent, FRESH);
        assert!(s.is_unknown());

        let a = assess(CheckSides::HighOnly, 5.0.into(), 0.0.into(), Reading::Absent, FRESH);
        assert_matches!(
            a.issue,
            Some(EvaluationIssue::MissingThreshold { bound: Bound::Max })
        );
    }

    #[test]
    fn high_only_with_absent_min_uses_max_for_band() {
        // band = |100| * 0.05 = 5
        let sides = CheckSides::HighOnly;
        let s1 = assess(sides, 120.0.into(), Reading::Absent, 100.0.into(), FRESH).state;
        assert_eq!(s1.status(), Some(MetricStatus::High));
        let s2 = assess(sides, 97.0.into(), Reading::Absent, 100.0.into(), s1).state;
        assert_eq!(s2.status(), Some(MetricStatus::High));
        let s3 = assess(sides, 94.0.into(), Reading::Absent, 100.0.into(), s2).state;
        assert_eq!(s3.status(), Some(MetricStatus::Ok));
        assert_eq!(
            assess(sides, (-50.0).into(), Reading::Absent, 100.0.into(), FRESH)
                .state
                .status(),
            Some(MetricStatus::Ok)
        );
    }

    #[test]
    fn low_only_with_absent_max_checks_low_side() {
        let sides = CheckSides::LowOnly;
        let s1 = assess(sides, 5.0.into(), 10.0.into(), Reading::Absent, FRESH).state;
        assert_eq!(s1.status(), Some(MetricStatus::Low));
        assert_eq!(
            assess(sides, 1e9.into(), 10.0.into(), Reading::Absent, FRESH)
                .state
                .status(),
            Some(MetricStatus::Ok)
        );
        // Unavailable is never accepted, even on the unchecked side.
        let a = assess(sides, 5.0.into(), 10.0.into(), Reading::Unavailable, FRESH);
        assert!(a.state.is_unknown());
    }

    #[test]
    fn high_only_sides_ignore_low_values_but_use_full_range_for_band() {
        // illuminance: min=0, max=100000 -> band 5000
        let sides = CheckSides::HighOnly;
        let a = assess(sides, 0.0.into(), 1000.0.into(), 100_000.0.into(), FRESH);
        assert_eq!(a.state.status(), Some(MetricStatus::Ok));

        let s1 = assess(sides, 110_000.0.into(), 0.0.into(), 100_000.0.into(), FRESH).state;
        assert_eq!(s1.status(), Some(MetricStatus::High));
        let s2 = assess(sides, 96_000.0.into(), 0.0.into(), 100_000.0.into(), s1).state;
        assert_eq!(s2.status(), Some(MetricStatus::High));
        let s3 = assess(sides, 94_000.0.into(), 0.0.into(), 100_000.0.into(), s2).state;
        assert_eq!(s3.status(), Some(MetricStatus::Ok));
    }

    #[test]
    fn degenerate_range_has_zero_band() {
        assert_eq!(band_width(30.0, 30.0), 0.0);
        assert_eq!(band_width(50.0, 10.0), 0.0);

        assert_eq!(status(30.0, 30.0, 30.0, FRESH), Some(MetricStatus::Ok));
        assert_eq!(status(30.0, 30.0, 30.0, low()), Some(MetricStatus::Ok));
        assert_eq!(status(29.0, 30.0, 30.0, FRESH), Some(MetricStatus::Low));
        assert_eq!(status(31.0, 30.0, 30.0, FRESH), Some(MetricStatus::High));
    }

    #[test]
    fn inverted_range_is_reported_but_still_evaluated() {
        let a = assess(CheckSides::Both, 30.0.into(), 50.0.into(), 10.0.into(), FRESH);
        assert_matches!(
            a.issue,
            Some(EvaluationIssue::MisconfiguredRange { min, max }) if min == 50.0 && max == 10.0
        );
        assert_eq!(a.state.status(), Some(MetricStatus::Low));
    }

    #[test]
    fn evaluation_is_a_fixpoint_for_unchanged_inputs() {
        let mut state = FRESH;
        for current in [15.0, 20.5, 20.5, 23.0, 23.0, 59.0, 61.0, 59.0, 59.0] {
            let next = evaluate(current.into(), 20.0.into(), 60.0.into(), state);
            let again = evaluate(current.into(), 20.0.into(), 60.0.into(), next);
            assert_eq!(next, again);
            state = next;
        }
    }
}
