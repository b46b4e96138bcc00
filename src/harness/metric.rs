//! Error metrics and tolerance classification.

use crate::config::Tolerances;
use crate::geometry::{PredicateResult, Status, status_of};
use crate::recorder::TestKind;
use crate::transform::wrap_longitude;

/// Metres per degree of latitude used to put angular deltas in metres.
pub const METERS_PER_DEGREE_LAT: f64 = 111_132.0;

/// Error assigned to a predicate trial whose verdict or status disagrees.
pub const MISMATCH_PENALTY: f64 = 1.0;

/// Why a trial failed. Data, not control flow: the harness records it and
/// moves on to the next trial.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrialFailure {
    #[error("{quantity} deviation {value:e} exceeds tolerance {tolerance:e}")]
    ToleranceExceeded {
        quantity: &'static str,
        value: f64,
        tolerance: f64,
    },
    #[error("status {actual:?} differs from reference status {expected:?}")]
    StatusMismatch { expected: Status, actual: Status },
    #[error("verdict {actual} differs from reference verdict {expected}")]
    VerdictMismatch { expected: bool, actual: bool },
    #[error("{0}")]
    EngineFailed(String),
}

/// Error metric of one trial plus the failure it implies, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub error: f64,
    pub failure: Option<TrialFailure>,
}

impl Comparison {
    pub fn pass(error: f64) -> Self {
        Self {
            error,
            failure: None,
        }
    }

    pub fn fail(error: f64, failure: TrialFailure) -> Self {
        Self {
            error,
            failure: Some(failure),
        }
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

fn finite_or_inf(value: f64) -> f64 {
    if value.is_finite() { value } else { f64::INFINITY }
}

/// Euclidean norm of the component differences, metres.
pub fn cartesian_error(expected: [f64; 3], actual: [f64; 3]) -> f64 {
    let sum: f64 = expected
        .iter()
        .zip(actual)
        .map(|(e, a)| (e - a) * (e - a))
        .sum();
    finite_or_inf(sum.sqrt())
}

/// Signed per-component deltas `[lat°, lon°, alt m]`, longitude wrapped.
fn geodetic_deltas(expected: [f64; 3], actual: [f64; 3]) -> [f64; 3] {
    [
        actual[0] - expected[0],
        wrap_longitude(actual[1] - expected[1]),
        actual[2] - expected[2],
    ]
}

/// Geodetic difference in metres.
///
/// Longitude is scaled by the cosine of the mean latitude so the metric is
/// symmetric in its arguments.
pub fn geodetic_error(expected: [f64; 3], actual: [f64; 3]) -> f64 {
    let [dlat, dlon, dalt] = geodetic_deltas(expected, actual);
    let mean_lat = 0.5 * (expected[0] + actual[0]);
    let north = dlat * METERS_PER_DEGREE_LAT;
    let east = dlon * METERS_PER_DEGREE_LAT * mean_lat.to_radians().cos();
    finite_or_inf((north * north + east * east + dalt * dalt).sqrt())
}

/// Compare two cartesian outputs (NED or ECEF).
pub fn compare_cartesian(expected: [f64; 3], actual: [f64; 3], tol: &Tolerances) -> Comparison {
    let error = cartesian_error(expected, actual);
    if error <= tol.position_m {
        Comparison::pass(error)
    } else {
        Comparison::fail(
            error,
            TrialFailure::ToleranceExceeded {
                quantity: "position (m)",
                value: error,
                tolerance: tol.position_m,
            },
        )
    }
}

/// Compare two geodetic outputs. Passes only when latitude and longitude
/// are each within the angular tolerance and altitude within its own.
///
/// The longitude delta is scaled by the cosine of the mean latitude, i.e.
/// measured in degrees of arc along the parallel. At the poles longitude is
/// undefined and the check always passes.
pub fn compare_geodetic(expected: [f64; 3], actual: [f64; 3], tol: &Tolerances) -> Comparison {
    let error = geodetic_error(expected, actual);
    let [dlat, dlon, dalt] = geodetic_deltas(expected, actual);
    let parallel = (0.5 * (expected[0] + actual[0])).to_radians().cos().abs();

    let checks = [
        ("latitude (deg)", dlat.abs(), tol.angle_deg),
        ("longitude (deg)", dlon.abs() * parallel, tol.angle_deg),
        ("altitude (m)", dalt.abs(), tol.altitude_m),
    ];
    // `!(<=)` so NaN deltas fail
    match checks.into_iter().find(|&(_, value, limit)| !(value <= limit)) {
        None => Comparison::pass(error),
        Some((quantity, value, tolerance)) => Comparison::fail(
            error,
            TrialFailure::ToleranceExceeded {
                quantity,
                value,
                tolerance,
            },
        ),
    }
}

/// Compare two predicate results. Statuses must match; verdicts are only
/// compared when both are `Ok`.
pub fn compare_predicates(expected: &PredicateResult, actual: &PredicateResult) -> Comparison {
    match (expected, actual) {
        (Ok(e), Ok(a)) if e == a => Comparison::pass(0.0),
        (Ok(e), Ok(a)) => Comparison::fail(
            MISMATCH_PENALTY,
            TrialFailure::VerdictMismatch {
                expected: *e,
                actual: *a,
            },
        ),
        _ => {
            let (es, as_) = (status_of(expected), status_of(actual));
            if es == as_ {
                Comparison::pass(0.0)
            } else {
                Comparison::fail(
                    MISMATCH_PENALTY,
                    TrialFailure::StatusMismatch {
                        expected: es,
                        actual: as_,
                    },
                )
            }
        }
    }
}

/// Record encoding of a predicate result: `[verdict, status code]`.
///
/// The verdict follows the ABI convention of `1` on any non-`Ok` status.
pub fn predicate_vector(result: &PredicateResult) -> Vec<f64> {
    let verdict = match result {
        Ok(hit) => *hit,
        Err(_) => true,
    };
    vec![
        if verdict { 1.0 } else { 0.0 },
        status_of(result).code() as f64,
    ]
}

/// Recompute the error metric of a recorded trial.
///
/// Used when summarizing a record file. Missing vectors give 0 for a passed
/// trial and infinity for a failed one.
pub fn record_error(
    kind: TestKind,
    expected: Option<&[f64]>,
    actual: Option<&[f64]>,
    passed: bool,
) -> f64 {
    let fallback = if passed { 0.0 } else { f64::INFINITY };
    let (Some(e), Some(a)) = (expected, actual) else {
        return fallback;
    };

    if kind.is_predicate() {
        return if e == a { 0.0 } else { MISMATCH_PENALTY };
    }
    match (<[f64; 3]>::try_from(e), <[f64; 3]>::try_from(a)) {
        (Ok(e), Ok(a)) if kind.has_geodetic_output() => geodetic_error(e, a),
        (Ok(e), Ok(a)) => cartesian_error(e, a),
        _ => fallback,
    }
}
