//! Differential validation harness.
//!
//! Each trial draws an input, runs it through the system under test and the
//! reference oracle, scores the difference and emits a [`TrialRecord`].
//! Trials are independent; a failing trial is recorded and counted, never
//! retried, and never stops the run.

pub mod engine;
pub mod generator;
pub mod metric;
pub mod oracle;
pub mod summary;

use std::io::Write;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::error::{NedkitError, Result};
use crate::geometry::PredicateResult;
use crate::recorder::{ResultRecorder, TestKind, TrialRecord};

use engine::GeoEngine;
use generator::{TrialInput, draw, trial_rng};
use metric::{Comparison, TrialFailure, compare_cartesian, compare_geodetic, compare_predicates};
use summary::HarnessSummary;

/// Result of a single trial.
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub record: TrialRecord,
    pub error: f64,
    pub failure: Option<TrialFailure>,
}

/// Drives trials of every configured kind through two [`GeoEngine`]s.
pub struct DifferentialHarness<'a> {
    config: HarnessConfig,
    sut: &'a dyn GeoEngine,
    oracle: &'a dyn GeoEngine,
}

impl<'a> DifferentialHarness<'a> {
    pub fn new(config: HarnessConfig, sut: &'a dyn GeoEngine, oracle: &'a dyn GeoEngine) -> Self {
        Self {
            config,
            sut,
            oracle,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every configured kind and append the records to `recorder`.
    ///
    /// Fails before any trial runs if the configuration is invalid or either
    /// engine cannot be probed. After that only I/O errors abort the run.
    pub fn run<W: Write>(&self, recorder: &mut ResultRecorder<W>) -> Result<HarnessSummary> {
        self.config.validate()?;
        self.oracle.probe().map_err(|e| match e {
            e @ NedkitError::OracleUnavailable(_) => e,
            other => NedkitError::OracleUnavailable(format!("{}: {other}", self.oracle.name())),
        })?;
        self.sut.probe()?;

        let start = Instant::now();
        info!(
            sut = self.sut.name(),
            oracle = self.oracle.name(),
            seed = self.config.seed,
            trials = self.config.trials,
            kinds = self.config.kinds.len(),
            parallel = self.config.parallel,
            "Starting differential run"
        );

        let mut summary =
            HarnessSummary::new(Some(self.config.seed), self.sut.name(), self.oracle.name());

        for &kind in &self.config.kinds {
            let n = self.config.trials;
            if self.config.parallel {
                // Collected in index order, so records come out as in a sequential run
                let outcomes: Vec<TrialOutcome> = (0..n)
                    .into_par_iter()
                    .map(|index| self.run_trial(kind, index as u64))
                    .collect();
                for outcome in &outcomes {
                    Self::emit(recorder, &mut summary, outcome)?;
                }
            } else {
                for index in 0..n as u64 {
                    let outcome = self.run_trial(kind, index);
                    Self::emit(recorder, &mut summary, &outcome)?;
                }
            }

            if let Some(stats) = summary.stats(kind) {
                info!(
                    kind = %kind,
                    trials = stats.trials,
                    failures = stats.failures,
                    max_error = stats.max_error,
                    "Kind complete"
                );
            }
        }

        recorder.flush()?;
        info!(
            trials = summary.total_trials(),
            failures = summary.total_failures(),
            elapsed = ?start.elapsed(),
            "Differential run complete"
        );
        Ok(summary)
    }

    fn emit<W: Write>(
        recorder: &mut ResultRecorder<W>,
        summary: &mut HarnessSummary,
        outcome: &TrialOutcome,
    ) -> Result<()> {
        recorder.record(&outcome.record)?;
        summary.observe(outcome.record.kind(), outcome.error, outcome.failure.is_none());
        Ok(())
    }

    /// Run trial `index` of `kind`. Deterministic in `(seed, kind, index)`.
    pub fn run_trial(&self, kind: TestKind, index: u64) -> TrialOutcome {
        let mut rng = trial_rng(self.config.seed, kind, index);
        let input = draw(kind, &self.config, &mut rng);
        let (expected, actual, comparison) = self.evaluate(&input);

        let name = format!("{kind}#{index:06}");
        match &comparison.failure {
            Some(failure) => warn!(trial = %name, error = comparison.error, %failure, "Trial failed"),
            None => debug!(trial = %name, error = comparison.error, "Trial passed"),
        }

        let record = TrialRecord::new(
            name,
            kind,
            input.to_vector(),
            expected,
            actual,
            comparison.passed(),
        );
        TrialOutcome {
            record,
            error: comparison.error,
            failure: comparison.failure,
        }
    }

    fn evaluate(&self, input: &TrialInput) -> Evaluated {
        let tol = &self.config.tolerances;
        let (sut, oracle) = (self.sut, self.oracle);

        match input {
            TrialInput::GeoToNed { origin, point } => compare_transform(
                oracle.geo_to_ned(origin, point).map(|p| p.to_array()),
                sut.geo_to_ned(origin, point).map(|p| p.to_array()),
                |e, a| compare_cartesian(e, a, tol),
            ),
            TrialInput::NedToGeo { origin, point } => compare_transform(
                oracle.ned_to_geo(origin, point).map(|p| p.to_array()),
                sut.ned_to_geo(origin, point).map(|p| p.to_array()),
                |e, a| compare_geodetic(e, a, tol),
            ),
            TrialInput::Wgs84Conv(point) => compare_transform(
                oracle.geo_to_ecef(point).map(|p| p.to_array()),
                sut.geo_to_ecef(point).map(|p| p.to_array()),
                |e, a| compare_cartesian(e, a, tol),
            ),
            TrialInput::Wgs84Inv(point) => compare_transform(
                oracle.ecef_to_geo(point).map(|p| p.to_array()),
                sut.ecef_to_geo(point).map(|p| p.to_array()),
                |e, a| compare_geodetic(e, a, tol),
            ),
            TrialInput::GeoRoundtrip { origin, point } => {
                // The input itself is the expected value
                let actual = sut
                    .geo_to_ned(origin, point)
                    .and_then(|ned| sut.ned_to_geo(origin, &ned))
                    .map(|p| p.to_array());
                compare_transform(Ok(point.to_array()), actual, |e, a| {
                    compare_geodetic(e, a, tol)
                })
            }
            TrialInput::PointInside {
                polygon,
                point,
                radius,
            } => predicate_outcome(
                oracle.is_near(&polygon.vertices, *point, *radius),
                sut.is_near(&polygon.vertices, *point, *radius),
            ),
            TrialInput::LineIntersect { polygon, segment } => predicate_outcome(
                oracle.intersects(&polygon.vertices, segment),
                sut.intersects(&polygon.vertices, segment),
            ),
        }
    }
}

type Evaluated = (Option<Vec<f64>>, Option<Vec<f64>>, Comparison);

/// Compare two transform results. Agreement on rejecting an input passes;
/// one side failing where the other succeeds does not.
fn compare_transform(
    expected: Result<[f64; 3]>,
    actual: Result<[f64; 3]>,
    compare: impl Fn([f64; 3], [f64; 3]) -> Comparison,
) -> Evaluated {
    match (expected, actual) {
        (Ok(e), Ok(a)) => (Some(e.to_vec()), Some(a.to_vec()), compare(e, a)),
        (Err(_), Err(_)) => (None, None, Comparison::pass(0.0)),
        (Ok(e), Err(err)) => (
            Some(e.to_vec()),
            None,
            Comparison::fail(
                f64::INFINITY,
                TrialFailure::EngineFailed(format!("system under test failed: {err}")),
            ),
        ),
        (Err(err), Ok(a)) => (
            None,
            Some(a.to_vec()),
            Comparison::fail(
                f64::INFINITY,
                TrialFailure::EngineFailed(format!("reference rejected input: {err}")),
            ),
        ),
    }
}

fn predicate_outcome(expected: PredicateResult, actual: PredicateResult) -> Evaluated {
    let comparison = compare_predicates(&expected, &actual);
    (
        Some(metric::predicate_vector(&expected)),
        Some(metric::predicate_vector(&actual)),
        comparison,
    )
}
