use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use super::metric::record_error;
use crate::error::Result;
use crate::recorder::{TestKind, TrialRecord};

/// Running aggregates for one test kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KindStats {
    pub trials: usize,
    pub failures: usize,
    /// Largest error seen. Serialized as `null` when infinite.
    pub max_error: f64,
}

impl KindStats {
    pub fn observe(&mut self, error: f64, passed: bool) {
        self.trials += 1;
        if !passed {
            self.failures += 1;
        }
        let error = if error.is_nan() { f64::INFINITY } else { error };
        self.max_error = self.max_error.max(error);
    }
}

/// Outcome of a whole run, per test kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HarnessSummary {
    pub seed: Option<u64>,
    pub system_under_test: String,
    pub reference: String,
    pub kinds: BTreeMap<TestKind, KindStats>,
}

impl HarnessSummary {
    pub fn new(seed: Option<u64>, system_under_test: &str, reference: &str) -> Self {
        Self {
            seed,
            system_under_test: system_under_test.to_string(),
            reference: reference.to_string(),
            kinds: BTreeMap::new(),
        }
    }

    pub fn observe(&mut self, kind: TestKind, error: f64, passed: bool) {
        self.kinds.entry(kind).or_default().observe(error, passed);
    }

    /// Rebuild aggregates from recorded trials, recomputing each error metric.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TrialRecord>) -> Self {
        let mut summary = Self::new(None, "recorded", "recorded");
        for r in records {
            let error = record_error(r.kind(), r.expected(), r.actual(), r.passed());
            summary.observe(r.kind(), error, r.passed());
        }
        summary
    }

    pub fn stats(&self, kind: TestKind) -> Option<&KindStats> {
        self.kinds.get(&kind)
    }

    pub fn total_trials(&self) -> usize {
        self.kinds.values().map(|s| s.trials).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.kinds.values().map(|s| s.failures).sum()
    }

    pub fn all_passed(&self) -> bool {
        self.total_failures() == 0
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
