//! Destinations for scenario results.

use std::collections::BTreeMap;

use crate::{
    config::Family,
    scenario::{Outcome, ScenarioCase},
};

/// Receives every case the suite runs, together with its outcome.
pub trait ReportSink {
    fn record(&mut self, case: &ScenarioCase, outcome: &Outcome);
}

/// Keeps every record.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Vec<(ScenarioCase, Outcome)>,
}

impl CollectingSink {
    pub fn new() -> CollectingSink {
        Default::default()
    }

    pub fn records(&self) -> &[(ScenarioCase, Outcome)] {
        &self.records
    }

    pub fn failures(&self) -> impl Iterator<Item = &(ScenarioCase, Outcome)> {
        self.records.iter().filter(|(_, outcome)| !outcome.passed())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReportSink for CollectingSink {
    fn record(&mut self, case: &ScenarioCase, outcome: &Outcome) {
        self.records.push((case.clone(), outcome.clone()));
    }
}

/// Emits every record through the `log` facade: passes at `trace`, failures at
/// `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn record(&mut self, case: &ScenarioCase, outcome: &Outcome) {
        match &outcome.failure {
            None => log::trace!("pass: {case} -> {}", outcome.observed),
            Some(reason) => log::warn!("FAIL: {case}: {reason}"),
        }
    }
}

/// Pass and fail counts of one family.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FamilyCounts {
    pub passed: usize,
    pub failed: usize,
}

impl FamilyCounts {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Aggregated results of a suite run: counts per family and every failure with
/// its full context.
#[derive(Debug, Default, Clone)]
pub struct SuiteReport {
    families: BTreeMap<Family, FamilyCounts>,
    failures: Vec<(ScenarioCase, Outcome)>,
}

impl SuiteReport {
    pub fn family(&self, family: Family) -> FamilyCounts {
        self.families.get(&family).copied().unwrap_or_default()
    }

    pub fn families(&self) -> impl Iterator<Item = (Family, FamilyCounts)> + '_ {
        self.families.iter().map(|(f, c)| (*f, *c))
    }

    pub fn failures(&self) -> &[(ScenarioCase, Outcome)] {
        &self.failures
    }

    pub fn total(&self) -> usize {
        self.families.values().map(FamilyCounts::total).sum()
    }

    pub fn passed(&self) -> usize {
        self.families.values().map(|c| c.passed).sum()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ReportSink for SuiteReport {
    fn record(&mut self, case: &ScenarioCase, outcome: &Outcome) {
        let counts = self.families.entry(case.family).or_default();
        if outcome.passed() {
            counts.passed += 1;
        } else {
            counts.failed += 1;
            self.failures.push((case.clone(), outcome.clone()));
        }
    }
}

impl std::fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} cases, {} failed", self.total(), self.failed())?;
        for (family, counts) in self.families() {
            write!(f, "; {family}: {}/{}", counts.passed, counts.total())?;
        }
        Ok(())
    }
}
