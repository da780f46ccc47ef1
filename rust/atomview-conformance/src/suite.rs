use atomview::{AccessMode, Accessor, CallConvention, MemoryView, Value};
use atomview_common::Result;

use crate::{
    config::{Family, SuiteConfig},
    fixture::Fixture,
    matrix::{Pairing, ScenarioMatrix},
    scenario::{Expected, Outcome, ScenarioCase},
    sink::{ReportSink, SuiteReport},
};

/// Runs every enabled scenario family over every pairing of a
/// [`ScenarioMatrix`].
#[derive(Debug)]
pub struct ConformanceSuite {
    config: SuiteConfig,
    matrix: ScenarioMatrix,
}

impl ConformanceSuite {
    pub fn new(config: SuiteConfig) -> Result<ConformanceSuite> {
        let matrix = ScenarioMatrix::new(&config)?;
        Ok(ConformanceSuite { config, matrix })
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn matrix(&self) -> &ScenarioMatrix {
        &self.matrix
    }

    /// Runs the suite, reporting every case to `sink`.
    ///
    /// Failed cases do not stop the run; they are collected in the returned
    /// report. An error is returned only if a fixture cannot be reset.
    pub fn run(&self, sink: &mut dyn ReportSink) -> Result<SuiteReport> {
        let mut runner = Runner {
            config: &self.config,
            sink,
            report: SuiteReport::default(),
        };
        for pairing in self.matrix.pairings() {
            runner.run_pairing(&pairing)?;
        }
        let report = runner.report;
        if report.is_success() {
            log::info!("conformance suite passed: {report}");
        } else {
            log::warn!("conformance suite failed: {report}");
        }
        Ok(report)
    }
}

/// One family run against one pairing.
pub(crate) struct Group<'a> {
    pub family: Family,
    pub fixture: &'a Fixture,
    pub accessor: Accessor,
}

impl Group<'_> {
    #[inline]
    pub fn view(&self) -> &MemoryView {
        self.fixture.view()
    }

    pub fn case(
        &self,
        mode: AccessMode,
        index: i64,
        detail: &'static str,
        expected: Expected,
    ) -> ScenarioCase {
        ScenarioCase {
            family: self.family,
            view: self.fixture.descriptor(),
            accessor: self.accessor.descriptor(),
            mode,
            index,
            convention: None,
            detail,
            expected,
        }
    }

    pub fn invoke_case(
        &self,
        mode: AccessMode,
        index: i64,
        convention: CallConvention,
        detail: &'static str,
        expected: Expected,
    ) -> ScenarioCase {
        ScenarioCase {
            convention: Some(convention),
            ..self.case(mode, index, detail, expected)
        }
    }
}

pub(crate) struct Runner<'a> {
    pub config: &'a SuiteConfig,
    sink: &'a mut dyn ReportSink,
    report: SuiteReport,
}

impl Runner<'_> {
    fn run_pairing(&mut self, pairing: &Pairing) -> Result<()> {
        let mutability = pairing.fixture.view().mutability();
        for family in Family::ALL {
            if !self.config.runs(family) || !family.applies_to(mutability) {
                continue;
            }
            pairing.fixture.refill(pairing.accessor.width())?;
            log::debug!(
                "{family}: {} with {}",
                pairing.fixture.descriptor(),
                pairing.accessor.descriptor()
            );
            let group = Group {
                family,
                fixture: pairing.fixture,
                accessor: pairing.accessor,
            };
            match family {
                Family::ReadWrite => self.read_write(&group),
                Family::TypeNegative => self.type_negative(&group),
                Family::Bounds => self.bounds(&group),
                Family::Alignment => self.alignment(&group),
                Family::ReadOnly => self.read_only(&group),
            }
        }
        Ok(())
    }

    pub fn record(&mut self, case: &ScenarioCase, outcome: &Outcome) {
        self.report.record(case, outcome);
        self.sink.record(case, outcome);
    }

    /// Performs the case's access with `args` and judges the result; returns the
    /// value the access produced, if any.
    pub fn check(
        &mut self,
        group: &Group,
        case: ScenarioCase,
        args: &[Value],
        value: Option<Value>,
    ) -> Option<Value> {
        let result = group
            .accessor
            .access(case.mode, group.view(), case.index, args);
        let outcome = Outcome::judge(case.expected, &result, value);
        self.record(&case, &outcome);
        outcome.observed.value()
    }

    /// Judges a call that must leave the bytes of the view unchanged.
    pub fn check_preserving(
        &mut self,
        group: &Group,
        case: ScenarioCase,
        value: Option<Value>,
        call: impl FnOnce() -> Result<Value>,
    ) {
        let before = group.view().snapshot();
        let result = call();
        let mut outcome = Outcome::judge(case.expected, &result, value);
        if group.view().snapshot() != before {
            outcome.fail("view bytes changed");
        }
        self.record(&case, &outcome);
    }
}
