use std::collections::HashMap;

use atomview::{
    AccessMode, ByteOrder, CallConvention, ElementKind, ErrorClass, Mutability, StorageKind,
    UpdateOp,
};
use atomview_conformance::{
    CollectingSink, ConformanceSuite, Expected, Family, LogSink, Observed, Outcome, ReportSink,
    ScenarioCase, SuiteConfig, SuiteReport,
};

/// Counts cases by detail without keeping them.
#[derive(Default)]
struct DetailCounter {
    counts: HashMap<&'static str, usize>,
}

impl ReportSink for DetailCounter {
    fn record(&mut self, case: &ScenarioCase, _outcome: &Outcome) {
        *self.counts.entry(case.detail).or_default() += 1;
    }
}

fn print_failures(report: &SuiteReport) {
    for (case, outcome) in report.failures().iter().take(20) {
        eprintln!("{case}: {}", outcome.failure.as_deref().unwrap_or_default());
    }
}

fn small_config() -> SuiteConfig {
    SuiteConfig {
        capacity: 16,
        slice_offsets: vec![0, 1],
        ..Default::default()
    }
}

#[test]
fn test_default_matrix_passes() {
    let suite = ConformanceSuite::new(SuiteConfig::default()).unwrap();
    // 3 kinds x 2 orders x 4 offsets x 2 mutabilities, 12 accessor shapes.
    assert_eq!(suite.matrix().fixtures().len(), 48);
    assert_eq!(suite.matrix().len(), 48 * 12);

    let mut counter = DetailCounter::default();
    let report = suite.run(&mut counter).unwrap();
    print_failures(&report);
    assert!(report.is_success(), "{report}");
    for family in Family::ALL {
        assert!(report.family(family).passed > 0, "{family}");
    }
    for detail in [
        "pattern read",
        "get after set",
        "memory image",
        "matching compare-and-set",
        "weak compare-and-set",
        "get-and-update",
        "undefined mode",
        "null receiver",
        "extra argument",
        "out of bounds",
        "misaligned index",
        "read-only view",
    ] {
        assert!(counter.counts.get(detail).copied().unwrap_or(0) > 0, "{detail}");
    }
}

#[test]
fn test_read_only_family_never_mutates() {
    let config = SuiteConfig {
        families: vec![Family::ReadOnly],
        ..small_config()
    };
    let suite = ConformanceSuite::new(config).unwrap();
    let mut sink = CollectingSink::new();
    let report = suite.run(&mut sink).unwrap();
    print_failures(&report);
    assert!(report.is_success());
    assert!(!sink.is_empty());

    for (case, outcome) in sink.records() {
        assert_eq!(case.view.mutability, Mutability::ReadOnly);
        if case.mode.is_mutating() {
            assert!(
                matches!(outcome.observed, Observed::Error(_)),
                "{case} -> {}",
                outcome.observed
            );
        }
    }
}

#[test]
fn test_type_negative_classes() {
    let config = SuiteConfig {
        families: vec![Family::TypeNegative],
        storage_kinds: vec![StorageKind::HeapBuffer],
        ..small_config()
    };
    let suite = ConformanceSuite::new(config).unwrap();
    let mut sink = CollectingSink::new();
    let report = suite.run(&mut sink).unwrap();
    print_failures(&report);
    assert!(report.is_success());

    for (case, outcome) in sink.records() {
        assert!(case.convention.is_some());
        let expected = match case.detail {
            "null receiver" => ErrorClass::NullReference,
            "no arguments" | "extra argument" => ErrorClass::ArityMismatch,
            _ => ErrorClass::TypeMismatch,
        };
        let float_add = case.mode.update_op() == Some(UpdateOp::Add)
            && case.accessor.kind == ElementKind::Float;
        let expected = if float_add && case.detail != "null receiver" {
            ErrorClass::UnsupportedOperation
        } else {
            expected
        };
        assert_eq!(outcome.observed, Observed::Error(expected), "{case}");
    }

    let conventions: Vec<_> = sink.records().iter().filter_map(|(c, _)| c.convention).collect();
    assert!(conventions.contains(&CallConvention::Exact));
    assert!(conventions.contains(&CallConvention::Generic));
}

#[test]
fn test_alignment_family_only_plain_access_succeeds() {
    let config = SuiteConfig {
        families: vec![Family::Alignment],
        include_read_only: false,
        ..small_config()
    };
    let suite = ConformanceSuite::new(config).unwrap();
    let mut sink = CollectingSink::new();
    let report = suite.run(&mut sink).unwrap();
    print_failures(&report);
    assert!(report.is_success());
    assert!(!sink.is_empty());

    for (case, outcome) in sink.records() {
        assert!(case.accessor.width > 1);
        let plain = matches!(case.mode, AccessMode::Get | AccessMode::Set);
        if plain {
            assert_eq!(case.expected, Expected::Success, "{case}");
        } else if outcome.observed != Observed::Error(ErrorClass::UnsupportedOperation) {
            assert_eq!(outcome.observed, Observed::Error(ErrorClass::Misaligned), "{case}");
        }
    }
}

#[test]
fn test_bounds_family_covers_both_ends() {
    let config = SuiteConfig {
        families: vec![Family::Bounds],
        storage_kinds: vec![StorageKind::OffHeap],
        view_orders: vec![ByteOrder::LittleEndian],
        ..small_config()
    };
    let suite = ConformanceSuite::new(config).unwrap();
    let mut sink = CollectingSink::new();
    let report = suite.run(&mut sink).unwrap();
    assert!(report.is_success());

    let indices: Vec<i64> = sink.records().iter().map(|(c, _)| c.index).collect();
    assert!(indices.contains(&-1));
    assert!(indices.contains(&i64::MIN));
    assert!(indices.contains(&i64::MAX));
    assert!(indices.contains(&16));
    assert!(sink.records().iter().all(|(_, o)| o.observed.value().is_none()));
}

#[test]
fn test_weak_cas_budget_is_configurable() {
    let config = SuiteConfig {
        families: vec![Family::ReadWrite],
        storage_kinds: vec![StorageKind::HeapArray],
        weak_cas_attempts: 1000,
        include_read_only: false,
        ..small_config()
    };
    let suite = ConformanceSuite::new(config).unwrap();
    let mut counter = DetailCounter::default();
    let report = suite.run(&mut counter).unwrap();
    print_failures(&report);
    assert!(report.is_success());
    assert!(counter.counts["weak compare-and-set"] > 0);
    assert!(counter.counts["mismatching weak compare-and-set"] > 0);

    let config = SuiteConfig {
        weak_cas_attempts: 0,
        ..small_config()
    };
    let e = ConformanceSuite::new(config).unwrap_err();
    assert_eq!(e.class(), ErrorClass::InvalidArgument);
}

#[test]
fn test_random_configurations_pass() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for _ in 0..4 {
        let capacity = rng.usize(1..=20);
        let offsets = (0..2).map(|_| rng.usize(0..8)).collect();
        let config = SuiteConfig {
            capacity,
            slice_offsets: offsets,
            storage_kinds: vec![StorageKind::ALL[rng.usize(0..StorageKind::ALL.len())]],
            view_orders: vec![ByteOrder::ALL[rng.usize(0..2)]],
            ..Default::default()
        };
        let suite = ConformanceSuite::new(config.clone()).unwrap();
        let report = suite.run(&mut LogSink).unwrap();
        print_failures(&report);
        assert!(report.is_success(), "{config:?}: {report}");
    }
}
