//! The five scenario families.

use atomview::{
    AccessMode, AccessType, Arg, MemoryOrdering, Value, ValueType, invoke::invoke, policy,
};
use atomview_common::ErrorClass;
use itertools::iproduct;

use crate::{
    oracle,
    scenario::{Expected, Observed, Outcome},
    suite::{Group, Runner},
};

/// Name of the unrelated type passed where a view, index or value is expected.
const FOREIGN: &str = "Void";

impl Runner<'_> {
    /// Reads the fill pattern through every get mode, then writes and reads back
    /// through every mode at every index the mode admits.
    pub(crate) fn read_write(&mut self, group: &Group) {
        let acc = group.accessor;
        let view = group.view();
        let width = acc.width();
        let window = policy::index_window(view.capacity(), width);

        for (index, mode) in iproduct!(window.clone(), AccessMode::of_type(AccessType::Get)) {
            let expected = oracle::expected_outcome(view, &acc, mode, index);
            if expected == Expected::Success {
                let pattern = oracle::expected_value(&acc, index);
                self.check(group, group.case(mode, index, "pattern read", expected), &[], Some(pattern));
            }
        }

        for index in window {
            let aligned = view.is_aligned(index, width);
            self.set_get_round_trips(group, index, aligned);
            if aligned {
                self.compare_and_set_round_trips(group, index);
                self.compare_and_exchange_round_trips(group, index);
                self.weak_compare_and_set_round_trips(group, index);
                self.update_round_trips(group, index);
            }
        }

        self.undefined_modes(group);
    }

    /// Dynamic calls of every mode with a null, foreign or wrongly typed slot,
    /// a wrong result type, or a wrong number of slots.
    pub(crate) fn type_negative(&mut self, group: &Group) {
        let acc = group.accessor;
        let view = group.view();
        let index = policy::aligned_indices(view.capacity(), view.alignment_origin(), acc.width())
            .next()
            .unwrap_or(0);
        let value = Arg::Value(oracle::expected_value(&acc, index));
        let conventions = self.config.conventions.clone();

        for (mode, convention) in iproduct!(AccessMode::ALL, conventions) {
            let shape_error = |class| {
                if acc.supports(mode) {
                    Expected::Error(class)
                } else {
                    Expected::Error(ErrorClass::UnsupportedOperation)
                }
            };
            let values = vec![value; mode.arity()];
            let wrong_return = match mode.return_type(acc.value_type()) {
                ValueType::Bool => ValueType::I32,
                _ => ValueType::Bool,
            };
            let mut shapes = vec![
                (
                    "null receiver",
                    call_args(Arg::Null, Arg::Index(index), &values),
                    None,
                    Expected::Error(ErrorClass::NullReference),
                ),
                (
                    "foreign receiver",
                    call_args(Arg::Foreign(FOREIGN), Arg::Index(index), &values),
                    None,
                    shape_error(ErrorClass::TypeMismatch),
                ),
                (
                    "index as receiver",
                    call_args(Arg::Index(index), Arg::Index(index), &values),
                    None,
                    shape_error(ErrorClass::TypeMismatch),
                ),
                (
                    "foreign index",
                    call_args(Arg::View(view), Arg::Foreign(FOREIGN), &values),
                    None,
                    shape_error(ErrorClass::TypeMismatch),
                ),
                (
                    "wrong result type",
                    call_args(Arg::View(view), Arg::Index(index), &values),
                    Some(wrong_return),
                    shape_error(ErrorClass::TypeMismatch),
                ),
                ("no arguments", Vec::new(), None, shape_error(ErrorClass::ArityMismatch)),
                (
                    "extra argument",
                    call_args(Arg::View(view), Arg::Index(index), &values)
                        .into_iter()
                        .chain([Arg::Foreign(FOREIGN)])
                        .collect(),
                    None,
                    shape_error(ErrorClass::ArityMismatch),
                ),
            ];
            for slot in 0..values.len() {
                for (detail, replacement) in [
                    ("foreign value", Arg::Foreign(FOREIGN)),
                    ("wrong value type", Arg::Value(Value::Bool(true))),
                ] {
                    let mut args = call_args(Arg::View(view), Arg::Index(index), &values);
                    args[2 + slot] = replacement;
                    shapes.push((detail, args, None, shape_error(ErrorClass::TypeMismatch)));
                }
            }

            for (detail, args, return_type, expected) in shapes {
                let case = group.invoke_case(mode, index, convention, detail, expected);
                self.check_preserving(group, case, None, || {
                    invoke(&acc, mode, convention, &args, return_type)
                });
            }
        }
    }

    /// Every mode at indices below and above the valid window.
    pub(crate) fn bounds(&mut self, group: &Group) {
        let acc = group.accessor;
        let view = group.view();
        let capacity = view.capacity() as i64;
        let width = acc.width() as i64;
        let mut indices = vec![i64::MIN, -1, capacity - width + 1, capacity, i64::MAX];
        indices.sort_unstable();
        indices.dedup();
        let [value, ..] = oracle::sample_values(acc.value_type());

        for (mode, index) in iproduct!(AccessMode::ALL, indices) {
            let expected = oracle::expected_outcome(view, &acc, mode, index);
            let args = vec![value; mode.arity()];
            let case = group.case(mode, index, "out of bounds", expected);
            self.check_preserving(group, case, None, || acc.access(mode, view, index, &args));
        }
    }

    /// Every mode at every valid misaligned index. Plain get and set succeed;
    /// plain set writes back the value already there.
    pub(crate) fn alignment(&mut self, group: &Group) {
        let acc = group.accessor;
        let view = group.view();
        let misaligned =
            policy::misaligned_indices(view.capacity(), view.alignment_origin(), acc.width());

        for (index, mode) in iproduct!(misaligned, AccessMode::ALL) {
            let current = oracle::expected_value(&acc, index);
            let expected = oracle::expected_outcome(view, &acc, mode, index);
            let value = match mode.access_type() {
                AccessType::Get => Some(current),
                AccessType::Set => Some(Value::Unit),
                _ => None,
            };
            let args = vec![current; mode.arity()];
            let case = group.case(mode, index, "misaligned index", expected);
            self.check_preserving(group, case, value, || acc.access(mode, view, index, &args));
        }
    }

    /// Every mode at every valid index of a read-only view: reads see the
    /// pattern, everything else fails.
    pub(crate) fn read_only(&mut self, group: &Group) {
        let acc = group.accessor;
        let view = group.view();
        let window = policy::index_window(view.capacity(), acc.width());

        for (index, mode) in iproduct!(window, AccessMode::ALL) {
            let current = oracle::expected_value(&acc, index);
            let expected = oracle::expected_outcome(view, &acc, mode, index);
            let value = (mode.access_type() == AccessType::Get).then_some(current);
            let args = vec![current; mode.arity()];
            let case = group.case(mode, index, "read-only view", expected);
            self.check_preserving(group, case, value, || acc.access(mode, view, index, &args));
        }
    }
}

impl Runner<'_> {
    fn set_get_round_trips(&mut self, group: &Group, index: i64, aligned: bool) {
        let samples = oracle::sample_values(group.accessor.value_type());
        for (set, value) in AccessMode::of_type(AccessType::Set).zip(samples.into_iter().cycle()) {
            if set.requires_alignment() && !aligned {
                continue;
            }
            let get = matching_get(set);
            self.check(
                group,
                group.case(set, index, "set", Expected::Success),
                &[value],
                Some(Value::Unit),
            );
            self.check(
                group,
                group.case(get, index, "get after set", Expected::Success),
                &[],
                Some(value),
            );
            self.check_image(group, set, index, value);
        }
    }

    fn compare_and_set_round_trips(&mut self, group: &Group, index: i64) {
        let [a, b, c] = oracle::sample_values(group.accessor.value_type());
        for mode in AccessMode::of_type(AccessType::CompareAndSet).filter(|m| !m.is_weak()) {
            self.put(group, index, a);
            self.check(
                group,
                group.case(mode, index, "matching compare-and-set", Expected::Success),
                &[a, b],
                Some(Value::Bool(true)),
            );
            self.expect_holds(group, index, b, "value after matching compare-and-set");
            self.check(
                group,
                group.case(mode, index, "mismatching compare-and-set", Expected::Success),
                &[a, c],
                Some(Value::Bool(false)),
            );
            self.expect_holds(group, index, b, "value after mismatching compare-and-set");
        }
    }

    fn compare_and_exchange_round_trips(&mut self, group: &Group, index: i64) {
        let [a, b, c] = oracle::sample_values(group.accessor.value_type());
        for mode in AccessMode::of_type(AccessType::CompareAndExchange) {
            self.put(group, index, a);
            self.check(
                group,
                group.case(mode, index, "matching compare-and-exchange", Expected::Success),
                &[a, b],
                Some(a),
            );
            self.expect_holds(group, index, b, "value after matching compare-and-exchange");
            self.check(
                group,
                group.case(mode, index, "mismatching compare-and-exchange", Expected::Success),
                &[a, c],
                Some(b),
            );
            self.expect_holds(group, index, b, "value after mismatching compare-and-exchange");
        }
    }

    fn weak_compare_and_set_round_trips(&mut self, group: &Group, index: i64) {
        let [a, b, c] = oracle::sample_values(group.accessor.value_type());
        let attempts = self.config.weak_cas_attempts;
        for mode in AccessMode::of_type(AccessType::CompareAndSet).filter(|m| m.is_weak()) {
            self.put(group, index, a);

            let case = group.case(mode, index, "weak compare-and-set", Expected::Success);
            let mut result = Ok(Value::Bool(false));
            for _ in 0..attempts {
                result = group.accessor.access(mode, group.view(), index, &[a, b]);
                if !matches!(result, Ok(Value::Bool(false))) {
                    break;
                }
            }
            let outcome = match result {
                Ok(Value::Bool(false)) => Outcome {
                    observed: Observed::Value(Value::Bool(false)),
                    failure: Some(format!("no success within {attempts} attempts")),
                },
                _ => Outcome::judge(case.expected, &result, Some(Value::Bool(true))),
            };
            self.record(&case, &outcome);

            self.expect_holds(group, index, b, "value after weak compare-and-set");
            self.check(
                group,
                group.case(mode, index, "mismatching weak compare-and-set", Expected::Success),
                &[a, c],
                Some(Value::Bool(false)),
            );
            self.expect_holds(group, index, b, "value after mismatching weak compare-and-set");
        }
    }

    fn update_round_trips(&mut self, group: &Group, index: i64) {
        let acc = group.accessor;
        let [a, b, _] = oracle::sample_values(acc.value_type());
        for mode in AccessMode::of_type(AccessType::GetAndUpdate).filter(|m| acc.supports(*m)) {
            let Some(op) = mode.update_op() else {
                continue;
            };
            self.put(group, index, a);
            self.check(
                group,
                group.case(mode, index, "get-and-update", Expected::Success),
                &[b],
                Some(a),
            );
            let updated = oracle::updated_value(op, a, b);
            self.expect_holds(group, index, updated, "value after get-and-update");
        }
    }

    /// Modes the accessor does not define fail at a valid aligned index.
    fn undefined_modes(&mut self, group: &Group) {
        let acc = group.accessor;
        let view = group.view();
        let Some(index) =
            policy::aligned_indices(view.capacity(), view.alignment_origin(), acc.width()).next()
        else {
            return;
        };
        let [value, ..] = oracle::sample_values(acc.value_type());
        for mode in AccessMode::ALL.into_iter().filter(|m| !acc.supports(*m)) {
            let args = vec![value; mode.arity()];
            let case = group.case(
                mode,
                index,
                "undefined mode",
                Expected::Error(ErrorClass::UnsupportedOperation),
            );
            self.check_preserving(group, case, None, || acc.access(mode, view, index, &args));
        }
    }

    fn put(&mut self, group: &Group, index: i64, value: Value) {
        self.check(
            group,
            group.case(AccessMode::SetVolatile, index, "setup", Expected::Success),
            &[value],
            Some(Value::Unit),
        );
    }

    fn expect_holds(&mut self, group: &Group, index: i64, value: Value, detail: &'static str) {
        self.check(
            group,
            group.case(AccessMode::GetVolatile, index, detail, Expected::Success),
            &[],
            Some(value),
        );
    }

    /// The view's own byte-order-aware read sees the accessor's write in the
    /// view's byte order.
    fn check_image(&mut self, group: &Group, mode: AccessMode, index: i64, value: Value) {
        let acc = group.accessor;
        let view = group.view();
        let ty = acc.value_type();
        let image = oracle::memory_image(value, acc.byte_order(), view.byte_order());
        let result = view
            .read_value(index as usize, acc.width())
            .map(|bits| Value::from_bits(ty, bits));
        let case = group.case(mode, index, "memory image", Expected::Success);
        let outcome = Outcome::judge(case.expected, &result, Some(Value::from_bits(ty, image)));
        self.record(&case, &outcome);
    }
}

fn call_args<'a>(receiver: Arg<'a>, index: Arg<'a>, values: &[Arg<'a>]) -> Vec<Arg<'a>> {
    [receiver, index].into_iter().chain(values.iter().copied()).collect()
}

/// The get mode with the ordering that pairs with a set mode.
fn matching_get(set: AccessMode) -> AccessMode {
    match set.ordering() {
        MemoryOrdering::Plain => AccessMode::Get,
        MemoryOrdering::Opaque => AccessMode::GetOpaque,
        MemoryOrdering::Acquire | MemoryOrdering::Release => AccessMode::GetAcquire,
        MemoryOrdering::Volatile => AccessMode::GetVolatile,
    }
}
