use atomview::{AccessDescriptor, AccessMode, CallConvention, Value, ViewDescriptor};
use atomview_common::{ErrorClass, Result};

use crate::config::Family;

/// The outcome class a case expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
    Success,
    Error(ErrorClass),
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Success => f.write_str("success"),
            Expected::Error(class) => write!(f, "{class}"),
        }
    }
}

/// A single checked access.
#[derive(Debug, Clone)]
pub struct ScenarioCase {
    pub family: Family,
    pub view: ViewDescriptor,
    pub accessor: AccessDescriptor,
    pub mode: AccessMode,
    pub index: i64,
    /// Calling convention of dynamic invocation cases.
    pub convention: Option<CallConvention>,
    /// Short description of what the case exercises.
    pub detail: &'static str,
    pub expected: Expected,
}

impl std::fmt::Display for ScenarioCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} on {} with {} at {}",
            self.family, self.mode, self.view, self.accessor, self.index
        )?;
        if let Some(convention) = self.convention {
            write!(f, " ({convention})")?;
        }
        write!(f, ": {}, expecting {}", self.detail, self.expected)
    }
}

/// What an access actually produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observed {
    Value(Value),
    Error(ErrorClass),
}

impl Observed {
    pub fn from_result(result: &Result<Value>) -> Observed {
        match result {
            Ok(v) => Observed::Value(*v),
            Err(e) => Observed::Error(e.class()),
        }
    }

    pub fn value(&self) -> Option<Value> {
        match self {
            Observed::Value(v) => Some(*v),
            Observed::Error(_) => None,
        }
    }
}

impl std::fmt::Display for Observed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Observed::Value(v) => write!(f, "{v}"),
            Observed::Error(class) => write!(f, "{class}"),
        }
    }
}

/// The verdict on a case.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub observed: Observed,
    /// Why the case failed; `None` if it passed.
    pub failure: Option<String>,
}

impl Outcome {
    /// Judges an access result against the expected class and, for successful
    /// accesses, the expected value (compared bit for bit).
    pub fn judge(expected: Expected, result: &Result<Value>, value: Option<Value>) -> Outcome {
        let observed = Observed::from_result(result);
        let failure = match (expected, observed) {
            (Expected::Success, Observed::Value(actual)) => match value {
                Some(v) if !actual.bit_eq(&v) => Some(format!("expected {v}, got {actual}")),
                _ => None,
            },
            (Expected::Error(class), Observed::Error(actual)) if class == actual => None,
            (expected, _) => Some(match result {
                Err(e) => format!("expected {expected}, got error: {e}"),
                Ok(v) => format!("expected {expected}, got {v}"),
            }),
        };
        Outcome { observed, failure }
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// Marks the outcome as failed, keeping an earlier failure reason.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.failure.is_none() {
            self.failure = Some(reason.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomview_common::Error;

    #[test]
    fn test_judge() {
        let ok: Result<Value> = Ok(Value::I32(3));
        assert!(Outcome::judge(Expected::Success, &ok, Some(Value::I32(3))).passed());
        assert!(Outcome::judge(Expected::Success, &ok, None).passed());
        let wrong = Outcome::judge(Expected::Success, &ok, Some(Value::I32(4)));
        assert!(!wrong.passed());
        assert_eq!(wrong.observed.value(), Some(Value::I32(3)));

        let err: Result<Value> = Err(Error::misaligned(1, 4, 0));
        assert!(Outcome::judge(Expected::Error(ErrorClass::Misaligned), &err, None).passed());
        let mut outcome = Outcome::judge(Expected::Error(ErrorClass::IndexOutOfRange), &err, None);
        assert!(!outcome.passed());
        assert!(outcome.failure.as_ref().unwrap().contains("misaligned"));
        outcome.fail("other");
        assert!(!outcome.failure.unwrap().contains("other"));

        let mut outcome = Outcome::judge(Expected::Error(ErrorClass::Misaligned), &ok, None);
        assert!(!outcome.passed());
        outcome.fail("ignored");
        assert_eq!(outcome.observed, Observed::Value(Value::I32(3)));
    }
}
