//! Checked dynamic invocation of access modes.
//!
//! [`invoke`] takes the receiver view, the index and the mode's values as a
//! single list of loosely typed argument slots, validates the whole call shape
//! against the mode's signature and only then performs the access. It reports
//! null receivers, wrong argument counts and wrong argument or result types the
//! way a dynamically typed caller would observe them.

use atomview_common::{Error, Result};

use crate::{
    accessor::Accessor,
    mode::{AccessMode, ParamType},
    value::{Value, ValueType},
    view::MemoryView,
};

/// One argument slot of a dynamic call.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    /// A missing reference.
    Null,
    View(&'a MemoryView),
    /// A byte index into the view.
    Index(i64),
    Value(Value),
    /// The unit value, as passed where no value is expected.
    Unit,
    /// A reference to some other, unrelated type, identified by name.
    Foreign(&'static str),
}

impl Arg<'_> {
    /// Name of the argument's type, for error messages.
    pub fn type_name(&self) -> String {
        match self {
            Arg::Null => "null".to_string(),
            Arg::View(_) => "MemoryView".to_string(),
            Arg::Index(_) => "Index".to_string(),
            Arg::Value(v) => v.value_type().to_string(),
            Arg::Unit => "Unit".to_string(),
            Arg::Foreign(name) => name.to_string(),
        }
    }
}

/// How strictly argument and result types are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallConvention {
    /// Every argument and the result must have exactly the signature's type.
    Exact,
    /// Arguments may be of a narrower type of the same kind (sign-extended
    /// integers, `F32` for `F64`), an integer value may stand in for the index,
    /// and the result may be requested as any type it widens to, or discarded
    /// as `Unit`.
    Generic,
}

impl CallConvention {
    pub const ALL: [CallConvention; 2] = [CallConvention::Exact, CallConvention::Generic];

    fn coerce(self, value: Value, target: ValueType) -> Option<Value> {
        match self {
            CallConvention::Exact => (value.value_type() == target).then_some(value),
            CallConvention::Generic => value.widen_to(target),
        }
    }

    fn accepts_return(self, natural: ValueType, requested: ValueType) -> bool {
        match self {
            CallConvention::Exact => natural == requested,
            CallConvention::Generic => {
                natural.widens_to(requested) || requested == ValueType::Unit
            }
        }
    }
}

impl std::fmt::Display for CallConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallConvention::Exact => f.write_str("exact"),
            CallConvention::Generic => f.write_str("generic"),
        }
    }
}

/// Invokes `mode` through `accessor` with the argument slots `[view, index,
/// values...]`, returning the result as `return_type` (the mode's natural result
/// type when `None`).
///
/// Checks run in this order, and the first failure is returned:
///
/// 1. `NullReference` if the receiver slot is [`Arg::Null`].
/// 2. `UnsupportedOperation` if the mode is not defined for the accessor.
/// 3. `ArityMismatch` if the slot count differs from the mode's
///    [`AccessModeType`](crate::mode::AccessModeType).
/// 4. `TypeMismatch` for a receiver that is not a view, an index that is not an
///    index, or a value that does not convert to the element type.
/// 5. `TypeMismatch` if the result cannot be returned as `return_type`.
/// 6. The checks of [`Accessor::access`]: bounds, mutability, alignment.
pub fn invoke(
    accessor: &Accessor,
    mode: AccessMode,
    convention: CallConvention,
    args: &[Arg],
    return_type: Option<ValueType>,
) -> Result<Value> {
    if let Some(Arg::Null) = args.first() {
        return Err(Error::null_reference(format!("{mode} receiver")));
    }
    accessor.check_mode(mode)?;

    let signature = accessor.access_mode_type(mode);
    if args.len() != signature.slot_count() {
        return Err(Error::arity_mismatch(
            mode.name(),
            signature.slot_count(),
            args.len(),
        ));
    }

    let mut view = None;
    let mut index = None;
    let mut values = Vec::with_capacity(mode.arity());
    for (slot, (param, arg)) in signature.params.iter().zip(args).enumerate() {
        match (*param, *arg, convention) {
            (ParamType::View, Arg::View(v), _) => view = Some(v),
            (ParamType::Index, Arg::Index(i), _) => index = Some(i),
            (ParamType::Index, Arg::Value(v), CallConvention::Generic) => {
                match v.widen_to(ValueType::I64) {
                    Some(Value::I64(i)) => index = Some(i),
                    _ => return Err(mismatch(mode, slot, param, arg)),
                }
            }
            (ParamType::Value(ty), Arg::Value(v), _) => match convention.coerce(v, ty) {
                Some(v) => values.push(v),
                None => return Err(mismatch(mode, slot, param, arg)),
            },
            _ => return Err(mismatch(mode, slot, param, arg)),
        }
    }
    let (Some(view), Some(index)) = (view, index) else {
        unreachable!("every signature starts with a view and an index");
    };

    let natural = signature.result;
    let requested = return_type.unwrap_or(natural);
    if !convention.accepts_return(natural, requested) {
        return Err(Error::type_mismatch(
            format!("{mode} {convention} result"),
            natural.to_string(),
            requested.to_string(),
        ));
    }

    let result = accessor.access(mode, view, index, &values)?;
    if requested == ValueType::Unit {
        return Ok(Value::Unit);
    }
    result.widen_to(requested).ok_or_else(|| {
        Error::type_mismatch(
            format!("{mode} result"),
            requested.to_string(),
            result.value_type().to_string(),
        )
    })
}

fn mismatch(mode: AccessMode, slot: usize, expected: &ParamType, actual: &Arg) -> Error {
    Error::type_mismatch(
        format!("{mode} argument {slot}"),
        expected.to_string(),
        actual.type_name(),
    )
}
