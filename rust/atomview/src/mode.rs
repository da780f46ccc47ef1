//! Access modes and their static properties.

use std::{str::FromStr, sync::atomic::Ordering};

use atomview_common::{Error, Result};

use crate::{
    descriptor::AccessDescriptor,
    value::{ElementKind, ValueType},
};

/// The shape of an access: what it reads, what it writes and what it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessType {
    /// Reads an element.
    Get,
    /// Writes an element.
    Set,
    /// Conditionally replaces an element and reports whether it did.
    CompareAndSet,
    /// Conditionally replaces an element and returns the witnessed value.
    CompareAndExchange,
    /// Atomically updates an element and returns its previous value.
    GetAndUpdate,
}

impl AccessType {
    /// Number of element values the caller passes, besides the view and index.
    pub fn arity(self) -> usize {
        match self {
            AccessType::Get => 0,
            AccessType::Set | AccessType::GetAndUpdate => 1,
            AccessType::CompareAndSet | AccessType::CompareAndExchange => 2,
        }
    }

    /// Result type of the access for elements of type `element`.
    pub fn return_type(self, element: ValueType) -> ValueType {
        match self {
            AccessType::Get | AccessType::CompareAndExchange | AccessType::GetAndUpdate => element,
            AccessType::Set => ValueType::Unit,
            AccessType::CompareAndSet => ValueType::Bool,
        }
    }
}

/// One parameter slot of an access mode's call signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// The memory view the element lives in.
    View,
    /// The byte index of the element.
    Index,
    /// An element value.
    Value(ValueType),
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamType::View => f.write_str("MemoryView"),
            ParamType::Index => f.write_str("Index"),
            ParamType::Value(ty) => write!(f, "{ty}"),
        }
    }
}

/// The call signature of an access mode: `(view, index, values...) -> result`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessModeType {
    pub params: Vec<ParamType>,
    pub result: ValueType,
}

impl AccessModeType {
    /// Number of parameter slots, view and index included.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.params.len()
    }
}

impl std::fmt::Display for AccessModeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.result)
    }
}

/// Memory ordering contract of an access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryOrdering {
    /// No ordering and no alignment requirement; atomic as a whole only when the
    /// element is aligned.
    Plain,
    /// Atomic, unordered with respect to other locations.
    Opaque,
    Acquire,
    Release,
    /// Sequentially consistent.
    Volatile,
}

impl MemoryOrdering {
    /// Ordering for a load.
    pub fn load(self) -> Ordering {
        match self {
            MemoryOrdering::Plain | MemoryOrdering::Opaque | MemoryOrdering::Release => {
                Ordering::Relaxed
            }
            MemoryOrdering::Acquire => Ordering::Acquire,
            MemoryOrdering::Volatile => Ordering::SeqCst,
        }
    }

    /// Ordering for a store.
    pub fn store(self) -> Ordering {
        match self {
            MemoryOrdering::Plain | MemoryOrdering::Opaque | MemoryOrdering::Acquire => {
                Ordering::Relaxed
            }
            MemoryOrdering::Release => Ordering::Release,
            MemoryOrdering::Volatile => Ordering::SeqCst,
        }
    }

    /// Ordering for a read-modify-write operation.
    pub fn rmw(self) -> Ordering {
        match self {
            MemoryOrdering::Plain | MemoryOrdering::Opaque => Ordering::Relaxed,
            MemoryOrdering::Acquire => Ordering::Acquire,
            MemoryOrdering::Release => Ordering::Release,
            MemoryOrdering::Volatile => Ordering::SeqCst,
        }
    }

    /// `(success, failure)` orderings for a compare-exchange.
    pub fn cas(self) -> (Ordering, Ordering) {
        match self {
            MemoryOrdering::Plain | MemoryOrdering::Opaque => (Ordering::Relaxed, Ordering::Relaxed),
            MemoryOrdering::Acquire => (Ordering::Acquire, Ordering::Acquire),
            MemoryOrdering::Release => (Ordering::Release, Ordering::Relaxed),
            MemoryOrdering::Volatile => (Ordering::SeqCst, Ordering::SeqCst),
        }
    }
}

/// Operator applied by read-modify-write modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UpdateOp {
    Set,
    Add,
    Or,
    And,
    Xor,
}

impl UpdateOp {
    /// Applies the operator to raw element bits; `Add` wraps modulo 2^64.
    #[inline]
    pub fn apply(self, current: u64, operand: u64) -> u64 {
        match self {
            UpdateOp::Set => operand,
            UpdateOp::Add => current.wrapping_add(operand),
            UpdateOp::Or => current | operand,
            UpdateOp::And => current & operand,
            UpdateOp::Xor => current ^ operand,
        }
    }

    /// Returns `true` for the operators that act on each bit independently.
    #[inline]
    pub fn is_bitwise(self) -> bool {
        !matches!(self, UpdateOp::Add)
    }
}

/// Static properties of an [`AccessMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessModeInfo {
    pub mode: AccessMode,
    /// Method name of the mode, in snake case.
    pub name: &'static str,
    pub access_type: AccessType,
    pub ordering: MemoryOrdering,
    /// Operator of a `GetAndUpdate` mode.
    pub update: Option<UpdateOp>,
    /// Whether the mode may fail spuriously.
    pub weak: bool,
}

impl AccessModeInfo {
    const fn new(
        mode: AccessMode,
        name: &'static str,
        access_type: AccessType,
        ordering: MemoryOrdering,
    ) -> AccessModeInfo {
        AccessModeInfo {
            mode,
            name,
            access_type,
            ordering,
            update: None,
            weak: false,
        }
    }

    const fn weak(mut self) -> AccessModeInfo {
        self.weak = true;
        self
    }

    const fn update(mut self, op: UpdateOp) -> AccessModeInfo {
        self.update = Some(op);
        self
    }
}

/// Every way an accessor can touch an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessMode {
    Get,
    Set,
    GetVolatile,
    SetVolatile,
    GetAcquire,
    SetRelease,
    GetOpaque,
    SetOpaque,
    CompareAndSet,
    CompareAndExchange,
    CompareAndExchangeAcquire,
    CompareAndExchangeRelease,
    WeakCompareAndSetPlain,
    WeakCompareAndSet,
    WeakCompareAndSetAcquire,
    WeakCompareAndSetRelease,
    GetAndSet,
    GetAndSetAcquire,
    GetAndSetRelease,
    GetAndAdd,
    GetAndAddAcquire,
    GetAndAddRelease,
    GetAndBitwiseOr,
    GetAndBitwiseOrAcquire,
    GetAndBitwiseOrRelease,
    GetAndBitwiseAnd,
    GetAndBitwiseAndAcquire,
    GetAndBitwiseAndRelease,
    GetAndBitwiseXor,
    GetAndBitwiseXorAcquire,
    GetAndBitwiseXorRelease,
}

use AccessMode as M;
use AccessType as T;
use MemoryOrdering as O;

static MODES: [AccessModeInfo; 31] = [
    AccessModeInfo::new(M::Get, "get", T::Get, O::Plain),
    AccessModeInfo::new(M::Set, "set", T::Set, O::Plain),
    AccessModeInfo::new(M::GetVolatile, "get_volatile", T::Get, O::Volatile),
    AccessModeInfo::new(M::SetVolatile, "set_volatile", T::Set, O::Volatile),
    AccessModeInfo::new(M::GetAcquire, "get_acquire", T::Get, O::Acquire),
    AccessModeInfo::new(M::SetRelease, "set_release", T::Set, O::Release),
    AccessModeInfo::new(M::GetOpaque, "get_opaque", T::Get, O::Opaque),
    AccessModeInfo::new(M::SetOpaque, "set_opaque", T::Set, O::Opaque),
    AccessModeInfo::new(M::CompareAndSet, "compare_and_set", T::CompareAndSet, O::Volatile),
    AccessModeInfo::new(
        M::CompareAndExchange,
        "compare_and_exchange",
        T::CompareAndExchange,
        O::Volatile,
    ),
    AccessModeInfo::new(
        M::CompareAndExchangeAcquire,
        "compare_and_exchange_acquire",
        T::CompareAndExchange,
        O::Acquire,
    ),
    AccessModeInfo::new(
        M::CompareAndExchangeRelease,
        "compare_and_exchange_release",
        T::CompareAndExchange,
        O::Release,
    ),
    AccessModeInfo::new(
        M::WeakCompareAndSetPlain,
        "weak_compare_and_set_plain",
        T::CompareAndSet,
        O::Plain,
    )
    .weak(),
    AccessModeInfo::new(
        M::WeakCompareAndSet,
        "weak_compare_and_set",
        T::CompareAndSet,
        O::Volatile,
    )
    .weak(),
    AccessModeInfo::new(
        M::WeakCompareAndSetAcquire,
        "weak_compare_and_set_acquire",
        T::CompareAndSet,
        O::Acquire,
    )
    .weak(),
    AccessModeInfo::new(
        M::WeakCompareAndSetRelease,
        "weak_compare_and_set_release",
        T::CompareAndSet,
        O::Release,
    )
    .weak(),
    AccessModeInfo::new(M::GetAndSet, "get_and_set", T::GetAndUpdate, O::Volatile)
        .update(UpdateOp::Set),
    AccessModeInfo::new(M::GetAndSetAcquire, "get_and_set_acquire", T::GetAndUpdate, O::Acquire)
        .update(UpdateOp::Set),
    AccessModeInfo::new(M::GetAndSetRelease, "get_and_set_release", T::GetAndUpdate, O::Release)
        .update(UpdateOp::Set),
    AccessModeInfo::new(M::GetAndAdd, "get_and_add", T::GetAndUpdate, O::Volatile)
        .update(UpdateOp::Add),
    AccessModeInfo::new(M::GetAndAddAcquire, "get_and_add_acquire", T::GetAndUpdate, O::Acquire)
        .update(UpdateOp::Add),
    AccessModeInfo::new(M::GetAndAddRelease, "get_and_add_release", T::GetAndUpdate, O::Release)
        .update(UpdateOp::Add),
    AccessModeInfo::new(M::GetAndBitwiseOr, "get_and_bitwise_or", T::GetAndUpdate, O::Volatile)
        .update(UpdateOp::Or),
    AccessModeInfo::new(
        M::GetAndBitwiseOrAcquire,
        "get_and_bitwise_or_acquire",
        T::GetAndUpdate,
        O::Acquire,
    )
    .update(UpdateOp::Or),
    AccessModeInfo::new(
        M::GetAndBitwiseOrRelease,
        "get_and_bitwise_or_release",
        T::GetAndUpdate,
        O::Release,
    )
    .update(UpdateOp::Or),
    AccessModeInfo::new(M::GetAndBitwiseAnd, "get_and_bitwise_and", T::GetAndUpdate, O::Volatile)
        .update(UpdateOp::And),
    AccessModeInfo::new(
        M::GetAndBitwiseAndAcquire,
        "get_and_bitwise_and_acquire",
        T::GetAndUpdate,
        O::Acquire,
    )
    .update(UpdateOp::And),
    AccessModeInfo::new(
        M::GetAndBitwiseAndRelease,
        "get_and_bitwise_and_release",
        T::GetAndUpdate,
        O::Release,
    )
    .update(UpdateOp::And),
    AccessModeInfo::new(M::GetAndBitwiseXor, "get_and_bitwise_xor", T::GetAndUpdate, O::Volatile)
        .update(UpdateOp::Xor),
    AccessModeInfo::new(
        M::GetAndBitwiseXorAcquire,
        "get_and_bitwise_xor_acquire",
        T::GetAndUpdate,
        O::Acquire,
    )
    .update(UpdateOp::Xor),
    AccessModeInfo::new(
        M::GetAndBitwiseXorRelease,
        "get_and_bitwise_xor_release",
        T::GetAndUpdate,
        O::Release,
    )
    .update(UpdateOp::Xor),
];

impl AccessMode {
    /// All modes, in declaration order.
    pub const ALL: [AccessMode; 31] = [
        M::Get,
        M::Set,
        M::GetVolatile,
        M::SetVolatile,
        M::GetAcquire,
        M::SetRelease,
        M::GetOpaque,
        M::SetOpaque,
        M::CompareAndSet,
        M::CompareAndExchange,
        M::CompareAndExchangeAcquire,
        M::CompareAndExchangeRelease,
        M::WeakCompareAndSetPlain,
        M::WeakCompareAndSet,
        M::WeakCompareAndSetAcquire,
        M::WeakCompareAndSetRelease,
        M::GetAndSet,
        M::GetAndSetAcquire,
        M::GetAndSetRelease,
        M::GetAndAdd,
        M::GetAndAddAcquire,
        M::GetAndAddRelease,
        M::GetAndBitwiseOr,
        M::GetAndBitwiseOrAcquire,
        M::GetAndBitwiseOrRelease,
        M::GetAndBitwiseAnd,
        M::GetAndBitwiseAndAcquire,
        M::GetAndBitwiseAndRelease,
        M::GetAndBitwiseXor,
        M::GetAndBitwiseXorAcquire,
        M::GetAndBitwiseXorRelease,
    ];

    #[inline]
    pub fn info(self) -> &'static AccessModeInfo {
        &MODES[self as usize]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    #[inline]
    pub fn access_type(self) -> AccessType {
        self.info().access_type
    }

    #[inline]
    pub fn ordering(self) -> MemoryOrdering {
        self.info().ordering
    }

    #[inline]
    pub fn update_op(self) -> Option<UpdateOp> {
        self.info().update
    }

    #[inline]
    pub fn is_weak(self) -> bool {
        self.info().weak
    }

    /// Number of element values passed to the mode.
    #[inline]
    pub fn arity(self) -> usize {
        self.access_type().arity()
    }

    /// Result type of the mode for elements of type `element`.
    #[inline]
    pub fn return_type(self, element: ValueType) -> ValueType {
        self.access_type().return_type(element)
    }

    /// Full call signature of the mode for elements of type `element`.
    pub fn access_mode_type(self, element: ValueType) -> AccessModeType {
        let params = [ParamType::View, ParamType::Index]
            .into_iter()
            .chain(std::iter::repeat_n(ParamType::Value(element), self.arity()))
            .collect();
        AccessModeType {
            params,
            result: self.return_type(element),
        }
    }

    /// Returns `true` if the mode may write to the view.
    #[inline]
    pub fn is_mutating(self) -> bool {
        self.access_type() != AccessType::Get
    }

    /// Returns `true` if the mode fails on an index that is not naturally aligned.
    /// Only plain `get` and `set` are exempt.
    #[inline]
    pub fn requires_alignment(self) -> bool {
        !matches!(self, AccessMode::Get | AccessMode::Set)
    }

    /// Returns `true` if the mode is defined for accessors of the given descriptor.
    /// Numeric addition is undefined for floating point elements.
    pub fn is_defined_for(self, descriptor: &AccessDescriptor) -> bool {
        !(self.update_op() == Some(UpdateOp::Add) && descriptor.kind == ElementKind::Float)
    }

    /// Modes of the given access type, in declaration order.
    pub fn of_type(access_type: AccessType) -> impl Iterator<Item = AccessMode> + Clone {
        Self::ALL
            .into_iter()
            .filter(move |m| m.access_type() == access_type)
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccessMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<AccessMode> {
        MODES
            .iter()
            .find(|info| info.name == s)
            .map(|info| info.mode)
            .ok_or_else(|| Error::invalid_arg("mode", format!("unknown access mode '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_order::ByteOrder;

    #[test]
    fn test_access_mode_type() {
        let ty = AccessMode::CompareAndSet.access_mode_type(ValueType::I32);
        assert_eq!(ty.slot_count(), 4);
        assert_eq!(ty.params[2], ParamType::Value(ValueType::I32));
        assert_eq!(ty.to_string(), "(MemoryView, Index, I32, I32) -> Bool");
        assert_eq!(
            AccessMode::Get.access_mode_type(ValueType::F64).to_string(),
            "(MemoryView, Index) -> F64"
        );
        assert_eq!(
            AccessMode::SetRelease.access_mode_type(ValueType::I8).to_string(),
            "(MemoryView, Index, I8) -> Unit"
        );
        for mode in AccessMode::ALL {
            let ty = mode.access_mode_type(ValueType::I16);
            assert_eq!(ty.slot_count(), 2 + mode.arity());
            assert_eq!(ty.result, mode.return_type(ValueType::I16));
        }
    }

    #[test]
    fn test_table_matches_declaration_order() {
        for (i, mode) in AccessMode::ALL.iter().enumerate() {
            assert_eq!(*mode as usize, i);
            assert_eq!(mode.info().mode, *mode);
        }
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in AccessMode::ALL {
            assert_eq!(mode.name().parse::<AccessMode>().unwrap(), mode);
        }
        assert!("getVolatile".parse::<AccessMode>().is_err());
    }

    #[test]
    fn test_mode_families() {
        assert_eq!(AccessMode::of_type(AccessType::Get).count(), 4);
        assert_eq!(AccessMode::of_type(AccessType::Set).count(), 4);
        assert_eq!(AccessMode::of_type(AccessType::CompareAndSet).count(), 5);
        assert_eq!(AccessMode::of_type(AccessType::CompareAndExchange).count(), 3);
        assert_eq!(AccessMode::of_type(AccessType::GetAndUpdate).count(), 15);
        assert_eq!(AccessMode::ALL.iter().filter(|m| m.is_weak()).count(), 4);
    }

    #[test]
    fn test_derived_properties() {
        assert_eq!(AccessMode::Get.arity(), 0);
        assert_eq!(AccessMode::SetOpaque.arity(), 1);
        assert_eq!(AccessMode::CompareAndExchangeAcquire.arity(), 2);
        assert_eq!(AccessMode::GetAndBitwiseXor.arity(), 1);

        assert_eq!(AccessMode::Set.return_type(ValueType::I32), ValueType::Unit);
        assert_eq!(
            AccessMode::WeakCompareAndSet.return_type(ValueType::F64),
            ValueType::Bool
        );
        assert_eq!(AccessMode::GetAndAdd.return_type(ValueType::I16), ValueType::I16);

        assert!(!AccessMode::GetAcquire.is_mutating());
        assert!(AccessMode::CompareAndSet.is_mutating());

        assert!(!AccessMode::Get.requires_alignment());
        assert!(!AccessMode::Set.requires_alignment());
        assert!(AccessMode::WeakCompareAndSetPlain.requires_alignment());
        assert!(AccessMode::GetOpaque.requires_alignment());
    }

    #[test]
    fn test_add_undefined_for_floats() {
        let float = AccessDescriptor::new(8, ElementKind::Float, ByteOrder::BigEndian).unwrap();
        let int = AccessDescriptor::new(8, ElementKind::Integer, ByteOrder::BigEndian).unwrap();
        for mode in AccessMode::ALL {
            assert!(mode.is_defined_for(&int));
            let is_add = mode.update_op() == Some(UpdateOp::Add);
            assert_eq!(mode.is_defined_for(&float), !is_add);
        }
    }

    #[test]
    fn test_orderings() {
        assert_eq!(MemoryOrdering::Acquire.cas(), (Ordering::Acquire, Ordering::Acquire));
        assert_eq!(MemoryOrdering::Release.cas(), (Ordering::Release, Ordering::Relaxed));
        assert_eq!(MemoryOrdering::Volatile.load(), Ordering::SeqCst);
        assert_eq!(MemoryOrdering::Opaque.store(), Ordering::Relaxed);
        assert_eq!(UpdateOp::Add.apply(u64::MAX, 2), 1);
        assert_eq!(UpdateOp::And.apply(0b1100, 0b1010), 0b1000);
    }
}
