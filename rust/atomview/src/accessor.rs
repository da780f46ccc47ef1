//! The accessor: every access mode for one element shape.

use atomview_common::{Error, Result};

use crate::{
    atomic::{self, AtomicSlot},
    byte_order::{ByteOrder, swap_bytes, width_mask},
    descriptor::AccessDescriptor,
    mode::{AccessMode, AccessModeType, AccessType, MemoryOrdering, UpdateOp},
    policy,
    value::{ElementKind, Value, ValueType},
    view::MemoryView,
};

/// Reads and writes elements of one `(width, kind, byte order)` shape in any
/// memory view.
///
/// Accessors are immutable values; a single accessor may be used with any number
/// of views, from any number of threads.
///
/// Every access of an aligned element, plain ones included, is a single atomic
/// operation of the element width. Plain access of a misaligned element is a
/// sequence of single-byte atomic operations. Racing accesses of different
/// widths to overlapping bytes are not supported: this includes mixing
/// accessors of different widths on the same bytes, and misaligned plain access
/// racing with any access to the elements it overlaps.
///
/// Every call is checked before memory is touched, and the first failing check
/// determines the error:
///
/// 1. `UnsupportedOperation` if the mode is not defined for the descriptor,
///    `ArityMismatch` for a wrong number of values, `TypeMismatch` for a value of
///    the wrong type.
/// 2. `IndexOutOfRange` if the element does not lie within the view.
/// 3. `UnsupportedOperation` for a mutating mode on a read-only view.
/// 4. `Misaligned` if the mode requires natural alignment and the element is
///    not aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accessor {
    descriptor: AccessDescriptor,
}

impl Accessor {
    /// Creates an accessor for a validated descriptor.
    pub(crate) fn new(descriptor: AccessDescriptor) -> Accessor {
        Accessor { descriptor }
    }

    #[inline]
    pub fn descriptor(&self) -> AccessDescriptor {
        self.descriptor
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.descriptor.width
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.descriptor.kind
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.descriptor.byte_order
    }

    /// Element type read and written by the accessor.
    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.descriptor.value_type()
    }

    /// Call signature of `mode` on this accessor's element type.
    #[inline]
    pub fn access_mode_type(&self, mode: AccessMode) -> AccessModeType {
        mode.access_mode_type(self.value_type())
    }

    /// Returns `true` if the mode is defined for this accessor.
    #[inline]
    pub fn supports(&self, mode: AccessMode) -> bool {
        mode.is_defined_for(&self.descriptor)
    }

    /// Performs `mode` on the element at byte `index` of `view`.
    ///
    /// `args` holds the mode's element values: none for gets, the new value for
    /// sets, `[expected, new]` for compare-and-set and compare-and-exchange, and
    /// the operand for read-modify-write modes.
    ///
    /// Returns the element read for gets, `Unit` for sets, `Bool` for
    /// compare-and-set, and the value held before the operation for
    /// compare-and-exchange and read-modify-write modes.
    pub fn access(
        &self,
        mode: AccessMode,
        view: &MemoryView,
        index: i64,
        args: &[Value],
    ) -> Result<Value> {
        self.check_signature(mode, args)?;
        let offset = self.check_target(mode, view, index)?;
        Ok(self.execute(mode, view, offset, args))
    }

    /// Fails with `UnsupportedOperation` if the mode is not defined for this
    /// accessor.
    pub fn check_mode(&self, mode: AccessMode) -> Result<()> {
        if self.supports(mode) {
            Ok(())
        } else {
            Err(Error::unsupported(
                mode.name(),
                format!("not defined for {} elements", self.value_type()),
            ))
        }
    }

    /// Checks the mode and the number and types of the values passed to it.
    pub fn check_signature(&self, mode: AccessMode, args: &[Value]) -> Result<()> {
        self.check_mode(mode)?;
        if args.len() != mode.arity() {
            return Err(Error::arity_mismatch(mode.name(), mode.arity(), args.len()));
        }
        let ty = self.value_type();
        for (i, arg) in args.iter().enumerate() {
            if arg.value_type() != ty {
                return Err(Error::type_mismatch(
                    format!("{mode} value {i}"),
                    ty.to_string(),
                    arg.value_type().to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Checks bounds, mutability and alignment of the element at `index`, in
    /// that order, and returns its byte offset.
    pub fn check_target(&self, mode: AccessMode, view: &MemoryView, index: i64) -> Result<usize> {
        let width = self.width();
        let offset = policy::check_index(index, view.capacity(), width)?;
        if mode.is_mutating() && view.is_read_only() {
            return Err(Error::unsupported(
                mode.name(),
                "the memory view is read-only",
            ));
        }
        if mode.requires_alignment() {
            policy::check_alignment(offset, view.alignment_origin(), width)?;
        }
        Ok(offset)
    }
}

impl Accessor {
    fn execute(&self, mode: AccessMode, view: &MemoryView, offset: usize, args: &[Value]) -> Value {
        let info = mode.info();
        let operand = |i: usize| args[i].to_bits().unwrap_or_default();

        let aligned = policy::is_aligned(offset as i64, view.alignment_origin(), self.width());
        if info.ordering == MemoryOrdering::Plain && !info.weak && !aligned {
            let bytes = &view.bytes()[offset..offset + self.width()];
            return match info.access_type {
                AccessType::Get => self.value(atomic::load_plain(bytes, self.byte_order())),
                AccessType::Set => {
                    atomic::store_plain(bytes, self.byte_order(), operand(0));
                    Value::Unit
                }
                _ => unreachable!("{mode} is not a plain access"),
            };
        }

        let slot = AtomicSlot::new(view, offset, self.width());
        let ordering = info.ordering;
        match info.access_type {
            AccessType::Get => self.value(self.from_memory(slot.load(ordering.load()))),
            AccessType::Set => {
                slot.store(self.to_memory(operand(0)), ordering.store());
                Value::Unit
            }
            AccessType::CompareAndSet => {
                let res = slot.compare_exchange(
                    self.to_memory(operand(0)),
                    self.to_memory(operand(1)),
                    ordering.cas(),
                    info.weak,
                );
                Value::Bool(res.is_ok())
            }
            AccessType::CompareAndExchange => {
                let res = slot.compare_exchange(
                    self.to_memory(operand(0)),
                    self.to_memory(operand(1)),
                    ordering.cas(),
                    false,
                );
                let (Ok(witness) | Err(witness)) = res;
                self.value(self.from_memory(witness))
            }
            AccessType::GetAndUpdate => {
                let op = info
                    .update
                    .unwrap_or_else(|| unreachable!("{mode} has no update operator"));
                let prev = self.get_and_update(&slot, op, operand(0), ordering);
                self.value(self.from_memory(prev))
            }
        }
    }

    /// Returns the previous memory word.
    fn get_and_update(
        &self,
        slot: &AtomicSlot,
        op: UpdateOp,
        operand: u64,
        ordering: MemoryOrdering,
    ) -> u64 {
        if op.is_bitwise() || !self.descriptor.needs_swap() {
            // Byte swapping commutes with bitwise operators, and native order
            // addition maps directly onto the hardware instruction.
            slot.fetch_op(op, self.to_memory(operand), ordering.rmw())
        } else {
            let mask = width_mask(self.width());
            slot.fetch_update(ordering.rmw(), |word| {
                let current = self.from_memory(word);
                self.to_memory(op.apply(current, operand) & mask)
            })
        }
    }

    /// Converts logical element bits to the word stored in memory.
    #[inline]
    fn to_memory(&self, bits: u64) -> u64 {
        let bits = bits & width_mask(self.width());
        if self.descriptor.needs_swap() {
            swap_bytes(bits, self.width())
        } else {
            bits
        }
    }

    #[inline]
    fn from_memory(&self, word: u64) -> u64 {
        self.to_memory(word)
    }

    #[inline]
    fn value(&self, bits: u64) -> Value {
        Value::from_bits(self.value_type(), bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        factory::AccessorFactory,
        storage::{StorageKind, StorageProvider},
    };
    use atomview_common::ErrorClass;

    fn accessor(ty: ValueType, order: ByteOrder) -> Accessor {
        AccessorFactory::build(ty.width().unwrap(), ty.kind().unwrap(), order).unwrap()
    }

    fn view(capacity: usize) -> MemoryView {
        StorageKind::HeapArray.allocate(capacity).unwrap()
    }

    #[test]
    fn test_get_set_all_orderings() {
        let view = view(16);
        for order in ByteOrder::ALL {
            let acc = accessor(ValueType::I32, order);
            for (set, get) in [
                (AccessMode::Set, AccessMode::Get),
                (AccessMode::SetVolatile, AccessMode::GetVolatile),
                (AccessMode::SetRelease, AccessMode::GetAcquire),
                (AccessMode::SetOpaque, AccessMode::GetOpaque),
            ] {
                let v = Value::I32(0x0102_0304);
                assert_eq!(acc.access(set, &view, 4, &[v]).unwrap(), Value::Unit);
                assert_eq!(acc.access(get, &view, 4, &[]).unwrap(), v);
            }
            let expected = match order {
                ByteOrder::BigEndian => [1, 2, 3, 4],
                ByteOrder::LittleEndian => [4, 3, 2, 1],
            };
            assert_eq!(&view.snapshot()[4..8], &expected);
        }
    }

    #[test]
    fn test_plain_access_at_misaligned_index() {
        let view = view(16);
        let acc = accessor(ValueType::I64, ByteOrder::BigEndian);
        let v = Value::I64(0x0102_0304_0506_0708);
        acc.access(AccessMode::Set, &view, 3, &[v]).unwrap();
        assert_eq!(acc.access(AccessMode::Get, &view, 3, &[]).unwrap(), v);
        assert_eq!(&view.snapshot()[3..11], &[1, 2, 3, 4, 5, 6, 7, 8]);

        let e = acc.access(AccessMode::GetOpaque, &view, 3, &[]).unwrap_err();
        assert_eq!(e.class(), ErrorClass::Misaligned);
    }

    #[test]
    fn test_compare_and_set() {
        let view = view(8);
        for order in ByteOrder::ALL {
            let acc = accessor(ValueType::I16, order);
            acc.access(AccessMode::Set, &view, 2, &[Value::I16(1)]).unwrap();

            let ok = acc
                .access(AccessMode::CompareAndSet, &view, 2, &[Value::I16(1), Value::I16(2)])
                .unwrap();
            assert_eq!(ok, Value::Bool(true));
            let failed = acc
                .access(AccessMode::CompareAndSet, &view, 2, &[Value::I16(1), Value::I16(3)])
                .unwrap();
            assert_eq!(failed, Value::Bool(false));
            assert_eq!(acc.access(AccessMode::Get, &view, 2, &[]).unwrap(), Value::I16(2));
        }
    }

    #[test]
    fn test_compare_and_exchange_returns_witness() {
        let view = view(8);
        let acc = accessor(ValueType::I64, ByteOrder::native().reversed());
        acc.access(AccessMode::Set, &view, 0, &[Value::I64(10)]).unwrap();
        for mode in [
            AccessMode::CompareAndExchange,
            AccessMode::CompareAndExchangeAcquire,
            AccessMode::CompareAndExchangeRelease,
        ] {
            let current = acc.access(AccessMode::Get, &view, 0, &[]).unwrap();
            let Value::I64(c) = current else { panic!() };
            let witness = acc
                .access(mode, &view, 0, &[Value::I64(c), Value::I64(c + 1)])
                .unwrap();
            assert_eq!(witness, Value::I64(c));
            let witness = acc
                .access(mode, &view, 0, &[Value::I64(-1), Value::I64(0)])
                .unwrap();
            assert_eq!(witness, Value::I64(c + 1));
        }
        assert_eq!(acc.access(AccessMode::Get, &view, 0, &[]).unwrap(), Value::I64(13));
    }

    #[test]
    fn test_weak_compare_and_set_eventually_succeeds() {
        let view = view(8);
        let acc = accessor(ValueType::I32, ByteOrder::LittleEndian);
        for (i, mode) in [
            AccessMode::WeakCompareAndSetPlain,
            AccessMode::WeakCompareAndSet,
            AccessMode::WeakCompareAndSetAcquire,
            AccessMode::WeakCompareAndSetRelease,
        ]
        .into_iter()
        .enumerate()
        {
            let (from, to) = (Value::I32(i as i32), Value::I32(i as i32 + 1));
            let succeeded = (0..10).any(|_| {
                acc.access(mode, &view, 4, &[from, to]).unwrap() == Value::Bool(true)
            });
            assert!(succeeded, "{mode}");
        }
        assert_eq!(acc.access(AccessMode::Get, &view, 4, &[]).unwrap(), Value::I32(4));
    }

    #[test]
    fn test_get_and_add_wraps_in_both_orders() {
        let view = view(8);
        for order in ByteOrder::ALL {
            for ty in [ValueType::I8, ValueType::I16, ValueType::I32, ValueType::I64] {
                let acc = accessor(ty, order);
                let max = Value::from_bits(ty, width_mask(acc.width()) >> 1);
                let one = Value::from_bits(ty, 1);
                acc.access(AccessMode::Set, &view, 0, &[max]).unwrap();
                for mode in [
                    AccessMode::GetAndAdd,
                    AccessMode::GetAndAddAcquire,
                    AccessMode::GetAndAddRelease,
                ] {
                    acc.access(AccessMode::Set, &view, 0, &[max]).unwrap();
                    assert_eq!(acc.access(mode, &view, 0, &[one]).unwrap(), max);
                    let min = Value::from_bits(ty, (width_mask(acc.width()) >> 1) + 1);
                    assert_eq!(acc.access(AccessMode::Get, &view, 0, &[]).unwrap(), min);
                }
            }
        }
    }

    #[test]
    fn test_bitwise_updates() {
        let view = view(8);
        for order in ByteOrder::ALL {
            let acc = accessor(ValueType::I32, order);
            let set = |v: i32| acc.access(AccessMode::Set, &view, 0, &[Value::I32(v)]).unwrap();
            let get = || acc.access(AccessMode::Get, &view, 0, &[]).unwrap();

            set(0x0f0f_0000);
            let prev = acc
                .access(AccessMode::GetAndBitwiseOr, &view, 0, &[Value::I32(0x00ff)])
                .unwrap();
            assert_eq!(prev, Value::I32(0x0f0f_0000));
            assert_eq!(get(), Value::I32(0x0f0f_00ff));

            acc.access(AccessMode::GetAndBitwiseAndAcquire, &view, 0, &[Value::I32(0x0ff0_00f0)])
                .unwrap();
            assert_eq!(get(), Value::I32(0x0f00_00f0));

            acc.access(AccessMode::GetAndBitwiseXorRelease, &view, 0, &[Value::I32(-1)])
                .unwrap();
            assert_eq!(get(), Value::I32(!0x0f00_00f0));

            let prev = acc
                .access(AccessMode::GetAndSetAcquire, &view, 0, &[Value::I32(5)])
                .unwrap();
            assert_eq!(prev, Value::I32(!0x0f00_00f0));
            assert_eq!(get(), Value::I32(5));
        }
    }

    #[test]
    fn test_float_cas_uses_bit_identity() {
        let view = view(16);
        let acc = accessor(ValueType::F64, ByteOrder::BigEndian);
        acc.access(AccessMode::Set, &view, 8, &[Value::F64(f64::NAN)]).unwrap();
        let ok = acc
            .access(
                AccessMode::CompareAndSet,
                &view,
                8,
                &[Value::F64(f64::NAN), Value::F64(1.0)],
            )
            .unwrap();
        assert_eq!(ok, Value::Bool(true));

        acc.access(AccessMode::Set, &view, 8, &[Value::F64(0.0)]).unwrap();
        let ok = acc
            .access(
                AccessMode::CompareAndSet,
                &view,
                8,
                &[Value::F64(-0.0), Value::F64(1.0)],
            )
            .unwrap();
        assert_eq!(ok, Value::Bool(false));
    }

    #[test]
    fn test_float_bitwise_and_add() {
        let view = view(8);
        let acc = accessor(ValueType::F32, ByteOrder::LittleEndian);
        acc.access(AccessMode::Set, &view, 0, &[Value::F32(1.5)]).unwrap();
        let prev = acc
            .access(AccessMode::GetAndBitwiseXor, &view, 0, &[Value::F32(-0.0)])
            .unwrap();
        assert_eq!(prev, Value::F32(1.5));
        assert_eq!(acc.access(AccessMode::Get, &view, 0, &[]).unwrap(), Value::F32(-1.5));

        let e = acc
            .access(AccessMode::GetAndAdd, &view, 0, &[Value::F32(1.0)])
            .unwrap_err();
        assert_eq!(e.class(), ErrorClass::UnsupportedOperation);
        assert!(!acc.supports(AccessMode::GetAndAddRelease));
    }

    #[test]
    fn test_signature_errors() {
        let view = view(8);
        let acc = accessor(ValueType::I16, ByteOrder::BigEndian);
        let e = acc.access(AccessMode::Get, &view, 0, &[Value::I16(1)]).unwrap_err();
        assert_eq!(e.class(), ErrorClass::ArityMismatch);
        let e = acc.access(AccessMode::CompareAndSet, &view, 0, &[Value::I16(1)]).unwrap_err();
        assert_eq!(e.class(), ErrorClass::ArityMismatch);
        let e = acc.access(AccessMode::Set, &view, 0, &[Value::I32(1)]).unwrap_err();
        assert_eq!(e.class(), ErrorClass::TypeMismatch);
        let e = acc
            .access(AccessMode::CompareAndExchange, &view, 0, &[Value::I16(1), Value::Bool(true)])
            .unwrap_err();
        assert_eq!(e.class(), ErrorClass::TypeMismatch);
    }

    #[test]
    fn test_error_priority() {
        let rw = view(16);
        let ro = rw.slice(1, 15).unwrap().as_read_only();
        let acc = accessor(ValueType::I64, ByteOrder::BigEndian);
        let v = Value::I64(1);

        // Type errors win over bounds errors.
        let e = acc.access(AccessMode::Set, &ro, 100, &[Value::I8(1)]).unwrap_err();
        assert_eq!(e.class(), ErrorClass::TypeMismatch);
        // Bounds errors win over mutability errors.
        let e = acc.access(AccessMode::SetVolatile, &ro, 8, &[v]).unwrap_err();
        assert_eq!(e.class(), ErrorClass::IndexOutOfRange);
        // Mutability errors win over alignment errors.
        let e = acc.access(AccessMode::SetVolatile, &ro, 0, &[v]).unwrap_err();
        assert_eq!(e.class(), ErrorClass::UnsupportedOperation);
        // Aligned index of the slice is 7.
        let e = acc.access(AccessMode::GetVolatile, &ro, 0, &[]).unwrap_err();
        assert_eq!(e.class(), ErrorClass::Misaligned);
        assert!(acc.access(AccessMode::GetVolatile, &ro, 7, &[]).is_ok());
        assert!(acc.access(AccessMode::Get, &ro, 0, &[]).is_ok());
        assert!(rw.snapshot().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_negative_index() {
        let view = view(8);
        let acc = accessor(ValueType::I8, ByteOrder::BigEndian);
        let e = acc.access(AccessMode::Get, &view, -1, &[]).unwrap_err();
        assert!(matches!(
            e.kind(),
            atomview_common::ErrorKind::IndexOutOfRange { index: -1, capacity: 8, width: 1 }
        ));
    }
}
