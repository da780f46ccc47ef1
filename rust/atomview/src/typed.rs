//! Statically typed facade over [`Accessor`].

use std::marker::PhantomData;

use atomview_common::{Error, Result};

use crate::{
    accessor::Accessor,
    mode::{AccessMode, AccessType},
    value::{Element, Value},
    view::MemoryView,
};

/// An accessor for elements of the Rust type `T`.
///
/// Each method performs the access mode of the same name through
/// [`Accessor::access`], with the same checks and errors.
#[derive(Debug, Clone, Copy)]
pub struct TypedAccessor<T> {
    accessor: Accessor,
    _element: PhantomData<fn() -> T>,
}

impl<T: Element> TypedAccessor<T> {
    pub(crate) fn new(accessor: Accessor) -> TypedAccessor<T> {
        debug_assert_eq!(accessor.value_type(), T::TYPE);
        TypedAccessor {
            accessor,
            _element: PhantomData,
        }
    }

    /// The underlying dynamically typed accessor.
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub fn get(&self, view: &MemoryView, index: i64) -> Result<T> {
        self.get_with(AccessMode::Get, view, index)
    }

    pub fn set(&self, view: &MemoryView, index: i64, value: T) -> Result<()> {
        self.set_with(AccessMode::Set, view, index, value)
    }

    pub fn get_volatile(&self, view: &MemoryView, index: i64) -> Result<T> {
        self.get_with(AccessMode::GetVolatile, view, index)
    }

    pub fn set_volatile(&self, view: &MemoryView, index: i64, value: T) -> Result<()> {
        self.set_with(AccessMode::SetVolatile, view, index, value)
    }

    pub fn get_acquire(&self, view: &MemoryView, index: i64) -> Result<T> {
        self.get_with(AccessMode::GetAcquire, view, index)
    }

    pub fn set_release(&self, view: &MemoryView, index: i64, value: T) -> Result<()> {
        self.set_with(AccessMode::SetRelease, view, index, value)
    }

    pub fn get_opaque(&self, view: &MemoryView, index: i64) -> Result<T> {
        self.get_with(AccessMode::GetOpaque, view, index)
    }

    pub fn set_opaque(&self, view: &MemoryView, index: i64, value: T) -> Result<()> {
        self.set_with(AccessMode::SetOpaque, view, index, value)
    }

    pub fn compare_and_set(&self, view: &MemoryView, index: i64, expected: T, new: T) -> Result<bool> {
        self.compare_and_set_with(AccessMode::CompareAndSet, view, index, expected, new)
    }

    /// Returns the value held before the operation, whether or not it matched.
    pub fn compare_and_exchange(&self, view: &MemoryView, index: i64, expected: T, new: T) -> Result<T> {
        self.exchange_with(AccessMode::CompareAndExchange, view, index, expected, new)
    }

    pub fn compare_and_exchange_acquire(
        &self,
        view: &MemoryView,
        index: i64,
        expected: T,
        new: T,
    ) -> Result<T> {
        self.exchange_with(AccessMode::CompareAndExchangeAcquire, view, index, expected, new)
    }

    pub fn compare_and_exchange_release(
        &self,
        view: &MemoryView,
        index: i64,
        expected: T,
        new: T,
    ) -> Result<T> {
        self.exchange_with(AccessMode::CompareAndExchangeRelease, view, index, expected, new)
    }

    /// May fail spuriously.
    pub fn weak_compare_and_set(&self, view: &MemoryView, index: i64, expected: T, new: T) -> Result<bool> {
        self.compare_and_set_with(AccessMode::WeakCompareAndSet, view, index, expected, new)
    }

    /// May fail spuriously.
    pub fn weak_compare_and_set_plain(
        &self,
        view: &MemoryView,
        index: i64,
        expected: T,
        new: T,
    ) -> Result<bool> {
        self.compare_and_set_with(AccessMode::WeakCompareAndSetPlain, view, index, expected, new)
    }

    /// May fail spuriously.
    pub fn weak_compare_and_set_acquire(
        &self,
        view: &MemoryView,
        index: i64,
        expected: T,
        new: T,
    ) -> Result<bool> {
        self.compare_and_set_with(AccessMode::WeakCompareAndSetAcquire, view, index, expected, new)
    }

    /// May fail spuriously.
    pub fn weak_compare_and_set_release(
        &self,
        view: &MemoryView,
        index: i64,
        expected: T,
        new: T,
    ) -> Result<bool> {
        self.compare_and_set_with(AccessMode::WeakCompareAndSetRelease, view, index, expected, new)
    }

    pub fn get_and_set(&self, view: &MemoryView, index: i64, value: T) -> Result<T> {
        self.get_and_update(AccessMode::GetAndSet, view, index, value)
    }

    pub fn get_and_add(&self, view: &MemoryView, index: i64, value: T) -> Result<T> {
        self.get_and_update(AccessMode::GetAndAdd, view, index, value)
    }

    pub fn get_and_bitwise_or(&self, view: &MemoryView, index: i64, value: T) -> Result<T> {
        self.get_and_update(AccessMode::GetAndBitwiseOr, view, index, value)
    }

    pub fn get_and_bitwise_and(&self, view: &MemoryView, index: i64, value: T) -> Result<T> {
        self.get_and_update(AccessMode::GetAndBitwiseAnd, view, index, value)
    }

    pub fn get_and_bitwise_xor(&self, view: &MemoryView, index: i64, value: T) -> Result<T> {
        self.get_and_update(AccessMode::GetAndBitwiseXor, view, index, value)
    }

    /// Performs any read-modify-write `mode` and returns the previous value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `mode` is not a read-modify-write mode, in
    /// addition to the errors of [`Accessor::access`].
    pub fn get_and_update(&self, mode: AccessMode, view: &MemoryView, index: i64, value: T) -> Result<T> {
        if mode.access_type() != AccessType::GetAndUpdate {
            return Err(Error::invalid_arg(
                "mode",
                format!("{mode} is not a read-modify-write mode"),
            ));
        }
        let prev = self
            .accessor
            .access(mode, view, index, &[value.into_value()])?;
        Self::element(mode, prev)
    }
}

impl<T: Element> TypedAccessor<T> {
    fn get_with(&self, mode: AccessMode, view: &MemoryView, index: i64) -> Result<T> {
        let value = self.accessor.access(mode, view, index, &[])?;
        Self::element(mode, value)
    }

    fn set_with(&self, mode: AccessMode, view: &MemoryView, index: i64, value: T) -> Result<()> {
        self.accessor
            .access(mode, view, index, &[value.into_value()])
            .map(|_| ())
    }

    fn compare_and_set_with(
        &self,
        mode: AccessMode,
        view: &MemoryView,
        index: i64,
        expected: T,
        new: T,
    ) -> Result<bool> {
        let res = self.accessor.access(
            mode,
            view,
            index,
            &[expected.into_value(), new.into_value()],
        )?;
        match res {
            Value::Bool(ok) => Ok(ok),
            other => Err(Error::type_mismatch(
                mode.name(),
                "Bool",
                other.value_type().to_string(),
            )),
        }
    }

    fn exchange_with(
        &self,
        mode: AccessMode,
        view: &MemoryView,
        index: i64,
        expected: T,
        new: T,
    ) -> Result<T> {
        let witness = self.accessor.access(
            mode,
            view,
            index,
            &[expected.into_value(), new.into_value()],
        )?;
        Self::element(mode, witness)
    }

    fn element(mode: AccessMode, value: Value) -> Result<T> {
        T::from_value(value).ok_or_else(|| {
            Error::type_mismatch(
                mode.name(),
                T::TYPE.to_string(),
                value.value_type().to_string(),
            )
        })
    }
}
