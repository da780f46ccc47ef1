use atomview_common::{Error, Result};

use crate::{
    accessor::Accessor,
    byte_order::ByteOrder,
    descriptor::AccessDescriptor,
    mode::AccessMode,
    typed::TypedAccessor,
    value::{Element, ElementKind, ValueType},
};

/// Builds accessors for element shapes.
pub struct AccessorFactory;

impl AccessorFactory {
    /// Builds an accessor for elements of `width` bytes of the given kind, laid
    /// out in memory in `byte_order`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` for a width other than 1, 2, 4 or 8, or a
    /// floating point width other than 4 or 8.
    pub fn build(width: usize, kind: ElementKind, byte_order: ByteOrder) -> Result<Accessor> {
        let descriptor = AccessDescriptor::new(width, kind, byte_order)?;
        Ok(Accessor::new(descriptor))
    }

    /// Builds an accessor that must support every mode in `required`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if the descriptor is invalid or one of the
    /// required modes is not defined for it.
    pub fn build_with_modes(
        descriptor: AccessDescriptor,
        required: &[AccessMode],
    ) -> Result<Accessor> {
        descriptor.validate()?;
        if let Some(mode) = required.iter().find(|m| !m.is_defined_for(&descriptor)) {
            return Err(Error::invalid_descriptor(format!(
                "{mode} is not supported by {descriptor}"
            )));
        }
        Ok(Accessor::new(descriptor))
    }

    /// Builds a statically typed accessor for elements of type `T`.
    pub fn typed<T: Element>(byte_order: ByteOrder) -> TypedAccessor<T> {
        let descriptor = AccessDescriptor::for_type(T::TYPE, byte_order)
            .unwrap_or_else(|e| unreachable!("{} is an element type: {e}", T::TYPE));
        assert_eq!(descriptor.width, std::mem::size_of::<T>());
        TypedAccessor::new(Accessor::new(descriptor))
    }

    /// Every valid descriptor: element types in the order i8, i16, i32, i64,
    /// f32, f64, each in big-endian and then little-endian order.
    pub fn descriptors() -> impl Iterator<Item = AccessDescriptor> {
        const TYPES: [ValueType; 6] = [
            ValueType::I8,
            ValueType::I16,
            ValueType::I32,
            ValueType::I64,
            ValueType::F32,
            ValueType::F64,
        ];
        TYPES.into_iter().flat_map(|ty| {
            ByteOrder::ALL.into_iter().filter_map(move |order| {
                AccessDescriptor::for_type(ty, order).ok()
            })
        })
    }
}
