use atomview_common::{Error, Result};

use crate::{
    byte_order::ByteOrder,
    value::{ElementKind, ValueType},
};

/// Shape of the elements an accessor reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessDescriptor {
    /// Element width in bytes: 1, 2, 4 or 8.
    pub width: usize,
    pub kind: ElementKind,
    /// Byte order of elements in memory.
    pub byte_order: ByteOrder,
}

impl AccessDescriptor {
    /// Creates a validated descriptor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if the width is not 1, 2, 4 or 8, or if a
    /// floating point element is not 4 or 8 bytes wide.
    pub fn new(width: usize, kind: ElementKind, byte_order: ByteOrder) -> Result<AccessDescriptor> {
        let descriptor = AccessDescriptor {
            width,
            kind,
            byte_order,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Creates the descriptor for elements of the given type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` for `Bool` and `Unit`.
    pub fn for_type(ty: ValueType, byte_order: ByteOrder) -> Result<AccessDescriptor> {
        match (ty.width(), ty.kind()) {
            (Some(width), Some(kind)) => AccessDescriptor::new(width, kind, byte_order),
            _ => Err(Error::invalid_descriptor(format!(
                "{ty} is not an element type"
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.width, 1 | 2 | 4 | 8) {
            return Err(Error::invalid_descriptor(format!(
                "element width must be 1, 2, 4 or 8 bytes, got {}",
                self.width
            )));
        }
        if self.kind == ElementKind::Float && !matches!(self.width, 4 | 8) {
            return Err(Error::invalid_descriptor(format!(
                "floating point elements must be 4 or 8 bytes wide, got {}",
                self.width
            )));
        }
        Ok(())
    }

    /// Element type of a valid descriptor.
    pub fn value_type(&self) -> ValueType {
        ValueType::element(self.kind, self.width)
            .unwrap_or_else(|| panic!("invalid access descriptor {self:?}"))
    }

    /// Returns `true` if elements have to be byte-swapped between the
    /// descriptor's order and the platform order.
    #[inline]
    pub fn needs_swap(&self) -> bool {
        self.width > 1 && !self.byte_order.is_native()
    }
}

impl std::fmt::Display for AccessDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match ValueType::element(self.kind, self.width) {
            Some(ty) => write!(f, "{ty}/{}", self.byte_order),
            None => write!(f, "{:?}{}/{}", self.kind, self.width * 8, self.byte_order),
        }
    }
}
