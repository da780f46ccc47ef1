use atomview::{ByteOrder, MemoryView, Mutability, StorageKind, StorageProvider, ViewDescriptor};
use atomview_common::Result;

use crate::oracle;

/// A memory view under test, together with the read-write view of the same
/// bytes used to reset its contents.
#[derive(Debug, Clone)]
pub struct Fixture {
    view: MemoryView,
    source: MemoryView,
}

impl Fixture {
    /// Allocates `capacity + offset` bytes of `kind` storage and slices the view
    /// under test out of it at `offset`.
    pub fn new(
        kind: StorageKind,
        byte_order: ByteOrder,
        offset: usize,
        mutability: Mutability,
        capacity: usize,
    ) -> Result<Fixture> {
        let source = kind
            .allocate(capacity + offset)?
            .slice(offset, capacity)?
            .with_byte_order(byte_order);
        let view = match mutability {
            Mutability::ReadWrite => source.clone(),
            Mutability::ReadOnly => source.as_read_only(),
        };
        Ok(Fixture { view, source })
    }

    /// The view under test.
    #[inline]
    pub fn view(&self) -> &MemoryView {
        &self.view
    }

    #[inline]
    pub fn descriptor(&self) -> ViewDescriptor {
        self.view.descriptor()
    }

    /// Resets the view to the canonical pattern for elements of `width` bytes.
    pub fn refill(&self, width: usize) -> Result<()> {
        self.source.fill_with(|p| oracle::fill_byte(width, p))
    }
}
