//! Backing storage for memory views.

use std::sync::Arc;

use atomview_bytes::{SharedRegion, WordBuffer};
use atomview_common::{Error, Result};
use atomview_page_alloc::mmap_buffer::MmapBuffer;

use crate::{byte_order::ByteOrder, view::MemoryView};

/// Allocates zero-filled memory views.
pub trait StorageProvider {
    /// Allocates a read-write view of `capacity` bytes with alignment origin 0
    /// and the native byte order.
    fn allocate(&self, capacity: usize) -> Result<MemoryView>;

    /// Byte order of the platform the storage lives on.
    fn native_byte_order(&self) -> ByteOrder {
        ByteOrder::native()
    }
}

/// The kinds of storage a memory view can be backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKind {
    /// A heap byte array (`AlignedByteVec`).
    HeapArray,
    /// A heap buffer of 64-bit words (`WordBuffer`).
    HeapBuffer,
    /// Page-mapped memory outside the Rust heap (`MmapBuffer`).
    OffHeap,
}

impl StorageKind {
    pub const ALL: [StorageKind; 3] = [
        StorageKind::HeapArray,
        StorageKind::HeapBuffer,
        StorageKind::OffHeap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StorageKind::HeapArray => "heap-array",
            StorageKind::HeapBuffer => "heap-buffer",
            StorageKind::OffHeap => "off-heap",
        }
    }

    fn allocate_region(self, capacity: usize) -> Result<SharedRegion> {
        let region = match self {
            StorageKind::HeapArray => SharedRegion::zeroed(capacity),
            StorageKind::HeapBuffer => {
                SharedRegion::from_owner(Arc::new(WordBuffer::zeroed(capacity)))
            }
            StorageKind::OffHeap => {
                let buffer = MmapBuffer::allocate(capacity).map_err(|e| {
                    Error::io(format!("off-heap allocation of {capacity} bytes"), e)
                })?;
                SharedRegion::from_owner(Arc::new(buffer))
            }
        };
        Ok(region)
    }
}

impl StorageProvider for StorageKind {
    fn allocate(&self, capacity: usize) -> Result<MemoryView> {
        let region = self.allocate_region(capacity)?;
        log::trace!("allocated {capacity} bytes of {self} storage at {:p}", region.as_ptr());
        Ok(MemoryView::new(region, *self))
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
