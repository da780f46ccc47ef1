//! Off-heap memory buffer backed by memory-mapped pages.
//!
//! `MmapBuffer` is the owner of the memory behind off-heap memory views. The
//! mapping is page-aligned and zero-filled on allocation, and it is released when
//! the buffer is dropped.
//!
//! # Safety
//!
//! While `MmapBuffer` implements `Send` and `Sync`, the memory it hands out
//! through [`MemoryOwner`] must only be accessed through atomic operations once
//! the buffer is shared between threads.

use atomview_common_traits::memory_owner::{MemoryAllocation, MemoryOwner};

use crate::mmap;

/// A page-mapped memory region.
pub struct MmapBuffer {
    /// Raw pointer to the mapped region.
    ptr: *mut u8,
    /// The requested size of the buffer in bytes.
    len: usize,
    /// The mapped capacity, rounded up to whole pages.
    capacity: usize,
    /// Buffer alignment (the page size used for the mapping).
    alignment: usize,
}

impl MmapBuffer {
    /// Returns the size of a regular memory page on the current system.
    pub fn page_size() -> usize {
        mmap::get_page_size()
    }

    /// Maps a zero-filled buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the system cannot map the requested memory.
    pub fn allocate(size: usize) -> std::io::Result<MmapBuffer> {
        let (ptr, capacity) = mmap::allocate(size)?;
        assert!((ptr as usize).is_multiple_of(Self::page_size()));
        Ok(MmapBuffer {
            ptr: ptr as _,
            len: size,
            capacity,
            alignment: mmap::get_page_size(),
        })
    }

    /// Returns the length of the buffer in bytes, as requested at allocation.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has a length of 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the mapped capacity in bytes (a whole number of pages).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a raw pointer to the beginning of the mapping.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - The pointer is not used after the `MmapBuffer` is dropped
    /// - Any access to the memory region is within bounds (0..len)
    /// - Concurrent access goes through atomic operations
    #[inline]
    pub fn ptr(&self) -> *mut u8 {
        self.ptr
    }

    /// Returns the alignment of the buffer in bytes (the page size).
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }
}

unsafe impl MemoryOwner for MmapBuffer {
    fn memory(&self) -> MemoryAllocation {
        MemoryAllocation {
            ptr: self.ptr,
            len: self.len,
            capacity: self.capacity,
            alignment: self.alignment,
        }
    }
}

impl Drop for MmapBuffer {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            let _ = unsafe { mmap::free(self.ptr as _, self.capacity) };
        }
    }
}

// SAFETY: MmapBuffer owns the mapping and unmaps it on drop.
unsafe impl Send for MmapBuffer {}

// SAFETY: shared access to the mapping is restricted to atomic operations by the
// `MemoryOwner` contract.
unsafe impl Sync for MmapBuffer {}

impl std::fmt::Debug for MmapBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}
