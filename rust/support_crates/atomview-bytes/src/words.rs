use std::sync::atomic::{AtomicU64, Ordering};

use atomview_common_traits::memory_owner::{MemoryAllocation, MemoryOwner};

/// A byte region stored as a boxed slice of 64-bit words.
///
/// The words give the region natural 8-byte alignment, and because every word is
/// an `AtomicU64` the memory may legitimately be mutated through shared references.
/// This is the backing store of heap-buffer memory views.
pub struct WordBuffer {
    words: Box<[AtomicU64]>,
    len: usize,
}

impl WordBuffer {
    /// Creates a zero-filled buffer of `len` bytes.
    pub fn zeroed(len: usize) -> WordBuffer {
        let count = len.div_ceil(8);
        let words = (0..count).map(|_| AtomicU64::new(0)).collect();
        WordBuffer { words, len }
    }

    /// Creates a buffer holding a copy of `data`.
    pub fn copy_from_slice(data: &[u8]) -> WordBuffer {
        let buf = WordBuffer::zeroed(data.len());
        for (word, chunk) in buf.words.iter().zip(data.chunks(8)) {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            word.store(bytemuck::cast(bytes), Ordering::Relaxed);
        }
        buf
    }

    /// Returns the length of the buffer in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of bytes held by the word storage (a multiple of 8).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len() * 8
    }

    // Non-null and 8-aligned even when empty.
    #[inline]
    fn as_mut_ptr(&self) -> *mut u8 {
        self.words.as_ptr() as *mut u8
    }
}

unsafe impl MemoryOwner for WordBuffer {
    fn memory(&self) -> MemoryAllocation {
        MemoryAllocation {
            ptr: self.as_mut_ptr(),
            len: self.len,
            capacity: self.capacity(),
            alignment: std::mem::align_of::<AtomicU64>(),
        }
    }
}

impl std::fmt::Debug for WordBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordBuffer")
            .field("len", &self.len)
            .field("words", &self.words.len())
            .finish()
    }
}
