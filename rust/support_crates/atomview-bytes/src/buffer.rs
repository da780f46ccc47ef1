use crate::align::align_up;

/// A fixed-length byte block whose first byte is aligned to a power-of-two
/// boundary. This is the backing store of heap-array memory views.
///
/// The block is carved out of an over-allocated `Vec<u8>`; the bytes in front of
/// the aligned start are padding. Even an empty block owns an allocation, so
/// [`AlignedByteVec::as_ptr`] is always aligned.
pub struct AlignedByteVec {
    inner: Vec<u8>,
    /// Offset of the aligned data within `inner`.
    start: usize,
    len: usize,
    alignment: usize,
}

impl AlignedByteVec {
    /// Default alignment in bytes.
    pub const ALIGNMENT: usize = 128;

    /// Creates a zero-filled block of `len` bytes with the default alignment.
    pub fn zeroed(len: usize) -> AlignedByteVec {
        Self::zeroed_with_alignment(len, Self::ALIGNMENT)
    }

    /// Creates a zero-filled block of `len` bytes aligned to `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two, or if the padded size
    /// overflows `usize`.
    pub fn zeroed_with_alignment(len: usize, alignment: usize) -> AlignedByteVec {
        assert!(alignment.is_power_of_two());
        let padded = len
            .max(1)
            .checked_add(alignment - 1)
            .expect("aligned block size overflows");
        let inner = vec![0u8; padded];
        let p = inner.as_ptr() as usize;
        let start = align_up(p, alignment) - p;
        AlignedByteVec {
            inner,
            start,
            len,
            alignment,
        }
    }

    /// Creates a block holding a copy of `data`, with the default alignment.
    pub fn copy_from_slice(data: &[u8]) -> AlignedByteVec {
        let mut block = Self::zeroed(data.len());
        block.as_mut_slice().copy_from_slice(data);
        block
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner[self.start..self.start + self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.inner[self.start..self.start + self.len]
    }

    /// Consumes the block, returning the padded vector and the offset at which
    /// the aligned data starts within it.
    pub fn into_vec(self) -> (Vec<u8>, usize) {
        (self.inner, self.start)
    }
}

impl std::ops::Deref for AlignedByteVec {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl std::ops::DerefMut for AlignedByteVec {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl Clone for AlignedByteVec {
    fn clone(&self) -> AlignedByteVec {
        let mut block = Self::zeroed_with_alignment(self.len, self.alignment);
        block.as_mut_slice().copy_from_slice(self.as_slice());
        block
    }
}

impl std::fmt::Debug for AlignedByteVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedByteVec")
            .field("len", &self.len)
            .field("alignment", &self.alignment)
            .field("padding", &self.start)
            .finish_non_exhaustive()
    }
}
