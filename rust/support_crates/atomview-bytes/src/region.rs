use std::{
    mem::ManuallyDrop,
    ops::{Range, RangeBounds},
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
};

use atomview_common_traits::memory_owner::{MemoryAllocation, MemoryOwner};

use crate::{align::is_aligned_ptr, buffer::AlignedByteVec};

/// `SharedRegion` represents a contiguous memory region with shared ownership
/// semantics and interior, atomic-only mutability.
///
/// Regions can be sliced and cloned without copying the underlying data; every
/// clone and slice refers to the same memory, which stays alive until the last
/// region referencing it is dropped. The underlying memory is at least 8-byte
/// aligned, so the alignment of any region address is fully determined by the
/// slice offset modulo 8.
///
/// All access to the memory goes through atomic operations, either via
/// [`SharedRegion::bytes`] or via the raw pointer and the atomic types' `from_ptr`
/// constructors, which is what makes concurrent use sound.
#[derive(Clone)]
pub struct SharedRegion {
    ptr: *mut u8,
    len: usize,
    owner: RegionOwner,
}

unsafe impl Send for SharedRegion {}

unsafe impl Sync for SharedRegion {}

impl SharedRegion {
    /// Minimal alignment of any region's backing memory.
    pub const MIN_ALIGNMENT: usize = 8;

    /// Creates a new region that takes ownership of the provided `AlignedByteVec`.
    ///
    /// # Panics
    ///
    /// Panics if the vector was created with an alignment below [`Self::MIN_ALIGNMENT`].
    pub fn from_byte_vec(vec: AlignedByteVec) -> SharedRegion {
        assert!(vec.alignment() >= Self::MIN_ALIGNMENT);
        let heap = Arc::new(HeapBytes::from_byte_vec(vec));
        SharedRegion {
            ptr: heap.ptr,
            len: heap.len,
            owner: RegionOwner::Heap(heap),
        }
    }

    /// Creates a new region from any type implementing `MemoryOwner`.
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - The memory is not aligned to [`Self::MIN_ALIGNMENT`]
    /// - The capacity is less than the length
    pub fn from_owner(owner: Arc<dyn MemoryOwner + Send + Sync + 'static>) -> SharedRegion {
        let MemoryAllocation {
            ptr,
            len,
            capacity,
            alignment,
        } = owner.memory();
        assert!(alignment >= Self::MIN_ALIGNMENT);
        assert!(is_aligned_ptr(ptr, Self::MIN_ALIGNMENT));
        assert!(capacity >= len);
        SharedRegion {
            ptr,
            len,
            owner: RegionOwner::External(owner),
        }
    }

    /// Creates a new heap region of the specified length, initialized with zero bytes.
    pub fn zeroed(len: usize) -> SharedRegion {
        Self::from_byte_vec(AlignedByteVec::zeroed(len))
    }

    /// Creates a new heap region containing a copy of the provided slice.
    pub fn copy_from_slice(data: &[u8]) -> SharedRegion {
        Self::from_byte_vec(AlignedByteVec::copy_from_slice(data))
    }

    /// Returns the length of the region.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the region is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the address of the first byte of the region.
    ///
    /// The pointer is valid for atomic reads and writes of `len()` bytes for as long
    /// as this region (or any clone of it) is alive.
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr
    }

    /// Returns the region as a slice of atomic bytes.
    #[inline]
    pub fn bytes(&self) -> &[AtomicU8] {
        // SAFETY: `AtomicU8` has the same size and alignment as `u8`, and the memory
        // is valid for `len` bytes while `self` keeps the owner alive.
        unsafe { std::slice::from_raw_parts(self.ptr as *const AtomicU8, self.len) }
    }

    /// Copies the current contents of the region into a new vector.
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes()
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect()
    }

    /// Creates a new region representing a subrange of this region.
    ///
    /// The returned region shares ownership of the underlying memory with the original.
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - The start index is greater than the end index
    /// - The end index is greater than the region's length
    pub fn slice(&self, range: impl RangeBounds<usize>) -> SharedRegion {
        let range = self.verify_range(range);
        SharedRegion {
            ptr: unsafe { self.ptr.add(range.start) },
            len: range.end - range.start,
            owner: self.owner.clone(),
        }
    }

    /// Checks if the region address at the given offset is aligned to `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if the offset is greater than the region's length.
    pub fn is_aligned_at(&self, offset: usize, alignment: usize) -> bool {
        assert!(offset <= self.len);
        is_aligned_ptr(unsafe { self.ptr.add(offset) }, alignment)
    }

    /// Returns the distance of the region start past the previous
    /// [`Self::MIN_ALIGNMENT`] boundary.
    #[inline]
    pub fn alignment_origin(&self) -> usize {
        (self.ptr as usize) % Self::MIN_ALIGNMENT
    }

    /// Returns `true` if both regions are backed by the same memory owner.
    pub fn shares_memory_with(&self, other: &SharedRegion) -> bool {
        self.owner.same_owner(&other.owner)
    }
}

impl SharedRegion {
    fn verify_range(&self, range: impl RangeBounds<usize>) -> Range<usize> {
        use core::ops::Bound;

        let start = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.checked_add(1).expect("out of range"),
            Bound::Unbounded => 0,
        };

        let end = match range.end_bound() {
            Bound::Included(&n) => n.checked_add(1).expect("out of range"),
            Bound::Excluded(&n) => n,
            Bound::Unbounded => self.len,
        };

        assert!(
            start <= end,
            "range start must not be greater than end: {start:?} <= {end:?}",
        );
        assert!(
            end <= self.len,
            "range end out of bounds: {:?} <= {:?}",
            end,
            self.len,
        );

        start..end
    }
}

impl std::fmt::Debug for SharedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegion")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
enum RegionOwner {
    Heap(Arc<HeapBytes>),
    External(Arc<dyn MemoryOwner + Send + Sync + 'static>),
}

impl RegionOwner {
    fn same_owner(&self, other: &RegionOwner) -> bool {
        match (self, other) {
            (RegionOwner::Heap(a), RegionOwner::Heap(b)) => Arc::ptr_eq(a, b),
            (RegionOwner::External(a), RegionOwner::External(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

/// Heap memory detached from an `AlignedByteVec`.
///
/// The vector is taken apart into raw parts, so that the memory can be written
/// through the stored pointer while shared, and put back together on drop.
struct HeapBytes {
    base: *mut u8,
    vec_len: usize,
    vec_capacity: usize,
    ptr: *mut u8,
    len: usize,
}

unsafe impl Send for HeapBytes {}

unsafe impl Sync for HeapBytes {}

impl HeapBytes {
    fn from_byte_vec(vec: AlignedByteVec) -> HeapBytes {
        let len = vec.len();
        let (inner, start) = vec.into_vec();
        let mut inner = ManuallyDrop::new(inner);
        let base = inner.as_mut_ptr();
        HeapBytes {
            base,
            vec_len: inner.len(),
            vec_capacity: inner.capacity(),
            ptr: unsafe { base.add(start) },
            len,
        }
    }
}

impl Drop for HeapBytes {
    fn drop(&mut self) {
        // SAFETY: the raw parts were taken from a live `Vec<u8>` in `from_byte_vec`.
        unsafe {
            drop(Vec::from_raw_parts(self.base, self.vec_len, self.vec_capacity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::WordBuffer;

    #[test]
    fn test_region_zeroed() {
        let region = SharedRegion::zeroed(128);
        assert_eq!(region.len(), 128);
        assert!(!region.is_empty());
        assert!(region.snapshot().iter().all(|&x| x == 0));
        assert_eq!(region.alignment_origin(), 0);
    }

    #[test]
    fn test_region_slice_shares_memory() {
        let region = SharedRegion::copy_from_slice(&[1, 2, 3, 4, 5]);
        let slice = region.slice(1..4);
        assert_eq!(slice.snapshot(), vec![2, 3, 4]);
        assert!(slice.shares_memory_with(&region));

        slice.bytes()[0].store(42, Ordering::Relaxed);
        assert_eq!(region.snapshot(), vec![1, 42, 3, 4, 5]);
    }

    #[test]
    fn test_region_slice_alignment_origin() {
        let region = SharedRegion::zeroed(64);
        for offset in 0..16 {
            let slice = region.slice(offset..);
            assert_eq!(slice.alignment_origin(), offset % 8);
            assert_eq!(slice.is_aligned_at(0, 8), offset % 8 == 0);
        }
    }

    #[test]
    #[should_panic(expected = "range end out of bounds")]
    fn test_region_slice_out_of_bounds() {
        let region = SharedRegion::copy_from_slice(&[1, 2, 3]);
        region.slice(1..4);
    }

    #[test]
    #[should_panic(expected = "range start must not be greater than end")]
    fn test_region_slice_invalid_range() {
        let region = SharedRegion::copy_from_slice(&[1, 2, 3]);
        region.slice(Range { start: 2, end: 1 });
    }

    #[test]
    fn test_region_from_owner() {
        let owner = Arc::new(WordBuffer::copy_from_slice(&[7, 8, 9]));
        let region = SharedRegion::from_owner(owner.clone());
        assert_eq!(region.snapshot(), vec![7, 8, 9]);
        assert_eq!(Arc::strong_count(&owner), 2);

        let other = SharedRegion::from_owner(owner.clone());
        assert!(region.shares_memory_with(&other));
        assert!(!region.shares_memory_with(&SharedRegion::zeroed(3)));
    }

    #[test]
    fn test_region_outlives_original() {
        let slice = {
            let region = SharedRegion::copy_from_slice(b"hello world");
            region.slice(6..)
        };
        assert_eq!(slice.snapshot(), b"world".to_vec());
    }

    #[test]
    fn test_region_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedRegion>();
    }

    #[test]
    fn test_zero_length_region() {
        let region = SharedRegion::zeroed(0);
        assert!(region.is_empty());
        assert!(region.bytes().is_empty());
        assert_eq!(region.alignment_origin(), 0);
        let sliced = region.slice(0..0);
        assert!(sliced.is_empty());
    }
}
