//! Memory views: addressable, possibly read-only byte ranges over shared storage.

use std::sync::atomic::{AtomicU8, Ordering};

use atomview_bytes::SharedRegion;
use atomview_common::{Error, Result, verify_arg};

use crate::{byte_order::ByteOrder, policy, storage::StorageKind};

/// Whether a view admits mutating access modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mutability {
    ReadWrite,
    ReadOnly,
}

impl std::fmt::Display for Mutability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutability::ReadWrite => f.write_str("rw"),
            Mutability::ReadOnly => f.write_str("ro"),
        }
    }
}

/// Summary of a view's configuration, used to report scenario context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewDescriptor {
    pub kind: StorageKind,
    pub capacity: usize,
    pub mutability: Mutability,
    pub byte_order: ByteOrder,
    pub alignment_origin: usize,
    /// Offset of the view within its storage allocation.
    pub offset: usize,
}

impl std::fmt::Display for ViewDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[+{}, cap={}, origin={}, {}, {}]",
            self.kind,
            self.offset,
            self.capacity,
            self.alignment_origin,
            self.byte_order,
            self.mutability
        )
    }
}

/// A contiguous byte region with capacity, mutability, byte order and
/// alignment metadata.
///
/// Views are cheap to clone; clones, slices and read-only projections share the
/// underlying storage. All memory access goes through atomics, so a view may be
/// used from any number of threads at once, subject to one rule: concurrent
/// accesses to overlapping bytes must have the same width. The byte helpers
/// ([`MemoryView::read`], [`MemoryView::write`], fills and snapshots) access one
/// byte at a time and must not race with accessor operations on wider elements.
#[derive(Clone)]
pub struct MemoryView {
    region: SharedRegion,
    kind: StorageKind,
    mutability: Mutability,
    byte_order: ByteOrder,
    offset: usize,
}

impl MemoryView {
    pub(crate) fn new(region: SharedRegion, kind: StorageKind) -> MemoryView {
        MemoryView {
            region,
            kind,
            mutability: Mutability::ReadWrite,
            byte_order: ByteOrder::native(),
            offset: 0,
        }
    }

    /// Number of addressable bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    #[inline]
    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.mutability == Mutability::ReadOnly
    }

    /// Byte order used by [`Self::read_value`] and [`Self::write_value`].
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns a view of the same storage that declares a different byte order.
    pub fn with_byte_order(&self, byte_order: ByteOrder) -> MemoryView {
        MemoryView {
            byte_order,
            ..self.clone()
        }
    }

    #[inline]
    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    /// Distance of index 0 past the previous 8-byte boundary. For an element of
    /// width `w`, index `i` is aligned iff `(i + origin) mod w == 0`.
    #[inline]
    pub fn alignment_origin(&self) -> usize {
        self.region.alignment_origin()
    }

    #[inline]
    pub fn is_aligned(&self, index: i64, width: usize) -> bool {
        policy::is_aligned(index, self.alignment_origin(), width)
    }

    pub fn descriptor(&self) -> ViewDescriptor {
        ViewDescriptor {
            kind: self.kind,
            capacity: self.capacity(),
            mutability: self.mutability,
            byte_order: self.byte_order,
            alignment_origin: self.alignment_origin(),
            offset: self.offset,
        }
    }

    /// Returns a view of `len` bytes starting at `offset`, sharing this view's
    /// storage, mutability and byte order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the range exceeds the view.
    pub fn slice(&self, offset: usize, len: usize) -> Result<MemoryView> {
        let end = offset.checked_add(len);
        verify_arg!(range, end.is_some_and(|end| end <= self.capacity()));
        Ok(MemoryView {
            region: self.region.slice(offset..offset + len),
            offset: self.offset + offset,
            ..self.clone()
        })
    }

    /// Returns a read-only view of the same storage.
    pub fn as_read_only(&self) -> MemoryView {
        MemoryView {
            mutability: Mutability::ReadOnly,
            ..self.clone()
        }
    }

    /// Returns `true` if both views are backed by the same allocation.
    pub fn shares_storage_with(&self, other: &MemoryView) -> bool {
        self.region.shares_memory_with(&other.region)
    }

    /// Copies `width` bytes at `offset` into the front of an 8-byte array.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if the bytes are not within the view, and
    /// `InvalidArgument` if `width` exceeds 8.
    pub fn read(&self, offset: usize, width: usize) -> Result<[u8; 8]> {
        verify_arg!(width, width <= 8);
        let mut buf = [0u8; 8];
        self.read_into(offset, &mut buf[..width])?;
        Ok(buf)
    }

    /// Fills `dst` with the bytes starting at `offset`.
    pub fn read_into(&self, offset: usize, dst: &mut [u8]) -> Result<()> {
        let bytes = self.range(offset, dst.len())?;
        for (d, b) in dst.iter_mut().zip(bytes) {
            *d = b.load(Ordering::Relaxed);
        }
        Ok(())
    }

    /// Writes raw bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` on a read-only view and `IndexOutOfRange` if
    /// the bytes do not fit.
    pub fn write(&self, offset: usize, src: &[u8]) -> Result<()> {
        self.verify_writable("write")?;
        let bytes = self.range(offset, src.len())?;
        for (b, &s) in bytes.iter().zip(src) {
            b.store(s, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Reads an unsigned value of `width` bytes in the view's byte order.
    pub fn read_value(&self, offset: usize, width: usize) -> Result<u64> {
        let buf = self.read(offset, width)?;
        Ok(self.byte_order.decode(&buf[..width]))
    }

    /// Writes the low `width` bytes of `bits` in the view's byte order.
    pub fn write_value(&self, offset: usize, width: usize, bits: u64) -> Result<()> {
        verify_arg!(width, width <= 8);
        let mut buf = [0u8; 8];
        self.byte_order.encode(bits, &mut buf[..width]);
        self.write(offset, &buf[..width])
    }

    /// Sets every byte of the view to `value`.
    pub fn fill(&self, value: u8) -> Result<()> {
        self.fill_with(|_| value)
    }

    /// Sets every byte of the view to `f(offset)`.
    pub fn fill_with(&self, mut f: impl FnMut(usize) -> u8) -> Result<()> {
        self.verify_writable("fill")?;
        for (offset, b) in self.region.bytes().iter().enumerate() {
            b.store(f(offset), Ordering::Relaxed);
        }
        Ok(())
    }

    /// Copies the current contents of the view.
    pub fn snapshot(&self) -> Vec<u8> {
        self.region.snapshot()
    }
}

impl MemoryView {
    /// Base address of the view; valid for atomic access of `capacity()` bytes
    /// while the view is alive.
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.region.as_ptr()
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[AtomicU8] {
        self.region.bytes()
    }

    fn range(&self, offset: usize, len: usize) -> Result<&[AtomicU8]> {
        let bytes = self.region.bytes();
        match offset.checked_add(len) {
            Some(end) if end <= bytes.len() => Ok(&bytes[offset..end]),
            _ => Err(Error::index_out_of_range(
                i64::try_from(offset).unwrap_or(i64::MAX),
                bytes.len(),
                len,
            )),
        }
    }

    fn verify_writable(&self, operation: &str) -> Result<()> {
        if self.is_read_only() {
            Err(Error::unsupported(operation, "the memory view is read-only"))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for MemoryView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryView")
            .field("kind", &self.kind)
            .field("offset", &self.offset)
            .field("capacity", &self.capacity())
            .field("mutability", &self.mutability)
            .field("byte_order", &self.byte_order)
            .field("alignment_origin", &self.alignment_origin())
            .finish()
    }
}
