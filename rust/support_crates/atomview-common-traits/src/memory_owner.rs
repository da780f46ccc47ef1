//! `MemoryOwner`: A trait for types that own aligned memory regions.

/// A trait for types that own aligned memory regions.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - The memory returned by `memory()` remains valid for reads and writes
///   for the entire lifetime of the owner, and does not move.
/// - Memory is exclusively owned by the `MemoryOwner` instance; once the owner
///   is shared, the region is only accessed through atomic operations.
/// - The memory is aligned to at least the reported `alignment`, which is a
///   power of two no smaller than 8.
/// - The reported length and capacity are accurate.
pub unsafe trait MemoryOwner {
    /// Returns information about the owned memory block.
    fn memory(&self) -> MemoryAllocation;
}

/// Represents a block of allocated memory with its size information.
#[derive(Debug, Clone)]
pub struct MemoryAllocation {
    /// Pointer to the start of the allocated memory.
    pub ptr: *mut u8,
    /// Current length of the allocated memory in bytes.
    pub len: usize,
    /// Total capacity of the allocated memory in bytes.
    pub capacity: usize,
    /// Formal alignment of the memory block.
    pub alignment: usize,
}
