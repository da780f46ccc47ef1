use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::io;

/// Page size emulated on targets without a native mapping backend.
const PAGE_SIZE: usize = 4 * 1024;

/// Allocates zeroed, page-aligned memory from the global allocator.
///
/// Same contract as the `mmap` backend: the capacity is rounded up to whole
/// pages, and is at least one page even for a zero `size`.
pub fn allocate(size: usize) -> io::Result<(*mut std::ffi::c_void, usize)> {
    let capacity = size.max(1).next_multiple_of(PAGE_SIZE);
    let layout = page_layout(capacity)?;
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(io::Error::new(
            io::ErrorKind::OutOfMemory,
            format!("cannot allocate {capacity} bytes"),
        ));
    }
    Ok((ptr.cast(), capacity))
}

/// Frees memory obtained from [`allocate`].
///
/// # Safety
///
/// `ptr` and `size` must be exactly what [`allocate`] returned, and the memory
/// must not be used afterwards.
pub unsafe fn free(ptr: *mut std::ffi::c_void, size: usize) -> io::Result<()> {
    let layout = page_layout(size)?;
    unsafe { dealloc(ptr.cast(), layout) };
    Ok(())
}

pub fn get_page_size() -> usize {
    PAGE_SIZE
}

fn page_layout(size: usize) -> io::Result<Layout> {
    Layout::from_size_align(size, PAGE_SIZE)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}
