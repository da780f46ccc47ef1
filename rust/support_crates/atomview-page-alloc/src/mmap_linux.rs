use std::sync::OnceLock;

/// Maps `size` bytes of anonymous, zero-filled memory using standard pages.
///
/// The mapping is rounded up to a whole number of pages (at least one page, even
/// for a zero `size`), so the returned pointer is page-aligned.
///
/// # Returns
///
/// - `Ok((ptr, capacity))` - pointer to the mapping and its page-rounded capacity
/// - `Err(io::Error)` - if `mmap` fails
///
/// # Safety
///
/// The returned pointer must be released with [`free`] using the returned capacity.
pub fn allocate(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    let page_size = get_page_size();
    assert!(page_size.is_power_of_two());
    let capacity = (size.max(1) + page_size - 1) & !(page_size - 1);
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            capacity,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if ptr.is_null() || ptr == libc::MAP_FAILED {
        return Err(std::io::Error::last_os_error());
    }
    Ok((ptr, capacity))
}

/// Unmaps memory obtained from [`allocate`].
///
/// # Safety
///
/// - `ptr` was returned by [`allocate`] and `size` is the capacity returned with it
/// - The memory has not already been freed
/// - No other references to the memory exist
pub unsafe fn free(ptr: *mut std::ffi::c_void, size: usize) -> std::io::Result<()> {
    let res = unsafe { libc::munmap(ptr, size) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Returns the system page size, cached after the first `sysconf` call.
///
/// Falls back to 4KB if the page size cannot be determined.
pub fn get_page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| read_page_size().unwrap_or(4 * 1024))
}

fn read_page_size() -> std::io::Result<usize> {
    let res = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    assert!(res < i32::MAX as _);
    Ok(res as usize)
}
