//! Page-granular off-heap memory for atomview storage regions.

pub mod mmap_buffer;

#[cfg_attr(target_os = "linux", path = "mmap_linux.rs")]
#[cfg_attr(not(target_os = "linux"), path = "mmap_fallback.rs")]
pub mod mmap;
