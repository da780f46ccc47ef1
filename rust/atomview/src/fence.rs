//! Standalone memory fences, independent of any view or accessor.

use std::sync::atomic::{Ordering, fence};

/// Orders all memory accesses before the fence against all accesses after it.
#[inline]
pub fn full_fence() {
    fence(Ordering::SeqCst);
}

/// Loads before the fence are ordered before loads and stores after it.
#[inline]
pub fn acquire_fence() {
    fence(Ordering::Acquire);
}

/// Loads and stores before the fence are ordered before stores after it.
#[inline]
pub fn release_fence() {
    fence(Ordering::Release);
}

/// Loads before the fence are ordered before loads after it.
#[inline]
pub fn load_load_fence() {
    acquire_fence();
}

/// Stores before the fence are ordered before stores after it.
#[inline]
pub fn store_store_fence() {
    release_fence();
}
