//! Bounds and alignment rules shared by accessors and the conformance oracle.
//!
//! An element of width `w` may be accessed at byte index `i` of a view with
//! capacity `c` iff `0 <= i <= c - w`. It is naturally aligned iff
//! `(i + origin) mod w == 0`, where `origin` is the view's alignment origin.

use std::ops::Range;

use atomview_bytes::align;
use atomview_common::{Error, Result};

/// Returns `true` if an element of `width` bytes at `index` lies within `capacity`.
#[inline]
pub fn valid_index(index: i64, capacity: usize, width: usize) -> bool {
    index >= 0 && capacity >= width && (index as u64) <= (capacity - width) as u64
}

/// Returns `true` if the element at `index` is naturally aligned.
#[inline]
pub fn is_aligned(index: i64, origin: usize, width: usize) -> bool {
    (index as i128 + origin as i128).rem_euclid(width as i128) == 0
}

/// The window of valid indices; empty when the capacity is below the width.
pub fn index_window(capacity: usize, width: usize) -> Range<i64> {
    if capacity < width {
        0..0
    } else {
        0..(capacity - width + 1) as i64
    }
}

/// Valid indices at which an element is naturally aligned.
pub fn aligned_indices(
    capacity: usize,
    origin: usize,
    width: usize,
) -> impl Iterator<Item = i64> {
    index_window(capacity, width).filter(move |&i| is_aligned(i, origin, width))
}

/// Valid indices at which an element is not naturally aligned.
pub fn misaligned_indices(
    capacity: usize,
    origin: usize,
    width: usize,
) -> impl Iterator<Item = i64> {
    index_window(capacity, width).filter(move |&i| !is_aligned(i, origin, width))
}

/// Checks the index against the window and converts it to a byte offset.
///
/// # Errors
///
/// Returns `IndexOutOfRange` if the element does not fit.
#[inline]
pub fn check_index(index: i64, capacity: usize, width: usize) -> Result<usize> {
    if valid_index(index, capacity, width) {
        Ok(index as usize)
    } else {
        Err(Error::index_out_of_range(index, capacity, width))
    }
}

/// Checks that the element at an in-bounds `offset` is naturally aligned.
///
/// # Errors
///
/// Returns `Misaligned` otherwise.
#[inline]
pub fn check_alignment(offset: usize, origin: usize, width: usize) -> Result<()> {
    if align::is_aligned(offset + origin, width) {
        Ok(())
    } else {
        Err(Error::misaligned(offset as i64, width, origin))
    }
}
