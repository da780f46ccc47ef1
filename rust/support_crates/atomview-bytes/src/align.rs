//! Power-of-two alignment arithmetic.

/// Rounds `n` up to the next multiple of `alignment`.
///
/// ```
/// use atomview_bytes::align::align_up;
///
/// assert_eq!(align_up(0, 8), 0);
/// assert_eq!(align_up(9, 8), 16);
/// assert_eq!(align_up(16, 8), 16);
/// ```
///
/// # Panics
///
/// Panics if the result overflows `usize`, and in debug builds if `alignment`
/// is not a power of two.
#[inline]
pub fn align_up(n: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    n.checked_add(alignment - 1).expect("align_up overflow") & !(alignment - 1)
}

/// Returns `true` if `n` is a multiple of `alignment`.
///
/// ```
/// use atomview_bytes::align::is_aligned;
///
/// assert!(is_aligned(24, 8));
/// assert!(!is_aligned(6, 4));
/// assert!(is_aligned(3, 1));
/// ```
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    n & (alignment - 1) == 0
}

/// Returns `true` if `alignment` is a power of two and `ptr` lies on it.
#[inline]
pub fn is_aligned_ptr(ptr: *const u8, alignment: usize) -> bool {
    alignment.is_power_of_two() && is_aligned(ptr as usize, alignment)
}
