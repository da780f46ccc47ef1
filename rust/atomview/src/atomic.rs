//! Width-dispatched atomic primitives over view memory.
//!
//! Values handled here are raw memory words in the platform byte order; byte
//! order translation is the accessor's business. Mixed-width atomic accesses to
//! overlapping bytes must not race with each other.

use std::{
    marker::PhantomData,
    sync::atomic::{AtomicU8, AtomicU16, AtomicU32, AtomicU64, Ordering},
};

use atomview_bytes::align::is_aligned_ptr;

use crate::{byte_order::ByteOrder, mode::UpdateOp, view::MemoryView};

macro_rules! dispatch {
    ($width:expr, $ptr:expr, |$a:ident| $body:expr) => {
        match $width {
            1 => {
                // SAFETY: `AtomicSlot::new` checked bounds and alignment, and the view
                // keeps the memory alive for the slot's lifetime.
                let $a = unsafe { AtomicU8::from_ptr($ptr.cast()) };
                $body
            }
            2 => {
                let $a = unsafe { AtomicU16::from_ptr($ptr.cast()) };
                $body
            }
            4 => {
                let $a = unsafe { AtomicU32::from_ptr($ptr.cast()) };
                $body
            }
            8 => {
                let $a = unsafe { AtomicU64::from_ptr($ptr.cast()) };
                $body
            }
            w => unreachable!("unsupported element width {w}"),
        }
    };
}

/// An in-bounds, naturally aligned element of a view, accessed as one atomic
/// word of its width.
pub(crate) struct AtomicSlot<'a> {
    ptr: *mut u8,
    width: usize,
    _view: PhantomData<&'a MemoryView>,
}

impl<'a> AtomicSlot<'a> {
    /// # Panics
    ///
    /// Panics if the element is out of bounds or misaligned; callers check both
    /// beforehand and report them as errors.
    pub fn new(view: &'a MemoryView, offset: usize, width: usize) -> AtomicSlot<'a> {
        assert!(matches!(width, 1 | 2 | 4 | 8));
        assert!(offset + width <= view.capacity());
        let ptr = unsafe { view.as_ptr().add(offset) };
        assert!(is_aligned_ptr(ptr, width));
        AtomicSlot {
            ptr,
            width,
            _view: PhantomData,
        }
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> u64 {
        dispatch!(self.width, self.ptr, |a| a.load(order) as u64)
    }

    #[inline]
    pub fn store(&self, bits: u64, order: Ordering) {
        dispatch!(self.width, self.ptr, |a| a.store(bits as _, order))
    }

    #[inline]
    pub fn swap(&self, bits: u64, order: Ordering) -> u64 {
        dispatch!(self.width, self.ptr, |a| a.swap(bits as _, order) as u64)
    }

    /// Strong or weak compare-exchange; `Ok` carries the previous value on
    /// success, `Err` the witnessed value on failure.
    #[inline]
    pub fn compare_exchange(
        &self,
        current: u64,
        new: u64,
        (success, failure): (Ordering, Ordering),
        weak: bool,
    ) -> Result<u64, u64> {
        dispatch!(self.width, self.ptr, |a| {
            let res = if weak {
                a.compare_exchange_weak(current as _, new as _, success, failure)
            } else {
                a.compare_exchange(current as _, new as _, success, failure)
            };
            res.map(|v| v as u64).map_err(|v| v as u64)
        })
    }

    /// Applies `op` with a native fetch-and-op instruction; `Add` wraps modulo
    /// the width.
    #[inline]
    pub fn fetch_op(&self, op: UpdateOp, operand: u64, order: Ordering) -> u64 {
        dispatch!(self.width, self.ptr, |a| {
            let prev = match op {
                UpdateOp::Set => a.swap(operand as _, order),
                UpdateOp::Add => a.fetch_add(operand as _, order),
                UpdateOp::Or => a.fetch_or(operand as _, order),
                UpdateOp::And => a.fetch_and(operand as _, order),
                UpdateOp::Xor => a.fetch_xor(operand as _, order),
            };
            prev as u64
        })
    }

    /// Replaces the word with `f(word)` in a compare-exchange loop and returns
    /// the previous word.
    #[inline]
    pub fn fetch_update(&self, order: Ordering, mut f: impl FnMut(u64) -> u64) -> u64 {
        let fetch = failure_ordering(order);
        dispatch!(self.width, self.ptr, |a| {
            let res = a.fetch_update(order, fetch, |x| Some(f(x as u64) as _));
            match res {
                Ok(prev) | Err(prev) => prev as u64,
            }
        })
    }
}

/// Strongest valid load ordering implied by a read-modify-write ordering.
fn failure_ordering(order: Ordering) -> Ordering {
    match order {
        Ordering::SeqCst => Ordering::SeqCst,
        Ordering::Acquire | Ordering::AcqRel => Ordering::Acquire,
        _ => Ordering::Relaxed,
    }
}

/// Plain read of a misaligned element: each byte is loaded on its own, in no
/// particular order relative to other accesses.
pub(crate) fn load_plain(bytes: &[AtomicU8], order: ByteOrder) -> u64 {
    let mut buf = [0u8; 8];
    for (d, b) in buf.iter_mut().zip(bytes) {
        *d = b.load(Ordering::Relaxed);
    }
    order.decode(&buf[..bytes.len()])
}

/// Plain write of a misaligned element, byte by byte.
pub(crate) fn store_plain(bytes: &[AtomicU8], order: ByteOrder, bits: u64) {
    let mut buf = [0u8; 8];
    order.encode(bits, &mut buf[..bytes.len()]);
    for (b, &s) in bytes.iter().zip(&buf) {
        b.store(s, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageKind, StorageProvider};

    #[test]
    fn test_slot_load_store() {
        let view = StorageKind::HeapArray.allocate(16).unwrap();
        for width in [1, 2, 4, 8] {
            let slot = AtomicSlot::new(&view, 8, width);
            let bits = 0x0102_0304_0506_0708u64 & crate::byte_order::width_mask(width);
            slot.store(bits, Ordering::SeqCst);
            assert_eq!(slot.load(Ordering::SeqCst), bits);
            let native = ByteOrder::native().decode(&view.snapshot()[8..8 + width]);
            assert_eq!(native, bits);
        }
    }

    #[test]
    fn test_slot_rmw() {
        let view = StorageKind::HeapBuffer.allocate(8).unwrap();
        let slot = AtomicSlot::new(&view, 6, 2);
        slot.store(0xfffe, Ordering::Relaxed);
        assert_eq!(slot.fetch_op(UpdateOp::Add, 3, Ordering::SeqCst), 0xfffe);
        assert_eq!(slot.load(Ordering::Relaxed), 0x0001);
        assert_eq!(slot.fetch_op(UpdateOp::Or, 0x10, Ordering::SeqCst), 0x0001);
        assert_eq!(slot.swap(0x7, Ordering::SeqCst), 0x0011);
        assert_eq!(slot.fetch_update(Ordering::Release, |x| x * 3), 0x7);
        assert_eq!(slot.load(Ordering::Acquire), 0x15);
    }

    #[test]
    fn test_slot_compare_exchange() {
        let view = StorageKind::OffHeap.allocate(8).unwrap();
        let slot = AtomicSlot::new(&view, 0, 8);
        let orders = (Ordering::SeqCst, Ordering::SeqCst);
        assert_eq!(slot.compare_exchange(0, 5, orders, false), Ok(0));
        assert_eq!(slot.compare_exchange(0, 6, orders, false), Err(5));
        let mut attempts = 0;
        while slot.compare_exchange(5, 9, orders, true).is_err() {
            attempts += 1;
            assert!(attempts < 100);
        }
        assert_eq!(slot.load(Ordering::SeqCst), 9);
    }

    #[test]
    #[should_panic]
    fn test_slot_rejects_misaligned() {
        let view = StorageKind::HeapArray.allocate(16).unwrap();
        AtomicSlot::new(&view, 1, 4);
    }

    #[test]
    fn test_plain_bytes() {
        let view = StorageKind::HeapArray.allocate(8).unwrap();
        store_plain(&view.bytes()[1..5], ByteOrder::BigEndian, 0x0a0b_0c0d);
        assert_eq!(&view.snapshot()[1..5], &[0x0a, 0x0b, 0x0c, 0x0d]);
        assert_eq!(
            load_plain(&view.bytes()[1..5], ByteOrder::LittleEndian),
            0x0d0c_0b0a
        );
    }
}
