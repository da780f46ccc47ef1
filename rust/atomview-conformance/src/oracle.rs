//! Expected contents and outcomes.
//!
//! Fixtures are filled with the canonical big-endian pattern of the accessor's
//! width, repeated: byte `p` of a view is `pattern_be[p mod w]`. An element read
//! at index `i` therefore sees the pattern rotated left by `i mod w` bytes.

use atomview::{
    AccessMode, Accessor, ByteOrder, MemoryView, UpdateOp, Value, ValueType,
    byte_order::{swap_bytes, width_mask},
    policy,
};
use atomview_common::ErrorClass;

use crate::scenario::Expected;

/// The canonical pattern of a width: `0x01`, `0x0102`, `0x01020304` or
/// `0x0102030405060708`.
pub fn canonical_pattern(width: usize) -> u64 {
    0x0102_0304_0506_0708u64 >> ((8 - width) * 8)
}

/// Byte at `position` of a view filled for accessors of `width` bytes.
pub fn fill_byte(width: usize, position: usize) -> u8 {
    let mut be = [0u8; 8];
    ByteOrder::BigEndian.encode(canonical_pattern(width), &mut be[..width]);
    be[position % width]
}

/// Rotates the low `width` bytes of `bits` left by `bytes` bytes.
pub fn rotate_left(bits: u64, bytes: usize, width: usize) -> u64 {
    let mask = width_mask(width);
    let bits = bits & mask;
    let shift = (bytes % width) * 8;
    if shift == 0 {
        bits
    } else {
        ((bits << shift) | (bits >> (width * 8 - shift))) & mask
    }
}

/// Bits of the element read at `index` of a filled view in byte order `order`.
pub fn expected_bits(width: usize, order: ByteOrder, index: i64) -> u64 {
    let rotation = index.rem_euclid(width as i64) as usize;
    let be = rotate_left(canonical_pattern(width), rotation, width);
    match order {
        ByteOrder::BigEndian => be,
        ByteOrder::LittleEndian => swap_bytes(be, width),
    }
}

/// The element the accessor reads at `index` of a freshly filled view.
pub fn expected_value(accessor: &Accessor, index: i64) -> Value {
    let bits = expected_bits(accessor.width(), accessor.byte_order(), index);
    Value::from_bits(accessor.value_type(), bits)
}

/// The outcome of `mode` at `index`, applying the checks in accessor order:
/// mode support, bounds, mutability, alignment.
pub fn expected_outcome(
    view: &MemoryView,
    accessor: &Accessor,
    mode: AccessMode,
    index: i64,
) -> Expected {
    let width = accessor.width();
    if !accessor.supports(mode) {
        Expected::Error(ErrorClass::UnsupportedOperation)
    } else if !policy::valid_index(index, view.capacity(), width) {
        Expected::Error(ErrorClass::IndexOutOfRange)
    } else if mode.is_mutating() && view.is_read_only() {
        Expected::Error(ErrorClass::UnsupportedOperation)
    } else if mode.requires_alignment() && !view.is_aligned(index, width) {
        Expected::Error(ErrorClass::Misaligned)
    } else {
        Expected::Success
    }
}

/// Three distinct values of type `ty`, none equal to the fill pattern.
pub fn sample_values(ty: ValueType) -> [Value; 3] {
    [
        0x1122_3344_5566_7788u64,
        0x8899_aabb_ccdd_eeffu64,
        0x0f1e_2d3c_4b5a_6978u64,
    ]
    .map(|bits| Value::from_bits(ty, bits))
}

/// Value held after applying `op` with `operand` to `current`.
pub fn updated_value(op: UpdateOp, current: Value, operand: Value) -> Value {
    let ty = current.value_type();
    let width = ty.width().unwrap_or(8);
    let bits = op.apply(
        current.to_bits().unwrap_or_default(),
        operand.to_bits().unwrap_or_default(),
    );
    Value::from_bits(ty, bits & width_mask(width))
}

/// What a view reading in `view_order` sees after the accessor wrote `value`.
pub fn memory_image(value: Value, accessor_order: ByteOrder, view_order: ByteOrder) -> u64 {
    let width = value.value_type().width().unwrap_or(8);
    let bits = value.to_bits().unwrap_or_default();
    if accessor_order == view_order {
        bits
    } else {
        swap_bytes(bits, width)
    }
}
