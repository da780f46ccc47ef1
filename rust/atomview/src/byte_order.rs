//! Byte order of multi-byte element values.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

/// The order in which the bytes of a multi-byte element are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// Both byte orders, big-endian first.
    pub const ALL: [ByteOrder; 2] = [ByteOrder::BigEndian, ByteOrder::LittleEndian];

    /// Returns the byte order of the current platform.
    pub const fn native() -> ByteOrder {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    /// Returns `true` if this is the platform byte order.
    #[inline]
    pub fn is_native(self) -> bool {
        self == Self::native()
    }

    /// Returns the opposite byte order.
    #[inline]
    pub fn reversed(self) -> ByteOrder {
        match self {
            ByteOrder::BigEndian => ByteOrder::LittleEndian,
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
        }
    }

    /// Writes the low `out.len()` bytes of `bits` into `out` in this byte order.
    ///
    /// # Panics
    ///
    /// Panics if `out.len()` is not in `1..=8`.
    pub fn encode(self, bits: u64, out: &mut [u8]) {
        let width = out.len();
        let bits = bits & width_mask(width);
        match self {
            ByteOrder::BigEndian => BigEndian::write_uint(out, bits, width),
            ByteOrder::LittleEndian => LittleEndian::write_uint(out, bits, width),
        }
    }

    /// Reads an unsigned value of `bytes.len()` bytes in this byte order.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len()` is not in `1..=8`.
    pub fn decode(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::BigEndian => BigEndian::read_uint(bytes, bytes.len()),
            ByteOrder::LittleEndian => LittleEndian::read_uint(bytes, bytes.len()),
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteOrder::BigEndian => f.write_str("BE"),
            ByteOrder::LittleEndian => f.write_str("LE"),
        }
    }
}

/// Mask selecting the low `width` bytes of a 64-bit value.
#[inline]
pub fn width_mask(width: usize) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (width * 8)) - 1
    }
}

/// Reverses the order of the low `width` bytes of `bits`.
#[inline]
pub fn swap_bytes(bits: u64, width: usize) -> u64 {
    match width {
        1 => bits & 0xff,
        2 => (bits as u16).swap_bytes() as u64,
        4 => (bits as u32).swap_bytes() as u64,
        8 => bits.swap_bytes(),
        _ => panic!("unsupported element width {width}"),
    }
}
