//! 7-bit expansion.
//!
//! Chunk data is cut into groups of seven bytes. Each group goes on the wire
//! as a mask byte holding the high bit of every member (bit *i* for member
//! *i*) followed by the members with their high bit cleared. No encoded byte
//! reaches `0x80`, so `F0`/`F7` can only ever be framing.
//!
//! [`address`] is the one place that maps a logical offset within a chunk
//! to physical bytes.

/// Members per group.
pub const GROUP: usize = 7;

/// Encoded size of a group: mask byte plus members.
pub const GROUP_WIRE: usize = GROUP + 1;

/// Encoded length of `logical` bytes.
pub const fn encoded_len(logical: usize) -> usize {
    logical + logical.div_ceil(GROUP)
}

/// Logical length of an `encoded` run, or `None` if a group would be empty.
pub const fn logical_len(encoded: usize) -> Option<usize> {
    if encoded % GROUP_WIRE == 1 {
        None
    } else {
        Some(encoded - encoded.div_ceil(GROUP_WIRE))
    }
}

/// Physical location of one logical byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    /// Offset of the group's mask byte.
    pub mask: usize,
    /// Offset of the byte itself.
    pub byte: usize,
    /// Bit in the mask byte carrying the high bit.
    pub bit: u8,
}

/// Locate logical `offset` of a chunk whose encoded data starts at `base`.
pub const fn address(base: usize, offset: usize) -> Address {
    let group = offset / GROUP;
    let member = offset % GROUP;
    let mask = base + group * GROUP_WIRE;
    Address {
        mask,
        byte: mask + 1 + member,
        bit: 1 << member,
    }
}

/// Write `value` at logical `offset`.
pub fn store(buf: &mut [u8], base: usize, offset: usize, value: u8) {
    let at = address(base, offset);
    buf[at.byte] = value & 0x7F;
    if value & 0x80 != 0 {
        buf[at.mask] |= at.bit;
    } else {
        buf[at.mask] &= !at.bit;
    }
}

/// Read the byte at logical `offset`.
pub fn load(buf: &[u8], base: usize, offset: usize) -> u8 {
    let at = address(base, offset);
    let high = if buf[at.mask] & at.bit != 0 { 0x80 } else { 0 };
    buf[at.byte] | high
}
