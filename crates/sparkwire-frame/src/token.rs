//! Value tokens used inside message payloads.

/// Base tag of a short string: `0xA0 + len` for `len <= SHORT_STR_MAX`.
pub const SHORT_STR_BASE: u8 = 0xA0;

/// Longest string that fits the short tag.
pub const SHORT_STR_MAX: usize = 0x1F;

/// Tag of a long string, followed by a length byte.
pub const LONG_STR: u8 = 0xD9;

/// Tag of a 32-bit big-endian float.
pub const FLOAT: u8 = 0xCA;

/// Effect engaged.
pub const ON: u8 = 0xC3;

/// Effect bypassed.
pub const OFF: u8 = 0xC2;

/// Base tag of a small array: `0x90 + count`.
pub const ARRAY_BASE: u8 = 0x90;
