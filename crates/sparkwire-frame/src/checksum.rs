//! Per-chunk integrity check.
//!
//! The checksum byte sits in the chunk header and covers the encoded data
//! bytes. Strategies are swappable through [`ChecksumKind`].

use std::fmt;

/// A chunk checksum strategy.
pub trait Checksum: fmt::Debug + Send + Sync {
    /// Checksum of the encoded data of one chunk.
    fn compute(&self, encoded: &[u8]) -> u8;

    /// Whether a received chunk carries a valid checksum.
    fn verify(&self, encoded: &[u8], expected: u8) -> bool {
        self.compute(encoded) == expected
    }
}

/// XOR of all encoded bytes. Always below `0x80`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorChecksum;

impl Checksum for XorChecksum {
    fn compute(&self, encoded: &[u8]) -> u8 {
        encoded.iter().fold(0, |acc, b| acc ^ b)
    }
}

/// Writes zero and accepts anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unchecked;

impl Checksum for Unchecked {
    fn compute(&self, _encoded: &[u8]) -> u8 {
        0
    }

    fn verify(&self, _encoded: &[u8], _expected: u8) -> bool {
        true
    }
}

/// Configurable checksum selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumKind {
    #[default]
    Xor,
    Unchecked,
}

impl ChecksumKind {
    /// The strategy implementing this kind.
    pub fn strategy(self) -> &'static dyn Checksum {
        match self {
            ChecksumKind::Xor => &XorChecksum,
            ChecksumKind::Unchecked => &Unchecked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_checksum() {
        assert_eq!(XorChecksum.compute(&[]), 0);
        assert_eq!(XorChecksum.compute(&[0x01, 0x02, 0x04]), 0x07);
        assert!(XorChecksum.verify(&[0x10, 0x10], 0));
        assert!(!XorChecksum.verify(&[0x10], 0));
    }

    #[test]
    fn unchecked_accepts_anything() {
        let strategy = ChecksumKind::Unchecked.strategy();
        assert_eq!(strategy.compute(&[0x55]), 0);
        assert!(strategy.verify(&[0x55], 0x42));
    }
}
