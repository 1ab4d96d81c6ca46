//! The frame buffer arena.
//!
//! One contiguous allocation of [`NUM_BLOCKS`] × [`BLOCK_SIZE`] bytes. The
//! builder lays blocks out at fixed strides; the scanner fills it with raw
//! received bytes. Either way the data of every chunk is described by a
//! [`ChunkSpan`], and logical reads and writes go through the span and
//! [`expand::address`](crate::expand::address).

use crate::expand;
use crate::{BLOCK_SIZE, BUFFER_CAPACITY, NUM_BLOCKS};

/// Where one chunk's payload lives, logically and physically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Arena offset of the first encoded data byte.
    pub physical: usize,
    /// Logical position of the first payload byte.
    pub logical_start: usize,
    /// Prefix bytes preceding the payload inside the chunk data.
    pub skip: usize,
    /// Payload bytes in this chunk.
    pub len: usize,
}

impl ChunkSpan {
    /// Logical position one past the last payload byte.
    pub fn end(&self) -> usize {
        self.logical_start + self.len
    }

    /// Whether logical `pos` falls inside this chunk.
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.logical_start && pos < self.end()
    }

    /// Encoded length of the chunk data, prefix included.
    pub fn encoded_len(&self) -> usize {
        expand::encoded_len(self.skip + self.len)
    }
}

/// Fixed-capacity byte arena shared by building and scanning.
pub struct FrameBuffer {
    bytes: Box<[u8]>,
}

impl FrameBuffer {
    /// Allocate a zeroed buffer.
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; BUFFER_CAPACITY].into_boxed_slice(),
        }
    }

    /// Raw arena contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// The full stride of block `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_BLOCKS`.
    pub fn block(&self, index: usize) -> &[u8] {
        assert!(index < NUM_BLOCKS, "block {index} out of range");
        &self.bytes[index * BLOCK_SIZE..(index + 1) * BLOCK_SIZE]
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> &mut [u8] {
        &mut self.bytes[index * BLOCK_SIZE..(index + 1) * BLOCK_SIZE]
    }

    /// Write chunk-local `offset` (prefix included) of `span`.
    pub(crate) fn store(&mut self, span: &ChunkSpan, offset: usize, value: u8) {
        expand::store(&mut self.bytes, span.physical, offset, value);
    }

    /// Read chunk-local `offset` (prefix included) of `span`.
    pub fn load(&self, span: &ChunkSpan, offset: usize) -> u8 {
        expand::load(&self.bytes, span.physical, offset)
    }

    /// Read the payload byte at logical `pos`, or `None` if no span covers it.
    pub fn read(&self, spans: &[ChunkSpan], pos: usize) -> Option<u8> {
        let at = spans.partition_point(|span| span.end() <= pos);
        let span = spans.get(at).filter(|span| span.contains(pos))?;
        Some(self.load(span, span.skip + (pos - span.logical_start)))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("capacity", &self.bytes.len())
            .finish()
    }
}
