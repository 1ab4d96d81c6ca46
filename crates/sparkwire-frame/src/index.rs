use std::ops::Range;

use crate::error::{FrameError, Result};
use crate::MAX_MESSAGES;

/// Extent of one discovered message in the scanner's logical address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageEntry {
    pub cmd: u8,
    pub sub_cmd: u8,
    /// First payload byte.
    pub start: usize,
    /// One past the last payload byte.
    pub end: usize,
}

impl MessageEntry {
    /// Payload length.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the message has no payload.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Logical payload range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Append-only message log capped at [`MAX_MESSAGES`] entries.
#[derive(Debug, Clone)]
pub struct MessageIndex {
    entries: Vec<MessageEntry>,
}

impl MessageIndex {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_MESSAGES),
        }
    }

    /// Append an entry, refusing once the index is full.
    pub fn push(&mut self, entry: MessageEntry) -> Result<()> {
        if self.is_full() {
            return Err(FrameError::IndexFull(MAX_MESSAGES));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&MessageEntry> {
        self.entries.get(index)
    }

    pub fn first(&self) -> Option<&MessageEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_MESSAGES
    }

    pub fn as_slice(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MessageEntry> {
        self.entries.iter()
    }

    /// Remove and return every entry.
    pub fn take(&mut self) -> Vec<MessageEntry> {
        std::mem::replace(&mut self.entries, Vec::with_capacity(MAX_MESSAGES))
    }
}

impl Default for MessageIndex {
    fn default() -> Self {
        Self::new()
    }
}
