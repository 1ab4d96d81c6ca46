//! Sequential reads over one indexed message.

use crate::buffer::{ChunkSpan, FrameBuffer};
use crate::codec::SparkCodec;
use crate::error::{FrameError, Result};
use crate::index::MessageEntry;
use crate::{token, STR_LEN};

/// Reads the value tokens of one message in order.
///
/// Every read checks the position against the entry's exclusive end, so a
/// truncated or mis-typed payload surfaces as an error rather than bytes
/// from the next message.
#[derive(Debug, Clone)]
pub struct MessageCursor<'a> {
    buf: &'a FrameBuffer,
    spans: &'a [ChunkSpan],
    entry: MessageEntry,
    pos: usize,
}

impl<'a> MessageCursor<'a> {
    pub(crate) fn new(buf: &'a FrameBuffer, spans: &'a [ChunkSpan], entry: MessageEntry) -> Self {
        Self {
            buf,
            spans,
            entry,
            pos: entry.start,
        }
    }

    /// The entry this cursor walks.
    pub fn entry(&self) -> MessageEntry {
        self.entry
    }

    /// Current logical position.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.entry.end - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.entry.end
    }

    /// Read one raw payload byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.pos >= self.entry.end {
            return Err(FrameError::ReadPastEnd {
                pos: self.pos,
                end: self.entry.end,
            });
        }
        let value = self
            .buf
            .read(self.spans, self.pos)
            .ok_or_else(|| FrameError::Malformed(format!("position {} is not buffered", self.pos)))?;
        self.pos += 1;
        Ok(value)
    }

    /// Read one byte and require it to equal `expected`.
    pub fn expect_byte(&mut self, expected: u8, what: &str) -> Result<()> {
        let at = self.pos;
        let found = self.read_byte()?;
        if found != expected {
            return Err(FrameError::Malformed(format!(
                "expected {what} ({expected:#04x}) at position {at}, found {found:#04x}"
            )));
        }
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        (0..len).map(|_| self.read_byte()).collect()
    }

    /// Read a short (`A0+len`) or long (`D9 len`) string token.
    pub fn read_string(&mut self) -> Result<String> {
        let at = self.pos;
        let tag = self.read_byte()?;
        let len = match tag {
            token::LONG_STR => self.read_byte()? as usize,
            t if t >= token::SHORT_STR_BASE
                && usize::from(t - token::SHORT_STR_BASE) <= token::SHORT_STR_MAX =>
            {
                usize::from(t - token::SHORT_STR_BASE)
            }
            other => {
                return Err(FrameError::Malformed(format!(
                    "expected string token at position {at}, found {other:#04x}"
                )))
            }
        };
        if len > STR_LEN {
            return Err(FrameError::StringTooLong { len, max: STR_LEN });
        }
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|_| FrameError::Malformed(format!("string at position {at} is not UTF-8")))
    }

    /// Read a length byte followed by a string token of that length.
    pub fn read_prefixed_string(&mut self) -> Result<String> {
        let at = self.pos;
        let declared = self.read_byte()? as usize;
        let value = self.read_string()?;
        if value.len() != declared {
            return Err(FrameError::Malformed(format!(
                "string prefix at position {at} says {declared} bytes, token holds {}",
                value.len()
            )));
        }
        Ok(value)
    }

    /// Read a `CA` float token.
    pub fn read_float(&mut self) -> Result<f32> {
        self.expect_byte(token::FLOAT, "float token")?;
        let mut raw = [0u8; 4];
        for b in &mut raw {
            *b = self.read_byte()?;
        }
        Ok(f32::from_be_bytes(raw))
    }

    /// Read a `C3`/`C2` on/off token.
    pub fn read_onoff(&mut self) -> Result<bool> {
        let at = self.pos;
        match self.read_byte()? {
            token::ON => Ok(true),
            token::OFF => Ok(false),
            other => Err(FrameError::Malformed(format!(
                "expected on/off token at position {at}, found {other:#04x}"
            ))),
        }
    }
}

impl SparkCodec {
    /// A cursor positioned at the start of indexed message `index`.
    pub fn cursor(&self, index: usize) -> Result<MessageCursor<'_>> {
        let state = self.scan_state()?;
        let entry = state
            .index
            .get(index)
            .copied()
            .ok_or(FrameError::NoSuchEntry {
                index,
                count: state.index.len(),
            })?;
        Ok(MessageCursor::new(&self.buf, &state.spans, entry))
    }
}
