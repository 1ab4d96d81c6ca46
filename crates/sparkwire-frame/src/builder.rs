//! Outbound message construction.
//!
//! `start_message` opens a message, the `add_*` encoders append payload at
//! the logical cursor, and `end_message` seals every block: chunk prefix,
//! terminator, block length, sequence number and checksum. Blocks are
//! opened on demand as the cursor crosses a chunk boundary.

use bytes::{Bytes, BytesMut};

use crate::buffer::{ChunkSpan, FrameBuffer};
use crate::codec::{Direction, Mode, SparkCodec};
use crate::error::{FrameError, Result};
use crate::{
    token, BLOCK_HEADER_SIZE, BLOCK_MAGIC, BLOCK_SIZE, CHUNK_END, CHUNK_HEADER_SIZE,
    CHUNK_PREFIX_SIZE, CHUNK_START, DATA_SIZE, MAX_PAYLOAD, STR_LEN,
};

const LEN_OFFSET: usize = 6;
const SEQ_OFFSET: usize = BLOCK_HEADER_SIZE + 2;
const CHECKSUM_OFFSET: usize = BLOCK_HEADER_SIZE + 3;
const DATA_OFFSET: usize = BLOCK_HEADER_SIZE + CHUNK_HEADER_SIZE;

pub(crate) struct BuildState {
    pub(crate) cmd: u8,
    pub(crate) sub_cmd: u8,
    pub(crate) multi: bool,
    pub(crate) spans: Vec<ChunkSpan>,
    pub(crate) len: usize,
    /// Sequence number, stamped by `end_message`.
    pub(crate) seq: Option<u8>,
}

impl BuildState {
    fn new(cmd: u8, sub_cmd: u8, multi: bool) -> Self {
        Self {
            cmd,
            sub_cmd,
            multi,
            spans: Vec::new(),
            len: 0,
            seq: None,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.seq.is_none()
    }

    fn capacity(&self) -> usize {
        if self.multi {
            MAX_PAYLOAD
        } else {
            DATA_SIZE
        }
    }

    pub(crate) fn block_len(span: &ChunkSpan) -> usize {
        DATA_OFFSET + span.encoded_len() + 1
    }

    fn open_chunk(&mut self, buf: &mut FrameBuffer, direction: Direction) {
        let index = self.spans.len();
        let block = buf.block_mut(index);
        block.fill(0);
        block[..BLOCK_MAGIC.len()].copy_from_slice(&BLOCK_MAGIC);
        block[4..6].copy_from_slice(&direction.marker());
        block[BLOCK_HEADER_SIZE] = CHUNK_START;
        block[BLOCK_HEADER_SIZE + 1] = 0x01;
        block[BLOCK_HEADER_SIZE + 4] = self.cmd;
        block[BLOCK_HEADER_SIZE + 5] = self.sub_cmd;

        self.spans.push(ChunkSpan {
            physical: index * BLOCK_SIZE + DATA_OFFSET,
            logical_start: self.len,
            skip: if self.multi { CHUNK_PREFIX_SIZE } else { 0 },
            len: 0,
        });
        if index > 0 {
            tracing::debug!(block = index, pos = self.len, "opened continuation block");
        }
    }

    fn push(&mut self, buf: &mut FrameBuffer, direction: Direction, value: u8) {
        if self.spans.len() <= self.len / DATA_SIZE {
            self.open_chunk(buf, direction);
        }
        if let Some(span) = self.spans.last_mut() {
            buf.store(span, span.skip + span.len, value);
            span.len += 1;
            self.len += 1;
        }
    }
}

impl SparkCodec {
    /// Open a new outbound message.
    ///
    /// A finished message still held in the buffer is replaced. An open one
    /// is not: finish it with [`end_message`](Self::end_message) or drop it
    /// with [`reset`](Self::reset) first.
    pub fn start_message(&mut self, cmd: u8, sub_cmd: u8, multi: bool) -> Result<()> {
        match &self.mode {
            Mode::Building(state) if state.is_open() => {
                return Err(FrameError::MessageInProgress {
                    cmd: state.cmd,
                    sub_cmd: state.sub_cmd,
                });
            }
            Mode::Scanning(_) => return Err(self.conflict("start a message")),
            _ => {}
        }

        tracing::debug!(cmd, sub_cmd, multi, "message opened");
        self.mode = Mode::Building(BuildState::new(cmd, sub_cmd, multi));
        Ok(())
    }

    /// Seal the open message.
    pub fn end_message(&mut self) -> Result<()> {
        let Self {
            buf,
            mode,
            config,
            seq,
        } = self;
        let state = match mode {
            Mode::Building(state) if state.is_open() => state,
            _ => return Err(FrameError::NoOpenMessage),
        };

        if state.spans.is_empty() {
            state.open_chunk(buf, config.direction);
        }

        let stamp = *seq;
        *seq = (*seq + 1) & 0x7F;

        let checksum = config.checksum.strategy();
        let count = state.spans.len();
        for (index, span) in state.spans.iter().enumerate() {
            if state.multi {
                buf.store(span, 0, count as u8);
                buf.store(span, 1, index as u8);
                buf.store(span, 2, span.len as u8);
            }

            let block_len = BuildState::block_len(span);
            let data_end = block_len - 1;
            let block = buf.block_mut(index);
            block[data_end] = CHUNK_END;
            block[LEN_OFFSET] = block_len as u8;
            block[SEQ_OFFSET] = stamp;
            let sum = checksum.compute(&block[DATA_OFFSET..data_end]);
            block[CHECKSUM_OFFSET] = sum;
        }

        state.seq = Some(stamp);
        tracing::debug!(
            cmd = state.cmd,
            sub_cmd = state.sub_cmd,
            blocks = count,
            len = state.len,
            seq = stamp,
            "message finished"
        );
        Ok(())
    }

    /// Append one raw byte.
    pub fn add_byte(&mut self, value: u8) -> Result<()> {
        self.put(&[&[value]])
    }

    /// Append a string token: `A0+len` for short strings, `D9 len` beyond.
    pub fn add_string(&mut self, value: &str) -> Result<()> {
        let bytes = checked_str(value)?;
        if bytes.len() <= token::SHORT_STR_MAX {
            self.put(&[&[token::SHORT_STR_BASE + bytes.len() as u8], bytes])
        } else {
            self.put(&[&[token::LONG_STR, bytes.len() as u8], bytes])
        }
    }

    /// Append a string token that always uses the long form.
    pub fn add_long_string(&mut self, value: &str) -> Result<()> {
        let bytes = checked_str(value)?;
        self.put(&[&[token::LONG_STR, bytes.len() as u8], bytes])
    }

    /// Append a length byte followed by a string token.
    pub fn add_prefixed_string(&mut self, value: &str) -> Result<()> {
        let bytes = checked_str(value)?;
        let len = bytes.len() as u8;
        if bytes.len() <= token::SHORT_STR_MAX {
            self.put(&[&[len, token::SHORT_STR_BASE + len], bytes])
        } else {
            self.put(&[&[len, token::LONG_STR, len], bytes])
        }
    }

    /// Append a float token (big-endian IEEE-754).
    pub fn add_float(&mut self, value: f32) -> Result<()> {
        self.put(&[&[token::FLOAT], &value.to_be_bytes()])
    }

    /// Append an on/off token.
    pub fn add_onoff(&mut self, on: bool) -> Result<()> {
        self.put(&[&[if on { token::ON } else { token::OFF }]])
    }

    /// Sequence number stamped on the finished message; `None` while it is
    /// still open or when nothing is being built.
    pub fn sequence(&self) -> Option<u8> {
        match &self.mode {
            Mode::Building(state) => state.seq,
            _ => None,
        }
    }

    /// Payload bytes written to the current message.
    pub fn payload_len(&self) -> usize {
        match &self.mode {
            Mode::Building(state) => state.len,
            _ => 0,
        }
    }

    /// Blocks used by the current message.
    pub fn block_count(&self) -> usize {
        match &self.mode {
            Mode::Building(state) => state.spans.len(),
            _ => 0,
        }
    }

    /// Block slices of the finished message, each trimmed to its length.
    pub fn blocks(&self) -> Result<Vec<&[u8]>> {
        let state = self.finished()?;
        Ok(state
            .spans
            .iter()
            .enumerate()
            .map(|(index, span)| &self.buf.block(index)[..BuildState::block_len(span)])
            .collect())
    }

    /// Wire image of the finished message, ready for the transport.
    pub fn wire(&self) -> Result<Bytes> {
        let blocks = self.blocks()?;
        let mut out = BytesMut::with_capacity(blocks.iter().map(|b| b.len()).sum());
        for block in blocks {
            out.extend_from_slice(block);
        }
        Ok(out.freeze())
    }

    fn finished(&self) -> Result<&BuildState> {
        match &self.mode {
            Mode::Building(state) if !state.is_open() => Ok(state),
            _ => Err(FrameError::NoFinishedMessage),
        }
    }

    fn put(&mut self, parts: &[&[u8]]) -> Result<()> {
        let Self {
            buf, mode, config, ..
        } = self;
        let state = match mode {
            Mode::Building(state) if state.is_open() => state,
            _ => return Err(FrameError::NoOpenMessage),
        };

        let total: usize = parts.iter().map(|part| part.len()).sum();
        let capacity = state.capacity();
        if state.len + total > capacity {
            return Err(FrameError::CapacityExceeded {
                needed: state.len + total,
                capacity,
            });
        }

        for &byte in parts.iter().flat_map(|part| part.iter()) {
            state.push(buf, config.direction, byte);
        }
        Ok(())
    }
}

fn checked_str(value: &str) -> Result<&[u8]> {
    let bytes = value.as_bytes();
    if bytes.len() > STR_LEN {
        return Err(FrameError::StringTooLong {
            len: bytes.len(),
            max: STR_LEN,
        });
    }
    Ok(bytes)
}
