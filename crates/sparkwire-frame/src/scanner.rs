//! Inbound scanning.
//!
//! Raw bytes pulled from the transport land in the frame buffer as-is.
//! `parse_data` walks them block by block, validates each `F0 .. F7`
//! chunk, records where its payload lives as a [`ChunkSpan`], and appends a
//! [`MessageEntry`] once a message is complete. The parse cursor only ever
//! moves past whole units, so a chunk still missing its terminator stays
//! unindexed until more bytes arrive and repeated calls are idempotent.

use sparkwire_transport::Transport;

use crate::buffer::{ChunkSpan, FrameBuffer};
use crate::checksum::Checksum;
use crate::codec::{Direction, Mode, SparkCodec};
use crate::error::{FrameError, Result};
use crate::index::{MessageEntry, MessageIndex};
use crate::{
    expand, opcode, BLOCK_HEADER_SIZE, BLOCK_MAGIC, BLOCK_SIZE, BUFFER_CAPACITY, CHUNK_END,
    CHUNK_HEADER_SIZE, CHUNK_PREFIX_SIZE, CHUNK_START, IN_DATA_SIZE, NUM_BLOCKS,
};

/// Smallest block that can hold an empty chunk.
const MIN_BLOCK_LEN: usize = BLOCK_HEADER_SIZE + CHUNK_HEADER_SIZE + 1;

/// Configuration for inbound scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Bytes requested from the transport per `get_data` call.
    pub read_chunk_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: IN_DATA_SIZE,
        }
    }
}

/// Outcome of one `get_data` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Bytes arrived but no new message is complete yet.
    Pending,
    /// At least one new message was indexed.
    Ready,
    /// The transport had nothing to deliver.
    Exhausted,
    /// The index (or the buffer behind it) is full; drain before reading on.
    DrainRequired,
}

/// What one parse pass found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Entries appended to the index.
    pub new_messages: usize,
    /// Chunks or blocks rejected as malformed.
    pub malformed: usize,
    /// Bytes skipped while looking for a block header.
    pub skipped: usize,
    /// Scanning stopped because the index is full.
    pub index_full: bool,
    /// Unconsumed bytes or an unfinished multi-block message remain.
    pub partial: bool,
}

struct PendingMessage {
    cmd: u8,
    sub_cmd: u8,
    start: usize,
    count: u8,
    next: u8,
    /// Single-chunk messages indexed since this one started.
    interleaved: usize,
}

enum Step {
    Continue,
    Wait,
}

pub(crate) struct ScanState {
    multi: bool,
    read_chunk_size: usize,
    pub(crate) filled: usize,
    pub(crate) parsed: usize,
    block_end: Option<usize>,
    next_logical: usize,
    pub(crate) spans: Vec<ChunkSpan>,
    pending: Option<PendingMessage>,
    pub(crate) index: MessageIndex,
    pub(crate) malformed: usize,
}

impl ScanState {
    fn new(start: usize, multi: bool, config: ScanConfig) -> Self {
        Self {
            multi,
            read_chunk_size: config.read_chunk_size.clamp(1, BUFFER_CAPACITY),
            filled: 0,
            parsed: 0,
            block_end: None,
            next_logical: start,
            spans: Vec::new(),
            pending: None,
            index: MessageIndex::new(),
            malformed: 0,
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn parse(&mut self, buf: &FrameBuffer, checksum: &dyn Checksum) -> Result<ParseReport> {
        let mut report = ParseReport::default();
        let bytes = &buf.as_slice()[..self.filled];

        loop {
            if self.index.is_full() {
                report.index_full = self.parsed < self.filled;
                break;
            }

            let step = match self.block_end {
                None => self.enter_block(bytes, &mut report),
                Some(end) if self.parsed >= end => {
                    self.block_end = None;
                    Step::Continue
                }
                Some(end) => self.take_chunk(bytes, end, buf, checksum, &mut report)?,
            };
            if let Step::Wait = step {
                break;
            }
        }

        report.partial = self.parsed < self.filled || self.pending.is_some();
        Ok(report)
    }

    fn enter_block(&mut self, bytes: &[u8], report: &mut ParseReport) -> Step {
        let rest = &bytes[self.parsed..];
        if rest.is_empty() {
            return Step::Wait;
        }

        match find_magic(rest) {
            None => {
                self.skip_noise(rest.len(), report);
                Step::Wait
            }
            Some(skip) if skip > 0 => {
                self.skip_noise(skip, report);
                Step::Continue
            }
            Some(_) if rest.len() < BLOCK_HEADER_SIZE => Step::Wait,
            Some(_) => {
                let direction = Direction::from_marker([rest[4], rest[5]]);
                let len = rest[6] as usize;
                if direction.is_none() || !(MIN_BLOCK_LEN..=BLOCK_SIZE).contains(&len) {
                    self.reject(report, "bad block header");
                    self.parsed += 1;
                    return Step::Continue;
                }
                tracing::trace!(at = self.parsed, len, ?direction, "block");
                self.block_end = Some(self.parsed + len);
                self.parsed += BLOCK_HEADER_SIZE;
                Step::Continue
            }
        }
    }

    fn take_chunk(
        &mut self,
        bytes: &[u8],
        end: usize,
        buf: &FrameBuffer,
        checksum: &dyn Checksum,
        report: &mut ParseReport,
    ) -> Result<Step> {
        let limit = end.min(self.filled);
        if self.parsed >= limit {
            return Ok(Step::Wait);
        }
        let rest = &bytes[self.parsed..limit];

        if rest[0] != CHUNK_START {
            let skip = rest
                .iter()
                .position(|b| *b == CHUNK_START)
                .unwrap_or(rest.len());
            self.reject(report, "missing chunk start");
            self.parsed += skip;
            return Ok(Step::Continue);
        }

        let Some(term) = rest.iter().position(|b| *b == CHUNK_END) else {
            if limit == end {
                self.reject(report, "chunk without terminator");
                self.parsed = end;
                return Ok(Step::Continue);
            }
            return Ok(Step::Wait);
        };

        let chunk_start = self.parsed;
        self.parsed += term + 1;
        if term < CHUNK_HEADER_SIZE {
            self.reject(report, "truncated chunk header");
            return Ok(Step::Continue);
        }

        let (seq, sum, cmd, sub_cmd) = (rest[2], rest[3], rest[4], rest[5]);
        let data = &rest[CHUNK_HEADER_SIZE..term];
        if !checksum.verify(data, sum) {
            self.reject(report, "checksum mismatch");
            return Ok(Step::Continue);
        }
        let Some(len) = expand::logical_len(data.len()) else {
            self.reject(report, "ragged 7-bit group");
            return Ok(Step::Continue);
        };

        tracing::trace!(cmd, sub_cmd, seq, len, "chunk");
        self.accept_chunk(buf, chunk_start + CHUNK_HEADER_SIZE, len, cmd, sub_cmd, report)?;
        Ok(Step::Continue)
    }

    fn accept_chunk(
        &mut self,
        buf: &FrameBuffer,
        physical: usize,
        len: usize,
        cmd: u8,
        sub_cmd: u8,
        report: &mut ParseReport,
    ) -> Result<()> {
        if !(self.multi || opcode::is_multi_chunk(cmd, sub_cmd)) {
            let stale = self.pending.as_mut().is_some_and(|pending| {
                pending.interleaved += 1;
                pending.interleaved >= NUM_BLOCKS
            });
            if stale {
                self.pending = None;
                self.reject(report, "multi-block message abandoned");
            }
            let span = ChunkSpan {
                physical,
                logical_start: self.next_logical,
                skip: 0,
                len,
            };
            self.spans.push(span);
            self.next_logical = span.end();
            self.index.push(MessageEntry {
                cmd,
                sub_cmd,
                start: span.logical_start,
                end: span.end(),
            })?;
            report.new_messages += 1;
            return Ok(());
        }

        if len < CHUNK_PREFIX_SIZE {
            self.reject(report, "missing multi-block prefix");
            return Ok(());
        }
        let span = ChunkSpan {
            physical,
            logical_start: self.next_logical,
            skip: CHUNK_PREFIX_SIZE,
            len: len - CHUNK_PREFIX_SIZE,
        };
        let count = buf.load(&span, 0);
        let chunk_index = buf.load(&span, 1);
        let declared = buf.load(&span, 2) as usize;
        if count == 0
            || usize::from(count) > NUM_BLOCKS
            || chunk_index >= count
            || declared != span.len
        {
            self.reject(report, "inconsistent multi-block prefix");
            return Ok(());
        }

        if chunk_index == 0 {
            if self.pending.take().is_some() {
                self.reject(report, "multi-block message abandoned");
            }
            self.pending = Some(PendingMessage {
                cmd,
                sub_cmd,
                start: self.next_logical,
                count,
                next: 0,
                interleaved: 0,
            });
        } else {
            let continues = matches!(
                &self.pending,
                Some(p) if p.cmd == cmd && p.sub_cmd == sub_cmd && p.count == count && p.next == chunk_index
            );
            if !continues {
                self.pending = None;
                self.reject(report, "multi-block chunk out of order");
                return Ok(());
            }
        }

        self.spans.push(span);
        self.next_logical = span.end();

        let done = self.pending.as_mut().and_then(|pending| {
            pending.next += 1;
            (pending.next == pending.count).then_some(pending.start)
        });
        if let Some(start) = done {
            self.pending = None;
            let entry = MessageEntry {
                cmd,
                sub_cmd,
                start,
                end: self.next_logical,
            };
            self.index.push(entry)?;
            report.new_messages += 1;
            tracing::debug!(cmd, sub_cmd, len = entry.len(), chunks = count, "multi-block message complete");
        }
        Ok(())
    }

    fn reject(&mut self, report: &mut ParseReport, reason: &'static str) {
        tracing::warn!(at = self.parsed, reason, "dropping malformed data");
        self.malformed += 1;
        report.malformed += 1;
    }

    fn skip_noise(&mut self, count: usize, report: &mut ParseReport) {
        tracing::warn!(at = self.parsed, count, "skipping bytes outside any block");
        self.parsed += count;
        report.skipped += count;
    }

    /// Compact when fewer than `wanted` bytes are free. If `required` still
    /// does not fit and an unfinished multi-block message is the only thing
    /// holding the buffer, that message is abandoned. Returns the number of
    /// messages abandoned.
    fn make_room(&mut self, buf: &mut FrameBuffer, wanted: usize, required: usize) -> usize {
        if BUFFER_CAPACITY - self.filled >= wanted {
            return 0;
        }
        self.compact(buf);
        if BUFFER_CAPACITY - self.filled >= required || !self.index.is_empty() {
            return 0;
        }
        let Some(pending) = self.pending.take() else {
            return 0;
        };
        tracing::warn!(
            cmd = pending.cmd,
            sub_cmd = pending.sub_cmd,
            received = pending.next,
            count = pending.count,
            "multi-block message abandoned to free the buffer"
        );
        self.malformed += 1;
        self.compact(buf);
        1
    }

    /// Drop raw bytes that no indexed or pending message still needs.
    fn compact(&mut self, buf: &mut FrameBuffer) {
        let live_from = [
            self.index.first().map(|entry| entry.start),
            self.pending.as_ref().map(|pending| pending.start),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(self.next_logical);

        let keep = self
            .spans
            .iter()
            .find(|span| span.end() > live_from)
            .map_or(self.parsed, |span| span.physical.min(self.parsed));
        if keep == 0 {
            return;
        }

        buf.as_mut_slice().copy_within(keep..self.filled, 0);
        self.filled -= keep;
        self.parsed -= keep;
        if let Some(end) = self.block_end.as_mut() {
            *end -= keep;
        }
        self.spans.retain(|span| span.physical >= keep);
        for span in &mut self.spans {
            span.physical -= keep;
        }
        tracing::trace!(dropped = keep, retained = self.filled, "compacted scan buffer");
    }
}

/// First offset where a block header starts, or where a header prefix runs
/// into the end of `bytes`.
fn find_magic(bytes: &[u8]) -> Option<usize> {
    (0..bytes.len()).find(|&at| {
        let tail = &bytes[at..];
        let n = tail.len().min(BLOCK_MAGIC.len());
        tail[..n] == BLOCK_MAGIC[..n]
    })
}

impl SparkCodec {
    /// Prime the buffer for inbound bytes.
    ///
    /// `start` is the logical position assigned to the first payload byte;
    /// `multi` treats every chunk as carrying the multi-block prefix (preset
    /// chunks always do). A finished outbound message is discarded; an open
    /// one is a conflict.
    pub fn start_reading(&mut self, start: usize, multi: bool) -> Result<()> {
        self.start_reading_with(start, multi, ScanConfig::default())
    }

    /// [`start_reading`](Self::start_reading) with explicit configuration.
    pub fn start_reading_with(&mut self, start: usize, multi: bool, config: ScanConfig) -> Result<()> {
        if self.is_message_open() {
            return Err(self.conflict("start reading"));
        }
        tracing::debug!(start, multi, "reading started");
        self.mode = Mode::Scanning(ScanState::new(start, multi, config));
        Ok(())
    }

    /// Leave reading mode, discarding scanned bytes and the index.
    pub fn stop_reading(&mut self) {
        if self.is_reading() {
            self.mode = Mode::Idle;
        }
    }

    /// Pull the next bytes from `transport` and index what completed.
    pub fn get_data<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<ReadStatus> {
        let Self {
            buf, mode, config, ..
        } = self;
        let Mode::Scanning(state) = mode else {
            return Err(FrameError::NotReading);
        };

        if state.index.is_full() {
            return Ok(ReadStatus::DrainRequired);
        }
        state.make_room(buf, state.read_chunk_size, 1);
        let room = BUFFER_CAPACITY - state.filled;
        if room == 0 {
            if state.index.is_empty() {
                return Err(FrameError::CapacityExceeded {
                    needed: BUFFER_CAPACITY + 1,
                    capacity: BUFFER_CAPACITY,
                });
            }
            return Ok(ReadStatus::DrainRequired);
        }

        let from = state.filled;
        let want = room.min(state.read_chunk_size);
        let read = transport.read(&mut buf.as_mut_slice()[from..from + want])?;
        state.filled += read;

        let report = state.parse(buf, config.checksum.strategy())?;
        Ok(if report.index_full {
            ReadStatus::DrainRequired
        } else if report.new_messages > 0 {
            ReadStatus::Ready
        } else if read == 0 {
            ReadStatus::Exhausted
        } else {
            ReadStatus::Pending
        })
    }

    /// Push bytes received by other means and parse them.
    pub fn feed(&mut self, data: &[u8]) -> Result<ParseReport> {
        let Self {
            buf, mode, config, ..
        } = self;
        let Mode::Scanning(state) = mode else {
            return Err(FrameError::NotReading);
        };

        let abandoned = state.make_room(buf, data.len(), data.len());
        if BUFFER_CAPACITY - state.filled < data.len() {
            return Err(FrameError::CapacityExceeded {
                needed: state.filled + data.len(),
                capacity: BUFFER_CAPACITY,
            });
        }

        let from = state.filled;
        buf.as_mut_slice()[from..from + data.len()].copy_from_slice(data);
        state.filled += data.len();
        let mut report = state.parse(buf, config.checksum.strategy())?;
        report.malformed += abandoned;
        Ok(report)
    }

    /// Scan the bytes received so far.
    pub fn parse_data(&mut self) -> Result<ParseReport> {
        let Self {
            buf, mode, config, ..
        } = self;
        let Mode::Scanning(state) = mode else {
            return Err(FrameError::NotReading);
        };
        state.parse(buf, config.checksum.strategy())
    }

    /// Indexed messages of the current scan cycle.
    pub fn messages(&self) -> &[MessageEntry] {
        match &self.mode {
            Mode::Scanning(state) => state.index.as_slice(),
            _ => &[],
        }
    }

    /// Number of indexed messages.
    pub fn num_messages(&self) -> usize {
        self.messages().len()
    }

    /// The entry at `index`.
    pub fn message(&self, index: usize) -> Result<MessageEntry> {
        let state = self.scan_state()?;
        state
            .index
            .get(index)
            .copied()
            .ok_or(FrameError::NoSuchEntry {
                index,
                count: state.index.len(),
            })
    }

    /// Consume every indexed message and release the bytes behind them.
    ///
    /// Decode what you need first: drained positions are no longer backed
    /// by buffer contents.
    pub fn drain_messages(&mut self) -> Result<Vec<MessageEntry>> {
        let Self { buf, mode, .. } = self;
        let Mode::Scanning(state) = mode else {
            return Err(FrameError::NotReading);
        };
        let entries = state.index.take();
        state.compact(buf);
        Ok(entries)
    }

    /// Chunks and blocks rejected since `start_reading`.
    pub fn malformed_count(&self) -> usize {
        self.scan_state().map_or(0, |state| state.malformed)
    }

    /// Received bytes not yet consumed by the parser.
    pub fn unparsed_len(&self) -> usize {
        self.scan_state()
            .map_or(0, |state| state.filled - state.parsed)
    }

    /// Whether received bytes still wait for the rest of a chunk or of a
    /// multi-block message.
    pub fn is_partial(&self) -> bool {
        self.scan_state()
            .is_ok_and(|state| state.filled > state.parsed || state.has_pending())
    }
}

#[cfg(test)]
mod tests {
    use sparkwire_transport::Loopback;

    use super::*;
    use crate::codec::CodecConfig;
    use crate::MAX_MESSAGES;

    fn wire(cmd: u8, sub_cmd: u8, multi: bool, payload: &[u8]) -> Vec<u8> {
        let mut codec = SparkCodec::new();
        codec.start_message(cmd, sub_cmd, multi).unwrap();
        for b in payload {
            codec.add_byte(*b).unwrap();
        }
        codec.end_message().unwrap();
        codec.wire().unwrap().to_vec()
    }

    fn payload(codec: &SparkCodec, entry: &MessageEntry) -> Vec<u8> {
        let state = codec.scan_state().unwrap();
        entry
            .range()
            .map(|pos| codec.buf.read(&state.spans, pos).unwrap())
            .collect()
    }

    fn reader() -> SparkCodec {
        let mut codec = SparkCodec::new();
        codec.start_reading(0, false).unwrap();
        codec
    }

    #[test]
    fn indexes_a_single_message() {
        let mut codec = reader();
        let report = codec.feed(&wire(0x01, 0x38, false, &[0x00, 0x02])).unwrap();

        assert_eq!(report.new_messages, 1);
        assert!(!report.partial);
        let entry = codec.message(0).unwrap();
        assert_eq!(
            entry,
            MessageEntry {
                cmd: 0x01,
                sub_cmd: 0x38,
                start: 0,
                end: 2
            }
        );
        assert_eq!(payload(&codec, &entry), vec![0x00, 0x02]);
    }

    #[test]
    fn positions_start_at_the_primed_offset() {
        let mut codec = SparkCodec::new();
        codec.start_reading(100, false).unwrap();
        codec.feed(&wire(0x03, 0x38, false, &[0x00, 0x01])).unwrap();
        codec.feed(&wire(0x03, 0x38, false, &[0x00, 0x03])).unwrap();

        assert_eq!(codec.messages()[0].range(), 100..102);
        assert_eq!(codec.messages()[1].range(), 102..104);
    }

    #[test]
    fn incomplete_chunk_stays_unindexed() {
        let bytes = wire(0x01, 0x04, false, b"partial data");
        let mut codec = reader();

        let report = codec.feed(&bytes[..bytes.len() - 1]).unwrap();
        assert_eq!(report.new_messages, 0);
        assert!(report.partial);
        assert_eq!(codec.num_messages(), 0);

        let report = codec.feed(&bytes[bytes.len() - 1..]).unwrap();
        assert_eq!(report.new_messages, 1);
        assert_eq!(payload(&codec, &codec.message(0).unwrap()), b"partial data");
    }

    #[test]
    fn parse_is_idempotent() {
        let mut bytes = wire(0x01, 0x06, false, b"ab");
        let tail = wire(0x01, 0x06, false, b"cd");
        bytes.extend_from_slice(&tail[..tail.len() - 3]);

        let mut codec = reader();
        codec.feed(&bytes).unwrap();
        let before = codec.messages().to_vec();

        let report = codec.parse_data().unwrap();
        assert_eq!(report.new_messages, 0);
        let report = codec.parse_data().unwrap();
        assert_eq!(report.new_messages, 0);
        assert_eq!(codec.messages(), before.as_slice());
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn multi_block_message_spans_blocks() {
        let data: Vec<u8> = (0..300u32).map(|i| (i * 7) as u8).collect();
        let bytes = wire(0x01, 0x01, true, &data);
        assert_eq!(bytes.len(), 2 * BLOCK_SIZE + MIN_BLOCK_LEN + expand::encoded_len(3 + 44));

        let mut codec = reader();
        codec.feed(&bytes).unwrap();

        let entry = codec.message(0).unwrap();
        assert_eq!(entry.len(), 300);
        assert_eq!(payload(&codec, &entry), data);
    }

    #[test]
    fn multi_flag_applies_prefix_to_any_sub_command() {
        let bytes = wire(0x01, 0x04, true, &[1, 2, 3]);

        let mut codec = SparkCodec::new();
        codec.start_reading(0, true).unwrap();
        codec.feed(&bytes).unwrap();
        assert_eq!(payload(&codec, &codec.message(0).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn corrupted_checksum_is_dropped_and_scanning_continues() {
        let mut bad = wire(0x01, 0x04, false, &[1, 2, 3]);
        bad[BLOCK_HEADER_SIZE + 3] ^= 0x01;
        let good = wire(0x01, 0x06, false, &[4]);

        let mut codec = reader();
        let mut stream = bad;
        stream.extend_from_slice(&good);
        let report = codec.feed(&stream).unwrap();

        assert_eq!(report.malformed, 1);
        assert_eq!(codec.num_messages(), 1);
        assert_eq!(codec.message(0).unwrap().sub_cmd, 0x06);
        assert_eq!(codec.malformed_count(), 1);
    }

    #[test]
    fn noise_before_a_block_is_skipped() {
        let mut stream = vec![0x55, 0x66, 0x01, 0x77];
        stream.extend_from_slice(&wire(0x01, 0x15, false, &[9]));

        let mut codec = reader();
        let report = codec.feed(&stream).unwrap();
        assert_eq!(report.skipped, 4);
        assert_eq!(report.new_messages, 1);
    }

    #[test]
    fn out_of_order_chunk_is_rejected() {
        let data = vec![0x42; 200];
        let bytes = wire(0x01, 0x01, true, &data);

        let mut codec = reader();
        let report = codec.feed(&bytes[BLOCK_SIZE..]).unwrap();
        assert_eq!(report.malformed, 1);

        let report = codec.feed(&bytes[..BLOCK_SIZE]).unwrap();
        assert_eq!(report.new_messages, 0);
        assert!(report.partial);
        assert!(codec.is_partial());
        assert_eq!(codec.unparsed_len(), 0);
    }

    #[test]
    fn amp_direction_blocks_are_accepted() {
        let mut amp = SparkCodec::with_config(CodecConfig {
            direction: Direction::FromAmp,
            ..CodecConfig::default()
        });
        amp.start_message(0x03, 0x38, false).unwrap();
        amp.add_byte(0).unwrap();
        amp.add_byte(1).unwrap();
        amp.end_message().unwrap();

        let mut codec = reader();
        codec.feed(&amp.wire().unwrap()).unwrap();
        assert_eq!(codec.message(0).unwrap().cmd, 0x03);
    }

    #[test]
    fn get_data_reports_progress() {
        let mut link = Loopback::new().with_read_limit(5);
        link.push_incoming(&wire(0x01, 0x38, false, &[0, 1]));

        let mut codec = reader();
        let mut statuses = Vec::new();
        loop {
            let status = codec.get_data(&mut link).unwrap();
            statuses.push(status);
            if status != ReadStatus::Pending {
                break;
            }
        }

        assert_eq!(statuses.last(), Some(&ReadStatus::Ready));
        assert!(statuses[..statuses.len() - 1]
            .iter()
            .all(|s| *s == ReadStatus::Pending));
        assert_eq!(codec.get_data(&mut link).unwrap(), ReadStatus::Exhausted);
    }

    #[test]
    fn index_capacity_applies_back_pressure() {
        let mut link = Loopback::new();
        for n in 0..=MAX_MESSAGES {
            link.push_incoming(&wire(0x03, 0x38, false, &[0, n as u8]));
        }

        let mut codec = reader();
        let status = loop {
            match codec.get_data(&mut link).unwrap() {
                ReadStatus::Pending | ReadStatus::Ready => continue,
                other => break other,
            }
        };

        assert_eq!(status, ReadStatus::DrainRequired);
        assert_eq!(codec.num_messages(), MAX_MESSAGES);
        let first = codec.message(0).unwrap();
        assert_eq!(payload(&codec, &first), vec![0, 0]);

        let drained = codec.drain_messages().unwrap();
        assert_eq!(drained.len(), MAX_MESSAGES);
        assert_eq!(codec.num_messages(), 0);

        let status = loop {
            match codec.get_data(&mut link).unwrap() {
                ReadStatus::Pending => continue,
                other => break other,
            }
        };
        assert_eq!(status, ReadStatus::Ready);
        let last = codec.message(0).unwrap();
        assert_eq!(payload(&codec, &last), vec![0, MAX_MESSAGES as u8]);
    }

    #[test]
    fn exactly_full_index_is_not_back_pressure() {
        let mut codec = reader();
        let mut stream = Vec::new();
        for n in 0..MAX_MESSAGES {
            stream.extend_from_slice(&wire(0x03, 0x38, false, &[0, n as u8]));
        }
        let report = codec.feed(&stream).unwrap();

        assert_eq!(report.new_messages, MAX_MESSAGES);
        assert!(!report.index_full);
    }

    #[test]
    fn compaction_keeps_pending_messages_readable() {
        let mut codec = reader();
        codec.feed(&wire(0x03, 0x38, false, &[0, 1])).unwrap();
        let preset: Vec<u8> = (0..250u32).map(|i| i as u8).collect();
        let bytes = wire(0x03, 0x01, true, &preset);
        codec.feed(&bytes[..BLOCK_SIZE + 10]).unwrap();

        codec.drain_messages().unwrap();
        codec.feed(&bytes[BLOCK_SIZE + 10..]).unwrap();

        let entry = codec.message(0).unwrap();
        assert_eq!(entry.start, 2);
        assert_eq!(payload(&codec, &entry), preset);
    }

    #[test]
    fn overflowing_feed_is_a_capacity_error() {
        let mut codec = reader();
        codec.feed(&wire(0x01, 0x01, true, &[0; 200])[..BLOCK_SIZE]).unwrap();
        let err = codec.feed(&vec![0u8; BUFFER_CAPACITY + 1]).unwrap_err();
        assert!(matches!(err, FrameError::CapacityExceeded { .. }));
    }

    #[test]
    fn unfinished_multi_block_message_gives_way_when_the_buffer_fills() {
        let mut codec = reader();
        codec.feed(&wire(0x03, 0x01, true, &[0; 200])[..BLOCK_SIZE]).unwrap();
        codec.feed(&vec![0x55; BUFFER_CAPACITY - BLOCK_SIZE]).unwrap();
        assert!(codec.is_partial());

        let report = codec.feed(&wire(0x03, 0x38, false, &[0, 4])).unwrap();
        assert_eq!(report.new_messages, 1);
        assert_eq!(report.malformed, 1);
        assert_eq!(codec.malformed_count(), 1);
        assert!(!codec.is_partial());
        assert_eq!(payload(&codec, &codec.message(0).unwrap()), vec![0, 4]);
    }

    #[test]
    fn unfinished_multi_block_message_expires_behind_other_traffic() {
        let mut codec = reader();
        codec.feed(&wire(0x03, 0x01, true, &[0; 200])[..BLOCK_SIZE]).unwrap();
        for n in 0..NUM_BLOCKS {
            assert!(codec.scan_state().unwrap().has_pending());
            codec.feed(&wire(0x03, 0x38, false, &[0, n as u8])).unwrap();
        }

        assert!(!codec.scan_state().unwrap().has_pending());
        assert_eq!(codec.malformed_count(), 1);
        assert_eq!(codec.num_messages(), NUM_BLOCKS);
    }

    #[test]
    fn get_data_recovers_from_a_stuck_multi_block_message() {
        let mut link = Loopback::new();
        link.push_incoming(&wire(0x03, 0x01, true, &[0; 200])[..BLOCK_SIZE]);
        link.push_incoming(&vec![0x55; BUFFER_CAPACITY]);
        link.push_incoming(&wire(0x03, 0x38, false, &[0, 9]));

        let mut codec = reader();
        loop {
            match codec.get_data(&mut link).unwrap() {
                ReadStatus::Exhausted => break,
                ReadStatus::DrainRequired => unreachable!("index never fills"),
                ReadStatus::Pending | ReadStatus::Ready => {}
            }
        }
        assert_eq!(codec.malformed_count(), 1);
        assert_eq!(codec.num_messages(), 1);
        assert_eq!(payload(&codec, &codec.message(0).unwrap()), vec![0, 9]);
    }

    #[test]
    fn reading_while_building_is_a_conflict() {
        let mut codec = SparkCodec::new();
        codec.start_message(0x01, 0x04, false).unwrap();
        assert!(matches!(
            codec.start_reading(0, false),
            Err(FrameError::ModeConflict { .. })
        ));

        codec.end_message().unwrap();
        codec.start_reading(0, false).unwrap();
        assert!(codec.is_reading());
    }

    #[test]
    fn scanning_calls_need_reading_mode() {
        let mut codec = SparkCodec::new();
        assert!(matches!(codec.parse_data(), Err(FrameError::NotReading)));
        assert!(matches!(codec.message(0), Err(FrameError::NotReading)));
        assert!(codec.messages().is_empty());

        codec.start_reading(0, false).unwrap();
        assert!(matches!(
            codec.message(3),
            Err(FrameError::NoSuchEntry { index: 3, count: 0 })
        ));
    }

    #[test]
    fn find_magic_handles_partial_headers() {
        assert_eq!(find_magic(&[0x01, 0xFE, 0x00, 0x00, 0x53]), Some(0));
        assert_eq!(find_magic(&[0x99, 0x01, 0xFE]), Some(1));
        assert_eq!(find_magic(&[0x99, 0x01, 0x02]), None);
    }
}
