//! The codec instance: one frame buffer, one active mode.

use crate::buffer::FrameBuffer;
use crate::builder::BuildState;
use crate::checksum::ChecksumKind;
use crate::error::{FrameError, Result};
use crate::scanner::ScanState;

/// Which side of the link produced a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Controller → amp.
    #[default]
    ToAmp,
    /// Amp → controller.
    FromAmp,
}

impl Direction {
    /// Header bytes 4 and 5 of every block.
    pub fn marker(self) -> [u8; 2] {
        match self {
            Direction::ToAmp => [0x53, 0xFE],
            Direction::FromAmp => [0x41, 0xFF],
        }
    }

    /// Recognise a block header marker.
    pub fn from_marker(marker: [u8; 2]) -> Option<Self> {
        match marker {
            [0x53, 0xFE] => Some(Direction::ToAmp),
            [0x41, 0xFF] => Some(Direction::FromAmp),
            _ => None,
        }
    }
}

/// Configuration for the codec.
#[derive(Debug, Clone, Default)]
pub struct CodecConfig {
    /// Direction stamped into built blocks. Default: `ToAmp`.
    pub direction: Direction,
    /// Chunk checksum strategy for building and scanning. Default: XOR.
    pub checksum: ChecksumKind,
}

pub(crate) enum Mode {
    Idle,
    Building(BuildState),
    Scanning(ScanState),
}

impl Mode {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Building(state) if state.is_open() => "building",
            Mode::Building(_) => "holding a finished message",
            Mode::Scanning(_) => "reading",
        }
    }
}

/// Bidirectional Spark protocol codec.
///
/// Owns the frame buffer and exactly one of two states: building an
/// outbound message or scanning inbound bytes. Switching between them is
/// explicit; an open message blocks both `start_message` and
/// `start_reading`, and an active scan must be stopped before building.
pub struct SparkCodec {
    pub(crate) buf: FrameBuffer,
    pub(crate) mode: Mode,
    pub(crate) config: CodecConfig,
    pub(crate) seq: u8,
}

impl SparkCodec {
    /// Create an idle codec with default configuration.
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Create an idle codec with explicit configuration.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            buf: FrameBuffer::new(),
            mode: Mode::Idle,
            config,
            seq: 0,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Borrow the frame buffer.
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buf
    }

    /// Name of the active mode.
    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.mode, Mode::Idle)
    }

    pub fn is_reading(&self) -> bool {
        matches!(self.mode, Mode::Scanning(_))
    }

    /// Whether a message is open for encoding.
    pub fn is_message_open(&self) -> bool {
        matches!(&self.mode, Mode::Building(state) if state.is_open())
    }

    /// Sequence number the next finished message will carry.
    pub fn next_sequence(&self) -> u8 {
        self.seq
    }

    /// Discard whatever is in progress and return to idle.
    pub fn reset(&mut self) {
        if !self.is_idle() {
            tracing::debug!(mode = self.mode.name(), "codec reset");
        }
        self.mode = Mode::Idle;
    }

    pub(crate) fn conflict(&self, requested: &'static str) -> FrameError {
        FrameError::ModeConflict {
            active: self.mode.name(),
            requested,
        }
    }

    pub(crate) fn scan_state(&self) -> Result<&ScanState> {
        match &self.mode {
            Mode::Scanning(state) => Ok(state),
            _ => Err(FrameError::NotReading),
        }
    }
}

impl Default for SparkCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SparkCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparkCodec")
            .field("mode", &self.mode.name())
            .field("config", &self.config)
            .field("seq", &self.seq)
            .finish()
    }
}
