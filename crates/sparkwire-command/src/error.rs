use sparkwire_frame::FrameError;
use sparkwire_transport::TransportError;

use crate::command::MessageKind;

/// Why an indexed message could not be decoded as the requested kind.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The entry's command bytes belong to a different message kind.
    #[error("message {index} is {found}, not {expected}")]
    WrongKind {
        index: usize,
        expected: MessageKind,
        found: MessageKind,
    },

    /// The entry has the right kind but its payload does not parse.
    #[error("message {index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: FrameError,
    },

    /// The codec is not reading, or no such entry exists.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

impl DecodeError {
    /// Whether the entry exists but holds a different message kind.
    pub fn is_wrong_kind(&self) -> bool {
        matches!(self, DecodeError::WrongKind { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, DecodeError::Malformed { .. })
    }
}

/// Errors raised by command encoding, preset handling and the amp link.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Decode error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An on/off argument was neither `on` nor `off`.
    #[error("invalid on/off value {0:?} (expected \"on\" or \"off\")")]
    InvalidOnOff(String),

    /// An effect slot carries more parameters than the protocol allows.
    #[error("effect slot {slot} has {count} parameters (max {max})")]
    TooManyParameters {
        slot: usize,
        count: usize,
        max: usize,
    },

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;
