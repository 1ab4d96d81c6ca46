use sparkwire_transport::TransportError;

/// Errors raised while building, scanning or reading frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The message does not fit in the frame buffer.
    #[error("frame buffer full ({needed} bytes needed, capacity {capacity})")]
    CapacityExceeded { needed: usize, capacity: usize },

    /// The message index holds its maximum number of entries.
    #[error("message index full ({0} entries)")]
    IndexFull(usize),

    /// A string field exceeds the protocol limit.
    #[error("string field too long ({len} bytes, max {max})")]
    StringTooLong { len: usize, max: usize },

    /// `start_message` was called while another message was still open.
    #[error("message {cmd:#04x}/{sub_cmd:#04x} is still under construction")]
    MessageInProgress { cmd: u8, sub_cmd: u8 },

    /// An encoder was called with no message open.
    #[error("no message is open")]
    NoOpenMessage,

    /// The wire image was requested before `end_message`.
    #[error("no finished message in the frame buffer")]
    NoFinishedMessage,

    /// The requested operation conflicts with the codec's current mode.
    #[error("codec is {active}; cannot {requested}")]
    ModeConflict {
        active: &'static str,
        requested: &'static str,
    },

    /// A scanning operation was called outside of `start_reading`.
    #[error("codec is not reading")]
    NotReading,

    /// The message index has no entry at this position.
    #[error("no message entry {index} ({count} indexed)")]
    NoSuchEntry { index: usize, count: usize },

    /// A read ran past the end position of the message.
    #[error("read past end of message at position {pos} (end {end})")]
    ReadPastEnd { pos: usize, end: usize },

    /// The message content does not match the expected token layout.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Transport failure while pulling bytes.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl FrameError {
    /// Whether the error describes bad message content rather than misuse.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            FrameError::Malformed(_) | FrameError::ReadPastEnd { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
