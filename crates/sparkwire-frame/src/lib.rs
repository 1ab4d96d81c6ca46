//! Block framing, 7-bit expansion and message scanning for the Spark amp
//! protocol.
//!
//! A message travels as one or more physical blocks of at most
//! [`BLOCK_SIZE`] bytes. Each block carries a 16-byte header and a single
//! `F0 .. F7` chunk whose data is 7-bit expanded so no payload byte can be
//! mistaken for a framing byte:
//!
//! ```text
//! ┌──────────────────────────┬────┬────┬─────┬─────┬─────┬─────┬──────────────┬────┐
//! │ 01 FE 00 00 D1 D2 LL 00… │ F0 │ 01 │ seq │ chk │ cmd │ sub │ 7-bit data … │ F7 │
//! │ block header (16B)       │    │    │     │     │     │     │              │    │
//! └──────────────────────────┴────┴────┴─────┴─────┴─────┴─────┴──────────────┴────┘
//! ```
//!
//! Callers address payload bytes by *logical* position; the
//! [`FrameBuffer`] translates that to the physical byte and mask bit.

pub mod buffer;
pub mod checksum;
pub mod codec;
pub mod cursor;
pub mod error;
pub mod expand;
pub mod index;
pub mod opcode;
pub mod token;

mod builder;
mod diag;
mod scanner;

pub use buffer::{ChunkSpan, FrameBuffer};
pub use checksum::{Checksum, ChecksumKind, Unchecked, XorChecksum};
pub use codec::{CodecConfig, Direction, SparkCodec};
pub use cursor::MessageCursor;
pub use diag::to_hex;
pub use error::{FrameError, Result};
pub use index::{MessageEntry, MessageIndex};
pub use opcode::{
    command_name, is_multi_chunk, sub_command_name, CMD_ACK, CMD_REPLY, CMD_REQUEST, CMD_SEND,
    SUB_AMP_PARAMETER, SUB_EFFECT_CHANGE, SUB_EFFECT_ONOFF, SUB_HARDWARE_PRESET, SUB_PARAMETER,
    SUB_PRESET, SUB_SERIAL_NUMBER,
};
pub use scanner::{ParseReport, ReadStatus, ScanConfig};

/// Size of one physical block in bytes.
pub const BLOCK_SIZE: usize = 0xAD;

/// Number of blocks the frame buffer holds.
pub const NUM_BLOCKS: usize = 30;

/// Logical payload bytes carried by one chunk.
pub const DATA_SIZE: usize = 0x80;

/// Default number of bytes pulled from the transport per `get_data` call.
pub const IN_DATA_SIZE: usize = 28;

/// Capacity of the message index per scan cycle.
pub const MAX_MESSAGES: usize = 80;

/// Maximum length of any string field.
pub const STR_LEN: usize = 40;

/// Logical payload capacity of one multi-block message.
pub const MAX_PAYLOAD: usize = NUM_BLOCKS * DATA_SIZE;

/// Raw capacity of the frame buffer.
pub const BUFFER_CAPACITY: usize = NUM_BLOCKS * BLOCK_SIZE;

/// Bytes preceding the chunk in every block.
pub const BLOCK_HEADER_SIZE: usize = 16;

/// `F0 01 seq chk cmd sub`.
pub const CHUNK_HEADER_SIZE: usize = 6;

/// `[chunk_count, chunk_index, chunk_len]` leading every multi-block chunk.
pub const CHUNK_PREFIX_SIZE: usize = 3;

/// First four bytes of every block header.
pub const BLOCK_MAGIC: [u8; 4] = [0x01, 0xFE, 0x00, 0x00];

/// Chunk start marker.
pub const CHUNK_START: u8 = 0xF0;

/// Chunk terminator.
pub const CHUNK_END: u8 = 0xF7;
