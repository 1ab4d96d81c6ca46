//! Human-readable views of the frame buffer.

use std::fmt::Write as _;

use crate::builder::BuildState;
use crate::codec::{Mode, SparkCodec};
use crate::opcode::{command_name, sub_command_name};

const ROW: usize = 16;

impl SparkCodec {
    /// Describe the codec's current contents: built blocks, or received
    /// bytes and the message index.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        match &self.mode {
            Mode::Idle => out.push_str("codec idle\n"),
            Mode::Building(state) => {
                let seq = state
                    .seq
                    .map_or_else(|| "open".to_string(), |seq| format!("seq {seq:#04x}"));
                let _ = writeln!(
                    out,
                    "{} {} ({:#04x}/{:#04x}), {} payload bytes in {} block(s), {}",
                    command_name(state.cmd),
                    sub_command_name(state.sub_cmd),
                    state.cmd,
                    state.sub_cmd,
                    state.len,
                    state.spans.len(),
                    seq,
                );
                for (index, span) in state.spans.iter().enumerate() {
                    let block = &self.buf.block(index)[..BuildState::block_len(span)];
                    let _ = writeln!(out, "block {index} ({} bytes)", block.len());
                    hex_rows(&mut out, block);
                }
            }
            Mode::Scanning(state) => {
                let _ = writeln!(
                    out,
                    "reading: {} bytes received, {} parsed, {} malformed, {} message(s){}",
                    state.filled,
                    state.parsed,
                    state.malformed,
                    state.index.len(),
                    if state.has_pending() {
                        ", multi-block message pending"
                    } else {
                        ""
                    },
                );
                hex_rows(&mut out, &self.buf.as_slice()[..state.filled]);
                for (index, entry) in state.index.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "  [{index}] {} {} ({:#04x}/{:#04x}) {}..{}",
                        command_name(entry.cmd),
                        sub_command_name(entry.sub_cmd),
                        entry.cmd,
                        entry.sub_cmd,
                        entry.start,
                        entry.end,
                    );
                }
            }
        }
        out
    }

    /// Space-separated hex of the finished wire image, or of the received
    /// bytes while reading. Empty otherwise.
    pub fn as_hex(&self) -> String {
        match &self.mode {
            Mode::Scanning(state) => to_hex(&self.buf.as_slice()[..state.filled]),
            _ => self.wire().map(|wire| to_hex(&wire)).unwrap_or_default(),
        }
    }
}

/// Space-separated upper-case hex, e.g. `01 FE 0A`.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02X}");
    }
    out
}

fn hex_rows(out: &mut String, bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(ROW).enumerate() {
        let _ = writeln!(out, "  {:04x}  {}", row * ROW, to_hex(chunk));
    }
}
