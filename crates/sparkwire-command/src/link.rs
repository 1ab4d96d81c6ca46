//! A codec pair bound to a transport.

use sparkwire_frame::{CodecConfig, Direction, ReadStatus, ScanConfig, SparkCodec};
use sparkwire_transport::Transport;

use crate::command::{Command, Message};
use crate::decode;
use crate::error::{DecodeError, Result};

/// Sends commands and decodes replies over one transport.
///
/// Outbound and inbound traffic use separate codecs, so a poll never
/// disturbs a message being built and vice versa.
pub struct AmpLink<T: Transport> {
    transport: T,
    tx: SparkCodec,
    rx: SparkCodec,
}

impl<T: Transport> AmpLink<T> {
    /// Link with default codec configuration.
    pub fn new(transport: T) -> Result<Self> {
        Self::with_config(transport, CodecConfig::default(), ScanConfig::default())
    }

    /// Link with explicit configuration. `config` governs outbound
    /// blocks; inbound blocks of either direction are accepted.
    pub fn with_config(transport: T, config: CodecConfig, scan: ScanConfig) -> Result<Self> {
        let mut rx = SparkCodec::with_config(CodecConfig {
            direction: Direction::FromAmp,
            ..config.clone()
        });
        rx.start_reading_with(0, false, scan)?;
        Ok(Self {
            transport,
            tx: SparkCodec::with_config(config),
            rx,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Encode `command` and write its blocks to the transport.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        command.encode(&mut self.tx)?;
        let wire = self.tx.wire()?;
        self.transport.write_all(&wire)?;
        tracing::debug!(
            kind = %command.kind(),
            bytes = wire.len(),
            blocks = self.tx.block_count(),
            "command sent"
        );
        Ok(())
    }

    /// Pull one read from the transport and decode every message it
    /// completed. Decoded entries are drained from the index.
    pub fn poll(&mut self) -> Result<(ReadStatus, Vec<std::result::Result<Message, DecodeError>>)> {
        let status = self.rx.get_data(&mut self.transport)?;
        let count = self.rx.num_messages();
        if count == 0 {
            return Ok((status, Vec::new()));
        }

        let decoded = (0..count)
            .map(|index| decode::decode(&self.rx, index))
            .collect();
        self.rx.drain_messages()?;
        Ok((status, decoded))
    }

    /// Read until the transport has nothing more, returning every message
    /// that decoded. Malformed messages are logged and skipped.
    pub fn recv(&mut self) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        loop {
            let (status, batch) = self.poll()?;
            for result in batch {
                match result {
                    Ok(message) => messages.push(message),
                    Err(err) => tracing::warn!(error = %err, "skipping undecodable message"),
                }
            }
            if status == ReadStatus::Exhausted {
                return Ok(messages);
            }
        }
    }
}
