use bytes::{Buf, Bytes, BytesMut};

use crate::error::Result;
use crate::traits::Transport;

/// In-memory link.
///
/// Bytes queued with [`Loopback::push_incoming`] are handed out by `read`;
/// everything written is collected for [`Loopback::take_outgoing`]. A read
/// limit simulates a link that delivers the stream in small pieces.
#[derive(Debug, Default)]
pub struct Loopback {
    incoming: BytesMut,
    outgoing: BytesMut,
    read_limit: Option<usize>,
}

impl Loopback {
    /// Create an empty link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver at most `limit` bytes per `read` call.
    pub fn with_read_limit(mut self, limit: usize) -> Self {
        self.read_limit = Some(limit.max(1));
        self
    }

    /// Queue bytes for the reading side.
    pub fn push_incoming(&mut self, data: &[u8]) {
        self.incoming.extend_from_slice(data);
    }

    /// Number of queued bytes not yet read.
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }

    /// Take everything written so far.
    pub fn take_outgoing(&mut self) -> Bytes {
        self.outgoing.split().freeze()
    }

    /// Move everything written so far to the incoming queue.
    pub fn reflect(&mut self) {
        let written = self.outgoing.split();
        self.incoming.extend_from_slice(&written);
    }
}

impl Transport for Loopback {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut n = buf.len().min(self.incoming.len());
        if let Some(limit) = self.read_limit {
            n = n.min(limit);
        }
        buf[..n].copy_from_slice(&self.incoming[..n]);
        self.incoming.advance(n);
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.outgoing.extend_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_respects_limit() {
        let mut link = Loopback::new().with_read_limit(2);
        link.push_incoming(&[1, 2, 3, 4, 5]);

        let mut buf = [0u8; 8];
        assert_eq!(link.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[1, 2]);
        assert_eq!(link.pending(), 3);
    }

    #[test]
    fn empty_link_reads_zero() {
        let mut link = Loopback::new();
        let mut buf = [0u8; 4];
        assert_eq!(link.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn reflect_feeds_written_bytes_back() {
        let mut link = Loopback::new();
        link.write_all(&[9, 8, 7]).unwrap();
        link.reflect();

        let mut buf = [0u8; 3];
        assert_eq!(link.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [9, 8, 7]);
        assert!(link.take_outgoing().is_empty());
    }

    #[test]
    fn take_outgoing_drains() {
        let mut link = Loopback::new();
        link.write_all(b"ab").unwrap();
        link.write_all(b"cd").unwrap();

        assert_eq!(link.take_outgoing().as_ref(), b"abcd");
        assert!(link.take_outgoing().is_empty());
    }
}
