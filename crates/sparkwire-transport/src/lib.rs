//! Byte-link transport contract.
//!
//! The codec never opens or drives a physical link itself. It pulls raw
//! bytes through [`Transport::read`] and hands finished wire images to
//! [`Transport::write_all`]. This crate provides:
//! - [`IoTransport`] for anything that is `Read + Write` (a serial device
//!   file, an RFCOMM socket, a capture file)
//! - [`Loopback`], an in-memory link for tests and offline tooling

pub mod error;
pub mod loopback;
pub mod traits;

pub use error::{Result, TransportError};
pub use loopback::Loopback;
pub use traits::{IoTransport, Transport};
