//! Codec for the Spark amp control protocol.
//!
//! sparkwire builds the command frames a controller sends to the amp and
//! splits the amp's byte stream back into typed messages.
//!
//! # Crate Structure
//!
//! - [`transport`]: The byte-link contract (`Transport`, in-memory `Loopback`)
//! - [`frame`]: Block framing, 7-bit expansion, builder, scanner and message index
//! - [`command`]: Commands, presets and the decoders for indexed messages
//!
//! ```
//! use sparkwire::command::{change_hardware_preset, get_hardware_preset};
//! use sparkwire::frame::SparkCodec;
//!
//! let mut out = SparkCodec::new();
//! change_hardware_preset(&mut out, 2).unwrap();
//! let wire = out.wire().unwrap();
//!
//! let mut reader = SparkCodec::new();
//! reader.start_reading(0, false).unwrap();
//! reader.feed(&wire).unwrap();
//! assert_eq!(get_hardware_preset(&reader, 0).unwrap(), 2);
//! ```

/// Re-export transport types.
pub mod transport {
    pub use sparkwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use sparkwire_frame::*;
}

/// Re-export command and preset types.
pub mod command {
    pub use sparkwire_command::*;
}

pub use sparkwire_command::{AmpLink, Command, Message, Preset};
pub use sparkwire_frame::SparkCodec;
