//! Command and preset codec for the Spark amp protocol.
//!
//! The semantic layer over [`sparkwire_frame`]: build the outbound
//! commands a controller sends, and decode indexed inbound messages back
//! into typed values. [`AmpLink`] pairs an outbound and an inbound codec
//! with a [`Transport`](sparkwire_transport::Transport).

pub mod command;
pub mod decode;
pub mod encode;
pub mod error;
pub mod link;
pub mod preset;

pub use command::{Command, EffectSwap, EffectToggle, Message, MessageKind, ParameterChange};
pub use decode::{
    classify, decode, get_effect_change, get_effect_onoff, get_effect_parameter,
    get_hardware_preset, get_preset, get_serial_number,
};
pub use encode::{
    change_effect, change_effect_parameter, change_hardware_preset, create_preset,
    request_serial_number, turn_effect_onoff,
};
pub use error::{CommandError, DecodeError, Result};
pub use link::AmpLink;
pub use preset::{EffectSlot, OnOff, Preset, MAX_PARAMETERS, NUM_EFFECTS};
