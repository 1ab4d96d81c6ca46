//! Typed commands and decoded messages.

use std::fmt;

use serde::{Deserialize, Serialize};
use sparkwire_frame::{
    MessageEntry, CMD_ACK, CMD_REPLY, CMD_REQUEST, CMD_SEND, SUB_AMP_PARAMETER, SUB_EFFECT_CHANGE,
    SUB_EFFECT_ONOFF, SUB_HARDWARE_PRESET, SUB_PARAMETER, SUB_PRESET, SUB_SERIAL_NUMBER,
};

use crate::preset::{OnOff, Preset};

/// Set one parameter of a named effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterChange {
    pub pedal: String,
    pub param: u8,
    pub value: f32,
}

/// Replace one effect module with another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSwap {
    pub from: String,
    pub to: String,
}

/// Engage or bypass a named effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectToggle {
    pub pedal: String,
    pub state: OnOff,
}

/// An outbound command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    HardwarePreset { preset: u8 },
    EffectParameter(ParameterChange),
    #[serde(rename = "effect_onoff")]
    EffectOnOff(EffectToggle),
    EffectChange(EffectSwap),
    Preset(Box<Preset>),
    SerialNumberRequest,
}

impl Command {
    pub fn kind(&self) -> MessageKind {
        match self {
            Command::HardwarePreset { .. } => MessageKind::HardwarePreset,
            Command::EffectParameter(_) => MessageKind::EffectParameter,
            Command::EffectOnOff(_) => MessageKind::EffectOnOff,
            Command::EffectChange(_) => MessageKind::EffectChange,
            Command::Preset(_) => MessageKind::Preset,
            Command::SerialNumberRequest => MessageKind::SerialNumberRequest,
        }
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    HardwarePreset { preset: u8 },
    EffectParameter(ParameterChange),
    #[serde(rename = "effect_onoff")]
    EffectOnOff(EffectToggle),
    EffectChange(EffectSwap),
    Preset(Box<Preset>),
    SerialNumberRequest,
    SerialNumber { serial: String },
    Acknowledgement { sub_cmd: u8 },
    Unknown { cmd: u8, sub_cmd: u8, len: usize },
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::HardwarePreset { .. } => MessageKind::HardwarePreset,
            Message::EffectParameter(_) => MessageKind::EffectParameter,
            Message::EffectOnOff(_) => MessageKind::EffectOnOff,
            Message::EffectChange(_) => MessageKind::EffectChange,
            Message::Preset(_) => MessageKind::Preset,
            Message::SerialNumberRequest => MessageKind::SerialNumberRequest,
            Message::SerialNumber { .. } => MessageKind::SerialNumber,
            Message::Acknowledgement { .. } => MessageKind::Acknowledgement,
            Message::Unknown { .. } => MessageKind::Unknown,
        }
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        match command {
            Command::HardwarePreset { preset } => Message::HardwarePreset { preset },
            Command::EffectParameter(change) => Message::EffectParameter(change),
            Command::EffectOnOff(toggle) => Message::EffectOnOff(toggle),
            Command::EffectChange(swap) => Message::EffectChange(swap),
            Command::Preset(preset) => Message::Preset(preset),
            Command::SerialNumberRequest => Message::SerialNumberRequest,
        }
    }
}

/// Message shape identified from the command and sub-command bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Preset,
    EffectParameter,
    EffectChange,
    #[serde(rename = "effect_onoff")]
    EffectOnOff,
    HardwarePreset,
    SerialNumberRequest,
    SerialNumber,
    Acknowledgement,
    Unknown,
}

impl MessageKind {
    /// Classify a command/sub-command pair. Controller (`01`) and amp
    /// (`03`) originated messages share their sub-command layouts.
    pub fn of(cmd: u8, sub_cmd: u8) -> Self {
        match (cmd, sub_cmd) {
            (CMD_SEND | CMD_REPLY, SUB_PRESET) => MessageKind::Preset,
            (CMD_SEND | CMD_REPLY, SUB_PARAMETER | SUB_AMP_PARAMETER) => {
                MessageKind::EffectParameter
            }
            (CMD_SEND | CMD_REPLY, SUB_EFFECT_CHANGE) => MessageKind::EffectChange,
            (CMD_SEND | CMD_REPLY, SUB_EFFECT_ONOFF) => MessageKind::EffectOnOff,
            (CMD_SEND | CMD_REPLY, SUB_HARDWARE_PRESET) => MessageKind::HardwarePreset,
            (CMD_REQUEST, SUB_SERIAL_NUMBER) => MessageKind::SerialNumberRequest,
            (CMD_REPLY, SUB_SERIAL_NUMBER) => MessageKind::SerialNumber,
            (CMD_ACK, _) => MessageKind::Acknowledgement,
            _ => MessageKind::Unknown,
        }
    }

    pub fn of_entry(entry: &MessageEntry) -> Self {
        Self::of(entry.cmd, entry.sub_cmd)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Preset => "preset",
            MessageKind::EffectParameter => "effect_parameter",
            MessageKind::EffectChange => "effect_change",
            MessageKind::EffectOnOff => "effect_onoff",
            MessageKind::HardwarePreset => "hardware_preset",
            MessageKind::SerialNumberRequest => "serial_number_request",
            MessageKind::SerialNumber => "serial_number",
            MessageKind::Acknowledgement => "acknowledgement",
            MessageKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
