//! Command and sub-command bytes.
//!
//! The controller sends with [`CMD_SEND`]/[`CMD_REQUEST`]; the amp answers
//! and reports its own changes with [`CMD_REPLY`] and acknowledges with
//! [`CMD_ACK`]. Sub-commands are shared by both directions.

/// Controller → amp: apply a change.
pub const CMD_SEND: u8 = 0x01;
/// Controller → amp: request information.
pub const CMD_REQUEST: u8 = 0x02;
/// Amp → controller: state report or answer.
pub const CMD_REPLY: u8 = 0x03;
/// Amp → controller: acknowledgement.
pub const CMD_ACK: u8 = 0x04;

/// Full preset definition (multi-block).
pub const SUB_PRESET: u8 = 0x01;
/// Effect parameter change sent by the controller.
pub const SUB_PARAMETER: u8 = 0x04;
/// Swap one effect module for another.
pub const SUB_EFFECT_CHANGE: u8 = 0x06;
/// Effect bypass toggle.
pub const SUB_EFFECT_ONOFF: u8 = 0x15;
/// Serial number request / reply.
pub const SUB_SERIAL_NUMBER: u8 = 0x23;
/// Effect parameter change reported by the amp (knob turned).
pub const SUB_AMP_PARAMETER: u8 = 0x37;
/// Hardware preset selection.
pub const SUB_HARDWARE_PRESET: u8 = 0x38;

/// Returns a human-readable name for a command byte.
pub fn command_name(cmd: u8) -> &'static str {
    match cmd {
        CMD_SEND => "SEND",
        CMD_REQUEST => "REQUEST",
        CMD_REPLY => "REPLY",
        CMD_ACK => "ACK",
        _ => "UNKNOWN",
    }
}

/// Returns a human-readable name for a sub-command byte.
pub fn sub_command_name(sub_cmd: u8) -> &'static str {
    match sub_cmd {
        SUB_PRESET => "PRESET",
        SUB_PARAMETER | SUB_AMP_PARAMETER => "PARAMETER",
        SUB_EFFECT_CHANGE => "EFFECT_CHANGE",
        SUB_EFFECT_ONOFF => "EFFECT_ONOFF",
        SUB_SERIAL_NUMBER => "SERIAL_NUMBER",
        SUB_HARDWARE_PRESET => "HARDWARE_PRESET",
        _ => "UNKNOWN",
    }
}

/// Returns true if chunks of this message always carry the multi-block prefix.
pub fn is_multi_chunk(cmd: u8, sub_cmd: u8) -> bool {
    matches!(cmd, CMD_SEND | CMD_REPLY) && sub_cmd == SUB_PRESET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(command_name(CMD_REPLY), "REPLY");
        assert_eq!(command_name(0x7E), "UNKNOWN");
        assert_eq!(sub_command_name(SUB_AMP_PARAMETER), "PARAMETER");
        assert_eq!(sub_command_name(SUB_HARDWARE_PRESET), "HARDWARE_PRESET");
    }

    #[test]
    fn only_presets_are_multi_chunk() {
        assert!(is_multi_chunk(CMD_SEND, SUB_PRESET));
        assert!(is_multi_chunk(CMD_REPLY, SUB_PRESET));
        assert!(!is_multi_chunk(CMD_ACK, SUB_PRESET));
        assert!(!is_multi_chunk(CMD_SEND, SUB_PARAMETER));
    }
}
