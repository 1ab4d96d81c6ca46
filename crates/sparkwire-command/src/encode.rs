//! Outbound command constructors.
//!
//! Each constructor brackets its own `start_message`/`end_message` pair,
//! leaving the finished wire image in the codec. A constructor that fails
//! part-way drops its half-built message so the codec stays usable; one
//! that fails to open (another message is still open) leaves the codec
//! untouched.

use sparkwire_frame::{
    token, SparkCodec, CMD_REQUEST, CMD_SEND, SUB_EFFECT_CHANGE, SUB_EFFECT_ONOFF,
    SUB_HARDWARE_PRESET, SUB_PARAMETER, SUB_PRESET, SUB_SERIAL_NUMBER,
};

use crate::command::Command;
use crate::error::Result;
use crate::preset::{OnOff, Preset, NUM_EFFECTS};

/// Tag before each effect parameter value.
pub(crate) const PARAM_TAG: u8 = 0x91;

fn framed(
    codec: &mut SparkCodec,
    cmd: u8,
    sub_cmd: u8,
    multi: bool,
    body: impl FnOnce(&mut SparkCodec) -> sparkwire_frame::Result<()>,
) -> Result<()> {
    codec.start_message(cmd, sub_cmd, multi)?;
    if let Err(err) = body(codec) {
        codec.reset();
        return Err(err.into());
    }
    codec.end_message()?;
    Ok(())
}

/// Select stored preset `preset` on the amp.
pub fn change_hardware_preset(codec: &mut SparkCodec, preset: u8) -> Result<()> {
    framed(codec, CMD_SEND, SUB_HARDWARE_PRESET, false, |c| {
        c.add_byte(0x00)?;
        c.add_byte(preset)
    })
}

/// Set parameter `param` of effect `pedal` to `value`.
pub fn change_effect_parameter(
    codec: &mut SparkCodec,
    pedal: &str,
    param: u8,
    value: f32,
) -> Result<()> {
    framed(codec, CMD_SEND, SUB_PARAMETER, false, |c| {
        c.add_prefixed_string(pedal)?;
        c.add_byte(param)?;
        c.add_float(value)
    })
}

/// Engage or bypass effect `pedal`. `state` must be `on` or `off`.
pub fn turn_effect_onoff(codec: &mut SparkCodec, pedal: &str, state: &str) -> Result<()> {
    let state: OnOff = state.parse()?;
    encode_onoff(codec, pedal, state)
}

fn encode_onoff(codec: &mut SparkCodec, pedal: &str, state: OnOff) -> Result<()> {
    framed(codec, CMD_SEND, SUB_EFFECT_ONOFF, false, |c| {
        c.add_prefixed_string(pedal)?;
        c.add_onoff(state.is_on())?;
        c.add_byte(0x00)
    })
}

/// Replace effect module `from` with `to`.
pub fn change_effect(codec: &mut SparkCodec, from: &str, to: &str) -> Result<()> {
    framed(codec, CMD_SEND, SUB_EFFECT_CHANGE, false, |c| {
        c.add_prefixed_string(from)?;
        c.add_prefixed_string(to)
    })
}

/// Send a full preset. The only command that spans several blocks.
pub fn create_preset(codec: &mut SparkCodec, preset: &Preset) -> Result<()> {
    preset.validate()?;
    framed(codec, CMD_SEND, SUB_PRESET, true, |c| {
        c.add_byte(0x00)?;
        c.add_byte(preset.preset_number)?;
        c.add_long_string(&preset.uuid)?;
        c.add_string(&preset.name)?;
        c.add_string(&preset.version)?;
        c.add_string(&preset.description)?;
        c.add_string(&preset.icon)?;
        c.add_float(preset.bpm)?;
        c.add_byte(token::ARRAY_BASE + NUM_EFFECTS as u8)?;
        for effect in &preset.effects {
            c.add_string(&effect.name)?;
            c.add_onoff(effect.on)?;
            c.add_byte(token::ARRAY_BASE + effect.parameters.len() as u8)?;
            for (index, value) in effect.parameters.iter().enumerate() {
                c.add_byte(index as u8)?;
                c.add_byte(PARAM_TAG)?;
                c.add_float(*value)?;
            }
        }
        c.add_byte(preset.trailer)
    })?;
    tracing::debug!(
        name = %preset.name,
        blocks = codec.block_count(),
        len = codec.payload_len(),
        "preset encoded"
    );
    Ok(())
}

/// Ask the amp for its serial number.
pub fn request_serial_number(codec: &mut SparkCodec) -> Result<()> {
    framed(codec, CMD_REQUEST, SUB_SERIAL_NUMBER, false, |_| Ok(()))
}

impl Command {
    /// Build this command into `codec`.
    pub fn encode(&self, codec: &mut SparkCodec) -> Result<()> {
        match self {
            Command::HardwarePreset { preset } => change_hardware_preset(codec, *preset),
            Command::EffectParameter(change) => {
                change_effect_parameter(codec, &change.pedal, change.param, change.value)
            }
            Command::EffectOnOff(toggle) => encode_onoff(codec, &toggle.pedal, toggle.state),
            Command::EffectChange(swap) => change_effect(codec, &swap.from, &swap.to),
            Command::Preset(preset) => create_preset(codec, preset),
            Command::SerialNumberRequest => request_serial_number(codec),
        }
    }
}

#[cfg(test)]
mod tests {
    use sparkwire_frame::FrameError;

    use super::*;
    use crate::error::CommandError;

    #[test]
    fn onoff_token_is_validated() {
        let mut codec = SparkCodec::new();
        assert!(matches!(
            turn_effect_onoff(&mut codec, "Delay", "of"),
            Err(CommandError::InvalidOnOff(_))
        ));
        assert!(codec.is_idle());

        turn_effect_onoff(&mut codec, "Delay", " OFF").unwrap();
        // 05 A5 "Delay" C2 00
        assert_eq!(codec.payload_len(), 9);
    }

    #[test]
    fn hardware_preset_payload() {
        let mut codec = SparkCodec::new();
        change_hardware_preset(&mut codec, 2).unwrap();
        let wire = codec.wire().unwrap();
        assert_eq!(&wire[20..22], &[0x01, 0x38]);
        assert_eq!(&wire[22..25], &[0x00, 0x00, 0x02]);
    }

    #[test]
    fn failed_encode_leaves_codec_usable() {
        let mut codec = SparkCodec::new();
        let long = "x".repeat(41);
        assert!(matches!(
            change_effect(&mut codec, "Amp", &long),
            Err(CommandError::Frame(FrameError::StringTooLong { .. }))
        ));
        assert!(!codec.is_message_open());
        change_effect(&mut codec, "Amp", "Twin").unwrap();
    }

    #[test]
    fn open_message_is_not_clobbered() {
        let mut codec = SparkCodec::new();
        codec.start_message(0x01, 0x04, false).unwrap();
        codec.add_byte(0x11).unwrap();

        assert!(matches!(
            request_serial_number(&mut codec),
            Err(CommandError::Frame(FrameError::MessageInProgress {
                cmd: 0x01,
                sub_cmd: 0x04
            }))
        ));
        assert!(codec.is_message_open());
        assert_eq!(codec.payload_len(), 1);
    }

    #[test]
    fn serial_request_is_empty() {
        let mut codec = SparkCodec::new();
        request_serial_number(&mut codec).unwrap();
        assert_eq!(codec.payload_len(), 0);
        assert_eq!(codec.wire().unwrap().len(), 23);
    }
}
