//! Inbound message decoders.
//!
//! Every decoder takes an index into the codec's message index, checks the
//! entry's command bytes against the expected [`MessageKind`], then reads
//! the payload through a fresh [`MessageCursor`]. Decoders only read, so
//! entries can be decoded in any order and more than once.

use sparkwire_frame::{token, MessageCursor, SparkCodec};

use crate::command::{EffectSwap, EffectToggle, Message, MessageKind, ParameterChange};
use crate::encode::PARAM_TAG;
use crate::error::DecodeError;
use crate::preset::{EffectSlot, OnOff, Preset, MAX_PARAMETERS, NUM_EFFECTS};

type Decoded<T> = std::result::Result<T, DecodeError>;

fn read_entry<T>(
    codec: &SparkCodec,
    index: usize,
    expected: MessageKind,
    read: impl FnOnce(&mut MessageCursor<'_>) -> sparkwire_frame::Result<T>,
) -> Decoded<T> {
    let mut cursor = codec.cursor(index)?;
    let found = MessageKind::of_entry(&cursor.entry());
    if found != expected {
        return Err(DecodeError::WrongKind {
            index,
            expected,
            found,
        });
    }
    read(&mut cursor).map_err(|source| {
        tracing::warn!(index, kind = %expected, error = %source, "malformed message");
        DecodeError::Malformed { index, source }
    })
}

/// The kind of message at `index`.
pub fn classify(codec: &SparkCodec, index: usize) -> Decoded<MessageKind> {
    Ok(MessageKind::of_entry(&codec.message(index)?))
}

/// Decode a parameter change: pedal name, parameter index, value.
pub fn get_effect_parameter(codec: &SparkCodec, index: usize) -> Decoded<ParameterChange> {
    read_entry(codec, index, MessageKind::EffectParameter, |c| {
        Ok(ParameterChange {
            pedal: c.read_prefixed_string()?,
            param: c.read_byte()?,
            value: c.read_float()?,
        })
    })
}

/// Decode an effect swap.
pub fn get_effect_change(codec: &SparkCodec, index: usize) -> Decoded<EffectSwap> {
    read_entry(codec, index, MessageKind::EffectChange, |c| {
        Ok(EffectSwap {
            from: c.read_prefixed_string()?,
            to: c.read_prefixed_string()?,
        })
    })
}

/// Decode an effect on/off toggle.
pub fn get_effect_onoff(codec: &SparkCodec, index: usize) -> Decoded<EffectToggle> {
    read_entry(codec, index, MessageKind::EffectOnOff, |c| {
        Ok(EffectToggle {
            pedal: c.read_prefixed_string()?,
            state: OnOff::from(c.read_onoff()?),
        })
    })
}

/// Decode a hardware preset selection.
pub fn get_hardware_preset(codec: &SparkCodec, index: usize) -> Decoded<u8> {
    read_entry(codec, index, MessageKind::HardwarePreset, |c| {
        c.expect_byte(0x00, "preset bank")?;
        c.read_byte()
    })
}

/// Decode the amp's serial number reply.
pub fn get_serial_number(codec: &SparkCodec, index: usize) -> Decoded<String> {
    read_entry(codec, index, MessageKind::SerialNumber, |c| {
        c.read_prefixed_string()
    })
}

/// Decode a full preset, all seven effect slots included.
pub fn get_preset(codec: &SparkCodec, index: usize) -> Decoded<Preset> {
    read_entry(codec, index, MessageKind::Preset, read_preset)
}

fn read_preset(c: &mut MessageCursor<'_>) -> sparkwire_frame::Result<Preset> {
    c.expect_byte(0x00, "preset header")?;
    let preset_number = c.read_byte()?;
    let uuid = c.read_string()?;
    let name = c.read_string()?;
    let version = c.read_string()?;
    let description = c.read_string()?;
    let icon = c.read_string()?;
    let bpm = c.read_float()?;
    c.expect_byte(token::ARRAY_BASE + NUM_EFFECTS as u8, "effect count")?;

    let mut slots = Vec::with_capacity(NUM_EFFECTS);
    for _ in 0..NUM_EFFECTS {
        slots.push(read_slot(c)?);
    }
    let trailer = c.read_byte()?;

    let effects: [EffectSlot; NUM_EFFECTS] = slots
        .try_into()
        .map_err(|_| sparkwire_frame::FrameError::Malformed("effect slot count".into()))?;

    Ok(Preset {
        preset_number,
        uuid,
        name,
        version,
        description,
        icon,
        bpm,
        effects,
        trailer,
    })
}

fn read_slot(c: &mut MessageCursor<'_>) -> sparkwire_frame::Result<EffectSlot> {
    let name = c.read_string()?;
    let on = c.read_onoff()?;

    let at = c.position();
    let tag = c.read_byte()?;
    let count = tag.wrapping_sub(token::ARRAY_BASE) as usize;
    if tag < token::ARRAY_BASE || count > MAX_PARAMETERS {
        return Err(sparkwire_frame::FrameError::Malformed(format!(
            "bad parameter count {tag:#04x} at position {at}"
        )));
    }

    let mut parameters = Vec::with_capacity(count);
    for expected in 0..count {
        c.expect_byte(expected as u8, "parameter index")?;
        c.expect_byte(PARAM_TAG, "parameter tag")?;
        parameters.push(c.read_float()?);
    }
    Ok(EffectSlot {
        name,
        on,
        parameters,
    })
}

/// Decode whatever message sits at `index`.
pub fn decode(codec: &SparkCodec, index: usize) -> Decoded<Message> {
    let entry = codec.message(index)?;
    Ok(match MessageKind::of_entry(&entry) {
        MessageKind::Preset => Message::Preset(Box::new(get_preset(codec, index)?)),
        MessageKind::EffectParameter => Message::EffectParameter(get_effect_parameter(codec, index)?),
        MessageKind::EffectChange => Message::EffectChange(get_effect_change(codec, index)?),
        MessageKind::EffectOnOff => Message::EffectOnOff(get_effect_onoff(codec, index)?),
        MessageKind::HardwarePreset => Message::HardwarePreset {
            preset: get_hardware_preset(codec, index)?,
        },
        MessageKind::SerialNumberRequest => Message::SerialNumberRequest,
        MessageKind::SerialNumber => Message::SerialNumber {
            serial: get_serial_number(codec, index)?,
        },
        MessageKind::Acknowledgement => Message::Acknowledgement {
            sub_cmd: entry.sub_cmd,
        },
        MessageKind::Unknown => Message::Unknown {
            cmd: entry.cmd,
            sub_cmd: entry.sub_cmd,
            len: entry.len(),
        },
    })
}
