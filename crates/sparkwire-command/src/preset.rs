//! Preset data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sparkwire_frame::{FrameError, STR_LEN};

use crate::error::{CommandError, Result};

/// Effect slots in every preset.
pub const NUM_EFFECTS: usize = 7;

/// Most parameters one effect slot can carry.
pub const MAX_PARAMETERS: usize = 10;

/// The amp's temporary preset slot.
pub const DEFAULT_PRESET_NUMBER: u8 = 0x7F;

/// Byte the amp expects after the last effect slot.
pub const DEFAULT_TRAILER: u8 = 0xB4;

/// Bypass state of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    pub fn is_on(self) -> bool {
        self == OnOff::On
    }
}

impl From<bool> for OnOff {
    fn from(on: bool) -> Self {
        if on {
            OnOff::On
        } else {
            OnOff::Off
        }
    }
}

impl FromStr for OnOff {
    type Err = CommandError;

    /// Accepts `on`/`off` in any case, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("on") {
            Ok(OnOff::On)
        } else if trimmed.eq_ignore_ascii_case("off") {
            Ok(OnOff::Off)
        } else {
            Err(CommandError::InvalidOnOff(s.to_string()))
        }
    }
}

impl fmt::Display for OnOff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OnOff::On => "on",
            OnOff::Off => "off",
        })
    }
}

/// One effect module within a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSlot {
    /// Effect module name, e.g. `"bias.reverb"`.
    pub name: String,
    /// Whether the effect is engaged.
    #[serde(default)]
    pub on: bool,
    /// Parameter values; only these are sent.
    #[serde(default)]
    pub parameters: Vec<f32>,
}

impl EffectSlot {
    pub fn new(name: impl Into<String>, on: bool, parameters: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            on,
            parameters,
        }
    }

    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    fn validate(&self, slot: usize) -> Result<()> {
        check_len(&self.name)?;
        if self.parameters.len() > MAX_PARAMETERS {
            return Err(CommandError::TooManyParameters {
                slot,
                count: self.parameters.len(),
                max: MAX_PARAMETERS,
            });
        }
        Ok(())
    }
}

/// A complete amp configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Target slot; `0x7F` is the amp's temporary slot.
    #[serde(default = "default_preset_number")]
    pub preset_number: u8,
    pub uuid: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub bpm: f32,
    /// Signal chain in order: gate, compressor, drive, amp, modulation,
    /// delay, reverb.
    pub effects: [EffectSlot; NUM_EFFECTS],
    #[serde(default = "default_trailer")]
    pub trailer: u8,
}

fn default_preset_number() -> u8 {
    DEFAULT_PRESET_NUMBER
}

fn default_trailer() -> u8 {
    DEFAULT_TRAILER
}

impl Preset {
    /// Check every field against the protocol limits.
    pub fn validate(&self) -> Result<()> {
        for field in [
            &self.uuid,
            &self.name,
            &self.version,
            &self.description,
            &self.icon,
        ] {
            check_len(field)?;
        }
        for (slot, effect) in self.effects.iter().enumerate() {
            effect.validate(slot)?;
        }
        Ok(())
    }

    /// Parse and validate a preset from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let preset: Preset = serde_json::from_str(json)?;
        preset.validate()?;
        Ok(preset)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_len(value: &str) -> Result<()> {
    if value.len() > STR_LEN {
        return Err(FrameError::StringTooLong {
            len: value.len(),
            max: STR_LEN,
        }
        .into());
    }
    Ok(())
}
