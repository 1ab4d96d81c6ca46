use std::fs;

use sparkwire_command::{Command, EffectSwap, EffectToggle, OnOff, ParameterChange, Preset};
use sparkwire_frame::{CodecConfig, Direction, SparkCodec};

use crate::cmd::{CommandSpec, EncodeArgs};
use crate::exit::{command_error, frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_wire, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let (command, codec) = build(&args)?;
    let wire = codec
        .wire()
        .map_err(|err| frame_error("encode failed", err))?;
    print_wire(&command, &codec, &wire, format);
    Ok(SUCCESS)
}

/// Encode the requested command into a fresh codec.
pub fn build(args: &EncodeArgs) -> CliResult<(Command, SparkCodec)> {
    let command = resolve(&args.command)?;
    let direction = if args.from_amp {
        Direction::FromAmp
    } else {
        Direction::ToAmp
    };
    let mut codec = SparkCodec::with_config(CodecConfig {
        direction,
        ..CodecConfig::default()
    });
    command
        .encode(&mut codec)
        .map_err(|err| command_error("encode failed", err))?;
    tracing::debug!(kind = %command.kind(), blocks = codec.block_count(), "encoded");
    Ok((command, codec))
}

fn resolve(requested: &CommandSpec) -> CliResult<Command> {
    Ok(match requested {
        CommandSpec::HardwarePreset { preset } => Command::HardwarePreset { preset: *preset },
        CommandSpec::Parameter { pedal, param, value } => {
            Command::EffectParameter(ParameterChange {
                pedal: pedal.clone(),
                param: *param,
                value: *value,
            })
        }
        CommandSpec::Onoff { pedal, state } => {
            let state: OnOff = state
                .parse()
                .map_err(|err| command_error("invalid state", err))?;
            Command::EffectOnOff(EffectToggle {
                pedal: pedal.clone(),
                state,
            })
        }
        CommandSpec::Swap { from, to } => Command::EffectChange(EffectSwap {
            from: from.clone(),
            to: to.clone(),
        }),
        CommandSpec::Preset { file } => {
            let json = fs::read_to_string(file)
                .map_err(|err| io_error(&format!("failed reading {}", file.display()), err))?;
            let preset = Preset::from_json(&json).map_err(|err| {
                command_error(&format!("invalid preset {}", file.display()), err)
            })?;
            Command::Preset(Box::new(preset))
        }
        CommandSpec::Serial => Command::SerialNumberRequest,
    })
}
