use clap::{Args, Subcommand};
use std::path::PathBuf;

use sparkwire_frame::IN_DATA_SIZE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod dump;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one command and print its wire image.
    Encode(EncodeArgs),
    /// Scan a captured byte stream and list the decoded messages.
    Decode(DecodeArgs),
    /// Encode one command and print the frame buffer dump.
    Dump(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Dump(args) => dump::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Stamp blocks with the amp-to-controller marker.
    #[arg(long)]
    pub from_amp: bool,
    #[command(subcommand)]
    pub command: CommandSpec,
}

#[derive(Subcommand, Debug)]
pub enum CommandSpec {
    /// Select a stored hardware preset.
    HardwarePreset {
        /// Preset slot number.
        preset: u8,
    },
    /// Set one effect parameter.
    Parameter {
        /// Effect name.
        pedal: String,
        /// Parameter index.
        param: u8,
        /// New value, usually 0.0 to 1.0.
        value: f32,
    },
    /// Engage or bypass an effect.
    Onoff {
        /// Effect name.
        pedal: String,
        /// "on" or "off".
        state: String,
    },
    /// Replace one effect module with another.
    Swap {
        /// Effect to replace.
        from: String,
        /// Replacement effect.
        to: String,
    },
    /// Send a full preset read from a JSON file.
    Preset {
        /// Preset JSON file.
        #[arg(long, short = 'f')]
        file: PathBuf,
    },
    /// Ask the amp for its serial number.
    Serial,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Captured byte stream ("-" reads stdin).
    pub input: PathBuf,
    /// Input is hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Treat every chunk as part of a multi-block message.
    #[arg(long)]
    pub multi: bool,
    /// Bytes pulled per scan step.
    #[arg(long, default_value_t = IN_DATA_SIZE)]
    pub chunk_size: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
