use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use sparkwire_command::{Command, Message, MessageKind};
use sparkwire_frame::{command_name, sub_command_name, to_hex, SparkCodec};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
    Hex,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct WireOutput<'a> {
    command: &'a Command,
    blocks: usize,
    payload_size: usize,
    wire_size: usize,
    sequence: Option<u8>,
    wire: String,
}

/// Print the finished message held by `codec`.
pub fn print_wire(command: &Command, codec: &SparkCodec, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = WireOutput {
                command,
                blocks: codec.block_count(),
                payload_size: codec.payload_len(),
                wire_size: wire.len(),
                sequence: codec.sequence(),
                wire: hex::encode_upper(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["BLOCK", "SIZE", "BYTES"]);
            for (index, block) in codec.blocks().unwrap_or_default().iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    block.len().to_string(),
                    hex::encode_upper(block),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "kind={} blocks={} payload={} wire={}",
                command.kind(),
                codec.block_count(),
                codec.payload_len(),
                wire.len()
            );
            for (index, block) in codec.blocks().unwrap_or_default().iter().enumerate() {
                println!("block {index}: {}", to_hex(block));
            }
        }
        OutputFormat::Raw => print_raw(wire),
        OutputFormat::Hex => println!("{}", to_hex(wire)),
    }
}

/// One scanned message, decoded or not.
#[derive(Serialize)]
pub struct DecodedRow {
    pub index: usize,
    pub cmd: u8,
    pub sub_cmd: u8,
    pub kind: MessageKind,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecodedRow {
    fn details(&self) -> String {
        match (&self.message, &self.error) {
            (_, Some(error)) => format!("error: {error}"),
            (Some(message), None) => describe(message),
            (None, None) => String::new(),
        }
    }
}

pub fn print_rows(rows: &[DecodedRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for row in rows {
                println!(
                    "{}",
                    serde_json::to_string(row).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "COMMAND", "KIND", "SIZE", "DETAILS"]);
            for row in rows {
                table.add_row(vec![
                    row.index.to_string(),
                    format!(
                        "{} {}",
                        command_name(row.cmd),
                        sub_command_name(row.sub_cmd)
                    ),
                    row.kind.to_string(),
                    (row.end - row.start).to_string(),
                    row.details(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw | OutputFormat::Hex => {
            for row in rows {
                println!(
                    "#{} cmd={:#04x} sub={:#04x} kind={} {}",
                    row.index,
                    row.cmd,
                    row.sub_cmd,
                    row.kind,
                    row.details()
                );
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn describe(message: &Message) -> String {
    match message {
        Message::HardwarePreset { preset } => format!("preset {preset}"),
        Message::EffectParameter(change) => {
            format!("{} param {} = {}", change.pedal, change.param, change.value)
        }
        Message::EffectOnOff(toggle) => format!("{} {}", toggle.pedal, toggle.state),
        Message::EffectChange(swap) => format!("{} -> {}", swap.from, swap.to),
        Message::Preset(preset) => format!(
            "\"{}\" slot {:#04x}, {} bpm, {}",
            preset.name,
            preset.preset_number,
            preset.bpm,
            preset
                .effects
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(" > ")
        ),
        Message::SerialNumberRequest => "serial number request".to_string(),
        Message::SerialNumber { serial } => format!("serial {serial}"),
        Message::Acknowledgement { sub_cmd } => format!("ack {}", sub_command_name(*sub_cmd)),
        Message::Unknown { len, .. } => format!("{len} payload bytes"),
    }
}
