use std::fs;
use std::io::Read;
use std::path::Path;

use sparkwire_command::{decode, MessageKind};
use sparkwire_frame::{ReadStatus, ScanConfig, SparkCodec};
use sparkwire_transport::Loopback;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_rows, DecodedRow, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.chunk_size == 0 {
        return Err(CliError::new(USAGE, "--chunk-size must be greater than zero"));
    }
    let raw = read_input(&args.input)?;
    let bytes = if args.hex { parse_hex(&raw)? } else { raw };

    let mut link = Loopback::new();
    link.push_incoming(&bytes);

    let mut codec = SparkCodec::new();
    codec
        .start_reading_with(
            0,
            args.multi,
            ScanConfig {
                read_chunk_size: args.chunk_size,
            },
        )
        .map_err(|err| frame_error("scan failed", err))?;

    let mut rows = Vec::new();
    loop {
        let status = codec
            .get_data(&mut link)
            .map_err(|err| frame_error("scan failed", err))?;
        collect(&codec, &mut rows);
        if codec.num_messages() > 0 {
            codec
                .drain_messages()
                .map_err(|err| frame_error("scan failed", err))?;
        }
        if status == ReadStatus::Exhausted {
            break;
        }
    }

    print_rows(&rows, format);

    let malformed = codec.malformed_count();
    let undecodable = rows.iter().filter(|row| row.error.is_some()).count();
    let incomplete = codec.is_partial();
    tracing::debug!(
        messages = rows.len(),
        malformed,
        undecodable,
        incomplete,
        "scan finished"
    );
    if malformed > 0 || undecodable > 0 || incomplete {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "{malformed} malformed chunk(s), {undecodable} undecodable message(s){}",
                if incomplete { ", stream ends mid-message" } else { "" }
            ),
        ));
    }
    Ok(SUCCESS)
}

fn collect(codec: &SparkCodec, rows: &mut Vec<DecodedRow>) {
    for (index, entry) in codec.messages().iter().enumerate() {
        let (message, error) = match decode(codec, index) {
            Ok(message) => (Some(message), None),
            Err(err) => (None, Some(err.to_string())),
        };
        rows.push(DecodedRow {
            index: rows.len(),
            cmd: entry.cmd,
            sub_cmd: entry.sub_cmd,
            kind: MessageKind::of_entry(entry),
            start: entry.start,
            end: entry.end,
            message,
            error,
        });
    }
}

fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(buf);
    }
    fs::read(path).map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}

/// Hex text to bytes. Whitespace and `0x` prefixes are ignored.
fn parse_hex(text: &[u8]) -> CliResult<Vec<u8>> {
    let text = std::str::from_utf8(text)
        .map_err(|_| CliError::new(DATA_INVALID, "hex input is not UTF-8"))?;
    let cleaned: String = text
        .split_whitespace()
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();
    hex::decode(&cleaned)
        .map_err(|err| CliError::new(DATA_INVALID, format!("input is not valid hex: {err}")))
}
