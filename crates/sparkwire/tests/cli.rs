#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "sparkwire-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn sparkwire(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sparkwire"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("SPARKWIRE_FORMAT")
        .output()
        .expect("sparkwire should run")
}

const PRESET_JSON: &str = r#"{
    "uuid": "07079063-94A9-41B1-AB1D-02CBC5D00790",
    "name": "Silver Ship",
    "version": "0.7",
    "description": "1-Clean",
    "icon": "icon.png",
    "bpm": 120.0,
    "effects": [
        { "name": "bias.noisegate", "parameters": [0.138, 0.224] },
        { "name": "LA2AComp", "on": true, "parameters": [0.0, 0.852, 0.0] },
        { "name": "Booster", "parameters": [0.729] },
        { "name": "RolandJC120", "on": true, "parameters": [0.632, 0.281, 0.158, 0.671, 0.0] },
        { "name": "Cloner", "on": true, "parameters": [0.199, 0.0] },
        { "name": "VintageDelay", "parameters": [0.378, 0.399, 0.158, 1.0] },
        { "name": "bias.reverb", "on": true, "parameters": [0.393, 0.370, 0.285, 0.2, 0.5, 0.0, 0.3] }
    ]
}"#;

#[test]
fn version_prints_package_version() {
    let output = sparkwire(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("sparkwire {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn encode_hardware_preset_as_hex() {
    let output = sparkwire(&["--format", "hex", "encode", "hardware-preset", "3"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "01 FE 00 00 53 FE 1A 00 00 00 00 00 00 00 00 00 F0 01 00 03 01 38 00 00 03 F7"
    );
}

#[test]
fn encode_rejects_bad_onoff_state() {
    let output = sparkwire(&["encode", "onoff", "Delay", "maybe"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid on/off value"));
}

#[test]
fn raw_capture_decodes_back() {
    let dir = unique_temp_dir("raw");
    let capture = dir.join("onoff.bin");

    let output = sparkwire(&["--format", "raw", "encode", "onoff", "Delay", "off"]);
    assert!(output.status.success());
    std::fs::write(&capture, &output.stdout).expect("capture should be writable");

    let output = sparkwire(&["--format", "json", "decode", capture.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let row: serde_json::Value =
        serde_json::from_str(stdout.lines().next().expect("one row")).expect("row is JSON");
    assert_eq!(row["kind"], "effect_onoff");
    assert_eq!(row["message"]["pedal"], "Delay");
    assert_eq!(row["message"]["state"], "off");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn preset_file_round_trips_through_hex() {
    let dir = unique_temp_dir("preset");
    let preset = dir.join("preset.json");
    let capture = dir.join("preset.hex");
    std::fs::write(&preset, PRESET_JSON).expect("preset should be writable");

    let output = sparkwire(&[
        "--format",
        "hex",
        "encode",
        "preset",
        "--file",
        preset.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    std::fs::write(&capture, &output.stdout).expect("capture should be writable");

    let output = sparkwire(&[
        "--format",
        "json",
        "decode",
        "--hex",
        capture.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let row: serde_json::Value = serde_json::from_str(stdout.trim()).expect("row is JSON");
    assert_eq!(row["kind"], "preset");
    assert_eq!(row["message"]["name"], "Silver Ship");
    assert_eq!(row["message"]["effects"][6]["name"], "bias.reverb");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupted_capture_exits_data_invalid() {
    let dir = unique_temp_dir("corrupt");
    let capture = dir.join("bad.hex");
    // Checksum byte flipped from 03 to 02.
    std::fs::write(
        &capture,
        "01 FE 00 00 53 FE 1A 00 00 00 00 00 00 00 00 00 F0 01 00 02 01 38 00 00 03 F7",
    )
    .expect("capture should be writable");

    let output = sparkwire(&["--format", "json", "decode", "--hex", capture.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 malformed chunk(s)"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn dump_shows_blocks() {
    let output = sparkwire(&["dump", "swap", "Twin", "Bassman"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("SEND EFFECT_CHANGE (0x01/0x06)"));
    assert!(stdout.contains("block 0 ("));
}

#[test]
fn missing_capture_is_a_usage_error() {
    let output = sparkwire(&["decode", "/nonexistent/sparkwire/capture.bin"]);
    assert_eq!(output.status.code(), Some(64));
}
