//! Loopback example: send commands through an `AmpLink` and read them back.
//!
//! Run with:
//!   cargo run --example loopback

use sparkwire::command::{EffectSwap, EffectToggle, OnOff, ParameterChange};
use sparkwire::transport::Loopback;
use sparkwire::{AmpLink, Command};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Deliver a few bytes per read, the way a serial link would.
    let mut link = AmpLink::new(Loopback::new().with_read_limit(20))?;

    let commands = [
        Command::HardwarePreset { preset: 1 },
        Command::EffectParameter(ParameterChange {
            pedal: "RolandJC120".into(),
            param: 0,
            value: 0.63,
        }),
        Command::EffectOnOff(EffectToggle {
            pedal: "Booster".into(),
            state: OnOff::On,
        }),
        Command::EffectChange(EffectSwap {
            from: "RolandJC120".into(),
            to: "Twin".into(),
        }),
        Command::SerialNumberRequest,
    ];
    for command in &commands {
        link.send(command)?;
        eprintln!("[send] {}", command.kind());
    }

    link.transport_mut().reflect();
    eprintln!("[link] {} bytes reflected", link.transport().pending());

    for message in link.recv()? {
        eprintln!("[recv] {message:?}");
    }
    Ok(())
}
