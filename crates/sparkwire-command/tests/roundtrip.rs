use sparkwire_command::{
    change_effect, change_effect_parameter, classify, create_preset, decode, get_effect_change,
    get_effect_onoff, get_effect_parameter, get_hardware_preset, get_preset, turn_effect_onoff,
    AmpLink, Command, DecodeError, EffectSlot, EffectSwap, EffectToggle, Message, MessageKind,
    OnOff, ParameterChange, Preset, MAX_PARAMETERS,
};
use sparkwire_frame::{ReadStatus, SparkCodec, BLOCK_SIZE, MAX_MESSAGES, STR_LEN};
use sparkwire_transport::Loopback;

fn sample_preset() -> Preset {
    Preset {
        preset_number: 0x7F,
        uuid: "07079063-94A9-41B1-AB1D-02CBC5D00790".into(),
        name: "Silver Ship".into(),
        version: "0.7".into(),
        description: "1-Clean".into(),
        icon: "icon.png".into(),
        bpm: 120.0,
        effects: [
            EffectSlot::new("bias.noisegate", false, vec![0.138, 0.224]),
            EffectSlot::new("LA2AComp", true, vec![0.0, 0.852, 0.0]),
            EffectSlot::new("Booster", false, vec![0.729]),
            EffectSlot::new("RolandJC120", true, vec![0.632, 0.281, 0.158, 0.671, 0.0]),
            EffectSlot::new("Cloner", true, vec![0.199, 0.0]),
            EffectSlot::new("VintageDelay", false, vec![0.378, 0.399, 0.158, 1.0]),
            EffectSlot::new(
                "bias.reverb",
                true,
                vec![0.393, 0.370, 0.285, 0.2, 0.5, 0.0, 0.3],
            ),
        ],
        trailer: 0xB4,
    }
}

fn largest_preset() -> Preset {
    let field = |c: char| c.to_string().repeat(STR_LEN);
    let slot = |c: char| EffectSlot::new(field(c), true, (0..MAX_PARAMETERS).map(|i| i as f32 / 10.0).collect());
    Preset {
        preset_number: 3,
        uuid: field('u'),
        name: field('n'),
        version: field('v'),
        description: field('d'),
        icon: field('i'),
        bpm: 92.5,
        effects: ['a', 'b', 'c', 'd', 'e', 'f', 'g'].map(slot),
        trailer: 0xB4,
    }
}

/// Feed wire images into a fresh reader.
fn scan(wires: &[Vec<u8>]) -> SparkCodec {
    let mut codec = SparkCodec::new();
    codec.start_reading(0, false).unwrap();
    for wire in wires {
        codec.feed(wire).unwrap();
    }
    codec
}

fn wire_of(command: &Command) -> Vec<u8> {
    let mut codec = SparkCodec::new();
    command.encode(&mut codec).unwrap();
    codec.wire().unwrap().to_vec()
}

#[test]
fn every_command_round_trips() {
    let commands = vec![
        Command::HardwarePreset { preset: 3 },
        Command::EffectParameter(ParameterChange {
            pedal: "RolandJC120".into(),
            param: 2,
            value: 0.671,
        }),
        Command::EffectOnOff(EffectToggle {
            pedal: "Booster".into(),
            state: OnOff::On,
        }),
        Command::EffectChange(EffectSwap {
            from: "RolandJC120".into(),
            to: "Twin".into(),
        }),
        Command::Preset(Box::new(sample_preset())),
        Command::SerialNumberRequest,
    ];

    let wires: Vec<_> = commands.iter().map(wire_of).collect();
    let codec = scan(&wires);
    assert_eq!(codec.num_messages(), commands.len());

    // Decode out of order; no entry depends on another.
    for index in (0..commands.len()).rev() {
        let decoded = decode(&codec, index).unwrap();
        assert_eq!(decoded, Message::from(commands[index].clone()));
        assert_eq!(classify(&codec, index).unwrap(), commands[index].kind());
    }
}

#[test]
fn onoff_is_not_a_swap_or_parameter() {
    let mut out = SparkCodec::new();
    turn_effect_onoff(&mut out, "Delay", "off").unwrap();
    let codec = scan(&[out.wire().unwrap().to_vec()]);

    assert!(matches!(
        get_effect_change(&codec, 0),
        Err(DecodeError::WrongKind {
            index: 0,
            expected: MessageKind::EffectChange,
            found: MessageKind::EffectOnOff,
        })
    ));
    assert!(get_effect_parameter(&codec, 0).unwrap_err().is_wrong_kind());

    let toggle = get_effect_onoff(&codec, 0).unwrap();
    assert_eq!(toggle.pedal, "Delay");
    assert_eq!(toggle.state, OnOff::Off);
}

#[test]
fn multi_block_preset_keeps_every_slot() {
    let preset = sample_preset();
    let mut out = SparkCodec::new();
    create_preset(&mut out, &preset).unwrap();
    assert!(out.block_count() >= 2);

    let codec = scan(&[out.wire().unwrap().to_vec()]);
    let decoded = get_preset(&codec, 0).unwrap();
    assert_eq!(decoded, preset);
    for (slot, effect) in decoded.effects.iter().enumerate() {
        assert_eq!(effect.parameters, preset.effects[slot].parameters);
    }
}

#[test]
fn largest_preset_round_trips() {
    let preset = largest_preset();
    let mut out = SparkCodec::new();
    create_preset(&mut out, &preset).unwrap();
    let wire = out.wire().unwrap();
    assert!(out.block_count() > 5);
    assert!(wire.len() <= out.block_count() * BLOCK_SIZE);

    let codec = scan(&[wire.to_vec()]);
    assert_eq!(get_preset(&codec, 0).unwrap(), preset);
}

#[test]
fn preset_split_into_single_bytes() {
    let preset = sample_preset();
    let mut link = AmpLink::new(Loopback::new().with_read_limit(1)).unwrap();
    link.send(&Command::Preset(Box::new(preset.clone()))).unwrap();
    link.send(&Command::HardwarePreset { preset: 0 }).unwrap();
    link.transport_mut().reflect();

    let messages = link.recv().unwrap();
    assert_eq!(
        messages,
        vec![
            Message::Preset(Box::new(preset)),
            Message::HardwarePreset { preset: 0 }
        ]
    );
}

#[test]
fn corrupted_preset_block_is_dropped() {
    let mut out = SparkCodec::new();
    create_preset(&mut out, &sample_preset()).unwrap();
    let mut wire = out.wire().unwrap().to_vec();
    // Flip one data bit in the second block.
    wire[BLOCK_SIZE + 30] ^= 0x01;

    let mut after = SparkCodec::new();
    change_effect(&mut after, "A", "B").unwrap();

    let codec = scan(&[wire, after.wire().unwrap().to_vec()]);
    assert!(codec.malformed_count() >= 1);
    assert_eq!(codec.num_messages(), 1);
    assert_eq!(get_effect_change(&codec, 0).unwrap().to, "B");
}

#[test]
fn parse_twice_gives_the_same_index() {
    let mut out = SparkCodec::new();
    change_effect_parameter(&mut out, "Cloner", 1, 0.25).unwrap();
    let mut codec = scan(&[out.wire().unwrap().to_vec()]);

    codec.parse_data().unwrap();
    codec.parse_data().unwrap();
    assert_eq!(codec.num_messages(), 1);
    assert_eq!(get_effect_parameter(&codec, 0).unwrap().value, 0.25);
}

#[test]
fn eighty_first_message_waits_for_a_drain() {
    let mut link = Loopback::new();
    for n in 0..=MAX_MESSAGES {
        link.push_incoming(&wire_of(&Command::HardwarePreset { preset: n as u8 }));
    }

    let mut codec = SparkCodec::new();
    codec.start_reading(0, false).unwrap();
    let status = loop {
        match codec.get_data(&mut link).unwrap() {
            ReadStatus::Pending | ReadStatus::Ready => continue,
            other => break other,
        }
    };
    assert_eq!(status, ReadStatus::DrainRequired);
    assert_eq!(codec.num_messages(), MAX_MESSAGES);
    assert_eq!(get_hardware_preset(&codec, 0).unwrap(), 0);
    assert_eq!(
        get_hardware_preset(&codec, MAX_MESSAGES - 1).unwrap(),
        (MAX_MESSAGES - 1) as u8
    );

    codec.drain_messages().unwrap();
    while codec.num_messages() == 0 {
        assert_ne!(codec.get_data(&mut link).unwrap(), ReadStatus::Exhausted);
    }
    assert_eq!(get_hardware_preset(&codec, 0).unwrap(), MAX_MESSAGES as u8);
}

#[test]
fn link_drains_long_streams() {
    let mut link = AmpLink::new(Loopback::new()).unwrap();
    for n in 0..200u8 {
        link.send(&Command::HardwarePreset { preset: n }).unwrap();
    }
    link.transport_mut().reflect();

    let messages = link.recv().unwrap();
    assert_eq!(messages.len(), 200);
    assert_eq!(messages[199], Message::HardwarePreset { preset: 199 });
}

#[test]
fn lost_final_preset_block_does_not_stall_the_link() {
    let mut out = SparkCodec::new();
    create_preset(&mut out, &sample_preset()).unwrap();
    let blocks = out.block_count();
    assert!(blocks >= 2);
    let mut wire = out.wire().unwrap().to_vec();
    // First data byte of the final block.
    wire[(blocks - 1) * BLOCK_SIZE + 22] ^= 0x01;

    let mut link = AmpLink::new(Loopback::new()).unwrap();
    link.transport_mut().push_incoming(&wire);
    for n in 0..400u32 {
        link.transport_mut()
            .push_incoming(&wire_of(&Command::HardwarePreset { preset: n as u8 }));
    }

    let messages = link.recv().unwrap();
    assert_eq!(messages.len(), 400);
    for (n, message) in messages.iter().enumerate() {
        assert_eq!(*message, Message::HardwarePreset { preset: n as u8 });
    }
}
