//! Dispatch table routing tests.
//!
//! Two small features are declared here the way a generated binding would
//! declare them, then commands are routed through a shared table.

use std::{
    sync::{Arc, Mutex},
    thread,
};

use arsdk_proto::{
    CommandDescriptor, DecodeConfig, DecodeError, Direction, DispatchTable, EnumValue, Feature,
    FeatureUid, Registrations, Result, TableError, WireCommand, WireDecoder, WireEncoder,
};

arsdk_proto::wire_enum! {
    /// Gimbal frame of reference
    pub enum Frame {
        /// Relative to north
        Absolute = 0,
        /// Relative to the drone body
        Relative = 1,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum GimbalMessage {
    Attitude { yaw: f32, pitch: f32, frame: EnumValue<Frame> },
    Label { name: String },
    Reset,
}

trait GimbalCallbacks: Send + Sync {
    fn on_attitude(&self, _yaw: f32, _pitch: f32, _frame: EnumValue<Frame>) {}

    fn on_label(&self, _name: &str) {}
}

struct Gimbal;

const GIMBAL_UID: FeatureUid = 0x8100;

fn decode_attitude(decoder: &mut WireDecoder<'_>) -> Result<GimbalMessage> {
    Ok(GimbalMessage::Attitude {
        yaw: decoder.read()?,
        pitch: decoder.read()?,
        frame: decoder.read_enum()?,
    })
}

fn decode_label(decoder: &mut WireDecoder<'_>) -> Result<GimbalMessage> {
    Ok(GimbalMessage::Label { name: decoder.read()? })
}

fn decode_reset(_: &mut WireDecoder<'_>) -> Result<GimbalMessage> {
    Ok(GimbalMessage::Reset)
}

impl Feature for Gimbal {
    const UID: FeatureUid = GIMBAL_UID;
    const NAME: &'static str = "gimbal";
    type Message = GimbalMessage;
    type Callbacks = dyn GimbalCallbacks;

    const COMMANDS: &'static [CommandDescriptor<GimbalMessage>] = &[
        CommandDescriptor {
            opcode: 1,
            name: "attitude",
            direction: Direction::Event,
            decode: decode_attitude,
        },
        CommandDescriptor {
            opcode: 2,
            name: "reset",
            direction: Direction::Command,
            decode: decode_reset,
        },
        CommandDescriptor {
            opcode: 3,
            name: "label",
            direction: Direction::Event,
            decode: decode_label,
        },
    ];

    fn deliver(message: GimbalMessage, callbacks: &dyn GimbalCallbacks) {
        match message {
            GimbalMessage::Attitude { yaw, pitch, frame } => {
                callbacks.on_attitude(yaw, pitch, frame);
            },
            GimbalMessage::Label { name } => callbacks.on_label(&name),
            GimbalMessage::Reset => {},
        }
    }
}

trait BatteryCallbacks: Send + Sync {
    fn on_level(&self, _percent: u8) {}
}

struct Battery;

fn decode_level(decoder: &mut WireDecoder<'_>) -> Result<u8> {
    decoder.read()
}

impl Feature for Battery {
    const UID: FeatureUid = 0x8200;
    const NAME: &'static str = "battery";
    type Message = u8;
    type Callbacks = dyn BatteryCallbacks;

    const COMMANDS: &'static [CommandDescriptor<u8>] = &[CommandDescriptor {
        opcode: 1,
        name: "level",
        direction: Direction::Event,
        decode: decode_level,
    }];

    fn deliver(percent: u8, callbacks: &dyn BatteryCallbacks) {
        callbacks.on_level(percent);
    }
}

/// Records every callback it receives.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl GimbalCallbacks for Recorder {
    fn on_attitude(&self, yaw: f32, pitch: f32, frame: EnumValue<Frame>) {
        self.calls.lock().unwrap().push(format!("attitude {yaw} {pitch} {frame}"));
    }
}

impl BatteryCallbacks for Recorder {
    fn on_level(&self, percent: u8) {
        self.calls.lock().unwrap().push(format!("level {percent}"));
    }
}

fn table() -> DispatchTable {
    DispatchTable::builder().feature::<Gimbal>().feature::<Battery>().build().unwrap()
}

fn attitude(yaw: f32, pitch: f32, frame: Frame) -> WireCommand {
    let mut encoder = WireEncoder::new(GIMBAL_UID, 1);
    encoder.put(&yaw).put(&pitch).put_enum(frame);
    encoder.finish()
}

fn registered(recorder: &Arc<Recorder>) -> Registrations {
    let mut registrations = Registrations::new();
    registrations.register::<Gimbal>(recorder.clone());
    registrations.register::<Battery>(recorder.clone());
    registrations
}

#[test]
fn known_command_reaches_only_matching_callback() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);

    let command = attitude(90.0, -10.5, Frame::Relative);
    let outcome = table().dispatch(&command, &registrations).unwrap();

    assert_eq!(outcome.feature, "gimbal");
    assert_eq!(outcome.command, "attitude");
    assert!(outcome.handled);
    assert_eq!(outcome.trailing_bytes, 0);
    assert_eq!(recorder.calls(), vec!["attitude 90 -10.5 Relative"]);
}

#[test]
fn raw_bytes_route_like_parsed_commands() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);

    let bytes = [0x00, 0x82, 0x01, 0x00, 57];
    table().dispatch_bytes(&bytes, &registrations).unwrap();

    assert_eq!(recorder.calls(), vec!["level 57"]);
}

#[test]
fn unknown_feature_invokes_nothing() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);

    let command = WireCommand::new(0x7f00, 1, vec![1, 2, 3]);
    let err = table().dispatch(&command, &registrations).unwrap_err();

    assert_eq!(err, DecodeError::UnknownFeature { feature: 0x7f00 });
    assert!(err.is_version_skew());
    assert!(recorder.calls().is_empty());
}

#[test]
fn unknown_opcode_invokes_nothing() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);

    let command = WireCommand::new(GIMBAL_UID, 40, Vec::<u8>::new());
    let err = table().dispatch(&command, &registrations).unwrap_err();

    assert_eq!(err, DecodeError::UnknownCommand { feature: GIMBAL_UID, opcode: 40 });
    assert!(recorder.calls().is_empty());
}

#[test]
fn truncated_payload_invokes_nothing() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);

    // yaw and pitch present, frame missing
    let full = attitude(1.0, 2.0, Frame::Absolute);
    let short = WireCommand::new(GIMBAL_UID, 1, full.payload()[..8].to_vec());
    let err = table().dispatch(&short, &registrations).unwrap_err();

    assert!(matches!(err, DecodeError::TruncatedPayload { needed: 4, remaining: 0, .. }));
    assert!(recorder.calls().is_empty());
}

#[test]
fn failed_command_does_not_affect_the_next() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);
    let table = table();

    let broken = WireCommand::new(Battery::UID, 1, Vec::<u8>::new());
    assert!(table.dispatch(&broken, &registrations).is_err());

    table.dispatch(&WireCommand::new(Battery::UID, 1, vec![12]), &registrations).unwrap();
    assert_eq!(recorder.calls(), vec!["level 12"]);
}

#[test]
fn appended_fields_are_ignored_by_default() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);

    let command = WireCommand::new(Battery::UID, 1, vec![80, 0xde, 0xad]);
    let outcome = table().dispatch(&command, &registrations).unwrap();

    assert_eq!(outcome.trailing_bytes, 2);
    assert_eq!(recorder.calls(), vec!["level 80"]);
}

#[test]
fn strict_table_rejects_appended_fields_before_delivery() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);
    let table = DispatchTable::builder()
        .config(DecodeConfig::strict())
        .feature::<Battery>()
        .build()
        .unwrap();

    let command = WireCommand::new(Battery::UID, 1, vec![80, 0xde, 0xad]);
    let err = table.dispatch(&command, &registrations).unwrap_err();

    assert_eq!(err, DecodeError::TrailingBytes { count: 2 });
    assert!(recorder.calls().is_empty());
}

#[test]
fn unimplemented_callback_is_skipped_silently() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);

    // Recorder does not override on_label.
    let mut encoder = WireEncoder::new(GIMBAL_UID, 3);
    encoder.put("front");
    let outcome = table().dispatch(&encoder.finish(), &registrations).unwrap();

    assert!(outcome.handled);
    assert!(recorder.calls().is_empty());
}

#[test]
fn unregistered_feature_is_decoded_then_discarded() {
    let registrations = Registrations::new();
    let outcome = table().dispatch(&attitude(0.0, 0.0, Frame::Absolute), &registrations).unwrap();
    assert!(!outcome.handled);
}

#[test]
fn unregister_stops_delivery() {
    let recorder = Arc::new(Recorder::default());
    let mut registrations = registered(&recorder);
    assert!(registrations.unregister::<Battery>());
    assert!(!registrations.unregister::<Battery>());
    assert!(!registrations.is_registered(Battery::UID));

    let outcome =
        table().dispatch(&WireCommand::new(Battery::UID, 1, vec![5]), &registrations).unwrap();
    assert!(!outcome.handled);
    assert!(recorder.calls().is_empty());
}

#[test]
fn unknown_enum_value_is_delivered_as_unknown() {
    let recorder = Arc::new(Recorder::default());
    let registrations = registered(&recorder);

    let mut encoder = WireEncoder::new(GIMBAL_UID, 1);
    encoder.put(&0.0f32).put(&0.0f32).put(&7i32);
    table().dispatch(&encoder.finish(), &registrations).unwrap();

    assert_eq!(recorder.calls(), vec!["attitude 0 0 Frame::Unknown(7)"]);
}

#[test]
fn typed_decode_without_dispatch() {
    let command = attitude(3.0, 4.0, Frame::Absolute);
    let message =
        arsdk_proto::dispatch::decode::<Gimbal>(&command, DecodeConfig::default()).unwrap();
    assert_eq!(
        message,
        GimbalMessage::Attitude { yaw: 3.0, pitch: 4.0, frame: EnumValue::Known(Frame::Absolute) }
    );

    let other = WireCommand::new(Battery::UID, 1, vec![1]);
    assert_eq!(
        arsdk_proto::dispatch::decode::<Gimbal>(&other, DecodeConfig::default()),
        Err(DecodeError::UnknownFeature { feature: Battery::UID })
    );
}

#[test]
fn describe_lists_commands_in_order() {
    let listing: Vec<_> =
        table().describe().into_iter().map(|info| (info.feature, info.opcode, info.name)).collect();
    assert_eq!(
        listing,
        vec![
            (GIMBAL_UID, 1, "attitude"),
            (GIMBAL_UID, 2, "reset"),
            (GIMBAL_UID, 3, "label"),
            (Battery::UID, 1, "level"),
        ]
    );
}

struct Impostor;

impl Feature for Impostor {
    const UID: FeatureUid = GIMBAL_UID;
    const NAME: &'static str = "impostor";
    type Message = u8;
    type Callbacks = dyn BatteryCallbacks;
    const COMMANDS: &'static [CommandDescriptor<u8>] = &[];

    fn deliver(_: u8, _: &dyn BatteryCallbacks) {}
}

struct Repeated;

impl Feature for Repeated {
    const UID: FeatureUid = 0x8300;
    const NAME: &'static str = "repeated";
    type Message = u8;
    type Callbacks = dyn BatteryCallbacks;
    const COMMANDS: &'static [CommandDescriptor<u8>] = &[
        CommandDescriptor {
            opcode: 1,
            name: "a",
            direction: Direction::Event,
            decode: decode_level,
        },
        CommandDescriptor {
            opcode: 1,
            name: "b",
            direction: Direction::Event,
            decode: decode_level,
        },
    ];

    fn deliver(_: u8, _: &dyn BatteryCallbacks) {}
}

#[test]
fn table_rejects_duplicate_uid() {
    let err =
        DispatchTable::builder().feature::<Gimbal>().feature::<Impostor>().build().unwrap_err();
    assert_eq!(
        err,
        TableError::DuplicateFeature { uid: GIMBAL_UID, existing: "gimbal", duplicate: "impostor" }
    );
}

#[test]
fn table_rejects_duplicate_opcode() {
    let err = DispatchTable::builder().feature::<Repeated>().build().unwrap_err();
    assert_eq!(err, TableError::DuplicateOpcode { feature: "repeated", opcode: 1 });
}

#[test]
fn concurrent_dispatch_shares_one_table() {
    let recorder = Arc::new(Recorder::default());
    let registrations = Arc::new(registered(&recorder));
    let table = Arc::new(table());

    let handles: Vec<_> = (0..4u8)
        .map(|n| {
            let table = Arc::clone(&table);
            let registrations = Arc::clone(&registrations);
            thread::spawn(move || {
                for _ in 0..25 {
                    let command = WireCommand::new(Battery::UID, 1, vec![n]);
                    table.dispatch(&command, &registrations).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(recorder.calls().len(), 100);
}
