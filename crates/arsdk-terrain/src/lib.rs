//! Terrain feature binding.
//!
//! The drone reports its altitude above terrain computed from terrain maps,
//! and the state of its line-of-sight calibration. The controller can start
//! or reset that calibration.
//!
//! | Opcode | Name                     | Direction | Arguments                               |
//! |--------|--------------------------|-----------|-----------------------------------------|
//! | 1      | `altitude_above_terrain` | event     | `i32` altitude, type, `f32` precision   |
//! | 2      | `calibrate`              | command   |                                         |
//! | 3      | `calibration_state`      | event     | state, issue bitfield                   |
//! | 4      | `calibration_reset`      | command   |                                         |

use arsdk_proto::{
    Bitfield, CommandDescriptor, Direction, EnumValue, Feature, FeatureUid, Opcode, Result,
    WireDecoder, bitfield,
};

pub mod commands;

pub use commands::{altitude_above_terrain, calibrate, calibration_reset, calibration_state};

/// Terrain feature UID.
pub const UID: FeatureUid = 0x9b00;

/// Opcodes of the terrain feature.
pub mod opcode {
    use arsdk_proto::Opcode;

    /// `altitude_above_terrain` event
    pub const ALTITUDE_ABOVE_TERRAIN: Opcode = 1;
    /// `calibrate` command
    pub const CALIBRATE: Opcode = 2;
    /// `calibration_state` event
    pub const CALIBRATION_STATE: Opcode = 3;
    /// `calibration_reset` command
    pub const CALIBRATION_RESET: Opcode = 4;
}

arsdk_proto::wire_enum! {
    /// Terrain data source.
    pub enum TerrainType {
        /// No data
        None = 0,
        /// DTED data
        Dted = 1,
    }
}

arsdk_proto::wire_enum! {
    /// Line-of-sight calibration state.
    pub enum CalibrationState {
        /// Calibration is required to improve image center coordinates
        Required = 0,
        /// Drone is calibrated
        Ok = 1,
    }
}

arsdk_proto::wire_enum! {
    /// Reasons calibration cannot complete.
    pub enum CalibrationIssue {
        /// Drone is too close to perform accurate calibration
        TooClose = 0,
        /// Drone is too low to perform accurate calibration
        TooLow = 1,
    }
}

impl CalibrationIssue {
    /// Whether this issue is set in a raw issue bitfield.
    pub fn is_set_in(self, bits: u64) -> bool {
        bitfield::is_set(self, bits)
    }

    /// Call `f` for each known issue set in a raw bitfield, lowest first.
    pub fn for_each_set_in(bits: u64, f: impl FnMut(Self)) {
        bitfield::for_each_set(bits, f);
    }
}

/// Callbacks for terrain events.
///
/// Every method defaults to doing nothing; implement the ones you need.
pub trait TerrainCallbacks: Send + Sync {
    /// Altitude of the drone above terrain.
    ///
    /// `altitude` is in meters and `grid_precision` in degrees. Neither is
    /// relevant when `terrain_type` is [`TerrainType::None`].
    fn on_altitude_above_terrain(
        &self,
        _altitude: i32,
        _terrain_type: EnumValue<TerrainType>,
        _grid_precision: f32,
    ) {
    }

    /// Calibration state changed.
    ///
    /// When the state does not reach [`CalibrationState::Ok`], `issues` gives
    /// the reasons.
    fn on_calibration_state(
        &self,
        _state: EnumValue<CalibrationState>,
        _issues: Bitfield<CalibrationIssue>,
    ) {
    }
}

/// Any decoded terrain command or event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerrainMessage {
    /// `altitude_above_terrain` event
    AltitudeAboveTerrain {
        /// Altitude above terrain in meters
        altitude: i32,
        /// Terrain data used
        terrain_type: EnumValue<TerrainType>,
        /// Grid precision in degrees
        grid_precision: f32,
    },
    /// `calibrate` command
    Calibrate,
    /// `calibration_state` event
    CalibrationStatus {
        /// Calibration state
        state: EnumValue<CalibrationState>,
        /// Reported issues
        issues: Bitfield<CalibrationIssue>,
    },
    /// `calibration_reset` command
    CalibrationReset,
}

fn decode_altitude_above_terrain(decoder: &mut WireDecoder<'_>) -> Result<TerrainMessage> {
    Ok(TerrainMessage::AltitudeAboveTerrain {
        altitude: decoder.read()?,
        terrain_type: decoder.read_enum()?,
        grid_precision: decoder.read()?,
    })
}

fn decode_calibrate(_: &mut WireDecoder<'_>) -> Result<TerrainMessage> {
    Ok(TerrainMessage::Calibrate)
}

fn decode_calibration_state(decoder: &mut WireDecoder<'_>) -> Result<TerrainMessage> {
    Ok(TerrainMessage::CalibrationStatus {
        state: decoder.read_enum()?,
        issues: decoder.read_bitfield()?,
    })
}

fn decode_calibration_reset(_: &mut WireDecoder<'_>) -> Result<TerrainMessage> {
    Ok(TerrainMessage::CalibrationReset)
}

const fn descriptor(
    opcode: Opcode,
    name: &'static str,
    direction: Direction,
    decode: fn(&mut WireDecoder<'_>) -> Result<TerrainMessage>,
) -> CommandDescriptor<TerrainMessage> {
    CommandDescriptor { opcode, name, direction, decode }
}

/// The terrain feature.
#[derive(Debug, Clone, Copy)]
pub struct Terrain;

impl Feature for Terrain {
    const UID: FeatureUid = UID;
    const NAME: &'static str = "terrain";
    type Message = TerrainMessage;
    type Callbacks = dyn TerrainCallbacks;

    const COMMANDS: &'static [CommandDescriptor<TerrainMessage>] = &[
        descriptor(
            opcode::ALTITUDE_ABOVE_TERRAIN,
            "altitude_above_terrain",
            Direction::Event,
            decode_altitude_above_terrain,
        ),
        descriptor(opcode::CALIBRATE, "calibrate", Direction::Command, decode_calibrate),
        descriptor(
            opcode::CALIBRATION_STATE,
            "calibration_state",
            Direction::Event,
            decode_calibration_state,
        ),
        descriptor(
            opcode::CALIBRATION_RESET,
            "calibration_reset",
            Direction::Command,
            decode_calibration_reset,
        ),
    ];

    fn deliver(message: TerrainMessage, callbacks: &dyn TerrainCallbacks) {
        match message {
            TerrainMessage::AltitudeAboveTerrain { altitude, terrain_type, grid_precision } => {
                callbacks.on_altitude_above_terrain(altitude, terrain_type, grid_precision);
            },
            TerrainMessage::CalibrationStatus { state, issues } => {
                callbacks.on_calibration_state(state, issues);
            },
            TerrainMessage::Calibrate | TerrainMessage::CalibrationReset => {},
        }
    }
}
