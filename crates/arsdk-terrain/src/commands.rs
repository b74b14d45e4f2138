//! Terrain encoders.
//!
//! `calibrate` and `calibration_reset` are sent by the controller. The event
//! encoders produce what the drone sends; simulators and tests use them to
//! generate inbound traffic.

use arsdk_proto::{Bitfield, WireCommand, WireEncoder};

use crate::{CalibrationIssue, CalibrationState, TerrainType, UID, opcode};

/// Start line-of-sight calibration.
///
/// The drone assumes the pilot is at the center of the image and corrects
/// gimbal angles accordingly.
pub fn calibrate() -> WireCommand {
    WireCommand::new(UID, opcode::CALIBRATE, Vec::<u8>::new())
}

/// Discard the current line-of-sight calibration.
pub fn calibration_reset() -> WireCommand {
    WireCommand::new(UID, opcode::CALIBRATION_RESET, Vec::<u8>::new())
}

/// `altitude_above_terrain` event.
pub fn altitude_above_terrain(
    altitude: i32,
    terrain_type: TerrainType,
    grid_precision: f32,
) -> WireCommand {
    let mut encoder = WireEncoder::new(UID, opcode::ALTITUDE_ABOVE_TERRAIN);
    encoder.put(&altitude).put_enum(terrain_type).put(&grid_precision);
    encoder.finish()
}

/// `calibration_state` event.
pub fn calibration_state(
    state: CalibrationState,
    issues: Bitfield<CalibrationIssue>,
) -> WireCommand {
    let mut encoder = WireEncoder::new(UID, opcode::CALIBRATION_STATE);
    encoder.put_enum(state).put_bitfield(issues);
    encoder.finish()
}
