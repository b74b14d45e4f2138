//! Callback sets that report events through `tracing`.

use arsdk_proto::{Bitfield, EnumValue};
use arsdk_terrain::{CalibrationIssue, CalibrationState, TerrainCallbacks, TerrainType};
use tracing::info;

/// Logs every terrain event at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerrainLogger;

impl TerrainCallbacks for TerrainLogger {
    fn on_altitude_above_terrain(
        &self,
        altitude: i32,
        terrain_type: EnumValue<TerrainType>,
        grid_precision: f32,
    ) {
        info!(altitude, %terrain_type, grid_precision, "altitude above terrain");
    }

    fn on_calibration_state(
        &self,
        state: EnumValue<CalibrationState>,
        issues: Bitfield<CalibrationIssue>,
    ) {
        info!(%state, ?issues, "calibration state");
    }
}
