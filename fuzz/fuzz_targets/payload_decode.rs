//! Arbitrary payloads through every terrain decoder.
//!
//! A payload that decodes must re-encode to the bytes it consumed.

#![no_main]

use arsdk_proto::{DecodeConfig, Feature, WireCommand, dispatch};
use arsdk_terrain::{Terrain, TerrainMessage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for descriptor in Terrain::COMMANDS {
        let command = WireCommand::new(Terrain::UID, descriptor.opcode, data.to_vec());
        let Ok(message) = dispatch::decode::<Terrain>(&command, DecodeConfig::strict()) else {
            continue;
        };

        let reencoded = match message {
            TerrainMessage::AltitudeAboveTerrain { altitude, terrain_type, grid_precision } => {
                let Some(terrain_type) = terrain_type.known() else { continue };
                arsdk_terrain::altitude_above_terrain(altitude, terrain_type, grid_precision)
            },
            TerrainMessage::CalibrationStatus { state, issues } => {
                let Some(state) = state.known() else { continue };
                if issues.unrecognized_bits() != 0 {
                    continue;
                }
                arsdk_terrain::calibration_state(state, issues)
            },
            TerrainMessage::Calibrate => arsdk_terrain::calibrate(),
            TerrainMessage::CalibrationReset => arsdk_terrain::calibration_reset(),
        };
        assert_eq!(reencoded.payload(), data);
    }
});
