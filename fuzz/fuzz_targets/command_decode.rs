//! Arbitrary command buffers through the router.
//!
//! Decoding must never panic, and a command that fails to decode must never
//! reach a callback.

#![no_main]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use arsdk_controller::{CommandRouter, RouterConfig};
use arsdk_proto::{Bitfield, DispatchTable, EnumValue};
use arsdk_terrain::{CalibrationIssue, CalibrationState, Terrain, TerrainCallbacks, TerrainType};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Count(AtomicUsize);

impl TerrainCallbacks for Count {
    fn on_altitude_above_terrain(&self, _: i32, _: EnumValue<TerrainType>, _: f32) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn on_calibration_state(&self, _: EnumValue<CalibrationState>, _: Bitfield<CalibrationIssue>) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fuzz_target!(|data: &[u8]| {
    let features = DispatchTable::builder().feature::<Terrain>();
    let Ok(router) = CommandRouter::new(features, RouterConfig::strict()) else {
        return;
    };
    let count = Arc::new(Count::default());
    if router.register::<Terrain>(count.clone()).is_err() {
        return;
    }

    if router.receive(data).is_err() {
        assert_eq!(count.0.load(Ordering::Relaxed), 0);
    }
});
