//! Room volume placement domain: one growth engine, pluggable strategies.

pub mod model;

mod placer;
mod strategy;

pub use model::Room;
pub use placer::RoomPlacer;
pub use strategy::GrowthStrategy;

use crate::config::RoomConfig;
use crate::rng::DeterministicRng;

/// Place a full room set from a numeric seed in one call.
pub fn place_rooms(config: RoomConfig, base_unit: f32, seed: u32) -> Vec<Room> {
    let mut rng = DeterministicRng::from_seed(seed);
    RoomPlacer::new(config, base_unit).place(&mut rng)
}
