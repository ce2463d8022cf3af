//! Layout assembly: one seed drives one rng stream through the graph
//! builder and then the room placer, yielding a single exportable record.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::{ConfigError, LayoutConfig};
use crate::graph::{GraphBuilder, NavGraph};
use crate::rng::DeterministicRng;
use crate::rooms::{Room, RoomPlacer};

/// The combined generation output. Storing this is never required: the
/// seed plus the configuration reproduce it bit-identically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub seed: u32,
    pub base_unit: f32,
    pub graph: NavGraph,
    pub rooms: Vec<Room>,
}

impl DungeonLayout {
    /// Stable little-endian encoding of everything the layout contains.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.seed.to_le_bytes());
        bytes.extend(self.base_unit.to_le_bytes());
        bytes.extend(self.graph.canonical_bytes());
        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend(room.position.x.to_le_bytes());
            bytes.extend(room.position.y.to_le_bytes());
            bytes.extend(room.position.z.to_le_bytes());
            for axis in 0..3 {
                bytes.extend(room.scale[axis].to_le_bytes());
            }
            // u32::MAX marks the parentless seed room.
            let parent = room.parent.map_or(u32::MAX, |index| index as u32);
            bytes.extend(parent.to_le_bytes());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

/// Generate a full layout from a resolved seed. Invalid configuration is
/// the only error; exhausted budgets produce a smaller, still valid layout.
pub fn generate_layout(config: &LayoutConfig, seed: u32) -> Result<DungeonLayout, ConfigError> {
    config.validate()?;
    let mut rng = DeterministicRng::from_seed(seed);
    let graph = GraphBuilder::new(config.graph.clone(), config.base_unit).build(&mut rng);
    let rooms = RoomPlacer::new(config.rooms.clone(), config.base_unit).place(&mut rng);
    Ok(DungeonLayout { seed, base_unit: config.base_unit, graph, rooms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedSpec;

    #[test]
    fn same_seed_and_config_reproduce_the_same_fingerprint() {
        let config = LayoutConfig::default();
        let left = generate_layout(&config, 8_675_309).expect("default config is valid");
        let right = generate_layout(&config, 8_675_309).expect("default config is valid");
        assert_eq!(left, right);
        assert_eq!(left.fingerprint(), right.fingerprint());
    }

    #[test]
    fn different_seeds_change_the_layout() {
        let config = LayoutConfig::default();
        let left = generate_layout(&config, 1).expect("valid");
        let right = generate_layout(&config, 2).expect("valid");
        assert_ne!(left.canonical_bytes(), right.canonical_bytes());
    }

    #[test]
    fn invalid_config_fails_before_generation_starts() {
        let mut config = LayoutConfig::default();
        config.base_unit = 0.0;
        assert_eq!(generate_layout(&config, 1), Err(ConfigError::NonPositiveBaseUnit));
    }

    #[test]
    fn validated_configs_with_huge_count_ranges_generate_cleanly() {
        // Budgets cap the work, so a count range spanning the whole u32
        // domain is a valid, if extreme, configuration.
        use crate::config::CountRange;

        let mut config = LayoutConfig::default();
        config.graph.spur_count = CountRange::new(0, u32::MAX);
        config.graph.loop_count = CountRange::new(0, u32::MAX);
        assert_eq!(config.validate(), Ok(()));
        let layout = generate_layout(&config, 6).expect("validated config generates");
        assert!(layout.graph.segments.len() as u32 <= config.graph.max_segments);
    }

    #[test]
    fn text_seed_resolution_feeds_generation() {
        let config = LayoutConfig {
            seed: Some(SeedSpec::Text("abc123".to_string())),
            ..LayoutConfig::default()
        };
        let seed = config.seed.as_ref().expect("set above").resolve();
        let layout = generate_layout(&config, seed).expect("valid");
        assert_eq!(layout.seed, seed);
    }

    #[test]
    fn layout_round_trips_through_json() {
        let config = LayoutConfig::default();
        let layout = generate_layout(&config, 99).expect("valid");
        let json = serde_json::to_string(&layout).expect("layout serializes");
        let restored: DungeonLayout = serde_json::from_str(&json).expect("layout deserializes");
        assert_eq!(layout, restored);
        assert_eq!(layout.fingerprint(), restored.fingerprint());
    }
}
