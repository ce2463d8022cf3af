//! Navigation graph generation domain split into coherent submodules.

pub mod incremental;
pub mod model;

mod builder;
mod spatial;
mod walk;

pub use builder::GraphBuilder;
pub use incremental::{
    CandidateSegment, IncrementalSession, ProtocolError, ProtocolNote, SessionEvent,
    SessionSummary, Verdict,
};
pub use model::{NavGraph, Point, Segment};
pub use spatial::SpatialIndex;

use crate::config::GraphConfig;
use crate::rng::DeterministicRng;

/// Build a full graph from a numeric seed in one call.
pub fn build_graph(config: GraphConfig, base_unit: f32, seed: u32) -> NavGraph {
    let mut rng = DeterministicRng::from_seed(seed);
    GraphBuilder::new(config, base_unit).build(&mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    #[test]
    fn build_graph_matches_graph_builder_output() {
        let config = GraphConfig {
            goal: Some(Vec3::new(150.0, 0.0, 150.0)),
            ..GraphConfig::default()
        };

        let from_helper = super::build_graph(config.clone(), 15.0, 321);
        let mut rng = DeterministicRng::from_seed(321);
        let from_builder = GraphBuilder::new(config, 15.0).build(&mut rng);

        assert_eq!(from_helper, from_builder);
    }
}
