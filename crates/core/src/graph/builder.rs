//! Bulk graph builder: through-path, spur branches, and reconnecting loops
//! grown in one synchronous run-to-completion pass.

use crate::config::{CountRange, GraphConfig};
use crate::graph::model::NavGraph;
use crate::graph::spatial::SpatialIndex;
use crate::graph::walk::{StepContext, StepPlan, StepRequest, plan_step};
use crate::rng::DeterministicRng;
use crate::types::{Direction, PointId};

/// Step length draw for the through-path, in base-unit multiples.
const THROUGH_STEP_UNITS: CountRange = CountRange { min: 1, max: 4 };
/// Spur and loop walks advance one cell at a time.
const BRANCH_STEP_UNITS: CountRange = CountRange { min: 1, max: 1 };
/// Spur candidates with exactly two connections are weighted this much
/// heavier than other branch points.
const CORRIDOR_SPUR_WEIGHT: usize = 3;

pub struct GraphBuilder {
    config: GraphConfig,
    base_unit: f32,
}

struct BuildState {
    graph: NavGraph,
    spatial: SpatialIndex,
    /// Remaining global segment budget shared by all three phases.
    budget: u32,
}

impl BuildState {
    /// Apply a planned step: create-and-connect or connect-to-existing.
    /// Returns the id the walk continues from.
    fn apply(&mut self, from: PointId, plan: StepPlan) -> PointId {
        let next = match plan {
            StepPlan::NewPoint { position, .. } => {
                let id = self.graph.add_point(position);
                self.spatial.register(id, position);
                id
            }
            StepPlan::ConnectExisting { target, .. } => target,
        };
        let segment = self.graph.connect(from, next);
        debug_assert!(segment.is_some(), "planned steps never duplicate a segment");
        self.budget = self.budget.saturating_sub(1);
        next
    }
}

impl GraphBuilder {
    pub fn new(config: GraphConfig, base_unit: f32) -> Self {
        Self { config, base_unit }
    }

    /// Grow a full graph. Budget exhaustion at any phase ends generation
    /// early with a valid, smaller graph; it is never an error.
    pub fn build(&self, rng: &mut DeterministicRng) -> NavGraph {
        let mut state = BuildState {
            graph: NavGraph::new(self.config.start),
            spatial: SpatialIndex::new(self.base_unit),
            budget: self.config.max_segments,
        };
        state.spatial.register(state.graph.start, self.config.start);

        self.walk_through_path(&mut state, rng);
        self.walk_spurs(&mut state, rng);
        self.walk_loops(&mut state, rng);
        state.graph
    }

    fn step_context<'a>(&'a self, state: &'a BuildState) -> StepContext<'a> {
        StepContext {
            graph: &state.graph,
            spatial: &state.spatial,
            base_unit: self.base_unit,
            vertical_probability: self.config.vertical_probability,
            goal_bias: self.config.goal_bias,
            switchback_probability: self.config.switchback_probability,
            bounds: self.config.bounds,
        }
    }

    /// Main route from the start toward the goal. Ends on goal proximity,
    /// budget exhaustion, or a fully blocked point.
    fn walk_through_path(&self, state: &mut BuildState, rng: &mut DeterministicRng) {
        let mut current = state.graph.start;
        let mut previous: Option<Direction> = None;
        let mut wander_steps = 0_u32;

        loop {
            if let Some(goal) = self.config.goal {
                if state.graph.position(current).distance_to(goal) <= self.base_unit {
                    state.graph.goals.push(current);
                    return;
                }
            } else if wander_steps >= self.config.max_segments_per_path {
                return;
            }
            if state.budget == 0 {
                return;
            }

            let request = StepRequest {
                from: current,
                previous_direction: previous,
                goal: self.config.goal,
                length_units: THROUGH_STEP_UNITS,
                allow_switchback: false,
            };
            let Some(plan) = plan_step(&self.step_context(state), &request, rng) else {
                return;
            };
            previous = Some(plan.direction());
            current = state.apply(current, plan);
            wander_steps += 1;
        }
    }

    /// Dead-end branches off existing points.
    fn walk_spurs(&self, state: &mut BuildState, rng: &mut DeterministicRng) {
        let spur_target = self.config.spur_count.draw(rng);
        for _ in 0..spur_target {
            if state.budget == 0 {
                return;
            }
            let Some(branch) = self.pick_spur_branch(&state.graph, rng) else {
                return;
            };
            let steps = self.config.spur_steps.draw(rng);
            self.walk_unbiased(state, rng, branch, steps);
        }
    }

    /// Branch point draw, weighted toward corridor points and excluding the
    /// start and goal-reaching end points.
    fn pick_spur_branch(&self, graph: &NavGraph, rng: &mut DeterministicRng) -> Option<PointId> {
        let mut weighted = Vec::new();
        for point in &graph.points {
            if point.id == graph.start || graph.goals.contains(&point.id) {
                continue;
            }
            let weight =
                if point.connections.len() == 2 { CORRIDOR_SPUR_WEIGHT } else { 1 };
            for _ in 0..weight {
                weighted.push(point.id);
            }
        }
        rng.choice(&weighted).copied()
    }

    fn walk_unbiased(
        &self,
        state: &mut BuildState,
        rng: &mut DeterministicRng,
        from: PointId,
        steps: u32,
    ) {
        let mut current = from;
        let mut previous: Option<Direction> = None;
        for _ in 0..steps {
            if state.budget == 0 {
                return;
            }
            let request = StepRequest {
                from: current,
                previous_direction: previous,
                goal: None,
                length_units: BRANCH_STEP_UNITS,
                allow_switchback: false,
            };
            let Some(plan) = plan_step(&self.step_context(state), &request, rng) else {
                return;
            };
            previous = Some(plan.direction());
            current = state.apply(current, plan);
        }
    }

    /// Cycles: walk from a corridor point toward another existing point in
    /// the search band, with occasional switchbacks, and close the loop
    /// once within one base unit of the target.
    fn walk_loops(&self, state: &mut BuildState, rng: &mut DeterministicRng) {
        let loop_target = self.config.loop_count.draw(rng);
        // A lost loop walk ends after a few times the band radius.
        let walk_cap = self.config.loop_search_band.max.saturating_mul(4).max(4);

        for _ in 0..loop_target {
            if state.budget == 0 {
                return;
            }
            let corridor = state.graph.corridor_points();
            let Some(&branch) = rng.choice(&corridor) else {
                return;
            };
            let Some(target) = self.pick_loop_target(&state.graph, branch, rng) else {
                continue;
            };
            self.walk_loop(state, rng, branch, target, walk_cap);
        }
    }

    fn pick_loop_target(
        &self,
        graph: &NavGraph,
        branch: PointId,
        rng: &mut DeterministicRng,
    ) -> Option<PointId> {
        let band_min = self.config.loop_search_band.min as f32 * self.base_unit;
        let band_max = self.config.loop_search_band.max as f32 * self.base_unit;
        let branch_position = graph.position(branch);

        let candidates: Vec<PointId> = graph
            .points
            .iter()
            .filter(|point| {
                point.id != branch
                    && !graph.are_connected(branch, point.id)
                    && {
                        let distance = branch_position.distance_to(point.position);
                        distance >= band_min && distance <= band_max
                    }
            })
            .map(|point| point.id)
            .collect();
        rng.choice(&candidates).copied()
    }

    fn walk_loop(
        &self,
        state: &mut BuildState,
        rng: &mut DeterministicRng,
        branch: PointId,
        target: PointId,
        walk_cap: u32,
    ) {
        let target_position = state.graph.position(target);
        let mut current = branch;
        let mut previous: Option<Direction> = None;

        for _ in 0..walk_cap {
            if state.budget == 0 {
                return;
            }
            if current != target
                && !state.graph.are_connected(current, target)
                && state.graph.position(current).distance_to(target_position) <= self.base_unit
            {
                state.graph.connect(current, target);
                state.budget = state.budget.saturating_sub(1);
                return;
            }
            if current == target {
                // An opportunistic spatial collision already closed the loop.
                return;
            }

            let request = StepRequest {
                from: current,
                previous_direction: previous,
                goal: Some(target_position),
                length_units: BRANCH_STEP_UNITS,
                allow_switchback: true,
            };
            let Some(plan) = plan_step(&self.step_context(state), &request, rng) else {
                return;
            };
            previous = Some(plan.direction());
            current = state.apply(current, plan);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::types::Vec3;

    fn goal_config() -> GraphConfig {
        GraphConfig {
            goal: Some(Vec3::new(150.0, 0.0, 150.0)),
            ..GraphConfig::default()
        }
    }

    #[test]
    fn same_seed_builds_byte_identical_graphs() {
        let builder = GraphBuilder::new(goal_config(), 15.0);
        let left = builder.build(&mut DeterministicRng::from_text("abc123"));
        let right = builder.build(&mut DeterministicRng::from_text("abc123"));
        assert_eq!(left.canonical_bytes(), right.canonical_bytes());
    }

    #[test]
    fn neighboring_seeds_diverge() {
        let builder = GraphBuilder::new(goal_config(), 15.0);
        let left = builder.build(&mut DeterministicRng::from_text("abc123"));
        let right = builder.build(&mut DeterministicRng::from_text("abc124"));
        assert_ne!(left.canonical_bytes(), right.canonical_bytes());
    }

    #[test]
    fn generous_budget_reaches_the_goal() {
        let config = GraphConfig { max_segments: 400, ..goal_config() };
        let goal = config.goal.expect("configured above");
        let builder = GraphBuilder::new(config, 15.0);
        for seed in [1_u32, 7, 42, 1_000, 987_654] {
            let graph = builder.build(&mut DeterministicRng::from_seed(seed));
            assert!(
                !graph.goals.is_empty(),
                "seed {seed} should reach the goal with a generous budget"
            );
            for &end in &graph.goals {
                assert!(graph.position(end).distance_to(goal) <= 15.0);
            }
        }
    }

    #[test]
    fn zero_budget_yields_the_start_only_graph_without_error() {
        let config = GraphConfig { max_segments: 0, ..goal_config() };
        let graph = GraphBuilder::new(config, 15.0).build(&mut DeterministicRng::from_seed(9));
        assert_eq!(graph.points.len(), 1);
        assert!(graph.segments.is_empty());
        assert_eq!(graph.start, PointId(0));
    }

    #[test]
    fn every_point_beyond_the_start_is_connected() {
        let builder = GraphBuilder::new(goal_config(), 15.0);
        let graph = builder.build(&mut DeterministicRng::from_seed(2_024));
        for point in &graph.points {
            if point.id != graph.start {
                assert!(!point.connections.is_empty(), "{:?} is orphaned", point.id);
            }
        }
    }

    #[test]
    fn no_two_points_share_a_quantized_cell() {
        let builder = GraphBuilder::new(goal_config(), 15.0);
        for seed in 1_u32..=20 {
            let graph = builder.build(&mut DeterministicRng::from_seed(seed));
            let probe = SpatialIndex::new(15.0);
            let mut seen = std::collections::HashSet::new();
            for point in &graph.points {
                assert!(
                    seen.insert(probe.quantize(point.position)),
                    "seed {seed}: duplicate cell for {:?}",
                    point.id
                );
            }
        }
    }

    #[test]
    fn segments_never_duplicate_an_unordered_pair() {
        let builder = GraphBuilder::new(goal_config(), 15.0);
        let graph = builder.build(&mut DeterministicRng::from_seed(77));
        let mut seen = std::collections::HashSet::new();
        for segment in &graph.segments {
            let key = if segment.from.0 < segment.to.0 {
                (segment.from, segment.to)
            } else {
                (segment.to, segment.from)
            };
            assert!(seen.insert(key), "duplicate segment {key:?}");
        }
    }
}
