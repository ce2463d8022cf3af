//! Shared direction policy for all graph walks.
//!
//! Every walk (through-path, spur, loop, incremental) plans steps the same
//! way: six axis-aligned directions, no immediate reversal of the previous
//! segment, vertical moves behind a separate probability with horizontal
//! fallback, bounds clamping, and an explicit connect-instead-of-create
//! branch when the target cell is already occupied.

use crate::config::CountRange;
use crate::graph::model::NavGraph;
use crate::graph::spatial::SpatialIndex;
use crate::rng::DeterministicRng;
use crate::types::{Bounds, Direction, PointId, Vec3};

/// Read-only surroundings a step is planned against.
pub(crate) struct StepContext<'a> {
    pub(crate) graph: &'a NavGraph,
    pub(crate) spatial: &'a SpatialIndex,
    pub(crate) base_unit: f32,
    pub(crate) vertical_probability: f32,
    pub(crate) goal_bias: f32,
    pub(crate) switchback_probability: f32,
    pub(crate) bounds: Option<Bounds>,
}

pub(crate) struct StepRequest {
    pub(crate) from: PointId,
    pub(crate) previous_direction: Option<Direction>,
    /// Goal-ward bias target. `None` walks uniformly.
    pub(crate) goal: Option<Vec3>,
    /// Step length draw, in base-unit multiples.
    pub(crate) length_units: CountRange,
    /// Loop walks may take a switchback step instead of the best direction.
    pub(crate) allow_switchback: bool,
}

/// Outcome of planning one step. Landing on an occupied cell connects to
/// the existing point rather than creating a twin; this is where loops
/// emerge opportunistically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum StepPlan {
    NewPoint { direction: Direction, position: Vec3 },
    ConnectExisting { direction: Direction, target: PointId },
}

impl StepPlan {
    pub(crate) fn direction(self) -> Direction {
        match self {
            Self::NewPoint { direction, .. } | Self::ConnectExisting { direction, .. } => direction,
        }
    }
}

/// Plan the next step of a walk, or `None` when every direction is
/// reversed, out of bounds, or already connected. Callers treat `None` as
/// normal early termination, never as an error.
pub(crate) fn plan_step(
    context: &StepContext<'_>,
    request: &StepRequest,
    rng: &mut DeterministicRng,
) -> Option<StepPlan> {
    let step_length =
        request.length_units.draw(rng) as f32 * context.base_unit;

    let vertical_roll = context.vertical_probability > 0.0
        && rng.float_range(0.0, 1.0) < context.vertical_probability;

    let candidates = if vertical_roll {
        let vertical = usable_candidates(context, request, &Direction::VERTICAL, step_length);
        if vertical.is_empty() {
            usable_candidates(context, request, &Direction::HORIZONTAL, step_length)
        } else {
            vertical
        }
    } else {
        usable_candidates(context, request, &Direction::HORIZONTAL, step_length)
    };

    if candidates.is_empty() {
        return None;
    }

    if request.allow_switchback
        && rng.float_range(0.0, 1.0) < context.switchback_probability
    {
        return rng.choice(&candidates).copied();
    }

    if let Some(goal) = request.goal {
        let from_position = context.graph.position(request.from);
        if let Some(best) = goalward_candidate(&candidates, from_position, goal) {
            if rng.float_range(0.0, 1.0) < context.goal_bias {
                return Some(best);
            }
        }
    }

    rng.choice(&candidates).copied()
}

fn usable_candidates(
    context: &StepContext<'_>,
    request: &StepRequest,
    pool: &[Direction],
    step_length: f32,
) -> Vec<StepPlan> {
    let forbidden = request.previous_direction.map(Direction::reverse);
    let from_position = context.graph.position(request.from);

    let mut candidates = Vec::with_capacity(pool.len());
    for &direction in pool {
        if Some(direction) == forbidden {
            continue;
        }
        let target = from_position.offset(direction.unit().scaled(step_length));
        if let Some(bounds) = context.bounds {
            if !bounds.contains(target) {
                continue;
            }
        }
        match context.spatial.lookup(target) {
            None => candidates.push(StepPlan::NewPoint { direction, position: target }),
            Some(existing) => {
                if existing == request.from
                    || context.graph.are_connected(request.from, existing)
                {
                    continue;
                }
                candidates.push(StepPlan::ConnectExisting { direction, target: existing });
            }
        }
    }
    candidates
}

/// The candidate making the most horizontal progress toward the goal, if
/// any makes progress at all. Ties resolve in pool order.
fn goalward_candidate(candidates: &[StepPlan], from: Vec3, goal: Vec3) -> Option<StepPlan> {
    let mut best: Option<(f32, StepPlan)> = None;
    for &candidate in candidates {
        let unit = candidate.direction().unit();
        let progress = unit.x * (goal.x - from.x) + unit.z * (goal.z - from.z);
        if progress <= f32::EPSILON {
            continue;
        }
        if best.is_none_or(|(best_progress, _)| progress > best_progress) {
            best = Some((progress, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}
