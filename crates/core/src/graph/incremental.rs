//! Segment-by-segment graph generation negotiated with an external
//! geometry validator.
//!
//! The session is an explicit state machine, not a blocking call: it emits
//! one candidate segment, suspends until the caller applies a verdict, and
//! only then plans the next step. Any scheduler can drive it: timers,
//! queued messages, or a synchronous test harness. At most one candidate is
//! ever pending; a verdict with nothing pending is logged and ignored so it
//! can never corrupt finalized points or segments.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, CountRange, GraphConfig};
use crate::graph::model::NavGraph;
use crate::graph::spatial::SpatialIndex;
use crate::graph::walk::{StepContext, StepPlan, StepRequest, plan_step};
use crate::rng::DeterministicRng;
use crate::types::{Direction, PointId, Vec3};

/// Step length draw, in base-unit multiples. Matches the bulk builder's
/// through-path so both modes share topology rules.
const STEP_UNITS: CountRange = CountRange { min: 1, max: 4 };

/// A proposed segment awaiting the external validator's verdict.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateSegment {
    pub from_id: PointId,
    /// Id the end point will take if accepted at a fresh cell; the id of
    /// the existing point if the candidate lands on an occupied cell.
    pub to_id: PointId,
    pub from_position: Vec3,
    pub to_position: Vec3,
    pub direction: Direction,
}

/// External validator's answer to a candidate segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    Accept,
    /// Rejection with the measured overlap depth; the end point shifts by
    /// `overlap` plus one base unit and the same segment is resent.
    Reject { overlap: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub seed: u32,
    pub total_points: u32,
    pub total_segments: u32,
}

/// What the session surfaces on each `advance` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionEvent {
    /// A candidate awaiting validation. Re-surfaced unchanged if `advance`
    /// is called again before a verdict arrives.
    Candidate(CandidateSegment),
    PathComplete { path_index: u32 },
    Complete(SessionSummary),
    /// A segment exhausted its rejection ceiling; the session is dead.
    Failed { path_index: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// A verdict arrived while nothing was pending.
    VerdictWithoutPending,
    /// The rejection ceiling was exceeded for the pending segment.
    OverlapUnresolvable { path_index: u32, retries: u32 },
}

/// Defensive log of protocol anomalies, exposed to callers for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolNote {
    VerdictWithoutPending,
    DuplicateConnectionIgnored { from: PointId, to: PointId },
    OverlapUnresolvable { path_index: u32, retries: u32 },
}

#[derive(Clone, Debug, PartialEq)]
struct PendingSegment {
    from: PointId,
    to_position: Vec3,
    direction: Direction,
    retries: u32,
}

#[derive(Clone, Debug, PartialEq)]
enum Phase {
    Idle,
    AwaitingVerdict(PendingSegment),
    Complete,
    Failed,
}

pub struct IncrementalSession {
    config: GraphConfig,
    base_unit: f32,
    seed: u32,
    rng: DeterministicRng,
    graph: NavGraph,
    spatial: SpatialIndex,
    phase: Phase,
    path_index: u32,
    /// Accepted segments in the current path.
    segments_in_path: u32,
    /// Segment cap for the current path.
    path_cap: u32,
    /// Goal bias target for the current path; only the main path has one.
    path_goal: Option<Vec3>,
    current_from: PointId,
    previous_direction: Option<Direction>,
    spurs_remaining: u32,
    budget: u32,
    notes: Vec<ProtocolNote>,
}

impl IncrementalSession {
    pub fn new(config: GraphConfig, base_unit: f32, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = DeterministicRng::from_seed(seed);
        let spurs_remaining = config.spur_count.draw(&mut rng);

        let graph = NavGraph::new(config.start);
        let mut spatial = SpatialIndex::new(base_unit);
        spatial.register(graph.start, config.start);

        Ok(Self {
            path_cap: config.max_segments_per_path,
            path_goal: config.goal,
            budget: config.max_segments,
            current_from: graph.start,
            config,
            base_unit,
            seed,
            rng,
            graph,
            spatial,
            phase: Phase::Idle,
            path_index: 0,
            segments_in_path: 0,
            previous_direction: None,
            spurs_remaining,
            notes: Vec::new(),
        })
    }

    /// Drive the session one event forward. Idempotent while a verdict is
    /// outstanding and after completion.
    pub fn advance(&mut self) -> SessionEvent {
        match &self.phase {
            Phase::AwaitingVerdict(pending) => SessionEvent::Candidate(self.candidate(pending)),
            Phase::Complete => SessionEvent::Complete(self.summary()),
            Phase::Failed => SessionEvent::Failed { path_index: self.path_index },
            Phase::Idle => self.plan_next(),
        }
    }

    /// Apply the external validator's verdict to the pending candidate.
    pub fn apply_verdict(&mut self, verdict: Verdict) -> Result<(), ProtocolError> {
        let Phase::AwaitingVerdict(pending) = &mut self.phase else {
            self.notes.push(ProtocolNote::VerdictWithoutPending);
            return Err(ProtocolError::VerdictWithoutPending);
        };

        match verdict {
            Verdict::Accept => {
                let pending = pending.clone();
                self.commit(pending);
                Ok(())
            }
            Verdict::Reject { overlap } => {
                pending.retries += 1;
                if pending.retries > self.config.max_overlap_retries {
                    let note = ProtocolNote::OverlapUnresolvable {
                        path_index: self.path_index,
                        retries: pending.retries,
                    };
                    let error = ProtocolError::OverlapUnresolvable {
                        path_index: self.path_index,
                        retries: pending.retries,
                    };
                    self.notes.push(note);
                    self.phase = Phase::Failed;
                    return Err(error);
                }
                // Strictly increasing separation along the original
                // direction guarantees eventual progress.
                let shift = pending.direction.unit().scaled(overlap + self.base_unit);
                pending.to_position = pending.to_position.offset(shift);
                Ok(())
            }
        }
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    /// Consume the session after completion, yielding the finalized graph.
    pub fn into_graph(self) -> NavGraph {
        self.graph
    }

    pub fn notes(&self) -> &[ProtocolNote] {
        &self.notes
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    pub fn is_awaiting_verdict(&self) -> bool {
        matches!(self.phase, Phase::AwaitingVerdict(_))
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            seed: self.seed,
            total_points: self.graph.points.len() as u32,
            total_segments: self.graph.segments.len() as u32,
        }
    }

    fn candidate(&self, pending: &PendingSegment) -> CandidateSegment {
        CandidateSegment {
            from_id: pending.from,
            to_id: self
                .spatial
                .lookup(pending.to_position)
                .unwrap_or_else(|| self.graph.next_point_id()),
            from_position: self.graph.position(pending.from),
            to_position: pending.to_position,
            direction: pending.direction,
        }
    }

    /// Plan the next candidate, or close out the current path or session
    /// when its end conditions hold.
    fn plan_next(&mut self) -> SessionEvent {
        if self.budget == 0 {
            self.phase = Phase::Complete;
            return SessionEvent::Complete(self.summary());
        }
        if self.segments_in_path >= self.path_cap {
            return self.finish_path();
        }
        if let Some(goal) = self.path_goal {
            if self.graph.position(self.current_from).distance_to(goal) <= self.base_unit {
                if !self.graph.goals.contains(&self.current_from) {
                    self.graph.goals.push(self.current_from);
                }
                return self.finish_path();
            }
        }

        let context = StepContext {
            graph: &self.graph,
            spatial: &self.spatial,
            base_unit: self.base_unit,
            vertical_probability: self.config.vertical_probability,
            goal_bias: self.config.goal_bias,
            switchback_probability: self.config.switchback_probability,
            bounds: self.config.bounds,
        };
        let request = StepRequest {
            from: self.current_from,
            previous_direction: self.previous_direction,
            goal: self.path_goal,
            length_units: STEP_UNITS,
            allow_switchback: false,
        };
        let Some(plan) = plan_step(&context, &request, &mut self.rng) else {
            return self.finish_path();
        };

        let (direction, to_position) = match plan {
            StepPlan::NewPoint { direction, position } => (direction, position),
            StepPlan::ConnectExisting { direction, target } => {
                (direction, self.graph.position(target))
            }
        };
        let pending =
            PendingSegment { from: self.current_from, to_position, direction, retries: 0 };
        let candidate = self.candidate(&pending);
        self.phase = Phase::AwaitingVerdict(pending);
        SessionEvent::Candidate(candidate)
    }

    /// Emit path-complete for the current path and line up the next spur,
    /// or complete the session when no path remains.
    fn finish_path(&mut self) -> SessionEvent {
        let finished = self.path_index;
        if !self.start_next_spur() {
            self.phase = Phase::Complete;
        }
        SessionEvent::PathComplete { path_index: finished }
    }

    fn start_next_spur(&mut self) -> bool {
        while self.spurs_remaining > 0 && self.budget > 0 {
            self.spurs_remaining -= 1;
            // Junction candidates: exactly two connections, never the start.
            // The graph cannot change between iterations, so an empty
            // candidate list stays empty.
            let candidates = self.graph.corridor_points();
            let Some(&branch) = self.rng.choice(&candidates) else {
                return false;
            };
            self.path_index += 1;
            self.segments_in_path = 0;
            self.path_cap = self.config.spur_steps.draw(&mut self.rng);
            self.path_goal = None;
            self.current_from = branch;
            self.previous_direction = None;
            return true;
        }
        false
    }

    /// Finalize an accepted segment: resolve the end point, register the
    /// connection, and move the walk head forward.
    fn commit(&mut self, pending: PendingSegment) {
        let to = match self.spatial.lookup(pending.to_position) {
            Some(existing) => existing,
            None => {
                let id = self.graph.add_point(pending.to_position);
                self.spatial.register(id, pending.to_position);
                id
            }
        };
        if self.graph.connect(pending.from, to).is_some() {
            self.budget = self.budget.saturating_sub(1);
            self.segments_in_path += 1;
        } else {
            // Overlap shifts can land on an already-connected neighbor;
            // record it and keep walking from there.
            self.notes
                .push(ProtocolNote::DuplicateConnectionIgnored { from: pending.from, to });
        }
        self.previous_direction = Some(pending.direction);
        self.current_from = to;
        self.phase = Phase::Idle;
    }
}
