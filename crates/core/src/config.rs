//! Generation configuration, defaults, and up-front validation.
//!
//! Configuration errors are the only condition that stops a session before
//! it starts. Exhausted budgets during generation are normal outcomes and
//! never surface as errors.

use serde::{Deserialize, Serialize};

use crate::rng::{DeterministicRng, fold_text_seed};
use crate::rooms::GrowthStrategy;
use crate::types::{Bounds, Vec3};

/// Seed input as the caller provides it. Text seeds fold deterministically
/// into numeric seeds, so either form is stable to persist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedSpec {
    Numeric(u32),
    Text(String),
}

impl SeedSpec {
    pub fn resolve(&self) -> u32 {
        match self {
            Self::Numeric(seed) => *seed,
            Self::Text(text) => fold_text_seed(text),
        }
    }
}

/// Inclusive integer range drawn from once per use site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Inclusive draw. The span is widened to u64 so ranges anywhere in the
    /// u32 domain stay valid; the reduction matches `int_range` bit for bit
    /// on every range that fits in i32.
    pub fn draw(&self, rng: &mut DeterministicRng) -> u32 {
        debug_assert!(self.is_ordered());
        let span = u64::from(self.max) - u64::from(self.min) + 1;
        self.min.wrapping_add((u64::from(rng.next()) % span) as u32)
    }

    fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Settings for both the bulk graph builder and the incremental protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub start: Vec3,
    /// Target for the through-path. Without one the walk wanders until the
    /// per-walk step cap or the segment budget ends it.
    pub goal: Option<Vec3>,
    /// Global segment budget shared by the through-path, spurs, and loops.
    pub max_segments: u32,
    pub spur_count: CountRange,
    pub spur_steps: CountRange,
    pub loop_count: CountRange,
    /// Loop target search band, in base-unit multiples from the branch point.
    pub loop_search_band: CountRange,
    /// Per-step chance of drawing from the vertical direction set.
    pub vertical_probability: f32,
    /// Chance a loop walk ignores the goal-ward direction for one step.
    pub switchback_probability: f32,
    /// Chance a goal-seeking step takes the locally best direction instead
    /// of a uniform legal one.
    pub goal_bias: f32,
    /// Incremental protocol: segments per path before a path completes.
    pub max_segments_per_path: u32,
    /// Incremental protocol: rejection ceiling per segment before the
    /// session fails as unresolvable.
    pub max_overlap_retries: u32,
    pub bounds: Option<Bounds>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            start: Vec3::ZERO,
            goal: None,
            max_segments: 48,
            spur_count: CountRange::new(2, 4),
            spur_steps: CountRange::new(2, 5),
            loop_count: CountRange::new(1, 2),
            loop_search_band: CountRange::new(2, 6),
            vertical_probability: 0.08,
            switchback_probability: 0.25,
            goal_bias: 0.75,
            max_segments_per_path: 12,
            max_overlap_retries: 32,
            bounds: None,
        }
    }
}

/// Per-axis integer scale range for room volumes. World dimensions are
/// `scale * base_unit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: [u32; 3],
    pub max: [u32; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub scale: ScaleRange,
    /// Minimum shared-wall width (studs) a child must keep with its parent
    /// on both non-touch axes.
    pub min_door_size: f32,
    /// Half-extent shrink applied before the interpenetration test.
    pub wall_margin: f32,
    pub max_rooms: u32,
    /// Placement attempts before growth stops early.
    pub attempt_budget: u32,
    pub strategy: GrowthStrategy,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            scale: ScaleRange { min: [2, 1, 2], max: [4, 2, 4] },
            min_door_size: 8.0,
            wall_margin: 0.5,
            max_rooms: 12,
            attempt_budget: 96,
            strategy: GrowthStrategy::Organic,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Omitted seed means the caller generates one and reports it.
    pub seed: Option<SeedSpec>,
    /// Grid spacing in studs; all step lengths and room dimensions are
    /// integer multiples of it.
    pub base_unit: f32,
    pub graph: GraphConfig,
    pub rooms: RoomConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { seed: None, base_unit: 15.0, graph: GraphConfig::default(), rooms: RoomConfig::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    NonPositiveBaseUnit,
    InvertedRange { field: &'static str },
    ProbabilityOutOfRange { field: &'static str },
    InvertedScaleRange { axis: usize },
    ZeroScale { axis: usize },
    NegativeDoorSize,
    NegativeWallMargin,
    /// The smallest permitted room wall cannot fit the requested door.
    DoorWiderThanSmallestWall,
    ZeroMaxRooms,
    InvertedBounds,
    StartOutsideBounds,
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_unit > 0.0) {
            return Err(ConfigError::NonPositiveBaseUnit);
        }
        self.graph.validate()?;
        self.rooms.validate(self.base_unit)
    }
}

impl GraphConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, range) in [
            ("spur_count", self.spur_count),
            ("spur_steps", self.spur_steps),
            ("loop_count", self.loop_count),
            ("loop_search_band", self.loop_search_band),
        ] {
            if !range.is_ordered() {
                return Err(ConfigError::InvertedRange { field });
            }
        }
        for (field, probability) in [
            ("vertical_probability", self.vertical_probability),
            ("switchback_probability", self.switchback_probability),
            ("goal_bias", self.goal_bias),
        ] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(ConfigError::ProbabilityOutOfRange { field });
            }
        }
        if let Some(bounds) = self.bounds {
            if bounds.min.x > bounds.max.x
                || bounds.min.y > bounds.max.y
                || bounds.min.z > bounds.max.z
            {
                return Err(ConfigError::InvertedBounds);
            }
            if !bounds.contains(self.start) {
                return Err(ConfigError::StartOutsideBounds);
            }
        }
        Ok(())
    }
}

impl RoomConfig {
    pub fn validate(&self, base_unit: f32) -> Result<(), ConfigError> {
        for axis in 0..3 {
            if self.scale.min[axis] == 0 {
                return Err(ConfigError::ZeroScale { axis });
            }
            if self.scale.min[axis] > self.scale.max[axis] {
                return Err(ConfigError::InvertedScaleRange { axis });
            }
        }
        if self.min_door_size < 0.0 {
            return Err(ConfigError::NegativeDoorSize);
        }
        if self.wall_margin < 0.0 {
            return Err(ConfigError::NegativeWallMargin);
        }
        // Door overlap on a non-touch axis can never exceed the smaller
        // wall, so every permitted wall must be at least door-sized.
        let smallest_wall =
            self.scale.min.iter().copied().min().unwrap_or(0) as f32 * base_unit;
        if smallest_wall < self.min_door_size {
            return Err(ConfigError::DoorWiderThanSmallestWall);
        }
        if self.max_rooms == 0 {
            return Err(ConfigError::ZeroMaxRooms);
        }
        Ok(())
    }
}
