//! Room volume model and the margin-adjusted AABB overlap test.

use serde::{Deserialize, Serialize};

use crate::types::Vec3;

/// Exact wall touches must never count as interpenetration, since the
/// touching placement itself depends on it, so the interval test keeps a
/// small epsilon against float rounding.
const TOUCH_EPSILON: f32 = 1e-3;

/// An axis-aligned room volume. Immutable once placed; the whole set is
/// regenerated from scratch per call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Center of the box in studs.
    pub position: Vec3,
    /// Integer dimensions in base-unit multiples.
    pub scale: [u32; 3],
    /// Index of the room this one attached to; `None` for the seed room.
    pub parent: Option<usize>,
}

impl Room {
    pub fn half_extent(&self, axis: usize, base_unit: f32) -> f32 {
        self.scale[axis] as f32 * base_unit / 2.0
    }

    /// Margin-adjusted interpenetration: both boxes shrink their half
    /// extents by `margin`, then the boxes overlap iff their intervals
    /// intersect strictly on all three axes. A zero-gap touch never counts.
    pub fn interpenetrates(&self, other: &Self, base_unit: f32, margin: f32) -> bool {
        (0..3).all(|axis| {
            intervals_interpenetrate(
                self.position.axis(axis),
                self.half_extent(axis, base_unit),
                other.position.axis(axis),
                other.half_extent(axis, base_unit),
                margin,
            )
        })
    }

    /// Shared interval width with `other` along one axis. Negative when the
    /// intervals are disjoint.
    pub fn overlap_width(&self, other: &Self, axis: usize, base_unit: f32) -> f32 {
        let self_half = self.half_extent(axis, base_unit);
        let other_half = other.half_extent(axis, base_unit);
        let high = (self.position.axis(axis) + self_half)
            .min(other.position.axis(axis) + other_half);
        let low = (self.position.axis(axis) - self_half)
            .max(other.position.axis(axis) - other_half);
        high - low
    }
}

fn intervals_interpenetrate(
    a_center: f32,
    a_half: f32,
    b_center: f32,
    b_half: f32,
    margin: f32,
) -> bool {
    let a_min = a_center - (a_half - margin);
    let a_max = a_center + (a_half - margin);
    let b_min = b_center - (b_half - margin);
    let b_max = b_center + (b_half - margin);
    a_min < b_max - TOUCH_EPSILON && b_min < a_max - TOUCH_EPSILON
}
