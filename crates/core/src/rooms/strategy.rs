//! Growth strategies: pluggable (parent-selection, face-order) policy pairs
//! driving the shared placement loop.

use serde::{Deserialize, Serialize};

use crate::rng::DeterministicRng;
use crate::rooms::model::Room;
use crate::types::{Direction, Vec3};

/// How far back from the newest room tendril growth may reach.
const TENDRIL_REACH: i32 = 2;
/// Organic growth extends the newest room this often; otherwise it
/// backtracks to a uniform pick.
const ORGANIC_RECENT_BIAS: f32 = 0.7;
/// Radial growth skips parents that already carry this many children.
const RADIAL_CHILD_CAP: u32 = 4;

/// Named placement policies. Each variant differs only in which placed room
/// the next one attaches to and which faces it tries first; the growth loop
/// itself is shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthStrategy {
    /// Weight toward the most recently added rooms: long winding chains.
    Tendril,
    /// Uniform parent pick: even spread.
    EvenSpread,
    /// Fewest-children-first: balanced branching.
    Balanced,
    /// Mostly recent with occasional backtracking: organic branching.
    Organic,
    /// Outward-from-origin bias on horizontal faces: ring-like growth.
    Radial,
}

impl GrowthStrategy {
    /// Choose the room the next placement attaches to.
    pub(super) fn select_parent(
        self,
        rooms: &[Room],
        child_counts: &[u32],
        rng: &mut DeterministicRng,
    ) -> usize {
        debug_assert!(!rooms.is_empty());
        let last = rooms.len() - 1;
        match self {
            Self::Tendril => {
                let reach = rng.int_range(0, TENDRIL_REACH) as usize;
                last.saturating_sub(reach)
            }
            Self::EvenSpread => rng.int_range(0, last as i32) as usize,
            Self::Balanced => child_counts
                .iter()
                .enumerate()
                .min_by_key(|&(index, count)| (*count, index))
                .map(|(index, _)| index)
                .unwrap_or(last),
            Self::Organic => {
                if rng.float_range(0.0, 1.0) < ORGANIC_RECENT_BIAS {
                    last
                } else {
                    rng.int_range(0, last as i32) as usize
                }
            }
            Self::Radial => nearest_open_to_origin(rooms, child_counts),
        }
    }

    /// Candidate attachment faces in the order to try them.
    pub(super) fn face_order(
        self,
        rooms: &[Room],
        parent: usize,
        rng: &mut DeterministicRng,
    ) -> Vec<Direction> {
        match self {
            Self::Tendril | Self::Balanced => {
                let mut horizontal = Direction::HORIZONTAL.to_vec();
                rng.shuffle(&mut horizontal);
                let mut vertical = Direction::VERTICAL.to_vec();
                rng.shuffle(&mut vertical);
                horizontal.extend(vertical);
                horizontal
            }
            Self::EvenSpread | Self::Organic => {
                let mut faces = Direction::ALL.to_vec();
                rng.shuffle(&mut faces);
                faces
            }
            Self::Radial => outward_faces(rooms[parent].position, rng),
        }
    }
}

/// The placed room horizontally closest to the origin that still has room
/// for children; falls back to the overall closest. Ties resolve to the
/// lowest index.
fn nearest_open_to_origin(rooms: &[Room], child_counts: &[u32]) -> usize {
    let distance = |index: usize| rooms[index].position.horizontal_distance_to(Vec3::ZERO);

    let mut best: Option<(f32, usize)> = None;
    for index in 0..rooms.len() {
        if child_counts[index] >= RADIAL_CHILD_CAP {
            continue;
        }
        let d = distance(index);
        if best.is_none_or(|(best_distance, _)| d < best_distance) {
            best = Some((d, index));
        }
    }
    if let Some((_, index)) = best {
        return index;
    }

    let mut fallback = (distance(0), 0);
    for index in 1..rooms.len() {
        let d = distance(index);
        if d < fallback.0 {
            fallback = (d, index);
        }
    }
    fallback.1
}

/// Horizontal faces ordered most-outward first relative to the origin.
/// A parent sitting on the origin has no outward side, so shuffle instead.
fn outward_faces(parent_position: Vec3, rng: &mut DeterministicRng) -> Vec<Direction> {
    let mut faces = Direction::HORIZONTAL.to_vec();
    if parent_position.horizontal_distance_to(Vec3::ZERO) <= f32::EPSILON {
        rng.shuffle(&mut faces);
        return faces;
    }
    faces.sort_by(|a, b| {
        let outward = |face: &Direction| {
            let unit = face.unit();
            unit.x * parent_position.x + unit.z * parent_position.z
        };
        outward(b).partial_cmp(&outward(a)).unwrap_or(std::cmp::Ordering::Equal)
    });
    faces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooms_in_a_row(count: usize) -> Vec<Room> {
        (0..count)
            .map(|index| Room {
                position: Vec3::new(index as f32 * 30.0, 0.0, 0.0),
                scale: [2, 1, 2],
                parent: index.checked_sub(1),
            })
            .collect()
    }

    #[test]
    fn tendril_stays_near_the_newest_room() {
        let rooms = rooms_in_a_row(10);
        let child_counts = vec![0; 10];
        let mut rng = DeterministicRng::from_seed(5);
        for _ in 0..100 {
            let parent = GrowthStrategy::Tendril.select_parent(&rooms, &child_counts, &mut rng);
            assert!(parent >= 7, "tendril reached too far back: {parent}");
        }
    }

    #[test]
    fn balanced_picks_the_fewest_children_with_lowest_index_ties() {
        let rooms = rooms_in_a_row(4);
        let mut rng = DeterministicRng::from_seed(1);
        let parent =
            GrowthStrategy::Balanced.select_parent(&rooms, &[2, 1, 1, 3], &mut rng);
        assert_eq!(parent, 1);
    }

    #[test]
    fn radial_prefers_rooms_near_the_origin_until_they_fill_up() {
        let rooms = rooms_in_a_row(3);
        let mut rng = DeterministicRng::from_seed(1);
        let near =
            GrowthStrategy::Radial.select_parent(&rooms, &[0, 0, 0], &mut rng);
        assert_eq!(near, 0);
        let after_cap =
            GrowthStrategy::Radial.select_parent(&rooms, &[RADIAL_CHILD_CAP, 0, 0], &mut rng);
        assert_eq!(after_cap, 1);
    }

    #[test]
    fn radial_face_order_points_away_from_the_origin() {
        let rooms = vec![Room {
            position: Vec3::new(60.0, 0.0, 0.0),
            scale: [2, 1, 2],
            parent: None,
        }];
        let mut rng = DeterministicRng::from_seed(3);
        let faces = GrowthStrategy::Radial.face_order(&rooms, 0, &mut rng);
        assert_eq!(faces[0], Direction::PosX);
        assert_eq!(*faces.last().expect("four faces"), Direction::NegX);
        assert!(faces.iter().all(|face| !face.is_vertical()));
    }

    #[test]
    fn every_strategy_returns_a_valid_parent_and_nonempty_faces() {
        let rooms = rooms_in_a_row(6);
        let child_counts = vec![1; 6];
        let strategies = [
            GrowthStrategy::Tendril,
            GrowthStrategy::EvenSpread,
            GrowthStrategy::Balanced,
            GrowthStrategy::Organic,
            GrowthStrategy::Radial,
        ];
        let mut rng = DeterministicRng::from_seed(8);
        for strategy in strategies {
            for _ in 0..50 {
                let parent = strategy.select_parent(&rooms, &child_counts, &mut rng);
                assert!(parent < rooms.len());
                assert!(!strategy.face_order(&rooms, parent, &mut rng).is_empty());
            }
        }
    }
}
