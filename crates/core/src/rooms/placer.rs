//! Shared room growth loop: scale draws, face-touching placement, door
//! constraints, and overlap rejection.

use crate::config::{CountRange, RoomConfig};
use crate::rng::DeterministicRng;
use crate::rooms::model::Room;
use crate::types::{Direction, Vec3};

pub struct RoomPlacer {
    config: RoomConfig,
    base_unit: f32,
}

impl RoomPlacer {
    pub fn new(config: RoomConfig, base_unit: f32) -> Self {
        Self { config, base_unit }
    }

    /// Grow the room set outward from the origin. Stops at the configured
    /// room count or when the attempt budget runs out; a short list is a
    /// valid result, not an error.
    pub fn place(&self, rng: &mut DeterministicRng) -> Vec<Room> {
        let seed_room =
            Room { position: Vec3::ZERO, scale: self.draw_scale(rng), parent: None };
        let mut rooms = vec![seed_room];
        let mut child_counts = vec![0_u32];

        let mut attempts = 0_u32;
        while rooms.len() < self.config.max_rooms as usize
            && attempts < self.config.attempt_budget
        {
            attempts += 1;
            let parent = self.config.strategy.select_parent(&rooms, &child_counts, rng);
            let faces = self.config.strategy.face_order(&rooms, parent, rng);
            let scale = self.draw_scale(rng);

            for face in faces {
                let Some(candidate) = self.position_against_face(&rooms, parent, face, scale, rng)
                else {
                    continue;
                };
                if rooms.iter().any(|placed| {
                    candidate.interpenetrates(placed, self.base_unit, self.config.wall_margin)
                }) {
                    continue;
                }
                child_counts[parent] += 1;
                child_counts.push(0);
                rooms.push(candidate);
                break;
            }
        }
        rooms
    }

    fn draw_scale(&self, rng: &mut DeterministicRng) -> [u32; 3] {
        let mut scale = [0_u32; 3];
        for axis in 0..3 {
            let range =
                CountRange::new(self.config.scale.min[axis], self.config.scale.max[axis]);
            scale[axis] = range.draw(rng);
        }
        scale
    }

    /// Compute a candidate center touching the parent's chosen face exactly,
    /// with lateral offsets drawn so the shared wall keeps at least the
    /// minimum door width on both non-touch axes. `None` when the two boxes
    /// cannot fit a door.
    fn position_against_face(
        &self,
        rooms: &[Room],
        parent: usize,
        face: Direction,
        scale: [u32; 3],
        rng: &mut DeterministicRng,
    ) -> Option<Room> {
        let parent_room = &rooms[parent];
        let candidate = Room { position: Vec3::ZERO, scale, parent: Some(parent) };

        let touch_axis = face.axis();
        let mut position = parent_room.position.with_axis(
            touch_axis,
            parent_room.position.axis(touch_axis)
                + face.sign()
                    * (parent_room.half_extent(touch_axis, self.base_unit)
                        + candidate.half_extent(touch_axis, self.base_unit)),
        );

        for axis in 0..3 {
            if axis == touch_axis {
                continue;
            }
            let limit = parent_room.half_extent(axis, self.base_unit)
                + candidate.half_extent(axis, self.base_unit)
                - self.config.min_door_size;
            if limit < 0.0 {
                return None;
            }
            let offset = rng.float_range(-limit, limit);
            position = position.with_axis(axis, parent_room.position.axis(axis) + offset);
        }

        Some(Room { position, ..candidate })
    }
}
