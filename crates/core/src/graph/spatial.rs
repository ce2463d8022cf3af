//! Grid-cell occupancy index used to keep the graph from overlapping itself.

use std::collections::HashMap;

use crate::types::{PointId, Vec3};

/// A quantized grid cell. Positions are normalized by the base unit and
/// rounded to the nearest integer per axis, so two points closer than half
/// a base unit land in the same cell and count as the same logical point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// O(1) map from quantized position to occupant. Owned exclusively by one
/// generation session.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    base_unit: f32,
    cells: HashMap<GridCell, PointId>,
}

impl SpatialIndex {
    pub fn new(base_unit: f32) -> Self {
        Self { base_unit, cells: HashMap::new() }
    }

    pub fn quantize(&self, position: Vec3) -> GridCell {
        GridCell {
            x: (position.x / self.base_unit).round() as i32,
            y: (position.y / self.base_unit).round() as i32,
            z: (position.z / self.base_unit).round() as i32,
        }
    }

    pub fn lookup(&self, position: Vec3) -> Option<PointId> {
        self.cells.get(&self.quantize(position)).copied()
    }

    pub fn register(&mut self, id: PointId, position: Vec3) {
        self.cells.insert(self.quantize(position), id);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_a_registered_cell_through_quantization() {
        let mut index = SpatialIndex::new(15.0);
        index.register(PointId(3), Vec3::new(30.0, 0.0, 45.0));
        // Anything within half a base unit rounds into the same cell.
        assert_eq!(index.lookup(Vec3::new(33.0, 2.0, 41.0)), Some(PointId(3)));
        assert_eq!(index.lookup(Vec3::new(45.0, 0.0, 45.0)), None);
    }

    #[test]
    fn neighboring_cells_do_not_collide() {
        let mut index = SpatialIndex::new(15.0);
        index.register(PointId(0), Vec3::ZERO);
        index.register(PointId(1), Vec3::new(15.0, 0.0, 0.0));
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(Vec3::ZERO), Some(PointId(0)));
        assert_eq!(index.lookup(Vec3::new(15.0, 0.0, 0.0)), Some(PointId(1)));
    }

    #[test]
    fn negative_coordinates_quantize_symmetrically() {
        let index = SpatialIndex::new(15.0);
        assert_eq!(index.quantize(Vec3::new(-15.0, 0.0, -30.0)), GridCell { x: -1, y: 0, z: -2 });
    }
}
