//! Navigation graph data model and its canonical byte encoding.

use serde::{Deserialize, Serialize};

use crate::types::{PointId, SegmentId, Vec3};

/// A graph vertex. One connection marks a terminus, two a corridor point,
/// three or more a junction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub position: Vec3,
    /// Neighboring point ids in connection order, recorded symmetrically.
    pub connections: Vec<PointId>,
}

/// An undirected graph edge. Created once, never mutated or deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub from: PointId,
    pub to: PointId,
}

/// The exportable point/segment record. Point ids equal their index in
/// `points`, so reloading a serialized graph never re-derives ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavGraph {
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
    pub start: PointId,
    /// Through-path end points that reached the configured goal.
    pub goals: Vec<PointId>,
}

impl NavGraph {
    /// A graph holding only its start point.
    pub fn new(start_position: Vec3) -> Self {
        let start = PointId(0);
        Self {
            points: vec![Point { id: start, position: start_position, connections: Vec::new() }],
            segments: Vec::new(),
            start,
            goals: Vec::new(),
        }
    }

    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id.0 as usize]
    }

    pub fn position(&self, id: PointId) -> Vec3 {
        self.point(id).position
    }

    pub fn degree(&self, id: PointId) -> usize {
        self.point(id).connections.len()
    }

    /// Id the next created point will receive.
    pub fn next_point_id(&self) -> PointId {
        PointId(self.points.len() as u32)
    }

    pub fn add_point(&mut self, position: Vec3) -> PointId {
        let id = self.next_point_id();
        self.points.push(Point { id, position, connections: Vec::new() });
        id
    }

    pub fn are_connected(&self, a: PointId, b: PointId) -> bool {
        self.point(a).connections.contains(&b)
    }

    /// Record an undirected segment between two existing points. Returns
    /// `None` for self-loops and for pairs that are already connected, so a
    /// duplicate segment can never exist between the same unordered pair.
    pub fn connect(&mut self, a: PointId, b: PointId) -> Option<SegmentId> {
        if a == b || self.are_connected(a, b) {
            return None;
        }
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(Segment { id, from: a, to: b });
        self.points[a.0 as usize].connections.push(b);
        self.points[b.0 as usize].connections.push(a);
        Some(id)
    }

    /// Points with exactly two connections, excluding the start point.
    /// These are the only legal loop branch points.
    pub fn corridor_points(&self) -> Vec<PointId> {
        self.points
            .iter()
            .filter(|point| point.connections.len() == 2 && point.id != self.start)
            .map(|point| point.id)
            .collect()
    }

    /// Stable little-endian encoding used for determinism fingerprints.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.points.len() as u32).to_le_bytes());
        for point in &self.points {
            bytes.extend(point.position.x.to_le_bytes());
            bytes.extend(point.position.y.to_le_bytes());
            bytes.extend(point.position.z.to_le_bytes());
            bytes.extend((point.connections.len() as u32).to_le_bytes());
            for connection in &point.connections {
                bytes.extend(connection.0.to_le_bytes());
            }
        }
        bytes.extend((self.segments.len() as u32).to_le_bytes());
        for segment in &self.segments {
            bytes.extend(segment.from.0.to_le_bytes());
            bytes.extend(segment.to.0.to_le_bytes());
        }
        bytes.extend(self.start.0.to_le_bytes());
        bytes.extend((self.goals.len() as u32).to_le_bytes());
        for goal in &self.goals {
            bytes.extend(goal.0.to_le_bytes());
        }
        bytes
    }
}
