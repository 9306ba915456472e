//! Clearance-expanded obstacle model.

use crate::geometry::{Point, Rect};

/// Grows every obstacle symmetrically by `clearance` on all four sides.
pub fn expand_obstacles(obstacles: &[Rect], clearance: f64) -> Vec<Rect> {
    obstacles.iter().map(|rect| rect.expanded(clearance)).collect()
}

/// Expanded obstacles plus the tolerance every interior test uses.
#[derive(Debug, Clone, Default)]
pub struct ObstacleMap {
    rects: Vec<Rect>,
    clearance: f64,
    eps: f64,
}

impl ObstacleMap {
    /// Wraps rectangles that are already clearance-expanded.
    pub fn new(expanded: Vec<Rect>, clearance: f64, eps: f64) -> Self {
        Self {
            rects: expanded,
            clearance,
            eps,
        }
    }

    pub fn from_obstacles(obstacles: &[Rect], clearance: f64, eps: f64) -> Self {
        Self::new(expand_obstacles(obstacles, clearance), clearance, eps)
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn clearance(&self) -> f64 {
        self.clearance
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn blocks_point(&self, p: Point) -> bool {
        self.rects.iter().any(|rect| rect.contains_interior(p, self.eps))
    }

    pub fn blocks_segment(&self, a: Point, b: Point) -> bool {
        self.first_blocking(a, b, &[]).is_some()
    }

    /// Like [`ObstacleMap::blocks_segment`], but lets a port leg leave its own
    /// block. See [`ObstacleMap::first_blocking`].
    pub fn blocks_segment_except(&self, a: Point, b: Point, anchor: Point) -> bool {
        self.first_blocking(a, b, &[anchor]).is_some()
    }

    /// Index of the first obstacle the segment enters.
    ///
    /// An anchor that is an endpoint of the segment and sits on the raw
    /// footprint of an obstacle exempts that obstacle, but only when the
    /// segment heads straight out through the side the anchor is on. Any
    /// other leg from a port is tested against the full clearance envelope.
    pub fn first_blocking(&self, a: Point, b: Point, anchors: &[Point]) -> Option<usize> {
        self.rects.iter().position(|rect| {
            let footprint = rect.expanded(-self.clearance);
            let exempt = anchors.iter().any(|&anchor| {
                let other = if anchor.approx_eq(a, self.eps) {
                    b
                } else if anchor.approx_eq(b, self.eps) {
                    a
                } else {
                    return false;
                };
                footprint.leaves_outward(anchor, other, self.eps)
            });
            !exempt && rect.segment_hits_interior(a, b, self.eps)
        })
    }
}
