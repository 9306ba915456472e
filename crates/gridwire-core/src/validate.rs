//! Full route validation against the current lattice and obstacles.

use crate::geometry::{orientation, Point};
use crate::lattice::Lattice;
use crate::obstacles::ObstacleMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteDefect {
    #[error("route needs at least two points, got {0}")]
    TooShort(usize),
    #[error("segment {segment} is not axis-aligned")]
    NotRectilinear { segment: usize },
    #[error("waypoint {index} at ({x}, {y}) is not a lattice node")]
    OffLattice { index: usize, x: f64, y: f64 },
    #[error("segment {segment} crosses obstacle {obstacle}")]
    Blocked { segment: usize, obstacle: usize },
}

/// Checks a port-to-port polyline:
/// - every consecutive pair differs in exactly one axis
/// - every interior point is a lattice node (the two ends may be off-lattice)
/// - no segment enters an expanded obstacle, except that the first and last
///   segment may cross the clearance band of their own block when they head
///   straight out through the side the port is on
pub fn check_route(
    points: &[Point],
    lattice: &Lattice,
    obstacles: &ObstacleMap,
) -> Result<(), RouteDefect> {
    if points.len() < 2 {
        return Err(RouteDefect::TooShort(points.len()));
    }
    let eps = lattice.eps();
    let last_segment = points.len() - 2;

    for (segment, pair) in points.windows(2).enumerate() {
        if orientation(pair[0], pair[1], eps).is_none() {
            return Err(RouteDefect::NotRectilinear { segment });
        }
    }

    for (offset, p) in points[1..points.len() - 1].iter().enumerate() {
        if !lattice.contains_point(*p) {
            return Err(RouteDefect::OffLattice {
                index: offset + 1,
                x: p.x,
                y: p.y,
            });
        }
    }

    let first = points[0];
    let last = points[points.len() - 1];
    for (segment, pair) in points.windows(2).enumerate() {
        let anchors: &[Point] = match (segment == 0, segment == last_segment) {
            (true, true) => &[first, last],
            (true, false) => &[first],
            (false, true) => &[last],
            (false, false) => &[],
        };
        if let Some(obstacle) = obstacles.first_blocking(pair[0], pair[1], anchors) {
            return Err(RouteDefect::Blocked { segment, obstacle });
        }
    }
    Ok(())
}

pub fn is_valid_route(points: &[Point], lattice: &Lattice, obstacles: &ObstacleMap) -> bool {
    check_route(points, lattice, obstacles).is_ok()
}
