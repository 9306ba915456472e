//! Pre-defined board documents for demos and smoke tests.

use crate::document::Document;
use gridwire_core::{
    orientation, shift_run, Block, Connection, GridSpec, Orientation, Point, PortRef,
    RoutingConfig, RoutingScene, Side,
};

fn tile_id(col: usize, row: usize) -> String {
    format!("t{col}_{row}")
}

/// A block on every tile of `grid`, with connections between opposite
/// corners and across the middle row.
///
/// - diagonal: top-left right side to bottom-right left side
/// - anti: top-right bottom side to bottom-left top side
/// - middle: left end to right end of the middle row
pub fn full_grid(grid: GridSpec) -> Document {
    let (last_col, last_row) = (grid.cols.saturating_sub(1), grid.rows.saturating_sub(1));
    let mid_row = grid.rows / 2;

    let mut blocks = Vec::with_capacity(grid.cols * grid.rows);
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            blocks.push(Block::new(tile_id(col, row), col, row));
        }
    }

    let connections = vec![
        Connection::new(
            "diagonal",
            PortRef::new(tile_id(0, 0), Side::Right),
            PortRef::new(tile_id(last_col, last_row), Side::Left),
        ),
        Connection::new(
            "anti",
            PortRef::new(tile_id(last_col, 0), Side::Bottom),
            PortRef::new(tile_id(0, last_row), Side::Top),
        ),
        Connection::new(
            "middle",
            PortRef::new(tile_id(0, mid_row), Side::Right).with_slot(0, 2),
            PortRef::new(tile_id(last_col, mid_row), Side::Left).with_slot(1, 2),
        ),
    ];

    Document {
        revision: 0,
        grid,
        config: RoutingConfig::default(),
        blocks,
        connections,
    }
}

/// First segment of `points` and pointer position that give an accepted
/// lane shift, trying every lattice lane across each segment in order.
pub fn find_lane_shift(scene: &RoutingScene, points: &[Point]) -> Option<(usize, Point)> {
    let eps = scene.eps();
    for segment in 0..points.len().saturating_sub(1) {
        let (a, b) = (points[segment], points[segment + 1]);
        let Some(orient) = orientation(a, b, eps) else {
            continue;
        };
        let lanes = match orient {
            Orientation::Horizontal => scene.lattice().ys(),
            Orientation::Vertical => scene.lattice().xs(),
        };
        let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        for &lane in lanes {
            let pointer = orient.with_fixed(mid, lane);
            if shift_run(scene, points, segment, pointer).ok {
                return Some((segment, pointer));
            }
        }
    }
    None
}
