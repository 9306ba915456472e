//! Lattice builder: candidate axis lines and the sparse set of routable nodes.
//!
//! [`Lattice::build`] is the only place that decides which intersections are
//! routable. The router, the overlay and the resolution layer all consume the
//! lattice stored on a [`crate::scene::RoutingScene`] rather than rebuilding
//! their own.

use crate::geometry::{Orientation, Point, Rect};
use crate::obstacles::ObstacleMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid has no tiles")]
    Empty,
    #[error("tile size must be positive, got {0}")]
    TileSize(f64),
    #[error("pitch {pitch} is smaller than tile size {tile_size}")]
    Pitch { pitch: f64, tile_size: f64 },
    #[error("margin must be non-negative, got {0}")]
    Margin(f64),
}

/// Tile grid geometry as laid out on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub cols: usize,
    pub rows: usize,
    /// Distance between the top-left corners of adjacent tiles.
    pub pitch: f64,
    pub tile_size: f64,
    /// Empty border around the tile area.
    pub margin: f64,
    /// Number of evenly spaced routing lanes inside every gap.
    pub lane_tracks: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cols: 8,
            rows: 6,
            pitch: 156.0,
            tile_size: 70.0,
            margin: 40.0,
            lane_tracks: 3,
        }
    }
}

impl GridSpec {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(GridError::Empty);
        }
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(GridError::TileSize(self.tile_size));
        }
        if !self.pitch.is_finite() || self.pitch < self.tile_size {
            return Err(GridError::Pitch {
                pitch: self.pitch,
                tile_size: self.tile_size,
            });
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(GridError::Margin(self.margin));
        }
        Ok(())
    }

    pub fn tile_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            self.margin + col as f64 * self.pitch,
            self.margin + row as f64 * self.pitch,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Footprint covering `col_span` x `row_span` tiles from `(col, row)`,
    /// including the gaps between them.
    pub fn span_rect(&self, col: usize, row: usize, col_span: usize, row_span: usize) -> Rect {
        let first = self.tile_rect(col, row);
        let extra_cols = col_span.saturating_sub(1) as f64;
        let extra_rows = row_span.saturating_sub(1) as f64;
        Rect::new(
            first.left,
            first.top,
            self.tile_size + extra_cols * self.pitch,
            self.tile_size + extra_rows * self.pitch,
        )
    }

    fn band_coordinates(&self, count: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(count * (3 + self.lane_tracks) + 2 * self.lane_tracks);
        let tracks = self.lane_tracks;
        let push_lanes = |out: &mut Vec<f64>, start: f64, end: f64| {
            let span = end - start;
            if span <= 0.0 {
                return;
            }
            for k in 1..=tracks {
                out.push(start + span * k as f64 / (tracks + 1) as f64);
            }
        };

        for i in 0..count {
            let lo = self.margin + i as f64 * self.pitch;
            out.push(lo);
            out.push(lo + self.tile_size / 2.0);
            out.push(lo + self.tile_size);
            if i + 1 < count {
                push_lanes(&mut out, lo + self.tile_size, lo + self.pitch);
            }
        }

        if self.margin > 0.0 && count > 0 {
            let last_hi = self.margin + (count - 1) as f64 * self.pitch + self.tile_size;
            push_lanes(&mut out, 0.0, self.margin);
            push_lanes(&mut out, last_hi, last_hi + self.margin);
        }
        out
    }
}

/// Sorted, deduplicated candidate coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisLists {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

/// Collects tile edges, midpoints and gap lanes per band, then unions in the
/// exact coordinates of every hint so stubs always sit on a lane.
pub fn build_axes(grid: &GridSpec, hints: &[Point], eps: f64) -> AxisLists {
    let mut xs: Vec<(f64, bool)> = grid
        .band_coordinates(grid.cols)
        .into_iter()
        .map(|x| (x, false))
        .collect();
    let mut ys: Vec<(f64, bool)> = grid
        .band_coordinates(grid.rows)
        .into_iter()
        .map(|y| (y, false))
        .collect();
    for hint in hints {
        xs.push((hint.x, true));
        ys.push((hint.y, true));
    }
    AxisLists {
        xs: sort_dedupe(xs, eps),
        ys: sort_dedupe(ys, eps),
    }
}

// Values within `eps` of the last kept value merge into it. A hint replaces a
// generated value it merges with, so hinted coordinates survive exactly. Two
// hints within `eps` of each other share the lower one; the other stub then
// sits up to `eps` off its lane, which `Lattice::locate` still matches.
fn sort_dedupe(mut values: Vec<(f64, bool)>, eps: f64) -> Vec<f64> {
    values.retain(|(v, _)| v.is_finite());
    values.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(&a.1)));
    let mut out: Vec<(f64, bool)> = Vec::with_capacity(values.len());
    for (value, hinted) in values {
        match out.last_mut() {
            Some(last) if (value - last.0).abs() <= eps => {
                if hinted && !last.1 {
                    *last = (value, true);
                }
            }
            _ => out.push((value, hinted)),
        }
    }
    out.into_iter().map(|(v, _)| v).collect()
}

/// Opaque arena index of a lattice node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    pub fn slot(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Left => 1,
            Direction::Down => 2,
            Direction::Up => 3,
        }
    }

    fn step(self) -> (isize, isize) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeNode {
    pub ix: usize,
    pub iy: usize,
    pub point: Point,
}

const NO_NODE: u32 = u32::MAX;

/// Routable coordinate system for one routing session. Never mutated after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct Lattice {
    xs: Vec<f64>,
    ys: Vec<f64>,
    nodes: Vec<LatticeNode>,
    // Row-major (iy * xs.len() + ix) cell to node index.
    cells: Vec<u32>,
    eps: f64,
}

impl Lattice {
    /// Includes `(x, y)` iff it is not strictly inside an expanded obstacle.
    pub fn build(axes: AxisLists, obstacles: &ObstacleMap) -> Self {
        let AxisLists { xs, ys } = axes;
        let mut cells = vec![NO_NODE; xs.len() * ys.len()];
        let mut nodes = Vec::new();
        for (iy, &y) in ys.iter().enumerate() {
            for (ix, &x) in xs.iter().enumerate() {
                let point = Point::new(x, y);
                if obstacles.blocks_point(point) {
                    continue;
                }
                cells[iy * xs.len() + ix] = nodes.len() as u32;
                nodes.push(LatticeNode { ix, iy, point });
            }
        }
        Self {
            xs,
            ys,
            nodes,
            cells,
            eps: obstacles.eps(),
        }
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn nodes(&self) -> &[LatticeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &LatticeNode {
        &self.nodes[id.index()]
    }

    pub fn point(&self, id: NodeId) -> Point {
        self.nodes[id.index()].point
    }

    pub fn node_at(&self, ix: usize, iy: usize) -> Option<NodeId> {
        if ix >= self.xs.len() || iy >= self.ys.len() {
            return None;
        }
        match self.cells[iy * self.xs.len() + ix] {
            NO_NODE => None,
            idx => Some(NodeId(idx)),
        }
    }

    /// Finds the node whose axis pair matches `p` within eps.
    pub fn locate(&self, p: Point) -> Option<NodeId> {
        let ix = axis_index(&self.xs, p.x, self.eps)?;
        let iy = axis_index(&self.ys, p.y, self.eps)?;
        self.node_at(ix, iy)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.locate(p).is_some()
    }

    /// The first node met scanning outward from `id` in `dir`.
    pub fn nearest_neighbor(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        let node = self.node(id);
        let (dx, dy) = dir.step();
        let mut ix = node.ix as isize;
        let mut iy = node.iy as isize;
        loop {
            ix += dx;
            iy += dy;
            if ix < 0 || iy < 0 {
                return None;
            }
            let (ux, uy) = (ix as usize, iy as usize);
            if ux >= self.xs.len() || uy >= self.ys.len() {
                return None;
            }
            if let Some(found) = self.node_at(ux, uy) {
                return Some(found);
            }
        }
    }

    /// Nearest lane a run of `orientation` can be moved onto, given the
    /// pointer coordinate across the run. Ties go to the lower lane.
    pub fn snap_lane(&self, orientation: Orientation, pointer: Point) -> Option<f64> {
        match orientation {
            Orientation::Horizontal => nearest_value(&self.ys, pointer.y),
            Orientation::Vertical => nearest_value(&self.xs, pointer.x),
        }
    }
}

fn axis_index(values: &[f64], target: f64, eps: f64) -> Option<usize> {
    let idx = values.partition_point(|&v| v < target);
    let mut best: Option<(usize, f64)> = None;
    for candidate in [idx.checked_sub(1), Some(idx)].into_iter().flatten() {
        let Some(&value) = values.get(candidate) else {
            continue;
        };
        let dist = (value - target).abs();
        if dist <= eps && best.map_or(true, |(_, d)| dist < d) {
            best = Some((candidate, dist));
        }
    }
    best.map(|(idx, _)| idx)
}

fn nearest_value(values: &[f64], target: f64) -> Option<f64> {
    let idx = values.partition_point(|&v| v < target);
    let below = idx.checked_sub(1).and_then(|i| values.get(i)).copied();
    let above = values.get(idx).copied();
    match (below, above) {
        (Some(lo), Some(hi)) => {
            if (target - lo).abs() <= (hi - target).abs() {
                Some(lo)
            } else {
                Some(hi)
            }
        }
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}
