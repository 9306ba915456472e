//! Document-facing value types consumed and produced by the routing core.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Regular placed tile block
    #[default]
    Compute,
    /// Boundary I/O block
    Io,
    /// Annotation only: no obstacle, no ports
    Label,
}

impl BlockKind {
    pub fn is_obstacle(self) -> bool {
        !matches!(self, BlockKind::Label)
    }
}

/// A block placed on the tile grid, optionally spanning several tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(default)]
    pub kind: BlockKind,
    pub col: usize,
    pub row: usize,
    #[serde(default = "default_span")]
    pub col_span: usize,
    #[serde(default = "default_span")]
    pub row_span: usize,
}

fn default_span() -> usize {
    1
}

impl Block {
    pub fn new(id: impl Into<String>, col: usize, row: usize) -> Self {
        Self {
            id: BlockId::new(id),
            kind: BlockKind::Compute,
            col,
            row,
            col_span: 1,
            row_span: 1,
        }
    }

    pub fn with_span(mut self, col_span: usize, row_span: usize) -> Self {
        self.col_span = col_span;
        self.row_span = row_span;
        self
    }

    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Block side a port is assigned to. The port faces away from the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Unit vector pointing out of the block.
    pub fn facing(self) -> (f64, f64) {
        match self {
            Side::Left => (-1.0, 0.0),
            Side::Right => (1.0, 0.0),
            Side::Top => (0.0, -1.0),
            Side::Bottom => (0.0, 1.0),
        }
    }
}

/// Port assignment: `slot` of `slots` evenly spaced positions along a side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub block: BlockId,
    pub side: Side,
    #[serde(default)]
    pub slot: u32,
    #[serde(default = "default_slots")]
    pub slots: u32,
}

fn default_slots() -> u32 {
    1
}

impl PortRef {
    pub fn new(block: impl Into<String>, side: Side) -> Self {
        Self {
            block: BlockId::new(block),
            side,
            slot: 0,
            slots: 1,
        }
    }

    pub fn with_slot(mut self, slot: u32, slots: u32) -> Self {
        self.slot = slot;
        self.slots = slots;
        self
    }

    /// Position along the side in `(0, 1)`.
    pub fn fraction(&self) -> f64 {
        let slots = self.slots.max(1);
        let slot = self.slot.min(slots - 1);
        (slot as f64 + 1.0) / (slots as f64 + 1.0)
    }
}

/// Exact port geometry for the current placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortAnchor {
    pub position: Point,
    /// End of the fixed-length leg in the facing direction; always a lattice
    /// coordinate pair.
    pub stub: Point,
    pub side: Side,
}

/// User-committed deviation from the computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOverride {
    /// Ordered waypoints between the two port endpoints.
    pub midpoints: Vec<Point>,
    #[serde(default)]
    pub authoritative: bool,
}

impl RouteOverride {
    /// Takes every point of a full port-to-port polyline except its ends.
    pub fn from_polyline(points: &[Point]) -> Self {
        let midpoints = if points.len() > 2 {
            points[1..points.len() - 1].to_vec()
        } else {
            Vec::new()
        };
        Self {
            midpoints,
            authoritative: true,
        }
    }
}

/// A logical connection between two ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: PortRef,
    pub to: PortRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_override: Option<RouteOverride>,
}

impl Connection {
    pub fn new(id: impl Into<String>, from: PortRef, to: PortRef) -> Self {
        Self {
            id: ConnectionId::new(id),
            from,
            to,
            route_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_fraction_spreads_slots_evenly() {
        assert_eq!(PortRef::new("a", Side::Left).fraction(), 0.5);
        let port = PortRef::new("a", Side::Left).with_slot(0, 3);
        assert_eq!(port.fraction(), 0.25);
        assert_eq!(port.with_slot(9, 3).fraction(), 0.75);
    }

    #[test]
    fn override_drops_port_endpoints() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(9.0, 5.0),
        ];
        let route = RouteOverride::from_polyline(&points);
        assert_eq!(route.midpoints, vec![Point::new(5.0, 0.0), Point::new(5.0, 5.0)]);
        assert!(route.authoritative);
    }

    #[test]
    fn connection_json_defaults() {
        let json = r#"{
            "id": "c1",
            "from": {"block": "a", "side": "right"},
            "to": {"block": "b", "side": "left", "slot": 1, "slots": 2}
        }"#;
        let conn: Connection = serde_json::from_str(json).unwrap();
        assert_eq!(conn.from.slots, 1);
        assert_eq!(conn.to.slot, 1);
        assert!(conn.route_override.is_none());

        let block: Block = serde_json::from_str(r#"{"id": "a", "col": 2, "row": 1}"#).unwrap();
        assert_eq!(block.col_span, 1);
        assert_eq!(block.kind, BlockKind::Compute);
    }
}
