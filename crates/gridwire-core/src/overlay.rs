//! Visualization-only graph of every routable lattice edge.

use crate::geometry::Point;
use crate::lattice::{Direction, Lattice};
use crate::router::RoutingGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FabricEdge {
    pub from: Point,
    pub to: Point,
}

/// Static background graph. Rendering reads it; the router never does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FabricOverlay {
    pub nodes: Vec<Point>,
    pub edges: Vec<FabricEdge>,
}

impl FabricOverlay {
    /// Emits each obstacle-clear nearest-neighbour edge once, taking only the
    /// +x and +y direction from every node.
    pub fn build(lattice: &Lattice, graph: &RoutingGraph) -> Self {
        let nodes: Vec<Point> = lattice.nodes().iter().map(|node| node.point).collect();
        let mut edges = Vec::new();
        for node in lattice.nodes() {
            let Some(id) = lattice.node_at(node.ix, node.iy) else {
                continue;
            };
            for dir in [Direction::Right, Direction::Down] {
                if let Some(next) = graph.neighbor(id, dir) {
                    edges.push(FabricEdge {
                        from: node.point,
                        to: lattice.point(next),
                    });
                }
            }
        }
        Self { nodes, edges }
    }
}
