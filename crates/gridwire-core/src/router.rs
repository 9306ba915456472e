//! Deterministic A* over the lattice's nearest-neighbour graph.

use crate::geometry::{collapse_collinear, Point, Polyline};
use crate::lattice::{Direction, Lattice, NodeId};
use crate::obstacles::ObstacleMap;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Per node, the nearest neighbour in each direction whose connecting
/// segment is obstacle-clear. Indexed by [`Direction::slot`].
#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    adjacency: Vec<[Option<NodeId>; 4]>,
}

impl RoutingGraph {
    pub fn build(lattice: &Lattice, obstacles: &ObstacleMap) -> Self {
        let mut adjacency = vec![[None; 4]; lattice.len()];
        for (idx, node) in lattice.nodes().iter().enumerate() {
            let Some(id) = lattice.locate(node.point) else {
                continue;
            };
            debug_assert_eq!(id.index(), idx);
            for dir in Direction::ALL {
                let Some(next) = lattice.nearest_neighbor(id, dir) else {
                    continue;
                };
                if obstacles.blocks_segment(node.point, lattice.point(next)) {
                    continue;
                }
                adjacency[idx][dir.slot()] = Some(next);
            }
        }
        Self { adjacency }
    }

    pub fn neighbor(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        self.adjacency
            .get(id.index())
            .and_then(|slots| slots[dir.slot()])
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(id.index())
            .into_iter()
            .flat_map(|slots| slots.iter().flatten().copied())
    }

    /// Directed edge count (each undirected edge counts twice).
    pub fn edge_count(&self) -> usize {
        self.adjacency
            .iter()
            .map(|slots| slots.iter().flatten().count())
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Found,
    /// The search exhausted the queue; the path is the direct fallback.
    Unreachable,
    /// An endpoint is not a lattice node; the path is the direct fallback.
    OffLattice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOutcome {
    pub path: Polyline,
    pub status: RouteStatus,
    pub nodes_expanded: usize,
}

impl RouteOutcome {
    pub fn is_found(&self) -> bool {
        self.status == RouteStatus::Found
    }

    fn direct(start: Point, end: Point, status: RouteStatus, nodes_expanded: usize) -> Self {
        Self {
            path: vec![start, end],
            status,
            nodes_expanded,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f_score: FloatOrd,
    g_score: FloatOrd,
    id: NodeId,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.g_score.cmp(&other.g_score))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Shortest Manhattan path from `start` to `end`.
///
/// Both endpoints must match a lattice node within the lattice epsilon.
/// Otherwise, or when no path exists, the result is the direct segment
/// `[start, end]` with a non-`Found` status. The returned path starts and
/// ends at the exact input points; every interior point is a lattice node.
pub fn route(lattice: &Lattice, graph: &RoutingGraph, start: Point, end: Point) -> RouteOutcome {
    let (Some(source), Some(target)) = (lattice.locate(start), lattice.locate(end)) else {
        tracing::debug!(?start, ?end, "route endpoint off lattice, using direct segment");
        return RouteOutcome::direct(start, end, RouteStatus::OffLattice, 0);
    };
    if source == target {
        return RouteOutcome {
            path: vec![start],
            status: RouteStatus::Found,
            nodes_expanded: 0,
        };
    }

    let goal = lattice.point(target);
    let node_count = lattice.len();
    let mut g_score = vec![f64::INFINITY; node_count];
    let mut came_from: Vec<Option<NodeId>> = vec![None; node_count];
    let mut closed = vec![false; node_count];
    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();

    g_score[source.index()] = 0.0;
    open_set.push(Reverse(OpenNode {
        f_score: FloatOrd(lattice.point(source).manhattan(goal)),
        g_score: FloatOrd(0.0),
        id: source,
    }));

    let mut nodes_expanded = 0usize;
    let mut reached = false;
    while let Some(Reverse(current)) = open_set.pop() {
        let idx = current.id.index();
        if closed[idx] || current.g_score.0 > g_score[idx] {
            continue;
        }
        closed[idx] = true;
        nodes_expanded += 1;
        if current.id == target {
            reached = true;
            break;
        }

        let here = lattice.point(current.id);
        for next in graph.neighbors(current.id) {
            if closed[next.index()] {
                continue;
            }
            let there = lattice.point(next);
            let tentative_g = g_score[idx] + here.manhattan(there);
            if tentative_g < g_score[next.index()] {
                g_score[next.index()] = tentative_g;
                came_from[next.index()] = Some(current.id);
                open_set.push(Reverse(OpenNode {
                    f_score: FloatOrd(tentative_g + there.manhattan(goal)),
                    g_score: FloatOrd(tentative_g),
                    id: next,
                }));
            }
        }
    }

    if !reached {
        tracing::debug!(?start, ?end, nodes_expanded, "no lattice path, using direct segment");
        return RouteOutcome::direct(start, end, RouteStatus::Unreachable, nodes_expanded);
    }

    let mut path = Vec::new();
    let mut cursor = Some(target);
    while let Some(id) = cursor {
        path.push(lattice.point(id));
        cursor = came_from[id.index()];
    }
    path.reverse();
    if let Some(first) = path.first_mut() {
        *first = start;
    }
    if let Some(last) = path.last_mut() {
        *last = end;
    }

    tracing::trace!(nodes_expanded, points = path.len(), "lattice path found");
    RouteOutcome {
        path: collapse_collinear(&path, lattice.eps()),
        status: RouteStatus::Found,
        nodes_expanded,
    }
}
