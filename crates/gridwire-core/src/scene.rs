//! One immutable routing snapshot: placement geometry, lattice, obstacles
//! and graph, rebuilt from scratch whenever grid or placement changes.

use crate::config::RoutingConfig;
use crate::geometry::{Point, Rect};
use crate::lattice::{build_axes, GridError, GridSpec, Lattice};
use crate::models::{Block, BlockId, Connection, ConnectionId, PortAnchor, PortRef, Side};
use crate::obstacles::ObstacleMap;
use crate::overlay::FabricOverlay;
use crate::router::{route, RouteOutcome, RoutingGraph};
use crate::validate::{check_route, RouteDefect};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("invalid grid: {0}")]
    InvalidGrid(#[from] GridError),
    #[error("invalid routing config: {0}")]
    InvalidConfig(String),
    #[error("duplicate block id {0}")]
    DuplicateBlock(BlockId),
    #[error("block {id} at ({col}, {row}) does not fit the grid")]
    BlockOutOfGrid { id: BlockId, col: usize, row: usize },
    #[error("connection {connection} references unknown block {block}")]
    UnknownBlock {
        connection: ConnectionId,
        block: BlockId,
    },
    #[error("connection {connection} attaches to label block {block}")]
    PortOnLabel {
        connection: ConnectionId,
        block: BlockId,
    },
}

#[derive(Debug, Clone)]
struct PlacedBlock {
    block: Block,
    rect: Rect,
}

#[derive(Debug, Clone)]
pub struct RoutingScene {
    revision: u64,
    config: RoutingConfig,
    grid: GridSpec,
    blocks: BTreeMap<BlockId, PlacedBlock>,
    obstacles: ObstacleMap,
    lattice: Lattice,
    graph: RoutingGraph,
}

impl RoutingScene {
    /// Builds the snapshot. Every connection's stub coordinates are unioned
    /// into the axis lists, so ports of connections passed here always get a
    /// lattice-aligned stub.
    pub fn build(
        revision: u64,
        grid: GridSpec,
        blocks: &[Block],
        connections: &[Connection],
        config: RoutingConfig,
    ) -> Result<Self, SceneError> {
        grid.validate()?;
        validate_config(&config)?;

        let mut placed = BTreeMap::new();
        for block in blocks {
            let fits = block.col_span > 0
                && block.row_span > 0
                && block.col + block.col_span <= grid.cols
                && block.row + block.row_span <= grid.rows;
            if !fits {
                return Err(SceneError::BlockOutOfGrid {
                    id: block.id.clone(),
                    col: block.col,
                    row: block.row,
                });
            }
            let rect = grid.span_rect(block.col, block.row, block.col_span, block.row_span);
            let entry = PlacedBlock {
                block: block.clone(),
                rect,
            };
            if placed.insert(block.id.clone(), entry).is_some() {
                return Err(SceneError::DuplicateBlock(block.id.clone()));
            }
        }

        let mut hints = Vec::with_capacity(connections.len() * 2);
        for connection in connections {
            for port in [&connection.from, &connection.to] {
                let Some(entry) = placed.get(&port.block) else {
                    return Err(SceneError::UnknownBlock {
                        connection: connection.id.clone(),
                        block: port.block.clone(),
                    });
                };
                if !entry.block.kind.is_obstacle() {
                    return Err(SceneError::PortOnLabel {
                        connection: connection.id.clone(),
                        block: port.block.clone(),
                    });
                }
                hints.push(anchor_on(&entry.rect, port, config.stub_length).stub);
            }
        }

        let rects: Vec<Rect> = placed
            .values()
            .filter(|entry| entry.block.kind.is_obstacle())
            .map(|entry| entry.rect)
            .collect();
        let obstacles = ObstacleMap::from_obstacles(&rects, config.clearance, config.epsilon);
        let axes = build_axes(&grid, &hints, config.epsilon);
        let lattice = Lattice::build(axes, &obstacles);
        let graph = RoutingGraph::build(&lattice, &obstacles);

        tracing::debug!(
            revision,
            blocks = placed.len(),
            obstacles = rects.len(),
            xs = lattice.xs().len(),
            ys = lattice.ys().len(),
            nodes = lattice.len(),
            edges = graph.edge_count() / 2,
            "routing scene built"
        );

        Ok(Self {
            revision,
            config,
            grid,
            blocks: placed,
            obstacles,
            lattice,
            graph,
        })
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn eps(&self) -> f64 {
        self.config.epsilon
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn obstacles(&self) -> &ObstacleMap {
        &self.obstacles
    }

    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    pub fn block_rect(&self, id: &BlockId) -> Option<Rect> {
        self.blocks.get(id).map(|entry| entry.rect)
    }

    /// Exact port position and stub for the current placement. `None` for
    /// unknown and label blocks.
    pub fn port_anchor(&self, port: &PortRef) -> Option<PortAnchor> {
        let entry = self.blocks.get(&port.block)?;
        if !entry.block.kind.is_obstacle() {
            return None;
        }
        Some(anchor_on(&entry.rect, port, self.config.stub_length))
    }

    pub fn route(&self, start: Point, end: Point) -> RouteOutcome {
        route(&self.lattice, &self.graph, start, end)
    }

    pub fn check_route(&self, points: &[Point]) -> Result<(), RouteDefect> {
        check_route(points, &self.lattice, &self.obstacles)
    }

    pub fn overlay(&self) -> FabricOverlay {
        FabricOverlay::build(&self.lattice, &self.graph)
    }
}

fn validate_config(config: &RoutingConfig) -> Result<(), SceneError> {
    if !config.epsilon.is_finite() || config.epsilon < 0.0 {
        return Err(SceneError::InvalidConfig(format!(
            "epsilon must be non-negative, got {}",
            config.epsilon
        )));
    }
    if !config.clearance.is_finite() || config.clearance < 0.0 {
        return Err(SceneError::InvalidConfig(format!(
            "clearance must be non-negative, got {}",
            config.clearance
        )));
    }
    // The stub must end outside its own block's clearance envelope.
    if !config.stub_length.is_finite() || config.stub_length <= config.clearance + config.epsilon {
        return Err(SceneError::InvalidConfig(format!(
            "stub length {} must exceed clearance {} plus epsilon {}",
            config.stub_length, config.clearance, config.epsilon
        )));
    }
    Ok(())
}

fn anchor_on(rect: &Rect, port: &PortRef, stub_length: f64) -> PortAnchor {
    let f = port.fraction();
    let position = match port.side {
        Side::Left => Point::new(rect.left, rect.top + f * rect.height),
        Side::Right => Point::new(rect.right(), rect.top + f * rect.height),
        Side::Top => Point::new(rect.left + f * rect.width, rect.top),
        Side::Bottom => Point::new(rect.left + f * rect.width, rect.bottom()),
    };
    let (fx, fy) = port.side.facing();
    PortAnchor {
        position,
        stub: Point::new(position.x + fx * stub_length, position.y + fy * stub_length),
        side: port.side,
    }
}
