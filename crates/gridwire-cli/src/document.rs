//! JSON board document: the caller-side owner of placement and committed
//! route overrides.

use crate::config::CliConfig;
use gridwire_core::{
    Block, BlockId, Connection, ConnectionId, GridSpec, RouteOverride, RouteOverrideSink,
    RoutingConfig, RoutingScene, SceneError,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Bumped on every placement change; edit sessions started on an older
    /// revision are refused.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub config: RoutingConfig,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let json = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Routing snapshot for the current revision with `overrides` applied on
    /// top of the document's own grid and config.
    pub fn scene(&self, overrides: &CliConfig) -> Result<RoutingScene, SceneError> {
        let mut grid = self.grid.clone();
        let mut config = self.config.clone();
        overrides.apply(&mut grid, &mut config);
        RoutingScene::build(self.revision, grid, &self.blocks, &self.connections, config)
    }

    pub fn connection(&self, id: &ConnectionId) -> Result<&Connection, DocumentError> {
        self.connections
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| DocumentError::UnknownConnection(id.clone()))
    }

    /// Moves a block to another tile. Stored overrides are kept; the
    /// resolution layer discards the ones that no longer validate.
    pub fn move_block(&mut self, id: &BlockId, col: usize, row: usize) -> Result<(), DocumentError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| DocumentError::UnknownBlock(id.clone()))?;
        block.col = col;
        block.row = row;
        self.revision += 1;
        Ok(())
    }

    /// Drops a stored override so the connection routes fresh again.
    pub fn clear_override(&mut self, id: &ConnectionId) -> Result<bool, DocumentError> {
        let connection = self
            .connections
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| DocumentError::UnknownConnection(id.clone()))?;
        Ok(connection.route_override.take().is_some())
    }
}

impl RouteOverrideSink for Document {
    fn submit_route_override(&mut self, connection: &ConnectionId, route: RouteOverride) {
        match self.connections.iter_mut().find(|c| &c.id == connection) {
            Some(target) => {
                tracing::info!(connection = %connection, midpoints = route.midpoints.len(), "route override stored");
                target.route_override = Some(route);
            }
            None => tracing::warn!(connection = %connection, "override for unknown connection dropped"),
        }
    }
}
