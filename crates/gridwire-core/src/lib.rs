//! Grid-constrained orthogonal wire routing.
//!
//! A [`RoutingScene`] snapshots block placement into a lattice of routable
//! nodes. Routes are resolved per connection from a live edit preview, a
//! persisted override, or a fresh A* search, and can be edited by shifting a
//! straight run onto a parallel lane.

pub mod config;
pub mod editor;
pub mod geometry;
pub mod lattice;
pub mod models;
pub mod obstacles;
pub mod overlay;
pub mod resolve;
pub mod router;
pub mod scene;
pub mod validate;

pub use config::RoutingConfig;
pub use editor::{
    pick_segment, shift_run, EditError, EditResult, EditSession, EditStatus, RouteOverrideSink,
    RunBounds,
};
pub use geometry::{
    collapse_collinear, dedupe_points, orientation, polyline_length, simplify, Orientation, Point,
    Polyline, Rect,
};
pub use lattice::{
    build_axes, AxisLists, Direction, GridError, GridSpec, Lattice, LatticeNode, NodeId,
};
pub use models::{
    Block, BlockId, BlockKind, Connection, ConnectionId, PortAnchor, PortRef, RouteOverride, Side,
};
pub use obstacles::{expand_obstacles, ObstacleMap};
pub use overlay::{FabricEdge, FabricOverlay};
pub use resolve::{fresh_route, resolve_all, resolve_route, stitch_override, ResolvedRoute, RouteSource};
pub use router::{route, RouteOutcome, RouteStatus, RoutingGraph};
pub use scene::{RoutingScene, SceneError};
pub use validate::{check_route, is_valid_route, RouteDefect};
