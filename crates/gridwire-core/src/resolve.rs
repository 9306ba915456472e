//! Per-connection route resolution: live preview, persisted override, or a
//! freshly computed route.

use crate::editor::EditSession;
use crate::geometry::{simplify, Point, Polyline};
use crate::models::{Connection, ConnectionId, PortAnchor, RouteOverride};
use crate::router::RouteStatus;
use crate::scene::RoutingScene;
use serde::{Deserialize, Serialize};

/// Which branch produced a resolved polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteSource {
    /// In-progress drag; `valid` is false for a rejected preview
    LivePreview { valid: bool },
    /// Persisted override that still validates against the current scene
    Override,
    /// Port, stub, lattice route, stub, port
    Computed { status: RouteStatus },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub connection: ConnectionId,
    pub points: Polyline,
    pub source: RouteSource,
}

/// `port + midpoints + port`, simplified.
pub fn stitch_override(
    from: &PortAnchor,
    to: &PortAnchor,
    route: &RouteOverride,
    eps: f64,
) -> Polyline {
    let mut points = Vec::with_capacity(route.midpoints.len() + 2);
    points.push(from.position);
    points.extend_from_slice(&route.midpoints);
    points.push(to.position);
    simplify(&points, eps)
}

/// Default route: port, stub, lattice route between the stubs, stub, port.
pub fn fresh_route(scene: &RoutingScene, from: &PortAnchor, to: &PortAnchor) -> (Polyline, RouteStatus) {
    let outcome = scene.route(from.stub, to.stub);
    let mut points = Vec::with_capacity(outcome.path.len() + 2);
    points.push(from.position);
    points.extend_from_slice(&outcome.path);
    points.push(to.position);
    (simplify(&points, scene.eps()), outcome.status)
}

/// Picks the polyline to render for `connection`.
///
/// Returns `None` only when a port cannot be anchored in this scene (unknown
/// or label block).
pub fn resolve_route(
    scene: &RoutingScene,
    connection: &Connection,
    preview: Option<&[Point]>,
) -> Option<ResolvedRoute> {
    let eps = scene.eps();
    let (Some(from), Some(to)) = (
        scene.port_anchor(&connection.from),
        scene.port_anchor(&connection.to),
    ) else {
        tracing::warn!(connection = %connection.id, "connection port has no anchor in scene");
        return None;
    };

    if let Some(preview) = preview.filter(|points| points.len() >= 2) {
        let mut points = preview.to_vec();
        let last = points.len() - 1;
        points[0] = from.position;
        points[last] = to.position;
        let points = simplify(&points, eps);
        let valid = scene.check_route(&points).is_ok();
        return Some(ResolvedRoute {
            connection: connection.id.clone(),
            points,
            source: RouteSource::LivePreview { valid },
        });
    }

    if let Some(route) = connection.route_override.as_ref().filter(|r| r.authoritative) {
        let points = stitch_override(&from, &to, route, eps);
        match scene.check_route(&points) {
            Ok(()) => {
                return Some(ResolvedRoute {
                    connection: connection.id.clone(),
                    points,
                    source: RouteSource::Override,
                });
            }
            Err(defect) => {
                tracing::debug!(connection = %connection.id, %defect, "stale route override discarded");
            }
        }
    }

    let (points, status) = fresh_route(scene, &from, &to);
    Some(ResolvedRoute {
        connection: connection.id.clone(),
        points,
        source: RouteSource::Computed { status },
    })
}

/// Resolves every connection independently. The session's preview, if any,
/// applies to the connection it was started on.
pub fn resolve_all(
    scene: &RoutingScene,
    connections: &[Connection],
    session: Option<&EditSession>,
) -> Vec<ResolvedRoute> {
    connections
        .iter()
        .filter_map(|connection| {
            let preview = session
                .filter(|session| session.connection() == &connection.id)
                .and_then(|session| session.preview());
            resolve_route(scene, connection, preview)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::lattice::GridSpec;
    use crate::models::{Block, PortRef, Side};

    fn row_scene(from: Side, to: Side) -> (RoutingScene, Connection) {
        let grid = GridSpec {
            cols: 3,
            rows: 1,
            ..GridSpec::default()
        };
        let blocks = [Block::new("a", 0, 0), Block::new("mid", 1, 0), Block::new("b", 2, 0)];
        let conn = Connection::new("c", PortRef::new("a", from), PortRef::new("b", to));
        let scene =
            RoutingScene::build(3, grid, &blocks, &[conn.clone()], RoutingConfig::default()).unwrap();
        (scene, conn)
    }

    fn fixture() -> (RoutingScene, Connection) {
        row_scene(Side::Bottom, Side::Bottom)
    }

    #[test]
    fn fresh_route_runs_under_the_middle_block() {
        let (scene, conn) = fixture();
        let resolved = resolve_route(&scene, &conn, None).unwrap();
        assert_eq!(
            resolved.source,
            RouteSource::Computed {
                status: RouteStatus::Found
            }
        );
        assert_eq!(
            resolved.points,
            vec![
                Point::new(75.0, 110.0),
                Point::new(75.0, 120.0),
                Point::new(387.0, 120.0),
                Point::new(387.0, 110.0),
            ]
        );
        assert!(scene.check_route(&resolved.points).is_ok());
    }

    #[test]
    fn valid_override_wins_over_fresh_route() {
        let (scene, mut conn) = fixture();
        conn.route_override = Some(RouteOverride {
            midpoints: vec![Point::new(75.0, 130.0), Point::new(387.0, 130.0)],
            authoritative: true,
        });
        let resolved = resolve_route(&scene, &conn, None).unwrap();
        assert_eq!(resolved.source, RouteSource::Override);
        assert_eq!(resolved.points[1], Point::new(75.0, 130.0));
    }

    #[test]
    fn stale_override_falls_back_to_fresh_route() {
        let (scene, mut conn) = fixture();
        // Straight through the middle block.
        conn.route_override = Some(RouteOverride {
            midpoints: vec![Point::new(75.0, 120.0), Point::new(75.0, 75.0), Point::new(387.0, 75.0)],
            authoritative: true,
        });
        let resolved = resolve_route(&scene, &conn, None).unwrap();
        assert!(matches!(resolved.source, RouteSource::Computed { .. }));
    }

    #[test]
    fn override_hugging_the_port_blocks_falls_back() {
        let (scene, mut conn) = row_scene(Side::Right, Side::Left);
        // Leaves each side port sideways, down the block edge inside its
        // clearance band.
        conn.route_override = Some(RouteOverride {
            midpoints: vec![Point::new(110.0, 130.0), Point::new(352.0, 130.0)],
            authoritative: true,
        });
        let resolved = resolve_route(&scene, &conn, None).unwrap();
        assert_eq!(
            resolved.source,
            RouteSource::Computed {
                status: RouteStatus::Found
            }
        );
        assert_eq!(resolved.points.first(), Some(&Point::new(110.0, 75.0)));
        assert_eq!(resolved.points.last(), Some(&Point::new(352.0, 75.0)));
        assert!(scene.check_route(&resolved.points).is_ok());
    }

    #[test]
    fn non_authoritative_override_is_ignored() {
        let (scene, mut conn) = fixture();
        conn.route_override = Some(RouteOverride {
            midpoints: vec![Point::new(75.0, 130.0), Point::new(387.0, 130.0)],
            authoritative: false,
        });
        let resolved = resolve_route(&scene, &conn, None).unwrap();
        assert!(matches!(resolved.source, RouteSource::Computed { .. }));
    }

    #[test]
    fn preview_endpoints_snap_to_ports() {
        let (scene, conn) = fixture();
        let drifted = [
            Point::new(70.0, 113.0),
            Point::new(75.0, 130.0),
            Point::new(387.0, 130.0),
            Point::new(390.0, 111.0),
        ];
        let resolved = resolve_route(&scene, &conn, Some(&drifted)).unwrap();
        assert_eq!(resolved.points.first(), Some(&Point::new(75.0, 110.0)));
        assert_eq!(resolved.points.last(), Some(&Point::new(387.0, 110.0)));
        assert_eq!(resolved.source, RouteSource::LivePreview { valid: true });
    }

    #[test]
    fn diagonal_preview_is_reported_invalid() {
        let (scene, conn) = fixture();
        let dragged = [
            Point::new(75.0, 110.0),
            Point::new(75.0, 130.0),
            Point::new(200.0, 140.0),
            Point::new(387.0, 130.0),
            Point::new(387.0, 110.0),
        ];
        let resolved = resolve_route(&scene, &conn, Some(&dragged)).unwrap();
        assert_eq!(resolved.source, RouteSource::LivePreview { valid: false });
        assert_eq!(resolved.points, dragged.to_vec());
    }

    #[test]
    fn resolve_all_skips_unanchored_connections() {
        let (scene, conn) = fixture();
        let orphan = Connection::new("orphan", PortRef::new("gone", Side::Left), PortRef::new("b", Side::Left));
        let routes = resolve_all(&scene, &[conn, orphan], None);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].connection, ConnectionId::new("c"));
    }
}
