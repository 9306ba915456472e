//! Routing integration tests.
//!
//! Builds full scenes through `RoutingScene` and checks the resolved routes
//! against the tile geometry, plus A* against a brute-force search.

use gridwire_core::{
    polyline_length, resolve_all, AxisLists, Block, Connection, GridSpec, Lattice, ObstacleMap,
    Point, PortRef, Rect, RouteSource, RouteStatus, RoutingConfig, RoutingGraph, RoutingScene,
    Side,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn full_grid() -> (GridSpec, Vec<Block>) {
    let grid = GridSpec::default();
    let mut blocks = Vec::new();
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            blocks.push(Block::new(format!("t{col}_{row}"), col, row));
        }
    }
    (grid, blocks)
}

#[test]
fn test_diagonal_route_threads_between_tiles() {
    let (grid, blocks) = full_grid();
    let connections = vec![
        Connection::new("corner", PortRef::new("t0_0", Side::Right), PortRef::new("t7_5", Side::Left)),
        Connection::new("vertical", PortRef::new("t7_0", Side::Bottom), PortRef::new("t0_5", Side::Top)),
    ];
    let scene =
        RoutingScene::build(1, grid.clone(), &blocks, &connections, RoutingConfig::default()).unwrap();
    let tiles: Vec<Rect> = blocks
        .iter()
        .map(|b| scene.block_rect(&b.id).unwrap())
        .collect();
    assert_eq!(tiles[0], grid.tile_rect(0, 0));

    let routes = resolve_all(&scene, &connections, None);
    assert_eq!(routes.len(), 2);
    for resolved in &routes {
        assert_eq!(
            resolved.source,
            RouteSource::Computed {
                status: RouteStatus::Found
            },
            "{}",
            resolved.connection
        );
        assert!(scene.check_route(&resolved.points).is_ok());
        for pair in resolved.points.windows(2) {
            assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y);
            for tile in &tiles {
                assert!(
                    !tile.segment_hits_interior(pair[0], pair[1], scene.eps()),
                    "{:?} -> {:?} overlaps {:?}",
                    pair[0],
                    pair[1],
                    tile
                );
            }
        }
    }

    let corner = &routes[0].points;
    assert_eq!(corner.first(), Some(&Point::new(110.0, 75.0)));
    assert_eq!(corner.last(), Some(&Point::new(1132.0, 855.0)));
}

#[test]
fn test_off_axis_query_returns_direct_segment() {
    let (grid, blocks) = full_grid();
    let scene = RoutingScene::build(1, grid, &blocks, &[], RoutingConfig::default()).unwrap();
    let start = Point::new(131.5, 131.5);
    let end = Point::new(333.3, 17.7);
    let outcome = scene.route(start, end);
    assert_eq!(outcome.status, RouteStatus::OffLattice);
    assert_eq!(outcome.path, vec![start, end]);
}

#[test]
fn test_blocked_ports_fall_back_with_status() {
    // One block spans the full canvas width between the two ports.
    let grid = GridSpec {
        cols: 3,
        rows: 3,
        lane_tracks: 1,
        margin: 0.0,
        ..GridSpec::default()
    };
    let mut blocks = vec![Block::new("a", 0, 0), Block::new("b", 2, 2)];
    blocks.push(Block::new("wall_h", 0, 1).with_span(3, 1));
    let conn = Connection::new("c", PortRef::new("a", Side::Bottom), PortRef::new("b", Side::Top));
    let scene =
        RoutingScene::build(4, grid, &blocks, &[conn.clone()], RoutingConfig::default()).unwrap();
    let routes = resolve_all(&scene, &[conn], None);
    assert_eq!(
        routes[0].source,
        RouteSource::Computed {
            status: RouteStatus::Unreachable
        }
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let (grid, blocks) = full_grid();
    let connections: Vec<Connection> = (0..6)
        .map(|i| {
            Connection::new(
                format!("c{i}"),
                PortRef::new(format!("t{i}_0"), Side::Bottom),
                PortRef::new(format!("t{}_5", 7 - i), Side::Top),
            )
        })
        .collect();
    let a = RoutingScene::build(1, grid.clone(), &blocks, &connections, RoutingConfig::default())
        .unwrap();
    let b = RoutingScene::build(1, grid, &blocks, &connections, RoutingConfig::default()).unwrap();
    assert_eq!(
        resolve_all(&a, &connections, None),
        resolve_all(&b, &connections, None)
    );
    assert_eq!(a.overlay(), b.overlay());
}

#[test]
fn test_overlay_edges_are_clear_and_axis_aligned() {
    let (grid, blocks) = full_grid();
    let scene = RoutingScene::build(1, grid, &blocks, &[], RoutingConfig::default()).unwrap();
    let overlay = scene.overlay();
    assert_eq!(overlay.nodes.len(), scene.lattice().len());
    assert_eq!(overlay.edges.len() * 2, scene.graph().edge_count());
    for edge in &overlay.edges {
        assert!(edge.from.x == edge.to.x || edge.from.y == edge.to.y);
        assert!(edge.from.x <= edge.to.x && edge.from.y <= edge.to.y);
        assert!(!scene.obstacles().blocks_segment(edge.from, edge.to));
    }
}

fn dijkstra(lattice: &Lattice, graph: &RoutingGraph, source: usize, target: usize) -> Option<f64> {
    let n = lattice.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut done = vec![false; n];
    dist[source] = 0.0;
    loop {
        let next = (0..n)
            .filter(|&i| !done[i] && dist[i].is_finite())
            .min_by(|&a, &b| dist[a].total_cmp(&dist[b]))?;
        if next == target {
            return Some(dist[next]);
        }
        done[next] = true;
        let node = lattice.nodes()[next];
        let Some(id) = lattice.node_at(node.ix, node.iy) else {
            continue;
        };
        for neighbor in graph.neighbors(id) {
            let cost = dist[next] + node.point.manhattan(lattice.point(neighbor));
            if cost < dist[neighbor.index()] {
                dist[neighbor.index()] = cost;
            }
        }
    }
}

#[test]
fn test_astar_matches_brute_force_on_random_obstacles() {
    let mut rng = StdRng::seed_from_u64(0x9e1d);
    for _ in 0..40 {
        let obstacles: Vec<Rect> = (0..rng.random_range(0..6))
            .map(|_| {
                Rect::new(
                    rng.random_range(0.0..80.0),
                    rng.random_range(0.0..80.0),
                    rng.random_range(4.0..30.0),
                    rng.random_range(4.0..30.0),
                )
            })
            .collect();
        let map = ObstacleMap::from_obstacles(&obstacles, 1.0, 0.25);
        let axes = AxisLists {
            xs: (0..=10).map(|i| i as f64 * 10.0).collect(),
            ys: (0..=10).map(|i| i as f64 * 10.0).collect(),
        };
        let lattice = Lattice::build(axes, &map);
        if lattice.len() < 2 {
            continue;
        }
        let graph = RoutingGraph::build(&lattice, &map);

        for _ in 0..5 {
            let s = rng.random_range(0..lattice.len());
            let t = rng.random_range(0..lattice.len());
            if s == t {
                continue;
            }
            let start = lattice.nodes()[s].point;
            let end = lattice.nodes()[t].point;
            let outcome = gridwire_core::route(&lattice, &graph, start, end);
            match dijkstra(&lattice, &graph, s, t) {
                Some(best) => {
                    assert_eq!(outcome.status, RouteStatus::Found);
                    assert!((polyline_length(&outcome.path) - best).abs() < 1e-9);
                    for pair in outcome.path.windows(2) {
                        assert!(!map.blocks_segment(pair[0], pair[1]));
                    }
                }
                None => {
                    assert_eq!(outcome.status, RouteStatus::Unreachable);
                    assert_eq!(outcome.path, vec![start, end]);
                }
            }
        }
    }
}
