//! Demo Scenario - routing and editing on a fully occupied tile grid.
//!
//! Walks one complete edit cycle:
//!
//! 1. BUILD: a block on every tile, three long connections
//! 2. ROUTE: resolve every connection fresh
//! 3. DRAG: shift the first movable run of the diagonal route one lane over
//! 4. COMMIT: store the accepted preview as an override
//! 5. RESOLVE: route again and check the override is what gets rendered
//!
//! Usage:
//!   cargo run -p gridwire-cli --bin demo_scenario

use anyhow::{bail, Context, Result};
use clap::Parser;
use gridwire_cli::scenarios::{find_lane_shift, full_grid};
use gridwire_cli::{init_tracing, CliConfig, RoutesReport};
use gridwire_core::{resolve_all, EditSession, GridSpec, RouteSource};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Demo: route and edit on a fully occupied grid")]
struct Args {
    #[arg(long, default_value_t = 8)]
    cols: usize,

    #[arg(long, default_value_t = 6)]
    rows: usize,

    /// Routing lanes per gap between tiles
    #[arg(long, default_value_t = 3)]
    lane_tracks: usize,

    /// Save the final document here
    #[arg(long)]
    output: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json)?;

    let mut doc = full_grid(GridSpec {
        cols: args.cols,
        rows: args.rows,
        lane_tracks: args.lane_tracks,
        ..GridSpec::default()
    });
    let overrides = CliConfig::from_env();
    let scene = doc.scene(&overrides).context("building demo scene")?;
    tracing::info!(
        blocks = doc.blocks.len(),
        nodes = scene.lattice().len(),
        "demo scene built"
    );

    let before = resolve_all(&scene, &doc.connections, None);
    for route in &before {
        tracing::info!(connection = %route.connection, points = route.points.len(), source = ?route.source, "resolved");
    }
    let Some(target) = before.first() else {
        bail!("demo scenario has no connections");
    };

    let (segment, pointer) =
        find_lane_shift(&scene, &target.points).context("no movable run on the diagonal route")?;
    let mut session = EditSession::begin(&scene, target.connection.clone(), target.points.clone(), segment);
    let preview = session.update(&scene, pointer)?.polyline.clone();
    tracing::info!(segment, x = pointer.x, y = pointer.y, "lane shift accepted");

    let live = resolve_all(&scene, &doc.connections, Some(&session));
    session.commit(&scene, &mut doc)?;

    let after = resolve_all(&scene, &doc.connections, None);
    let Some(stored) = after.first() else {
        bail!("diagonal route vanished after commit");
    };
    if stored.source != RouteSource::Override || stored.points != preview || live[0].points != preview {
        bail!("committed override does not match the last preview");
    }
    tracing::info!(connection = %stored.connection, "override resolves to the committed preview");

    if let Some(path) = &args.output {
        doc.save(path)?;
        tracing::info!(path = %path.display(), "document saved");
    }

    let report = RoutesReport {
        revision: scene.revision(),
        routes: after,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
