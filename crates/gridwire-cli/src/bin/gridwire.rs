//! gridwire - resolve, inspect and edit the routes of a JSON board document.
//!
//! Usage:
//!   cargo run -p gridwire-cli --bin gridwire -- route --doc board.json
//!   cargo run -p gridwire-cli --bin gridwire -- overlay --doc board.json
//!   cargo run -p gridwire-cli --bin gridwire -- shift --doc board.json \
//!       --connection c1 --segment 2 --x 131.5 --y 0 --commit
//!
//! Environment: GRIDWIRE_CLEARANCE, GRIDWIRE_STUB_LENGTH, GRIDWIRE_EPSILON,
//! GRIDWIRE_LANE_TRACKS override the document; flags override both.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use gridwire_cli::{init_tracing, CliConfig, Document, RoutesReport, ShiftReport};
use gridwire_core::{
    pick_segment, resolve_all, resolve_route, BlockId, ConnectionId, EditSession, Point,
    RoutingScene,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Grid-constrained orthogonal wire routing")]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve every connection and print the polylines
    Route {
        #[command(flatten)]
        doc: DocArgs,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the routable fabric (lattice nodes and edges)
    Overlay {
        #[command(flatten)]
        doc: DocArgs,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Drag one run of a connection's route onto the lane nearest a pointer
    Shift(ShiftArgs),
    /// Move a block to another tile and save the document
    Move {
        #[command(flatten)]
        doc: DocArgs,
        #[arg(long)]
        block: String,
        #[arg(long)]
        col: usize,
        #[arg(long)]
        row: usize,
        /// Where to save the document (defaults to --doc)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Drop a connection's stored override and save the document
    Reset {
        #[command(flatten)]
        doc: DocArgs,
        #[arg(long)]
        connection: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct DocArgs {
    /// Board document (JSON)
    #[arg(long)]
    doc: PathBuf,

    /// Obstacle clearance in world units
    #[arg(long)]
    clearance: Option<f64>,

    /// Port stub length in world units
    #[arg(long)]
    stub_length: Option<f64>,

    /// Geometric tolerance
    #[arg(long)]
    epsilon: Option<f64>,

    /// Routing lanes per gap between tiles
    #[arg(long)]
    lane_tracks: Option<usize>,
}

impl DocArgs {
    fn overrides(&self) -> CliConfig {
        CliConfig::from_env().overridden_by(CliConfig {
            clearance: self.clearance,
            stub_length: self.stub_length,
            epsilon: self.epsilon,
            lane_tracks: self.lane_tracks,
        })
    }

    fn load(&self) -> Result<Document> {
        Document::load(&self.doc).with_context(|| format!("loading {}", self.doc.display()))
    }

    fn scene(&self, doc: &Document) -> Result<RoutingScene> {
        doc.scene(&self.overrides())
            .with_context(|| format!("building routing scene for {}", self.doc.display()))
    }
}

#[derive(Args, Debug)]
struct ShiftArgs {
    #[command(flatten)]
    doc: DocArgs,

    #[arg(long)]
    connection: String,

    /// Segment index in the resolved route
    #[arg(long, conflicts_with_all = ["pick_x", "pick_y"])]
    segment: Option<usize>,

    /// Pick the segment nearest this point instead of by index
    #[arg(long, requires = "pick_y")]
    pick_x: Option<f64>,

    #[arg(long, requires = "pick_x")]
    pick_y: Option<f64>,

    /// Pick distance in world units
    #[arg(long, default_value_t = 6.0)]
    tolerance: f64,

    /// Pointer position the run is dragged to
    #[arg(long, allow_negative_numbers = true)]
    x: f64,

    #[arg(long, allow_negative_numbers = true)]
    y: f64,

    /// Store the shifted route as an override if it was accepted
    #[arg(long)]
    commit: bool,

    /// Where to save the committed document (defaults to --doc)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, json).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn route(doc_args: &DocArgs, output: Option<&Path>) -> Result<()> {
    let doc = doc_args.load()?;
    let scene = doc_args.scene(&doc)?;
    let report = RoutesReport {
        revision: scene.revision(),
        routes: resolve_all(&scene, &doc.connections, None),
    };
    for fallback in report.fallbacks() {
        tracing::warn!(connection = %fallback.connection, source = ?fallback.source, "connection is not routed on the lattice");
    }
    tracing::info!(routes = report.routes.len(), revision = report.revision, "routes resolved");
    emit(&report, output)
}

fn overlay(doc_args: &DocArgs, output: Option<&Path>) -> Result<()> {
    let doc = doc_args.load()?;
    let scene = doc_args.scene(&doc)?;
    let overlay = scene.overlay();
    tracing::info!(nodes = overlay.nodes.len(), edges = overlay.edges.len(), "overlay built");
    emit(&overlay, output)
}

fn shift(args: &ShiftArgs) -> Result<()> {
    let mut doc = args.doc.load()?;
    let scene = args.doc.scene(&doc)?;
    let id = ConnectionId::new(args.connection.as_str());
    let connection = doc.connection(&id)?.clone();
    let current = resolve_route(&scene, &connection, None)
        .with_context(|| format!("connection {id} has no anchored ports"))?;

    let segment = match (args.segment, args.pick_x, args.pick_y) {
        (Some(segment), _, _) => segment,
        (None, Some(x), Some(y)) => pick_segment(&current.points, Point::new(x, y), args.tolerance)
            .with_context(|| format!("no segment of {id} within {} of ({x}, {y})", args.tolerance))?,
        _ => bail!("pass --segment or both --pick-x and --pick-y"),
    };

    let mut session = EditSession::begin(&scene, id.clone(), current.points, segment);
    let result = session.update(&scene, Point::new(args.x, args.y))?.clone();
    tracing::info!(connection = %id, segment, status = ?result.status, lane = ?result.lane, "lane shift evaluated");

    let committed = if args.commit {
        if !result.ok {
            bail!("lane shift was not accepted: {:?}", result.status);
        }
        session.commit(&scene, &mut doc)?;
        let path = args.output.as_deref().unwrap_or(&args.doc.doc);
        doc.save(path)?;
        true
    } else {
        false
    };

    emit(
        &ShiftReport {
            connection: id,
            segment,
            result,
            committed,
        },
        None,
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    match &cli.command {
        Command::Route { doc, output } => route(doc, output.as_deref()),
        Command::Overlay { doc, output } => overlay(doc, output.as_deref()),
        Command::Shift(args) => shift(args),
        Command::Move {
            doc: doc_args,
            block,
            col,
            row,
            output,
        } => {
            let mut doc = doc_args.load()?;
            doc.move_block(&BlockId::new(block.as_str()), *col, *row)?;
            // Refuse to save a placement the router cannot build.
            doc_args.scene(&doc)?;
            doc.save(output.as_deref().unwrap_or(&doc_args.doc))?;
            tracing::info!(block = %block, col, row, revision = doc.revision, "block moved");
            Ok(())
        }
        Command::Reset {
            doc: doc_args,
            connection,
            output,
        } => {
            let mut doc = doc_args.load()?;
            let id = ConnectionId::new(connection.as_str());
            let cleared = doc.clear_override(&id)?;
            doc.save(output.as_deref().unwrap_or(&doc_args.doc))?;
            tracing::info!(connection = %id, cleared, "route override reset");
            Ok(())
        }
    }
}
