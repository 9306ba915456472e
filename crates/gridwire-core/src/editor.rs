//! Interactive lane shift: drag one straight run of a committed route onto a
//! parallel lane, re-route the two connecting legs, re-validate.

use crate::geometry::{orientation, simplify, Orientation, Point, Polyline};
use crate::models::{ConnectionId, RouteOverride};
use crate::scene::RoutingScene;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    /// Shifted and fully valid
    Shifted,
    /// Target lane is the run's current lane
    NoOp,
    /// Bad segment index, diagonal or zero-length segment, or a run that
    /// contains a port endpoint
    InvalidInput,
    /// The shifted run alone leaves the lattice or crosses an obstacle
    LaneBlocked,
    /// The stitched route failed full validation
    Rejected,
}

/// Inclusive point indices of the dragged run in the input polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunBounds {
    pub start: usize,
    pub end: usize,
}

/// Outcome of one lane-shift attempt. Never persist a result whose `ok` is
/// false; it may still be shown as a rejected preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditResult {
    pub polyline: Polyline,
    pub ok: bool,
    pub status: EditStatus,
    pub run: Option<RunBounds>,
    pub orientation: Option<Orientation>,
    pub lane: Option<f64>,
}

impl EditResult {
    fn unchanged(polyline: &[Point], status: EditStatus) -> Self {
        Self {
            polyline: polyline.to_vec(),
            ok: false,
            status,
            run: None,
            orientation: None,
            lane: None,
        }
    }
}

/// Extends segment `segment` to its maximal run of collinear segments with
/// the same orientation.
fn run_bounds(points: &[Point], segment: usize, orient: Orientation, eps: f64) -> RunBounds {
    let fixed = orient.fixed_coord(points[segment]);
    let continues = |i: usize| {
        orientation(points[i], points[i + 1], eps) == Some(orient)
            && (orient.fixed_coord(points[i]) - fixed).abs() <= eps
            && (orient.fixed_coord(points[i + 1]) - fixed).abs() <= eps
    };
    let mut start = segment;
    while start > 0 && continues(start - 1) {
        start -= 1;
    }
    let mut end = segment + 1;
    while end + 1 < points.len() && continues(end) {
        end += 1;
    }
    RunBounds { start, end }
}

/// Moves the run containing `segment` onto the lane nearest `pointer`.
///
/// The result is always returned; nothing is mutated. The two endpoints of
/// `polyline` are treated as port positions and never move.
pub fn shift_run(
    scene: &RoutingScene,
    polyline: &[Point],
    segment: usize,
    pointer: Point,
) -> EditResult {
    let eps = scene.eps();
    if segment + 1 >= polyline.len() {
        return EditResult::unchanged(polyline, EditStatus::InvalidInput);
    }
    let Some(orient) = orientation(polyline[segment], polyline[segment + 1], eps) else {
        return EditResult::unchanged(polyline, EditStatus::InvalidInput);
    };
    let run = run_bounds(polyline, segment, orient, eps);
    if run.start == 0 || run.end == polyline.len() - 1 {
        return EditResult::unchanged(polyline, EditStatus::InvalidInput);
    }
    let Some(lane) = scene.lattice().snap_lane(orient, pointer) else {
        return EditResult::unchanged(polyline, EditStatus::InvalidInput);
    };

    let a = polyline[run.start];
    let b = polyline[run.end];
    let mut result = EditResult {
        polyline: polyline.to_vec(),
        ok: false,
        status: EditStatus::NoOp,
        run: Some(run),
        orientation: Some(orient),
        lane: Some(lane),
    };
    if (lane - orient.fixed_coord(a)).abs() <= eps {
        return result;
    }

    let shifted_a = orient.with_fixed(a, lane);
    let shifted_b = orient.with_fixed(b, lane);
    let lattice = scene.lattice();
    if !lattice.contains_point(shifted_a)
        || !lattice.contains_point(shifted_b)
        || scene.obstacles().blocks_segment(shifted_a, shifted_b)
    {
        result.status = EditStatus::LaneBlocked;
        return result;
    }

    let lead = scene.route(a, shifted_a);
    let trail = scene.route(shifted_b, b);

    let mut stitched: Polyline = Vec::with_capacity(polyline.len() + lead.path.len() + trail.path.len());
    stitched.extend_from_slice(&polyline[..=run.start]);
    stitched.extend(lead.path.iter().skip(1).copied());
    stitched.push(shifted_b);
    stitched.extend(trail.path.iter().skip(1).copied());
    stitched.extend_from_slice(&polyline[run.end + 1..]);
    let candidate = simplify(&stitched, eps);

    match scene.check_route(&candidate) {
        Ok(()) => {
            result.ok = true;
            result.status = EditStatus::Shifted;
        }
        Err(defect) => {
            tracing::debug!(%defect, lane, "lane shift rejected");
            result.status = EditStatus::Rejected;
        }
    }
    result.polyline = candidate;
    result
}

/// Index of the segment closest to `pointer` within `tolerance`. Ties go to
/// the lower index.
pub fn pick_segment(polyline: &[Point], pointer: Point, tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, pair) in polyline.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let cx = pointer.x.clamp(a.x.min(b.x), a.x.max(b.x));
        let cy = pointer.y.clamp(a.y.min(b.y), a.y.max(b.y));
        let dist = Point::new(cx, cy).manhattan(pointer);
        if dist <= tolerance && best.map_or(true, |(_, d)| dist < d) {
            best = Some((idx, dist));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Receives committed overrides. Implemented by the caller's undoable-edit
/// mechanism; the core never persists anything itself.
pub trait RouteOverrideSink {
    fn submit_route_override(&mut self, connection: &ConnectionId, route: RouteOverride);
}

impl<F> RouteOverrideSink for F
where
    F: FnMut(&ConnectionId, RouteOverride),
{
    fn submit_route_override(&mut self, connection: &ConnectionId, route: RouteOverride) {
        self(connection, route)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("scene revision changed from {started} to {current} during the edit")]
    StaleScene { started: u64, current: u64 },
    #[error("no lane shift has been applied yet")]
    NothingToCommit,
    #[error("last lane shift was not accepted ({0:?})")]
    NotAccepted(EditStatus),
}

/// One begin/update/commit drag sequence. Every update shifts the polyline
/// captured at `begin`, so pointer moves never accumulate.
#[derive(Debug, Clone)]
pub struct EditSession {
    connection: ConnectionId,
    revision: u64,
    base: Polyline,
    segment: usize,
    last: Option<EditResult>,
}

impl EditSession {
    pub fn begin(
        scene: &RoutingScene,
        connection: ConnectionId,
        polyline: Polyline,
        segment: usize,
    ) -> Self {
        Self {
            connection,
            revision: scene.revision(),
            base: polyline,
            segment,
            last: None,
        }
    }

    pub fn connection(&self) -> &ConnectionId {
        &self.connection
    }

    pub fn base(&self) -> &[Point] {
        &self.base
    }

    pub fn last_result(&self) -> Option<&EditResult> {
        self.last.as_ref()
    }

    /// Current preview polyline, accepted or not.
    pub fn preview(&self) -> Option<&[Point]> {
        self.last.as_ref().map(|result| result.polyline.as_slice())
    }

    fn ensure_fresh(&self, scene: &RoutingScene) -> Result<(), EditError> {
        if scene.revision() != self.revision {
            return Err(EditError::StaleScene {
                started: self.revision,
                current: scene.revision(),
            });
        }
        Ok(())
    }

    pub fn update(&mut self, scene: &RoutingScene, pointer: Point) -> Result<&EditResult, EditError> {
        self.ensure_fresh(scene)?;
        let result = shift_run(scene, &self.base, self.segment, pointer);
        Ok(&*self.last.insert(result))
    }

    /// Submits the last accepted preview as an authoritative override.
    pub fn commit(
        self,
        scene: &RoutingScene,
        sink: &mut impl RouteOverrideSink,
    ) -> Result<RouteOverride, EditError> {
        self.ensure_fresh(scene)?;
        let Some(result) = self.last else {
            return Err(EditError::NothingToCommit);
        };
        if !result.ok {
            return Err(EditError::NotAccepted(result.status));
        }
        let route = RouteOverride::from_polyline(&result.polyline);
        tracing::debug!(connection = %self.connection, midpoints = route.midpoints.len(), "committing route override");
        sink.submit_route_override(&self.connection, route.clone());
        Ok(route)
    }
}
