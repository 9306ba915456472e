//! World-space geometry primitives shared by every routing component.

use serde::{Deserialize, Serialize};

/// A 2D world-space coordinate. `y` grows downward, as on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn approx_eq(self, other: Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }

    pub fn manhattan(self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Grows the rectangle symmetrically by `margin` on all four sides.
    pub fn expanded(&self, margin: f64) -> Rect {
        Rect::new(
            self.left - margin,
            self.top - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Closed containment, boundary included (within `eps`).
    pub fn contains(&self, p: Point, eps: f64) -> bool {
        p.x >= self.left - eps
            && p.x <= self.right() + eps
            && p.y >= self.top - eps
            && p.y <= self.bottom() + eps
    }

    /// Strict interior test. Points within `eps` of the boundary are outside.
    pub fn contains_interior(&self, p: Point, eps: f64) -> bool {
        p.x > self.left + eps
            && p.x < self.right() - eps
            && p.y > self.top + eps
            && p.y < self.bottom() - eps
    }

    /// Returns true if any part of the closed segment `a..b` lies in the
    /// eps-shrunk open interior. Segments running along the boundary or
    /// touching a corner do not hit.
    pub fn segment_hits_interior(&self, a: Point, b: Point, eps: f64) -> bool {
        let (left, right) = (self.left + eps, self.right() - eps);
        let (top, bottom) = (self.top + eps, self.bottom() - eps);
        if left >= right || top >= bottom {
            return false;
        }

        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        // Liang-Barsky clip against the closed shrunk rectangle.
        for (p, q) in [
            (-dx, a.x - left),
            (dx, right - a.x),
            (-dy, a.y - top),
            (dy, bottom - a.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return false;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return false;
                }
                t1 = t1.min(t);
            }
        }

        let mid = (t0 + t1) / 2.0;
        let sample = Point::new(a.x + mid * dx, a.y + mid * dy);
        sample.x > left && sample.x < right && sample.y > top && sample.y < bottom
    }

    /// True if `port` sits on one side of the rectangle and `port -> other`
    /// heads straight out through that side.
    pub fn leaves_outward(&self, port: Point, other: Point, eps: f64) -> bool {
        let along_x = port.x >= self.left - eps && port.x <= self.right() + eps;
        let along_y = port.y >= self.top - eps && port.y <= self.bottom() + eps;
        let same_x = (other.x - port.x).abs() <= eps;
        let same_y = (other.y - port.y).abs() <= eps;

        let left = (port.x - self.left).abs() <= eps && other.x < port.x - eps;
        let right = (port.x - self.right()).abs() <= eps && other.x > port.x + eps;
        let top = (port.y - self.top).abs() <= eps && other.y < port.y - eps;
        let bottom = (port.y - self.bottom()).abs() <= eps && other.y > port.y + eps;

        (along_y && same_y && (left || right)) || (along_x && same_x && (top || bottom))
    }
}

/// Ordered sequence of points forming a (normally rectilinear) path.
pub type Polyline = Vec<Point>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The coordinate that stays fixed along a run of this orientation.
    pub fn fixed_coord(self, p: Point) -> f64 {
        match self {
            Orientation::Horizontal => p.y,
            Orientation::Vertical => p.x,
        }
    }

    /// Moves `p` onto the lane `lane` perpendicular to this orientation's
    /// direction of travel.
    pub fn with_fixed(self, p: Point, lane: f64) -> Point {
        match self {
            Orientation::Horizontal => Point::new(p.x, lane),
            Orientation::Vertical => Point::new(lane, p.y),
        }
    }
}

/// Classifies a segment. Diagonal and zero-length segments have no
/// orientation.
pub fn orientation(a: Point, b: Point, eps: f64) -> Option<Orientation> {
    let same_x = (a.x - b.x).abs() <= eps;
    let same_y = (a.y - b.y).abs() <= eps;
    match (same_x, same_y) {
        (false, true) => Some(Orientation::Horizontal),
        (true, false) => Some(Orientation::Vertical),
        _ => None,
    }
}

/// Removes consecutive points that coincide within `eps`.
pub fn dedupe_points(points: &mut Polyline, eps: f64) {
    points.dedup_by(|next, prev| next.approx_eq(*prev, eps));
}

fn on_shared_line(a: Point, b: Point, c: Point, eps: f64) -> bool {
    let same_y = (a.y - b.y).abs() <= eps && (b.y - c.y).abs() <= eps;
    let same_x = (a.x - b.x).abs() <= eps && (b.x - c.x).abs() <= eps;
    same_x || same_y
}

/// Drops every point whose neighbours share its axis line, so a run of
/// collinear points keeps only its two ends.
pub fn collapse_collinear(points: &[Point], eps: f64) -> Polyline {
    let mut out: Polyline = Vec::with_capacity(points.len());
    for &p in points {
        while out.len() >= 2 && on_shared_line(out[out.len() - 2], out[out.len() - 1], p, eps) {
            out.pop();
        }
        out.push(p);
    }
    out
}

/// Duplicate removal followed by collinear collapse. Every polyline handed
/// to rendering goes through this.
pub fn simplify(points: &[Point], eps: f64) -> Polyline {
    let mut deduped = points.to_vec();
    dedupe_points(&mut deduped, eps);
    collapse_collinear(&deduped, eps)
}

pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].manhattan(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.25;

    #[test]
    fn expanded_rect_grows_every_side() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0).expanded(2.0);
        assert_eq!(rect, Rect::new(8.0, 18.0, 34.0, 44.0));
    }

    #[test]
    fn boundary_points_are_not_interior() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_interior(Point::new(5.0, 5.0), EPS));
        assert!(!rect.contains_interior(Point::new(0.0, 5.0), EPS));
        assert!(!rect.contains_interior(Point::new(0.2, 5.0), EPS));
        assert!(rect.contains(Point::new(10.1, 10.1), EPS));
    }

    #[test]
    fn segment_through_rect_hits() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.segment_hits_interior(Point::new(-5.0, 5.0), Point::new(15.0, 5.0), EPS));
        assert!(rect.segment_hits_interior(Point::new(5.0, -5.0), Point::new(5.0, 3.0), EPS));
        assert!(rect.segment_hits_interior(Point::new(-1.0, -1.0), Point::new(11.0, 11.0), EPS));
    }

    #[test]
    fn segment_along_edge_or_outside_misses() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!rect.segment_hits_interior(Point::new(-5.0, 0.0), Point::new(15.0, 0.0), EPS));
        assert!(!rect.segment_hits_interior(Point::new(10.0, -5.0), Point::new(10.0, 15.0), EPS));
        assert!(!rect.segment_hits_interior(Point::new(-5.0, 12.0), Point::new(15.0, 12.0), EPS));
        assert!(!rect.segment_hits_interior(Point::new(-5.0, 5.0), Point::new(0.0, 5.0), EPS));
    }

    #[test]
    fn degenerate_segment_inside_hits() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let p = Point::new(4.0, 4.0);
        assert!(rect.segment_hits_interior(p, p, EPS));
    }

    #[test]
    fn only_straight_exits_leave_outward() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let port = Point::new(10.0, 5.0);
        assert!(rect.leaves_outward(port, Point::new(20.0, 5.0), EPS));
        assert!(!rect.leaves_outward(port, Point::new(0.0, 5.0), EPS));
        assert!(!rect.leaves_outward(port, Point::new(10.0, 20.0), EPS));
        assert!(!rect.leaves_outward(port, Point::new(20.0, 8.0), EPS));
        let top = Point::new(4.0, 0.0);
        assert!(rect.leaves_outward(top, Point::new(4.0, -7.0), EPS));
        assert!(!rect.leaves_outward(Point::new(5.0, 5.0), Point::new(20.0, 5.0), EPS));
    }

    #[test]
    fn orientation_rejects_diagonal_and_zero_length() {
        let a = Point::new(0.0, 0.0);
        assert_eq!(orientation(a, Point::new(5.0, 0.0), EPS), Some(Orientation::Horizontal));
        assert_eq!(orientation(a, Point::new(0.0, 5.0), EPS), Some(Orientation::Vertical));
        assert_eq!(orientation(a, Point::new(5.0, 5.0), EPS), None);
        assert_eq!(orientation(a, a, EPS), None);
    }

    #[test]
    fn simplify_drops_duplicates_and_collinear_points() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        let simplified = simplify(&points, EPS);
        assert_eq!(
            simplified,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
        assert_eq!(simplify(&simplified, EPS), simplified);
    }
}
