//! Planar geometry for laying a street cross-section out along a route. Routes arrive as WGS84
//! `LonLat`s, get projected into a local world-space measured in meters (`Pt2D`) by a
//! `GPSBounds`, get shifted and buffered as `PolyLine`s, and the resulting `Polygon`s are mapped
//! back to GPS for output.

#[macro_use]
extern crate anyhow;

mod angle;
mod bounds;
mod distance;
mod gps;
mod line;
mod polygon;
mod polyline;
mod pt;
mod ring;

pub use crate::angle::Angle;
pub use crate::bounds::Bounds;
pub use crate::distance::Distance;
pub use crate::gps::{GPSBounds, LonLat};
pub use crate::line::Line;
pub use crate::polygon::Polygon;
pub use crate::polyline::{EndCap, PolyLine};
pub use crate::pt::Pt2D;
pub use crate::ring::Ring;

/// About 1cm. Points closer together than this are considered the same.
pub const EPSILON_DIST: Distance = Distance::const_meters(0.01);

/// When shifting a polyline, a miter joint further than this multiple of the shift width from the
/// original corner gets beveled instead.
pub(crate) const MITER_THRESHOLD: f64 = 4.0;

// True if any two non-adjacent segments of a path cross. For a ring (first point equal to the
// last), the first and last segments count as adjacent.
pub(crate) fn path_crosses_itself(pts: &[Pt2D]) -> bool {
    let lines: Vec<Line> = pts
        .windows(2)
        .filter_map(|pair| Line::new(pair[0], pair[1]).ok())
        .collect();
    let closed = pts.len() > 2 && pts[0] == pts[pts.len() - 1];
    for i in 0..lines.len() {
        for j in (i + 2)..lines.len() {
            if closed && i == 0 && j == lines.len() - 1 {
                continue;
            }
            if lines[i].intersects(&lines[j]) {
                return true;
            }
        }
    }
    false
}

/// Finds where two lines intersect, treating both as infinitely long. None if they're parallel.
pub fn line_intersection(l1: &Line, l2: &Line) -> Option<Pt2D> {
    let x1 = l1.pt1().x();
    let y1 = l1.pt1().y();
    let x2 = l1.pt2().x();
    let y2 = l1.pt2().y();

    let x3 = l2.pt1().x();
    let y3 = l2.pt1().y();
    let x4 = l2.pt2().x();
    let y4 = l2.pt2().y();

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < 1e-12 {
        return None;
    }
    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    Some(Pt2D::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1)))
}
