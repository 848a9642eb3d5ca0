use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    line_intersection, path_crosses_itself, Angle, Bounds, Distance, Line, Polygon, Pt2D, Ring,
    EPSILON_DIST, MITER_THRESHOLD,
};

/// How a buffered line is closed off at its two ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCap {
    /// Cut flat, perpendicular to the first and last segment.
    Butt,
    /// A half-disk around each endpoint.
    Round,
}

// Segments used to approximate a half-disk end cap.
const ROUND_CAP_SEGMENTS: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
    length: Distance,
}

impl PolyLine {
    /// Needs at least two points, and no two adjacent points may be the same.
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLine> {
        if pts.len() < 2 {
            bail!("Need at least two points for a PolyLine");
        }
        let length = pts.windows(2).fold(Distance::ZERO, |so_far, pair| {
            so_far + pair[0].dist_to(pair[1])
        });

        if pts
            .windows(2)
            .any(|pair| pair[0].approx_eq(pair[1], EPSILON_DIST))
        {
            bail!("PolyLine has ~dupe adjacent pts");
        }

        Ok(PolyLine { pts, length })
    }

    /// Like `new`, but first collapses adjacent points that're too close together.
    pub fn deduping_new(pts: Vec<Pt2D>) -> Result<PolyLine> {
        PolyLine::new(Pt2D::approx_dedupe(pts, EPSILON_DIST))
    }

    pub(crate) fn unchecked_new(pts: Vec<Pt2D>) -> PolyLine {
        assert!(pts.len() >= 2);
        let length = pts.windows(2).fold(Distance::ZERO, |so_far, pair| {
            so_far + pair[0].dist_to(pair[1])
        });
        PolyLine { pts, length }
    }

    pub fn reversed(&self) -> PolyLine {
        let mut pts = self.pts.clone();
        pts.reverse();
        PolyLine::unchecked_new(pts)
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn into_points(self) -> Vec<Pt2D> {
        self.pts
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        // Adjacent points are distinct by construction
        self.pts
            .windows(2)
            .filter_map(|pair| Line::new(pair[0], pair[1]).ok())
    }

    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt2D {
        self.pts[self.pts.len() - 1]
    }

    pub fn first_line(&self) -> Result<Line> {
        Line::new(self.pts[0], self.pts[1])
    }

    pub fn last_line(&self) -> Result<Line> {
        Line::new(self.pts[self.pts.len() - 2], self.pts[self.pts.len() - 1])
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.pts)
    }

    /// Returns the point and the direction of travel this far along the line.
    pub fn dist_along(&self, dist_along: Distance) -> Result<(Pt2D, Angle)> {
        if dist_along < Distance::ZERO {
            bail!("dist_along {} is negative", dist_along);
        }
        let mut dist_left = dist_along;
        let mut last = None;
        for line in self.lines() {
            let length = line.length();
            if dist_left <= length {
                return Ok((line.unbounded_dist_along(dist_left), line.angle()));
            }
            dist_left -= length;
            last = Some(line);
        }
        if let Some(line) = last {
            if dist_left <= EPSILON_DIST {
                return Ok((line.pt2(), line.angle()));
            }
        }
        bail!("dist_along {} is longer than {}", dist_along, self.length)
    }

    /// Every `step` along the line, returns the point and the direction of the segment there.
    /// The first station is the first point.
    pub fn step_along(&self, step: Distance) -> Vec<(Pt2D, Angle)> {
        let mut result = Vec::new();
        if step <= Distance::ZERO {
            return result;
        }
        let mut dist = Distance::ZERO;
        while dist <= self.length {
            if let Ok(pair) = self.dist_along(dist) {
                result.push(pair);
            }
            dist += step;
        }
        result
    }

    /// Shifts the line to the right of its direction of travel. The number of points may change,
    /// when very sharp corners are beveled off, and the length usually changes.
    pub fn shift_right(&self, width: Distance) -> Result<PolyLine> {
        if width < Distance::ZERO {
            bail!("shift_right needs a non-negative width, not {}", width);
        }
        self.shift_with_corrections(width)
    }

    pub fn shift_left(&self, width: Distance) -> Result<PolyLine> {
        if width < Distance::ZERO {
            bail!("shift_left needs a non-negative width, not {}", width);
        }
        self.shift_with_corrections(-width)
    }

    /// Positive widths shift right, negative left.
    pub fn shift_either_direction(&self, width: Distance) -> Result<PolyLine> {
        self.shift_with_corrections(width)
    }

    fn shift_with_corrections(&self, width: Distance) -> Result<PolyLine> {
        let (raw, segments) = self.shift_with_sharp_angles(width)?;

        // Every shifted segment should head the same way as the one it came from. When the shift
        // is wider than the curvature allows, a segment flips around and the result loops back on
        // itself. A segment squeezed down to nothing is fine; it's deduped away.
        for (idx, (orig, (pt1, pt2))) in self.lines().zip(segments).enumerate() {
            let shifted = match Line::new(pt1, pt2) {
                Ok(line) => line,
                Err(_) => continue,
            };
            if shifted.angle().is_reversed_from(orig.angle()) {
                bail!(
                    "Shifting by {} reversed segment {} from {} to {}",
                    width,
                    idx,
                    orig.angle(),
                    shifted.angle()
                );
            }
        }

        let result = PolyLine::deduping_new(raw)?;
        if path_crosses_itself(&result.pts) {
            bail!("Shifting by {} makes the line cross itself", width);
        }
        Ok(result)
    }

    // Returns the shifted points, and the shifted version of every original segment, in order.
    // Beveled corners add a segment between two of these.
    fn shift_with_sharp_angles(&self, width: Distance) -> Result<(Vec<Pt2D>, Vec<(Pt2D, Pt2D)>)> {
        if self.pts.len() == 2 {
            let l = Line::new(self.pts[0], self.pts[1])?.shift_either_direction(width);
            return Ok((vec![l.pt1(), l.pt2()], vec![(l.pt1(), l.pt2())]));
        }

        let mut result: Vec<Pt2D> = Vec::new();
        let mut segments: Vec<(Pt2D, Pt2D)> = Vec::new();

        let mut pt3_idx = 2;
        let mut pt1_raw = self.pts[0];
        let mut pt2_raw = self.pts[1];
        let mut segment_start = Line::new(pt1_raw, pt2_raw)?
            .shift_either_direction(width)
            .pt1();

        loop {
            let pt3_raw = self.pts[pt3_idx];

            let orig = Line::new(pt1_raw, pt2_raw)?;
            let l1 = orig.shift_either_direction(width);
            let l2 = Line::new(pt2_raw, pt3_raw)?.shift_either_direction(width);

            if pt3_idx == 2 {
                result.push(l1.pt1());
            }

            // Positive when the corner turns right. Shifting towards the turn moves the corner to
            // its inside.
            let turn = orig.signed_dist_to_pt(pt3_raw).inner_meters();
            let inside = turn * width.inner_meters() > 0.0;

            match line_intersection(&l1, &l2) {
                // The inside of a corner can't shoot off into the distance; if it goes too far,
                // a segment reverses instead.
                Some(pt2_shift)
                    if inside || pt2_shift.dist_to(pt2_raw) <= width.abs() * MITER_THRESHOLD =>
                {
                    result.push(pt2_shift);
                    segments.push((segment_start, pt2_shift));
                    segment_start = pt2_shift;
                }
                // A very sharp corner would shoot the miter off into the distance; bevel it
                Some(_) => {
                    result.push(l1.pt2());
                    result.push(l2.pt1());
                    segments.push((segment_start, l1.pt2()));
                    segment_start = l2.pt1();
                }
                // Parallel lines. Usually l1.pt2() == l2.pt1() and the original point is
                // redundant, but a line doubling back on itself needs both.
                None => {
                    result.push(l1.pt2());
                    if !l1.pt2().approx_eq(l2.pt1(), EPSILON_DIST) {
                        result.push(l2.pt1());
                    }
                    segments.push((segment_start, l1.pt2()));
                    segment_start = l2.pt1();
                }
            }

            if pt3_idx == self.pts.len() - 1 {
                result.push(l2.pt2());
                segments.push((segment_start, l2.pt2()));
                break;
            }

            pt1_raw = pt2_raw;
            pt2_raw = pt3_raw;
            pt3_idx += 1;
        }

        Ok((result, segments))
    }

    /// Produces the polygon covering every point within `radius` of this line. With
    /// `EndCap::Round`, that's the Minkowski sum of the line with a disk; `EndCap::Butt` cuts
    /// the ends off flat.
    pub fn buffer(&self, radius: Distance, cap: EndCap) -> Result<Polygon> {
        if radius <= EPSILON_DIST {
            bail!("Can't buffer a PolyLine by {}", radius);
        }
        let right = self.shift_right(radius)?;
        let left = self.shift_left(radius)?;

        let mut pts = right.into_points();
        if cap == EndCap::Round {
            let angle = self.last_line()?.angle();
            pts.extend(half_disk(self.last_pt(), radius, angle.rotate_degs(90.0)));
        }
        pts.extend(left.reversed().into_points());
        if cap == EndCap::Round {
            let angle = self.first_line()?.angle();
            pts.extend(half_disk(self.first_pt(), radius, angle.rotate_degs(-90.0)));
        }
        pts.push(pts[0]);

        let ring = Ring::deduping_new(pts)?;
        if ring.self_intersects() {
            bail!("Buffering by {} makes the outline cross itself", radius);
        }
        Ok(ring.into_polygon())
    }

    /// A polygon `width` wide, centered on this line, with flat ends.
    pub fn make_polygons(&self, width: Distance) -> Result<Polygon> {
        self.buffer(width / 2.0, EndCap::Butt)
    }
}

// The interior points of the arc swept counter-clockwise on screen (decreasing angle) from
// `start` through 180 degrees, around `center`.
fn half_disk(center: Pt2D, radius: Distance, start: Angle) -> Vec<Pt2D> {
    (1..ROUND_CAP_SEGMENTS)
        .map(|i| {
            let degs = -180.0 * (i as f64) / (ROUND_CAP_SEGMENTS as f64);
            center.project_away(radius, start.rotate_degs(degs))
        })
        .collect()
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for (idx, pt) in self.pts.iter().enumerate() {
            write!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
            if idx > 0 {
                write!(
                    f,
                    "    // {}, {}",
                    pt.x() - self.pts[idx - 1].x(),
                    pt.y() - self.pts[idx - 1].y()
                )?;
            }
            writeln!(f)?;
        }
        write!(f, "])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pl(pts: Vec<(f64, f64)>) -> PolyLine {
        PolyLine::new(pts.into_iter().map(|(x, y)| Pt2D::new(x, y)).collect()).unwrap()
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(PolyLine::new(vec![Pt2D::new(1.0, 1.0)]).is_err());
        assert!(PolyLine::new(vec![Pt2D::new(1.0, 1.0), Pt2D::new(1.0, 1.0)]).is_err());
        let deduped = PolyLine::deduping_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(0.0, 0.0),
            Pt2D::new(5.0, 0.0),
        ])
        .unwrap();
        assert_eq!(deduped.points().len(), 2);
    }

    #[test]
    fn shift_around_a_corner() {
        // East, then south (+y). The right side is the inside of the corner.
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let shifted = line.shift_right(Distance::meters(1.0)).unwrap();
        let expected = vec![
            Pt2D::new(0.0, 1.0),
            Pt2D::new(9.0, 1.0),
            Pt2D::new(9.0, 10.0),
        ];
        assert_eq!(shifted.points().len(), expected.len());
        for (actual, expected) in shifted.points().iter().zip(expected) {
            assert!(actual.approx_eq(expected, EPSILON_DIST), "{}", shifted);
        }

        let outside = line.shift_left(Distance::meters(1.0)).unwrap();
        assert!(outside.points()[1].approx_eq(Pt2D::new(11.0, -1.0), EPSILON_DIST));
    }

    #[test]
    fn shift_too_far_inside_a_u_turn() {
        // A U-turn 3m wide, turning right twice. Shifting right by more than the gap flips the
        // middle segment.
        let line = pl(vec![(0.0, 0.0), (50.0, 0.0), (50.0, 3.0), (0.0, 3.0)]);
        assert!(line.shift_right(Distance::meters(1.0)).is_ok());
        assert!(line.shift_right(Distance::meters(4.5)).is_err());
        // The other side is fine
        assert!(line.shift_left(Distance::meters(4.5)).is_ok());
    }

    #[test]
    fn shift_around_a_hairpin() {
        // East 50m, then sharply back west and 10m south: about 11 degrees between the two legs
        let line = pl(vec![(0.0, 0.0), (50.0, 0.0), (0.0, 10.0)]);

        // The inside corner is mitered, however far back along the legs that lands
        let inside = line.shift_right(Distance::meters(1.5)).unwrap();
        assert_eq!(inside.points().len(), 3);
        assert!(inside.points()[1].x() < 40.0);
        // Until the corner is further back than the legs are long
        assert!(line.shift_right(Distance::meters(6.0)).is_err());

        // The outside corner is beveled
        let outside = line.shift_left(Distance::meters(1.5)).unwrap();
        assert_eq!(outside.points().len(), 4);
        assert!(outside.points()[1].approx_eq(Pt2D::new(50.0, -1.5), EPSILON_DIST));

        for width in [1.0, 3.0, 5.0] {
            if let Ok(polygon) = line.make_polygons(Distance::meters(width)) {
                assert!(!Ring::new(polygon.points().clone()).unwrap().self_intersects());
            }
        }
    }

    #[test]
    fn self_intersecting_rings() {
        let square = Ring::new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(10.0, 10.0),
            Pt2D::new(0.0, 10.0),
            Pt2D::new(0.0, 0.0),
        ])
        .unwrap();
        assert!(!square.self_intersects());
        let bowtie = Ring::new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(0.0, 10.0),
            Pt2D::new(10.0, 10.0),
            Pt2D::new(0.0, 0.0),
        ])
        .unwrap();
        assert!(bowtie.self_intersects());
    }

    #[test]
    fn butt_buffer_is_a_rectangle() {
        let line = pl(vec![(0.0, 0.0), (100.0, 0.0)]);
        let polygon = line.make_polygons(Distance::meters(4.0)).unwrap();
        assert!((polygon.area() - 400.0).abs() < 1e-6);
        let bounds = polygon.get_bounds();
        assert!((bounds.min_y + 2.0).abs() < 1e-9);
        assert!((bounds.max_y - 2.0).abs() < 1e-9);
        assert!((bounds.min_x - 0.0).abs() < 1e-9);
        assert!((bounds.max_x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn round_buffer_adds_caps() {
        let line = pl(vec![(0.0, 0.0), (100.0, 0.0)]);
        let polygon = line.buffer(Distance::meters(2.0), EndCap::Round).unwrap();
        let bounds = polygon.get_bounds();
        assert!((bounds.min_x + 2.0).abs() < 1e-9);
        assert!((bounds.max_x - 102.0).abs() < 1e-9);
        // A rectangle plus a slightly-undersized disk
        let full = 400.0 + std::f64::consts::PI * 4.0;
        assert!(polygon.area() < full);
        assert!(polygon.area() > 400.0 + 0.9 * std::f64::consts::PI * 4.0);
        assert!(polygon.contains_pt(Pt2D::new(101.5, 0.0)));
        assert!(!polygon.contains_pt(Pt2D::new(50.0, 2.5)));
    }

    #[test]
    fn step_along_includes_both_ends() {
        let line = pl(vec![(0.0, 0.0), (10.0, 0.0)]);
        let stations = line.step_along(Distance::meters(5.0));
        assert_eq!(stations.len(), 3);
        assert!(stations[2].0.approx_eq(Pt2D::new(10.0, 0.0), EPSILON_DIST));
    }
}
