use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{line_intersection, Angle, Distance, Pt2D, EPSILON_DIST};

/// A line segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    /// Creates a line segment between two points, which must not be the same.
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Result<Line> {
        if pt1.dist_to(pt2) <= EPSILON_DIST {
            bail!("Line from {} to {} too small", pt1, pt2);
        }
        Ok(Line(pt1, pt2))
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn length(&self) -> Distance {
        self.pt1().dist_to(self.pt2())
    }

    pub fn angle(&self) -> Angle {
        self.pt1().angle_to(self.pt2())
    }

    pub fn reversed(&self) -> Line {
        Line(self.pt2(), self.pt1())
    }

    /// Shifts the whole segment perpendicular to its direction. Positive widths go to the right,
    /// negative to the left.
    pub fn shift_either_direction(&self, width: Distance) -> Line {
        let angle = if width >= Distance::ZERO {
            self.angle().rotate_degs(90.0)
        } else {
            self.angle().rotate_degs(-90.0)
        };
        let width = width.abs();
        Line(
            self.pt1().project_away(width, angle),
            self.pt2().project_away(width, angle),
        )
    }

    pub fn shift_right(&self, width: Distance) -> Line {
        assert!(width >= Distance::ZERO);
        self.shift_either_direction(width)
    }

    pub fn shift_left(&self, width: Distance) -> Line {
        assert!(width >= Distance::ZERO);
        self.shift_either_direction(-width)
    }

    /// Where do the two segments cross, if at all?
    pub fn intersection(&self, other: &Line) -> Option<Pt2D> {
        if !self.intersects(other) {
            return None;
        }
        line_intersection(self, other)
    }

    pub fn intersects(&self, other: &Line) -> bool {
        // From http://bryceboe.com/2006/10/23/line-segment-intersection-algorithm/
        is_counter_clockwise(self.pt1(), other.pt1(), other.pt2())
            != is_counter_clockwise(self.pt2(), other.pt1(), other.pt2())
            && is_counter_clockwise(self.pt1(), self.pt2(), other.pt1())
                != is_counter_clockwise(self.pt1(), self.pt2(), other.pt2())
    }

    /// Returns the point this far along the line. Doesn't clamp to the segment, so negative
    /// distances or ones longer than the line extrapolate.
    pub fn unbounded_dist_along(&self, dist: Distance) -> Pt2D {
        let percent = dist / self.length();
        Pt2D::new(
            self.pt1().x() + percent * (self.pt2().x() - self.pt1().x()),
            self.pt1().y() + percent * (self.pt2().y() - self.pt1().y()),
        )
    }

    /// Signed perpendicular distance of a point from the infinite line through this segment.
    /// Positive means the point is to the right.
    pub fn signed_dist_to_pt(&self, pt: Pt2D) -> Distance {
        let dx = self.pt2().x() - self.pt1().x();
        let dy = self.pt2().y() - self.pt1().y();
        let cross = dx * (pt.y() - self.pt1().y()) - dy * (pt.x() - self.pt1().x());
        Distance::meters(cross / self.length().inner_meters())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Line::new(")?;
        writeln!(f, "  Pt2D::new({}, {}),", self.0.x(), self.0.y())?;
        writeln!(f, "  Pt2D::new({}, {}),", self.1.x(), self.1.y())?;
        write!(f, ")")
    }
}

fn is_counter_clockwise(pt1: Pt2D, pt2: Pt2D, pt3: Pt2D) -> bool {
    (pt3.y() - pt1.y()) * (pt2.x() - pt1.x()) > (pt2.y() - pt1.y()) * (pt3.x() - pt1.x())
}
