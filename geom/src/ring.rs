use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{path_crosses_itself, GPSBounds, Polygon, Pt2D, EPSILON_DIST};

/// Maybe a misnomer, but like a PolyLine, but closed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    // first equals last
    pts: Vec<Pt2D>,
}

impl Ring {
    pub fn new(pts: Vec<Pt2D>) -> Result<Ring> {
        if pts.len() < 4 {
            bail!("Can't make a ring with < 4 points");
        }
        if pts[0] != pts[pts.len() - 1] {
            bail!("Can't make a ring with mismatching first/last points");
        }

        // This checks no lines are too small. Could take the other approach and automatically
        // squish down points here and make sure the final result is at least EPSILON_DIST.
        // But probably better for the callers to do this -- they have better understanding of what
        // needs to be squished down, why, and how.
        if pts
            .windows(2)
            .any(|pair| pair[0].approx_eq(pair[1], EPSILON_DIST))
        {
            bail!("Ring has ~dupe adjacent pts");
        }

        Ok(Ring { pts })
    }

    /// Collapses adjacent points that're too close together, then makes the ring.
    pub fn deduping_new(pts: Vec<Pt2D>) -> Result<Ring> {
        let mut pts = Pt2D::approx_dedupe(pts, EPSILON_DIST);
        // The closing point may have been merged with the one before it
        if pts.len() >= 2 && pts[0] != pts[pts.len() - 1] {
            if pts[0].approx_eq(pts[pts.len() - 1], EPSILON_DIST) {
                pts.pop();
            }
            pts.push(pts[0]);
        }
        Ring::new(pts)
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    /// True if any two edges that don't share a point cross.
    pub fn self_intersects(&self) -> bool {
        path_crosses_itself(&self.pts)
    }

    pub fn into_polygon(self) -> Polygon {
        Polygon::with_holes(self, Vec::new())
    }

    /// Produces GeoJSON coordinates for this ring, optionally mapping the world-space points back
    /// to GPS.
    pub fn to_geojson_coords(&self, gps: Option<&GPSBounds>) -> Vec<Vec<f64>> {
        if let Some(gps) = gps {
            gps.convert_back(&self.pts)
                .into_iter()
                .map(|pt| vec![pt.x(), pt.y()])
                .collect()
        } else {
            self.pts.iter().map(|pt| vec![pt.x(), pt.y()]).collect()
        }
    }

    pub fn to_geo(&self) -> geo::LineString<f64> {
        geo::LineString::from(
            self.pts
                .iter()
                .map(|pt| (pt.x(), pt.y()))
                .collect::<Vec<_>>(),
        )
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Ring::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}
