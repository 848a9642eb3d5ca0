use geo::{Area, Contains};
use serde::{Deserialize, Serialize};

use crate::{Bounds, GPSBounds, Pt2D, Ring};

/// A polygon in world-space: one outer ring, maybe some holes.
#[derive(PartialEq, Serialize, Deserialize, Clone, Debug)]
pub struct Polygon {
    outer: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    pub fn with_holes(outer: Ring, holes: Vec<Ring>) -> Polygon {
        Polygon { outer, holes }
    }

    /// Every point of the outer ring. The first equals the last.
    pub fn points(&self) -> &Vec<Pt2D> {
        self.outer.points()
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(self.outer.points())
    }

    /// The unsigned area, in square meters.
    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
    }

    /// Does this polygon contain the point in its interior?
    pub fn contains_pt(&self, pt: Pt2D) -> bool {
        self.to_geo().contains(&geo::Point::from(pt))
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        geo::Polygon::new(
            self.outer.to_geo(),
            self.holes.iter().map(|ring| ring.to_geo()).collect(),
        )
    }

    /// Produces a GeoJSON polygon, optionally mapping the world-space points back to GPS.
    pub fn to_geojson(&self, gps: Option<&GPSBounds>) -> geojson::Geometry {
        let mut rings = vec![self.outer.to_geojson_coords(gps)];
        for hole in &self.holes {
            rings.push(hole.to_geojson_coords(gps));
        }
        geojson::Geometry::new(geojson::Value::Polygon(rings))
    }
}
