use std::fmt;

use geo::HaversineDestination;
use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D};

/// longitude is x, latitude is y
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct LonLat {
    longitude: f64,
    latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    pub fn x(self) -> f64 {
        self.longitude
    }

    pub fn y(self) -> f64 {
        self.latitude
    }

    pub fn is_finite(self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Haversine distance between two points.
    pub fn gps_dist(self, other: LonLat) -> Distance {
        let earth_radius_m = 6_371_000.0;
        let lon1 = self.longitude.to_radians();
        let lon2 = other.longitude.to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let delta_lat = lat2 - lat1;
        let delta_lon = lon2 - lon1;

        let a = (delta_lat / 2.0).sin().powi(2)
            + (delta_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Distance::meters(earth_radius_m * c)
    }

    /// Moves this far along a great circle, with the bearing in degrees clockwise from north.
    pub fn project_away(self, dist: Distance, bearing_degrees: f64) -> LonLat {
        let pt = geo::Point::new(self.longitude, self.latitude)
            .haversine_destination(bearing_degrees, dist.inner_meters());
        LonLat::new(pt.x(), pt.y())
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

/// A rectangle in GPS coordinates, used to project into and out of a local world-space measured
/// in meters. The top-left corner (min longitude, max latitude) maps to (0, 0); y grows going
/// south.
///
/// The projection is linear across the bounds, so it's only accurate for areas small enough that
/// the curvature of the earth doesn't matter much, like a single street.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GPSBounds {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl GPSBounds {
    pub fn new() -> GPSBounds {
        GPSBounds {
            min_lon: f64::MAX,
            min_lat: f64::MAX,
            max_lon: f64::MIN,
            max_lat: f64::MIN,
        }
    }

    pub fn from(pts: &[LonLat]) -> GPSBounds {
        let mut b = GPSBounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    pub fn update(&mut self, pt: LonLat) {
        self.min_lon = self.min_lon.min(pt.longitude);
        self.max_lon = self.max_lon.max(pt.longitude);
        self.min_lat = self.min_lat.min(pt.latitude);
        self.max_lat = self.max_lat.max(pt.latitude);
    }

    pub fn contains(&self, pt: LonLat) -> bool {
        pt.longitude >= self.min_lon
            && pt.longitude <= self.max_lon
            && pt.latitude >= self.min_lat
            && pt.latitude <= self.max_lat
    }

    /// Grows the bounds by roughly this distance in every direction. A route running straight
    /// north or east has zero-width bounds, which can't be used for projecting; padding fixes
    /// that.
    pub fn padded(&self, dist: Distance) -> GPSBounds {
        let mut b = self.clone();
        // Diagonally away from each corner
        b.update(LonLat::new(self.min_lon, self.min_lat).project_away(dist, 225.0));
        b.update(LonLat::new(self.max_lon, self.max_lat).project_away(dist, 45.0));
        b.update(LonLat::new(self.min_lon, self.max_lat).project_away(dist, 315.0));
        b.update(LonLat::new(self.max_lon, self.min_lat).project_away(dist, 135.0));
        b
    }

    /// The world-space point corresponding to the bottom-right corner.
    // TODO cache this
    pub fn get_max_world_pt(&self) -> Pt2D {
        let width = LonLat::new(self.min_lon, self.min_lat)
            .gps_dist(LonLat::new(self.max_lon, self.min_lat));
        let height = LonLat::new(self.min_lon, self.min_lat)
            .gps_dist(LonLat::new(self.min_lon, self.max_lat));
        Pt2D::new(width.inner_meters(), height.inner_meters())
    }

    /// True if the bounds have some area. Projection needs this.
    pub fn has_area(&self) -> bool {
        self.max_lon > self.min_lon && self.max_lat > self.min_lat
    }

    /// Projects into world-space. Points outside the bounds are fine; they just wind up with
    /// negative coordinates or ones beyond `get_max_world_pt`.
    pub fn convert(&self, pts: &[LonLat]) -> Vec<Pt2D> {
        let max = self.get_max_world_pt();
        pts.iter()
            .map(|gps| {
                let x = (gps.longitude - self.min_lon) / (self.max_lon - self.min_lon) * max.x();
                // Invert y, so that the northernmost latitude is 0
                let y = (self.max_lat - gps.latitude) / (self.max_lat - self.min_lat) * max.y();
                Pt2D::new(x, y)
            })
            .collect()
    }

    /// The inverse of `convert`.
    pub fn convert_back(&self, pts: &[Pt2D]) -> Vec<LonLat> {
        let max = self.get_max_world_pt();
        pts.iter()
            .map(|pt| {
                let lon = self.min_lon + (pt.x() / max.x()) * (self.max_lon - self.min_lon);
                let lat = self.max_lat - (pt.y() / max.y()) * (self.max_lat - self.min_lat);
                LonLat::new(lon, lat)
            })
            .collect()
    }
}

impl Default for GPSBounds {
    fn default() -> Self {
        GPSBounds::new()
    }
}
