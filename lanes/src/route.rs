use geom::{Distance, GPSBounds, LonLat, PolyLine};

use crate::LaneError;

/// A route projected into a local world-space, ready to be shifted around.
#[derive(Clone, Debug)]
pub struct Route {
    /// Everything produced from this route should be converted back to GPS with these bounds.
    pub gps_bounds: GPSBounds,
    pub pl: PolyLine,
}

impl Route {
    /// Validates and projects a WGS84 route. The projection covers the route plus `margin` in
    /// every direction; geometry further away still converts, just less accurately.
    pub fn new(pts: &[LonLat], margin: Distance) -> Result<Route, LaneError> {
        if pts.len() < 2 {
            return Err(LaneError::MalformedRoute(format!(
                "needs at least 2 points, but has {}",
                pts.len()
            )));
        }
        for (idx, pt) in pts.iter().enumerate() {
            if !pt.is_finite() {
                return Err(LaneError::MalformedRoute(format!(
                    "point {} has non-finite coordinates",
                    idx
                )));
            }
            if pt.x() < -180.0 || pt.x() > 180.0 || pt.y() < -90.0 || pt.y() > 90.0 {
                return Err(LaneError::MalformedRoute(format!(
                    "point {} isn't a WGS84 longitude, latitude: {}",
                    idx, pt
                )));
            }
        }

        // The margin keeps a perfectly straight north/south or east/west route from having
        // zero-width bounds
        let gps_bounds = GPSBounds::from(pts).padded(margin.max(Distance::meters(1.0)));
        let pl = PolyLine::deduping_new(gps_bounds.convert(pts))
            .map_err(|_| LaneError::MalformedRoute("the route has no length".to_string()))?;
        Ok(Route { gps_bounds, pl })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_routes() {
        for (description, pts) in [
            ("empty", vec![]),
            ("one point", vec![LonLat::new(0.0, 0.0)]),
            (
                "all the same point",
                vec![
                    LonLat::new(1.0, 1.0),
                    LonLat::new(1.0, 1.0),
                    LonLat::new(1.0, 1.0),
                ],
            ),
            (
                "NaN",
                vec![LonLat::new(0.0, 0.0), LonLat::new(f64::NAN, 0.001)],
            ),
            (
                "infinite",
                vec![LonLat::new(0.0, 0.0), LonLat::new(0.0, f64::INFINITY)],
            ),
            (
                "latitude out of range",
                vec![LonLat::new(0.0, 0.0), LonLat::new(0.0, 91.0)],
            ),
        ] {
            assert!(
                matches!(
                    Route::new(&pts, Distance::meters(10.0)),
                    Err(LaneError::MalformedRoute(_))
                ),
                "{} should be malformed",
                description
            );
        }
    }

    #[test]
    fn duplicate_points_are_tolerated() {
        let route = Route::new(
            &[
                LonLat::new(0.0, 0.0),
                LonLat::new(0.0, 0.0),
                LonLat::new(0.0, 0.001),
            ],
            Distance::meters(10.0),
        )
        .unwrap();
        assert_eq!(route.pl.points().len(), 2);
        assert!(route
            .pl
            .length()
            .approx_eq(Distance::meters(111.19), Distance::meters(0.1)));
    }
}
