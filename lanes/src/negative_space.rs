use anyhow::Result;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use geom::{Bounds, Distance, Line, LonLat, Pt2D, Ring};

use crate::route::Route;

/// The space along a route that isn't taken up by anything, split into pieces.
pub trait NegativeSpace: Send + Sync {
    fn calculate(&self, route: &[LonLat]) -> Result<Vec<SpacePolygon>>;
}

/// One piece of negative space.
#[derive(Clone, Debug, PartialEq)]
pub struct SpacePolygon {
    /// A closed ring
    pub exterior: Vec<LonLat>,
    /// How wide the space is, perpendicular to the route
    pub width: Distance,
}

/// Measures the space between obstacles (buildings, kerbs, walls) on both sides of a route, by
/// casting perpendicular probes at regular stations along it.
pub struct PerpendicularProbes {
    /// The exterior rings of obstacle polygons. Holes are ignored.
    obstacles: Vec<Vec<LonLat>>,
    step_size: Distance,
    project_away: Distance,
}

impl PerpendicularProbes {
    pub fn new(obstacles: Vec<Vec<LonLat>>) -> PerpendicularProbes {
        PerpendicularProbes {
            obstacles,
            step_size: Distance::meters(5.0),
            project_away: Distance::meters(50.0),
        }
    }

    /// How far apart stations along the route are.
    pub fn step_size(mut self, step_size: Distance) -> Self {
        self.step_size = step_size;
        self
    }

    /// How far a probe looks for an obstacle before giving up.
    pub fn project_away(mut self, project_away: Distance) -> Self {
        self.project_away = project_away;
        self
    }

    pub fn num_obstacles(&self) -> usize {
        self.obstacles.len()
    }
}

type ObstacleEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

impl NegativeSpace for PerpendicularProbes {
    fn calculate(&self, route: &[LonLat]) -> Result<Vec<SpacePolygon>> {
        if self.step_size <= Distance::ZERO || self.project_away <= Distance::ZERO {
            bail!(
                "step size {} and probe distance {} must be positive",
                self.step_size,
                self.project_away
            );
        }
        let Route { gps_bounds, pl } = Route::new(route, self.project_away)?;

        let mut rings: Vec<Vec<Pt2D>> = Vec::new();
        for obstacle in &self.obstacles {
            if obstacle.len() >= 3 {
                let mut pts = gps_bounds.convert(obstacle);
                if pts[0] != pts[pts.len() - 1] {
                    pts.push(pts[0]);
                }
                rings.push(pts);
            }
        }
        let rtree: RTree<ObstacleEnvelope> = RTree::bulk_load(
            rings
                .iter()
                .enumerate()
                .map(|(idx, pts)| {
                    let bounds = Bounds::from(pts);
                    GeomWithData::new(
                        Rectangle::from_corners(
                            [bounds.min_x, bounds.min_y],
                            [bounds.max_x, bounds.max_y],
                        ),
                        idx,
                    )
                })
                .collect(),
        );
        debug!("Made an RTree of {} obstacles", rings.len());

        // For every station, the nearest hit on the left and right, if both sides hit something
        let mut stations: Vec<Option<(Pt2D, Pt2D)>> = Vec::new();
        let mut num_hit_checks = 0;
        for (pt, angle) in pl.step_along(self.step_size) {
            let left = pt.project_away(self.project_away, angle.rotate_degs(-90.0));
            let right = pt.project_away(self.project_away, angle.rotate_degs(90.0));
            let hits = (
                nearest_hit(pt, left, &rings, &rtree, &mut num_hit_checks),
                nearest_hit(pt, right, &rings, &rtree, &mut num_hit_checks),
            );
            stations.push(match hits {
                (Some(l), Some(r)) => Some((l, r)),
                // If a probe doesn't hit anything, the route is probably outside the obstacles'
                // coverage; nothing useful to measure.
                _ => None,
            });
        }

        let mut results = Vec::new();
        for pair in stations.windows(2) {
            if let (Some((l1, r1)), Some((l2, r2))) = (pair[0], pair[1]) {
                let width = (l1.dist_to(r1) + l2.dist_to(r2)) / 2.0;
                // Probes from adjacent stations can touch, making the quad degenerate
                if let Ok(ring) = Ring::deduping_new(vec![l1, r1, r2, l2, l1]) {
                    results.push(SpacePolygon {
                        exterior: gps_bounds.convert_back(ring.points()),
                        width,
                    });
                }
            }
        }
        info!(
            "Probed {} stations with {} hit checks, producing {} polygons",
            stations.len(),
            num_hit_checks,
            results.len()
        );
        Ok(results)
    }
}

// Assuming `from` is outside every obstacle, finds the first place the probe from there to `to`
// crosses an obstacle's edge.
fn nearest_hit(
    from: Pt2D,
    to: Pt2D,
    rings: &[Vec<Pt2D>],
    rtree: &RTree<ObstacleEnvelope>,
    num_hit_checks: &mut usize,
) -> Option<Pt2D> {
    let probe = Line::new(from, to).ok()?;
    let envelope = AABB::from_corners(
        [from.x().min(to.x()), from.y().min(to.y())],
        [from.x().max(to.x()), from.y().max(to.y())],
    );

    let mut nearest: Option<(Pt2D, Distance)> = None;
    for obj in rtree.locate_in_envelope_intersecting(&envelope) {
        for pair in rings[obj.data].windows(2) {
            let edge = match Line::new(pair[0], pair[1]) {
                Ok(edge) => edge,
                Err(_) => continue,
            };
            *num_hit_checks += 1;
            if let Some(hit) = probe.intersection(&edge) {
                let dist = from.dist_to(hit);
                if nearest.map(|(_, best)| dist < best).unwrap_or(true) {
                    nearest = Some((hit, dist));
                }
            }
        }
    }
    nearest.map(|(pt, _)| pt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LaneError;

    fn rectangle(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Vec<LonLat> {
        vec![
            LonLat::new(lon1, lat1),
            LonLat::new(lon2, lat1),
            LonLat::new(lon2, lat2),
            LonLat::new(lon1, lat2),
            LonLat::new(lon1, lat1),
        ]
    }

    fn route() -> Vec<LonLat> {
        vec![LonLat::new(0.0, 0.0), LonLat::new(0.0, 0.0005)]
    }

    #[test]
    fn corridor_between_two_strips() {
        let probes = PerpendicularProbes::new(vec![
            rectangle(0.00009, -0.001, 0.0002, 0.0015),
            rectangle(-0.0002, -0.001, -0.00009, 0.0015),
        ]);
        let results = probes.calculate(&route()).unwrap();
        // About 55m long, with stations every 5m
        assert_eq!(results.len(), 11);
        for space in results {
            assert!(
                space
                    .width
                    .approx_eq(Distance::meters(20.0), Distance::meters(0.1)),
                "width {}",
                space.width
            );
            assert_eq!(space.exterior.len(), 5);
            assert_eq!(space.exterior[0], space.exterior[4]);
            for pt in &space.exterior {
                assert!(pt.x().abs() < 0.000091);
            }
        }
    }

    #[test]
    fn one_sided_or_far_obstacles_are_skipped() {
        for obstacles in [
            vec![],
            vec![rectangle(0.00009, -0.001, 0.0002, 0.0015)],
            // Beyond the default 50m probe
            vec![
                rectangle(0.0005, -0.001, 0.0006, 0.0015),
                rectangle(-0.0006, -0.001, -0.0005, 0.0015),
            ],
        ] {
            let results = PerpendicularProbes::new(obstacles)
                .calculate(&route())
                .unwrap();
            assert!(results.is_empty());
        }
    }

    #[test]
    fn longer_probes() {
        let probes = PerpendicularProbes::new(vec![
            rectangle(0.0005, -0.001, 0.0006, 0.0015),
            rectangle(-0.0006, -0.001, -0.0005, 0.0015),
        ])
        .project_away(Distance::meters(100.0))
        .step_size(Distance::meters(10.0));
        let results = probes.calculate(&route()).unwrap();
        assert_eq!(results.len(), 5);
        for space in results {
            assert!(space
                .width
                .approx_eq(Distance::meters(111.19), Distance::meters(0.5)));
        }
    }

    #[test]
    fn bad_input() {
        assert!(PerpendicularProbes::new(Vec::new())
            .calculate(&[LonLat::new(0.0, 0.0)])
            .is_err());
        for route in [
            vec![LonLat::new(0.0, 0.0), LonLat::new(f64::NAN, 0.0005)],
            vec![LonLat::new(0.0, 0.0), LonLat::new(0.0, f64::INFINITY)],
            vec![LonLat::new(0.0, 0.0), LonLat::new(200.0, 0.0)],
        ] {
            let err = PerpendicularProbes::new(Vec::new())
                .calculate(&route)
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<LaneError>(),
                Some(LaneError::MalformedRoute(_))
            ));
        }
        assert!(PerpendicularProbes::new(Vec::new())
            .step_size(Distance::ZERO)
            .calculate(&route())
            .is_err());
    }
}
