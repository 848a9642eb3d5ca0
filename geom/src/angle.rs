use std::fmt;

use serde::{Deserialize, Serialize};

/// An angle, stored in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub(crate) fn new_rads(rads: f64) -> Angle {
        Angle(rads)
    }

    pub fn degrees(degs: f64) -> Angle {
        Angle(degs.to_radians())
    }

    pub fn opposite(self) -> Angle {
        Angle(self.0 + std::f64::consts::PI)
    }

    pub fn rotate_degs(self, degrees: f64) -> Angle {
        Angle(self.0 + degrees.to_radians())
    }

    /// Returns [0, 2pi)
    pub fn normalized_radians(self) -> f64 {
        self.0.rem_euclid(2.0 * std::f64::consts::PI)
    }

    /// Returns [0, 360)
    pub fn normalized_degrees(self) -> f64 {
        self.normalized_radians().to_degrees()
    }

    /// Logically this returns [-180, 180], but keep in mind when we print this angle, it'll
    /// normalize to be [0, 360].
    pub fn shortest_rotation_towards(self, other: Angle) -> Angle {
        // https://math.stackexchange.com/questions/110080/shortest-way-to-achieve-target-angle
        Angle::degrees(
            ((other.normalized_degrees() - self.normalized_degrees() + 540.0) % 360.0) - 180.0,
        )
    }

    /// True if this angle points more than 90 degrees away from the other.
    pub fn is_reversed_from(self, other: Angle) -> bool {
        let rot = self.shortest_rotation_towards(other).normalized_degrees();
        rot > 90.0 && rot < 270.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}
