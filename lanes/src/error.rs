use std::{error, fmt};

use crate::LaneCode;

/// Everything that can go wrong rendering lanes. `InvalidLaneCode`, `MalformedRoute` and
/// `InvalidStyle` abort a call. `DegenerateGeometry` never does: the lane is skipped and the
/// problem is recorded next to the results instead.
#[derive(Clone, Debug, PartialEq)]
pub enum LaneError {
    /// A character in the lane spec isn't one of the recognized codes. `position` counts
    /// characters, not bytes, starting from 0.
    InvalidLaneCode { code: char, position: usize },
    /// Fewer than 2 distinct points, coordinates that aren't finite or valid WGS84, or a route
    /// with no length.
    MalformedRoute(String),
    /// Offsetting or buffering one lane produced nothing usable.
    DegenerateGeometry {
        index: usize,
        code: LaneCode,
        reason: String,
    },
    /// A style table is missing something, or has a width that isn't positive or is absurdly large.
    InvalidStyle(String),
}

impl fmt::Display for LaneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LaneError::InvalidLaneCode { code, position } => {
                write!(f, "unknown lane code {:?} at position {}", code, position)
            }
            LaneError::MalformedRoute(reason) => write!(f, "malformed route: {}", reason),
            LaneError::DegenerateGeometry {
                index,
                code,
                reason,
            } => write!(
                f,
                "couldn't make a polygon for lane {} ({}): {}",
                index,
                code.to_char(),
                reason
            ),
            LaneError::InvalidStyle(reason) => write!(f, "invalid lane styles: {}", reason),
        }
    }
}

impl error::Error for LaneError {}
