use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LaneError;

/// One element of a street's cross-section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneCode {
    Sidewalk,
    CycleLane,
    BusLane,
    DrivingLane,
    /// A painted line between lanes
    Divider,
}

impl LaneCode {
    pub fn all() -> [LaneCode; 5] {
        [
            LaneCode::Sidewalk,
            LaneCode::CycleLane,
            LaneCode::BusLane,
            LaneCode::DrivingLane,
            LaneCode::Divider,
        ]
    }

    /// Represents the lane as the single character used in lane specs.
    pub fn to_char(self) -> char {
        match self {
            LaneCode::Sidewalk => 's',
            LaneCode::CycleLane => 'c',
            LaneCode::BusLane => 'b',
            LaneCode::DrivingLane => 'd',
            LaneCode::Divider => '|',
        }
    }

    /// The inverse of `to_char`.
    pub fn from_char(x: char) -> Option<LaneCode> {
        match x {
            's' => Some(LaneCode::Sidewalk),
            'c' => Some(LaneCode::CycleLane),
            'b' => Some(LaneCode::BusLane),
            'd' => Some(LaneCode::DrivingLane),
            '|' => Some(LaneCode::Divider),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            LaneCode::Sidewalk => "a sidewalk",
            LaneCode::CycleLane => "a cycle lane",
            LaneCode::BusLane => "a bus-only lane",
            LaneCode::DrivingLane => "a general-purpose driving lane",
            LaneCode::Divider => "a painted divider",
        }
    }
}

/// A full cross-section, left to right when facing the direction the route travels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSpec(Vec<LaneCode>);

impl LaneSpec {
    pub fn new(codes: Vec<LaneCode>) -> LaneSpec {
        LaneSpec(codes)
    }

    /// Parses something like "s|ddbs". Fails on the first unrecognized character.
    pub fn parse(raw: &str) -> Result<LaneSpec, LaneError> {
        let mut codes = Vec::new();
        for (position, code) in raw.chars().enumerate() {
            match LaneCode::from_char(code) {
                Some(lane) => codes.push(lane),
                None => {
                    return Err(LaneError::InvalidLaneCode { code, position });
                }
            }
        }
        Ok(LaneSpec(codes))
    }

    pub fn codes(&self) -> &[LaneCode] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for LaneSpec {
    type Err = LaneError;

    fn from_str(raw: &str) -> Result<LaneSpec, LaneError> {
        LaneSpec::parse(raw)
    }
}

impl fmt::Display for LaneSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for code in &self.0 {
            write!(f, "{}", code.to_char())?;
        }
        Ok(())
    }
}
