use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::Distance;

use crate::{LaneCode, LaneError};

// Far wider than any real lane, but small enough that summing a cross-section can't overflow
const MAX_LANE_WIDTH: Distance = Distance::const_meters(100.0);

/// How to draw one kind of lane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneStyle {
    /// Passed through to the output untouched; usually a CSS color name.
    pub color: String,
    /// The full width of the lane, perpendicular to the route.
    pub width: Distance,
}

impl LaneStyle {
    pub fn new(color: &str, width_meters: f64) -> LaneStyle {
        LaneStyle {
            color: color.to_string(),
            width: Distance::meters(width_meters),
        }
    }
}

/// Maps every lane code to exactly one style. Every width is positive and at most 100m.
///
/// This is configuration, not logic: two different tables have been used in practice (see
/// `StylePreset`), and nothing about rendering should depend on which one is in effect besides
/// the widths and colors of the output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedStyles")]
pub struct LaneStyleTable {
    sidewalk: LaneStyle,
    cycle_lane: LaneStyle,
    bus_lane: LaneStyle,
    driving_lane: LaneStyle,
    divider: LaneStyle,
}

// What's read from a file, before validation
#[derive(Deserialize)]
struct UncheckedStyles {
    sidewalk: LaneStyle,
    cycle_lane: LaneStyle,
    bus_lane: LaneStyle,
    driving_lane: LaneStyle,
    divider: LaneStyle,
}

impl TryFrom<UncheckedStyles> for LaneStyleTable {
    type Error = LaneError;

    fn try_from(raw: UncheckedStyles) -> Result<LaneStyleTable, LaneError> {
        let table = LaneStyleTable {
            sidewalk: raw.sidewalk,
            cycle_lane: raw.cycle_lane,
            bus_lane: raw.bus_lane,
            driving_lane: raw.driving_lane,
            divider: raw.divider,
        };
        table.validate()?;
        Ok(table)
    }
}

impl LaneStyleTable {
    /// Builds a table by asking for the style of every code.
    pub fn from_fn<F: Fn(LaneCode) -> LaneStyle>(style: F) -> Result<LaneStyleTable, LaneError> {
        let table = LaneStyleTable {
            sidewalk: style(LaneCode::Sidewalk),
            cycle_lane: style(LaneCode::CycleLane),
            bus_lane: style(LaneCode::BusLane),
            driving_lane: style(LaneCode::DrivingLane),
            divider: style(LaneCode::Divider),
        };
        table.validate()?;
        Ok(table)
    }

    /// The table used for drawing lanes over a planned route. Narrow, so the overlay stays
    /// readable at route-planning zoom levels.
    pub fn route_overlay() -> LaneStyleTable {
        LaneStyleTable {
            sidewalk: LaneStyle::new("grey", 2.0),
            cycle_lane: LaneStyle::new("green", 1.5),
            bus_lane: LaneStyle::new("red", 3.25),
            driving_lane: LaneStyle::new("black", 3.0),
            divider: LaneStyle::new("yellow", 0.5),
        }
    }

    /// Widths closer to what's physically on the ground, from the usual design guidance.
    pub fn typical_street() -> LaneStyleTable {
        LaneStyleTable {
            // http://www.seattle.gov/rowmanual/manual/4_11.asp, "wide"
            sidewalk: LaneStyle {
                color: "grey".to_string(),
                width: Distance::feet(6.0),
            },
            // https://www.gov.uk/government/publications/cycle-infrastructure-design-ltn-120 table
            // 5-2
            cycle_lane: LaneStyle::new("green", 2.0),
            // https://nacto.org/publication/urban-street-design-guide/street-design-elements/transit-streets/dedicated-curbside-offset-bus-lanes/
            bus_lane: LaneStyle {
                color: "red".to_string(),
                width: Distance::feet(12.0),
            },
            // https://en.wikipedia.org/wiki/Lane#Lane_width
            driving_lane: LaneStyle {
                color: "black".to_string(),
                width: Distance::feet(10.0),
            },
            // Pretty wild guess
            divider: LaneStyle::new("yellow", 1.5),
        }
    }

    pub fn get(&self, code: LaneCode) -> &LaneStyle {
        match code {
            LaneCode::Sidewalk => &self.sidewalk,
            LaneCode::CycleLane => &self.cycle_lane,
            LaneCode::BusLane => &self.bus_lane,
            LaneCode::DrivingLane => &self.driving_lane,
            LaneCode::Divider => &self.divider,
        }
    }

    /// Returns a copy of this table with one lane's width changed.
    pub fn with_width(&self, code: LaneCode, width: Distance) -> Result<LaneStyleTable, LaneError> {
        let mut copy = self.clone();
        let style = match code {
            LaneCode::Sidewalk => &mut copy.sidewalk,
            LaneCode::CycleLane => &mut copy.cycle_lane,
            LaneCode::BusLane => &mut copy.bus_lane,
            LaneCode::DrivingLane => &mut copy.driving_lane,
            LaneCode::Divider => &mut copy.divider,
        };
        style.width = width;
        copy.validate()?;
        Ok(copy)
    }

    /// Reads a table from a JSON file. Every code must be present.
    pub fn load(path: &str) -> Result<LaneStyleTable> {
        abstutil::read_json(path)
    }

    fn validate(&self) -> Result<(), LaneError> {
        for code in LaneCode::all() {
            let style = self.get(code);
            if style.width <= Distance::ZERO {
                return Err(LaneError::InvalidStyle(format!(
                    "{} has width {}, but widths must be positive",
                    code.describe(),
                    style.width
                )));
            }
            if style.width > MAX_LANE_WIDTH {
                return Err(LaneError::InvalidStyle(format!(
                    "{} has width {}, but widths can be at most {}",
                    code.describe(),
                    style.width,
                    MAX_LANE_WIDTH
                )));
            }
            if style.color.is_empty() {
                return Err(LaneError::InvalidStyle(format!(
                    "{} has no color",
                    code.describe()
                )));
            }
        }
        Ok(())
    }
}

impl Default for LaneStyleTable {
    fn default() -> Self {
        LaneStyleTable::route_overlay()
    }
}

/// The named style tables built in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StylePreset {
    RouteOverlay,
    TypicalStreet,
}

impl StylePreset {
    pub fn styles(self) -> LaneStyleTable {
        match self {
            StylePreset::RouteOverlay => LaneStyleTable::route_overlay(),
            StylePreset::TypicalStreet => LaneStyleTable::typical_street(),
        }
    }
}

impl FromStr for StylePreset {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<StylePreset> {
        match x {
            "route-overlay" => Ok(StylePreset::RouteOverlay),
            "typical-street" => Ok(StylePreset::TypicalStreet),
            _ => bail!(
                "Unknown style preset {}; try route-overlay or typical-street",
                x
            ),
        }
    }
}
