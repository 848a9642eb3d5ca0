use serde::{Deserialize, Serialize};

use geom::{Distance, EndCap, GPSBounds, LonLat, PolyLine, Polygon};

use crate::route::Route;
use crate::{LaneCode, LaneError, LaneSpec, LaneStyleTable};

// Extra room around the route when projecting, beyond the width of the cross-section itself.
const PROJECTION_MARGIN: Distance = Distance::const_meters(10.0);

/// How much room a divider takes up in the cross-section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividerOffset {
    /// A divider is a lane like any other, pushing everything after it over by its width.
    FullWidth,
    /// A divider is paint with no real width. It's drawn as a thin strip centered on the edge
    /// between its neighbors and doesn't push anything over.
    ZeroOffset,
}

/// Where the cross-section sits relative to the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// The route is the left edge of the first lane; lanes stack up to the right.
    LeftEdge,
    /// The route runs down the middle of the whole cross-section.
    Centered,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub divider: DividerOffset,
    pub alignment: Alignment,
    pub end_cap: EndCap,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            divider: DividerOffset::FullWidth,
            alignment: Alignment::LeftEdge,
            end_cap: EndCap::Butt,
        }
    }
}

/// Where one lane sits in the cross-section, before any geometry happens.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneSlot {
    /// Position in the lane spec
    pub index: usize,
    pub code: LaneCode,
    pub color: String,
    pub width: Distance,
    /// Signed distance from the route to the lane's centerline. Positive is to the right of the
    /// direction of travel.
    pub center_offset: Distance,
}

impl LaneSlot {
    /// The offset of the lane's left edge.
    pub fn near_edge(&self) -> Distance {
        self.center_offset - self.width / 2.0
    }

    /// The offset of the lane's right edge.
    pub fn far_edge(&self) -> Distance {
        self.center_offset + self.width / 2.0
    }
}

/// Works out where every lane goes. Returns the slots in spec order and the total width taken
/// up. Lane i's centerline is the sum of the widths of lanes 0..i, plus half of its own width.
pub fn layout(
    spec: &LaneSpec,
    styles: &LaneStyleTable,
    opts: &RenderOptions,
) -> (Vec<LaneSlot>, Distance) {
    let mut slots = Vec::new();
    let mut width_sum = Distance::ZERO;
    for (index, code) in spec.codes().iter().enumerate() {
        let style = styles.get(*code);
        let (center_offset, advance) =
            if *code == LaneCode::Divider && opts.divider == DividerOffset::ZeroOffset {
                (width_sum, Distance::ZERO)
            } else {
                (width_sum + style.width / 2.0, style.width)
            };
        slots.push(LaneSlot {
            index,
            code: *code,
            color: style.color.clone(),
            width: style.width,
            center_offset,
        });
        width_sum += advance;
    }

    if opts.alignment == Alignment::Centered {
        let half = width_sum / 2.0;
        for slot in &mut slots {
            slot.center_offset -= half;
        }
    }

    (slots, width_sum)
}

/// One rendered lane.
#[derive(Clone, Debug, PartialEq)]
pub struct LanePolygon {
    pub slot: LaneSlot,
    /// In the world-space of the route's `GPSBounds`
    pub polygon: Polygon,
}

/// A lane that couldn't be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct DroppedLane {
    pub index: usize,
    pub code: LaneCode,
    pub reason: String,
}

impl From<DroppedLane> for LaneError {
    fn from(dropped: DroppedLane) -> LaneError {
        LaneError::DegenerateGeometry {
            index: dropped.index,
            code: dropped.code,
            reason: dropped.reason,
        }
    }
}

/// Everything produced by rendering one cross-section.
#[derive(Clone, Debug)]
pub struct RenderedLanes {
    /// In the same order as the lane spec, minus anything dropped
    pub lanes: Vec<LanePolygon>,
    /// The width of the whole cross-section, including dropped lanes
    pub total_width: Distance,
    pub dropped: Vec<DroppedLane>,
    /// The projected route; lane polygons share its world-space
    pub route: PolyLine,
    pub gps_bounds: GPSBounds,
}

impl RenderedLanes {
    /// The outer ring of one lane, mapped back to GPS.
    pub fn gps_ring(&self, lane: &LanePolygon) -> Vec<LonLat> {
        self.gps_bounds.convert_back(lane.polygon.points())
    }
}

/// Lays out a cross-section along a route, producing one colored polygon per lane code, in order.
///
/// Fails for routes that can't be projected. A lane whose polygon can't be built (usually
/// because the route curves too tightly for how far out the lane is) is skipped; it's logged and
/// listed in `RenderedLanes::dropped`, and the lanes after it keep their positions.
pub fn render_lanes(
    route: &[LonLat],
    spec: &LaneSpec,
    styles: &LaneStyleTable,
    opts: &RenderOptions,
) -> Result<RenderedLanes, LaneError> {
    let (slots, total_width) = layout(spec, styles, opts);
    let route = Route::new(route, total_width + PROJECTION_MARGIN)?;

    let mut lanes = Vec::new();
    let mut dropped = Vec::new();
    for slot in slots {
        match lane_polygon(&route.pl, &slot, opts.end_cap) {
            Ok(polygon) => {
                lanes.push(LanePolygon { slot, polygon });
            }
            Err(err) => {
                let lane = DroppedLane {
                    index: slot.index,
                    code: slot.code,
                    reason: err.to_string(),
                };
                warn!("{}", LaneError::from(lane.clone()));
                dropped.push(lane);
            }
        }
    }
    if !dropped.is_empty() {
        warn!(
            "Dropped {} of {} lanes for {}",
            dropped.len(),
            spec.len(),
            spec
        );
    }
    debug!(
        "Rendered {} lanes, {} wide, along a {} route",
        lanes.len(),
        total_width,
        route.pl.length()
    );

    Ok(RenderedLanes {
        lanes,
        total_width,
        dropped,
        route: route.pl,
        gps_bounds: route.gps_bounds,
    })
}

fn lane_polygon(route: &PolyLine, slot: &LaneSlot, cap: EndCap) -> anyhow::Result<Polygon> {
    let centerline = route.shift_either_direction(slot.center_offset)?;
    centerline.buffer(slot.width / 2.0, cap)
}
