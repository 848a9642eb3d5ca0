//! Renders a street cross-section, described by a short string of lane codes like "s|ddbs",
//! as colored polygons laid out along a route.
//!
//! The core is `render_lanes`, a pure function from a WGS84 route and a `LaneSpec` to one
//! polygon per lane. Around it are the style table configuring colors and widths, a GeoJSON
//! interface, a seam for measuring the negative space along a route, and an async `Backend`
//! answering both kinds of request.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod backend;
mod boundary;
mod code;
mod error;
mod negative_space;
mod render;
mod route;
mod style;

pub use crate::backend::Backend;
pub use crate::boundary::{
    lanes_to_geojson, negative_space_geojson, parse_obstacles, parse_route, render_lanes_geojson,
    space_to_geojson,
};
pub use crate::code::{LaneCode, LaneSpec};
pub use crate::error::LaneError;
pub use crate::negative_space::{NegativeSpace, PerpendicularProbes, SpacePolygon};
pub use crate::render::{
    layout, render_lanes, Alignment, DividerOffset, DroppedLane, LanePolygon, LaneSlot,
    RenderOptions, RenderedLanes,
};
pub use crate::route::Route;
pub use crate::style::{LaneStyle, LaneStyleTable, StylePreset};
