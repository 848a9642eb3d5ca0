//! Renders street cross-sections along routes, and measures the space around them, from GeoJSON
//! files.

#[macro_use]
extern crate log;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use structopt::StructOpt;

use geom::{Distance, EndCap};
use lanes::{
    Alignment, Backend, DividerOffset, LaneStyleTable, PerpendicularProbes, RenderOptions,
    StylePreset,
};

#[derive(StructOpt)]
#[structopt(name = "cli", about = "Draw lanes along a route")]
enum Command {
    /// Lays out a cross-section along a route and writes one colored polygon per lane as GeoJSON
    RenderLanes {
        /// The path to a GeoJSON file with one LineString
        #[structopt(long)]
        route: String,
        /// The cross-section, left to right when facing the direction of the route. Each
        /// character is one lane: s = sidewalk, c = cycle lane, b = bus lane, d = driving lane,
        /// | = painted divider.
        #[structopt(long)]
        lanes: String,
        /// A JSON file with a color and width for every lane code. Overrides --preset.
        #[structopt(long)]
        styles: Option<String>,
        /// Which built-in style table to use: route-overlay or typical-street
        #[structopt(long, default_value = "route-overlay")]
        preset: StylePreset,
        /// full-width treats dividers like any other lane. zero-offset draws them straddling the
        /// edge between their neighbors, without pushing later lanes over.
        #[structopt(long, default_value = "full-width", parse(try_from_str = parse_divider))]
        divider: DividerOffset,
        /// Center the whole cross-section on the route, instead of starting at it
        #[structopt(long)]
        centered: bool,
        /// Round off the ends of every lane
        #[structopt(long)]
        round_caps: bool,
        /// The GeoJSON file to write. If omitted, prints to STDOUT.
        #[structopt(long)]
        output: Option<String>,
    },
    /// Probes perpendicular to a route for the nearest obstacles on either side, and writes the
    /// space in between as GeoJSON polygons
    NegativeSpace {
        /// The path to a GeoJSON file with one LineString
        #[structopt(long)]
        route: String,
        /// The path to a GeoJSON file with obstacle polygons, like buildings or kerbs
        #[structopt(long)]
        obstacles: String,
        /// How often to probe along the route, in meters
        #[structopt(long, default_value = "5", parse(try_from_str = parse_meters))]
        step_size: Distance,
        /// How far to look for an obstacle on either side, in meters
        #[structopt(long, default_value = "50", parse(try_from_str = parse_meters))]
        project_away: Distance,
        /// The GeoJSON file to write. If omitted, prints to STDOUT.
        #[structopt(long)]
        output: Option<String>,
    },
    /// Prints a style table as JSON, as a starting point for a --styles file
    DumpStyles {
        #[structopt(long, default_value = "route-overlay")]
        preset: StylePreset,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Command::from_args();

    // Keep STDOUT clean when it's the only output
    if !matches!(cmd, Command::DumpStyles { .. }) {
        abstutil::logger::setup();
    }

    match cmd {
        Command::RenderLanes {
            route,
            lanes,
            styles,
            preset,
            divider,
            centered,
            round_caps,
            output,
        } => {
            let styles = match styles {
                Some(path) => LaneStyleTable::load(&path)?,
                None => preset.styles(),
            };
            let opts = RenderOptions {
                divider,
                alignment: if centered {
                    Alignment::Centered
                } else {
                    Alignment::LeftEdge
                },
                end_cap: if round_caps {
                    EndCap::Round
                } else {
                    EndCap::Butt
                },
            };
            let input = read(&route)?;
            // Nothing to measure
            let negative_space = Arc::new(PerpendicularProbes::new(Vec::new()));
            let backend = Backend::spawn(styles, opts, negative_space);
            let result = backend.render_lanes(input, lanes).await?;
            abstutil::write_or_print(output.as_deref(), &result)?;
        }
        Command::NegativeSpace {
            route,
            obstacles,
            step_size,
            project_away,
            output,
        } => {
            let obstacles = lanes::parse_obstacles(&read(&obstacles)?)?;
            let probes = PerpendicularProbes::new(obstacles)
                .step_size(step_size)
                .project_away(project_away);
            info!("Probing against {} obstacles", probes.num_obstacles());
            let input = read(&route)?;
            let backend = Backend::spawn(
                LaneStyleTable::default(),
                RenderOptions::default(),
                Arc::new(probes),
            );
            let result = backend.get_negative_space(input).await?;
            abstutil::write_or_print(output.as_deref(), &result)?;
        }
        Command::DumpStyles { preset } => {
            println!("{}", abstutil::to_json(&preset.styles())?);
        }
    }
    Ok(())
}

fn read(path: &str) -> Result<String> {
    fs_err::read_to_string(path).with_context(|| format!("reading {}", path))
}

fn parse_divider(x: &str) -> Result<DividerOffset> {
    match x {
        "full-width" => Ok(DividerOffset::FullWidth),
        "zero-offset" => Ok(DividerOffset::ZeroOffset),
        _ => bail!("Unknown divider policy {}; try full-width or zero-offset", x),
    }
}

fn parse_meters(x: &str) -> Result<Distance> {
    let value: f64 = x
        .parse()
        .with_context(|| format!("{} isn't a number", x))?;
    if !value.is_finite() || value <= 0.0 {
        bail!("{} must be a positive number of meters", x);
    }
    Ok(Distance::meters(value))
}
