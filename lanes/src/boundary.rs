//! The GeoJSON interface to rendering lanes and measuring negative space. Everything coming in
//! and going out is WGS84, as `[longitude, latitude]` positions.

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};

use geom::LonLat;

use crate::{
    render_lanes, LaneSpec, LaneStyleTable, NegativeSpace, RenderOptions, RenderedLanes,
    SpacePolygon,
};

/// Extracts a route from a `LineString`. Accepts a bare geometry, a feature, or a feature
/// collection, in which case the first feature is used.
pub fn parse_route(raw: &str) -> Result<Vec<LonLat>> {
    let gj: GeoJson = raw.parse().context("route isn't valid GeoJSON")?;
    let geometry = match gj {
        GeoJson::Geometry(geometry) => Some(geometry),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .next()
            .and_then(|feature| feature.geometry),
    };
    match geometry.map(|geometry| geometry.value) {
        Some(Value::LineString(pts)) => positions(&pts),
        Some(other) => bail!("route must be a LineString, not a {}", type_name(&other)),
        None => bail!("route GeoJSON has no geometry"),
    }
}

/// Extracts the exterior ring of every `Polygon` and `MultiPolygon` in some GeoJSON. Other
/// geometry is skipped.
pub fn parse_obstacles(raw: &str) -> Result<Vec<Vec<LonLat>>> {
    let gj: GeoJson = raw.parse().context("obstacles aren't valid GeoJSON")?;
    let geometries: Vec<Geometry> = match gj {
        GeoJson::Geometry(geometry) => vec![geometry],
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
    };

    let mut obstacles = Vec::new();
    let mut skipped = 0;
    for geometry in geometries {
        match geometry.value {
            Value::Polygon(rings) => {
                if let Some(exterior) = rings.first() {
                    obstacles.push(positions(exterior)?);
                }
            }
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    if let Some(exterior) = rings.first() {
                        obstacles.push(positions(exterior)?);
                    }
                }
            }
            _ => {
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} obstacles that aren't polygons", skipped);
    }
    Ok(obstacles)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn positions(raw: &[Vec<f64>]) -> Result<Vec<LonLat>> {
    let mut pts = Vec::new();
    for pair in raw {
        if pair.len() < 2 {
            bail!("position has {} coordinates", pair.len());
        }
        pts.push(LonLat::new(pair[0], pair[1]));
    }
    Ok(pts)
}

/// One polygon feature per lane, in order, each with a `color`. The collection carries the
/// total `width` and the indices of any `dropped` lanes.
pub fn lanes_to_geojson(rendered: &RenderedLanes) -> FeatureCollection {
    let mut features = Vec::new();
    for lane in &rendered.lanes {
        let mut feature = Feature::from(lane.polygon.to_geojson(Some(&rendered.gps_bounds)));
        feature.set_property("color", lane.slot.color.clone());
        feature.set_property("lane", lane.slot.code.to_char().to_string());
        feature.set_property("index", lane.slot.index);
        feature.set_property("width", lane.slot.width.inner_meters());
        feature.set_property("offset", lane.slot.center_offset.inner_meters());
        features.push(feature);
    }

    let mut foreign_members = serde_json::Map::new();
    foreign_members.insert(
        "width".to_string(),
        serde_json::json!(rendered.total_width.inner_meters()),
    );
    foreign_members.insert(
        "dropped".to_string(),
        serde_json::json!(rendered
            .dropped
            .iter()
            .map(|lane| lane.index)
            .collect::<Vec<_>>()),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

pub fn space_to_geojson(polygons: &[SpacePolygon]) -> FeatureCollection {
    let features = polygons
        .iter()
        .map(|space| {
            let ring = space.exterior.iter().map(|pt| vec![pt.x(), pt.y()]).collect();
            let mut feature = Feature::from(Geometry::new(Value::Polygon(vec![ring])));
            feature.set_property("width", space.width.inner_meters());
            feature
        })
        .collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Takes GeoJSON with one `LineString` and a lane spec like "sd|ds", and returns a
/// `FeatureCollection` with one polygon per lane.
pub fn render_lanes_geojson(
    input: &str,
    lanes: &str,
    styles: &LaneStyleTable,
    opts: &RenderOptions,
) -> Result<String> {
    let route = parse_route(input)?;
    let spec = LaneSpec::parse(lanes)?;
    let rendered = render_lanes(&route, &spec, styles, opts)?;
    let gj = GeoJson::from(lanes_to_geojson(&rendered));
    Ok(serde_json::to_string(&gj)?)
}

/// Takes GeoJSON with one `LineString` and returns a `FeatureCollection` of negative space
/// polygons along it.
pub fn negative_space_geojson(input: &str, negative_space: &dyn NegativeSpace) -> Result<String> {
    let route = parse_route(input)?;
    let polygons = negative_space.calculate(&route)?;
    let gj = GeoJson::from(space_to_geojson(&polygons));
    Ok(serde_json::to_string(&gj)?)
}
