use crate::topology::{RawLine, RawPoint};

use geo::{Coord, LineString, Point};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;

const OSM_URL: &str = "https://www.openstreetmap.org";

/// A decoded Overpass response: the `elements` array is the only part
/// the pipeline reads.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassPayload {
    pub elements: Vec<OverpassElement>,
}

/// One Overpass element. Ways carry `geometry` (thanks to `out geom`),
/// nodes carry `lat`/`lon`.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub geometry: Option<Vec<LatLon>>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    /// Tag carry-through plus the OSM identity attributes every record
    /// exposes: `id` and `osm_url`.
    fn attributes(&self) -> BTreeMap<String, String> {
        let mut attributes = self.tags.clone().unwrap_or_default();
        attributes.insert("id".to_string(), self.id.to_string());
        attributes.insert(
            "osm_url".to_string(),
            format!("{OSM_URL}/{}/{}", self.kind, self.id),
        );
        attributes
    }
}

/// Shape the payload's ways into raw lines, ids assigned sequentially
/// from 1. Ways without geometry are dropped.
pub fn line_features(payload: &OverpassPayload) -> Vec<RawLine> {
    payload
        .elements
        .iter()
        .filter(|element| element.kind == "way")
        .filter_map(|element| {
            let Some(geometry) = &element.geometry else {
                debug!("Dropping way {} without geometry", element.id);
                return None;
            };

            let coords = geometry
                .iter()
                .map(|position| Coord {
                    x: position.lon,
                    y: position.lat,
                })
                .collect::<Vec<_>>();
            Some((element, LineString::from(coords)))
        })
        .zip(1..)
        .map(|((element, geometry), id)| RawLine {
            id,
            geometry,
            attributes: element.attributes(),
        })
        .collect()
}

/// Shape the payload's nodes into raw points, ids assigned sequentially
/// from 1. Nodes without a position are dropped.
pub fn point_features(payload: &OverpassPayload) -> Vec<RawPoint> {
    payload
        .elements
        .iter()
        .filter(|element| element.kind == "node")
        .filter_map(|element| {
            let (Some(lat), Some(lon)) = (element.lat, element.lon) else {
                debug!("Dropping node {} without position", element.id);
                return None;
            };
            Some((element, Point::new(lon, lat)))
        })
        .zip(1..)
        .map(|((element, geometry), id)| RawPoint {
            id,
            geometry,
            attributes: element.attributes(),
        })
        .collect()
}
