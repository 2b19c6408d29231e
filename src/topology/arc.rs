use crate::geo::ellipsoidal_length;

use geo::{Coord, LineString};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use strum::Display;

/// Provenance of an arc with respect to the raw line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TopoStatus {
    /// The raw line passed through untouched.
    Unchanged,
    /// The raw line was chopped at an intersection coordinate.
    Split,
    /// A synthetic connector linking an external point to the network.
    Added,
}

/// Effective orientation of an arc's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

/// One edge of the cleaned network: oriented geometry, provenance,
/// carry-through attributes and the derived WGS84 ellipsoidal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcFeature {
    uuid: String,
    geometry: LineString<f64>,
    status: TopoStatus,
    direction: Direction,
    attributes: BTreeMap<String, String>,
    length: f64,
}

impl ArcFeature {
    pub fn new(
        uuid: impl Into<String>,
        geometry: LineString<f64>,
        status: TopoStatus,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        let length = ellipsoidal_length(&geometry);

        Self {
            uuid: uuid.into(),
            geometry,
            status,
            direction: Direction::Forward,
            attributes,
            length,
        }
    }

    /// Stable identifier: `{parent}[_{split}][_{sub}]_{direction}`.
    pub fn topo_uuid(&self) -> String {
        format!("{}_{}", self.uuid, self.direction)
    }

    /// Identifier without the direction suffix.
    pub fn base_uuid(&self) -> &str {
        &self.uuid
    }

    pub fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    pub fn from_point(&self) -> Coord<f64> {
        self.geometry.0[0]
    }

    pub fn to_point(&self) -> Coord<f64> {
        self.geometry.0[self.geometry.0.len() - 1]
    }

    pub fn status(&self) -> TopoStatus {
        self.status
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Ellipsoidal length in meters.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The backward twin: same base uuid and attributes, geometry
    /// reversed. Length is orientation-independent and carried over.
    pub fn reversed(&self) -> Self {
        let mut geometry = self.geometry.clone();
        geometry.0.reverse();

        Self {
            uuid: self.uuid.clone(),
            geometry,
            status: self.status,
            direction: Direction::Backward,
            attributes: self.attributes.clone(),
            length: self.length,
        }
    }

    /// The record surface handed to external consumers: identifier,
    /// provenance, direction, geometry and every carry-through attribute.
    pub fn record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("topo_uuid".to_string(), json!(self.topo_uuid()));
        record.insert("topo_status".to_string(), json!(self.status.to_string()));
        record.insert("direction".to_string(), json!(self.direction.to_string()));
        record.insert(
            "geometry".to_string(),
            Value::Array(
                self.geometry
                    .coords()
                    .map(|coord| json!([coord.x, coord.y]))
                    .collect(),
            ),
        );

        for (key, value) in &self.attributes {
            record.insert(key.clone(), json!(value));
        }

        record
    }
}
