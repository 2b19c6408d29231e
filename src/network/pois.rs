use crate::osm::element::point_features;
use crate::osm::{BoundingBox, FeatureMode, NominatimApi, OverpassApi, QueryBuilder};
use crate::topology::RawPoint;

use log::info;
use serde_json::{Map, Value};

/// Points of interest for a geographic filter. No graph is involved; the
/// extracted points can be handed to [`crate::network::Roads`] as nodes
/// to connect.
#[derive(Default)]
pub struct Pois {
    overpass: OverpassApi,
    nominatim: NominatimApi,
    points: Vec<RawPoint>,
}

impl Pois {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bbox(&mut self, bbox: &BoundingBox) -> crate::Result<&[RawPoint]> {
        let query = QueryBuilder::new(FeatureMode::Poi).from_bbox(bbox);
        self.ingest(&query)
    }

    pub fn from_location(&mut self, place: &str) -> crate::Result<&[RawPoint]> {
        let located = self.nominatim.locate(place)?;
        info!("From {}", located.display_name);

        let query = QueryBuilder::new(FeatureMode::Poi).from_area(located.area_id());
        self.ingest(&query)
    }

    fn ingest(&mut self, query: &str) -> crate::Result<&[RawPoint]> {
        let payload = self.overpass.query(query)?;
        self.points = point_features(&payload);
        info!("{} POIs extracted", self.points.len());

        Ok(&self.points)
    }

    pub fn points(&self) -> &[RawPoint] {
        &self.points
    }

    /// One record per POI.
    pub fn data(&self) -> Vec<Map<String, Value>> {
        self.points.iter().map(RawPoint::record).collect()
    }
}
