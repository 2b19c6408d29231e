use crate::geo::{buffered_extent, buffered_rect, PointKey};
use crate::graph::error::GraphError;
use crate::graph::{Isochrones, PathFeature};
use crate::network::roads::Roads;
use crate::osm::{BoundingBox, FeatureMode};
use crate::topology::RawPoint;

use geo::Point;
use log::info;
use rustc_hash::FxHashSet;

/// Geodesic margin added around the step points when deriving the fetch
/// bounding box.
const STEP_BUFFER_METERS: f64 = 100.0;

/// Route and isochrone analysis over a fetched network. The step points
/// are wired onto the network as connector targets before querying.
pub struct GraphAnalysis {
    roads: Roads,
    steps: Vec<Point<f64>>,
}

impl GraphAnalysis {
    /// `steps` must be ordered; duplicates are connected once.
    pub fn new(mode: FeatureMode, steps: Vec<Point<f64>>) -> crate::Result<Self> {
        let mut seen = FxHashSet::default();
        let nodes = steps
            .iter()
            .filter(|point| seen.insert(PointKey::from(**point)))
            .zip(1..)
            .map(|(point, id)| RawPoint::new(id, *point))
            .collect::<Vec<_>>();

        let roads = Roads::new(mode)?.with_nodes(nodes);
        Ok(Self { roads, steps })
    }

    pub fn roads(&self) -> &Roads {
        &self.roads
    }

    /// Shortest paths between each consecutive step pair.
    pub fn shortest_paths(&mut self) -> crate::Result<Vec<PathFeature>> {
        if self.steps.len() < 2 {
            return Err(GraphError::InvalidArgument(
                "at least two points are required to compute a path".to_string(),
            )
            .into());
        }

        let extent = buffered_extent(&self.steps, STEP_BUFFER_METERS).ok_or_else(|| {
            GraphError::InvalidArgument("no step points to derive a bounding box".to_string())
        })?;
        self.roads.from_bbox(&BoundingBox::from_rect(extent))?;

        let graph = self
            .roads
            .graph()
            .ok_or_else(|| GraphError::InvalidArgument("graph was not built".to_string()))?;

        let mut paths = Vec::with_capacity(self.steps.len() - 1);
        for pair in self.steps.windows(2) {
            let path = graph.shortest_path(pair[0].0, pair[1].0)?;
            info!(
                "Shortest path built from ({}, {}) to ({}, {})",
                pair[0].x(),
                pair[0].y(),
                pair[1].x(),
                pair[1].y()
            );
            paths.push(path);
        }

        Ok(paths)
    }

    /// Distance isochrones around a single step point.
    pub fn isochrones_from_distance(
        &mut self,
        intervals: &[f64],
        precision: f64,
    ) -> crate::Result<Isochrones> {
        let [step] = self.steps.as_slice() else {
            return Err(GraphError::InvalidArgument(
                "exactly one point is required to compute isochrones".to_string(),
            )
            .into());
        };
        let step = *step;

        let reach = intervals.iter().copied().fold(0.0, f64::max) + STEP_BUFFER_METERS;
        let rect = buffered_rect(step, reach);
        self.roads.from_bbox(&BoundingBox::from_rect(rect))?;

        let graph = self
            .roads
            .graph()
            .ok_or_else(|| GraphError::InvalidArgument("graph was not built".to_string()))?;

        let isochrones = graph.isochrones_from_distance(step.0, intervals, precision)?;
        info!("Isochrones built from ({}, {})", step.x(), step.y());
        Ok(isochrones)
    }
}
