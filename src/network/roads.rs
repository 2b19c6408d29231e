use crate::graph::error::GraphError;
use crate::graph::{DirectedNetwork, Isochrones, PathFeature, UndirectedNetwork};
use crate::osm::element::line_features;
use crate::osm::{BoundingBox, FeatureMode, NominatimApi, OverpassApi, QueryBuilder};
use crate::topology::{ArcFeature, RawLine, RawPoint, TopologyChecker, TopologyCleaner};

use geo::Coord;
use log::info;
use serde_json::{Map, Value};

/// A built road graph with its directedness resolved at runtime from the
/// feature mode.
pub enum RoadGraph {
    Directed(DirectedNetwork),
    Undirected(UndirectedNetwork),
}

impl RoadGraph {
    pub fn is_directed(&self) -> bool {
        matches!(self, RoadGraph::Directed(_))
    }

    pub fn node_count(&self) -> usize {
        match self {
            RoadGraph::Directed(graph) => graph.node_count(),
            RoadGraph::Undirected(graph) => graph.node_count(),
        }
    }

    pub fn edge_count(&self) -> usize {
        match self {
            RoadGraph::Directed(graph) => graph.edge_count(),
            RoadGraph::Undirected(graph) => graph.edge_count(),
        }
    }

    pub fn arcs(&self) -> Vec<&ArcFeature> {
        match self {
            RoadGraph::Directed(graph) => graph.arcs().collect(),
            RoadGraph::Undirected(graph) => graph.arcs().collect(),
        }
    }

    pub fn shortest_path(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
    ) -> Result<PathFeature, GraphError> {
        match self {
            RoadGraph::Directed(graph) => graph.shortest_path(from, to),
            RoadGraph::Undirected(graph) => graph.shortest_path(from, to),
        }
    }

    pub fn isochrones_from_distance(
        &self,
        from: Coord<f64>,
        intervals: &[f64],
        precision: f64,
    ) -> Result<Isochrones, GraphError> {
        match self {
            RoadGraph::Directed(graph) => graph.isochrones_from_distance(from, intervals, precision),
            RoadGraph::Undirected(graph) => {
                graph.isochrones_from_distance(from, intervals, precision)
            }
        }
    }
}

/// A road network for one feature mode: fetches raw ways, cleans their
/// topology, connects the caller's points and assembles the graph.
pub struct Roads {
    mode: FeatureMode,
    overpass: OverpassApi,
    nominatim: NominatimApi,
    nodes_to_connect: Vec<RawPoint>,
    graph: Option<RoadGraph>,
}

impl Roads {
    /// A road network handler for `vehicle` or `pedestrian`. The `poi`
    /// mode carries no routable ways; use [`crate::network::Pois`].
    pub fn new(mode: FeatureMode) -> crate::Result<Self> {
        if mode == FeatureMode::Poi {
            return Err(GraphError::InvalidArgument(
                "poi mode carries no routable ways".to_string(),
            )
            .into());
        }
        info!("Building {mode} data");

        Ok(Self {
            mode,
            overpass: OverpassApi::new(),
            nominatim: NominatimApi::new(),
            nodes_to_connect: Vec::new(),
            graph: None,
        })
    }

    /// External points to wire onto the network before the graph is
    /// built.
    pub fn with_nodes(mut self, nodes: Vec<RawPoint>) -> Self {
        self.nodes_to_connect = nodes;
        self
    }

    pub fn mode(&self) -> FeatureMode {
        self.mode
    }

    pub fn nodes_to_connect(&self) -> &[RawPoint] {
        &self.nodes_to_connect
    }

    /// Fetch and build from a bounding box.
    pub fn from_bbox(&mut self, bbox: &BoundingBox) -> crate::Result<()> {
        info!("From {}", bbox.filter());
        let query = QueryBuilder::new(self.mode).from_bbox(bbox);
        self.ingest(&query)
    }

    /// Fetch and build from a located place name.
    pub fn from_location(&mut self, place: &str) -> crate::Result<()> {
        let located = self.nominatim.locate(place)?;
        info!("From {}", located.display_name);

        let query = QueryBuilder::new(self.mode).from_area(located.area_id());
        self.ingest(&query)
    }

    fn ingest(&mut self, query: &str) -> crate::Result<()> {
        let payload = self.overpass.query(query)?;
        self.build_from_lines(line_features(&payload))
    }

    /// Clean a raw line batch and assemble the graph. The offline entry
    /// point behind both fetch paths.
    pub fn build_from_lines(&mut self, lines: Vec<RawLine>) -> crate::Result<()> {
        let arcs = TopologyCleaner::new(&lines, &self.nodes_to_connect)?.run()?;

        let graph = if self.mode.directed() {
            RoadGraph::Directed(DirectedNetwork::from_arcs(arcs)?)
        } else {
            RoadGraph::Undirected(UndirectedNetwork::from_arcs(arcs)?)
        };
        info!("Graph built");

        self.graph = Some(graph);
        Ok(())
    }

    pub fn graph(&self) -> Option<&RoadGraph> {
        self.graph.as_ref()
    }

    /// One record per graph arc (reverse twins included in vehicle
    /// mode), or `None` before a build.
    pub fn data(&self) -> Option<Vec<Map<String, Value>>> {
        self.graph
            .as_ref()
            .map(|graph| graph.arcs().into_iter().map(ArcFeature::record).collect())
    }

    /// Provenance tally over the built graph's arcs.
    pub fn topology_checker(&self) -> Option<TopologyChecker> {
        self.graph
            .as_ref()
            .map(|graph| TopologyChecker::new(graph.arcs()))
    }
}
