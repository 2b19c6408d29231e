//! Assembly of cleaned arcs into a routable graph, plus the two analytic
//! queries: shortest paths and distance isochrones.

#[doc(hidden)]
pub mod error;
pub mod isochrone;
pub mod path;

#[doc(inline)]
pub use isochrone::{IsochroneBand, Isochrones};
#[doc(inline)]
pub use path::{PathFeature, PathGeometry};

use crate::geo::PointKey;
use crate::graph::error::GraphError;
use crate::topology::ArcFeature;

use geo::{Coord, Point};
use indexmap::IndexMap;
use log::info;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::{Directed, EdgeType, Undirected};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::fmt::{Debug, Formatter};

const ONEWAY_KEY: &str = "oneway";
const ONEWAY_FORWARD: &str = "yes";
const JUNCTION_KEY: &str = "junction";
/// Junction layouts that model a one-way loop on their own; their arcs
/// never get a reverse twin.
const ONE_WAY_JUNCTIONS: [&str; 2] = ["roundabout", "jughandle"];

/// The routing graph: nodes are coordinates deduplicated by exact bit
/// identity, edges are arcs keyed by `topo_uuid`. Directedness is a
/// type-level property fixed at construction.
///
/// A built graph is read-only; queries take `&self` and may run
/// concurrently.
pub struct NetworkGraph<Ty>
where
    Ty: EdgeType,
{
    pub(crate) graph: Graph<Point<f64>, ArcFeature, Ty>,
    nodes: FxHashMap<PointKey, NodeIndex>,
    edges: IndexMap<String, EdgeIndex>,
}

pub type DirectedNetwork = NetworkGraph<Directed>;
pub type UndirectedNetwork = NetworkGraph<Undirected>;

impl<Ty> Debug for NetworkGraph<Ty>
where
    Ty: EdgeType,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NetworkGraph with {} nodes and {} arcs",
            self.nodes.len(),
            self.edges.len()
        )
    }
}

impl<Ty> Default for NetworkGraph<Ty>
where
    Ty: EdgeType,
{
    fn default() -> Self {
        Self {
            graph: Graph::with_capacity(0, 0),
            nodes: FxHashMap::default(),
            edges: IndexMap::new(),
        }
    }
}

impl<Ty> NetworkGraph<Ty>
where
    Ty: EdgeType,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_directed(&self) -> bool {
        Ty::is_directed()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Arcs in insertion order.
    pub fn arcs(&self) -> impl Iterator<Item = &ArcFeature> {
        self.graph.edge_weights()
    }

    /// One record per arc, in insertion order.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.arcs().map(ArcFeature::record).collect()
    }

    pub fn arc(&self, topo_uuid: &str) -> Option<&ArcFeature> {
        self.edges
            .get(topo_uuid)
            .and_then(|edge| self.graph.edge_weight(*edge))
    }

    pub fn contains_node(&self, coord: Coord<f64>) -> bool {
        self.nodes.contains_key(&PointKey::from(coord))
    }

    pub(crate) fn node_index(&self, coord: Coord<f64>) -> Result<NodeIndex, GraphError> {
        self.nodes
            .get(&PointKey::from(coord))
            .copied()
            .ok_or_else(|| {
                GraphError::NodeNotFound(format!("({}, {}) is not a graph node", coord.x, coord.y))
            })
    }

    fn intern_node(&mut self, coord: Coord<f64>) -> NodeIndex {
        *self
            .nodes
            .entry(PointKey::from(coord))
            .or_insert_with(|| self.graph.add_node(Point(coord)))
    }

    /// Insert one arc as an edge between its endpoint coordinates.
    /// Re-emitting a `topo_uuid` is an invariant violation upstream and
    /// fatal here.
    pub fn add_arc(&mut self, arc: ArcFeature) -> Result<(), GraphError> {
        let uuid = arc.topo_uuid();
        if self.edges.contains_key(&uuid) {
            return Err(GraphError::DuplicateArc(uuid));
        }

        let from = self.intern_node(arc.from_point());
        let to = self.intern_node(arc.to_point());
        let edge = self.graph.add_edge(from, to, arc);
        self.edges.insert(uuid, edge);

        Ok(())
    }
}

impl DirectedNetwork {
    /// Assemble a directed (vehicle) graph. Every arc that is neither
    /// one-way nor part of a one-way junction loop is expanded into a
    /// reverse twin between the swapped endpoints.
    pub fn from_arcs(arcs: impl IntoIterator<Item = ArcFeature>) -> Result<Self, GraphError> {
        let mut network = Self::new();

        for arc in arcs {
            let twin = expands_backward(&arc).then(|| arc.reversed());
            network.add_arc(arc)?;
            if let Some(twin) = twin {
                network.add_arc(twin)?;
            }
        }

        info!(
            "Directed graph built: {} nodes, {} edges",
            network.node_count(),
            network.edge_count()
        );
        Ok(network)
    }
}

impl UndirectedNetwork {
    /// Assemble an undirected graph: forward edges only, traversable both
    /// ways by construction.
    pub fn from_arcs(arcs: impl IntoIterator<Item = ArcFeature>) -> Result<Self, GraphError> {
        let mut network = Self::new();

        for arc in arcs {
            network.add_arc(arc)?;
        }

        info!(
            "Undirected graph built: {} nodes, {} edges",
            network.node_count(),
            network.edge_count()
        );
        Ok(network)
    }
}

fn expands_backward(arc: &ArcFeature) -> bool {
    if arc
        .attribute(JUNCTION_KEY)
        .is_some_and(|junction| ONE_WAY_JUNCTIONS.contains(&junction))
    {
        return false;
    }

    arc.attribute(ONEWAY_KEY) != Some(ONEWAY_FORWARD)
}
