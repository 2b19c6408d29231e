use crate::geo::PointKey;
use crate::graph::error::GraphError;
use crate::graph::NetworkGraph;
use crate::topology::ArcFeature;

use geo::{Coord, LineString, MultiLineString};
use log::debug;
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;
use serde_json::{Map, Value};

/// Merged path geometry. A `MultiLine` means two adjacent arcs did not
/// share an endpoint coordinate — segments are kept, never dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum PathGeometry {
    Line(LineString<f64>),
    MultiLine(MultiLineString<f64>),
}

impl PathGeometry {
    /// Ellipsoidal length of the merged geometry in meters.
    pub fn length(&self) -> f64 {
        match self {
            PathGeometry::Line(line) => crate::geo::ellipsoidal_length(line),
            PathGeometry::MultiLine(lines) => {
                lines.0.iter().map(crate::geo::ellipsoidal_length).sum()
            }
        }
    }
}

/// One shortest path: the ordered arcs it traverses.
#[derive(Debug, Clone)]
pub struct PathFeature {
    arcs: Vec<ArcFeature>,
}

impl PathFeature {
    pub(crate) fn from_arcs(arcs: Vec<ArcFeature>) -> Self {
        Self { arcs }
    }

    pub fn arcs(&self) -> &[ArcFeature] {
        &self.arcs
    }

    /// Sum of the traversed arc lengths in meters.
    pub fn length(&self) -> f64 {
        self.arcs.iter().map(ArcFeature::length).sum()
    }

    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.arcs.iter().map(ArcFeature::record).collect()
    }

    /// Merge the traversed arcs' own geometries end to end. Arc storage
    /// orientation is independent of walk direction, so each arc is
    /// flipped as needed to continue from the previous one.
    pub fn geometry(&self) -> PathGeometry {
        let mut arcs = self.arcs.iter();
        let Some(first) = arcs.next() else {
            return PathGeometry::Line(LineString::new(Vec::new()));
        };

        let mut head = first.geometry().0.clone();
        if let Some(second) = self.arcs.get(1) {
            // orient the head so its tail coordinate flows into the
            // second arc
            let start = PointKey::from(head[0]);
            if start == PointKey::from(second.from_point())
                || start == PointKey::from(second.to_point())
            {
                head.reverse();
            }
        }

        let mut parts: Vec<Vec<Coord<f64>>> = Vec::new();
        let mut current = head;
        for arc in arcs {
            let mut coords = arc.geometry().0.clone();
            let tail = PointKey::from(current[current.len() - 1]);

            if PointKey::from(coords[0]) == tail {
                current.extend(coords.into_iter().skip(1));
            } else if PointKey::from(coords[coords.len() - 1]) == tail {
                coords.reverse();
                current.extend(coords.into_iter().skip(1));
            } else {
                debug!("Path arcs are not contiguous at {:?}", arc.topo_uuid());
                parts.push(std::mem::replace(&mut current, coords));
            }
        }
        parts.push(current);

        if parts.len() == 1 {
            PathGeometry::Line(LineString::from(parts.remove(0)))
        } else {
            PathGeometry::MultiLine(MultiLineString::new(
                parts.into_iter().map(LineString::from).collect(),
            ))
        }
    }
}

impl<Ty> NetworkGraph<Ty>
where
    Ty: EdgeType,
{
    /// Length-weighted shortest path between two node coordinates.
    ///
    /// The endpoints must be distinct graph nodes; an unreachable target
    /// is reported as `NodeNotFound` naming both coordinates.
    pub fn shortest_path(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
    ) -> Result<PathFeature, GraphError> {
        if PointKey::from(from) == PointKey::from(to) {
            return Err(GraphError::InvalidArgument(
                "points must be different".to_string(),
            ));
        }

        let start = self.node_index(from)?;
        let goal = self.node_index(to)?;

        debug!("Routing ({}, {}) -> ({}, {})", from.x, from.y, to.x, to.y);
        let (_, nodes) = petgraph::algo::astar(
            &self.graph,
            start,
            |node| node == goal,
            |edge| edge.weight().length(),
            |_| 0.0,
        )
        .ok_or_else(|| {
            GraphError::NodeNotFound(format!(
                "({}, {}) is not reachable from ({}, {})",
                to.x, to.y, from.x, from.y
            ))
        })?;

        let mut arcs = Vec::with_capacity(nodes.len().saturating_sub(1));
        for pair in nodes.windows(2) {
            // parallel edges may exist between a node pair; the cheapest
            // one is the edge the path cost accounted for
            let edge = self
                .graph
                .edges_connecting(pair[0], pair[1])
                .min_by(|a, b| a.weight().length().total_cmp(&b.weight().length()))
                .ok_or_else(|| {
                    GraphError::NodeNotFound(format!(
                        "no edge between consecutive path nodes {:?} and {:?}",
                        self.graph[pair[0]].x_y(),
                        self.graph[pair[1]].x_y()
                    ))
                })?;
            arcs.push(edge.weight().clone());
        }

        Ok(PathFeature { arcs })
    }
}
