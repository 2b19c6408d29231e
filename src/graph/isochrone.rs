use crate::geo::PointKey;
use crate::graph::error::GraphError;
use crate::graph::NetworkGraph;

use geo::{BooleanOps, ConcaveHull, ConvexHull, Coord, MultiPoint, MultiPolygon, Point, Polygon};
use log::debug;
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

/// One isochrone ring: the reachable area between two network distances
/// from the source.
#[derive(Debug, Clone)]
pub struct IsochroneBand {
    interval: (f64, f64),
    geometry: MultiPolygon<f64>,
}

impl IsochroneBand {
    pub fn interval(&self) -> (f64, f64) {
        self.interval
    }

    /// Human-readable band label, e.g. `"250 to 500"`.
    pub fn label(&self) -> String {
        format!("{} to {}", self.interval.0, self.interval.1)
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }
}

/// Distance isochrones, outermost band first. Bands partition their
/// union: each ring had the next-smaller hull subtracted.
#[derive(Debug, Clone)]
pub struct Isochrones {
    bands: Vec<IsochroneBand>,
}

impl Isochrones {
    pub fn bands(&self) -> &[IsochroneBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl<Ty> NetworkGraph<Ty>
where
    Ty: EdgeType,
{
    /// Distance-bounded isochrones from a source node.
    ///
    /// `intervals` are meter bounds, ascending, starting at 0; each band
    /// `(lo, hi)` covers the nodes whose shortest-path length from the
    /// source is below `hi`. `precision` is the concave hull concavity.
    pub fn isochrones_from_distance(
        &self,
        from: Coord<f64>,
        intervals: &[f64],
        precision: f64,
    ) -> Result<Isochrones, GraphError> {
        validate_intervals(intervals)?;
        let source = self.node_index(from)?;

        let lengths =
            petgraph::algo::dijkstra(&self.graph, source, None, |edge| edge.weight().length());
        if lengths.len() <= 1 {
            return Err(GraphError::InvalidArgument(format!(
                "no reachable nodes from ({}, {})",
                from.x, from.y
            )));
        }

        // reached nodes in deterministic order; hull output must not
        // depend on hash iteration
        let mut reached = lengths
            .into_iter()
            .map(|(node, length)| (self.graph[node], length))
            .collect::<Vec<_>>();
        reached.sort_by_key(|(point, _)| PointKey::from(*point));

        // cumulative hulls, outermost band first
        let mut hulls = Vec::with_capacity(intervals.len() - 1);
        for pair in intervals.windows(2).rev() {
            let (lo, hi) = (pair[0], pair[1]);

            let mut points = reached
                .iter()
                .filter(|(_, length)| *length < hi)
                .map(|(point, _)| *point)
                .collect::<Vec<_>>();
            if lo == 0.0 {
                // the innermost band always contains the source itself
                points.push(Point(from));
            }
            debug!("Band {lo} to {hi}: {} reached nodes", points.len());

            hulls.push(((lo, hi), band_hull(points, precision)));
        }

        let bands = hulls
            .iter()
            .enumerate()
            .map(|(index, (interval, hull))| {
                let geometry = match hulls.get(index + 1) {
                    // bands must not overlap; carve the next-smaller hull out
                    Some((_, inner)) => hull.difference(inner),
                    None => MultiPolygon::from(hull.clone()),
                };
                IsochroneBand {
                    interval: *interval,
                    geometry,
                }
            })
            .collect();

        Ok(Isochrones { bands })
    }
}

fn validate_intervals(intervals: &[f64]) -> Result<(), GraphError> {
    if intervals.len() < 2 {
        return Err(GraphError::InvalidArgument(format!(
            "at least two interval bounds are required, got {intervals:?}"
        )));
    }
    if intervals[0] != 0.0 {
        return Err(GraphError::InvalidArgument(format!(
            "intervals must start with 0, got {intervals:?}"
        )));
    }
    if !intervals.windows(2).all(|pair| pair[0] < pair[1]) {
        return Err(GraphError::InvalidArgument(format!(
            "intervals must be sorted ascending, got {intervals:?}"
        )));
    }

    Ok(())
}

/// Concave hull of a band's point set; point sets too small to carry a
/// concavity fall back to the convex hull.
fn band_hull(points: Vec<Point<f64>>, precision: f64) -> Polygon<f64> {
    let multi = MultiPoint::new(points);
    if multi.0.len() < 4 {
        multi.convex_hull()
    } else {
        multi.concave_hull(precision)
    }
}
