use crate::geo::{densify, PointKey};
use crate::topology::arc::{ArcFeature, TopoStatus};
use crate::topology::error::TopologyError;

use geo::{Coord, EuclideanDistance, LineString, Point};
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use rstar::{Envelope, RTree, RTreeObject, AABB};
use rustc_hash::FxHashSet;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Densification level used to sample candidate attachment positions on a
/// host line. Raising it improves node connections but generates more
/// samples per line.
pub const INTERPOLATION_LEVEL: usize = 7;

/// Densification level applied to every emitted arc in improved-line mode.
pub const INTERPOLATION_LINE_LEVEL: usize = 4;

/// How many host-line bounding boxes the spatial index hands back per
/// point before the exact distance re-rank.
const NEAREST_LINE_CANDIDATES: usize = 10;

/// A coordinate shared by this many occurrences is a topological node.
const INTERSECTION_MIN_OCCURRENCES: usize = 2;

/// One raw way: a polyline of at least two coordinates plus its
/// carry-through attributes. `id` must be unique within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    pub id: i64,
    pub geometry: LineString<f64>,
    pub attributes: BTreeMap<String, String>,
}

impl RawLine {
    pub fn new(id: i64, geometry: LineString<f64>) -> Self {
        Self {
            id,
            geometry,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// One external point to attach to the network. `id` must be unique
/// within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub id: i64,
    pub geometry: Point<f64>,
    pub attributes: BTreeMap<String, String>,
}

impl RawPoint {
    pub fn new(id: i64, geometry: Point<f64>) -> Self {
        Self {
            id,
            geometry,
            attributes: BTreeMap::new(),
        }
    }

    /// The record surface for POI consumers: geometry plus every
    /// carry-through attribute.
    pub fn record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert(
            "geometry".to_string(),
            json!([self.geometry.x(), self.geometry.y()]),
        );
        for (key, value) in &self.attributes {
            record.insert(key.clone(), json!(value));
        }
        record
    }
}

/// A line being reworked by the cleaner: either a raw way whose
/// coordinate list grows attachment vertices, or a synthetic connector.
#[derive(Debug, Clone)]
struct WorkingLine {
    uuid: String,
    coords: Vec<Coord<f64>>,
    status: TopoStatus,
    attributes: BTreeMap<String, String>,
}

/// R-tree entry for one host line's bounding box. The index is only a
/// coarse pruner; candidates are re-ranked by exact distance.
struct LineEnvelope {
    id: i64,
    envelope: AABB<Point<f64>>,
}

impl RTreeObject for LineEnvelope {
    type Envelope = AABB<Point<f64>>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl rstar::PointDistance for LineEnvelope {
    fn distance_2(&self, point: &Point<f64>) -> f64 {
        self.envelope.distance_2(point)
    }
}

/// Result of attaching one bucket of points to its host line.
struct BucketOutcome {
    host: i64,
    coords: Vec<Coord<f64>>,
    connectors: Vec<(i64, Vec<Coord<f64>>)>,
}

/// Rebuilds a raw line collection into a noded network: every line is
/// split at every true intersection, every external point is wired to its
/// nearest line by a synthetic connector, and each emitted arc carries
/// its provenance.
pub struct TopologyCleaner {
    lines: BTreeMap<i64, WorkingLine>,
    points: BTreeMap<i64, Point<f64>>,
    improve_lines: bool,
}

impl TopologyCleaner {
    pub fn new(lines: &[RawLine], points: &[RawPoint]) -> Result<Self, TopologyError> {
        if lines.is_empty() {
            return Err(TopologyError::InvalidArgument(
                "input line set is empty".to_string(),
            ));
        }

        let lines = lines
            .iter()
            .map(|line| {
                let working = WorkingLine {
                    uuid: line.id.to_string(),
                    coords: line.geometry.0.clone(),
                    status: TopoStatus::Unchanged,
                    attributes: line.attributes.clone(),
                };
                (line.id, working)
            })
            .collect();

        let points = points
            .iter()
            .map(|point| (point.id, point.geometry))
            .collect();

        Ok(Self {
            lines,
            points,
            improve_lines: false,
        })
    }

    /// Emit densified two-vertex sub-arcs instead of whole arcs, for
    /// callers wanting finer routing granularity at the cost of more
    /// edges.
    pub fn improved_lines(mut self, enabled: bool) -> Self {
        self.improve_lines = enabled;
        self
    }

    /// Run the full pipeline. Emitted arcs are ordered by parent line id,
    /// then split index, then sub index, with connectors after the
    /// network lines — byte-identical across runs on identical input.
    pub fn run(mut self) -> Result<Vec<ArcFeature>, TopologyError> {
        info!("Network cleaning...");

        let connectors = if self.points.is_empty() {
            BTreeMap::new()
        } else {
            self.connect_points()?
        };

        let intersections = self.find_intersections(&connectors);
        debug!("Found {} intersection coordinates", intersections.len());

        info!("Build lines");
        let mut output = Vec::new();
        for line in self.lines.values() {
            self.emit_line(line, &intersections, &mut output)?;
        }
        for connector in connectors.values() {
            self.emit_line(connector, &intersections, &mut output)?;
        }

        info!("Network cleaning done: {} arcs", output.len());
        Ok(output)
    }

    /// Attach every external point to its nearest line. Returns the
    /// connector set keyed by point id; host lines have their coordinate
    /// lists rewritten in place.
    fn connect_points(&mut self) -> Result<BTreeMap<i64, WorkingLine>, TopologyError> {
        info!("Starting: attaching {} points to the network", self.points.len());

        // The index is built and queried serially; only the per-host
        // bucket processing below runs in parallel.
        let envelopes = self
            .lines
            .iter()
            .filter_map(|(id, line)| Some(LineEnvelope { id: *id, envelope: coords_envelope(&line.coords)? }))
            .collect::<Vec<_>>();
        let tree = RTree::bulk_load(envelopes);

        let geometries = self
            .lines
            .iter()
            .map(|(id, line)| (*id, LineString::from(line.coords.clone())))
            .collect::<BTreeMap<_, _>>();

        let mut buckets: BTreeMap<i64, Vec<(i64, Point<f64>)>> = BTreeMap::new();
        for (point_id, point) in &self.points {
            if let Some(host) = nearest_line(&tree, &geometries, *point) {
                buckets.entry(host).or_default().push((*point_id, *point));
            }
        }

        let buckets = buckets.into_iter().collect::<Vec<_>>();
        let outcomes = buckets
            .par_iter()
            .map(|(host, points)| self.attach_bucket(*host, points))
            .collect::<Result<Vec<_>, TopologyError>>()?;

        // Flush per-bucket buffers in host id order so the emitted
        // network stays deterministic regardless of thread scheduling.
        let mut connectors = BTreeMap::new();
        for outcome in outcomes {
            if let Some(line) = self.lines.get_mut(&outcome.host) {
                line.coords = outcome.coords;
            }
            for (point_id, coords) in outcome.connectors {
                let connector = WorkingLine {
                    uuid: format!("added_{point_id}"),
                    coords,
                    status: TopoStatus::Added,
                    attributes: BTreeMap::new(),
                };
                connectors.insert(point_id, connector);
            }
        }

        info!("Done: {} connectors materialized", connectors.len());
        Ok(connectors)
    }

    /// Attach one bucket of points to its host line: nearest densified
    /// sample becomes the attachment coordinate, the host is rebuilt in
    /// densified order so each attachment lands between its true
    /// neighbors.
    fn attach_bucket(
        &self,
        host: i64,
        points: &[(i64, Point<f64>)],
    ) -> Result<BucketOutcome, TopologyError> {
        let line = &self.lines[&host];
        let samples = densify(&line.coords, INTERPOLATION_LEVEL)?;
        let sample_tree = RTree::bulk_load(samples.iter().map(|coord| Point(*coord)).collect());

        let mut keep: FxHashSet<PointKey> =
            line.coords.iter().map(|coord| PointKey::from(*coord)).collect();

        let mut connectors = Vec::with_capacity(points.len());
        for (point_id, point) in points {
            let attachment = sample_tree.nearest_neighbor(point).ok_or_else(|| {
                TopologyError::InvalidArgument(format!("line {host} has no coordinates"))
            })?;

            keep.insert(PointKey::from(*attachment));
            // A degenerate connector (point already on a vertex) is still
            // materialized here: its doubled coordinate is what makes the
            // intersection finder split the host at that vertex. It is
            // discarded at emission time, never surfaced.
            connectors.push((*point_id, vec![point.0, attachment.0]));
        }

        let coords = samples
            .into_iter()
            .filter(|coord| keep.contains(&PointKey::from(*coord)))
            .collect();

        Ok(BucketOutcome {
            host,
            coords,
            connectors,
        })
    }

    /// A coordinate appearing at least twice across all working lines —
    /// extended network lines and connectors alike — is a topological
    /// node.
    fn find_intersections(&self, connectors: &BTreeMap<i64, WorkingLine>) -> FxHashSet<PointKey> {
        self.lines
            .values()
            .chain(connectors.values())
            .flat_map(|line| line.coords.iter().map(|coord| PointKey::from(*coord)))
            .counts()
            .into_iter()
            .filter(|(_, count)| *count >= INTERSECTION_MIN_OCCURRENCES)
            .map(|(key, _)| key)
            .collect()
    }

    /// Split one working line at its interior intersection coordinates
    /// and push the resulting arcs.
    fn emit_line(
        &self,
        line: &WorkingLine,
        intersections: &FxHashSet<PointKey>,
        output: &mut Vec<ArcFeature>,
    ) -> Result<(), TopologyError> {
        let distinct = line
            .coords
            .iter()
            .map(|coord| PointKey::from(*coord))
            .collect::<FxHashSet<_>>();
        if distinct.len() < 2 {
            debug!("Discarding degenerate line {}", line.uuid);
            return Ok(());
        }

        let pieces = split_at_intersections(&line.coords, intersections);
        if pieces.len() > 1 {
            for (index, piece) in pieces.iter().enumerate() {
                let uuid = format!("{}_{index}", line.uuid);
                self.emit_piece(&uuid, piece, TopoStatus::Split, &line.attributes, output)?;
            }
        } else {
            self.emit_piece(&line.uuid, &pieces[0], line.status, &line.attributes, output)?;
        }

        Ok(())
    }

    fn emit_piece(
        &self,
        uuid: &str,
        coords: &[Coord<f64>],
        status: TopoStatus,
        attributes: &BTreeMap<String, String>,
        output: &mut Vec<ArcFeature>,
    ) -> Result<(), TopologyError> {
        if self.improve_lines {
            let densified = densify(coords, INTERPOLATION_LINE_LEVEL)?;
            for (sub, pair) in densified.windows(2).enumerate() {
                output.push(ArcFeature::new(
                    format!("{uuid}_{sub}"),
                    LineString::from(pair.to_vec()),
                    status,
                    attributes.clone(),
                ));
            }
        } else {
            output.push(ArcFeature::new(
                uuid,
                LineString::from(coords.to_vec()),
                status,
                attributes.clone(),
            ));
        }

        Ok(())
    }
}

/// Choose the host line for a point: up to `NEAREST_LINE_CANDIDATES`
/// index candidates, re-ranked by exact point-to-linestring distance.
/// Ties break toward the smallest line id; an exact zero distance means
/// the point already sits on that line.
fn nearest_line(
    tree: &RTree<LineEnvelope>,
    geometries: &BTreeMap<i64, LineString<f64>>,
    point: Point<f64>,
) -> Option<i64> {
    let mut best: Option<(f64, i64)> = None;

    for entry in tree.nearest_neighbor_iter(&point).take(NEAREST_LINE_CANDIDATES) {
        let distance = point.euclidean_distance(&geometries[&entry.id]);

        let candidate = (distance, entry.id);
        if best.map_or(true, |current| candidate < current) {
            best = Some(candidate);
        }
        if distance == 0.0 {
            break;
        }
    }

    best.map(|(_, id)| id)
}

/// Walk a coordinate list and cut it at every interior intersection. The
/// cut coordinate closes one child and opens the next; endpoints are
/// natural node candidates already and never cut.
fn split_at_intersections(
    coords: &[Coord<f64>],
    intersections: &FxHashSet<PointKey>,
) -> Vec<Vec<Coord<f64>>> {
    let last = coords.len() - 1;

    let mut pieces = Vec::new();
    let mut current = Vec::new();
    for (index, coord) in coords.iter().enumerate() {
        current.push(*coord);

        if index != 0 && index != last && intersections.contains(&PointKey::from(*coord)) {
            pieces.push(current);
            current = vec![*coord];
        }
    }
    pieces.push(current);

    pieces
}

/// Bounding box of a coordinate list, or `None` when it is empty.
fn coords_envelope(coords: &[Coord<f64>]) -> Option<AABB<Point<f64>>> {
    let first = coords.first()?;

    let mut min = *first;
    let mut max = *first;
    for coord in coords {
        min.x = min.x.min(coord.x);
        min.y = min.y.min(coord.y);
        max.x = max.x.max(coord.x);
        max.y = max.y.max(coord.y);
    }

    Some(AABB::from_corners(Point(min), Point(max)))
}
