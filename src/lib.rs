//! # roam
//!
//! Routable OSM Arc Mesh. Turns raw OpenStreetMap way/node collections
//! into a topologically correct arc network, assembles it into a routing
//! graph and answers shortest-path and distance-isochrone queries on it.
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`geo`]      | Densification, ellipsoidal lengths, coordinate identity   |
//! | [`topology`] | Arc records, the topology cleaner, the topology checker   |
//! | [`graph`]    | Network graph assembly, shortest paths, isochrones        |
//! | [`osm`]      | Feature modes, Overpass/Nominatim clients, element decode |
//! | [`network`]  | High-level `Pois` / `Roads` / `GraphAnalysis` facade      |

use crate::geo::error::GeoError;
use crate::graph::error::GraphError;
use crate::osm::error::ApiError;
use crate::topology::error::TopologyError;

pub mod geo;
pub mod graph;
pub mod network;
pub mod osm;
pub mod topology;

#[doc(inline)]
pub use crate::geo::PointKey;
#[doc(inline)]
pub use crate::graph::{DirectedNetwork, NetworkGraph, UndirectedNetwork};
#[doc(inline)]
pub use crate::osm::FeatureMode;
#[doc(inline)]
pub use crate::topology::{ArcFeature, RawLine, RawPoint, TopologyCleaner};

/// Crate-wide error, aggregating each submodule's error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Geo(#[from] GeoError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, Error>;
