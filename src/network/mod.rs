//! High-level facade: fetch a network by bounding box or located place,
//! clean it, build the graph and run the analytic queries.

pub mod analysis;
pub mod pois;
pub mod roads;

#[doc(inline)]
pub use analysis::GraphAnalysis;
#[doc(inline)]
pub use pois::Pois;
#[doc(inline)]
pub use roads::{RoadGraph, Roads};
