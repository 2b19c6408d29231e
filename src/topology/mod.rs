//! The topology cleaner pipeline: arc records, connector building, line
//! splitting and the post-clean status checker.

pub mod arc;
pub mod checker;
pub mod cleaner;
#[doc(hidden)]
pub mod error;
pub(crate) mod test;

#[doc(inline)]
pub use arc::{ArcFeature, Direction, TopoStatus};
#[doc(inline)]
pub use checker::TopologyChecker;
#[doc(inline)]
pub use cleaner::{RawLine, RawPoint, TopologyCleaner};
