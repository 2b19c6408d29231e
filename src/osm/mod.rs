//! The OSM boundary: feature modes, Overpass query templating, element
//! decoding and the two blocking HTTP collaborators.

pub mod element;
#[doc(hidden)]
pub mod error;
pub mod mode;
pub mod nominatim;
pub mod overpass;
pub mod query;

#[doc(inline)]
pub use mode::{ElementKind, FeatureMode};
#[doc(inline)]
pub use nominatim::{NominatimApi, NominatimItem};
#[doc(inline)]
pub use overpass::OverpassApi;
#[doc(inline)]
pub use query::{BoundingBox, QueryBuilder};

use log::warn;
use std::fmt::Display;
use std::time::Duration;

pub(crate) const RETRY_TRIES: u32 = 4;
pub(crate) const RETRY_DELAY: Duration = Duration::from_secs(3);
pub(crate) const RETRY_BACKOFF: u32 = 2;

/// Retry an operation with exponential backoff. The final attempt's
/// error is returned unchanged once the budget is exhausted.
pub(crate) fn retry<T, E, F>(
    tries: u32,
    delay: Duration,
    backoff: u32,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let mut remaining = tries;
    let mut wait = delay;

    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) if remaining > 1 => {
                warn!("{error}, retrying in {wait:?}...");
                std::thread::sleep(wait);
                remaining -= 1;
                wait *= backoff;
            }
            Err(error) => return Err(error),
        }
    }
}
