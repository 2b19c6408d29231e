//! Geometric primitives shared by the cleaner and the graph: polyline
//! densification, WGS84 ellipsoidal lengths and exact coordinate identity.

pub mod densify;
#[doc(hidden)]
pub mod error;

#[doc(inline)]
pub use densify::densify;

use geo::{Coord, Destination, Geodesic, Length, LineString, Point, Rect};
use std::fmt::{Debug, Formatter};

/// Exact identity of a WGS84 coordinate: the bit patterns of its two
/// floats. All node deduplication and intersection counting key on this —
/// there is no tolerance anywhere in the core, so callers wanting fuzzy
/// merging must quantize upstream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey(u64, u64);

impl PointKey {
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: f64::from_bits(self.0),
            y: f64::from_bits(self.1),
        }
    }
}

impl From<Coord<f64>> for PointKey {
    fn from(coord: Coord<f64>) -> Self {
        Self(coord.x.to_bits(), coord.y.to_bits())
    }
}

impl From<Point<f64>> for PointKey {
    fn from(point: Point<f64>) -> Self {
        Self::from(point.0)
    }
}

impl Debug for PointKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let coord = self.coord();
        write!(f, "PointKey({}, {})", coord.x, coord.y)
    }
}

/// Length of a lon/lat linestring in meters, measured on the WGS84
/// ellipsoid.
pub fn ellipsoidal_length(line: &LineString<f64>) -> f64 {
    Geodesic.length(line)
}

/// Axis-aligned lon/lat rectangle covering `distance` meters around a
/// point in every direction.
pub fn buffered_rect(point: Point<f64>, distance: f64) -> Rect<f64> {
    let bottom_right = Geodesic.destination(point, 135.0, distance);
    let top_left = Geodesic.destination(point, 315.0, distance);
    Rect::new(top_left, bottom_right)
}

/// Smallest rectangle covering `distance` meters around every point.
pub fn buffered_extent(points: &[Point<f64>], distance: f64) -> Option<Rect<f64>> {
    let mut rects = points.iter().map(|point| buffered_rect(*point, distance));
    let first = rects.next()?;

    Some(rects.fold(first, |acc, rect| {
        Rect::new(
            Coord {
                x: acc.min().x.min(rect.min().x),
                y: acc.min().y.min(rect.min().y),
            },
            Coord {
                x: acc.max().x.max(rect.max().x),
                y: acc.max().y.max(rect.max().y),
            },
        )
    }))
}
