use crate::geo::error::GeoError;
use geo::Coord;

/// Densify a polyline by recursive midpoint insertion.
///
/// A factor of `1` returns the input unchanged; every further level
/// inserts the midpoint of each adjacent pair, so a factor of `k` cuts
/// each input segment into `2^(k-1)` equal pieces. Original vertices are
/// carried through bit-exact, which the cleaner relies on when it matches
/// sample coordinates back against host-line vertices.
pub fn densify(coords: &[Coord<f64>], factor: usize) -> Result<Vec<Coord<f64>>, GeoError> {
    if factor < 1 {
        return Err(GeoError::InvalidArgument(
            "densification factor must be >= 1, got 0".to_string(),
        ));
    }

    let mut current = coords.to_vec();
    for _ in 1..factor {
        if current.len() < 2 {
            break;
        }

        let mut next = Vec::with_capacity(current.len() * 2 - 1);
        for pair in current.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            next.push(a);
            next.push(Coord {
                x: (a.x + b.x) / 2.0,
                y: (a.y + b.y) / 2.0,
            });
        }
        next.push(current[current.len() - 1]);

        current = next;
    }

    Ok(current)
}
