use crate::topology::arc::{ArcFeature, TopoStatus};

use geo::Coord;

/// Read-only status tally over a cleaned arc set, for validating what the
/// cleaner did to a network.
pub struct TopologyChecker<'a> {
    features: Vec<&'a ArcFeature>,
}

impl<'a> TopologyChecker<'a> {
    pub fn new(features: impl IntoIterator<Item = &'a ArcFeature>) -> Self {
        Self {
            features: features.into_iter().collect(),
        }
    }

    fn by_status(&self, status: TopoStatus) -> Vec<&'a ArcFeature> {
        self.features
            .iter()
            .copied()
            .filter(|feature| feature.status() == status)
            .collect()
    }

    /// Lines that passed through without any change.
    pub fn lines_unchanged(&self) -> Vec<&'a ArcFeature> {
        self.by_status(TopoStatus::Unchanged)
    }

    /// Lines chopped at an intersection.
    pub fn lines_split(&self) -> Vec<&'a ArcFeature> {
        self.by_status(TopoStatus::Split)
    }

    /// Synthetic connectors.
    pub fn lines_added(&self) -> Vec<&'a ArcFeature> {
        self.by_status(TopoStatus::Added)
    }

    /// External points wired onto the network: the first coordinate of
    /// every connector.
    pub fn nodes_added(&self) -> Vec<Coord<f64>> {
        self.lines_added()
            .iter()
            .map(|feature| feature.from_point())
            .collect()
    }

    /// Both endpoints of every split arc, duplicates preserved: these are
    /// the node coordinates the cleaner introduced by splitting.
    pub fn intersections_added(&self) -> Vec<Coord<f64>> {
        self.lines_split()
            .iter()
            .flat_map(|feature| [feature.from_point(), feature.to_point()])
            .collect()
    }
}
