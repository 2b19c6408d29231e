use strum::{Display, EnumString};

/// What to extract from OSM and how to route over it. The vocabulary is
/// exhaustive and case-sensitive on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FeatureMode {
    /// Motor network; the graph is directed and honors `oneway` and
    /// one-way junction semantics.
    Vehicle,
    /// Foot-legal network; the graph is undirected.
    Pedestrian,
    /// Points of interest only; no graph is built.
    Poi,
}

/// OSM element families the modes map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ElementKind {
    Way,
    Node,
}

impl FeatureMode {
    pub fn directed(&self) -> bool {
        matches!(self, FeatureMode::Vehicle)
    }

    pub fn element_kind(&self) -> ElementKind {
        match self {
            FeatureMode::Poi => ElementKind::Node,
            _ => ElementKind::Way,
        }
    }
}
