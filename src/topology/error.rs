use crate::geo::error::GeoError;

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Geo(#[from] GeoError),
}
