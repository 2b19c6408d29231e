#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
