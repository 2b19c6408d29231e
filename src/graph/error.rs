#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("duplicate arc {0}: it should not be emitted twice")]
    DuplicateArc(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
