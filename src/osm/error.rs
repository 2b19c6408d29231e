#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("upstream payload malformed: {0}")]
    Malformed(String),
}
