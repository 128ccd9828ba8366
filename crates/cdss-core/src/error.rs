use thiserror::Error;

/// Rejections produced by request validation. These always surface to the
/// caller as a client error, never as a server failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("study_id must be a non-empty list of study identifiers")]
    EmptyStudyList,

    #[error("weights must all be positive, got {0}")]
    NonPositiveWeight(i64),

    #[error("alpha must be within [0, 1], got {0}")]
    AlphaOutOfRange(f64),

    #[error("{field} must be a positive integer, got {value}")]
    NonPositiveParam { field: &'static str, value: i64 },

    #[error("unknown RGS mode: {0}")]
    UnknownMode(String),
}
