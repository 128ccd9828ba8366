use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("expected {expected} metric weights, got {got}")]
    WeightCount { expected: usize, got: usize },

    #[error("subscale {subscale} has a non-positive scale maximum ({max_value})")]
    InvalidScale { subscale: String, max_value: f64 },
}
