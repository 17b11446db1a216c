use crate::{ConfigError, StrategyError};

/// Errors that can occur during a minimization.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no parameters to minimize")]
    NoParameters,

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The loss failed with an error other than numerical invalidity.
    #[error("loss error: {0}")]
    Loss(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("loss returned {got} gradients for {expected} parameters")]
    GradientLength { expected: usize, got: usize },

    /// The NaN strategy aborted the run.
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
}
