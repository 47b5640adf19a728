use thiserror::Error;
use warmer_core::error::ConfigurationError;

#[derive(Debug, Error)]
pub enum WarmerError {
    #[error("invalid target configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("outcome channel closed after {received} of {expected} invocations")]
    IncompleteRun { expected: usize, received: usize },
}
