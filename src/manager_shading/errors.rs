use thiserror::Error;
use crate::errors::ConfigurationError;

/// Error depicting errors that occur while analysing a single roof plane
///
#[derive(Debug, Error)]
pub enum ShadingError {
    #[error("ConfigurationError: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("ComputationError: {0}")]
    Computation(String),
}
