use thiserror::Error;

/// Error depicting malformed or degenerate roof and obstruction footprints
///
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("GeometryParseError: {0}")]
    Parse(String),
    #[error("DegenerateGeometryError: {0}")]
    Degenerate(String),
}

/// Error depicting parameters outside their documented range
///
#[derive(Debug, Error)]
#[error("ConfigurationError: {0}")]
pub struct ConfigurationError(pub String);

/// Error depicting errors that occur while building validated model values
///
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0}")]
    Geometry(#[from] GeometryError),
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}
