use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mesh synthesis
#[derive(Error, Debug)]
pub enum Error {
    #[error("Degenerate polygon: {0}")]
    DegeneratePolygon(String),

    #[error("Polygon clipping failed: {0}")]
    Clipping(String),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Plane projection failed: {0}")]
    Projection(String),
}
