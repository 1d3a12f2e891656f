//! Error types for meshcurve

use thiserror::Error;

/// Main error type for meshcurve operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
    
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

impl Error {
    /// Error raised when a curve or marker is bound to a mesh with non-triangular faces
    pub fn not_triangulated() -> Self {
        Error::InvalidMesh("surface curves require a triangulated surface".to_string())
    }
}

/// Result type alias for meshcurve operations
pub type Result<T> = std::result::Result<T, Error>;
