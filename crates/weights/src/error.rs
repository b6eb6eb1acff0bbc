//! Result and Error types for wwforge-weights

/// Type alias for Result<T, weights::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `wwforge-weights` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise json")]
    JsonError(#[from] serde_json::Error),

    #[error("mesh error")]
    MeshError(#[from] wwforge_mesh::Error),

    #[error("inconsistent number of lower bounds (expected {expected}, found {found})")]
    UnexpectedNumberOfBounds { expected: usize, found: usize },

    #[error("energy bounds must be at least two ascending values, found {0:?}")]
    InvalidEnergyBounds(Vec<f64>),

    #[error("upper bound ratio must be finite and greater than 1, found {0}")]
    InvalidUpperBoundRatio(f64),

    #[error("maximum split must be at least 1")]
    InvalidMaxSplit,

    #[error("no weight window sets to write")]
    EmptySet,
}
