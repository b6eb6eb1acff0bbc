//! Result and Error types for wwforge-mesh

/// Type alias for Result<T, mesh::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `wwforge-mesh` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("mesh dimension {0:?} must be non-zero along every axis")]
    InvalidDimension([usize; 3]),

    #[error("inconsistent number of values for mesh {id} (expected {expected}, found {found})")]
    UnexpectedNumberOfValues {
        id: u32,
        expected: usize,
        found: usize,
    },

    #[error("index {index:?} is outside of mesh dimension {dimension:?}")]
    IndexOutOfBounds {
        index: [usize; 3],
        dimension: [usize; 3],
    },
}
