//! Result and Error types for wwforge-wwgen

// wwforge modules
use wwforge_tally::FilterKind;

/// Type alias for Result<T, wwgen::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `wwforge-wwgen` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise json")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    TallyError(#[from] wwforge_tally::Error),

    #[error(transparent)]
    MeshError(#[from] wwforge_mesh::Error),

    #[error(transparent)]
    WeightsError(#[from] wwforge_weights::Error),

    #[error("filter type \"{0}\" is unsupported for weight window generation")]
    UnsupportedFilter(FilterKind),

    #[error("tally {0} has no mesh filter")]
    MissingMeshFilter(u32),

    #[error("malformed results for tally {id}: {reason}")]
    DimensionalityError { id: u32, reason: String },

    #[error("tally {0} is not defined in the problem")]
    TallyNotInProblem(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to launch engine \"{program}\"")]
    EngineLaunch {
        program: String,
        source: std::io::Error,
    },

    #[error("stopped by a failure on another process")]
    AbortedByPeer,

    #[error("engine \"{program}\" failed with exit status {status}")]
    EngineFailed { program: String, status: String },
}
