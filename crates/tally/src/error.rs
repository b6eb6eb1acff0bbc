//! Result and Error types for wwforge-tally

/// Type alias for Result<T, tally::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `wwforge-tally` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to (de)serialise json")]
    JsonError(#[from] serde_json::Error),

    #[error("tally {0} not found")]
    TallyNotFound(u32),

    #[error("score \"{score}\" not found on tally {id}")]
    ScoreNotFound { id: u32, score: String },

    #[error("nuclide \"{nuclide}\" not found on tally {id}")]
    NuclideNotFound { id: u32, nuclide: String },

    #[error("inconsistent number of {what} for tally {id} (expected {expected}, found {found})")]
    InconsistentShape {
        id: u32,
        what: String,
        expected: usize,
        found: usize,
    },
}
