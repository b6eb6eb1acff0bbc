//! Results artifact written by the transport engine at the end of a run

// standard library
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

// crate modules
use crate::error::{Error, Result};
use crate::result::TallyResult;

// wwforge modules
use wwforge_utils::f;

// external crates
use log::debug;
use serde::{Deserialize, Serialize};

/// All tally results from one simulation run
///
/// The engine writes a statepoint named after the number of batches run, so
/// the file for a given problem is always found at a predictable location.
///
/// ```rust
/// # use wwforge_tally::Statepoint;
/// # use std::path::Path;
/// assert_eq!(Statepoint::file_name(20), "statepoint.20.json");
///
/// let path = Statepoint::path_in(Path::new("runs/3"), 20);
/// assert_eq!(path, Path::new("runs/3/statepoint.20.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statepoint {
    /// Number of batches simulated
    pub batches: u32,
    /// Results for every tally in the problem
    #[serde(default)]
    pub tallies: Vec<TallyResult>,
}

impl Statepoint {
    /// Deterministic statepoint file name for a number of batches
    pub fn file_name(batches: u32) -> String {
        f!("statepoint.{batches}.json")
    }

    /// Full path to the statepoint file in a run directory
    pub fn path_in(directory: &Path, batches: u32) -> PathBuf {
        directory.join(Self::file_name(batches))
    }

    /// Read a statepoint file
    ///
    /// Every tally result is checked for consistent array lengths, so a
    /// truncated or corrupt file fails here rather than part way through weight
    /// window generation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading statepoint {}", path.display());

        let reader = BufReader::new(File::open(path)?);
        let statepoint: Statepoint = serde_json::from_reader(reader)?;

        for tally in &statepoint.tallies {
            tally.validate()?;
        }

        Ok(statepoint)
    }

    /// Write the statepoint to file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Find the results for a tally id
    pub fn get_tally(&self, id: u32) -> Result<&TallyResult> {
        self.tallies
            .iter()
            .find(|t| t.id == id)
            .ok_or(Error::TallyNotFound(id))
    }
}
