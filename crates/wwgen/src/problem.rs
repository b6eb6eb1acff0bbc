//! Problem description handed to the transport engine

// standard library
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

// crate modules
use crate::error::Result;

// wwforge modules
use wwforge_tally::{Statepoint, TallySpecification};
use wwforge_weights::WeightWindowSet;

// external crates
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// File name of the exported geometry
pub const GEOMETRY_FILE: &str = "geometry.json";
/// File name of the exported materials
pub const MATERIALS_FILE: &str = "materials.json";
/// File name of the exported settings
pub const SETTINGS_FILE: &str = "settings.json";
/// File name of the exported tallies
pub const TALLIES_FILE: &str = "tallies.json";

/// Run settings of a problem
///
/// Only `batches` is needed to locate the results of a run. The source is
/// opaque and passed to the engine untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Number of batches, also names the statepoint file
    pub batches: u32,
    /// Particles per batch
    #[serde(default)]
    pub particles: u64,
    /// Number of inactive batches
    #[serde(default)]
    pub inactive: u32,
    /// Engine run mode
    #[serde(default = "default_run_mode")]
    pub run_mode: String,
    /// Source definition
    #[serde(default)]
    pub source: Value,
    /// Weight windows used to bias the run
    #[serde(default)]
    pub weight_windows: Vec<WeightWindowSet>,
}

fn default_run_mode() -> String {
    "fixed source".to_string()
}

impl Settings {
    /// Fixed source settings for a number of batches and particles
    pub fn new(batches: u32, particles: u64) -> Self {
        Self {
            batches,
            particles,
            inactive: 0,
            run_mode: default_run_mode(),
            source: Value::Null,
            weight_windows: Vec::new(),
        }
    }
}

/// Everything the transport engine needs to run a problem
///
/// Geometry and materials are opaque documents as far as weight window
/// generation is concerned. The problem is exported to a directory as four
/// JSON files which the engine reads.
///
/// ```rust
/// # use wwforge_wwgen::{ProblemDescription, Settings};
/// # use serde_json::Value;
/// # use std::path::Path;
/// let problem = ProblemDescription::new(Value::Null, Value::Null, Settings::new(20, 500), vec![]);
///
/// let path = problem.statepoint_path(Path::new("magic/1"));
/// assert_eq!(path, Path::new("magic/1/statepoint.20.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDescription {
    /// Geometry definition
    pub geometry: Value,
    /// Material definitions
    pub materials: Value,
    /// Run settings, including any weight windows
    pub settings: Settings,
    /// Tally definitions
    pub tallies: Vec<TallySpecification>,
}

impl ProblemDescription {
    /// Bundle up a problem
    pub fn new(
        geometry: Value,
        materials: Value,
        settings: Settings,
        tallies: Vec<TallySpecification>,
    ) -> Self {
        Self {
            geometry,
            materials,
            settings,
            tallies,
        }
    }

    /// Find a tally definition by id
    pub fn get_tally(&self, id: u32) -> Option<&TallySpecification> {
        self.tallies.iter().find(|t| t.id == id)
    }

    /// Weight windows currently installed
    pub fn weight_windows(&self) -> &[WeightWindowSet] {
        &self.settings.weight_windows
    }

    /// Replace the installed weight windows as a whole
    ///
    /// The previous set is returned. There is no way to partially update the
    /// installed windows.
    pub fn install_weight_windows(
        &mut self,
        weight_windows: Vec<WeightWindowSet>,
    ) -> Vec<WeightWindowSet> {
        debug!("Installing {} weight window set(s)", weight_windows.len());
        std::mem::replace(&mut self.settings.weight_windows, weight_windows)
    }

    /// Path of the statepoint a run in `directory` will produce
    pub fn statepoint_path(&self, directory: &Path) -> PathBuf {
        Statepoint::path_in(directory, self.settings.batches)
    }

    /// Write the problem to a directory, creating it if needed
    pub fn export<P: AsRef<Path>>(&self, directory: P) -> Result<()> {
        let directory = directory.as_ref();
        debug!("Exporting problem to {}", directory.display());
        fs::create_dir_all(directory)?;

        write_json(&directory.join(GEOMETRY_FILE), &self.geometry)?;
        write_json(&directory.join(MATERIALS_FILE), &self.materials)?;
        write_json(&directory.join(SETTINGS_FILE), &self.settings)?;
        write_json(&directory.join(TALLIES_FILE), &self.tallies)?;
        Ok(())
    }

    /// Read a problem previously written with [ProblemDescription::export()]
    pub fn from_dir<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();
        debug!("Reading problem from {}", directory.display());

        Ok(Self {
            geometry: read_json(&directory.join(GEOMETRY_FILE))?,
            materials: read_json(&directory.join(MATERIALS_FILE))?,
            settings: read_json(&directory.join(SETTINGS_FILE))?,
            tallies: read_json(&directory.join(TALLIES_FILE))?,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    trace!("Writing {}", path.display());
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    trace!("Reading {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
