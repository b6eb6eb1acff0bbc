//! Parameters for weight window generation and MAGIC iterations

// standard library
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

// crate modules
use crate::error::{Error, Result};

// wwforge modules
use wwforge_utils::f;

// external crates
use serde::{Deserialize, Serialize};

/// Parameters controlling the flux to weight window transform
///
/// Every field has a default, so a configuration file only needs to list the
/// values that change.
///
/// - `score` - Tally score used as the importance estimate
/// - `nuclide` - Nuclide entry to use, normally the `total`
/// - `rel_err_tol` - Voxels with relative errors above this are not biased
/// - `flux_floor` - Voxels with normalised flux at or below this are not biased
/// - `upper_bound_ratio` - Upper bound as a multiple of the lower bound
/// - `max_split` - Cap on the number of splits for a single history
///
/// The two masking thresholds are independent. `rel_err_tol` removes voxels
/// that are statistically unreliable, while `flux_floor` removes voxels that
/// are effectively unreached. The default floor of zero only disables voxels
/// that scored nothing at all.
///
/// ```rust
/// # use wwforge_wwgen::GeneratorConfig;
/// let config: GeneratorConfig = serde_json::from_str(r#"{"rel_err_tol": 0.7}"#).unwrap();
///
/// assert_eq!(config.rel_err_tol, 0.7);
/// assert_eq!(config.flux_floor, 0.0);
/// assert_eq!(config.upper_bound_ratio, 5.0);
/// assert_eq!(config.max_split, 1_000_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Tally score to use
    pub score: String,
    /// Nuclide entry to use
    pub nuclide: String,
    /// Upper limit on relative error of flux values used
    pub rel_err_tol: f64,
    /// Normalised flux at or below which a voxel is disabled
    pub flux_floor: f64,
    /// Ratio of upper to lower bounds
    pub upper_bound_ratio: f64,
    /// Maximum number of splits per history
    pub max_split: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            score: "flux".to_string(),
            nuclide: "total".to_string(),
            rel_err_tol: 0.95,
            flux_floor: 0.0,
            upper_bound_ratio: 5.0,
            max_split: 1_000_000,
        }
    }
}

impl GeneratorConfig {
    /// Check every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if !self.rel_err_tol.is_finite() || self.rel_err_tol < 0.0 {
            return Err(Error::InvalidConfig(f!(
                "relative error tolerance must be finite and positive, found {}",
                self.rel_err_tol
            )));
        }

        if !self.flux_floor.is_finite() || !(0.0..1.0).contains(&self.flux_floor) {
            return Err(Error::InvalidConfig(f!(
                "flux floor must be in [0, 1), found {}",
                self.flux_floor
            )));
        }

        if !self.upper_bound_ratio.is_finite() || self.upper_bound_ratio <= 1.0 {
            return Err(Error::InvalidConfig(f!(
                "upper bound ratio must be greater than 1, found {}",
                self.upper_bound_ratio
            )));
        }

        if self.max_split == 0 {
            return Err(Error::InvalidConfig("max split must be at least 1".into()));
        }

        Ok(())
    }
}

/// Parameters for a full run of MAGIC iterations
///
/// Each round is run in its own numbered directory under `output_dir`, so a
/// failure part way through leaves earlier rounds intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagicConfig {
    /// Number of simulation rounds
    pub iterations: usize,
    /// Parent directory of the round directories
    pub output_dir: PathBuf,
    /// Weight window generation parameters
    pub generator: GeneratorConfig,
}

impl Default for MagicConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            output_dir: PathBuf::from("magic"),
            generator: GeneratorConfig::default(),
        }
    }
}

impl MagicConfig {
    /// Configuration for a number of rounds in an output directory
    pub fn new<P: AsRef<Path>>(iterations: usize, output_dir: P) -> Self {
        Self {
            iterations,
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Read a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let config: MagicConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig(
                "at least one iteration is required".into(),
            ));
        }
        self.generator.validate()
    }
}
