//! Command line arguments

// standard library
use std::path::PathBuf;

// wwforge modules
use wwforge_wwgen::{GeneratorConfig, MagicConfig, Result};

// external crates
use clap::{Args, Parser, Subcommand};

/// Generate weight windows from mesh flux tallies with the MAGIC method
#[derive(Parser, Debug)]
#[command(name = "wwforge", version, about, arg_required_else_help = true)]
pub struct Cli {
    /// Verbose logging (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate weight windows from an existing statepoint
    Generate(GenerateArgs),
    /// Run MAGIC iterations with an external transport engine
    Magic(MagicArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the statepoint file
    #[arg(value_name = "statepoint")]
    pub statepoint: PathBuf,

    /// Directory of the exported problem the statepoint came from
    #[arg(short, long, value_name = "dir")]
    pub problem: PathBuf,

    /// Id of the mesh flux tally
    #[arg(short, long, value_name = "id")]
    pub tally: u32,

    /// Output file for the weight windows
    #[arg(short, long, value_name = "path", default_value = "weight_windows.json")]
    pub output: PathBuf,

    /// Also install the windows into the problem and re-export it
    #[arg(long)]
    pub install: bool,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

#[derive(Args, Debug)]
pub struct MagicArgs {
    /// Directory of the exported problem
    #[arg(value_name = "problem")]
    pub problem: PathBuf,

    /// Id of the mesh flux tally
    #[arg(short, long, value_name = "id")]
    pub tally: u32,

    /// Number of simulation rounds
    #[arg(short = 'n', long, value_name = "num")]
    pub iterations: Option<usize>,

    /// Parent directory for the round directories
    #[arg(short, long, value_name = "dir")]
    pub output_dir: Option<PathBuf>,

    /// Transport engine executable
    #[arg(short, long, value_name = "program")]
    pub engine: String,

    /// Argument passed to the engine, may be repeated
    #[arg(long, value_name = "arg", allow_hyphen_values = true)]
    pub engine_arg: Vec<String>,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Generation parameters shared by every command
#[derive(Args, Debug)]
pub struct GeneratorArgs {
    /// JSON configuration file
    #[arg(short, long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Relative error above which voxels are not biased
    #[arg(long, value_name = "num")]
    pub rel_err_tol: Option<f64>,

    /// Normalised flux at or below which voxels are not biased
    #[arg(long, value_name = "num")]
    pub flux_floor: Option<f64>,

    /// Ratio of upper to lower weight window bounds
    #[arg(long, value_name = "num")]
    pub ratio: Option<f64>,

    /// Maximum number of splits per history
    #[arg(long, value_name = "num")]
    pub max_split: Option<u32>,
}

impl GeneratorArgs {
    /// Configuration file, if any, with command line overrides applied
    pub fn magic_config(&self) -> Result<MagicConfig> {
        let mut config = match &self.config {
            Some(path) => MagicConfig::from_file(path)?,
            None => MagicConfig::default(),
        };
        self.apply(&mut config.generator);
        Ok(config)
    }

    fn apply(&self, generator: &mut GeneratorConfig) {
        if let Some(tol) = self.rel_err_tol {
            generator.rel_err_tol = tol;
        }
        if let Some(floor) = self.flux_floor {
            generator.flux_floor = floor;
        }
        if let Some(ratio) = self.ratio {
            generator.upper_bound_ratio = ratio;
        }
        if let Some(max_split) = self.max_split {
            generator.max_split = max_split;
        }
    }
}
