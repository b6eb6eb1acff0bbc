//! Weight window generation with the MAGIC method
//!
//! This crate turns the results of a mesh flux tally into weight windows, and
//! repeats the process over several rounds of simulation to refine them.
//!
//! # Flux to weight windows
//!
//! A [WeightWindowGenerator] takes a tally definition and its results and
//! returns one [WeightWindowSet](wwforge_weights::WeightWindowSet) for every
//! particle type on the tally.
//!
//! Supported tallies have a mesh filter, and optionally an energy and/or
//! particle filter in any order. Any other filter type is rejected.
//!
//! Lower bounds are the flux normalised to the maximum of each energy group.
//! Voxels with no flux, or with relative errors over the tolerance, are not
//! biased and carry the `-1.0` sentinel when written out.
//!
//! ```rust, no_run
//! # use wwforge_tally::Statepoint;
//! # use wwforge_wwgen::{ProblemDescription, WeightWindowGenerator};
//! let problem = ProblemDescription::from_dir("./model").unwrap();
//! let statepoint = Statepoint::from_file("./model/statepoint.10.json").unwrap();
//!
//! let tally = problem.get_tally(1).unwrap();
//! let generator = WeightWindowGenerator::default();
//! let weight_windows = generator.generate_from_statepoint(tally, &statepoint).unwrap();
//! ```
//!
//! # MAGIC iterations
//!
//! The [MagicController] drives the full method from Davis & Turner (2011). An
//! analogue run produces the first set of weight windows, which bias the next
//! run, and so on for the requested number of rounds.
//!
//! ```text
//! <output_dir>/
//!     1/                  analogue round
//!         geometry.json
//!         materials.json
//!         settings.json
//!         tallies.json
//!         statepoint.<batches>.json
//!     2/                  biased with windows from round 1
//!     ...
//!     weight_windows.json final windows, written on completion
//! ```
//!
//! The transport engine itself is anything implementing [SimulationEngine],
//! usually a [CommandEngine] running an external program.

mod comm;
mod config;
mod engine;
mod error;
mod flux;
mod generator;
mod magic;
mod problem;

#[doc(inline)]
pub use generator::{lower_bounds, WeightWindowGenerator};

#[doc(inline)]
pub use config::{GeneratorConfig, MagicConfig};

#[doc(inline)]
pub use flux::{FluxData, DEFAULT_ENERGY_BOUNDS, DEFAULT_PARTICLE};

#[doc(inline)]
pub use magic::{
    IterationRecord, MagicController, MagicOutcome, RoundFailure, RoundState,
    FINAL_WEIGHT_WINDOWS_FILE,
};

#[doc(inline)]
pub use problem::{ProblemDescription, Settings};

#[doc(inline)]
pub use engine::{CommandEngine, SimulationEngine};

#[doc(inline)]
pub use comm::{Communicator, SingleProcess};

#[doc(inline)]
pub use error::{Error, Result};
