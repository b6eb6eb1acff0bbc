//! Iterative MAGIC weight window refinement

// standard library
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// crate modules
use crate::comm::{Communicator, SingleProcess};
use crate::config::MagicConfig;
use crate::engine::SimulationEngine;
use crate::error::{Error, Result};
use crate::flux::FilterLayout;
use crate::generator::WeightWindowGenerator;
use crate::problem::ProblemDescription;

// wwforge modules
use wwforge_tally::{Statepoint, TallySpecification};
use wwforge_weights::{write_weight_windows, WeightWindowSet};

// external crates
use log::{debug, error, info, warn};

/// File the final weight windows are written to in the output directory
pub const FINAL_WEIGHT_WINDOWS_FILE: &str = "weight_windows.json";

/// Stages of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Writing the problem to the round directory
    Export,
    /// Running the transport engine
    Run,
    /// Reading the statepoint left by the engine
    Load,
    /// Generating and installing weight windows
    Build,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Export => "export",
            Self::Run => "run",
            Self::Load => "load",
            Self::Build => "build",
        };
        write!(f, "{name}")
    }
}

/// Weight windows produced by a completed round
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// Round number, starting from 1
    pub round: usize,
    /// One set per particle type
    pub weight_windows: Vec<WeightWindowSet>,
}

/// Why and where a run of rounds stopped early
#[derive(Debug)]
pub struct RoundFailure {
    /// Round that failed, starting from 1
    pub round: usize,
    /// Stage the round failed in
    pub state: RoundState,
    /// Underlying error
    pub error: Error,
}

impl RoundFailure {
    fn new(round: usize, state: RoundState, error: Error) -> Self {
        Self {
            round,
            state,
            error,
        }
    }
}

impl fmt::Display for RoundFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "round {} failed at {}: {}", self.round, self.state, self.error)
    }
}

/// Everything that happened over a run of rounds
///
/// The history only ever grows by one record per completed round. If a round
/// fails the records of earlier rounds are kept and the failure is recorded
/// alongside them.
///
/// Every process counts the rounds it completed, but only the coordinating
/// process records history. Other processes finish with an empty one and no
/// final weight windows.
#[derive(Debug)]
pub struct MagicOutcome {
    /// Number of rounds asked for
    pub requested: usize,
    /// Records of completed rounds, in order
    pub history: Vec<IterationRecord>,
    /// The failure that stopped the run, if any
    pub failure: Option<RoundFailure>,
    completed: usize,
}

impl MagicOutcome {
    fn new(requested: usize) -> Self {
        Self {
            requested,
            history: Vec::with_capacity(requested),
            failure: None,
            completed: 0,
        }
    }

    /// Number of rounds that completed
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// True if every requested round completed
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.completed == self.requested
    }

    /// Weight windows from the last completed round
    pub fn final_weight_windows(&self) -> Option<&[WeightWindowSet]> {
        self.history.last().map(|r| r.weight_windows.as_slice())
    }
}

/// Drives rounds of simulation and weight window generation
///
/// Each round `i` runs in `<output_dir>/<i>/`:
///
/// 1. Export the problem, with the current weight windows installed
/// 2. Run the engine in the round directory
/// 3. Load the statepoint the engine left behind
/// 4. Generate weight windows from the target tally and install them
///
/// The first round runs the problem as given, normally analogue. A failure at
/// any stage stops the run and is reported in the [MagicOutcome] with the
/// history so far. Problems with the configuration or the tally itself are
/// returned as errors before any round starts.
///
/// A statepoint already sitting in a round directory is removed on export, so
/// an engine that writes nothing can never pass off old results as new.
///
/// ```rust, no_run
/// # use wwforge_wwgen::{CommandEngine, MagicConfig, MagicController, ProblemDescription};
/// let mut problem = ProblemDescription::from_dir("./model").unwrap();
/// let tally = problem.get_tally(1).unwrap().clone();
///
/// let config = MagicConfig::new(5, "./magic");
/// let engine = CommandEngine::new("transport");
///
/// let mut controller = MagicController::new(config, engine).unwrap();
/// let outcome = controller.run(&mut problem, &tally).unwrap();
///
/// println!("{} of {} rounds completed", outcome.completed(), outcome.requested);
/// ```
#[derive(Debug)]
pub struct MagicController<E: SimulationEngine, C: Communicator = SingleProcess> {
    config: MagicConfig,
    generator: WeightWindowGenerator,
    engine: E,
    comm: C,
}

impl<E: SimulationEngine> MagicController<E, SingleProcess> {
    /// Controller for a single process
    pub fn new(config: MagicConfig, engine: E) -> Result<Self> {
        Self::with_communicator(config, engine, SingleProcess)
    }
}

impl<E: SimulationEngine, C: Communicator> MagicController<E, C> {
    /// Controller for one of several cooperating processes
    pub fn with_communicator(config: MagicConfig, engine: E, comm: C) -> Result<Self> {
        config.validate()?;
        let generator = WeightWindowGenerator::new(config.generator.clone())?;
        Ok(Self {
            config,
            generator,
            engine,
            comm,
        })
    }

    /// Parameters in use
    pub fn config(&self) -> &MagicConfig {
        &self.config
    }

    /// Directory for a given round
    pub fn round_dir(&self, round: usize) -> PathBuf {
        self.config.output_dir.join(round.to_string())
    }

    /// Run every round, installing new weight windows into `problem` as it goes
    pub fn run(
        &mut self,
        problem: &mut ProblemDescription,
        tally: &TallySpecification,
    ) -> Result<MagicOutcome> {
        if problem.get_tally(tally.id).is_none() {
            return Err(Error::TallyNotInProblem(tally.id));
        }

        // fail on a bad tally now rather than after the first simulation
        FilterLayout::from_specification(tally)?;

        if !problem.weight_windows().is_empty() {
            warn!("Warning: Problem already has weight windows, round 1 will not be analogue");
        }

        let requested = self.config.iterations;
        let mut outcome = MagicOutcome::new(requested);

        for round in 1..=requested {
            info!("Round {round} of {requested}");
            match self.run_round(round, problem, tally) {
                Ok(Some(record)) => {
                    problem.install_weight_windows(record.weight_windows.clone());
                    outcome.history.push(record);
                }
                Ok(None) => (),
                Err(failure) => {
                    error!("Stopping early, {failure}");
                    outcome.failure = Some(failure);
                    break;
                }
            }
            outcome.completed += 1;
        }

        if self.comm.is_coordinator() && outcome.is_complete() {
            if let Some(weight_windows) = outcome.final_weight_windows() {
                let path = self.config.output_dir.join(FINAL_WEIGHT_WINDOWS_FILE);
                info!("Writing final weight windows to {}", path.display());
                write_weight_windows(weight_windows, path)?;
            }
        }

        Ok(outcome)
    }

    /// A single round
    ///
    /// Every process passes through the same three agreements whatever happens
    /// locally. Only the coordinator returns a record.
    fn run_round(
        &mut self,
        round: usize,
        problem: &ProblemDescription,
        tally: &TallySpecification,
    ) -> std::result::Result<Option<IterationRecord>, RoundFailure> {
        let directory = self.round_dir(round);
        let coordinator = self.comm.is_coordinator();

        let exported = if coordinator {
            export_fresh(problem, &directory)
                .map_err(|e| RoundFailure::new(round, RoundState::Export, e))
        } else {
            Ok(())
        };
        self.agree(round, RoundState::Export, exported)?;

        debug!("  - {}", RoundState::Run);
        let ran = self
            .engine
            .run(&directory)
            .map_err(|e| RoundFailure::new(round, RoundState::Run, e));
        self.agree(round, RoundState::Run, ran)?;

        let built = if coordinator {
            self.load_and_build(round, problem, tally, &directory).map(Some)
        } else {
            Ok(None)
        };
        let weight_windows = self.agree(round, RoundState::Build, built)?;

        Ok(weight_windows.map(|weight_windows| IterationRecord {
            round,
            weight_windows,
        }))
    }

    /// Read the statepoint of a round and turn the tally into weight windows
    fn load_and_build(
        &self,
        round: usize,
        problem: &ProblemDescription,
        tally: &TallySpecification,
        directory: &Path,
    ) -> std::result::Result<Vec<WeightWindowSet>, RoundFailure> {
        let path = problem.statepoint_path(directory);
        debug!("  - {}: {}", RoundState::Load, path.display());

        let load_failed =
            |e: wwforge_tally::Error| RoundFailure::new(round, RoundState::Load, e.into());
        let statepoint = Statepoint::from_file(&path).map_err(load_failed)?;
        let result = statepoint.get_tally(tally.id).map_err(load_failed)?;

        debug!("  - {}", RoundState::Build);
        self.generator
            .generate(tally, result)
            .map_err(|e| RoundFailure::new(round, RoundState::Build, e))
    }

    /// Collective check that every process got through a stage
    ///
    /// A local failure is returned as is. A process that succeeded while
    /// another failed gets [Error::AbortedByPeer] for the same stage.
    fn agree<T>(
        &self,
        round: usize,
        state: RoundState,
        local: std::result::Result<T, RoundFailure>,
    ) -> std::result::Result<T, RoundFailure> {
        let all_ok = self.comm.all_ok(local.is_ok());
        let value = local?;
        if !all_ok {
            return Err(RoundFailure::new(round, state, Error::AbortedByPeer));
        }
        Ok(value)
    }
}

/// Export the problem and clear out results left by an earlier run
fn export_fresh(problem: &ProblemDescription, directory: &Path) -> Result<()> {
    debug!("  - {}: {}", RoundState::Export, directory.display());
    problem.export(directory)?;

    let stale = problem.statepoint_path(directory);
    if stale.exists() {
        warn!("Warning: Removing stale {}", stale.display());
        fs::remove_file(&stale)?;
    }
    Ok(())
}
