//! Invocation of the external transport engine

// standard library
use std::path::Path;
use std::process::Command;

// crate modules
use crate::error::{Error, Result};

// wwforge modules
use wwforge_utils::f;

// external crates
use itertools::Itertools;
use log::{debug, info};

/// A transport engine that can run an exported problem
///
/// The engine is a black box. It is given a directory containing an exported
/// [ProblemDescription](crate::ProblemDescription) and either completes,
/// leaving a statepoint behind in that directory, or fails.
///
/// Closures of the right shape are engines too, which is convenient for
/// embedding and testing.
///
/// ```rust
/// # use std::path::Path;
/// # use wwforge_wwgen::SimulationEngine;
/// let mut engine = |directory: &Path| -> wwforge_wwgen::Result<()> {
///     println!("running in {}", directory.display());
///     Ok(())
/// };
/// engine.run(Path::new("magic/1")).unwrap();
/// ```
pub trait SimulationEngine {
    /// Run the problem exported to `directory` to completion
    fn run(&mut self, directory: &Path) -> Result<()>;
}

impl<F> SimulationEngine for F
where
    F: FnMut(&Path) -> Result<()>,
{
    fn run(&mut self, directory: &Path) -> Result<()> {
        self(directory)
    }
}

/// Engine run as an external program
///
/// The program is started with the round directory as its working directory
/// and is expected to find the exported problem files there. Any non-zero
/// exit status is a failure.
///
/// ```rust, no_run
/// # use std::path::Path;
/// # use wwforge_wwgen::{CommandEngine, SimulationEngine};
/// let mut engine = CommandEngine::new("mpirun").args(["-n", "8", "transport"]);
/// engine.run(Path::new("magic/1")).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    /// Engine running `program` with no arguments
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    /// Full command line, for display
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program).chain(&self.args).join(" ")
    }
}

impl SimulationEngine for CommandEngine {
    fn run(&mut self, directory: &Path) -> Result<()> {
        info!("Running \"{}\" in {}", self.command_line(), directory.display());

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(directory)
            .status()
            .map_err(|source| Error::EngineLaunch {
                program: self.program.clone(),
                source,
            })?;

        debug!("Engine exited with {status}");

        if !status.success() {
            return Err(Error::EngineFailed {
                program: self.program.clone(),
                status: status
                    .code()
                    .map_or_else(|| "none (terminated by signal)".to_string(), |c| f!("{c}")),
            });
        }

        Ok(())
    }
}
