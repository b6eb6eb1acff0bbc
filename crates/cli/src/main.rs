//! Command line tool for MAGIC weight window generation

mod cli;

// standard library
use std::process::ExitCode;

// internal modules
use cli::{Cli, Command, GenerateArgs, MagicArgs};

// wwforge modules
use wwforge_tally::Statepoint;
use wwforge_weights::write_weight_windows;
use wwforge_wwgen::{
    CommandEngine, Error, MagicController, ProblemDescription, Result, WeightWindowGenerator,
};

// external crates
use clap::Parser;
use log::{error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging_init(&cli);

    let outcome = match cli.command {
        Command::Generate(args) => generate(args),
        Command::Magic(args) => magic(args),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("Error: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                error!("  - {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

/// Weight windows from a single statepoint
fn generate(args: GenerateArgs) -> Result<ExitCode> {
    let config = args.generator.magic_config()?;
    let mut problem = ProblemDescription::from_dir(&args.problem)?;

    let tally = problem
        .get_tally(args.tally)
        .ok_or(Error::TallyNotInProblem(args.tally))?
        .clone();

    info!("Reading {}", args.statepoint.display());
    let statepoint = Statepoint::from_file(&args.statepoint)?;

    let generator = WeightWindowGenerator::new(config.generator)?;
    let weight_windows = generator.generate_from_statepoint(&tally, &statepoint)?;

    info!("Writing weight windows to {}", args.output.display());
    write_weight_windows(&weight_windows, &args.output)?;

    if args.install {
        problem.install_weight_windows(weight_windows);
        problem.export(&args.problem)?;
        info!("Updated problem in {}", args.problem.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Full MAGIC run with an external engine
fn magic(args: MagicArgs) -> Result<ExitCode> {
    let mut config = args.generator.magic_config()?;
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    let mut problem = ProblemDescription::from_dir(&args.problem)?;
    let tally = problem
        .get_tally(args.tally)
        .ok_or(Error::TallyNotInProblem(args.tally))?
        .clone();

    let engine = CommandEngine::new(&args.engine).args(&args.engine_arg);
    let mut controller = MagicController::new(config, engine)?;
    let outcome = controller.run(&mut problem, &tally)?;

    match &outcome.failure {
        None => {
            info!(
                "Completed {} rounds, final weight windows in {}",
                outcome.completed(),
                controller.config().output_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(failure) => {
            warn!(
                "Warning: Only {} of {} rounds completed",
                outcome.completed(),
                outcome.requested
            );
            error!("Error: {failure}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Sets up logging at runtime to allow for multiple verbosity levels
fn logging_init(cli: &Cli) {
    let result = stderrlog::new()
        .modules([
            module_path!(),
            "wwforge_mesh",
            "wwforge_tally",
            "wwforge_weights",
            "wwforge_wwgen",
        ])
        .quiet(cli.quiet)
        .verbosity(usize::from(cli.verbose) + 2)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .timestamp(stderrlog::Timestamp::Off)
        .init();

    if let Err(e) = result {
        eprintln!("Failed to initialise logging: {e}");
    }
}
