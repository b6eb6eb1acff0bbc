//! MAGIC iterations driven through fake and external engines

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::{tempdir, TempDir};
use wwforge_mesh::SpatialMesh;
use wwforge_tally::{Filter, Statepoint, TallyResult, TallySpecification};
use wwforge_weights::read_weight_windows;
use wwforge_wwgen::{
    CommandEngine, Communicator, Error, MagicConfig, MagicController, MagicOutcome,
    ProblemDescription, Result, RoundState, Settings, SimulationEngine, FINAL_WEIGHT_WINDOWS_FILE,
};

const BATCHES: u32 = 10;

#[fixture]
fn tally() -> TallySpecification {
    let mesh = SpatialMesh::regular(1, [2, 2, 1], [0.0; 3], [2.0, 2.0, 1.0]);
    TallySpecification::new(1)
        .with_name("ww tally")
        .with_filter(Filter::Mesh(mesh))
}

#[fixture]
fn problem(tally: TallySpecification) -> ProblemDescription {
    ProblemDescription::new(
        json!({"cells": [1, 2]}),
        json!([{"name": "steel", "density": 7.9}]),
        Settings::new(BATCHES, 1000),
        vec![tally],
    )
}

#[fixture]
fn workspace() -> TempDir {
    tempdir().unwrap()
}

/// Results a real engine would leave behind for the ww tally
fn write_results(directory: &Path) -> Result<()> {
    let statepoint = Statepoint {
        batches: BATCHES,
        tallies: vec![TallyResult {
            id: 1,
            filter_bins: vec![4],
            nuclides: vec!["total".into()],
            scores: vec!["flux".into()],
            mean: vec![1.0, 2.0, 4.0, 0.0],
            rel_err: vec![0.1, 0.1, 0.1, f64::NAN],
        }],
    };
    statepoint.write(Statepoint::path_in(directory, BATCHES))?;
    Ok(())
}

fn config(iterations: usize, workspace: &TempDir) -> MagicConfig {
    MagicConfig::new(iterations, workspace.path().join("magic"))
}

#[rstest]
fn completes_every_round(
    mut problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    let config = config(3, &workspace);
    let output_dir = config.output_dir.clone();

    // number of weight window sets each round was exported with
    let mut installed = Vec::new();

    let outcome = {
        let engine = |directory: &Path| -> Result<()> {
            let exported = ProblemDescription::from_dir(directory)?;
            installed.push(exported.weight_windows().len());
            write_results(directory)
        };

        let mut controller = MagicController::new(config, engine).unwrap();
        controller.run(&mut problem, &tally).unwrap()
    };

    assert!(outcome.is_complete());
    assert!(outcome.failure.is_none());
    assert_eq!(outcome.completed(), 3);
    assert_eq!(
        outcome.history.iter().map(|r| r.round).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    // first round is analogue, later rounds are biased
    assert_eq!(installed, vec![0, 1, 1]);

    for round in 1..=3 {
        let directory = output_dir.join(round.to_string());
        assert!(directory.join("settings.json").exists());
        assert!(Statepoint::path_in(&directory, BATCHES).exists());
    }

    for record in &outcome.history {
        assert_eq!(record.weight_windows.len(), 1);
        assert_eq!(record.weight_windows[0].mesh, *tally.mesh().unwrap());
        assert_eq!(
            record.weight_windows[0].lower_values(),
            vec![0.25, 1.0, 0.5, -1.0]
        );
    }

    let last = outcome.final_weight_windows().unwrap();
    assert_eq!(problem.weight_windows(), last);

    let written = read_weight_windows(output_dir.join(FINAL_WEIGHT_WINDOWS_FILE)).unwrap();
    assert_eq!(written, last);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn stops_at_failed_round(
    #[case] failing_round: usize,
    mut problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    let config = config(4, &workspace);
    let output_dir = config.output_dir.clone();
    let mut runs = 0;

    let outcome = {
        let engine = |directory: &Path| -> Result<()> {
            runs += 1;
            if runs == failing_round {
                return Err(Error::EngineFailed {
                    program: "fake".into(),
                    status: "1".into(),
                });
            }
            write_results(directory)
        };

        let mut controller = MagicController::new(config, engine).unwrap();
        controller.run(&mut problem, &tally).unwrap()
    };

    assert_eq!(runs, failing_round);
    assert_eq!(outcome.requested, 4);
    assert_eq!(outcome.completed(), failing_round - 1);
    assert!(!outcome.is_complete());

    let failure = outcome.failure.unwrap();
    assert_eq!(failure.round, failing_round);
    assert_eq!(failure.state, RoundState::Run);
    assert!(matches!(failure.error, Error::EngineFailed { .. }));

    assert!(!output_dir.join((failing_round + 1).to_string()).exists());
    assert!(!output_dir.join(FINAL_WEIGHT_WINDOWS_FILE).exists());
}

#[rstest]
fn missing_statepoint(mut problem: ProblemDescription, tally: TallySpecification, workspace: TempDir) {
    let engine = |_: &Path| -> Result<()> { Ok(()) };

    let mut controller = MagicController::new(config(2, &workspace), engine).unwrap();
    let outcome = controller.run(&mut problem, &tally).unwrap();

    assert_eq!(outcome.completed(), 0);
    assert!(problem.weight_windows().is_empty());

    let failure = outcome.failure.unwrap();
    assert_eq!(failure.round, 1);
    assert_eq!(failure.state, RoundState::Load);
    assert!(matches!(
        failure.error,
        Error::TallyError(wwforge_tally::Error::IOError(_))
    ));
}

#[rstest]
fn statepoint_without_target_tally(
    mut problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    let engine = |directory: &Path| -> Result<()> {
        let statepoint = Statepoint {
            batches: BATCHES,
            tallies: Vec::new(),
        };
        statepoint.write(Statepoint::path_in(directory, BATCHES))?;
        Ok(())
    };

    let mut controller = MagicController::new(config(2, &workspace), engine).unwrap();
    let failure = controller
        .run(&mut problem, &tally)
        .unwrap()
        .failure
        .unwrap();

    assert_eq!(failure.state, RoundState::Load);
    assert!(matches!(
        failure.error,
        Error::TallyError(wwforge_tally::Error::TallyNotFound(1))
    ));
}

#[rstest]
fn tally_must_be_in_problem(mut problem: ProblemDescription, workspace: TempDir) {
    let mut runs = 0;
    let result = {
        let engine = |_: &Path| -> Result<()> {
            runs += 1;
            Ok(())
        };
        let mut controller = MagicController::new(config(2, &workspace), engine).unwrap();
        controller.run(&mut problem, &TallySpecification::new(99))
    };

    assert!(matches!(result, Err(Error::TallyNotInProblem(99))));
    assert_eq!(runs, 0);
}

#[rstest]
fn bad_tally_fails_before_any_round(workspace: TempDir) {
    let tally = TallySpecification::new(3).with_filter(Filter::Cell(vec![1, 2]));
    let mut problem = ProblemDescription::new(
        json!(null),
        json!(null),
        Settings::new(BATCHES, 10),
        vec![tally.clone()],
    );

    let config = config(2, &workspace);
    let output_dir = config.output_dir.clone();
    let engine = |_: &Path| -> Result<()> { Ok(()) };

    let mut controller = MagicController::new(config, engine).unwrap();
    let result = controller.run(&mut problem, &tally);

    assert!(matches!(result, Err(Error::UnsupportedFilter(_))));
    assert!(!output_dir.exists());
}

#[rstest]
fn zero_iterations_rejected(workspace: TempDir) {
    let engine = |_: &Path| -> Result<()> { Ok(()) };
    let result = MagicController::new(config(0, &workspace), engine);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[rstest]
fn corrupt_results_keep_history(
    mut problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    let mut runs = 0;
    let outcome = {
        let engine = |directory: &Path| -> Result<()> {
            runs += 1;
            if runs == 1 {
                return write_results(directory);
            }
            let statepoint = Statepoint {
                batches: BATCHES,
                tallies: vec![TallyResult {
                    id: 1,
                    filter_bins: vec![4],
                    nuclides: vec!["total".into()],
                    scores: vec!["heating".into()],
                    mean: vec![1.0; 4],
                    rel_err: vec![0.1; 4],
                }],
            };
            statepoint.write(Statepoint::path_in(directory, BATCHES))?;
            Ok(())
        };

        let mut controller = MagicController::new(config(3, &workspace), engine).unwrap();
        controller.run(&mut problem, &tally).unwrap()
    };

    assert_eq!(runs, 2);
    assert_eq!(outcome.completed(), 1);
    assert_eq!(outcome.history.len(), 1);
    assert_eq!(problem.weight_windows(), outcome.final_weight_windows().unwrap());

    let failure = outcome.failure.unwrap();
    assert_eq!(failure.round, 2);
    assert_eq!(failure.state, RoundState::Build);
    assert!(matches!(
        failure.error,
        Error::TallyError(wwforge_tally::Error::ScoreNotFound { id: 1, .. })
    ));
}

#[rstest]
fn stale_statepoint_is_not_reused(
    mut problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    let config = config(2, &workspace);
    let round_dir = config.output_dir.join("1");
    std::fs::create_dir_all(&round_dir).unwrap();
    write_results(&round_dir).unwrap();

    let engine = |_: &Path| -> Result<()> { Ok(()) };
    let mut controller = MagicController::new(config, engine).unwrap();
    let outcome = controller.run(&mut problem, &tally).unwrap();

    assert_eq!(outcome.completed(), 0);
    assert!(outcome.history.is_empty());
    assert!(problem.weight_windows().is_empty());
    assert!(!Statepoint::path_in(&round_dir, BATCHES).exists());

    let failure = outcome.failure.unwrap();
    assert_eq!(failure.round, 1);
    assert_eq!(failure.state, RoundState::Load);
}

/// Worker process that never coordinates and never sees a failure
#[derive(Debug, Default)]
struct Worker {
    agreements: Rc<Cell<usize>>,
}

impl Communicator for Worker {
    fn is_coordinator(&self) -> bool {
        false
    }

    fn all_ok(&self, ok: bool) -> bool {
        self.agreements.set(self.agreements.get() + 1);
        ok
    }
}

#[rstest]
fn workers_only_run_the_engine(
    mut problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    let worker = Worker::default();
    let agreements = Rc::clone(&worker.agreements);

    let config = config(2, &workspace);
    let output_dir = config.output_dir.clone();
    let mut runs: Vec<PathBuf> = Vec::new();

    let outcome = {
        let engine = |directory: &Path| -> Result<()> {
            runs.push(directory.to_path_buf());
            Ok(())
        };
        let mut controller = MagicController::with_communicator(config, engine, worker).unwrap();
        controller.run(&mut problem, &tally).unwrap()
    };

    // export, run, and build are each agreed on once per round
    assert_eq!(agreements.get(), 6);
    assert_eq!(runs, vec![output_dir.join("1"), output_dir.join("2")]);

    assert_eq!(outcome.completed(), 2);
    assert!(outcome.is_complete());
    assert!(outcome.history.is_empty());
    assert!(outcome.final_weight_windows().is_none());
    assert!(!output_dir.exists());
}

/// One of a group of processes running as threads
#[derive(Debug, Clone)]
struct Rank {
    rank: usize,
    barrier: Arc<Barrier>,
    failed: Arc<AtomicBool>,
}

impl Rank {
    fn group(size: usize) -> Vec<Self> {
        let barrier = Arc::new(Barrier::new(size));
        let failed = Arc::new(AtomicBool::new(false));
        (0..size)
            .map(|rank| Self {
                rank,
                barrier: Arc::clone(&barrier),
                failed: Arc::clone(&failed),
            })
            .collect()
    }
}

impl Communicator for Rank {
    fn is_coordinator(&self) -> bool {
        self.rank == 0
    }

    fn all_ok(&self, ok: bool) -> bool {
        if !ok {
            self.failed.store(true, Ordering::SeqCst);
        }
        self.barrier.wait();
        let all_ok = !self.failed.load(Ordering::SeqCst);
        // nobody moves on until everyone has read the flag
        self.barrier.wait();
        all_ok
    }
}

/// Run a coordinator and a worker side by side, returning both outcomes
fn run_pair<A, B>(
    problem: &ProblemDescription,
    tally: &TallySpecification,
    config: MagicConfig,
    coordinator_engine: A,
    worker_engine: B,
) -> (MagicOutcome, MagicOutcome)
where
    A: SimulationEngine + Send,
    B: SimulationEngine + Send,
{
    let mut ranks = Rank::group(2);
    let worker_rank = ranks.pop().unwrap();
    let coordinator_rank = ranks.pop().unwrap();

    thread::scope(|s| {
        let worker_config = config.clone();
        let worker = s.spawn(move || {
            let mut problem = problem.clone();
            let mut controller =
                MagicController::with_communicator(worker_config, worker_engine, worker_rank)
                    .unwrap();
            controller.run(&mut problem, tally).unwrap()
        });

        let mut problem = problem.clone();
        let mut controller =
            MagicController::with_communicator(config, coordinator_engine, coordinator_rank)
                .unwrap();
        let coordinator = controller.run(&mut problem, tally).unwrap();

        (coordinator, worker.join().unwrap())
    })
}

#[rstest]
fn distributed_rounds_complete(
    problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    let config = config(2, &workspace);
    let output_dir = config.output_dir.clone();

    let (coordinator, worker) = run_pair(
        &problem,
        &tally,
        config,
        |directory: &Path| write_results(directory),
        |_: &Path| -> Result<()> { Ok(()) },
    );

    assert!(coordinator.is_complete());
    assert_eq!(coordinator.history.len(), 2);
    assert!(output_dir.join(FINAL_WEIGHT_WINDOWS_FILE).exists());

    assert!(worker.is_complete());
    assert_eq!(worker.completed(), 2);
    assert!(worker.history.is_empty());
}

#[rstest]
fn coordinator_failure_stops_workers(
    problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    // neither engine leaves a statepoint behind
    let (coordinator, worker) = run_pair(
        &problem,
        &tally,
        config(3, &workspace),
        |_: &Path| -> Result<()> { Ok(()) },
        |_: &Path| -> Result<()> { Ok(()) },
    );

    assert_eq!(coordinator.completed(), 0);
    let failure = coordinator.failure.unwrap();
    assert_eq!((failure.round, failure.state), (1, RoundState::Load));
    assert!(matches!(failure.error, Error::TallyError(_)));

    assert_eq!(worker.completed(), 0);
    let failure = worker.failure.unwrap();
    assert_eq!((failure.round, failure.state), (1, RoundState::Build));
    assert!(matches!(failure.error, Error::AbortedByPeer));
}

#[rstest]
fn worker_failure_stops_coordinator(
    problem: ProblemDescription,
    tally: TallySpecification,
    workspace: TempDir,
) {
    let mut worker_runs = 0;
    let worker_engine = |_: &Path| -> Result<()> {
        worker_runs += 1;
        if worker_runs == 2 {
            return Err(Error::EngineFailed {
                program: "fake".into(),
                status: "1".into(),
            });
        }
        Ok(())
    };

    let (coordinator, worker) = run_pair(
        &problem,
        &tally,
        config(3, &workspace),
        |directory: &Path| write_results(directory),
        worker_engine,
    );

    assert_eq!(coordinator.completed(), 1);
    assert_eq!(coordinator.history.len(), 1);
    let failure = coordinator.failure.unwrap();
    assert_eq!((failure.round, failure.state), (2, RoundState::Run));
    assert!(matches!(failure.error, Error::AbortedByPeer));

    assert_eq!(worker.completed(), 1);
    let failure = worker.failure.unwrap();
    assert_eq!((failure.round, failure.state), (2, RoundState::Run));
    assert!(matches!(failure.error, Error::EngineFailed { .. }));
}

#[rstest]
fn problem_export_round_trip(problem: ProblemDescription, workspace: TempDir) {
    let directory = workspace.path().join("model");
    problem.export(&directory).unwrap();

    for file in ["geometry.json", "materials.json", "settings.json", "tallies.json"] {
        assert!(directory.join(file).exists(), "{file} not exported");
    }

    let read = ProblemDescription::from_dir(&directory).unwrap();
    assert_eq!(read, problem);
}

#[rstest]
fn magic_config_from_file(workspace: TempDir) {
    let path = workspace.path().join("magic.json");
    std::fs::write(&path, r#"{"iterations": 2, "generator": {"rel_err_tol": 0.5}}"#).unwrap();

    let config = MagicConfig::from_file(&path).unwrap();
    assert_eq!(config.iterations, 2);
    assert_eq!(config.output_dir, PathBuf::from("magic"));
    assert_eq!(config.generator.rel_err_tol, 0.5);
    assert_eq!(config.generator.score, "flux");

    std::fs::write(&path, r#"{"iterations": 0}"#).unwrap();
    assert!(matches!(
        MagicConfig::from_file(&path),
        Err(Error::InvalidConfig(_))
    ));
}

#[cfg(unix)]
#[rstest]
fn command_engine_runs_in_round_directory(workspace: TempDir) {
    let mut engine = CommandEngine::new("sh").args(["-c", "touch ran"]);
    engine.run(workspace.path()).unwrap();
    assert!(workspace.path().join("ran").exists());
}

#[cfg(unix)]
#[rstest]
fn command_engine_failure(workspace: TempDir) {
    let mut engine = CommandEngine::new("sh").arg("-c").arg("exit 3");
    assert_eq!(engine.command_line(), "sh -c exit 3");

    match engine.run(workspace.path()) {
        Err(Error::EngineFailed { program, status }) => {
            assert_eq!(program, "sh");
            assert_eq!(status, "3");
        }
        other => panic!("expected engine failure, found {other:?}"),
    }
}

#[rstest]
fn command_engine_missing_program(workspace: TempDir) {
    let mut engine = CommandEngine::new("wwforge-no-such-engine");
    assert!(matches!(
        engine.run(workspace.path()),
        Err(Error::EngineLaunch { .. })
    ));
}
