//! Coordination between cooperating engine processes

/// Minimal view of a group of cooperating processes
///
/// When the engine runs distributed, every process drives its own controller
/// but only the coordinator exports the problem, reads results, and installs
/// weight windows.
///
/// Processes agree on the outcome of each stage of a round with
/// [Communicator::all_ok()]. This is collective: every process must call it the
/// same number of times, and none returns until all have arrived. A failure on
/// any one process is therefore seen by all of them, and the whole group stops
/// together instead of leaving someone waiting.
pub trait Communicator {
    /// Whether this process does the exporting, loading, and installing
    fn is_coordinator(&self) -> bool;

    /// Block until every process has reported, true only if all passed `ok`
    fn all_ok(&self, ok: bool) -> bool;
}

/// A lone process, always the coordinator
///
/// ```rust
/// # use wwforge_wwgen::{Communicator, SingleProcess};
/// assert!(SingleProcess.is_coordinator());
/// assert!(!SingleProcess.all_ok(false));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn is_coordinator(&self) -> bool {
        true
    }

    fn all_ok(&self, ok: bool) -> bool {
        ok
    }
}
