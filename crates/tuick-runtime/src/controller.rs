//! The Session Controller: the state machine that ties the checker,
//! finder, watcher, and control endpoint together for one Tuick
//! invocation.
//!
//! State machine:
//!
//! ```text
//! starting → running → reloading → running → draining → stopped
//!                 ^___________________|
//! ```
//!
//! Each resource (checker, finder, watcher, control endpoint) is owned by
//! exactly one task and reached only through its own handle; the
//! controller never overlaps two checker generations, so a reload always
//! fully tears down the current one before the next is started.

use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tuick_config::TuickConfig;
use tuick_core::{LocationFields, Recipe, Result, TuickError};
use tuick_errorformat::CompiledPattern;

use crate::checker::CheckerRun;
use crate::finder::FinderDriver;
use crate::generation::GenerationTracker;
use crate::watcher::WatcherDriver;

/// Observable state of a session, exposed mainly for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Running,
    Reloading,
    Draining,
    Stopped,
}

/// How one generation's race between checker output, the reload
/// channel, and the finder process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenerationOutcome {
    ReloadRequested,
    Finished,
    FinderExited,
}

/// Everything one `tuick` invocation needs to run the checker, feed the
/// finder, and answer reload requests.
pub struct SessionController {
    checker_command: Vec<String>,
    pattern: Option<CompiledPattern>,
    config: TuickConfig,
    save_path: Option<PathBuf>,
    tracker: GenerationTracker,
    reload_rx: mpsc::Receiver<()>,
    state: SessionState,
}

impl SessionController {
    pub fn new(
        checker_command: Vec<String>,
        recipe_pattern: Option<CompiledPattern>,
        config: TuickConfig,
        save_path: Option<PathBuf>,
        reload_rx: mpsc::Receiver<()>,
    ) -> Self {
        SessionController {
            checker_command,
            pattern: recipe_pattern,
            config,
            save_path,
            tracker: GenerationTracker::new(),
            reload_rx,
            state: SessionState::Starting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn open_save_sink(&self) -> Result<Option<File>> {
        match &self.save_path {
            Some(path) => Ok(Some(
                File::create(path).map_err(TuickError::Io)?,
            )),
            None => Ok(None),
        }
    }

    /// Run one checker generation, racing its output against the reload
    /// channel. The checker is spawned unconditionally at the top (no
    /// side-effecting spawn ever sits inside the `select!` itself, so a
    /// cancelled branch never leaks a process) and torn down before
    /// returning either outcome.
    async fn run_generation(
        tracker: &GenerationTracker,
        checker_command: &[String],
        pattern: Option<CompiledPattern>,
        soft_terminate_ms: u64,
        reload_rx: &mut mpsc::Receiver<()>,
        finder: &mut FinderDriver,
        save_sink: &mut Option<File>,
    ) -> Result<GenerationOutcome> {
        let generation = tracker.current();
        // The checker's stderr and the tee of assembled block content
        // share one save file, via a duplicated descriptor so each
        // generation's checker can write independently of our own
        // writes through `save_sink`.
        let stderr_file = match save_sink.as_ref() {
            Some(sink) => Some(sink.try_clone().map_err(TuickError::Io)?),
            None => None,
        };

        let mut checker = CheckerRun::spawn(generation, checker_command, pattern, stderr_file)?;

        loop {
            tokio::select! {
                biased;

                status = finder.wait() => {
                    let status = status?;
                    info!(%generation, ?status, "finder exited while checker was still running");
                    checker.terminate(soft_terminate_ms).await?;
                    return Ok(GenerationOutcome::FinderExited);
                }

                reload = reload_rx.recv() => {
                    match reload {
                        Some(()) => {
                            info!(%generation, "reload requested, terminating current checker");
                            checker.terminate(soft_terminate_ms).await?;
                            return Ok(GenerationOutcome::ReloadRequested);
                        }
                        None => {
                            warn!("reload channel closed, no further reloads possible");
                            // Keep reading this generation to completion;
                            // just stop selecting on a channel that will
                            // never produce again.
                            let block = checker.parser.next_block().await.map_err(TuickError::Io)?;
                            if !Self::forward_block(block, finder, save_sink).await? {
                                checker.await_exit().await?;
                                return Ok(GenerationOutcome::Finished);
                            }
                        }
                    }
                }

                block = checker.parser.next_block() => {
                    let block = block.map_err(TuickError::Io)?;
                    if !Self::forward_block(block, finder, save_sink).await? {
                        finder.flush().await?;
                        checker.await_exit().await?;
                        return Ok(GenerationOutcome::Finished);
                    }
                }
            }
        }
    }

    /// Forward one parsed block to the finder (and the save-file tee).
    /// Returns `false` when `block` is `None`, meaning the checker's
    /// output has ended.
    async fn forward_block(
        block: Option<tuick_core::Block>,
        finder: &mut FinderDriver,
        save_sink: &mut Option<File>,
    ) -> Result<bool> {
        match block {
            Some(block) => {
                if let Some(sink) = save_sink.as_mut() {
                    let _ = writeln!(sink, "{}", block.content);
                }
                finder.feed(&block).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drive the session: run the first generation, then alternate
    /// between `Running` and `Reloading` as reload requests arrive,
    /// until the finder reports a selection (or the user cancels).
    /// Returns the selected block's location fields, if any.
    pub async fn run(mut self, mut finder: FinderDriver) -> Result<Option<LocationFields>> {
        self.state = SessionState::Running;
        let mut save_sink = self.open_save_sink()?;

        loop {
            let outcome = Self::run_generation(
                &self.tracker,
                &self.checker_command,
                self.pattern.clone(),
                self.config.timeouts.soft_terminate_ms,
                &mut self.reload_rx,
                &mut finder,
                &mut save_sink,
            )
            .await?;

            match outcome {
                GenerationOutcome::ReloadRequested => {
                    self.state = SessionState::Reloading;
                    self.tracker.start_next();
                    self.state = SessionState::Running;
                }
                GenerationOutcome::Finished => break,
                GenerationOutcome::FinderExited => break,
            }
        }

        self.state = SessionState::Draining;
        let selection = finder.await_selection().await?;
        self.state = SessionState::Stopped;
        Ok(selection)
    }

    /// Shut down a watcher driver alongside the controller. Kept as a
    /// separate step since the watcher outlives individual checker
    /// generations and is owned by the caller (`tuick-cli`), not this
    /// struct.
    pub async fn shutdown_watcher(watcher: &mut WatcherDriver) -> Result<()> {
        watcher.shutdown().await
    }
}

/// Convenience for building the checker command line from a recipe and
/// the user-supplied command, used by `tuick-cli`.
pub fn checker_command_for(recipe: &Recipe, command: &[String]) -> Vec<String> {
    let _ = recipe;
    command.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reload_terminates_a_long_running_checker_without_waiting_for_it() {
        let tracker = GenerationTracker::new();
        let command = vec!["sleep".to_string(), "30".to_string()];
        let (reload_tx, mut reload_rx) = mpsc::channel(1);
        let mut finder = FinderDriver::spawn(&["cat".to_string()]).expect("spawn finder");
        let mut save_sink: Option<File> = None;

        reload_tx.try_send(()).expect("queue reload");

        let start = std::time::Instant::now();
        let outcome = SessionController::run_generation(
            &tracker,
            &command,
            None,
            500,
            &mut reload_rx,
            &mut finder,
            &mut save_sink,
        )
        .await
        .expect("run_generation");

        assert_eq!(outcome, GenerationOutcome::ReloadRequested);
        assert!(
            start.elapsed() < std::time::Duration::from_secs(5),
            "reload should cut the 30s sleep short"
        );
    }

    #[tokio::test]
    async fn a_checker_that_finishes_on_its_own_reports_finished() {
        let tracker = GenerationTracker::new();
        let command = vec!["true".to_string()];
        let (_reload_tx, mut reload_rx) = mpsc::channel(1);
        let mut finder = FinderDriver::spawn(&["cat".to_string()]).expect("spawn finder");
        let mut save_sink: Option<File> = None;

        let outcome = SessionController::run_generation(
            &tracker,
            &command,
            None,
            500,
            &mut reload_rx,
            &mut finder,
            &mut save_sink,
        )
        .await
        .expect("run_generation");

        assert_eq!(outcome, GenerationOutcome::Finished);
    }

    #[tokio::test]
    async fn finder_exiting_mid_run_terminates_the_checker_instead_of_erroring() {
        let tracker = GenerationTracker::new();
        let command = vec!["sleep".to_string(), "30".to_string()];
        let (_reload_tx, mut reload_rx) = mpsc::channel(1);
        // "true" exits immediately, simulating the user quitting (or an
        // `enter` binding execing `--select` and replacing the finder)
        // while the checker is still running.
        let mut finder = FinderDriver::spawn(&["true".to_string()]).expect("spawn finder");
        let mut save_sink: Option<File> = None;

        let start = std::time::Instant::now();
        let outcome = SessionController::run_generation(
            &tracker,
            &command,
            None,
            500,
            &mut reload_rx,
            &mut finder,
            &mut save_sink,
        )
        .await
        .expect("run_generation");

        assert_eq!(outcome, GenerationOutcome::FinderExited);
        assert!(
            start.elapsed() < std::time::Duration::from_secs(5),
            "finder exit should cut the 30s sleep short"
        );
    }
}
