//! The Finder Driver: owns the external fuzzy-finder child process for
//! the life of a session, feeds it Block Records as they arrive from
//! the checker, and reports the block the user selected.
//!
//! Unlike the checker, the finder process itself is long-lived across
//! reloads — only the *stream feeding it* changes generation. This is
//! an atomic finder-stream cutover: once
//! a new generation's blocks start arriving, the driver stops writing
//! blocks from the old generation (enforced by the caller checking
//! `GenerationTracker::is_current` before calling [`FinderDriver::feed`]).

use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tracing::{debug, info};
use tuick_core::{Block, LocationFields, Result, TuickError};

/// A running fuzzy-finder process.
pub struct FinderDriver {
    child: Child,
    stdin: ChildStdin,
}

impl FinderDriver {
    /// Spawn the configured finder command (e.g. `fzf --ansi`). Its
    /// stdin receives encoded Block Records; its stdout, once the
    /// process exits after a selection, carries the chosen block.
    pub fn spawn(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| TuickError::Usage("empty finder command".into()))?;

        let mut child = spawn_child(program, args)?;
        let stdin = child
            .stdin
            .take()
            .expect("stdin was piped at spawn time");

        info!(command = %program, "finder started");
        Ok(FinderDriver { child, stdin })
    }

    /// Write one block onto the finder's input stream. Blocks with no
    /// location (informational) are still fed — the finder displays
    /// them but `--select` has nothing to jump to.
    pub async fn feed(&mut self, block: &Block) -> Result<()> {
        let encoded = block.sanitized().encode()?;
        self.stdin
            .write_all(&encoded)
            .await
            .map_err(TuickError::Io)
    }

    /// Flush the input stream. Called once a generation finishes
    /// emitting blocks, whether it ran to completion or was cut over
    /// by a reload.
    pub async fn flush(&mut self) -> Result<()> {
        self.stdin.flush().await.map_err(TuickError::Io)
    }

    /// Wait for the finder child to exit, without consuming `self`.
    /// Safe to race in a `select!` alongside checker output and reload
    /// events: the user may quit (or select, via an `enter` binding
    /// that execs `--select` itself) while a generation is still
    /// producing blocks, and the controller needs to notice without
    /// going on to write into the finder's now-closed stdin.
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus> {
        self.child.wait().await.map_err(TuickError::Io)
    }

    /// Wait for the user to make a selection (the finder process
    /// exits) and decode the location fields of the chosen block from
    /// its stdout. Returns `None` if the finder exited without a
    /// selection (e.g. the user cancelled with Escape).
    pub async fn await_selection(mut self) -> Result<Option<LocationFields>> {
        let mut stdout = self.child.stdout.take();
        // Drop our side of stdin so the finder sees EOF if it's still
        // waiting on input when the user quits without selecting.
        drop(self.stdin);

        let status = self.child.wait().await.map_err(TuickError::Io)?;
        if !status.success() {
            debug!(?status, "finder exited without a selection");
            return Ok(None);
        }

        let mut out = Vec::new();
        if let Some(stdout) = stdout.as_mut() {
            stdout.read_to_end(&mut out).await.map_err(TuickError::Io)?;
        }
        if out.is_empty() {
            return Ok(None);
        }
        Ok(Some(Block::decode_location(&out)))
    }
}

fn spawn_child(program: &str, args: &[String]) -> Result<Child> {
    tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| TuickError::FinderStartFailed(format!("{program}: {e}")))
}
