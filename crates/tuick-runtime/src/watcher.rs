//! The Watcher Driver: supervises an optional external file-watcher
//! process (e.g. `watchexec`) configured by the user to call back into
//! the control endpoint on a file change.
//!
//! Tuick does not watch files itself — it treats the
//! watcher as an arbitrary external command the user wires up with the
//! control endpoint's published port and token (passed through the
//! environment as `TUICK_RELOAD_PORT` / `TUICK_RELOAD_KEY`, per §6),
//! matching the config layer's dropped `notify`-based hot-reload in
//! favour of "the checker re-run is the only reload concept Tuick has"
//! (see `DESIGN.md`). The watcher's change action is typically `tuick
//! --reload`, which reads those two variables to post the actual
//! request.

use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::info;
use tuick_control::ControlEndpoint;
use tuick_core::{Result, TuickError};

/// A supervised watcher child process, or nothing if the session was
/// started without a watcher command.
pub struct WatcherDriver {
    child: Option<Child>,
}

impl WatcherDriver {
    /// No watcher configured: a no-op driver whose `shutdown` is a
    /// no-op too.
    pub fn none() -> Self {
        WatcherDriver { child: None }
    }

    /// Spawn `command`, publishing the control endpoint's port and
    /// reload token via `TUICK_RELOAD_PORT` / `TUICK_RELOAD_KEY` (§6).
    pub fn spawn(command: &[String], endpoint: &ControlEndpoint) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| TuickError::Usage("empty watcher command".into()))?;

        let child = Command::new(program)
            .args(args)
            .env("TUICK_RELOAD_PORT", endpoint.port.to_string())
            .env("TUICK_RELOAD_KEY", endpoint.token.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TuickError::WatcherStartFailed(format!("{program}: {e}")))?;

        info!(command = %program, "watcher started");
        Ok(WatcherDriver { child: Some(child) })
    }

    /// Terminate the watcher process, if one is running. The watcher is
    /// a simple supervised child, not a process group leader — a plain
    /// `SIGKILL`-by-drop via `Child::kill` is sufficient since it has
    /// no children of its own that need cleaning up.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            child.kill().await.map_err(TuickError::Io)?;
        }
        Ok(())
    }
}
