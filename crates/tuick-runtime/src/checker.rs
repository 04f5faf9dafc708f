//! The Checker Runner: spawns the user's checker command in its own
//! process group and streams its stdout through the errorformat
//! adapter, one Block Record at a time.
//!
//! The checker is a plain piped child, not a PTY — Tuick only needs its
//! stdout/stderr, never a terminal. Termination is two-phase: a `SIGTERM`
//! to the whole process group, then a `SIGKILL` if it hasn't exited
//! within the configured grace period.

use std::os::unix::process::CommandExt;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};
use tuick_core::{GenerationId, Result, TuickError};
use tuick_errorformat::{CompiledPattern, LineParser};

/// A running checker process plus the line parser reading its stdout.
pub struct CheckerRun {
    pub generation: GenerationId,
    child: Child,
    pub parser: LineParser<BufReader<tokio::process::ChildStdout>>,
}

impl CheckerRun {
    /// Spawn `command` as a new process group leader. `stderr_sink`, if
    /// given, receives the checker's stderr directly (the save file);
    /// otherwise stderr is inherited and discarded per the "show
    /// nothing for stderr-only output" decision in `DESIGN.md`.
    pub fn spawn(
        generation: GenerationId,
        command: &[String],
        pattern: Option<CompiledPattern>,
        stderr_sink: Option<std::fs::File>,
    ) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| TuickError::Usage("empty checker command".into()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped());

        match stderr_sink {
            Some(file) => {
                cmd.stderr(Stdio::from(file));
            }
            None => {
                cmd.stderr(Stdio::null());
            }
        }

        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|e| {
            TuickError::CheckerNotFound(format!("{program}: {e}"))
        })?;

        let stdout = child
            .stdout
            .take()
            .expect("stdout was piped at spawn time");
        let parser = LineParser::new(BufReader::new(stdout), pattern);

        info!(generation = %generation, command = %program, "checker started");
        Ok(CheckerRun {
            generation,
            child,
            parser,
        })
    }

    fn pgid(&self) -> i32 {
        self.child.id().expect("child has not been reaped") as i32
    }

    /// Two-phase termination: `SIGTERM` the whole process group, give it
    /// `soft_terminate_ms` to exit, then `SIGKILL` if it hasn't.
    /// "No such process" on either signal means it already exited — not
    /// an error.
    pub async fn terminate(&mut self, soft_terminate_ms: u64) -> Result<()> {
        let pgid = self.pgid();
        send_signal(pgid, libc::SIGTERM);

        let soft_wait = tokio::time::timeout(
            Duration::from_millis(soft_terminate_ms),
            self.child.wait(),
        )
        .await;

        match soft_wait {
            Ok(Ok(status)) => {
                debug!(generation = %self.generation, ?status, "checker exited after SIGTERM");
                return Ok(());
            }
            Ok(Err(e)) => return Err(TuickError::Io(e)),
            Err(_timed_out) => {
                warn!(generation = %self.generation, "checker ignored SIGTERM, sending SIGKILL");
            }
        }

        send_signal(pgid, libc::SIGKILL);
        self.child.wait().await.map_err(TuickError::Io)?;
        Ok(())
    }

    /// Wait for the checker to exit on its own (normal completion, not
    /// a reload-triggered termination).
    pub async fn await_exit(&mut self) -> Result<std::process::ExitStatus> {
        self.child.wait().await.map_err(TuickError::Io)
    }
}

fn send_signal(pgid: i32, signal: i32) {
    // Negative pid targets the whole process group (see `man 2 kill`).
    let ret = unsafe { libc::kill(-pgid, signal) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            warn!(pgid, signal, %err, "failed to signal checker process group");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruff_pattern() -> CompiledPattern {
        CompiledPattern::compile("%f:%l:%c: %m").unwrap()
    }

    #[tokio::test]
    async fn spawns_and_parses_a_single_anchored_block() {
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo 'a.py:3:5: oops'".to_string(),
        ];
        let mut run = CheckerRun::spawn(GenerationId::FIRST, &command, Some(ruff_pattern()), None)
            .expect("spawn");

        let block = run.parser.next_block().await.unwrap().unwrap();
        assert_eq!(block.file, "a.py");
        assert_eq!(block.line, Some(3));

        assert!(run.parser.next_block().await.unwrap().is_none());
        run.await_exit().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_checker_binary_reports_checker_not_found() {
        let command = vec!["tuick-does-not-exist-anywhere".to_string()];
        let err = CheckerRun::spawn(GenerationId::FIRST, &command, None, None).unwrap_err();
        assert!(matches!(err, TuickError::CheckerNotFound(_)));
    }

    #[tokio::test]
    async fn terminate_stops_a_long_running_checker_via_sigterm() {
        let command = vec!["sleep".to_string(), "30".to_string()];
        let mut run = CheckerRun::spawn(GenerationId::FIRST, &command, None, None).expect("spawn");
        run.terminate(500).await.expect("terminate");
    }
}
