//! Command-line surface for Tuick. Dispatches the four invocation forms
//! named: the session, `--format`, `--reload`, and `--select`.
//!
//! Config loading and tracing-subscriber initialisation mirror
//! `claw-cli/src/commands.rs`'s `Cli::run` preamble: `--verbose` beats
//! `--quiet` beats the config file's `logging.level`, and `logging.format
//! == "json"` switches the subscriber to JSON output.

pub mod args;
pub mod format_mode;
pub mod reload;
pub mod select;

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::info;
use tuick_config::{ConfigLoader, TuickConfig};
use tuick_control::ControlEndpoint;
use tuick_core::{LocationFields, Result, TuickError};
use tuick_errorformat::{CompiledPattern, resolve_recipe};
use tuick_runtime::{FinderDriver, SessionController, WatcherDriver};

pub use args::{Cli, Mode};

/// At most one reload is ever held pending; later ones coalesce.
const RELOAD_QUEUE_DEPTH: usize = 1;

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get().clone();

        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            config.logging.level.as_str()
        };

        if config.logging.format == "json" {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
                )
                .json()
                .with_target(true)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
                )
                .with_target(false)
                .init();
        }

        match self.mode() {
            Mode::Format => self.run_format().await,
            Mode::Reload => self.run_reload().await,
            Mode::Select => self.run_select(&config).await,
            Mode::Session => self.run_session(config).await,
        }
    }

    async fn run_format(&self) -> Result<()> {
        if self.args.is_empty() {
            return Err(TuickError::Usage("--format requires a COMMAND".into()));
        }
        format_mode::run(self.args.clone(), &self.tool, self.pattern.as_deref()).await
    }

    async fn run_reload(&self) -> Result<()> {
        reload::post_reload().await?;
        if let Some((program, rest)) = self.args.split_first() {
            let status = tokio::process::Command::new(program)
                .args(rest)
                .status()
                .await
                .map_err(TuickError::Io)?;
            if !status.success() {
                return Err(TuickError::Usage(format!(
                    "reload callback command exited with {status}"
                )));
            }
        }
        Ok(())
    }

    async fn run_select(&self, config: &TuickConfig) -> Result<()> {
        let location = parse_select_args(&self.args)?;
        select::launch(&config.editors, None, &location).await
    }

    async fn run_session(self, config: TuickConfig) -> Result<()> {
        if self.args.is_empty() {
            return Err(TuickError::Usage("COMMAND is required".into()));
        }

        let explicit_tool = (self.tool != "auto").then_some(self.tool.as_str());
        let recipe = resolve_recipe(&self.args, explicit_tool, self.pattern.as_deref())?;
        let compiled_pattern = CompiledPattern::compile(&recipe.pattern)?;

        let finder_command = match self.finder.as_deref() {
            Some(custom) => shell_words(custom),
            None => default_finder_command(),
        };
        let finder = FinderDriver::spawn(&finder_command)?;

        let (reload_tx, reload_rx) = mpsc::channel(RELOAD_QUEUE_DEPTH);
        let endpoint = ControlEndpoint::start(reload_tx)
            .await
            .map_err(TuickError::Io)?;
        info!(port = endpoint.port, "control endpoint listening on loopback");

        let mut watcher = match &self.watch {
            Some(command) => WatcherDriver::spawn(&shell_words(command), &endpoint)?,
            None => WatcherDriver::none(),
        };

        let editors = config.editors.clone();
        let save_path = session_save_path();
        let controller = SessionController::new(
            self.args.clone(),
            Some(compiled_pattern),
            config,
            Some(save_path.clone()),
            reload_rx,
        );

        let selection = controller.run(finder).await;

        watcher.shutdown().await?;
        endpoint.shutdown().await;

        match selection? {
            Some(location) => select::launch(&editors, None, &location).await?,
            None => print_save_file_tail(&save_path)?,
        }

        Ok(())
    }
}

/// Every `tuick` invocation gets its own append-only save file under the
/// system temp directory, named after the process id so concurrent
/// sessions never collide.
fn session_save_path() -> PathBuf {
    std::env::temp_dir().join(format!("tuick-{}.log", std::process::id()))
}

/// On a normal exit with no selection made, print the last completed
/// checker run's raw output back to the terminal so the
/// result remains visible after the finder closes.
fn print_save_file_tail(path: &std::path::Path) -> Result<()> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            print!("{contents}");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TuickError::Io(e)),
    }
}

/// Parse the five positional `--select` arguments: FILE LINE COL END_LINE
/// END_COL, where the latter four may be empty strings meaning "absent".
fn parse_select_args(args: &[String]) -> Result<LocationFields> {
    if args.len() != 5 {
        return Err(TuickError::Usage(format!(
            "--select requires exactly 5 arguments (FILE LINE COL END_LINE END_COL), got {}",
            args.len()
        )));
    }
    let field = |s: &str| -> Option<u32> { if s.is_empty() { None } else { s.parse().ok() } };
    Ok(LocationFields {
        file: args[0].clone(),
        line: field(&args[1]),
        col: field(&args[2]),
        end_line: field(&args[3]),
        end_col: field(&args[4]),
    })
}

/// Minimal whitespace-only command-line splitting for user-supplied
/// `--finder`/`--watch` overrides: no quoting support. The built-in
/// default finder command is assembled directly as a `Vec<String>`
/// instead (see [`default_finder_command`]) since its `--bind` values
/// themselves contain spaces.
fn shell_words(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// The built-in finder command: `fzf`, configured per §4.5 —
/// display field 6 only, `zero:abort` so an empty filtered result
/// exits instead of leaving an empty finder open, a manual-reload
/// binding that posts a `reload` to the control endpoint without
/// blocking the UI, and an `enter` binding that hands the highlighted
/// block's location fields straight to the `--select` callback.
fn default_finder_command() -> Vec<String> {
    vec![
        "fzf".into(),
        "--ansi".into(),
        "--delimiter=\x1f".into(),
        "--with-nth=6".into(),
        "--bind".into(),
        "zero:abort".into(),
        "--bind".into(),
        "ctrl-r:execute-silent(tuick --reload)".into(),
        "--bind".into(),
        "enter:become(tuick --select {1} {2} {3} {4} {5})".into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_select_args_treats_empty_strings_as_absent() {
        let loc = parse_select_args(&[
            "a.py".into(),
            "3".into(),
            "".into(),
            "".into(),
            "".into(),
        ])
        .unwrap();
        assert_eq!(loc.file, "a.py");
        assert_eq!(loc.line, Some(3));
        assert_eq!(loc.col, None);
    }

    #[test]
    fn parse_select_args_rejects_wrong_arity() {
        let err = parse_select_args(&["a.py".into()]).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn shell_words_splits_on_whitespace() {
        assert_eq!(
            shell_words("fzf --ansi --delimiter=\x1f"),
            vec!["fzf", "--ansi", "--delimiter=\x1f"]
        );
    }

    #[test]
    fn default_finder_command_wires_reload_and_zero_abort_bindings() {
        let command = default_finder_command();
        assert_eq!(command[0], "fzf");
        assert!(command.contains(&"zero:abort".to_string()));
        assert!(
            command
                .iter()
                .any(|arg| arg.contains("execute-silent(tuick --reload)"))
        );
        assert!(
            command
                .iter()
                .any(|arg| arg.contains("become(tuick --select {1} {2} {3} {4} {5})"))
        );
    }
}
