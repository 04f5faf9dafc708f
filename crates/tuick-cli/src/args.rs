//! The flat, mutually-exclusive flag surface described in
//! Tuick has no subcommands: which of the four
//! invocation forms is active is decided by which of `--format`,
//! `--reload`, `--select` is set (none of them set means "run the
//! session").

use std::path::PathBuf;

use clap::Parser;

/// An interactive TUI front-end for compilers and checkers.
#[derive(Parser, Debug)]
#[command(name = "tuick", version, about, long_about = None)]
pub struct Cli {
    /// Run COMMAND, emit the block-stream serialisation to stdout, and
    /// exit — used by build tools that want the raw stream without the
    /// finder.
    #[arg(long, conflicts_with_all = ["reload", "select"])]
    pub format: bool,

    /// Internal callback: post a reload to the running session's
    /// control endpoint (reading `TUICK_RELOAD_PORT` / `TUICK_RELOAD_KEY`
    /// from the environment), then run COMMAND if one was given.
    #[arg(long, conflicts_with_all = ["format", "select"])]
    pub reload: bool,

    /// Internal callback: open the configured editor at a location.
    /// Takes exactly five positional arguments: FILE LINE COL END_LINE
    /// END_COL (the latter four may be empty strings).
    #[arg(long, conflicts_with_all = ["format", "reload"])]
    pub select: bool,

    /// Recipe selection: `auto` (default) detects the tool from
    /// COMMAND; otherwise names a built-in recipe.
    #[arg(short = 'f', long, default_value = "auto")]
    pub tool: String,

    /// A raw errorformat pattern, overriding recipe selection entirely.
    #[arg(short = 'e', long)]
    pub pattern: Option<String>,

    /// Command used to open the fuzzy-finder. Defaults to `fzf --ansi`.
    #[arg(long)]
    pub finder: Option<String>,

    /// Command used to watch for file changes and trigger a reload.
    /// With no watcher, only manual and control-endpoint reloads apply.
    #[arg(long)]
    pub watch: Option<String>,

    /// Path to the tuick config file (see `tuick-config`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all log output but errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// COMMAND (and its ARGS), or the positional arguments to
    /// `--select`, depending on which mode flag is set.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Which invocation form this parse selected.
    pub fn mode(&self) -> Mode {
        if self.format {
            Mode::Format
        } else if self.reload {
            Mode::Reload
        } else if self.select {
            Mode::Select
        } else {
            Mode::Session
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Session,
    Format,
    Reload,
    Select,
}
