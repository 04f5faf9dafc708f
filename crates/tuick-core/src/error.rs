use thiserror::Error;

/// Unified error type for the Tuick orchestration core.
///
/// Each variant maps to one exit code / user-visible behaviour named in
/// the error handling design; see [`TuickError::exit_code`].
#[derive(Error, Debug)]
pub enum TuickError {
    // ── Usage errors ───────────────────────────────────────────
    #[error("unknown checker tool: {0} (pass -f <name> or -e <pattern>)")]
    ToolNotDetected(String),

    #[error("invalid errorformat pattern: {0}")]
    PatternError(String),

    #[error("usage error: {0}")]
    Usage(String),

    // ── Child startup / process failures ──────────────────────
    #[error("checker binary not found: {0}")]
    CheckerNotFound(String),

    #[error("errorformat helper not found on PATH: {0}")]
    HelperNotFound(String),

    #[error("finder process failed to start: {0}")]
    FinderStartFailed(String),

    #[error("watcher process failed to start: {0}")]
    WatcherStartFailed(String),

    // ── Block record errors ────────────────────────────────────
    #[error("block content contains a reserved delimiter byte")]
    BlockEncoding,

    // ── Control endpoint errors ────────────────────────────────
    #[error("reload request rejected: {0}")]
    ReloadRejected(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TuickError>;

impl TuickError {
    /// CLI exit code for this error (0 normal, 1 usage, 2 checker/helper
    /// not found, 3 unexpected internal error).
    pub fn exit_code(&self) -> i32 {
        match self {
            TuickError::Usage(_) | TuickError::PatternError(_) => 1,
            TuickError::ToolNotDetected(_)
            | TuickError::CheckerNotFound(_)
            | TuickError::HelperNotFound(_) => 2,
            _ => 3,
        }
    }
}
