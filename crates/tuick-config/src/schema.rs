use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration — maps to `~/.config/tuick/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuickConfig {
    pub editors: EditorsConfig,
    pub timeouts: TimeoutsConfig,
    pub watcher: WatcherConfig,
    pub recipes: HashMap<String, String>,
    pub logging: LoggingConfig,
}

impl Default for TuickConfig {
    fn default() -> Self {
        Self {
            editors: EditorsConfig::default(),
            timeouts: TimeoutsConfig::default(),
            watcher: WatcherConfig::default(),
            recipes: HashMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

// ── Editors ────────────────────────────────────────────────────

/// The "small registry" of editor URL/command templates referenced by
/// the `select` callback. Each template may use `{file}`, `{line}`,
/// `{col}` placeholders; placeholders whose field is absent are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorsConfig {
    /// Which named scheme to launch by default.
    pub default: String,
    /// name -> command template, e.g. `"code --goto {file}:{line}:{col}"`.
    pub schemes: HashMap<String, String>,
}

impl Default for EditorsConfig {
    fn default() -> Self {
        let mut schemes = HashMap::new();
        schemes.insert("vscode".into(), "code --goto {file}:{line}:{col}".into());
        schemes.insert(
            "nvim-remote".into(),
            "nvim --server /tmp/nvim.sock --remote {file} +{line}".into(),
        );
        schemes.insert("generic-editor-env".into(), "$EDITOR {file}:{line}:{col}".into());
        Self {
            default: "generic-editor-env".into(),
            schemes,
        }
    }
}

// ── Timeouts ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Soft-terminate timeout before a hard kill, in milliseconds.
    pub soft_terminate_ms: u64,
    /// Read timeout on control-endpoint requests, in milliseconds.
    pub control_read_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            soft_terminate_ms: 2_000,
            control_read_ms: 2_000,
        }
    }
}

// ── Watcher ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Glob patterns to include. Empty means "everything".
    pub include: Vec<String>,
    /// Glob patterns to exclude.
    pub exclude: Vec<String>,
    /// Debounce interval in milliseconds before a filesystem change is
    /// reported as a reload.
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            include: vec![],
            exclude: vec![".git/".into(), "target/".into(), "node_modules/".into()],
            debounce_ms: 300,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty" or "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
