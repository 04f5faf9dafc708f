//! # tuick-config
//!
//! Configuration for Tuick. Reads from `~/.config/tuick/config.toml`,
//! environment variables, and CLI overrides — in that precedence order.
//! Loaded once at startup; there is no hot-reload here (the session's own
//! reload concept is the checker re-run, not a config-file watch).

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{EditorsConfig, LoggingConfig, TimeoutsConfig, TuickConfig, WatcherConfig};
