use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tuick_core::{Result, TuickError};

use crate::schema::TuickConfig;

/// Loads the Tuick configuration once at startup. There is no
/// hot-reload here — Tuick's reload concept is the checker re-run
/// triggered by the session controller, not a config-file watch, so
/// there is nothing here to keep live.
pub struct ConfigLoader {
    config: TuickConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > `TUICK_CONFIG` env >
    /// `~/.config/tuick/config.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("TUICK_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tuick")
            .join("config.toml")
    }

    /// Load the config from disk, falling back to defaults if the file is
    /// absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            toml::from_str::<TuickConfig>(&raw).map_err(|e| {
                TuickError::Config(format!("failed to parse {}: {}", config_path.display(), e))
            })?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            TuickConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn get(&self) -> &TuickConfig {
        &self.config
    }

    /// Path the config was (or would have been) read from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn apply_env_overrides(mut config: TuickConfig) -> TuickConfig {
        if let Ok(v) = std::env::var("TUICK_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("TUICK_EDITOR") {
            config.editors.default = v;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolve_path_prefers_explicit_over_env() {
        let explicit = PathBuf::from("/tmp/explicit.toml");
        let path = ConfigLoader::resolve_path(Some(&explicit));
        assert_eq!(path, explicit);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        let loader = ConfigLoader::load(Some(&path)).expect("load");
        assert_eq!(loader.get().editors.default, "generic-editor-env");
    }

    #[test]
    fn loads_and_parses_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[timeouts]\nsoft_terminate_ms = 5000").unwrap();
        let loader = ConfigLoader::load(Some(&path)).expect("load");
        assert_eq!(loader.get().timeouts.soft_terminate_ms, 5000);
        assert_eq!(loader.get().timeouts.control_read_ms, 2000);
    }
}
