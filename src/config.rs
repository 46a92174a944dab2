//! Configuration resolution for tunesmith
//!
//! Two-tier resolution with ENV → TOML priority. Each credential resolves
//! independently; a missing credential disables the endpoints that need it
//! (surfaced as 503 at request time) rather than aborting startup.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default listen address when neither ENV nor TOML specify one.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";

/// Raw TOML config file shape (`~/.config/tunesmith/tunesmith.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub lastfm_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
}

/// Resolved service configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub bind_addr: Option<String>,
    pub lastfm_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl Config {
    /// Resolve configuration from the environment and the TOML file.
    pub fn resolve() -> Self {
        let toml_config = load_toml_config();

        let config = Self {
            bind_addr: resolve_value(
                "bind_addr",
                "TUNESMITH_BIND_ADDR",
                toml_config.bind_addr.as_deref(),
            ),
            lastfm_api_key: resolve_value(
                "lastfm_api_key",
                "TUNESMITH_LASTFM_API_KEY",
                toml_config.lastfm_api_key.as_deref(),
            ),
            openai_api_key: resolve_value(
                "openai_api_key",
                "TUNESMITH_OPENAI_API_KEY",
                toml_config.openai_api_key.as_deref(),
            ),
            youtube_api_key: resolve_value(
                "youtube_api_key",
                "TUNESMITH_YOUTUBE_API_KEY",
                toml_config.youtube_api_key.as_deref(),
            ),
        };

        if config.lastfm_api_key.is_none() {
            warn!(
                "Last.fm API key not configured (TUNESMITH_LASTFM_API_KEY); \
                 search, playlist and refine endpoints will be unavailable"
            );
        }
        if config.openai_api_key.is_none() {
            warn!(
                "OpenAI API key not configured (TUNESMITH_OPENAI_API_KEY); \
                 question generation and discovery will be unavailable"
            );
        }
        if config.youtube_api_key.is_none() {
            warn!("YouTube API key not configured (TUNESMITH_YOUTUBE_API_KEY); video lookup disabled");
        }

        config
    }

    /// Listen address, falling back to the compiled default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }
}

/// Resolve one value with ENV → TOML priority, warning when both are set.
fn resolve_value(name: &str, env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v)).map(str::to_string);

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment and TOML; using environment (highest priority)",
            name
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", name);
        return Some(value);
    }

    if let Some(value) = toml_value {
        info!("{} loaded from TOML config", name);
        return Some(value);
    }

    None
}

/// Validate a configured value (non-empty, non-whitespace).
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Read the TOML config file, if one exists. Parse failures are logged and
/// treated as an absent file.
fn load_toml_config() -> TomlConfig {
    let Some(path) = config_file_path() else {
        return TomlConfig::default();
    };
    if !path.exists() {
        return TomlConfig::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                TomlConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Config file location: `$TUNESMITH_CONFIG` override, then the platform
/// config directory.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TUNESMITH_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("tunesmith").join("tunesmith.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for var in [
            "TUNESMITH_CONFIG",
            "TUNESMITH_BIND_ADDR",
            "TUNESMITH_LASTFM_API_KEY",
            "TUNESMITH_OPENAI_API_KEY",
            "TUNESMITH_YOUTUBE_API_KEY",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn env_takes_priority_over_toml() {
        clear_env();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lastfm_api_key = \"from-toml\"").unwrap();
        std::env::set_var("TUNESMITH_CONFIG", file.path());
        std::env::set_var("TUNESMITH_LASTFM_API_KEY", "from-env");

        let config = Config::resolve();
        assert_eq!(config.lastfm_api_key.as_deref(), Some("from-env"));

        clear_env();
    }

    #[test]
    #[serial]
    fn toml_used_when_env_absent() {
        clear_env();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "openai_api_key = \"sk-toml\"").unwrap();
        writeln!(file, "bind_addr = \"127.0.0.1:9999\"").unwrap();
        std::env::set_var("TUNESMITH_CONFIG", file.path());

        let config = Config::resolve();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-toml"));
        assert_eq!(config.bind_addr(), "127.0.0.1:9999");
        assert!(config.lastfm_api_key.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn whitespace_keys_are_rejected() {
        clear_env();
        std::env::set_var("TUNESMITH_LASTFM_API_KEY", "   ");

        let config = Config::resolve();
        assert!(config.lastfm_api_key.is_none());

        clear_env();
    }

    #[test]
    fn default_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn key_validation() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("  \t"));
    }
}
