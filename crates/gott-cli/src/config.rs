//! Configuration loading and management.

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Editor used when neither the config nor the environment names one.
pub const FALLBACK_EDITOR: &str = "vi";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the interval store.
    pub database_path: PathBuf,

    /// Editor command for `gott edit`, e.g. `code --wait`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("db.json"),
            editor: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations, optionally layering a
    /// specific file on top.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // GOTT_DATABASE_PATH, GOTT_EDITOR
        figment = figment.merge(Env::prefixed("GOTT_"));

        figment.extract()
    }

    /// The editor command: the configured one, else `$VISUAL`, else
    /// `$EDITOR`, else `vi`.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| env::var("VISUAL").ok())
            .or_else(|| env::var("EDITOR").ok())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
    }
}

/// Returns the platform-specific config directory for gott.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gott"))
}

/// Returns the platform-specific data directory for gott.
///
/// On Linux: `~/.local/share/gott`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("gott"))
}
