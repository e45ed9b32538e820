//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Reject events that arrive out of `(period, seconds)` order.
    #[serde(default)]
    pub strict_ordering: bool,

    /// Append `match,period,seconds` lines here after each analysis.
    #[serde(default)]
    pub csv_export_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("et.db"),
            strict_ordering: false,
            csv_export_path: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `config.toml` in the platform config
    /// directory, the given file, then `ET_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(config_path).extract()
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("ET_"))
    }
}

/// Returns the platform-specific config directory for et.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("et"))
}

/// Returns the platform-specific data directory for et.
///
/// On Linux: `~/.local/share/et`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("et"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("et.db"));
        assert!(!config.strict_ordering);
        assert!(config.csv_export_path.is_none());
    }

    #[test]
    fn test_data_path_ends_with_et() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "et");
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("et.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/matches.db\"\nstrict_ordering = true\ncsv_export_path = \"/tmp/effective.csv\"\n",
        )
        .unwrap();

        let config: Config = Config::figment(Some(&path)).extract().unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/matches.db"));
        assert!(config.strict_ordering);
        assert_eq!(
            config.csv_export_path,
            Some(PathBuf::from("/tmp/effective.csv"))
        );
    }
}
