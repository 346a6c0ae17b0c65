//! Pathway configuration.
//!
//! Loaded from `~/.pathway/config.toml` (or `$PATHWAY_HOME/config.toml`).
//! Every key is optional; a missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::validate::Policy;

/// Environment variable that overrides the Pathway home directory.
pub const HOME_ENV: &str = "PATHWAY_HOME";

/// Pathway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Stage gate thresholds and activity matching.
    #[serde(flatten)]
    pub policy: Policy,

    /// Default tracing filter, e.g. `"info"` or `"pathway=debug"`.
    /// `RUST_LOG` takes precedence.
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            log: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from the Pathway home.
    /// Returns defaults if the file is missing, an error if it is invalid.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        Self::from_toml(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The config file path: `config.toml` in the Pathway home.
    pub fn path() -> Option<PathBuf> {
        home().map(|h| h.join("config.toml"))
    }

    pub fn policy(&self) -> Policy {
        self.policy.clone()
    }
}

/// `$PATHWAY_HOME` if set, otherwise `~/.pathway`.
pub fn home() -> Option<PathBuf> {
    match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|h| h.join(".pathway")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::extract::UnmatchedActivity;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.policy.strict_deliverables);
        assert_eq!(config.policy.min_rubric_criteria, 2);
        assert_eq!(config.log, "warn");
    }

    #[test]
    fn kebab_case_keys() {
        let config = Config::from_toml(
            r#"
            strict-deliverables = true
            min-rubric-criteria = 3
            unmatched-activity = "reject"
            log = "pathway=debug"
            "#,
        )
        .unwrap();

        assert!(config.policy.strict_deliverables);
        assert_eq!(config.policy.min_rubric_criteria, 3);
        assert_eq!(config.policy.min_milestones, 1);
        assert_eq!(config.policy.unmatched_activity, UnmatchedActivity::Reject);
        assert_eq!(config.log, "pathway=debug");
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(Config::from_toml(r#"unmatched-activity = "guess""#).is_err());
        assert!(Config::from_toml("min-milestones = -1").is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_file_names_its_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "strict-deliverables = \"very\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("invalid config at"));
        assert!(err.contains("config.toml"));
    }
}
