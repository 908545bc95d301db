//! Planner configuration: where domain definitions live and how long the planner may run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default data folder, relative to the working directory.
pub const DEFAULT_DATA_FOLDER: &str = "data";

/// Domain definitions live under `<data folder>/pddlstream/domains`.
const DOMAINS_SUBPATH: [&str; 2] = ["pddlstream", "domains"];

pub const DEFAULT_DOMAIN_NAME: &str = "domain_simple";

const DOMAIN_FILE: &str = "domain.pddl";
const STREAM_FILE: &str = "streams.pddl";

const DEFAULT_MAX_PLANNING_TIME_SECS: f64 = 5.0;

/// Returns the conventional domains folder inside `data_folder`.
pub fn default_domains_folder(data_folder: impl AsRef<Path>) -> PathBuf {
    DOMAINS_SUBPATH
        .iter()
        .fold(data_folder.as_ref().to_path_buf(), |path, part| path.join(part))
}

/// Configuration handed to whatever loads domain files and runs the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Folder containing one subfolder per domain
    pub domains_folder: PathBuf,

    /// Domain subfolder to plan with
    pub domain_name: String,

    /// Upper bound on a single planner call
    pub max_planning_time_secs: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            domains_folder: default_domains_folder(DEFAULT_DATA_FOLDER),
            domain_name: DEFAULT_DOMAIN_NAME.to_string(),
            max_planning_time_secs: DEFAULT_MAX_PLANNING_TIME_SECS,
        }
    }
}

impl PlannerConfig {
    /// Parses and validates a JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain_name.trim().is_empty() {
            return Err(ConfigError::EmptyDomainName);
        }
        if !(self.max_planning_time_secs.is_finite() && self.max_planning_time_secs > 0.0) {
            return Err(ConfigError::InvalidPlanningTime(self.max_planning_time_secs));
        }
        Ok(())
    }

    pub fn domain_folder(&self) -> PathBuf {
        self.domains_folder.join(&self.domain_name)
    }

    pub fn domain_file(&self) -> PathBuf {
        self.domain_folder().join(DOMAIN_FILE)
    }

    pub fn stream_file(&self) -> PathBuf {
        self.domain_folder().join(STREAM_FILE)
    }

    /// Call [`PlannerConfig::validate`] first; non-positive values yield a zero duration.
    pub fn max_planning_time(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_planning_time_secs).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_folder_follows_subpath_convention() {
        assert_eq!(
            default_domains_folder("/opt/sim/data"),
            PathBuf::from("/opt/sim/data/pddlstream/domains")
        );
        let config = PlannerConfig::default();
        assert_eq!(
            config.domain_file(),
            PathBuf::from("data/pddlstream/domains/domain_simple/domain.pddl")
        );
        assert_eq!(
            config.stream_file(),
            PathBuf::from("data/pddlstream/domains/domain_simple/streams.pddl")
        );
    }

    #[test]
    fn json_overrides_keep_remaining_defaults() {
        let config = PlannerConfig::from_json_str(r#"{"domain_name": "domain_full", "max_planning_time_secs": 0.5}"#)
            .expect("valid config");
        assert_eq!(config.domain_name, "domain_full");
        assert_eq!(config.domains_folder, default_domains_folder(DEFAULT_DATA_FOLDER));
        assert_eq!(config.max_planning_time(), Duration::from_millis(500));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(matches!(
            PlannerConfig::from_json_str(r#"{"domain_name": "  "}"#),
            Err(ConfigError::EmptyDomainName)
        ));
        assert!(matches!(
            PlannerConfig::from_json_str(r#"{"max_planning_time_secs": -1.0}"#),
            Err(ConfigError::InvalidPlanningTime(_))
        ));
        assert!(matches!(
            PlannerConfig::from_json_str("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
