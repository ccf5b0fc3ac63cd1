//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Project;

/// rateq configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pricing tier used when `--tier` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_tier: Option<String>,

    /// Origin warehouse used when `--wh` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_warehouse: Option<String>,

    /// Fuel surcharge in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_rate: Option<f64>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        Self::load_for(Project::discover().ok().as_ref())
    }

    /// Load configuration for a known project (or none)
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/rateq/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // Project config (.rateq/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        config.merge(Self::from_env());
        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Environment overrides (RATEQ_TIER, RATEQ_WAREHOUSE, RATEQ_FUEL_RATE)
    fn from_env() -> Config {
        let fuel_rate = std::env::var("RATEQ_FUEL_RATE").ok().and_then(|v| {
            let parsed = v.trim().parse::<f64>().ok();
            if parsed.is_none() {
                tracing::warn!(value = %v, "RATEQ_FUEL_RATE is not a number");
            }
            parsed
        });

        Config {
            default_tier: std::env::var("RATEQ_TIER").ok(),
            default_warehouse: std::env::var("RATEQ_WAREHOUSE").ok(),
            fuel_rate,
            default_format: None,
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rateq")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.default_tier.is_some() {
            self.default_tier = other.default_tier;
        }
        if other.default_warehouse.is_some() {
            self.default_warehouse = other.default_warehouse;
        }
        if other.fuel_rate.is_some() {
            self.fuel_rate = other.fuel_rate;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }
}
