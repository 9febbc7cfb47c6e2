//! Configuration file support for kcal.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/kcal/config.toml`.

use crate::{Error, Result, UserProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const METABOLIC_RATE_RANGE: std::ops::RangeInclusive<u32> = 500..=5000;
const WEIGHT_GOAL_RANGE: std::ops::RangeInclusive<f64> = -2.0..=2.0;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: UserProfile,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Report output configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    /// Print JSON instead of text unless overridden on the command line
    #[serde(default)]
    pub json: bool,
}

fn home_or_cwd() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_or_cwd().join(".local/share"));
    base.join("kcal")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_or_cwd().join(".config"));
        base.join("kcal").join("config.toml")
    }

    /// Reject profile values the web client's settings form wouldn't accept
    pub fn validate(&self) -> Result<()> {
        let profile = &self.profile;

        if let Some(rate) = profile.metabolic_rate {
            if !METABOLIC_RATE_RANGE.contains(&rate) {
                return Err(Error::Config(format!(
                    "metabolic_rate {} outside {}..={}",
                    rate,
                    METABOLIC_RATE_RANGE.start(),
                    METABOLIC_RATE_RANGE.end()
                )));
            }
        }

        if let Some(goal) = profile.weight_loss_goal {
            if !WEIGHT_GOAL_RANGE.contains(&goal) {
                return Err(Error::Config(format!(
                    "weight_loss_goal {} outside -2..=2 lb/week",
                    goal
                )));
            }
        }

        if profile.start_of_week > 6 {
            return Err(Error::Config(format!(
                "start_of_week {} must be 0 (Monday) to 6 (Sunday)",
                profile.start_of_week
            )));
        }

        if let Some(dob) = profile.date_of_birth.as_deref() {
            if crate::dates::parse_date_lenient(dob).is_none() {
                tracing::warn!("date_of_birth {:?} is not a date; BMR will be unavailable", dob);
            }
        }

        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
