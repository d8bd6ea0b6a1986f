//! Configuration file support for milprot.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/milprot/config.toml`.

use crate::progression::{ProgressionRules, DEFAULT_COMPLETION_THRESHOLD, DEFAULT_INCREMENT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,

    #[serde(default)]
    pub display: DisplayConfig,
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

/// Progression parameters configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "default_increment")]
    pub increment: f64,

    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            increment: default_increment(),
            completion_threshold: default_completion_threshold(),
        }
    }
}

impl ProgressionConfig {
    pub fn rules(&self) -> ProgressionRules {
        ProgressionRules {
            increment: self.increment,
            completion_threshold: self.completion_threshold,
        }
    }
}

/// Output formatting configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            unit: default_unit(),
        }
    }
}

// Default value functions
fn home_dir_or_cwd() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir_or_cwd().join(".local/share"));
    base.join("milprot")
}

fn default_increment() -> f64 {
    DEFAULT_INCREMENT
}

fn default_completion_threshold() -> f64 {
    DEFAULT_COMPLETION_THRESHOLD
}

fn default_unit() -> String {
    "kg".into()
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

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject progression settings the engine cannot use
    pub fn validate(&self) -> Result<()> {
        let p = &self.progression;
        if !p.increment.is_finite() || p.increment <= 0.0 {
            return Err(Error::Config(format!(
                "progression.increment must be positive, got {}",
                p.increment
            )));
        }
        if !(p.completion_threshold > 0.0 && p.completion_threshold <= 1.0) {
            return Err(Error::Config(format!(
                "progression.completion_threshold must be in (0, 1], got {}",
                p.completion_threshold
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir_or_cwd().join(".config"));
        base.join("milprot").join("config.toml")
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
