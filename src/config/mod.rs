//! Runtime configuration.
//!
//! Settings load from a TOML file with a fixed search order:
//!
//! 1. `$LINESIGHT_CONFIG` environment variable (path to TOML file)
//! 2. `linesight.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Every field is `#[serde(default)]` so a partial file only overrides what
//! it names. Unknown keys warn (with "did you mean" suggestions) but never
//! break an existing config; impossible values fail startup.

pub mod validation;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::generator::GeneratorSettings;
use crate::shifts::{offset_from_hours, ShiftCalendar, DEFAULT_TIMEZONE_NAME};

// ============================================================================
// Sections
// ============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the REST API.
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_addr() -> String {
    "0.0.0.0:4000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

/// Plant site settings: the fixed zone and the line roster size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Zone label reported in shift summaries.
    #[serde(default = "default_timezone_name")]
    pub timezone_name: String,

    /// Fixed UTC offset applied uniformly across the system.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Number of production lines (LINE-01 .. LINE-NN).
    #[serde(default = "default_line_count")]
    pub line_count: usize,
}

fn default_timezone_name() -> String {
    DEFAULT_TIMEZONE_NAME.to_string()
}

fn default_utc_offset_hours() -> i32 {
    1
}

fn default_line_count() -> usize {
    20
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            timezone_name: default_timezone_name(),
            utc_offset_hours: default_utc_offset_hours(),
            line_count: default_line_count(),
        }
    }
}

/// Synthetic data generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Days of history fabricated at startup.
    #[serde(default = "default_history_days")]
    pub history_days: i64,

    /// Minutes between consecutive readings.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: i64,

    /// Base seed for reproducible datasets.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_history_days() -> i64 {
    30
}

fn default_interval_minutes() -> i64 {
    15
}

fn default_seed() -> u64 {
    42
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            interval_minutes: default_interval_minutes(),
            seed: default_seed(),
        }
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl AppConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("LINESIGHT_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from LINESIGHT_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from LINESIGHT_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "LINESIGHT_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("linesight.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./linesight.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./linesight.toml, using defaults");
                }
            }
        }

        info!("No linesight.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Unknown keys warn but never fail — existing configs keep working.
        for w in validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check the parsed values. Errors are impossible values that must
    /// prevent startup; warnings are logged and tolerated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Shift calendar for the configured site zone.
    pub fn calendar(&self) -> ShiftCalendar {
        ShiftCalendar::new(
            self.site.timezone_name.clone(),
            offset_from_hours(self.site.utc_offset_hours),
        )
    }

    /// Generator knobs derived from the config.
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            line_count: self.site.line_count,
            history_days: self.generator.history_days,
            interval_minutes: self.generator.interval_minutes,
            seed: self.generator.seed,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Configuration loading/validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}
