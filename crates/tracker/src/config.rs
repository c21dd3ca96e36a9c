//! Tracker configuration.
//!
//! Layered loading: `config/default.toml`, then an optional
//! `config/local.toml`, then `FT__`-prefixed environment variables.

use serde::Deserialize;

use domain::services::{SegmentationConfig, SpeedPolicy};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TrackerConfig {
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    #[serde(default)]
    pub speed: SpeedPolicy,

    #[serde(default)]
    pub liveness: LivenessConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Staleness sweep settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LivenessConfig {
    /// Minutes without a fix before a vehicle is marked offline.
    #[serde(default = "default_offline_after")]
    pub offline_after_minutes: i64,

    /// Seconds between staleness sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_offline_after() -> i64 {
    30
}
fn default_sweep_interval() -> u64 {
    60
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            offline_after_minutes: default_offline_after(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl TrackerConfig {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with FT__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FT").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds entirely from embedded defaults and overrides, without
    /// touching the filesystem or process environment.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [segmentation]
            stop_speed_threshold_kmh = 5.0
            min_stop_duration_minutes = 5
            trip_gap_minutes = 30

            [speed]
            critical_excess_kmh = 20.0

            [liveness]
            offline_after_minutes = 30
            sweep_interval_seconds = 60

            [logging]
            level = "info"
            format = "json"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.segmentation
            .validate()
            .map_err(|e| ConfigValidationError::InvalidValue(e.to_string()))?;

        if self.segmentation.min_stop_duration_minutes >= self.segmentation.trip_gap_minutes {
            return Err(ConfigValidationError::InvalidValue(
                "minimum stop duration must be shorter than the trip gap".to_string(),
            ));
        }

        if !self.speed.critical_excess_kmh.is_finite() || self.speed.critical_excess_kmh < 0.0 {
            return Err(ConfigValidationError::InvalidValue(
                "critical excess speed must be non-negative".to_string(),
            ));
        }

        if self.liveness.offline_after_minutes <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "offline threshold must be positive".to_string(),
            ));
        }

        if self.liveness.sweep_interval_seconds == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "sweep interval cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}
