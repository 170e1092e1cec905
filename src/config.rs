use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::Result;
use thiserror::Error;

use crate::smoothing::DEFAULT_BUFFER_SIZE;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: ThresholdConfig,
    pub smoothing: SmoothingConfig,
    pub alerts: AlertConfig,
    pub logging: LoggingConfig,
}

/// Per-profile tolerances, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub neck_angle_threshold: f32,
    pub shoulder_alignment_threshold: f32,
    pub spine_curvature_threshold: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            neck_angle_threshold: 30.0,
            shoulder_alignment_threshold: 10.0,
            spine_curvature_threshold: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub buffer_size: usize,
    /// Landmarks reported with lower visibility count as missing.
    pub min_visibility: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            min_visibility: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub bad_posture_threshold_secs: u64,
    pub repeat_interval_secs: u64,
    pub visual_alerts: bool,
    pub audio_alerts: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            bad_posture_threshold_secs: 15,
            repeat_interval_secs: 60,
            visual_alerts: true,
            audio_alerts: true,
        }
    }
}

impl AlertConfig {
    pub fn bad_posture_threshold(&self) -> Duration {
        Duration::from_secs(self.bad_posture_threshold_secs)
    }

    pub fn repeat_interval(&self) -> Duration {
        Duration::from_secs(self.repeat_interval_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum spacing between persisted samples.
    pub log_interval_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_interval_secs: 10 }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive number of degrees, got {value}")]
    NonPositiveThreshold { name: &'static str, value: f32 },
    #[error("smoothing buffer size must be at least 1")]
    EmptyBuffer,
    #[error("min_visibility must be within [0, 1], got {0}")]
    VisibilityOutOfRange(f32),
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("neck_angle_threshold", self.neck_angle_threshold),
            ("shoulder_alignment_threshold", self.shoulder_alignment_threshold),
            ("spine_curvature_threshold", self.spine_curvature_threshold),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveThreshold { name, value });
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.smoothing.buffer_size == 0 {
            return Err(ConfigError::EmptyBuffer);
        }
        let vis = self.smoothing.min_visibility;
        if !(0.0..=1.0).contains(&vis) {
            return Err(ConfigError::VisibilityOutOfRange(vis));
        }
        Ok(())
    }
}
