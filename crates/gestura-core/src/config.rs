use crate::error::{GesturaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted analytics window, in days.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub realtime: RealtimeConfig,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Load configuration from the default path (~/.config/gestura/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Write current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gestura")
            .join("config.toml")
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        let path = self.realtime.path.as_str();
        if !path.starts_with('/') {
            return Err(GesturaError::Config(format!(
                "realtime.path must start with '/': {path}"
            )));
        }
        if path == "/" || path == "/api" || path.starts_with("/api/") || path == "/health" {
            return Err(GesturaError::Config(format!(
                "realtime.path collides with another route: {path}"
            )));
        }
        if self.realtime.queue_capacity == 0 {
            return Err(GesturaError::Config(
                "realtime.queue_capacity must be at least 1".into(),
            ));
        }
        let window = self.analytics.window_days;
        if !(1..=MAX_WINDOW_DAYS).contains(&window) {
            return Err(GesturaError::Config(format!(
                "analytics.window_days must be within 1..={MAX_WINDOW_DAYS}: {window}"
            )));
        }
        let comparison = self.analytics.comparison_days;
        if comparison == 0 || comparison.saturating_mul(2) > window {
            return Err(GesturaError::Config(format!(
                "analytics.comparison_days must be at least 1 and at most half of window_days: {comparison}"
            )));
        }
        if !(0.0..=1.0).contains(&self.analytics.min_confidence) {
            return Err(GesturaError::Config(
                "analytics.min_confidence must be within 0.0..=1.0".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Enable CORS.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            cors: true,
        }
    }
}

/// Real-time push channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// WebSocket endpoint path, kept apart from any dev-tooling socket.
    pub path: String,
    /// Frames buffered per connection; a connection that falls further behind misses frames.
    pub queue_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            path: "/ws".into(),
            queue_capacity: 1024,
        }
    }
}

/// Analytics window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of calendar days in the weekly chart and sliding history window.
    pub window_days: u32,
    /// Length of each sliding window in the recent-vs-previous comparison.
    pub comparison_days: u32,
    /// Minimum classifier confidence for an event to count as recognized.
    pub min_confidence: f32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            comparison_days: 3,
            min_confidence: 0.5,
        }
    }
}
