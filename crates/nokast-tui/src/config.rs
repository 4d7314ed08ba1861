//! Configuration for the terminal UI: the shared client settings plus a
//! `[ui]` table.

use anyhow::{Context, Result};
use nokast_common::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub client: ClientConfig,

    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Redraw tick for spinners and status-message expiry
    pub tick_rate_ms: u64,

    /// Open the key help overlay at start-up
    pub show_help_on_start: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            show_help_on_start: false,
        }
    }
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply command line
    /// overrides.
    pub fn load(
        config_path: Option<&Path>,
        server_url: Option<&str>,
        log_level: Option<&str>,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = server_url {
            config.client.server_url = url.to_string();
        }
        if let Some(level) = log_level {
            config.client.logging.level = level.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn generate_example() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| "# Failed to generate config".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;

        if self.ui.tick_rate_ms == 0 {
            anyhow::bail!("ui.tick_rate_ms must be greater than 0");
        }

        Ok(())
    }
}
