use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:4000";

/// Connection and logging settings shared by the terminal UI and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Period of the pipeline/runtime status poll.
    pub poll_interval_secs: u64,
    /// Period of the WhatsApp pairing poll while the settings screen is open.
    pub whatsapp_poll_interval_secs: u64,
    /// 0 means requests never time out.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_to_file: bool,
    pub log_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 8,
            whatsapp_poll_interval_secs: 5,
            request_timeout_secs: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("nokast.log"),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn whatsapp_poll_interval(&self) -> Duration {
        Duration::from_secs(self.whatsapp_poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl ClientConfig {
    /// Load configuration from file (or defaults) and apply command line overrides.
    pub fn load(
        config_path: Option<&Path>,
        server_url: Option<&str>,
        log_level: Option<&str>,
    ) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = server_url {
            config.server_url = url.to_string();
        }
        if let Some(level) = log_level {
            config.logging.level = level.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn generate_example() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| "# Failed to generate config".to_string())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.server_url)
            .with_context(|| format!("Invalid server_url: {}", self.server_url))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => anyhow::bail!("server_url must use http or https, got '{scheme}'"),
        }

        if self.sync.poll_interval_secs == 0 {
            anyhow::bail!("sync.poll_interval_secs must be greater than 0");
        }
        if self.sync.whatsapp_poll_interval_secs == 0 {
            anyhow::bail!("sync.whatsapp_poll_interval_secs must be greater than 0");
        }
        Ok(())
    }
}
