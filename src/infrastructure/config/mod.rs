//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{PathBuf, MAIN_SEPARATOR};
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::domain::entities::{ChangeLimits, TickerWatch};

/// Assistant configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub assistant: AssistantConfig,
    pub signal: SignalConfig,
    pub alerts: AlertsConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AssistantConfig {
    /// The only number allowed to issue commands and receive messages
    pub owner: Option<String>,
    /// Shared storage area for store/get/list
    pub storage_dir: Option<PathBuf>,
    pub command_prefix: char,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SignalConfig {
    /// Account the assistant itself runs as
    pub account: Option<String>,
    pub cli_path: PathBuf,
    pub socket_path: PathBuf,
    pub startup_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AlertsConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub spacing_secs: u64,
    pub change_6h: f64,
    pub change_24h: f64,
    pub tickers: Vec<TickerConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TickerConfig {
    pub id: String,
    pub thresholds: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FeedConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            owner: None,
            storage_dir: None,
            command_prefix: '!',
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            account: None,
            cli_path: PathBuf::from("signal-cli"),
            socket_path: std::env::temp_dir().join("signal-assistant.sock"),
            startup_timeout_secs: 30,
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 15 * 60,
            spacing_secs: 10,
            change_6h: 2.0,
            change_24h: 5.0,
            tickers: vec![
                TickerConfig {
                    id: "btc-bitcoin".to_string(),
                    thresholds: vec![12000.0, 13000.0, 14000.0, 15000.0],
                },
                TickerConfig {
                    id: "eth-ethereum".to_string(),
                    thresholds: vec![450.0, 500.0, 550.0, 600.0],
                },
            ],
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coinpaprika.com/v1".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Load the file if it exists, otherwise start from defaults
    pub fn load_or_default(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Overlay environment variables on top of the current values
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(owner) = non_empty("OWNER_NUMBER") {
            self.assistant.owner = Some(owner);
        }
        if let Some(folder) = non_empty("ASSISTANT_FOLDER") {
            self.assistant.storage_dir = Some(PathBuf::from(folder));
        }
        if let Some(account) = non_empty("ASSISTANT_NUMBER") {
            self.signal.account = Some(account);
        }
        if let Some(cli) = non_empty("SIGNAL_CLI_PATH") {
            self.signal.cli_path = PathBuf::from(cli);
        }

        self
    }

    /// Check required fields and normalize paths.
    ///
    /// The storage path always ends with a path separator afterwards.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let owner = self
            .assistant
            .owner
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .ok_or_else(|| ConfigError::MissingField("owner number (OWNER_NUMBER)".to_string()))?
            .to_string();
        self.assistant.owner = Some(owner);

        let storage = self
            .assistant
            .storage_dir
            .take()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingField("shared folder (ASSISTANT_FOLDER)".to_string())
            })?;

        if !storage.exists() {
            return Err(ConfigError::InvalidValue(format!(
                "Provided shared folder does not exist: {}",
                storage.display()
            )));
        }
        if !storage.is_dir() {
            return Err(ConfigError::InvalidValue(format!(
                "Provided shared folder is not a directory: {}",
                storage.display()
            )));
        }
        self.assistant.storage_dir = Some(with_trailing_separator(storage));

        if self.alerts.interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "alerts.interval-secs must be greater than 0".to_string(),
            ));
        }
        for ticker in &mut self.alerts.tickers {
            ticker.thresholds.sort_by(|a, b| a.total_cmp(b));
        }

        Ok(self)
    }

    /// Owner number. Empty until `validate` has succeeded.
    pub fn owner(&self) -> &str {
        self.assistant.owner.as_deref().unwrap_or_default()
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.assistant.storage_dir.clone().unwrap_or_default()
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_secs(self.alerts.interval_secs)
    }

    pub fn alert_spacing(&self) -> Duration {
        Duration::from_secs(self.alerts.spacing_secs)
    }

    pub fn change_limits(&self) -> ChangeLimits {
        ChangeLimits {
            change_6h: self.alerts.change_6h,
            change_24h: self.alerts.change_24h,
        }
    }

    pub fn ticker_watches(&self) -> Vec<TickerWatch> {
        self.alerts
            .tickers
            .iter()
            .map(|t| TickerWatch::new(t.id.clone(), t.thresholds.clone()))
            .collect()
    }
}

fn with_trailing_separator(path: PathBuf) -> PathBuf {
    let mut raw = path.into_os_string();
    if !raw.to_string_lossy().ends_with(MAIN_SEPARATOR) {
        raw.push(MAIN_SEPARATOR.to_string());
    }
    PathBuf::from(raw)
}
