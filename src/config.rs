//! Process configuration: JSON file (optional) overridden by environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// One scheduled meetup shown on the sheet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Date + location label, also used as the store's event id.
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Confirmed places; falls back to `AppConfig::default_capacity`.
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl EventConfig {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Spreadsheet endpoint; `None` keeps everything in memory.
    pub store_url: Option<String>,
    pub category: String,
    /// Admin mode is disabled when unset.
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
    /// Cookie signing key material (at least 64 bytes); random per process when unset.
    #[serde(skip_serializing)]
    pub session_key: Option<String>,
    pub snapshot_ttl_secs: u64,
    pub default_capacity: usize,
    pub events: Vec<EventConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store_url: None,
            category: "weekly".to_string(),
            admin_password: None,
            session_key: None,
            snapshot_ttl_secs: 5,
            default_capacity: 20,
            events: Vec::new(),
        }
    }
}

impl AppConfig {
    /// `MEETUP_CONFIG` file (if set), then `HOST`, `PORT`, `STORE_URL`, `MEETUP_CATEGORY`,
    /// `ADMIN_PASSWORD`, `SESSION_KEY`, `SNAPSHOT_TTL_SECS`, `DEFAULT_CAPACITY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os("MEETUP_CONFIG") {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let data = std::fs::read(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Apply overrides from a variable lookup (the process environment in `from_env`).
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        fn parsed<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name, value })
        }

        if let Some(v) = var("HOST") {
            self.host = v;
        }
        if let Some(v) = var("PORT") {
            self.port = parsed("PORT", v)?;
        }
        if let Some(v) = var("STORE_URL").filter(|v| !v.trim().is_empty()) {
            self.store_url = Some(v);
        }
        if let Some(v) = var("MEETUP_CATEGORY") {
            self.category = v;
        }
        if let Some(v) = var("ADMIN_PASSWORD").filter(|v| !v.is_empty()) {
            self.admin_password = Some(v);
        }
        if let Some(v) = var("SESSION_KEY") {
            self.session_key = Some(v);
        }
        if let Some(v) = var("SNAPSHOT_TTL_SECS") {
            self.snapshot_ttl_secs = parsed("SNAPSHOT_TTL_SECS", v)?;
        }
        if let Some(v) = var("DEFAULT_CAPACITY") {
            self.default_capacity = parsed("DEFAULT_CAPACITY", v)?;
        }
        Ok(())
    }

    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.snapshot_ttl_secs)
    }

    pub fn event(&self, id: &str) -> Option<&EventConfig> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn capacity_of(&self, event: &EventConfig) -> usize {
        event.capacity.unwrap_or(self.default_capacity)
    }

    pub fn check_admin_password(&self, given: &str) -> bool {
        self.admin_password
            .as_deref()
            .is_some_and(|expected| expected == given)
    }
}
