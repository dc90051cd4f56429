use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::{
    conditions::{ConditionLabel, ConditionTable},
    summarizer::SummarizerKind,
};

/// Endpoints of the Open-Meteo collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenMeteoConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Language of geocoded place names, e.g. "en" or "ja".
    pub language: String,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Natural-language summarizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// "anthropic" or "template". Unset means "template".
    pub kind: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub max_tokens: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            kind: None,
            api_key: None,
            model: "claude-sonnet-4-5".to_string(),
            api_url: "https://api.anthropic.com/v1".to_string(),
            max_tokens: 512,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Messaging platform used to deliver chat replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub channel_access_token: Option<String>,
    pub reply_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            reply_url: "https://api.line.me/v2/bot/message/reply".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [summarizer]
/// kind = "anthropic"
/// api_key = "..."
///
/// [server]
/// bind = "0.0.0.0:8080"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub open_meteo: OpenMeteoConfig,
    pub summarizer: SummarizerConfig,
    pub server: ServerConfig,
    pub chat: ChatConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionLabel>,
}

impl Config {
    /// Return the configured summarizer as a strongly-typed kind.
    pub fn summarizer_kind(&self) -> Result<SummarizerKind> {
        match self.summarizer.kind.as_deref() {
            None => Ok(SummarizerKind::Template),
            Some(s) => SummarizerKind::try_from(s),
        }
    }

    pub fn condition_table(&self) -> ConditionTable {
        ConditionTable::with_overrides(&self.conditions)
    }

    /// Load config from the default location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path; the file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the process environment.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`; it is injected so
    /// that this is the only place that knows variable names.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.summarizer.api_key = Some(key);
        }
        if let Some(kind) = lookup("WEATHER_SUMMARIZER") {
            self.summarizer.kind = Some(kind);
        }
        if let Some(model) = lookup("WEATHER_MODEL") {
            self.summarizer.model = model;
        }
        if let Some(bind) = lookup("WEATHER_BIND") {
            self.server.bind = bind;
        }
        if let Some(token) = lookup("LINE_CHANNEL_ACCESS_TOKEN") {
            self.chat.channel_access_token = Some(token);
        }
        self
    }

    /// Convenience helper: set the summarizer kind and, when given, its API key.
    pub fn upsert_summarizer(&mut self, kind: SummarizerKind, api_key: Option<String>) {
        self.summarizer.kind = Some(kind.to_string());
        if api_key.is_some() {
            self.summarizer.api_key = api_key;
        }
    }

    pub fn summarizer_api_key(&self) -> Option<&str> {
        self.summarizer
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}
