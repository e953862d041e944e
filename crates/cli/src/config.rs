//! `hookrelay.toml` loading and validation.

use std::path::Path;
use std::time::Duration;

use correlation::{HookRelayError, Navigator, Source, Watcher};
use serde::Deserialize;

const DEFAULT_EVENT_DELAY_SECONDS: u64 = 5;

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub filter: String,
    /// OTLP/gRPC collector endpoint. Spans are exported only when set.
    pub otlp_endpoint: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavigatorConfig {
    pub owner: String,
    pub project_key: Option<String>,
    pub server_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub owner: String,
    pub repository: String,
    pub server_url: Option<String>,
}

/// Top-level relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    pub event_delay_seconds: u64,
    pub logging: LoggingConfig,
    pub navigators: Vec<NavigatorConfig>,
    pub sources: Vec<SourceConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            event_delay_seconds: DEFAULT_EVENT_DELAY_SECONDS,
            logging: LoggingConfig::default(),
            navigators: Vec::new(),
            sources: Vec::new(),
        }
    }
}

impl RelayConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, HookRelayError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| HookRelayError::ConfigurationError {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, HookRelayError> {
        toml::from_str(text).map_err(|e| HookRelayError::ConfigurationError {
            message: e.to_string(),
        })
    }

    pub fn event_delay(&self) -> Duration {
        Duration::from_secs(self.event_delay_seconds)
    }

    /// Validates and builds every declared watcher, navigators first.
    pub fn watchers(&self) -> Result<Vec<Watcher>, HookRelayError> {
        let navigators = self.navigators.iter().map(|n| {
            Navigator::new(&n.owner, n.project_key.as_deref(), n.server_url.as_deref())
                .map(Watcher::Navigator)
        });
        let sources = self.sources.iter().map(|s| {
            Source::new(&s.owner, &s.repository, s.server_url.as_deref()).map(Watcher::Source)
        });
        navigators.chain(sources).collect()
    }
}
