//! Renderer Configuration

use recon_dom::{EventKind, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Renderer configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event kinds with a delegated root listener
    pub events: Vec<EventKind>,

    /// Maximum element resolution depth
    pub max_depth: usize,

    /// Log every applied patch at debug level
    pub trace_patches: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            events: EventKind::ALL.to_vec(),
            max_depth: DEFAULT_MAX_DEPTH,
            trace_patches: false,
        }
    }
}

impl Config {
    pub fn with_events(mut self, events: impl Into<Vec<EventKind>>) -> Self {
        self.events = events.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_trace_patches(mut self, trace: bool) -> Self {
        self.trace_patches = trace;
        self
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}
