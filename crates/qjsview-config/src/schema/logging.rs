//! Logging configuration types.

use serde::{Deserialize, Serialize};

/// Log filtering for the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of: trace, debug, info, warn, error.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive scoping the level to qjsview crates.
    pub fn directive(&self) -> String {
        format!("qjsview={}", self.level)
    }
}
