//! qjsview configuration.
//!
//! TOML-based configuration for the `qjsview` runner. Every section has
//! defaults, so an empty or partial file is valid.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use qjsview_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{BackendKind, LoggingConfig, QjsViewConfig, RuntimeConfig, ViewConfig};

use qjsview_common::ConfigError;
use std::path::Path;

/// Load config from the platform default path, creating it if missing.
pub fn load_config() -> Result<QjsViewConfig, ConfigError> {
    toml_loader::load_default()
}

/// Load config from an explicit path. The file must exist.
pub fn load_config_from(path: &Path) -> Result<QjsViewConfig, ConfigError> {
    toml_loader::load_from_path(path)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &QjsViewConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_from_missing_path_is_file_not_found() {
        let err = load_config_from(Path::new("/tmp/qjsview_no_such_config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn config_to_json_contains_sections() {
        let json = config_to_json(&QjsViewConfig::default());
        assert!(json.contains("\"view\""));
        assert!(json.contains("\"runtime\""));
        assert!(json.contains("\"logging\""));
    }
}
