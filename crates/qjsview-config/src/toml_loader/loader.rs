//! Reading `config.toml` into a [`QjsViewConfig`].

use crate::schema::QjsViewConfig;
use crate::validation;
use qjsview_common::ConfigError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use super::paths::{create_default_config, default_config_path};

/// Parse the config at `path`.
///
/// Absent sections and keys fall back to the built-in window defaults and
/// runtime limits. Out-of-range values are reported with a warning and kept,
/// so a bad `max_stack_kb` does not stop a script from running.
pub fn load_from_path(path: &Path) -> Result<QjsViewConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("failed to read {}: {e}", path.display())),
    })?;

    let config: QjsViewConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}, using parsed config as-is");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load `qjsview/config.toml` from the user's config directory.
///
/// The first run writes the commented template there and starts with the
/// defaults it documents.
pub fn load_default() -> Result<QjsViewConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            create_default_config(&path)?;
            Ok(QjsViewConfig::default())
        }
        other => other,
    }
}
