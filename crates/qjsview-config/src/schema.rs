//! Configuration schema.
//!
//! All sections use `#[serde(default)]` so partial files deserialize with
//! the remaining fields taken from `Default`.

mod logging;
mod runtime;
mod view;

pub use logging::LoggingConfig;
pub use runtime::{BackendKind, RuntimeConfig};
pub use view::ViewConfig;

use serde::{Deserialize, Serialize};

/// Top-level `qjsview` configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QjsViewConfig {
    pub view: ViewConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_all_defaults() {
        let config: QjsViewConfig = toml::from_str("").unwrap();
        assert_eq!(config.view.title, "QuickJS Web View");
        assert_eq!(config.runtime.backend, BackendKind::Native);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn full_toml_roundtrips_through_serde() {
        let toml_str = r#"
[view]
url = "https://example.test"
title = "Calc"
width = 320
height = 240

[runtime]
backend = "headless"
memory_limit_mb = 64
max_stack_kb = 512

[logging]
level = "debug"
"#;
        let config: QjsViewConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.view.url, "https://example.test");
        assert_eq!(config.view.width, 320);
        assert_eq!(config.view.height, 240);
        assert_eq!(config.runtime.backend, BackendKind::Headless);
        assert_eq!(config.runtime.memory_limit_mb, 64);
        assert_eq!(config.logging.level, "debug");
    }
}
