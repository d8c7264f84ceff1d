//! Script runtime configuration types.

use serde::{Deserialize, Serialize};

/// Which engine drives web-views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Real OS window and web-view.
    #[default]
    Native,
    /// In-process engine with no window; pages close when idle.
    Headless,
}

/// QuickJS runtime limits and engine selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub backend: BackendKind,
    /// Heap limit in MiB; 0 disables the limit.
    pub memory_limit_mb: u32,
    /// Maximum JS stack size in KiB (valid range: 64-65536).
    pub max_stack_kb: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Native,
            memory_limit_mb: 0,
            max_stack_kb: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_config_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.backend, BackendKind::Native);
        assert_eq!(config.memory_limit_mb, 0);
        assert_eq!(config.max_stack_kb, 1024);
    }

    #[test]
    fn backend_kind_serialization() {
        let json = serde_json::to_string(&BackendKind::Headless).unwrap();
        assert_eq!(json, "\"headless\"");
        let parsed: BackendKind = serde_json::from_str("\"native\"").unwrap();
        assert_eq!(parsed, BackendKind::Native);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result: Result<RuntimeConfig, _> = toml::from_str("backend = \"electron\"");
        assert!(result.is_err());
    }
}
