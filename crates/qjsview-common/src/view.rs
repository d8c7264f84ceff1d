//! Values a view falls back to when a script leaves a field unset.

use serde::{Deserialize, Serialize};

/// Fallbacks applied by `init` and `open` to fields a script did not set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewDefaults {
    pub url: String,
    pub title: String,
    pub width: i32,
    pub height: i32,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            url: "about:blank".into(),
            title: "QuickJS Web View".into(),
            width: 800,
            height: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_module_contract() {
        let d = ViewDefaults::default();
        assert_eq!(d.url, "about:blank");
        assert_eq!(d.title, "QuickJS Web View");
        assert_eq!(d.width, 800);
        assert_eq!(d.height, 600);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let d: ViewDefaults = serde_json::from_str(r#"{"title":"Calc"}"#).unwrap();
        assert_eq!(d.title, "Calc");
        assert_eq!(d.url, "about:blank");
        assert_eq!(d.width, 800);
    }
}
