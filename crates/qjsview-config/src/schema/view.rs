//! View default configuration types.

use qjsview_common::ViewDefaults;
use serde::{Deserialize, Serialize};

/// Fallback window settings for views a script did not fully describe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Page loaded when a script gives no URL.
    pub url: String,
    /// Window title when a script gives none.
    pub title: String,
    /// Width in logical pixels (valid range: 1-16384).
    pub width: i32,
    /// Height in logical pixels (valid range: 1-16384).
    pub height: i32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let defaults = ViewDefaults::default();
        Self {
            url: defaults.url,
            title: defaults.title,
            width: defaults.width,
            height: defaults.height,
        }
    }
}

impl ViewConfig {
    /// What the webview module applies to unset fields.
    pub fn defaults(&self) -> ViewDefaults {
        ViewDefaults {
            url: self.url.clone(),
            title: self.title.clone(),
            width: self.width,
            height: self.height,
        }
    }
}
