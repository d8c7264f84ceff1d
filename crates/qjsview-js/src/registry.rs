//! Process-wide backend selection for the `webview` module.

use std::fmt;
use std::sync::{Arc, OnceLock};

use qjsview_common::{ViewDefaults, WebViewError};
use qjsview_webview::Backend;
use tracing::info;

/// What `create`/`open` build views with.
pub struct Registry {
    backend: Arc<dyn Backend>,
    defaults: ViewDefaults,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("backend", &self.backend.name())
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl Registry {
    pub fn new(backend: Arc<dyn Backend>, defaults: ViewDefaults) -> Self {
        Self { backend, defaults }
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn defaults(&self) -> &ViewDefaults {
        &self.defaults
    }
}

static INSTALLED: OnceLock<Arc<Registry>> = OnceLock::new();

/// Install the registry the `webview` module binds to. Only the first call
/// succeeds.
pub fn install(registry: Registry) -> Result<(), WebViewError> {
    let backend = registry.backend.name();
    INSTALLED
        .set(Arc::new(registry))
        .map_err(|_| WebViewError::AlreadyRegistered)?;
    info!(backend, "webview module registered");
    Ok(())
}

pub fn installed() -> Option<Arc<Registry>> {
    INSTALLED.get().cloned()
}
