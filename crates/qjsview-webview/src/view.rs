//! The native handle: owned window settings plus the live engine.

use std::ffi::{CStr, CString};
use std::fmt;
use std::sync::Arc;

use qjsview_common::{ViewDefaults, WebViewError};
use tracing::{debug, trace};

use crate::dispatch::Dispatcher;
use crate::engine::{Backend, Engine, EngineLink, Inbox, ViewParams};

/// Trampoline signature: the owner passed to [`crate::run_loop`] and the
/// page's message. `None` messages are dropped by well-behaved callbacks.
pub type InvokeFn<U> = fn(&U, Option<&CStr>);

/// Result of one loop step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Done,
}

/// Copy bytes into an independently owned C string.
///
/// C consumers stop at the first NUL, so anything after it is dropped
/// rather than rejected.
pub fn owned_c_string(value: impl Into<Vec<u8>>) -> CString {
    let mut bytes = value.into();
    if let Some(nul) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(nul);
    }
    CString::new(bytes).unwrap_or_default()
}

/// Field updates for [`NativeView::fill`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFields {
    pub url: Option<CString>,
    pub title: Option<CString>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub resizable: Option<bool>,
}

/// A web-view handle.
///
/// `U` is the owner type the trampoline receives; the owner is handed to
/// [`crate::run_loop`] next to the handle instead of being recovered from
/// the handle's address.
pub struct NativeView<U: ?Sized = ()> {
    pub url: Option<CString>,
    pub title: Option<CString>,
    pub width: i32,
    pub height: i32,
    pub resizable: bool,
    pub external_invoke_cb: Option<InvokeFn<U>>,
    fullscreen: bool,
    backend: Arc<dyn Backend>,
    engine: Option<Box<dyn Engine>>,
    inbox: Inbox,
    dispatcher: Dispatcher,
}

impl<U: ?Sized> fmt::Debug for NativeView<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeView")
            .field("url", &self.url)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("resizable", &self.resizable)
            .field("callback", &self.external_invoke_cb.is_some())
            .field("backend", &self.backend.name())
            .field("initialized", &self.engine.is_some())
            .finish()
    }
}

impl<U: ?Sized> NativeView<U> {
    /// An empty handle: no strings, zero size, nothing installed.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            url: None,
            title: None,
            width: 0,
            height: 0,
            resizable: false,
            external_invoke_cb: None,
            fullscreen: false,
            backend,
            engine: None,
            inbox: Inbox::default(),
            dispatcher: Dispatcher::default(),
        }
    }

    /// Apply the supplied fields, dropping any string they replace.
    pub fn fill(&mut self, fields: ViewFields) {
        trace!(?fields, "filling view");
        if let Some(url) = fields.url {
            self.url = Some(url);
        }
        if let Some(title) = fields.title {
            self.title = Some(title);
        }
        if let Some(width) = fields.width {
            self.width = width;
        }
        if let Some(height) = fields.height {
            self.height = height;
        }
        if let Some(resizable) = fields.resizable {
            self.resizable = resizable;
        }
    }

    /// Fill unset strings and non-positive sizes from `defaults`.
    pub fn apply_defaults(&mut self, defaults: &ViewDefaults) {
        if self.url.is_none() {
            self.url = Some(owned_c_string(defaults.url.as_str()));
        }
        if self.title.is_none() {
            self.title = Some(owned_c_string(defaults.title.as_str()));
        }
        if self.width <= 0 {
            self.width = defaults.width;
        }
        if self.height <= 0 {
            self.height = defaults.height;
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Create the engine from the current fields.
    ///
    /// A live engine is torn down first, so re-init picks up patched fields.
    pub fn init(&mut self) -> Result<(), WebViewError> {
        if let Some(mut previous) = self.engine.take() {
            debug!("re-initializing view, tearing down previous engine");
            self.dispatcher.clear_waker();
            previous.exit();
        }

        let url = self
            .url
            .as_deref()
            .ok_or_else(|| WebViewError::InitFailed("url is unset".into()))?
            .to_string_lossy();
        let title = self
            .title
            .as_deref()
            .ok_or_else(|| WebViewError::InitFailed("title is unset".into()))?
            .to_string_lossy();
        let params = ViewParams {
            url: &url,
            title: &title,
            width: self.width,
            height: self.height,
            resizable: self.resizable,
            fullscreen: self.fullscreen,
        };
        let link = EngineLink {
            inbox: self.inbox.clone(),
            dispatcher: self.dispatcher.clone(),
        };

        let engine = self.backend.create(&params, link)?;
        debug!(
            backend = self.backend.name(),
            url = %url,
            width = self.width,
            height = self.height,
            "view initialized"
        );
        self.engine = Some(engine);
        Ok(())
    }

    /// Run one engine step, then the jobs dispatched so far.
    ///
    /// An uninitialized view has nothing to run and reports `Done`.
    pub fn step(&mut self, blocking: bool) -> LoopState {
        let Some(engine) = self.engine.as_mut() else {
            return LoopState::Done;
        };
        let ended = engine.step(blocking);
        self.dispatcher.run_pending(engine.as_mut());
        if ended {
            LoopState::Done
        } else {
            LoopState::Running
        }
    }

    /// Next message posted by the page, oldest first.
    pub fn next_invocation(&mut self) -> Option<CString> {
        self.inbox.pop().map(owned_c_string)
    }

    /// Tear the engine down. Safe to call on an uninitialized view.
    pub fn exit(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            self.dispatcher.clear_waker();
            engine.exit();
            debug!(backend = self.backend.name(), "view exited");
        }
    }

    /// Evaluate script synchronously. Only valid on the loop thread.
    pub fn eval(&mut self, js: &CStr) -> Result<(), WebViewError> {
        let engine = self.engine.as_mut().ok_or(WebViewError::NotInitialized)?;
        engine.eval(&js.to_string_lossy())
    }

    /// Handle other threads use to queue work for this view's loop.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn terminate(&mut self) {
        match self.engine.as_mut() {
            Some(engine) => engine.terminate(),
            None => debug!("terminate on uninitialized view ignored"),
        }
    }

    /// Replace the title field and, when live, the window title.
    pub fn set_title(&mut self, title: CString) {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_title(&title.to_string_lossy());
        }
        self.title = Some(title);
    }

    /// Toggle fullscreen now if live; remembered for the next init.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
        if let Some(engine) = self.engine.as_mut() {
            engine.set_fullscreen(fullscreen);
        }
    }
}

impl<U: ?Sized> Drop for NativeView<U> {
    fn drop(&mut self) {
        if self.engine.is_some() {
            debug!("view dropped while initialized, exiting engine");
            self.exit();
        }
    }
}
