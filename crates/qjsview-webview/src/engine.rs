//! The operations a concrete web-view engine provides.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use qjsview_common::WebViewError;

use crate::dispatch::Dispatcher;

/// A live web-view session, created by [`Backend::create`].
///
/// Every method is called on the thread that steps the loop.
pub trait Engine {
    /// Process pending window and page events. Returns `true` once the
    /// session has ended (window closed or terminated).
    ///
    /// A blocking step may wait for events, but must return when work is
    /// posted to the session's [`Dispatcher`].
    fn step(&mut self, blocking: bool) -> bool;

    /// Evaluate script in the page.
    fn eval(&mut self, js: &str) -> Result<(), WebViewError>;

    fn set_title(&mut self, title: &str);

    fn set_fullscreen(&mut self, fullscreen: bool);

    /// Ask the session to end; the next [`Engine::step`] reports completion.
    fn terminate(&mut self);

    /// Tear the window down. Called once, after the last step.
    fn exit(&mut self);
}

/// Creates engines. Shared process-wide, so it must be `Send + Sync`.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn create(
        &self,
        params: &ViewParams<'_>,
        link: EngineLink,
    ) -> Result<Box<dyn Engine>, WebViewError>;
}

/// Window settings read from the handle at init time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewParams<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub width: i32,
    pub height: i32,
    pub resizable: bool,
    pub fullscreen: bool,
}

/// Channels an engine uses to talk back to its handle.
#[derive(Clone, Default)]
pub struct EngineLink {
    /// Messages posted by page script (`window.external.invoke`).
    pub inbox: Inbox,
    /// The handle's dispatch queue; engines wake blocking steps from it.
    pub dispatcher: Dispatcher,
}

/// Page-to-host messages waiting for the trampoline.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    messages: Arc<Mutex<VecDeque<String>>>,
}

impl Inbox {
    pub fn push(&self, message: String) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(message);
    }

    pub fn pop(&self) -> Option<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_is_fifo() {
        let inbox = Inbox::default();
        inbox.push("first".into());
        inbox.push("second".into());
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.pop().as_deref(), Some("first"));
        assert_eq!(inbox.pop().as_deref(), Some("second"));
        assert!(inbox.pop().is_none());
        assert!(inbox.is_empty());
    }

    #[test]
    fn inbox_clones_share_storage() {
        let inbox = Inbox::default();
        let writer = inbox.clone();
        std::thread::spawn(move || writer.push("from ui".into()))
            .join()
            .unwrap();
        assert_eq!(inbox.pop().as_deref(), Some("from ui"));
    }
}
