//! In-process engine with no window.
//!
//! The "page" is a script of [`PageEvent`]s consumed one per step, and every
//! call the handle makes into the engine is appended to a transcript. Used by
//! the test suites and by the runner's `--headless` mode.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use qjsview_common::WebViewError;
use tracing::{debug, trace};

use crate::engine::{Backend, Engine, EngineLink, ViewParams};

const DEFAULT_IDLE_LIMIT: u32 = 200;
const IDLE_WAIT: Duration = Duration::from_millis(10);

/// Something the simulated page does during a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Page script called `window.external.invoke(message)`.
    Invoke(String),
    /// The user closed the window.
    Close,
}

/// A call recorded by a headless engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlessEvent {
    Init {
        url: String,
        title: String,
        width: i32,
        height: i32,
        resizable: bool,
        fullscreen: bool,
    },
    Eval {
        script: String,
        thread: ThreadId,
    },
    Title(String),
    Fullscreen(bool),
    Terminate,
    Exit,
}

#[derive(Default)]
struct Shared {
    page: VecDeque<PageEvent>,
    transcript: Vec<HeadlessEvent>,
}

/// Backend producing [`HeadlessEngine`]s that share one page script and one
/// transcript.
pub struct HeadlessBackend {
    shared: Arc<Mutex<Shared>>,
    fail_init: bool,
    fail_eval: bool,
    idle_limit: u32,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            shared: Arc::default(),
            fail_init: false,
            fail_eval: false,
            idle_limit: DEFAULT_IDLE_LIMIT,
        }
    }

    /// Queue page events, consumed one per loop step by whichever engine is live.
    pub fn with_page(self, events: impl IntoIterator<Item = PageEvent>) -> Self {
        self.lock().page.extend(events);
        self
    }

    /// Every `create` fails, as if no display were available.
    pub fn failing(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Every `eval` reports an error after being recorded.
    pub fn failing_eval(mut self) -> Self {
        self.fail_eval = true;
        self
    }

    /// Consecutive idle blocking steps before the page closes itself.
    pub fn with_idle_limit(mut self, steps: u32) -> Self {
        self.idle_limit = steps.max(1);
        self
    }

    pub fn push_page_event(&self, event: PageEvent) {
        self.lock().page.push_back(event);
    }

    pub fn remaining_page_events(&self) -> usize {
        self.lock().page.len()
    }

    pub fn transcript(&self) -> Vec<HeadlessEvent> {
        self.lock().transcript.clone()
    }

    /// Return the transcript and start a fresh one.
    pub fn take_transcript(&self) -> Vec<HeadlessEvent> {
        std::mem::take(&mut self.lock().transcript)
    }

    /// Scripts evaluated so far, with the thread each ran on.
    pub fn evals(&self) -> Vec<(String, ThreadId)> {
        self.lock()
            .transcript
            .iter()
            .filter_map(|event| match event {
                HeadlessEvent::Eval { script, thread } => Some((script.clone(), *thread)),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn create(
        &self,
        params: &ViewParams<'_>,
        link: EngineLink,
    ) -> Result<Box<dyn Engine>, WebViewError> {
        if self.fail_init {
            return Err(WebViewError::InitFailed(
                "headless backend configured to fail".into(),
            ));
        }
        self.lock().transcript.push(HeadlessEvent::Init {
            url: params.url.to_string(),
            title: params.title.to_string(),
            width: params.width,
            height: params.height,
            resizable: params.resizable,
            fullscreen: params.fullscreen,
        });
        debug!(url = params.url, "headless engine created");
        Ok(Box::new(HeadlessEngine {
            shared: Arc::clone(&self.shared),
            link,
            fail_eval: self.fail_eval,
            idle_limit: self.idle_limit,
            idle_steps: 0,
            closed: false,
            terminated: false,
        }))
    }
}

/// A live headless session.
pub struct HeadlessEngine {
    shared: Arc<Mutex<Shared>>,
    link: EngineLink,
    fail_eval: bool,
    idle_limit: u32,
    idle_steps: u32,
    closed: bool,
    terminated: bool,
}

impl HeadlessEngine {
    fn record(&self, event: HeadlessEvent) {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .transcript
            .push(event);
    }

    fn next_page_event(&self) -> Option<PageEvent> {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .page
            .pop_front()
    }
}

impl Engine for HeadlessEngine {
    fn step(&mut self, blocking: bool) -> bool {
        if self.terminated || self.closed {
            return true;
        }
        match self.next_page_event() {
            Some(PageEvent::Invoke(message)) => {
                trace!(len = message.len(), "page invoked host");
                self.idle_steps = 0;
                self.link.inbox.push(message);
                false
            }
            Some(PageEvent::Close) => {
                debug!("headless page closed");
                self.closed = true;
                true
            }
            None => {
                if blocking && !self.link.dispatcher.wait(IDLE_WAIT) {
                    self.idle_steps += 1;
                    if self.idle_steps >= self.idle_limit {
                        debug!(steps = self.idle_steps, "headless page idle, closing");
                        self.closed = true;
                        return true;
                    }
                }
                false
            }
        }
    }

    fn eval(&mut self, js: &str) -> Result<(), WebViewError> {
        self.record(HeadlessEvent::Eval {
            script: js.to_string(),
            thread: thread::current().id(),
        });
        if self.fail_eval {
            return Err(WebViewError::EvalFailed("headless eval configured to fail".into()));
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.record(HeadlessEvent::Title(title.to_string()));
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.record(HeadlessEvent::Fullscreen(fullscreen));
    }

    fn terminate(&mut self) {
        self.terminated = true;
        self.record(HeadlessEvent::Terminate);
    }

    fn exit(&mut self) {
        self.record(HeadlessEvent::Exit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ViewParams<'static> {
        ViewParams {
            url: "about:blank",
            title: "t",
            width: 10,
            height: 20,
            resizable: true,
            fullscreen: false,
        }
    }

    #[test]
    fn page_events_are_consumed_one_per_step() {
        let backend = HeadlessBackend::new().with_page([
            PageEvent::Invoke("a".into()),
            PageEvent::Invoke("b".into()),
            PageEvent::Close,
        ]);
        let link = EngineLink::default();
        let mut engine = backend.create(&params(), link.clone()).unwrap();

        assert!(!engine.step(false));
        assert_eq!(link.inbox.len(), 1);
        assert!(!engine.step(false));
        assert!(engine.step(false));
        assert!(engine.step(false));
        assert_eq!(link.inbox.pop().as_deref(), Some("a"));
        assert_eq!(link.inbox.pop().as_deref(), Some("b"));
    }

    #[test]
    fn terminate_ends_next_step() {
        let backend = HeadlessBackend::new().with_page([PageEvent::Invoke("x".into())]);
        let mut engine = backend.create(&params(), EngineLink::default()).unwrap();
        engine.terminate();
        assert!(engine.step(false));
        assert_eq!(backend.remaining_page_events(), 1);
    }

    #[test]
    fn idle_blocking_steps_close_the_page() {
        let backend = HeadlessBackend::new().with_idle_limit(3);
        let mut engine = backend.create(&params(), EngineLink::default()).unwrap();
        assert!(!engine.step(true));
        assert!(!engine.step(true));
        assert!(engine.step(true));
    }

    #[test]
    fn non_blocking_steps_never_idle_out() {
        let backend = HeadlessBackend::new().with_idle_limit(1);
        let mut engine = backend.create(&params(), EngineLink::default()).unwrap();
        for _ in 0..5 {
            assert!(!engine.step(false));
        }
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let backend = HeadlessBackend::new();
        let mut engine = backend.create(&params(), EngineLink::default()).unwrap();
        engine.set_title("new");
        engine.set_fullscreen(true);
        engine.eval("1").unwrap();
        engine.exit();

        let transcript = backend.take_transcript();
        assert!(matches!(transcript[0], HeadlessEvent::Init { resizable: true, .. }));
        assert_eq!(transcript[1], HeadlessEvent::Title("new".into()));
        assert_eq!(transcript[2], HeadlessEvent::Fullscreen(true));
        assert!(matches!(&transcript[3], HeadlessEvent::Eval { script, .. } if script == "1"));
        assert_eq!(transcript[4], HeadlessEvent::Exit);
        assert!(backend.transcript().is_empty());
    }

    #[test]
    fn failing_eval_still_records() {
        let backend = HeadlessBackend::new().failing_eval();
        let mut engine = backend.create(&params(), EngineLink::default()).unwrap();
        assert!(matches!(engine.eval("boom"), Err(WebViewError::EvalFailed(_))));
        assert_eq!(backend.evals().len(), 1);
    }

    #[test]
    fn failing_backend_creates_nothing() {
        let backend = HeadlessBackend::new().failing();
        assert!(backend.create(&params(), EngineLink::default()).is_err());
        assert!(backend.transcript().is_empty());
    }
}
