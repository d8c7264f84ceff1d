//! Real window: a `winit` top-level window hosting a `wry` web-view.
//!
//! The loop is driven by pumping the `winit` event loop one frame at a time,
//! so the thread that calls [`crate::run_loop`] stays in charge. `winit`
//! allows one event loop per process; it is parked in a thread-local between
//! sessions and handed to the live engine while one exists.
//!
//! On Linux the web-view is WebKitGTK: GTK is initialized on first use and
//! its pending events are drained after every pump. Only X11 windows can host
//! the web-view there.

use std::cell::RefCell;
use std::sync::Mutex;
use std::time::Duration;

use qjsview_common::WebViewError;
use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};
use wry::{WebView, WebViewBuilder};

use crate::engine::{Backend, Engine, EngineLink, ViewParams};

/// Longest a blocking step waits for window events.
const FRAME: Duration = Duration::from_millis(16);

/// Page-side bridge: `window.external.invoke(msg)` posts `msg` to the host.
pub(crate) const INVOKE_BRIDGE: &str = r#"
(function () {
    var invoke = function (message) {
        window.ipc.postMessage(String(message));
    };
    try {
        Object.defineProperty(window, 'external', {
            value: { invoke: invoke },
            configurable: true
        });
    } catch (e) {
        window.external.invoke = invoke;
    }
})();
"#;

/// User event sent through the loop proxy to end a blocking pump early.
#[derive(Debug, Clone, Copy)]
struct Wake;

enum LoopSlot {
    Unbuilt,
    Parked(EventLoop<Wake>),
    InUse,
}

thread_local! {
    static EVENT_LOOP: RefCell<LoopSlot> = const { RefCell::new(LoopSlot::Unbuilt) };
}

fn acquire_event_loop() -> Result<EventLoop<Wake>, WebViewError> {
    EVENT_LOOP.with(|slot| {
        let mut slot = slot.borrow_mut();
        match std::mem::replace(&mut *slot, LoopSlot::InUse) {
            LoopSlot::Parked(event_loop) => Ok(event_loop),
            LoopSlot::InUse => Err(WebViewError::EventLoopUnavailable(
                "another view on this thread is still live".into(),
            )),
            LoopSlot::Unbuilt => match build_event_loop() {
                Ok(event_loop) => Ok(event_loop),
                Err(e) => {
                    *slot = LoopSlot::Unbuilt;
                    Err(e)
                }
            },
        }
    })
}

fn release_event_loop(event_loop: EventLoop<Wake>) {
    EVENT_LOOP.with(|slot| *slot.borrow_mut() = LoopSlot::Parked(event_loop));
}

fn build_event_loop() -> Result<EventLoop<Wake>, WebViewError> {
    #[cfg(target_os = "linux")]
    gtk::init().map_err(|e| WebViewError::InitFailed(format!("gtk: {e}")))?;

    let event_loop = EventLoop::<Wake>::with_user_event()
        .build()
        .map_err(|e| WebViewError::EventLoopUnavailable(e.to_string()))?;
    info!("native event loop created");
    Ok(event_loop)
}

fn pump_gtk() {
    #[cfg(target_os = "linux")]
    while gtk::events_pending() {
        gtk::main_iteration_do(false);
    }
}

/// Window-side state the `winit` callbacks update.
#[derive(Default)]
struct Shell {
    pending: Option<WindowAttributes>,
    // Declared before `window` so the web-view is dropped first.
    webview: Option<WebView>,
    window: Option<Window>,
    create_error: Option<String>,
    closed: bool,
}

impl Shell {
    fn resize_webview(&self, size: PhysicalSize<u32>) {
        let Some(webview) = self.webview.as_ref() else {
            return;
        };
        let bounds = wry::Rect {
            position: wry::dpi::Position::Logical(LogicalPosition::new(0.0, 0.0)),
            size: wry::dpi::Size::Physical(size),
        };
        if let Err(e) = webview.set_bounds(bounds) {
            warn!(error = %e, "failed to resize web-view");
        }
    }

    fn open_pending(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.pending.take() else {
            return;
        };
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(window),
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }
}

impl ApplicationHandler<Wake> for Shell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.open_pending(event_loop);
    }

    // `Resumed` is only delivered on the first pump of a loop; a parked loop
    // reused by a later session opens its window here instead.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.open_pending(event_loop);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: Wake) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                debug!("window close requested");
                self.closed = true;
            }
            WindowEvent::Resized(size) => self.resize_webview(size),
            _ => {}
        }
    }
}

/// Backend opening one OS window per engine.
#[derive(Debug, Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn create(
        &self,
        params: &ViewParams<'_>,
        link: EngineLink,
    ) -> Result<Box<dyn Engine>, WebViewError> {
        let mut event_loop = acquire_event_loop()?;

        let attributes = Window::default_attributes()
            .with_title(params.title)
            .with_inner_size(LogicalSize::new(
                f64::from(params.width),
                f64::from(params.height),
            ))
            .with_resizable(params.resizable)
            .with_fullscreen(params.fullscreen.then_some(Fullscreen::Borderless(None)));
        let mut shell = Shell {
            pending: Some(attributes),
            ..Shell::default()
        };
        event_loop.pump_app_events(Some(Duration::ZERO), &mut shell);

        let Some(window) = shell.window.as_ref() else {
            release_event_loop(event_loop);
            let reason = shell
                .create_error
                .take()
                .unwrap_or_else(|| "window was not created".into());
            return Err(WebViewError::InitFailed(reason));
        };

        let inbox = link.inbox.clone();
        let built = WebViewBuilder::new()
            .with_url(params.url)
            .with_initialization_script(INVOKE_BRIDGE)
            .with_ipc_handler(move |request| inbox.push(request.body().to_string()))
            .build(window);
        let webview = match built {
            Ok(webview) => webview,
            Err(e) => {
                drop(shell);
                release_event_loop(event_loop);
                return Err(WebViewError::InitFailed(e.to_string()));
            }
        };
        shell.webview = Some(webview);

        let proxy = Mutex::new(event_loop.create_proxy());
        link.dispatcher.set_waker(move || {
            if let Ok(proxy) = proxy.lock() {
                let _ = proxy.send_event(Wake);
            }
        });

        debug!(url = params.url, "native web-view created");
        Ok(Box::new(NativeEngine {
            shell,
            event_loop: Some(event_loop),
            terminated: false,
        }))
    }
}

/// A live window and the event loop driving it.
pub struct NativeEngine {
    shell: Shell,
    event_loop: Option<EventLoop<Wake>>,
    terminated: bool,
}

impl Engine for NativeEngine {
    fn step(&mut self, blocking: bool) -> bool {
        if self.terminated || self.shell.closed {
            return true;
        }
        let Some(event_loop) = self.event_loop.as_mut() else {
            return true;
        };
        let timeout = if blocking { FRAME } else { Duration::ZERO };
        let status = event_loop.pump_app_events(Some(timeout), &mut self.shell);
        pump_gtk();
        matches!(status, PumpStatus::Exit(_)) || self.shell.closed || self.terminated
    }

    fn eval(&mut self, js: &str) -> Result<(), WebViewError> {
        let webview = self
            .shell
            .webview
            .as_ref()
            .ok_or(WebViewError::NotInitialized)?;
        webview
            .evaluate_script(js)
            .map_err(|e| WebViewError::EvalFailed(e.to_string()))
    }

    fn set_title(&mut self, title: &str) {
        if let Some(window) = self.shell.window.as_ref() {
            window.set_title(title);
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        if let Some(window) = self.shell.window.as_ref() {
            window.set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
        }
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }

    fn exit(&mut self) {
        self.shell.webview = None;
        self.shell.window = None;
        if let Some(event_loop) = self.event_loop.take() {
            pump_gtk();
            release_event_loop(event_loop);
            debug!("native window closed");
        }
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        self.exit();
    }
}
