//! Native web-view handle for the QuickJS `webview` module.
//!
//! Exposes the small C-shaped contract the scripting binding consumes:
//! - [`NativeView`]: the handle, owning its `url`/`title` strings, size,
//!   resizable flag and the `external_invoke_cb` slot
//! - [`Engine`] / [`Backend`]: the operations a concrete web-view provides
//! - [`Dispatcher`]: thread-safe FIFO for work that must run on the loop thread
//! - [`HeadlessBackend`]: in-process engine with a scripted page
//! - `NativeBackend` (feature `native`): `winit` window + `wry` web-view

pub mod dispatch;
pub mod engine;
pub mod headless;
#[cfg(feature = "native")]
pub mod native;
pub mod session;
pub mod view;

pub use dispatch::Dispatcher;
pub use engine::{Backend, Engine, EngineLink, Inbox, ViewParams};
pub use headless::{HeadlessBackend, HeadlessEvent, PageEvent};
#[cfg(feature = "native")]
pub use native::NativeBackend;
pub use session::{open, run_loop};
pub use view::{owned_c_string, InvokeFn, LoopState, NativeView, ViewFields};
