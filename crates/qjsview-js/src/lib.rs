//! QuickJS `webview` module on top of `qjsview-webview`.
//!
//! Scripts see two functions, `open` and `create`, and the `WebView` class
//! `create` returns (`init`, `loop`, `callback`, `eval`, `title`,
//! `fullscreen`, `terminate`). Views are built with the backend held by the
//! process-wide [`Registry`]; [`bind`] builds the same exports for a
//! registry of the caller's choosing.

pub mod args;
pub mod module;
pub mod registry;
pub mod slot;
pub mod webview;


pub use module::{bind, WebViewModule};
pub use registry::{install, installed, Registry};
pub use slot::CallbackSlot;
pub use webview::WebView;
