//! The `WebView` script class.

use std::cell::{Ref, RefCell};
use std::ffi::CStr;
use std::sync::Arc;

use qjsview_webview::{run_loop, Dispatcher, NativeView};
use rquickjs::class::{Trace, Tracer};
use rquickjs::function::Rest;
use rquickjs::{CatchResultExt, Class, Ctx, Exception, JsLifetime, Result, Value};
use tracing::{debug, trace};

use crate::args;
use crate::registry::Registry;
use crate::slot::CallbackSlot;

/// A native web-view owned by a script object.
///
/// Dropped when the collector finalizes the object: the handle's strings,
/// any live engine and the retained callback are released then.
#[rquickjs::class]
pub struct WebView<'js> {
    view: RefCell<NativeView<WebView<'js>>>,
    callback: CallbackSlot<'js>,
    registry: Arc<Registry>,
}

unsafe impl<'js> JsLifetime<'js> for WebView<'js> {
    type Changed<'to> = WebView<'to>;
}

impl<'js> Trace<'js> for WebView<'js> {
    fn trace<'a>(&self, tracer: Tracer<'a, 'js>) {
        self.callback.trace(tracer);
    }
}

impl<'js> WebView<'js> {
    /// `create(url?, title?, width?, height?, resizable?)`. Defaults are not
    /// applied until `init`.
    pub fn create(
        ctx: &Ctx<'js>,
        registry: Arc<Registry>,
        args: &[Value<'js>],
    ) -> Result<Class<'js, WebView<'js>>> {
        let fields = args::view_fields(args)?;
        let mut view = NativeView::new(registry.backend());
        view.fill(fields);
        debug!(backend = view.backend_name(), "webview created");
        Class::instance(
            ctx.clone(),
            WebView {
                view: RefCell::new(view),
                callback: CallbackSlot::default(),
                registry,
            },
        )
    }

    /// Message handler installed as the handle's `external_invoke_cb`.
    ///
    /// Exceptions thrown by the script callback are caught and logged; they
    /// never reach the engine.
    pub fn trampoline(owner: &WebView<'js>, message: Option<&CStr>) {
        let Some(message) = message else {
            return;
        };
        let Some(func) = owner.callback.get() else {
            trace!("page message without callback dropped");
            return;
        };
        let ctx = func.ctx().clone();
        let text = message.to_string_lossy();
        if let Err(e) = func.call::<_, Value>((text.as_ref(),)).catch(&ctx) {
            debug!(error = %e, "webview callback raised an exception");
        }
    }

    /// Queue handle for Rust code running on other threads.
    pub fn dispatcher(&self) -> Dispatcher {
        self.view.borrow().dispatcher()
    }

    /// Read access to the native handle.
    pub fn native(&self) -> Ref<'_, NativeView<WebView<'js>>> {
        self.view.borrow()
    }

    pub fn has_callback(&self) -> bool {
        !self.callback.is_empty()
    }
}

#[rquickjs::methods]
impl<'js> WebView<'js> {
    pub fn init(&self, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> Result<()> {
        let fields = args::view_fields(&args.0)?;
        let mut view = self.view.borrow_mut();
        view.fill(fields);
        view.apply_defaults(self.registry.defaults());
        view.init()
            .map_err(|e| Exception::throw_internal(&ctx, &e.to_string()))
    }

    #[qjs(rename = "loop")]
    pub fn run(&self) {
        run_loop(&self.view, self);
    }

    pub fn callback(&self, args: Rest<Value<'js>>) {
        let func = args.0.first().and_then(|value| value.as_function()).cloned();
        let mut view = self.view.borrow_mut();
        match func {
            Some(func) => {
                self.callback.install(func);
                view.external_invoke_cb = Some(WebView::trampoline);
                trace!("webview callback installed");
            }
            None => {
                if self.callback.clear() {
                    trace!("webview callback cleared");
                }
                view.external_invoke_cb = None;
            }
        }
    }

    pub fn eval(&self, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> Result<()> {
        let Some(code) = args.0.first() else {
            return Err(Exception::throw_type(&ctx, "eval expects a script"));
        };
        let js = args::c_string(code)?;
        if args::flag(&args.0, 1)? {
            trace!(len = js.as_bytes().len(), "eval dispatched");
            self.dispatcher().dispatch(move |engine| {
                if let Err(e) = engine.eval(&js.to_string_lossy()) {
                    debug!(error = %e, "dispatched eval failed");
                }
            });
            return Ok(());
        }
        if let Err(e) = self.view.borrow_mut().eval(&js) {
            debug!(error = %e, "eval failed");
        }
        Ok(())
    }

    pub fn terminate(&self, args: Rest<Value<'js>>) -> Result<()> {
        if args::flag(&args.0, 0)? {
            self.dispatcher().dispatch(|engine| engine.terminate());
        } else {
            self.view.borrow_mut().terminate();
        }
        Ok(())
    }

    pub fn title(&self, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> Result<()> {
        let Some(text) = args.0.first() else {
            return Err(Exception::throw_type(&ctx, "title expects a string"));
        };
        let title = args::c_string(text)?;
        self.view.borrow_mut().set_title(title);
        Ok(())
    }

    pub fn fullscreen(&self, args: Rest<Value<'js>>) -> Result<()> {
        let fullscreen = args::flag(&args.0, 0)?;
        self.view.borrow_mut().set_fullscreen(fullscreen);
        Ok(())
    }
}
