//! The `webview` module: `open` and `create`.

use std::sync::Arc;

use qjsview_common::WebViewError;
use qjsview_webview::open as open_session;
use rquickjs::function::Rest;
use rquickjs::module::{Declarations, Exports, ModuleDef};
use rquickjs::{Class, Ctx, Exception, Function, Object, Result, Value};
use tracing::debug;

use crate::args;
use crate::registry::{self, Registry};
use crate::webview::WebView;

/// Native module definition, bound to the installed [`Registry`].
///
/// Register it under the name scripts import:
/// `ModuleLoader::default().with_module("webview", WebViewModule)`.
pub struct WebViewModule;

impl ModuleDef for WebViewModule {
    fn declare<'js>(decl: &Declarations<'js>) -> Result<()> {
        decl.declare("open")?;
        decl.declare("create")?;
        Ok(())
    }

    fn evaluate<'js>(ctx: &Ctx<'js>, exports: &Exports<'js>) -> Result<()> {
        let registry = registry::installed().ok_or_else(|| {
            Exception::throw_internal(ctx, &WebViewError::NotRegistered.to_string())
        })?;
        exports.export("open", open_function(ctx, Arc::clone(&registry))?)?;
        exports.export("create", create_function(ctx, registry)?)?;
        Ok(())
    }
}

/// The module's exports as a plain object bound to `registry`.
pub fn bind<'js>(ctx: &Ctx<'js>, registry: Arc<Registry>) -> Result<Object<'js>> {
    let exports = Object::new(ctx.clone())?;
    exports.set("open", open_function(ctx, Arc::clone(&registry))?)?;
    exports.set("create", create_function(ctx, registry)?)?;
    Ok(exports)
}

fn create_function<'js>(ctx: &Ctx<'js>, registry: Arc<Registry>) -> Result<Function<'js>> {
    Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> Result<Class<'js, WebView<'js>>> {
            WebView::create(&ctx, Arc::clone(&registry), &args.0)
        },
    )?
    .with_name("create")
}

fn open_function<'js>(ctx: &Ctx<'js>, registry: Arc<Registry>) -> Result<Function<'js>> {
    Function::new(ctx.clone(), move |args: Rest<Value<'js>>| -> Result<()> {
        let fields = args::view_fields(&args.0)?;
        if !open_session(registry.backend(), fields, registry.defaults()) {
            debug!("open: no session was started");
        }
        Ok(())
    })?
    .with_name("open")
}
