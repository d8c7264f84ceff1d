//! QuickJS runtime setup and script execution.

use std::path::{Component, Path, PathBuf};

use qjsview_common::QjsViewError;
use qjsview_config::RuntimeConfig;
use qjsview_js::WebViewModule;
use rquickjs::convert::Coerced;
use rquickjs::function::Rest;
use rquickjs::loader::{BuiltinResolver, FileResolver, ModuleLoader, Resolver, ScriptLoader};
use rquickjs::{CatchResultExt, Context, Ctx, Error, Function, Module, Object, Runtime};
use tracing::{debug, info, warn};

/// Run `script` as a module until it and its pending jobs complete.
///
/// `script_args` become `scriptArgs[1..]`; `scriptArgs[0]` is the script's
/// absolute path.
pub fn run_script(
    script: &Path,
    script_args: &[String],
    limits: &RuntimeConfig,
) -> Result<(), QjsViewError> {
    let source = std::fs::read_to_string(script)?;
    // Absolute, so relative imports resolve from the script's directory.
    let name = std::fs::canonicalize(script)?
        .to_string_lossy()
        .into_owned();

    let rt = Runtime::new().map_err(js_error)?;
    if limits.memory_limit_mb > 0 {
        rt.set_memory_limit(mib_to_bytes(limits.memory_limit_mb));
    }
    rt.set_max_stack_size(kib_to_bytes(limits.max_stack_kb));
    rt.set_loader(
        (
            BuiltinResolver::default().with_module("webview"),
            SiblingResolver,
            FileResolver::default(),
        ),
        (
            ModuleLoader::default().with_module("webview", WebViewModule),
            ScriptLoader::default(),
        ),
    );
    let ctx = Context::full(&rt).map_err(js_error)?;

    let mut args = Vec::with_capacity(script_args.len() + 1);
    args.push(name.clone());
    args.extend_from_slice(script_args);

    info!(script = %name, "running script");
    ctx.with(|ctx| -> Result<(), QjsViewError> {
        install_globals(&ctx, args).map_err(js_error)?;
        Module::evaluate(ctx.clone(), name.as_str(), source)
            .and_then(|promise| promise.finish::<()>())
            .catch(&ctx)
            .map_err(|e| QjsViewError::Script(e.to_string()))
    })?;

    drain_jobs(&rt)?;
    debug!(script = %name, "script finished");
    Ok(())
}

fn drain_jobs(rt: &Runtime) -> Result<(), QjsViewError> {
    loop {
        match rt.execute_pending_job() {
            Ok(true) => continue,
            Ok(false) => return Ok(()),
            Err(job) => {
                let reason = job.0.with(|ctx| {
                    let thrown = ctx.catch();
                    thrown
                        .get::<Coerced<String>>()
                        .map(|c| c.0)
                        .unwrap_or_else(|_| "unknown exception".into())
                });
                warn!(%reason, "pending job failed");
                return Err(QjsViewError::Script(reason));
            }
        }
    }
}

/// `print`, `console.log` and `scriptArgs`.
fn install_globals<'js>(ctx: &Ctx<'js>, script_args: Vec<String>) -> rquickjs::Result<()> {
    let globals = ctx.globals();
    let print = Function::new(ctx.clone(), |values: Rest<Coerced<String>>| {
        let line = values
            .0
            .iter()
            .map(|value| value.0.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{line}");
    })?
    .with_name("print")?;

    let console = Object::new(ctx.clone())?;
    console.set("log", print.clone())?;
    globals.set("console", console)?;
    globals.set("print", print)?;
    globals.set("scriptArgs", script_args)?;
    Ok(())
}

/// Resolves `./` and `../` imports from a module with an absolute path
/// against that module's directory.
struct SiblingResolver;

impl Resolver for SiblingResolver {
    fn resolve<'js>(
        &mut self,
        _ctx: &Ctx<'js>,
        base: &str,
        name: &str,
    ) -> rquickjs::Result<String> {
        sibling_path(base, name)
            .map(|path| path.to_string_lossy().into_owned())
            .ok_or_else(|| Error::new_resolving(base, name))
    }
}

fn sibling_path(base: &str, name: &str) -> Option<PathBuf> {
    if !(name.starts_with("./") || name.starts_with("../")) {
        return None;
    }
    let dir = Path::new(base).parent().filter(|dir| dir.is_absolute())?;
    let joined = normalize(&dir.join(name));
    if joined.is_file() {
        return Some(joined);
    }
    let with_ext = joined.with_extension("js");
    (joined.extension().is_none() && with_ext.is_file()).then_some(with_ext)
}

/// Drop `.` and fold `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn mib_to_bytes(mib: u32) -> usize {
    usize::try_from(u64::from(mib).saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
}

fn kib_to_bytes(kib: u32) -> usize {
    usize::try_from(u64::from(kib).saturating_mul(1024)).unwrap_or(usize::MAX)
}

fn js_error(e: rquickjs::Error) -> QjsViewError {
    QjsViewError::Script(e.to_string())
}
