mod cli;
mod runner;

use std::process::ExitCode;
use std::sync::Arc;

use qjsview_common::{QjsViewError, WebViewError};
use qjsview_config::{BackendKind, QjsViewConfig};
use qjsview_js::Registry;
use qjsview_webview::{Backend, HeadlessBackend};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

fn init_logging(directive: &str) {
    let directive: Directive = directive
        .parse()
        .unwrap_or_else(|_| Directive::from(LevelFilter::INFO));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();
}

fn select_backend(kind: BackendKind) -> Result<Arc<dyn Backend>, WebViewError> {
    match kind {
        BackendKind::Headless => Ok(Arc::new(HeadlessBackend::new())),
        #[cfg(feature = "native")]
        BackendKind::Native => Ok(Arc::new(qjsview_webview::NativeBackend::new())),
        #[cfg(not(feature = "native"))]
        BackendKind::Native => Err(WebViewError::BackendNotSupported(
            "built without the `native` feature; use --headless".into(),
        )),
    }
}

fn run(args: &cli::Args, config: &QjsViewConfig) -> Result<(), QjsViewError> {
    let kind = if args.headless {
        BackendKind::Headless
    } else {
        config.runtime.backend
    };
    let backend = select_backend(kind)?;
    tracing::info!(backend = backend.name(), "webview backend selected");
    qjsview_js::install(Registry::new(backend, config.view.defaults()))?;

    runner::run_script(&args.script, &args.script_args, &config.runtime)
}

fn main() -> ExitCode {
    let args = cli::parse();

    // Config first: it may carry the log level.
    let loaded = match &args.config {
        Some(path) => qjsview_config::load_config_from(path),
        None => qjsview_config::load_config(),
    };
    let (config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (QjsViewConfig::default(), Some(e)),
    };

    let directive = args
        .log_directive()
        .unwrap_or_else(|| config.logging.directive());
    init_logging(&directive);

    tracing::info!("qjsview v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    if let Some(e) = load_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }
    tracing::debug!(config = %qjsview_config::config_to_json(&config), "effective config");

    match run(&args, &config) {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
