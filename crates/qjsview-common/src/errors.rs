use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WebViewError {
    #[error("webview initialization failed: {0}")]
    InitFailed(String),

    #[error("webview is not initialized")]
    NotInitialized,

    #[error("event loop unavailable: {0}")]
    EventLoopUnavailable(String),

    #[error("script evaluation failed: {0}")]
    EvalFailed(String),

    #[error("webview module already registered")]
    AlreadyRegistered,

    #[error("webview module not registered")]
    NotRegistered,

    #[error("backend not supported: {0}")]
    BackendNotSupported(String),
}

#[derive(Debug, thiserror::Error)]
pub enum QjsViewError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    WebView(#[from] WebViewError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("script error: {0}")]
    Script(String),
}
