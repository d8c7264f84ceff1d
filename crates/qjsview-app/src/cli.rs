use std::path::PathBuf;

use clap::Parser;

/// qjsview: run a JavaScript module with the `webview` module available.
#[derive(Parser, Debug)]
#[command(name = "qjsview", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use the windowless engine regardless of config.
    #[arg(long)]
    pub headless: bool,

    /// Module to run.
    pub script: PathBuf,

    /// Arguments exposed to the script through `scriptArgs`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub script_args: Vec<String>,
}

impl Args {
    /// `EnvFilter` directive for `--log-level`, if given.
    pub fn log_directive(&self) -> Option<String> {
        self.log_level.as_deref().map(|level| {
            if level.contains('=') {
                level.to_string()
            } else {
                format!("qjsview={level}")
            }
        })
    }
}

pub fn parse() -> Args {
    Args::parse()
}
