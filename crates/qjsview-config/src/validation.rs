//! Configuration validation.
//!
//! Collects every range error into a single `ConfigError`.

use crate::schema::QjsViewConfig;
use qjsview_common::ConfigError;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &QjsViewConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_view(&mut errors, config);
    validate_runtime(&mut errors, config);
    validate_logging(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: i64, min: i64, max: i64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn validate_view(errors: &mut Vec<String>, config: &QjsViewConfig) {
    validate_range(errors, "view.width", config.view.width.into(), 1, 16384);
    validate_range(errors, "view.height", config.view.height.into(), 1, 16384);
    if config.view.url.trim().is_empty() {
        errors.push("view.url must not be empty".into());
    }
    if config.view.url.contains('\0') || config.view.title.contains('\0') {
        errors.push("view.url and view.title must not contain NUL".into());
    }
}

fn validate_runtime(errors: &mut Vec<String>, config: &QjsViewConfig) {
    validate_range(
        errors,
        "runtime.max_stack_kb",
        config.runtime.max_stack_kb.into(),
        64,
        65536,
    );
}

fn validate_logging(errors: &mut Vec<String>, config: &QjsViewConfig) {
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(format!(
            "logging.level = {:?} must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }
}
