//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# qjsview configuration
# Only override what you want to change -- missing fields use defaults.

[view]
# Used by webview.open() / WebView.init() for fields a script leaves unset.
# url = "about:blank"
# title = "QuickJS Web View"
# width = 800            # 1-16384
# height = 600           # 1-16384

[runtime]
# backend = "native"     # native, headless
# memory_limit_mb = 0    # 0 = unlimited
# max_stack_kb = 1024    # 64-65536

[logging]
# level = "info"         # trace, debug, info, warn, error
"##
    .to_string()
}
