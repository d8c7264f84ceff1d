pub mod errors;
pub mod view;

pub use errors::{ConfigError, QjsViewError, WebViewError};
pub use view::ViewDefaults;
