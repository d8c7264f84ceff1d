//! Positional argument coercion shared by `create`, `init` and `open`.

use std::ffi::CString;

use qjsview_webview::{owned_c_string, ViewFields};
use rquickjs::convert::Coerced;
use rquickjs::{Result, Value};

/// The argument at `index`, unless it is missing or `undefined`.
pub fn defined<'a, 'js>(args: &'a [Value<'js>], index: usize) -> Option<&'a Value<'js>> {
    args.get(index).filter(|value| !value.is_undefined())
}

/// `ToBoolean` of a defined argument, `false` otherwise.
pub fn flag(args: &[Value<'_>], index: usize) -> Result<bool> {
    match defined(args, index) {
        Some(value) => Ok(value.get::<Coerced<bool>>()?.0),
        None => Ok(false),
    }
}

/// `ToString` of `value`, copied into an owned C string.
pub fn c_string(value: &Value<'_>) -> Result<CString> {
    let Coerced(text) = value.get::<Coerced<String>>()?;
    Ok(owned_c_string(text))
}

/// Parse `(url, title, width, height, resizable)`.
///
/// Everything is coerced before anything is returned, so a throwing
/// `toString` leaves the target handle untouched.
pub fn view_fields(args: &[Value<'_>]) -> Result<ViewFields> {
    let url = defined(args, 0).map(c_string).transpose()?;
    let title = defined(args, 1).map(c_string).transpose()?;
    let width = defined(args, 2)
        .map(|value| value.get::<Coerced<i32>>().map(|c| c.0))
        .transpose()?;
    let height = defined(args, 3)
        .map(|value| value.get::<Coerced<i32>>().map(|c| c.0))
        .transpose()?;
    let resizable = defined(args, 4)
        .map(|value| value.get::<Coerced<bool>>().map(|c| c.0))
        .transpose()?;
    Ok(ViewFields {
        url,
        title,
        width,
        height,
        resizable,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rquickjs::function::Rest;
    use rquickjs::{Context, Ctx, Function, Runtime};

    use super::*;

    type Sink = Rc<RefCell<Option<ViewFields>>>;

    fn install_probe<'js>(ctx: &Ctx<'js>, sink: Sink) {
        let probe = Function::new(
            ctx.clone(),
            move |args: Rest<Value<'js>>| -> Result<()> {
                *sink.borrow_mut() = Some(view_fields(&args.0)?);
                Ok(())
            },
        )
        .unwrap();
        ctx.globals().set("probe", probe).unwrap();
    }

    /// Run `src` with a global `probe(...)` that parses its arguments.
    fn parse(src: &str) -> std::result::Result<ViewFields, String> {
        let rt = Runtime::new().unwrap();
        let ctx = Context::full(&rt).unwrap();
        let sink: Sink = Rc::default();
        ctx.with(|ctx| {
            install_probe(&ctx, Rc::clone(&sink));
            if ctx.eval::<(), _>(src).is_err() {
                let thrown = ctx.catch();
                return Err(thrown
                    .get::<Coerced<String>>()
                    .map(|c| c.0)
                    .unwrap_or_default());
            }
            Ok(())
        })?;
        let fields = sink.borrow_mut().take();
        fields.ok_or_else(|| "probe was not called".to_string())
    }

    #[test]
    fn no_arguments_leave_everything_unset() {
        assert_eq!(parse("probe()").unwrap(), ViewFields::default());
    }

    #[test]
    fn all_arguments_coerce() {
        let fields = parse("probe('https://a.test', 'T', '320', 240.9, 1)").unwrap();
        assert_eq!(fields.url.as_deref(), Some(c"https://a.test"));
        assert_eq!(fields.title.as_deref(), Some(c"T"));
        assert_eq!(fields.width, Some(320));
        assert_eq!(fields.height, Some(240));
        assert_eq!(fields.resizable, Some(true));
    }

    #[test]
    fn undefined_skips_only_that_field() {
        let fields = parse("probe(undefined, 'T', undefined, 10)").unwrap();
        assert!(fields.url.is_none());
        assert_eq!(fields.title.as_deref(), Some(c"T"));
        assert!(fields.width.is_none());
        assert_eq!(fields.height, Some(10));
        assert!(fields.resizable.is_none());
    }

    #[test]
    fn null_and_numbers_stringify() {
        let fields = parse("probe(null, 42)").unwrap();
        assert_eq!(fields.url.as_deref(), Some(c"null"));
        assert_eq!(fields.title.as_deref(), Some(c"42"));
    }

    #[test]
    fn resizable_reads_fifth_argument() {
        let fields = parse("probe('u', 't', 1, 1, false)").unwrap();
        assert_eq!(fields.resizable, Some(false));
        let fields = parse("probe('u', 't', 1, 0, true)").unwrap();
        assert_eq!(fields.resizable, Some(true));
    }

    #[test]
    fn non_numeric_size_is_zero() {
        let fields = parse("probe('u', 't', 'wide')").unwrap();
        assert_eq!(fields.width, Some(0));
    }

    #[test]
    fn interior_nul_truncates() {
        let fields = parse("probe('abc\\0def')").unwrap();
        assert_eq!(fields.url.as_deref(), Some(c"abc"));
    }

    #[test]
    fn throwing_to_string_propagates() {
        let err = parse("probe('ok', { toString() { throw new Error('boom'); } })").unwrap_err();
        assert!(err.contains("boom"), "{err}");
    }
}
