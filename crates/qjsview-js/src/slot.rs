//! The retained script callback of a `WebView`.

use std::cell::RefCell;

use rquickjs::class::{Trace, Tracer};
use rquickjs::{Ctx, Function};

/// Owned, traceable reference to a script function.
///
/// A `Function` carries the context it belongs to, so the callback and the
/// context used to call it are always set and cleared together.
#[derive(Default)]
pub struct CallbackSlot<'js> {
    func: RefCell<Option<Function<'js>>>,
}

impl<'js> CallbackSlot<'js> {
    /// Retain `func`, releasing any function held before.
    pub fn install(&self, func: Function<'js>) {
        let previous = self.func.borrow_mut().replace(func);
        drop(previous);
    }

    /// Release the held function. Returns whether there was one.
    pub fn clear(&self) -> bool {
        let previous = self.func.borrow_mut().take();
        previous.is_some()
    }

    /// A new reference to the held function, independent of the slot.
    pub fn get(&self) -> Option<Function<'js>> {
        self.func.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.func.borrow().is_none()
    }

    /// Context the held function belongs to.
    pub fn context(&self) -> Option<Ctx<'js>> {
        self.func.borrow().as_ref().map(|func| func.ctx().clone())
    }
}

impl<'js> Trace<'js> for CallbackSlot<'js> {
    fn trace<'a>(&self, tracer: Tracer<'a, 'js>) {
        // Mid-replacement: skip rather than panic inside the collector.
        if let Ok(func) = self.func.try_borrow() {
            if let Some(func) = func.as_ref() {
                func.trace(tracer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rquickjs::{Context, Runtime};

    use super::*;

    fn with_ctx(f: impl for<'js> FnOnce(Ctx<'js>)) {
        let rt = Runtime::new().unwrap();
        let ctx = Context::full(&rt).unwrap();
        ctx.with(f);
    }

    #[test]
    fn install_and_clear() {
        with_ctx(|ctx| {
            let slot = CallbackSlot::default();
            assert!(slot.is_empty());
            assert!(slot.context().is_none());
            assert!(!slot.clear());

            let func: Function = ctx.eval("(function (m) { return m; })").unwrap();
            slot.install(func);
            assert!(!slot.is_empty());
            assert!(slot.context().is_some());

            assert!(slot.clear());
            assert!(slot.is_empty());
            assert!(slot.context().is_none());
        });
    }

    #[test]
    fn install_replaces_previous() {
        with_ctx(|ctx| {
            let slot = CallbackSlot::default();
            let first: Function = ctx.eval("(function () { return 1; })").unwrap();
            let second: Function = ctx.eval("(function () { return 2; })").unwrap();
            slot.install(first);
            slot.install(second);

            let held = slot.get().unwrap();
            assert_eq!(held.call::<_, i32>(()).unwrap(), 2);
        });
    }

    #[test]
    fn get_outlives_clear() {
        with_ctx(|ctx| {
            let slot = CallbackSlot::default();
            let func: Function = ctx.eval("(function () { return 'kept'; })").unwrap();
            slot.install(func);
            let held = slot.get().unwrap();
            slot.clear();
            assert_eq!(held.call::<_, String>(()).unwrap(), "kept");
        });
    }
}
