//! Driving a view's loop until the session ends.

use std::cell::RefCell;
use std::sync::Arc;

use qjsview_common::ViewDefaults;
use tracing::{debug, trace};

use crate::engine::Backend;
use crate::view::{LoopState, NativeView, ViewFields};

/// Step `view` until its engine reports completion, then exit it.
///
/// Page messages are handed to the installed `external_invoke_cb` between
/// steps with no borrow of `view` held, so the callback may reach back into
/// the same view (set the title, dispatch, terminate, ...).
pub fn run_loop<U: ?Sized>(view: &RefCell<NativeView<U>>, owner: &U) {
    debug!("entering webview loop");
    let mut steps: u64 = 0;
    loop {
        let state = view.borrow_mut().step(true);
        steps += 1;
        deliver_invocations(view, owner);
        if state == LoopState::Done {
            break;
        }
    }
    view.borrow_mut().exit();
    debug!(steps, "webview loop finished");
}

fn deliver_invocations<U: ?Sized>(view: &RefCell<NativeView<U>>, owner: &U) {
    loop {
        let (callback, message) = {
            let mut view = view.borrow_mut();
            (view.external_invoke_cb, view.next_invocation())
        };
        let Some(message) = message else {
            break;
        };
        match callback {
            Some(callback) => callback(owner, Some(message.as_c_str())),
            None => trace!(len = message.as_bytes().len(), "page message dropped, no callback"),
        }
    }
}

/// One-shot session: fill, default, init, loop, drop.
///
/// Returns `false` without running anything when the engine fails to
/// initialize. The transient handle is dropped before returning either way.
pub fn open(backend: Arc<dyn Backend>, fields: ViewFields, defaults: &ViewDefaults) -> bool {
    let mut view: NativeView = NativeView::new(backend);
    view.fill(fields);
    view.apply_defaults(defaults);
    if let Err(e) = view.init() {
        debug!(error = %e, "open: engine failed to initialize");
        return false;
    }
    let view = RefCell::new(view);
    run_loop(&view, &());
    true
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::thread;

    use super::*;
    use crate::headless::{HeadlessBackend, HeadlessEvent, PageEvent};
    use crate::view::owned_c_string;

    struct Owner {
        received: RefCell<Vec<String>>,
        view: RefCell<NativeView<Owner>>,
    }

    fn record(owner: &Owner, message: Option<&CStr>) {
        if let Some(message) = message {
            owner
                .received
                .borrow_mut()
                .push(message.to_string_lossy().into_owned());
        }
    }

    fn owner_with(backend: Arc<HeadlessBackend>) -> Owner {
        let mut view = NativeView::new(backend as Arc<dyn Backend>);
        view.apply_defaults(&ViewDefaults::default());
        Owner {
            received: RefCell::new(Vec::new()),
            view: RefCell::new(view),
        }
    }

    #[test]
    fn loop_delivers_messages_then_exits() {
        let backend = Arc::new(HeadlessBackend::new().with_page([
            PageEvent::Invoke("one".into()),
            PageEvent::Invoke("two".into()),
            PageEvent::Close,
        ]));
        let owner = owner_with(backend.clone());
        owner.view.borrow_mut().external_invoke_cb = Some(record);
        owner.view.borrow_mut().init().unwrap();

        run_loop(&owner.view, &owner);

        assert_eq!(*owner.received.borrow(), vec!["one", "two"]);
        assert!(!owner.view.borrow().is_initialized());
        assert_eq!(backend.transcript().last(), Some(&HeadlessEvent::Exit));
    }

    #[test]
    fn messages_without_callback_are_dropped() {
        let backend = Arc::new(
            HeadlessBackend::new().with_page([PageEvent::Invoke("lost".into()), PageEvent::Close]),
        );
        let owner = owner_with(backend);
        owner.view.borrow_mut().init().unwrap();

        run_loop(&owner.view, &owner);
        assert!(owner.received.borrow().is_empty());
    }

    #[test]
    fn callback_can_terminate_its_own_view() {
        fn stop(owner: &Owner, _message: Option<&CStr>) {
            owner.view.borrow_mut().terminate();
        }

        let backend = Arc::new(HeadlessBackend::new().with_page([
            PageEvent::Invoke("terminate".into()),
            PageEvent::Invoke("never delivered".into()),
        ]));
        let owner = owner_with(backend.clone());
        owner.view.borrow_mut().external_invoke_cb = Some(stop);
        owner.view.borrow_mut().init().unwrap();

        run_loop(&owner.view, &owner);

        let transcript = backend.transcript();
        assert!(transcript.contains(&HeadlessEvent::Terminate));
        assert_eq!(backend.remaining_page_events(), 1);
    }

    #[test]
    fn dispatched_eval_runs_on_loop_thread_only_when_looping() {
        let backend = Arc::new(HeadlessBackend::new());
        let owner = owner_with(backend.clone());
        owner.view.borrow_mut().init().unwrap();
        let dispatcher = owner.view.borrow().dispatcher();

        let caller = thread::spawn(move || {
            dispatcher.dispatch(|engine| {
                let _ = engine.eval("document.title = 'from afar'");
            });
            dispatcher.dispatch(|engine| engine.terminate());
            thread::current().id()
        })
        .join()
        .unwrap();

        // Queued, not executed by the calling thread.
        assert_eq!(owner.view.borrow().dispatcher().pending(), 2);
        assert!(backend.evals().is_empty());

        run_loop(&owner.view, &owner);

        let evals = backend.evals();
        assert_eq!(evals.len(), 1);
        assert_eq!(evals[0].0, "document.title = 'from afar'");
        assert_eq!(evals[0].1, thread::current().id());
        assert_ne!(evals[0].1, caller);
    }

    #[test]
    fn dispatch_from_thread_wakes_blocked_loop() {
        let backend = Arc::new(HeadlessBackend::new().with_idle_limit(10_000));
        let owner = owner_with(backend.clone());
        owner.view.borrow_mut().init().unwrap();
        let dispatcher = owner.view.borrow().dispatcher();

        let sender = thread::spawn(move || {
            thread::sleep(std::time::Duration::from_millis(30));
            dispatcher.dispatch(|engine| {
                let _ = engine.eval("ping()");
            });
            dispatcher.dispatch(|engine| engine.terminate());
        });

        run_loop(&owner.view, &owner);
        sender.join().unwrap();

        assert_eq!(backend.evals().len(), 1);
        assert!(backend.transcript().contains(&HeadlessEvent::Terminate));
    }

    #[test]
    fn open_runs_full_session() {
        let backend = Arc::new(HeadlessBackend::new().with_page([PageEvent::Close]));
        let fields = ViewFields {
            url: Some(owned_c_string("https://example.test")),
            title: Some(owned_c_string("T")),
            width: Some(320),
            height: Some(240),
            resizable: None,
        };

        assert!(open(
            backend.clone() as Arc<dyn Backend>,
            fields,
            &ViewDefaults::default()
        ));
        assert_eq!(
            backend.transcript(),
            vec![
                HeadlessEvent::Init {
                    url: "https://example.test".into(),
                    title: "T".into(),
                    width: 320,
                    height: 240,
                    resizable: false,
                    fullscreen: false,
                },
                HeadlessEvent::Exit,
            ]
        );
    }

    #[test]
    fn open_with_failing_engine_is_silent() {
        let backend = Arc::new(HeadlessBackend::new().failing());
        assert!(!open(
            backend.clone() as Arc<dyn Backend>,
            ViewFields::default(),
            &ViewDefaults::default()
        ));
        assert!(backend.transcript().is_empty());
    }
}
