//! Cross-thread work queue for the thread that owns a view's loop.
//!
//! Engines are not thread-safe: `eval`, `terminate` and friends must run on
//! the thread stepping the loop. Other threads hand closures to a
//! [`Dispatcher`]; the loop runs them in submission order after each step.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use tracing::trace;

use crate::engine::Engine;

type Job = Box<dyn FnOnce(&mut dyn Engine) + Send>;
type Waker = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Shared {
    jobs: Mutex<VecDeque<Job>>,
    ready: Condvar,
    waker: Mutex<Option<Waker>>,
}

/// Cloneable, `Send + Sync` handle to a view's FIFO job queue.
#[derive(Clone, Default)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.pending())
            .finish()
    }
}

impl Dispatcher {
    /// Queue `job` to run on the loop thread. Never runs it inline.
    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce(&mut dyn Engine) + Send + 'static,
    {
        {
            let mut jobs = self
                .shared
                .jobs
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            jobs.push_back(Box::new(job));
            trace!(pending = jobs.len(), "job dispatched");
        }
        self.shared.ready.notify_all();

        let waker = self
            .shared
            .waker
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(wake) = waker.as_ref() {
            wake();
        }
    }

    /// Number of jobs waiting for the loop.
    pub fn pending(&self) -> usize {
        self.shared
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Install a hook that interrupts an engine's blocking wait.
    pub fn set_waker(&self, wake: impl Fn() + Send + Sync + 'static) {
        *self
            .shared
            .waker
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Box::new(wake));
    }

    pub fn clear_waker(&self) {
        *self
            .shared
            .waker
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Block up to `timeout` for a job to arrive. Returns whether any is pending.
    pub fn wait(&self, timeout: Duration) -> bool {
        let jobs = self
            .shared
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (jobs, _) = self
            .shared
            .ready
            .wait_timeout_while(jobs, timeout, |jobs| jobs.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        !jobs.is_empty()
    }

    /// Run the jobs queued so far against `engine`, oldest first.
    ///
    /// Jobs queued while this runs wait for the next call, so a job that
    /// re-dispatches itself cannot starve the loop.
    pub fn run_pending(&self, engine: &mut dyn Engine) -> usize {
        let batch = self.pending();
        let mut ran = 0;
        while ran < batch {
            let job = self
                .shared
                .jobs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(job) = job else { break };
            job(engine);
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "dispatched jobs executed");
        }
        ran
    }
}
