//! Profiling session lifecycle.
//!
//! A [`ProfilingSession`] captures statements run through an [`EventHub`]
//! together with timing information and the call stack that issued them.
//!
//! Sessions may be started, stopped, and restarted as often as you like.
//! Calling `start` on an active session or `stop` on an inactive one is a
//! caller error and fails with a [`SessionError`]. Multiple sessions may
//! observe the same hub at once; each receives every statement.
//!
//! By default a session buffers samples in an internal [`Collector`] whose
//! contents you retrieve with [`ProfilingSession::collect`]. To receive
//! samples continually instead, configure a collect function with
//! [`ProfilingSession::with_collect_fn`].

use crate::collector::Collector;
use crate::engine::{EventHub, ExecutionId, HookId, ResultHandle, StatementEvent};
use crate::sample::{CallStack, Sample};
use crate::utils::error::SessionError;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Produces the opaque per-sample context value. Receives the same event
/// and result the after-execute hook receives.
pub type UserContextFn = Arc<dyn Fn(&StatementEvent, Option<&ResultHandle>) -> String + Send + Sync>;

/// Receives each completed sample when the caller does its own collecting
pub type CollectFn = Arc<dyn Fn(Sample) + Send + Sync>;

/// Destination for completed samples
#[derive(Clone)]
enum Sink {
    Buffer(Arc<Collector>),
    Forward(CollectFn),
}

impl Sink {
    fn send(&self, sample: Sample) {
        match self {
            Sink::Buffer(collector) => collector.put(sample),
            Sink::Forward(collect_fn) => collect_fn(sample),
        }
    }
}

/// Captures queries run on an event hub and metadata about them
pub struct ProfilingSession {
    hub: Arc<EventHub>,
    // Start instants of in-flight executions, keyed by the per-execution
    // token so overlapping statements on one connection pair correctly.
    pending: Arc<Mutex<HashMap<ExecutionId, Instant>>>,
    context_fn: Option<UserContextFn>,
    sink: Sink,
    collector: Option<Arc<Collector>>,
    registration: Option<(HookId, HookId)>,
}

impl ProfilingSession {
    /// Create an inactive session observing `hub`
    pub fn new(hub: Arc<EventHub>) -> Self {
        let collector = Arc::new(Collector::new());
        Self {
            hub,
            pending: Arc::new(Mutex::new(HashMap::new())),
            context_fn: None,
            sink: Sink::Buffer(Arc::clone(&collector)),
            collector: Some(collector),
            registration: None,
        }
    }

    /// Store the return value of `context_fn` with every sample.
    ///
    /// Useful for associating queries with specific requests in a web
    /// framework, or specific threads in a process.
    pub fn with_user_context(mut self, context_fn: UserContextFn) -> Self {
        self.context_fn = Some(context_fn);
        self
    }

    /// Forward each sample to `collect_fn` instead of buffering it.
    ///
    /// After this, [`collect`](Self::collect) fails with
    /// [`SessionError::CustomSink`].
    pub fn with_collect_fn(mut self, collect_fn: CollectFn) -> Self {
        self.sink = Sink::Forward(collect_fn);
        self.collector = None;
        self
    }

    /// Whether the hooks are currently registered
    pub fn is_active(&self) -> bool {
        self.registration.is_some()
    }

    /// Start profiling.
    ///
    /// # Errors
    /// [`SessionError::AlreadyStarted`] when the session is already active.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.registration.is_some() {
            return Err(SessionError::AlreadyStarted);
        }

        let pending = Arc::clone(&self.pending);
        let before_id = self.hub.add_before_execute(Arc::new(move |event| {
            pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(event.execution_id, Instant::now());
        }));

        let pending = Arc::clone(&self.pending);
        let context_fn = self.context_fn.clone();
        let sink = self.sink.clone();
        let after_id = self.hub.add_after_execute(Arc::new(move |event, result| {
            let started = pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&event.execution_id);
            let started = match started {
                Some(instant) => instant,
                None => {
                    // Hook attached mid-flight; there is nothing to time.
                    warn!(
                        "No start recorded for execution {:?}, skipping sample",
                        event.execution_id
                    );
                    return;
                }
            };

            let duration = started.elapsed();
            let stack = CallStack::capture();
            let user_context = context_fn.as_ref().map(|f| f(event, result));

            sink.send(Sample::new(
                event.statement.as_ref(),
                stack,
                duration,
                user_context,
            ));
        }));

        self.registration = Some((before_id, after_id));
        debug!("Profiling session started");
        Ok(())
    }

    /// Stop profiling and deregister both hooks.
    ///
    /// # Errors
    /// [`SessionError::AlreadyStopped`] when the session is not active.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        let (before_id, after_id) = self
            .registration
            .take()
            .ok_or(SessionError::AlreadyStopped)?;

        self.hub.remove_before_execute(before_id);
        self.hub.remove_after_execute(after_id);
        debug!("Profiling session stopped");
        Ok(())
    }

    /// Drain and return every sample collected so far.
    ///
    /// Non-blocking; returns an empty `Vec` when nothing is buffered.
    ///
    /// # Errors
    /// [`SessionError::CustomSink`] when the session was configured with
    /// [`with_collect_fn`](Self::with_collect_fn).
    pub fn collect(&self) -> Result<Vec<Sample>, SessionError> {
        match &self.collector {
            Some(collector) => Ok(collector.drain_all()),
            None => Err(SessionError::CustomSink),
        }
    }

    /// Profile only the queries issued inside `work`.
    ///
    /// Starts the session, runs `work`, and guarantees `stop()` on every
    /// exit path: normal return and unwind alike.
    ///
    /// # Errors
    /// [`SessionError::AlreadyStarted`] when the session is already active;
    /// `work` is not run in that case.
    pub fn scoped<T>(&mut self, work: impl FnOnce() -> T) -> Result<T, SessionError> {
        self.start()?;
        let guard = StopGuard { session: self };
        let value = work();
        drop(guard);
        Ok(value)
    }
}

/// Deregisters hooks when dropped, including during unwinding
struct StopGuard<'a> {
    session: &'a mut ProfilingSession,
}

impl Drop for StopGuard<'_> {
    fn drop(&mut self) {
        // The guard only exists while the session is active, so this
        // cannot report AlreadyStopped.
        let _ = self.session.stop();
    }
}

/// Create a new [`ProfilingSession`] on `hub` and start it.
///
/// Convenience wrapper; see [`ProfilingSession`] for configuration options.
pub fn start(hub: Arc<EventHub>) -> ProfilingSession {
    let mut session = ProfilingSession::new(hub);
    // A freshly constructed session is inactive; start cannot fail.
    let _ = session.start();
    session
}
