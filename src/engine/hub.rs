//! Event hub: the engine-side dispatch table for execution hooks.
//!
//! Hook registration and removal mutate an explicit set of callback
//! references owned by the hub; removal is exact, keyed by the id handed
//! out at registration. Every registered hook receives every event
//! (fan-out), so multiple profiling sessions on one hub each see every
//! statement.

use super::events::{
    AfterExecuteHook, BeforeExecuteHook, ExecutionId, HookId, ResultHandle, StatementEvent,
};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Dispatch table wiring execution events to registered hooks.
///
/// A driver integration owns one hub, fires `emit_before` / `emit_after`
/// around each statement, and hands the hub to any profiling sessions
/// that want to observe it.
#[derive(Default)]
pub struct EventHub {
    before: Mutex<Vec<(HookId, BeforeExecuteHook)>>,
    after: Mutex<Vec<(HookId, AfterExecuteHook)>>,
    next_hook_id: AtomicU64,
    next_execution_id: AtomicU64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the per-execution token the driver attaches to both events
    /// of one statement execution.
    pub fn next_execution_id(&self) -> ExecutionId {
        ExecutionId(self.next_execution_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a before-execute hook; returns the id used for removal
    pub fn add_before_execute(&self, hook: BeforeExecuteHook) -> HookId {
        let id = HookId(self.next_hook_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.before).push((id, hook));
        debug!("Registered before-execute hook {:?}", id);
        id
    }

    /// Register an after-execute hook; returns the id used for removal
    pub fn add_after_execute(&self, hook: AfterExecuteHook) -> HookId {
        let id = HookId(self.next_hook_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.after).push((id, hook));
        debug!("Registered after-execute hook {:?}", id);
        id
    }

    /// Remove a before-execute hook by exact id.
    /// Returns false when no hook with that id is registered.
    pub fn remove_before_execute(&self, id: HookId) -> bool {
        let mut hooks = lock(&self.before);
        let before_len = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before_len
    }

    /// Remove an after-execute hook by exact id.
    pub fn remove_after_execute(&self, id: HookId) -> bool {
        let mut hooks = lock(&self.after);
        let before_len = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before_len
    }

    /// Number of registered (before, after) hooks
    pub fn hook_counts(&self) -> (usize, usize) {
        (lock(&self.before).len(), lock(&self.after).len())
    }

    /// Fire a before-execute event at every registered hook, in
    /// registration order.
    pub fn emit_before(&self, event: &StatementEvent) {
        // Clone the hooks out so a callback can register or remove hooks
        // without deadlocking.
        let hooks: Vec<BeforeExecuteHook> =
            lock(&self.before).iter().map(|(_, h)| h.clone()).collect();
        for hook in hooks {
            hook(event);
        }
    }

    /// Fire an after-execute event at every registered hook.
    pub fn emit_after(&self, event: &StatementEvent, result: Option<&ResultHandle>) {
        let hooks: Vec<AfterExecuteHook> =
            lock(&self.after).iter().map(|(_, h)| h.clone()).collect();
        for hook in hooks {
            hook(event, result);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::ConnectionId;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn event(hub: &EventHub, text: &str) -> StatementEvent {
        StatementEvent::new(hub.next_execution_id(), ConnectionId(1), text)
    }

    #[test]
    fn test_fan_out_to_all_hooks() {
        let hub = EventHub::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            hub.add_before_execute(Arc::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            }));
        }

        hub.emit_before(&event(&hub, "SELECT 1"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_exact_removal() {
        let hub = EventHub::new();
        let id = hub.add_before_execute(Arc::new(|_| {}));
        let other = hub.add_before_execute(Arc::new(|_| {}));

        assert!(hub.remove_before_execute(id));
        assert!(!hub.remove_before_execute(id));
        assert_eq!(hub.hook_counts(), (1, 0));
        assert!(hub.remove_before_execute(other));
    }

    #[test]
    fn test_execution_ids_unique() {
        let hub = EventHub::new();
        let a = hub.next_execution_id();
        let b = hub.next_execution_id();
        assert_ne!(a, b);
    }
}
