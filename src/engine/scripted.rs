//! A deterministic stand-in database driver.
//!
//! The scripted engine does not talk to a database; it fires the same
//! before/after event sequence a real driver integration would, with a
//! caller-controlled busy period in between. Used by the `simulate`
//! command and the integration tests.

use super::events::{ConnectionId, ResultHandle, StatementEvent};
use super::hub::EventHub;
use std::sync::Arc;
use std::time::Duration;

/// Fires execution events without executing anything
pub struct ScriptedEngine {
    hub: Arc<EventHub>,
}

impl ScriptedEngine {
    pub fn new(hub: Arc<EventHub>) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }

    /// Simulate executing `statement` on `connection`, staying busy for
    /// `busy` between the before and after events.
    pub fn execute(&self, connection: ConnectionId, statement: &str, busy: Duration) {
        self.execute_with_parameters(connection, statement, Vec::new(), busy)
    }

    pub fn execute_with_parameters(
        &self,
        connection: ConnectionId,
        statement: &str,
        parameters: Vec<String>,
        busy: Duration,
    ) {
        let event = StatementEvent::new(self.hub.next_execution_id(), connection, statement)
            .with_parameters(parameters);

        self.hub.emit_before(&event);
        if !busy.is_zero() {
            std::thread::sleep(busy);
        }
        self.hub.emit_after(&event, Some(&ResultHandle { rows: Some(1) }));
    }
}
