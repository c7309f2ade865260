//! Statement execution events and hook signatures.
//!
//! These types model the lifecycle surface a database engine exposes to
//! the profiler: one event fired immediately before a statement executes
//! and one fired after it completes successfully.

use std::sync::Arc;

/// Stable token identifying one statement execution.
///
/// Issued by the event hub so overlapping statements on the same connection
/// pair their own before/after events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionId(pub u64);

/// Identifies the connection a statement executes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

/// Opaque handle to the result set of a completed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultHandle {
    /// Rows affected or returned, when the driver knows
    pub rows: Option<u64>,
}

/// Arguments supplied to before-execute and after-execute hooks
#[derive(Debug, Clone)]
pub struct StatementEvent {
    /// Per-execution token issued by the hub
    pub execution_id: ExecutionId,

    /// Connection the statement runs on
    pub connection_id: ConnectionId,

    /// Statement text as handed to the driver
    pub statement: Arc<str>,

    /// Rendered positional/named parameter sets
    pub parameters: Vec<String>,

    /// Parameters after driver-side binding
    pub bound_parameters: Vec<String>,
}

impl StatementEvent {
    pub fn new(
        execution_id: ExecutionId,
        connection_id: ConnectionId,
        statement: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            execution_id,
            connection_id,
            statement: statement.into(),
            parameters: Vec::new(),
            bound_parameters: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<String>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Hook invoked immediately before a statement executes
pub type BeforeExecuteHook = Arc<dyn Fn(&StatementEvent) + Send + Sync>;

/// Hook invoked after a statement completes successfully
pub type AfterExecuteHook = Arc<dyn Fn(&StatementEvent, Option<&ResultHandle>) + Send + Sync>;

/// Identifier returned by hook registration, used for exact removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub(crate) u64);
