//! Engine-facing event surface: statement events, the hook dispatch hub,
//! and a scripted stand-in driver for tests and simulations.

pub mod events;
pub mod hub;
pub mod scripted;

// Re-export main types
pub use events::{
    AfterExecuteHook, BeforeExecuteHook, ConnectionId, ExecutionId, HookId, ResultHandle,
    StatementEvent,
};
pub use hub::EventHub;
pub use scripted::ScriptedEngine;
