//! QueryTap
//!
//! Query profiling and report generation for SQL database access layers.
//!
//! QueryTap hooks into a driver's execution events, records the text,
//! duration, and call site of every statement, and aggregates the samples
//! into an HTML report, a JSON profile, or a flamegraph.
//!
//! ## Usage
//!
//! ```
//! use querytap::engine::{ConnectionId, EventHub, ScriptedEngine};
//! use querytap::session::ProfilingSession;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let hub = Arc::new(EventHub::new());
//! let engine = ScriptedEngine::new(Arc::clone(&hub));
//!
//! let mut session = ProfilingSession::new(hub);
//! session.start().unwrap();
//! engine.execute(ConnectionId(1), "SELECT 1", Duration::ZERO);
//! session.stop().unwrap();
//!
//! let samples = session.collect().unwrap();
//! let html = querytap::report::report(&samples, None).unwrap();
//! assert!(html.contains("SELECT 1"));
//! ```

pub mod aggregator;
pub mod collector;
pub mod commands;
pub mod dashboard;
pub mod engine;
pub mod flamegraph;
pub mod output;
pub mod report;
pub mod sample;
pub mod session;
pub mod utils;

// Re-export the types most integrations need
pub use collector::Collector;
pub use dashboard::{Dashboard, DashboardResponse, Method};
pub use engine::EventHub;
pub use report::report;
pub use sample::{CallStack, Frame, Sample};
pub use session::{start, ProfilingSession};
pub use utils::error::SessionError;
