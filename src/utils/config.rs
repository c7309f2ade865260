//! Configuration and constants for the profiler.

/// Current JSON profile schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Title used for reports when the caller does not supply one
pub const DEFAULT_REPORT_TITLE: &str = "QueryTap Profiling Report";

/// Default flamegraph width in pixels
pub const DEFAULT_FLAMEGRAPH_WIDTH: usize = 1200;

/// Suggested mount point for the dashboard handler
pub const DEFAULT_DASHBOARD_PATH: &str = "/__querytap__";

/// Frames whose symbols start with these prefixes are the profiler's own
/// machinery and are excluded from captured call stacks.
pub const INTERNAL_FRAME_PREFIXES: &[&str] = &["querytap::", "backtrace::", "std::", "core::"];
