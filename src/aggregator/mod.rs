//! Aggregation of query samples into statement groups and metrics.
//!
//! This module transforms collected samples into:
//! - Statement groups with per-group duration statistics
//! - A slowest-query ranking
//! - A duration distribution summary

pub mod groups;
pub mod metrics;

// Re-export main types and functions
pub use groups::{group_samples, QueryGroup, ReportGroups};
pub use metrics::{calculate_duration_distribution, rank_slowest, DurationDistribution, SlowQuery};
