//! Versioned JSON schema for exported profile data.
//!
//! This is the structure written to disk by the JSON output writer.
//! Schema is versioned to allow future evolution.

use crate::aggregator::{
    calculate_duration_distribution, rank_slowest, DurationDistribution, ReportGroups, SlowQuery,
};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    /// Schema version for compatibility checking
    pub version: String,

    /// Report title
    pub title: String,

    /// Timestamp when the report was generated (RFC 3339)
    pub generated_at: String,

    /// Distribution summary across every group
    pub totals: DurationDistribution,

    /// Per-statement group statistics, in first-occurrence order
    pub groups: Vec<GroupSummary>,

    /// Slowest statements ranked by accumulated time
    pub slowest: Vec<SlowQuery>,
}

/// Serialized statistics for one statement group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Statement text
    pub text: String,

    /// Number of executions
    pub count: usize,

    /// Shortest duration in seconds
    pub min_seconds: f64,

    /// Longest duration in seconds
    pub max_seconds: f64,

    /// Mean duration in seconds
    pub mean_seconds: f64,

    /// Accumulated duration in seconds
    pub sum_seconds: f64,

    /// Number of distinct call sites that issued this statement
    pub distinct_call_sites: usize,
}

/// Build the serializable report structure from grouped samples
pub fn to_report_data(report: &ReportGroups, title: &str, top_n: usize) -> ReportData {
    let totals = calculate_duration_distribution(&report.groups);
    let slowest = rank_slowest(&report.groups, report.all.sum, top_n);

    let groups = report
        .groups
        .iter()
        .map(|group| GroupSummary {
            text: group.text.clone(),
            count: group.count(),
            min_seconds: if group.count() == 0 { 0.0 } else { group.min },
            max_seconds: group.max,
            mean_seconds: group.mean,
            sum_seconds: group.sum,
            distinct_call_sites: group.stacks.len(),
        })
        .collect();

    ReportData {
        version: SCHEMA_VERSION.to_string(),
        title: title.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        totals,
        groups,
        slowest,
    }
}
