//! Ranking and distribution statistics over aggregated query groups.
//!
//! The slowest queries by accumulated time are the primary optimization
//! targets; the distribution summary shows how concentrated total query
//! time is.

use super::groups::QueryGroup;
use log::debug;
use serde::{Deserialize, Serialize};

/// One entry in the slowest-query ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowQuery {
    /// Statement text of the group
    pub text: String,

    /// Accumulated duration across all executions, in seconds
    pub total_seconds: f64,

    /// Share of total query time, in percent
    pub percentage: f64,

    /// Number of executions
    pub count: usize,

    /// Mean duration per execution, in seconds
    pub mean_seconds: f64,
}

/// Rank groups by accumulated duration, slowest first.
///
/// # Arguments
/// * `groups` - statement groups from the grouping pass
/// * `total_seconds` - all-group total, used for the percentage column
/// * `top_n` - number of entries to return
pub fn rank_slowest(groups: &[QueryGroup], total_seconds: f64, top_n: usize) -> Vec<SlowQuery> {
    debug!("Ranking top {} of {} groups", top_n, groups.len());

    let mut ranked: Vec<&QueryGroup> = groups.iter().collect();
    ranked.sort_by(|a, b| b.sum.partial_cmp(&a.sum).unwrap_or(std::cmp::Ordering::Equal));

    ranked
        .into_iter()
        .take(top_n)
        .map(|group| SlowQuery {
            text: group.text.clone(),
            total_seconds: group.sum,
            percentage: if total_seconds > 0.0 {
                (group.sum / total_seconds) * 100.0
            } else {
                0.0
            },
            count: group.count(),
            mean_seconds: group.mean,
        })
        .collect()
}

/// Distribution statistics over per-group accumulated durations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationDistribution {
    /// Total query time across every group, in seconds
    pub total_seconds: f64,

    /// Total number of samples
    pub sample_count: usize,

    /// Number of distinct statement texts
    pub statement_count: usize,

    /// Mean accumulated duration per group, in seconds
    pub mean_seconds_per_group: f64,

    /// Median accumulated duration per group, in seconds
    pub median_seconds_per_group: f64,

    /// Share of total time spent in the single slowest group, in percent
    pub slowest_share_percentage: f64,
}

/// Calculate distribution statistics from statement groups
pub fn calculate_duration_distribution(groups: &[QueryGroup]) -> DurationDistribution {
    if groups.is_empty() {
        return DurationDistribution::default();
    }

    let total: f64 = groups.iter().map(|g| g.sum).sum();
    let sample_count: usize = groups.iter().map(|g| g.count()).sum();
    let count = groups.len();

    let mut sums: Vec<f64> = groups.iter().map(|g| g.sum).collect();
    sums.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = sums[sums.len() / 2];
    let slowest = sums.last().copied().unwrap_or(0.0);

    DurationDistribution {
        total_seconds: total,
        sample_count,
        statement_count: count,
        mean_seconds_per_group: total / count as f64,
        median_seconds_per_group: median,
        slowest_share_percentage: if total > 0.0 {
            (slowest / total) * 100.0
        } else {
            0.0
        },
    }
}

impl DurationDistribution {
    /// True when one statement dominates total query time
    pub fn is_highly_concentrated(&self) -> bool {
        self.slowest_share_percentage > 80.0
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.3}s | Statements: {} | Samples: {} | Mean/group: {:.3}s | Median/group: {:.3}s | Slowest: {:.1}%",
            self.total_seconds,
            self.statement_count,
            self.sample_count,
            self.mean_seconds_per_group,
            self.median_seconds_per_group,
            self.slowest_share_percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::groups::group_samples;
    use crate::sample::{CallStack, Sample};
    use std::time::Duration;

    fn sample(text: &str, millis: u64) -> Sample {
        Sample::new(text, CallStack::default(), Duration::from_millis(millis), None)
    }

    fn groups() -> Vec<crate::aggregator::groups::QueryGroup> {
        group_samples(&[
            sample("A", 900),
            sample("B", 50),
            sample("B", 25),
            sample("C", 25),
        ])
        .groups
    }

    #[test]
    fn test_rank_slowest() {
        let groups = groups();
        let ranked = rank_slowest(&groups, 1.0, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].text, "A");
        assert!((ranked[0].percentage - 90.0).abs() < 1e-6);
        assert_eq!(ranked[1].text, "B");
        assert_eq!(ranked[1].count, 2);
    }

    #[test]
    fn test_duration_distribution() {
        let dist = calculate_duration_distribution(&groups());

        assert!((dist.total_seconds - 1.0).abs() < 1e-9);
        assert_eq!(dist.sample_count, 4);
        assert_eq!(dist.statement_count, 3);
        // The slowest group holds 90% of total time
        assert!(dist.is_highly_concentrated());
    }

    #[test]
    fn test_distribution_empty() {
        let dist = calculate_duration_distribution(&[]);
        assert_eq!(dist.sample_count, 0);
        assert_eq!(dist.total_seconds, 0.0);
    }
}
