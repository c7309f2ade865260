//! Group samples by statement text and keep running statistics.
//!
//! Grouping key is the exact statement text. Within a group we also count
//! how often each distinct rendered call stack issued the statement, which
//! surfaces "same query, different call sites". One extra "all" group
//! aggregates every sample regardless of text.

use crate::sample::Sample;
use log::debug;
use std::collections::HashMap;

/// Aggregated statistics for one statement text
#[derive(Debug, Clone)]
pub struct QueryGroup {
    /// The statement text shared by every member sample
    pub text: String,

    /// Member samples, in arrival order
    pub samples: Vec<Sample>,

    /// Occurrences per distinct rendered call stack
    pub stacks: HashMap<String, usize>,

    /// Longest member duration in seconds
    pub max: f64,

    /// Shortest member duration in seconds; +inf sentinel until the
    /// first sample arrives
    pub min: f64,

    /// Total duration in seconds
    pub sum: f64,

    /// Mean duration in seconds, recomputed after each addition
    pub mean: f64,
}

impl QueryGroup {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            samples: Vec::new(),
            stacks: HashMap::new(),
            max: 0.0,
            min: f64::INFINITY,
            sum: 0.0,
            mean: 0.0,
        }
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    fn add(&mut self, sample: &Sample, rendered_stack: &str) {
        let duration = sample.duration_seconds();
        self.samples.push(sample.clone());
        *self.stacks.entry(rendered_stack.to_string()).or_insert(0) += 1;

        self.max = self.max.max(duration);
        self.min = self.min.min(duration);
        self.sum += duration;
        self.mean = self.sum / self.samples.len() as f64;
    }
}

/// Result of one grouping pass
#[derive(Debug, Clone)]
pub struct ReportGroups {
    /// Per-statement groups, ordered by first occurrence
    pub groups: Vec<QueryGroup>,

    /// Aggregate over every sample
    pub all: QueryGroup,
}

/// Group samples by exact statement text.
///
/// Groups appear in the order their statement text was first seen; each
/// sample lands in exactly one statement group plus the "all" group.
/// Built fresh on every call; input order beyond first occurrence is not
/// meaningful.
pub fn group_samples(samples: &[Sample]) -> ReportGroups {
    let mut groups: Vec<QueryGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut all = QueryGroup::new("(all)");

    for sample in samples {
        let rendered_stack = sample.stack.render();

        let slot = *index
            .entry(sample.statement.clone())
            .or_insert_with(|| {
                groups.push(QueryGroup::new(sample.statement.clone()));
                groups.len() - 1
            });
        groups[slot].add(sample, &rendered_stack);
        all.add(sample, &rendered_stack);
    }

    debug!(
        "Grouped {} samples into {} statement groups",
        samples.len(),
        groups.len()
    );

    ReportGroups { groups, all }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{CallStack, Frame};
    use std::time::Duration;

    fn sample(text: &str, millis: u64, line: u32) -> Sample {
        let stack = CallStack::from_frames(vec![Frame::new("app::run", "src/app.rs", line)]);
        Sample::new(text, stack, Duration::from_millis(millis), None)
    }

    #[test]
    fn test_groups_by_exact_text() {
        let samples = vec![sample("A", 1, 1), sample("A", 1, 1), sample("B", 1, 1)];
        let report = group_samples(&samples);

        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].text, "A");
        assert_eq!(report.groups[0].count(), 2);
        assert_eq!(report.groups[1].count(), 1);
        assert_eq!(report.all.count(), 3);
    }

    #[test]
    fn test_running_statistics() {
        let samples = vec![
            sample("A", 100, 1),
            sample("A", 200, 1),
            sample("A", 300, 1),
        ];
        let report = group_samples(&samples);
        let group = &report.groups[0];

        assert!((group.min - 0.1).abs() < 1e-9);
        assert!((group.max - 0.3).abs() < 1e-9);
        assert!((group.sum - 0.6).abs() < 1e-9);
        assert!((group.mean - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_distinct_call_sites_counted() {
        let samples = vec![sample("A", 1, 10), sample("A", 1, 10), sample("A", 1, 20)];
        let report = group_samples(&samples);
        let group = &report.groups[0];

        assert_eq!(group.stacks.len(), 2);
        assert_eq!(group.stacks.values().sum::<usize>(), 3);
    }

    #[test]
    fn test_empty_input() {
        let report = group_samples(&[]);
        assert!(report.groups.is_empty());
        assert_eq!(report.all.count(), 0);
        assert!(report.all.min.is_infinite());
    }
}
