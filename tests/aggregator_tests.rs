use querytap::aggregator::{calculate_duration_distribution, group_samples, rank_slowest};
use querytap::sample::{CallStack, Frame, Sample};
use std::time::Duration;

fn sample(text: &str, millis: u64, line: u32) -> Sample {
    let stack = CallStack::from_frames(vec![
        Frame::new("app::main", "src/main.rs", 3),
        Frame::new("app::db::run", "src/db.rs", line),
    ]);
    Sample::new(text, stack, Duration::from_millis(millis), None)
}

#[test]
fn test_two_groups_plus_all_group() {
    let samples = vec![sample("A", 10, 1), sample("A", 10, 1), sample("B", 10, 1)];
    let report = group_samples(&samples);

    assert_eq!(report.groups.len(), 2);

    let group_a = report.groups.iter().find(|g| g.text == "A").unwrap();
    let group_b = report.groups.iter().find(|g| g.text == "B").unwrap();
    assert_eq!(group_a.count(), 2);
    assert_eq!(group_b.count(), 1);
    assert_eq!(report.all.count(), 3);
}

#[test]
fn test_group_order_is_first_occurrence() {
    let samples = vec![sample("B", 10, 1), sample("A", 10, 1), sample("B", 10, 1)];
    let report = group_samples(&samples);

    assert_eq!(report.groups[0].text, "B");
    assert_eq!(report.groups[1].text, "A");
}

#[test]
fn test_aggregate_correctness() {
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
fn test_same_query_different_call_sites() {
    let samples = vec![
        sample("SELECT 1", 10, 11),
        sample("SELECT 1", 10, 22),
        sample("SELECT 1", 10, 22),
    ];
    let report = group_samples(&samples);
    let group = &report.groups[0];

    assert_eq!(group.stacks.len(), 2);
    let mut counts: Vec<usize> = group.stacks.values().copied().collect();
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 2]);
}

#[test]
fn test_rank_slowest_percentages() {
    let samples = vec![sample("A", 300, 1), sample("B", 100, 1)];
    let report = group_samples(&samples);

    let ranked = rank_slowest(&report.groups, report.all.sum, 10);
    assert_eq!(ranked[0].text, "A");
    assert!((ranked[0].percentage - 75.0).abs() < 1e-6);
    assert!((ranked[1].percentage - 25.0).abs() < 1e-6);
}

#[test]
fn test_distribution_over_groups() {
    let samples = vec![sample("A", 300, 1), sample("B", 100, 1), sample("B", 100, 1)];
    let report = group_samples(&samples);

    let dist = calculate_duration_distribution(&report.groups);
    assert_eq!(dist.sample_count, 3);
    assert_eq!(dist.statement_count, 2);
    assert!((dist.total_seconds - 0.5).abs() < 1e-9);
}
