//! Simulate command implementation.
//!
//! The simulate command:
//! 1. Builds an event hub and a scripted engine
//! 2. Profiles a synthetic workload
//! 3. Aggregates the collected samples
//! 4. Writes the HTML report and optional JSON/SVG artifacts
//!
//! Its purpose is to exercise the full pipeline end to end and to give
//! integrators a concrete report to look at before wiring a real driver.

use crate::aggregator::{calculate_duration_distribution, group_samples, rank_slowest};
use crate::engine::{ConnectionId, EventHub, ScriptedEngine};
use crate::flamegraph::{collapse_samples, generate_flamegraph, FlamegraphConfig};
use crate::output::{write_report_data, write_svg};
use crate::report::{report_with_title, to_report_data};
use crate::session::ProfilingSession;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Statements cycled through by the synthetic workload
const WORKLOAD: &[&str] = &[
    "SELECT id, name FROM users WHERE id = ?",
    "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC",
    "INSERT INTO audit_log (event, payload) VALUES (?, ?)",
    "UPDATE users SET last_seen = ? WHERE id = ?",
];

/// Arguments for the simulate command
#[derive(Debug, Clone)]
pub struct SimulateArgs {
    /// Output path for the HTML report
    pub output_html: PathBuf,

    /// Output path for the JSON profile (optional)
    pub output_json: Option<PathBuf>,

    /// Output path for the SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Number of statements to execute
    pub queries: usize,

    /// Report title
    pub title: String,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Number of entries in the slowest-query ranking
    pub top_queries: usize,

    /// Print text summary to stdout
    pub print_summary: bool,
}

/// Validate simulate arguments before running anything
pub fn validate_args(args: &SimulateArgs) -> Result<()> {
    if args.queries == 0 {
        bail!("--queries must be at least 1");
    }
    if args.output_html.as_os_str().is_empty() {
        bail!("--output path must not be empty");
    }
    Ok(())
}

/// Execute the simulate command
pub fn execute_simulate(args: SimulateArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Simulating {} queries", args.queries);

    // Step 1: Build hub, engine, and a profiling session
    let hub = Arc::new(EventHub::new());
    let engine = ScriptedEngine::new(Arc::clone(&hub));
    let mut session = ProfilingSession::new(hub)
        .with_user_context(Arc::new(|event, _| format!("conn-{}", event.connection_id.0)));

    // Step 2: Profile the synthetic workload
    info!("Step 1/4: Running synthetic workload...");
    session
        .scoped(|| run_workload(&engine, args.queries))
        .context("Failed to profile the synthetic workload")?;

    let samples = session
        .collect()
        .context("Failed to collect samples")?;
    debug!("Collected {} samples", samples.len());

    // Step 3: Aggregate and write the HTML report
    info!("Step 2/4: Writing HTML report...");
    report_with_title(&samples, &args.title, Some(&args.output_html))
        .context("Failed to write HTML report")?;

    let groups = group_samples(&samples);

    // Step 4: Optional artifacts
    if let Some(json_path) = &args.output_json {
        info!("Step 3/4: Writing JSON profile...");
        let data = to_report_data(&groups, &args.title, args.top_queries);
        write_report_data(&data, json_path).context("Failed to write JSON profile")?;
    }

    if let Some(svg_path) = &args.output_svg {
        info!("Step 4/4: Writing flamegraph...");
        let stacks = collapse_samples(&samples);
        let svg = generate_flamegraph(&stacks, args.flamegraph_config.as_ref())
            .context("Failed to generate flamegraph")?;
        write_svg(&svg, svg_path).context("Failed to write flamegraph")?;
    }

    if args.print_summary {
        print_summary(&groups, args.top_queries);
    }

    info!(
        "Simulation finished in {:.2}s; report at {}",
        start_time.elapsed().as_secs_f64(),
        args.output_html.display()
    );

    Ok(())
}

/// Drive the scripted engine through a deterministic statement mix
fn run_workload(engine: &ScriptedEngine, queries: usize) {
    for i in 0..queries {
        let statement = WORKLOAD[i % WORKLOAD.len()];
        let connection = ConnectionId((i % 3) as u64 + 1);
        // Busy period varies per statement so the report has a spread
        let busy = Duration::from_millis((i % 5) as u64 + 1);
        engine.execute(connection, statement, busy);
    }
}

/// Print the distribution summary and slowest-query ranking to stdout
fn print_summary(groups: &crate::aggregator::ReportGroups, top_n: usize) {
    let distribution = calculate_duration_distribution(&groups.groups);
    println!("{}", distribution.summary());
    println!();

    let ranked = rank_slowest(&groups.groups, groups.all.sum, top_n);
    println!(
        "{:<60} {:>8} {:>12} {:>8}",
        "Statement (slowest first)", "Count", "Total (s)", "%"
    );
    for entry in ranked {
        let text = clip(&entry.text, 57);
        println!(
            "{:<60} {:>8} {:>12.6} {:>7.1}%",
            text, entry.count, entry.total_seconds, entry.percentage
        );
    }
}

/// Length-bound a statement for the fixed-width summary table
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let truncated: String = text.chars().take(max).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
