//! QueryTap CLI
//!
//! A query profiling tool for SQL database access layers. The `simulate`
//! subcommand runs a synthetic workload through the scripted engine and
//! writes the same report artifacts a real integration would produce.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use querytap::commands::{execute_simulate, validate_args, SimulateArgs};
use querytap::flamegraph::FlamegraphConfig;
use querytap::utils::config::{DEFAULT_REPORT_TITLE, SCHEMA_VERSION};

/// QueryTap - query profiling for SQL access layers
#[derive(Parser, Debug)]
#[command(name = "querytap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Profile a synthetic workload and write report artifacts
    Simulate {
        /// Output path for the HTML report
        #[arg(short, long, default_value = "report.html")]
        output: PathBuf,

        /// Output path for the JSON profile (optional)
        #[arg(short, long)]
        json: Option<PathBuf>,

        /// Output path for the SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Number of statements to execute
        #[arg(short, long, default_value = "40")]
        queries: usize,

        /// Report title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Number of entries in the slowest-query ranking
        #[arg(long, default_value = "10")]
        top_queries: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Display JSON profile schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Simulate {
            output,
            json,
            flamegraph,
            queries,
            title,
            width,
            top_queries,
            summary,
        } => {
            let title = title.unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string());

            let fg_config = flamegraph.is_some().then(|| {
                FlamegraphConfig::new()
                    .with_title(title.clone())
                    .with_width(width)
            });

            let args = SimulateArgs {
                output_html: output,
                output_json: json,
                output_svg: flamegraph,
                queries,
                title,
                flamegraph_config: fg_config,
                top_queries,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_simulate(args)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display JSON profile schema information
fn display_schema(show_details: bool) {
    println!("QueryTap Profile Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  title: string            - Report title");
        println!("  generated_at: string     - RFC 3339 timestamp");
        println!("  totals: object           - Duration distribution summary");
        println!("    total_seconds: number  - Total query time");
        println!("    sample_count: number   - Number of samples");
        println!("    statement_count: number - Distinct statement texts");
        println!("  groups: array            - Per-statement statistics");
        println!("    text: string           - Statement text");
        println!("    count: number          - Executions");
        println!("    min/max/mean/sum_seconds: number");
        println!("    distinct_call_sites: number");
        println!("  slowest: array           - Ranking by accumulated time");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
fn display_version() {
    println!("QueryTap v{}", env!("CARGO_PKG_VERSION"));
    println!("Profile Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("A query profiling tool for SQL database access layers.");
}
