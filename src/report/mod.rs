//! Report generation over collected samples.
//!
//! The main entry point is [`report`]: group the supplied samples, render
//! the HTML document, and optionally write it to a file. The rendered
//! string is always returned for embedding in a host dashboard.

pub mod html;
pub mod schema;

use crate::aggregator::group_samples;
use crate::output::write_html;
use crate::sample::Sample;
use crate::utils::config::DEFAULT_REPORT_TITLE;
use crate::utils::error::OutputError;
use std::path::Path;

pub use html::render_html;
pub use schema::{to_report_data, GroupSummary, ReportData};

/// Generate an HTML report of query statistics.
///
/// # Arguments
/// * `samples` - samples to report on, typically from
///   [`ProfilingSession::collect`](crate::session::ProfilingSession::collect)
/// * `filename` - when present, additionally write the report to this path
///
/// # Returns
/// The generated HTML document.
pub fn report(samples: &[Sample], filename: Option<&Path>) -> Result<String, OutputError> {
    report_with_title(samples, DEFAULT_REPORT_TITLE, filename)
}

/// Like [`report`], with a caller-supplied title
pub fn report_with_title(
    samples: &[Sample],
    title: &str,
    filename: Option<&Path>,
) -> Result<String, OutputError> {
    let groups = group_samples(samples);
    let generated_at = chrono::Utc::now().to_rfc3339();
    let html = render_html(&groups, title, &generated_at);

    if let Some(path) = filename {
        write_html(&html, path)?;
    }
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::CallStack;
    use std::time::Duration;

    #[test]
    fn test_report_returns_html_and_writes_file() {
        let samples = vec![Sample::new(
            "SELECT 1",
            CallStack::default(),
            Duration::from_millis(5),
            None,
        )];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        let html = report(&samples, Some(&path)).unwrap();

        assert!(html.contains("SELECT 1"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), html);
    }
}
