//! Static HTML report renderer.
//!
//! Renders the aggregated groups into a single self-contained HTML
//! document: an overall totals banner, one table row per statement group,
//! and a per-group breakdown of call sites and contexts.

use crate::aggregator::{QueryGroup, ReportGroups};
use std::collections::HashMap;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2em; color: #222; }
h1 { font-size: 1.4em; }
table { border-collapse: collapse; width: 100%; margin: 1em 0; }
th, td { border: 1px solid #ccc; padding: 6px 10px; text-align: left; }
th { background: #f0f0f0; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
code.sql { white-space: pre-wrap; }
details { margin: 0.8em 0; }
pre.stack { background: #f8f8f8; border: 1px solid #ddd; padding: 8px; overflow-x: auto; }
.totals { background: #eef4fb; border: 1px solid #bcd; padding: 10px 14px; }
"#;

/// Render the full HTML report document
pub fn render_html(report: &ReportGroups, title: &str, generated_at: &str) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(title)));
    out.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));
    out.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    out.push_str(&format!(
        "<p>Generated at {}.</p>\n",
        escape(generated_at)
    ));

    render_totals(&mut out, &report.all, report.groups.len());
    render_group_table(&mut out, &report.groups);
    render_group_details(&mut out, &report.groups);

    out.push_str("</body>\n</html>\n");
    out
}

fn render_totals(out: &mut String, all: &QueryGroup, group_count: usize) {
    out.push_str("<div class=\"totals\">\n");
    if all.count() == 0 {
        out.push_str("<strong>No queries collected.</strong>\n");
    } else {
        out.push_str(&format!(
            "<strong>{}</strong> queries, <strong>{}</strong> distinct statements, \
             total <strong>{:.6}s</strong>, mean <strong>{:.6}s</strong>, \
             min <strong>{:.6}s</strong>, max <strong>{:.6}s</strong>\n",
            all.count(),
            group_count,
            all.sum,
            all.mean,
            all.min,
            all.max
        ));
    }
    out.push_str("</div>\n");
}

fn render_group_table(out: &mut String, groups: &[QueryGroup]) {
    if groups.is_empty() {
        return;
    }
    out.push_str("<table>\n<tr><th>Statement</th><th>Count</th><th>Sum (s)</th>");
    out.push_str("<th>Mean (s)</th><th>Min (s)</th><th>Max (s)</th><th>Call sites</th></tr>\n");

    for group in groups {
        out.push_str(&format!(
            "<tr><td><code class=\"sql\">{}</code></td>\
             <td class=\"num\">{}</td><td class=\"num\">{:.6}</td>\
             <td class=\"num\">{:.6}</td><td class=\"num\">{:.6}</td>\
             <td class=\"num\">{:.6}</td><td class=\"num\">{}</td></tr>\n",
            escape(&group.text),
            group.count(),
            group.sum,
            group.mean,
            group.min,
            group.max,
            group.stacks.len()
        ));
    }
    out.push_str("</table>\n");
}

fn render_group_details(out: &mut String, groups: &[QueryGroup]) {
    for group in groups {
        out.push_str("<details>\n");
        out.push_str(&format!(
            "<summary><code class=\"sql\">{}</code> &mdash; {} call site(s)</summary>\n",
            escape(&group.text),
            group.stacks.len()
        ));

        // Stable ordering for rendering: most frequent call site first
        let mut stacks: Vec<(&String, &usize)> = group.stacks.iter().collect();
        stacks.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (stack, count) in stacks {
            out.push_str(&format!("<p>{} execution(s) from:</p>\n", count));
            out.push_str(&format!("<pre class=\"stack\">{}</pre>\n", escape(stack)));
        }

        let contexts = distinct_contexts(group);
        if !contexts.is_empty() {
            out.push_str("<p>Contexts: ");
            let parts: Vec<String> = contexts
                .iter()
                .map(|(ctx, n)| format!("<code>{}</code> ({})", escape(ctx), n))
                .collect();
            out.push_str(&parts.join(", "));
            out.push_str("</p>\n");
        }
        out.push_str("</details>\n");
    }
}

fn distinct_contexts(group: &QueryGroup) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for sample in &group.samples {
        if let Some(ctx) = sample.user_context.as_deref() {
            *counts.entry(ctx).or_insert(0) += 1;
        }
    }
    let mut contexts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(ctx, n)| (ctx.to_string(), n))
        .collect();
    contexts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    contexts
}

/// Minimal HTML escaping for text nodes and attribute values
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::group_samples;
    use crate::sample::{CallStack, Sample};
    use std::time::Duration;

    fn sample(text: &str) -> Sample {
        Sample::new(text, CallStack::default(), Duration::from_millis(10), None)
    }

    #[test]
    fn test_escapes_statement_text() {
        let report = group_samples(&[sample("SELECT * FROM t WHERE a < 1 AND b > 2")]);
        let html = render_html(&report, "Report", "2026-01-01T00:00:00Z");

        assert!(html.contains("a &lt; 1 AND b &gt; 2"));
        assert!(!html.contains("a < 1"));
    }

    #[test]
    fn test_empty_report_renders() {
        let report = group_samples(&[]);
        let html = render_html(&report, "Report", "2026-01-01T00:00:00Z");
        assert!(html.contains("No queries collected"));
    }

    #[test]
    fn test_group_rows_present() {
        let report = group_samples(&[sample("SELECT 1"), sample("SELECT 2")]);
        let html = render_html(&report, "Report", "2026-01-01T00:00:00Z");
        assert!(html.contains("SELECT 1"));
        assert!(html.contains("SELECT 2"));
        assert!(html.contains("<strong>2</strong> queries"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a&b"), "a&amp;b");
        assert_eq!(escape("\"x\""), "&quot;x&quot;");
    }
}
