//! SVG flamegraph generation for query call sites.
//!
//! Each sample's call stack is collapsed into a semicolon-separated path
//! with the statement as the leaf, weighted by the sample's duration in
//! microseconds. Identical paths merge, so the graph shows where in the
//! application total query time accumulates.

use crate::sample::Sample;
use crate::utils::config::DEFAULT_FLAMEGRAPH_WIDTH;
use crate::utils::error::FlamegraphError;
use log::info;
use std::collections::HashMap;

/// Maximum statement length used in a leaf label
const MAX_LEAF_LABEL: usize = 60;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Query Time by Call Site".to_string(),
            width: DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// A single collapsed stack entry
#[derive(Debug, Clone)]
pub struct CollapsedStack {
    /// Call path as semicolon-separated string, statement label last
    pub stack: String,

    /// Weight (accumulated duration in microseconds)
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }
}

/// Collapse samples into weighted stack paths.
///
/// Identical paths are merged; output is sorted by weight descending.
pub fn collapse_samples(samples: &[Sample]) -> Vec<CollapsedStack> {
    let mut stack_map: HashMap<String, u64> = HashMap::new();

    for sample in samples {
        let mut parts: Vec<String> = sample
            .stack
            .frames()
            .iter()
            .map(|f| f.function.replace(';', ","))
            .collect();
        parts.push(leaf_label(&sample.statement));

        let weight = sample.duration.as_micros() as u64;
        *stack_map.entry(parts.join(";")).or_insert(0) += weight;
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();
    stacks.sort_by(|a, b| b.weight.cmp(&a.weight));
    stacks
}

/// Single-line, length-bounded statement label usable as a stack frame
fn leaf_label(statement: &str) -> String {
    let flat: String = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    let flat = flat.replace(';', ",");
    if flat.chars().count() > MAX_LEAF_LABEL {
        let truncated: String = flat.chars().take(MAX_LEAF_LABEL - 3).collect();
        format!("{}...", truncated)
    } else {
        flat
    }
}

/// Internal node structure for building the tree
struct Node {
    name: String,
    value: u64,
    children: HashMap<String, Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            value: 0,
            children: HashMap::new(),
        }
    }

    fn insert(&mut self, stack: &[&str], value: u64) {
        self.value += value;
        if let Some((head, tail)) = stack.split_first() {
            let child = self
                .children
                .entry(head.to_string())
                .or_insert_with(|| Node::new(head.to_string()));
            child.insert(tail, value);
        }
    }
}

/// Generate an SVG flamegraph from collapsed stacks
///
/// # Errors
/// `FlamegraphError::EmptyStacks` when `stacks` is empty.
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph from {} stacks", stacks.len());

    let mut root = Node::new("root".to_string());
    for stack in stacks {
        let stack_parts: Vec<&str> = stack.stack.split(';').collect();
        root.insert(&stack_parts, stack.weight);
    }

    let max_depth = calculate_max_depth(&root);

    let mut svg = String::new();
    let width = config.width;
    let height_per_level = 20;
    let graph_height = (max_depth + 1) * height_per_level;
    let legend_height = 80;
    let total_height = graph_height + legend_height;

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, total_height, width, total_height
    ));

    svg.push_str(
        r#"<style>.func { font: 12px sans-serif; } .func:hover { stroke: black; stroke-width: 1; cursor: pointer; opacity: 0.9; }</style>"#,
    );

    svg.push_str(&format!(
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&config.title)
    ));

    // Inverted layout: root at the bottom
    render_node(
        &root,
        0,
        0.0,
        width as f64,
        &mut svg,
        height_per_level,
        graph_height,
    );

    render_legend(&mut svg, graph_height);

    svg.push_str("</svg>");

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

fn calculate_max_depth(node: &Node) -> usize {
    if node.children.is_empty() {
        return 0;
    }
    let max_child_depth = node
        .children
        .values()
        .map(calculate_max_depth)
        .max()
        .unwrap_or(0);
    max_child_depth + 1
}

/// Color by leading SQL verb; non-statement frames stay gray
fn get_node_color(name: &str) -> &'static str {
    let upper = name.to_ascii_uppercase();
    if upper.starts_with("SELECT") {
        "rgb(70, 130, 180)" // Steel Blue
    } else if upper.starts_with("INSERT") {
        "rgb(34, 139, 34)" // Forest Green
    } else if upper.starts_with("UPDATE") {
        "rgb(255, 140, 0)" // Dark Orange
    } else if upper.starts_with("DELETE") {
        "rgb(220, 20, 60)" // Crimson
    } else if upper.starts_with("BEGIN") || upper.starts_with("COMMIT") || upper.starts_with("ROLLBACK") {
        "rgb(138, 43, 226)" // Blue Violet
    } else if name == "root" {
        "rgb(100, 149, 237)" // Cornflower Blue
    } else {
        "rgb(169, 169, 169)" // Gray (application frame)
    }
}

fn render_node(
    node: &Node,
    level: usize,
    x: f64,
    w: f64,
    out: &mut String,
    h: usize,
    graph_height: usize,
) {
    if w < 0.5 {
        return;
    } // Don't render invisible blocks

    let color = get_node_color(&node.name);

    // Margin for title (30px)
    let y = graph_height - ((level + 1) * h) + 30;

    let millis = node.value as f64 / 1000.0;
    out.push_str(&format!(
        r#"<rect x="{:.2}" y="{}" width="{:.2}" height="{}" fill="{}" class="func"><title>{} ({:.3} ms)</title></rect>"#,
        x,
        y,
        w,
        h,
        color,
        escape_xml(&node.name),
        millis
    ));

    if w > 35.0 {
        let char_width = 7.0;
        let max_chars = (w / char_width) as usize;
        let display_name = if node.name.chars().count() > max_chars && max_chars > 3 {
            let truncated: String = node.name.chars().take(max_chars - 3).collect();
            format!("{}...", truncated)
        } else {
            node.name.clone()
        };

        if !display_name.is_empty() {
            out.push_str(&format!(
                r#"<text x="{:.2}" y="{}" dx="4" dy="14" font-size="12" fill="white" pointer-events="none">{}</text>"#,
                x,
                y,
                escape_xml(&display_name)
            ));
        }
    }

    // Zero-weight subtrees have no width to distribute
    if node.value == 0 {
        return;
    }

    let mut current_x = x;
    let mut children_vec: Vec<&Node> = node.children.values().collect();
    children_vec.sort_by(|a, b| b.value.cmp(&a.value)); // Sort descending

    for child in children_vec {
        let child_w = (child.value as f64 / node.value as f64) * w;
        render_node(child, level + 1, current_x, child_w, out, h, graph_height);
        current_x += child_w;
    }
}

fn render_legend(out: &mut String, graph_height: usize) {
    let legend_y = graph_height + 50;

    out.push_str(&format!(
        r#"<text x="10" y="{}" font-size="14" font-weight="bold">Legend:</text>"#,
        legend_y
    ));

    let items = [
        ("SELECT", "rgb(70, 130, 180)"),
        ("INSERT", "rgb(34, 139, 34)"),
        ("UPDATE", "rgb(255, 140, 0)"),
        ("DELETE", "rgb(220, 20, 60)"),
        ("Transaction", "rgb(138, 43, 226)"),
        ("App frame", "rgb(169, 169, 169)"),
    ];

    for (i, (label, color)) in items.iter().enumerate() {
        let x = 80 + (i * 120);
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="15" height="15" fill="{}" rx="2"/>"#,
            x,
            legend_y - 12,
            color
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="12">{}</text>"#,
            x + 20,
            legend_y,
            label
        ));
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
