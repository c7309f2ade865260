//! Output writers for reports and flamegraphs.
//!
//! This module handles writing data to disk in various formats:
//! - HTML report documents
//! - JSON profiles (versioned schema)
//! - SVG flamegraphs

pub mod html;
pub mod json;

// Re-export main functions
pub use html::{write_html, write_svg};
pub use json::{read_report_data, report_data_to_string, write_report_data};
