//! Flamegraph generation for query call sites.
//!
//! Converts collected samples into an SVG flamegraph showing where in the
//! application total query time accumulates.

pub mod generator;

// Re-export main types
pub use generator::{collapse_samples, generate_flamegraph, CollapsedStack, FlamegraphConfig};
