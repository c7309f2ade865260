//! Query samples and call-site capture.
//!
//! A [`Sample`] is the immutable record of one executed statement: its text,
//! the call stack that issued it, how long it took, and an optional
//! user-supplied context value. Samples are produced by the profiling
//! session's after-execute hook and consumed by the aggregator.

use crate::utils::config::INTERNAL_FRAME_PREFIXES;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// One resolved frame of a captured call stack
///
/// **Public** - inspectable from filter functions and tests
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Fully qualified function name (demangled)
    pub function: String,

    /// Source file path, or "<unknown>" when debug info is missing
    pub file: String,

    /// Line number within the file (0 when unresolved)
    pub line: u32,
}

impl Frame {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }
}

/// An ordered call stack, outermost frame first and innermost frame last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    /// Build a stack from pre-resolved frames (outermost first)
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Capture the current call stack, excluding the profiler's own frames.
    ///
    /// Frames belonging to this crate, the unwinder, and the runtime are
    /// filtered out so the stack starts at the application call site.
    pub fn capture() -> Self {
        let trace = backtrace::Backtrace::new();
        let mut frames = Vec::new();

        for frame in trace.frames() {
            for symbol in frame.symbols() {
                let function = match symbol.name() {
                    Some(name) => name.to_string(),
                    None => continue,
                };
                if INTERNAL_FRAME_PREFIXES
                    .iter()
                    .any(|prefix| function.starts_with(prefix))
                {
                    continue;
                }
                let file = symbol
                    .filename()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let line = symbol.lineno().unwrap_or(0);
                frames.push(Frame::new(function, file, line));
            }
        }

        // Backtrace yields innermost frames first; we store outermost first
        frames.reverse();
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Render the stack into the fixed multi-line report form.
    ///
    /// One frame per line, innermost last, with the source line attached
    /// when the file is readable:
    ///
    /// ```text
    ///   File "src/handlers.rs", line 42, in myapp::handlers::list_users
    ///     let rows = conn.execute(sql)?;
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut sources: HashMap<&str, Vec<String>> = HashMap::new();

        for frame in &self.frames {
            out.push_str(&format!(
                "  File \"{}\", line {}, in {}\n",
                frame.file, frame.line, frame.function
            ));
            if let Some(text) = source_line(&mut sources, &frame.file, frame.line) {
                out.push_str(&format!("    {}\n", text.trim()));
            }
        }
        out
    }
}

/// Look up one source line, caching file contents for the duration of a
/// single render. Missing files and out-of-range lines resolve to `None`.
fn source_line<'a>(
    cache: &mut HashMap<&'a str, Vec<String>>,
    file: &'a str,
    line: u32,
) -> Option<String> {
    if line == 0 || file == "<unknown>" {
        return None;
    }
    let lines = match cache.entry(file) {
        std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
        std::collections::hash_map::Entry::Vacant(e) => {
            let content = std::fs::read_to_string(file).unwrap_or_default();
            e.insert(content.lines().map(str::to_string).collect())
        }
    };
    lines.get(line as usize - 1).cloned()
}

/// Statistics about one executed statement.
///
/// You should not normally create these yourself; the profiling session
/// emits one per completed statement. Your application may inspect them
/// in a custom collect function or after draining the collector.
#[derive(Debug, Clone)]
pub struct Sample {
    /// The text of the statement, exactly as executed
    pub statement: String,

    /// The call stack at the point the statement completed
    pub stack: CallStack,

    /// Wall-clock duration of the execution
    pub duration: Duration,

    /// Value returned by the configured user-context function, if any
    pub user_context: Option<String>,
}

impl Sample {
    pub fn new(
        statement: impl Into<String>,
        stack: CallStack,
        duration: Duration,
        user_context: Option<String>,
    ) -> Self {
        Self {
            statement: statement.into(),
            stack,
            duration,
            user_context,
        }
    }

    /// Duration in fractional seconds, the unit all aggregates use
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6}s  {}",
            self.duration_seconds(),
            self.statement.lines().next().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_frame_stack() -> CallStack {
        CallStack::from_frames(vec![
            Frame::new("app::main", "src/main.rs", 10),
            Frame::new("app::db::run_query", "src/db.rs", 42),
        ])
    }

    #[test]
    fn test_render_innermost_last() {
        let rendered = two_frame_stack().render();
        let main_pos = rendered.find("app::main").unwrap();
        let query_pos = rendered.find("app::db::run_query").unwrap();
        assert!(main_pos < query_pos);
        assert!(rendered.contains("File \"src/db.rs\", line 42"));
    }

    #[test]
    fn test_render_identical_stacks_equal() {
        assert_eq!(two_frame_stack().render(), two_frame_stack().render());
    }

    #[test]
    fn test_capture_excludes_profiler_frames() {
        let stack = CallStack::capture();
        for frame in stack.frames() {
            assert!(
                !frame.function.starts_with("querytap::sample::CallStack"),
                "profiler frame leaked: {}",
                frame.function
            );
        }
    }

    #[test]
    fn test_duration_seconds() {
        let sample = Sample::new(
            "SELECT 1",
            CallStack::default(),
            Duration::from_millis(250),
            None,
        );
        assert!((sample.duration_seconds() - 0.25).abs() < 1e-9);
    }
}
