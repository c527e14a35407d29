//! Rendering of usage reports in the three output modes.
//!
//! - `json` - one pretty-printed JSON document on stdout
//! - `short` - one line per model on stdout
//! - `verbose` - account banner on stderr, full report on stdout
//!
//! All writes go through an [`OutputSink`] so the driver never touches the
//! process streams directly.

mod render;
mod sink;

pub use render::{render_banner, render_error, render_report};
#[cfg(test)]
pub use sink::CaptureSink;
pub use sink::{OutputSink, StdioSink};

/// How the report is presented. Selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Json,
    Short,
    Verbose,
}

impl OutputMode {
    /// Picks the mode from the CLI flags. `--json` wins over `--short`.
    pub fn from_flags(json: bool, short: bool) -> Self {
        if json {
            OutputMode::Json
        } else if short {
            OutputMode::Short
        } else {
            OutputMode::Verbose
        }
    }

    /// Machine-oriented modes must not interleave log lines with their payload.
    pub fn suppresses_logging(&self) -> bool {
        matches!(self, OutputMode::Json | OutputMode::Short)
    }
}

/// Which stream a piece of rendered text is destined for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Primary(String),
    Diagnostic(String),
}

impl Emission {
    pub fn write_to(&self, sink: &mut dyn OutputSink) -> std::io::Result<()> {
        match self {
            Emission::Primary(text) => sink.write_primary(text),
            Emission::Diagnostic(text) => sink.write_diagnostic(text),
        }
    }
}

/// Silences informational logging for the rest of the process when `mode` requires it.
///
/// Must run before anything else is rendered.
pub fn prepare(mode: OutputMode, sink: &mut dyn OutputSink) {
    if mode.suppresses_logging() {
        sink.silence_logging();
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
