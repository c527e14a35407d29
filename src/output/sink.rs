use crate::logging::LogControl;
use std::io::{self, Write};

/// Destination for rendered output.
///
/// The primary stream carries the mode's payload. The diagnostic stream carries
/// the verbose banner and non-JSON error text; it is never silenced.
pub trait OutputSink {
    fn write_primary(&mut self, text: &str) -> io::Result<()>;
    fn write_diagnostic(&mut self, text: &str) -> io::Result<()>;
    /// Silences informational logging for the remainder of the process.
    fn silence_logging(&mut self);
}

/// Writes to stdout/stderr and silences the global tracing filter.
pub struct StdioSink {
    log: Option<LogControl>,
}

impl StdioSink {
    pub fn new(log: Option<LogControl>) -> Self {
        Self { log }
    }
}

impl OutputSink for StdioSink {
    fn write_primary(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }

    fn write_diagnostic(&mut self, text: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(text.as_bytes())?;
        stderr.flush()
    }

    fn silence_logging(&mut self) {
        if let Some(log) = &self.log {
            log.silence();
        }
    }
}

/// In-memory sink for asserting on exactly what each stream received.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub primary: String,
    pub diagnostic: String,
    pub silenced: bool,
}

#[cfg(test)]
impl OutputSink for CaptureSink {
    fn write_primary(&mut self, text: &str) -> io::Result<()> {
        self.primary.push_str(text);
        Ok(())
    }

    fn write_diagnostic(&mut self, text: &str) -> io::Result<()> {
        self.diagnostic.push_str(text);
        Ok(())
    }

    fn silence_logging(&mut self) {
        self.silenced = true;
    }
}
