use std::io::{self, Write};

/// Destination for fully rendered log lines produced by the emitter.
///
/// Implementations receive one complete line per call, trailing newline
/// included, and must write it as a unit so that lines printed from
/// different threads never interleave.
pub trait LineSink: Send + Sync {
    /// Write a single line.
    ///
    /// **Returns**
    /// - `Ok(())` if the whole line was written.
    /// - `Err(..)` on I/O failure. The emitter reports this on stderr and
    ///   does not retry.
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Writes each line to the process's standard output while holding the
/// stdout lock, with a single `write_all` followed by a flush.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.flush()
    }
}
