use crate::sink::LineSink;
use std::io;
use std::sync::Mutex;

/// A sink that keeps every line in memory.
///
/// Useful for unit tests that assert on emitted records, and for hosts that
/// want to forward lines somewhere other than stdout themselves.
#[derive(Debug, Default)]
pub struct CaptureSink {
    lines: Mutex<Vec<String>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines without their trailing newline.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|line| line.strip_suffix('\n').unwrap_or(line).to_string())
            .collect()
    }

    /// Everything written so far, exactly as the sink received it.
    pub fn contents(&self) -> String {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).concat()
    }

    /// Remove and return the captured lines, without trailing newlines.
    pub fn take(&self) -> Vec<String> {
        let lines = std::mem::take(&mut *self.lines.lock().unwrap_or_else(|e| e.into_inner()));
        lines
            .into_iter()
            .map(|mut line| {
                if line.ends_with('\n') {
                    line.pop();
                }
                line
            })
            .collect()
    }
}

impl LineSink for CaptureSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
        Ok(())
    }
}
