//! Log sinks receiving pre-formatted JSON lines.

use std::io::Write;
use std::sync::Mutex;

/// A sink that receives pre-formatted log lines.
pub trait LogSink: Send + Sync {
    /// Write a line to the sink.
    fn write_line(&self, line: &str);
}

/// Log sink that writes to stderr.
#[derive(Debug, Default)]
pub struct StderrLogSink;

impl LogSink for StderrLogSink {
    fn write_line(&self, line: &str) {
        let mut stderr = std::io::stderr();
        if let Err(error) = stderr.write_all(line.as_bytes()) {
            eprintln!("log sink write failed: {error}");
        }
    }
}

/// Log sink that keeps lines in memory (tests, diagnostics).
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    /// Drain the captured lines.
    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }

    /// Parse captured lines as JSON, skipping anything malformed.
    pub fn take_json(&self) -> Vec<serde_json::Value> {
        self.take()
            .iter()
            .filter_map(|line| serde_json::from_str(line.trim()).ok())
            .collect()
    }
}

impl LogSink for MemoryLogSink {
    fn write_line(&self, line: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_captures_lines() {
        let sink = MemoryLogSink::default();
        sink.write_line("hello\n");
        sink.write_line("{\"event\":\"x\"}\n");

        let lines = sink.take();
        assert_eq!(lines, ["hello\n", "{\"event\":\"x\"}\n"]);
        assert!(sink.take().is_empty());
    }

    #[test]
    fn take_json_skips_plain_text() {
        let sink = MemoryLogSink::default();
        sink.write_line("not json\n");
        sink.write_line("{\"event\":\"feed.fetch.start\"}\n");

        let events = sink.take_json();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], "feed.fetch.start");
    }
}
