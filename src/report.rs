use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Severity of a reported line. The controlling process routes each level to
/// a different pane color, so the set is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Progress,
    Success,
    Error,
    Info,
    Debug,
    Warn,
}

impl Level {
    /// The line prefix the controlling process matches on.
    pub fn prefix(self) -> &'static str {
        match self {
            Level::Progress => "PROGRESS",
            Level::Success => "SUCCESS",
            Level::Error => "ERROR",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Warn => "WARN",
        }
    }
}

/// Structured end-of-run message, emitted as a single JSON line alongside the
/// prefixed ones. The controller treats `msg_type: "complete"` as the
/// completion signal; `timestamp` is informational.
#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub msg_type: String,
    pub content: String,
    pub timestamp: Option<String>,
}

impl Completion {
    /// Completion message for a finished run.
    pub fn complete(fields_filled: usize) -> Self {
        Self {
            msg_type: "complete".into(),
            content: format!("Filled {fields_filled} fields"),
            timestamp: unix_timestamp(),
        }
    }
}

fn unix_timestamp() -> Option<String> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs().to_string())
}

/// Sink for run progress. The orchestrator takes one of these instead of
/// writing to stdout itself, so tests can capture the stream and other hosts
/// can route it elsewhere.
pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: &str);

    /// Emit the structured completion message. Sinks that have no use for it
    /// may ignore it.
    fn completion(&self, _message: &Completion) {}

    fn progress(&self, message: &str) {
        self.report(Level::Progress, message);
    }

    fn success(&self, message: &str) {
        self.report(Level::Success, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.report(Level::Debug, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::Warn, message);
    }
}

/// Reporter that streams `PREFIX: message` lines to stdout, flushing each
/// one so the controlling process sees progress as it happens. Write errors
/// are swallowed; if the controller hung up there is nobody left to tell.
#[derive(Debug, Default)]
pub struct LineReporter;

impl LineReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for LineReporter {
    fn report(&self, level: Level, message: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}: {}", level.prefix(), message);
        let _ = out.flush();
    }

    fn completion(&self, message: &Completion) {
        if let Ok(line) = serde_json::to_string(message) {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
    }
}

/// Reporter that keeps everything in memory. Meant for tests that assert on
/// what a run reported.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<(Level, String)>>,
    completions: Mutex<Vec<Completion>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reported lines in order.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Messages reported at the given level, in order.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    /// Completion messages received, in order.
    pub fn completions(&self) -> Vec<Completion> {
        self.completions.lock().unwrap().clone()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }

    fn completion(&self, message: &Completion) {
        self.completions.lock().unwrap().push(message.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_prefixes_match_protocol() {
        assert_eq!(Level::Progress.prefix(), "PROGRESS");
        assert_eq!(Level::Success.prefix(), "SUCCESS");
        assert_eq!(Level::Error.prefix(), "ERROR");
        assert_eq!(Level::Info.prefix(), "INFO");
        assert_eq!(Level::Debug.prefix(), "DEBUG");
        assert_eq!(Level::Warn.prefix(), "WARN");
    }

    #[test]
    fn test_memory_reporter_keeps_order() {
        let reporter = MemoryReporter::new();
        reporter.progress("one");
        reporter.error("two");
        reporter.warn("three");

        let lines = reporter.lines();
        assert_eq!(
            lines,
            vec![
                (Level::Progress, "one".to_string()),
                (Level::Error, "two".to_string()),
                (Level::Warn, "three".to_string()),
            ]
        );
        assert!(reporter.contains(Level::Error, "two"));
        assert!(!reporter.contains(Level::Error, "three"));
    }

    #[test]
    fn test_completion_wire_shape() {
        let message = Completion::complete(4);
        let json = serde_json::to_string(&message).expect("completion should serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["msg_type"], "complete");
        assert_eq!(value["content"], "Filled 4 fields");
        assert!(value["timestamp"].is_string() || value["timestamp"].is_null());
    }
}
