// Diagnostic sinks
//
// Traversals report what they skip, discard and tolerate through an injected
// sink instead of a global logger, so a caller (or a test) decides where the
// messages go.

use log::Level;

/// Receiver for traversal diagnostics
pub trait DiagnosticSink {
    /// Record one message at `level`. `target` names the emitting dialect.
    fn emit(&mut self, level: Level, target: &str, message: &str);

    fn debug(&mut self, target: &str, message: &str) {
        self.emit(Level::Debug, target, message);
    }

    fn info(&mut self, target: &str, message: &str) {
        self.emit(Level::Info, target, message);
    }

    fn warn(&mut self, target: &str, message: &str) {
        self.emit(Level::Warn, target, message);
    }
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, level: Level, target: &str, message: &str) {
        log::log!(target: target, level, "{}", message);
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _level: Level, _target: &str, _message: &str) {}
}

/// Keeps every message in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub records: Vec<(Level, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages at exactly `level`
    pub fn at(&self, level: Level) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(move |(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
    }

    /// Number of messages containing `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.records.iter().filter(|(_, m)| m.contains(needle)).count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, level: Level, _target: &str, message: &str) {
        self.records.push((level, message.to_string()));
    }
}
