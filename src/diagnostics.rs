// Tue Jan 15 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl DiagnosticLevel {
    fn as_log_level(self) -> log::Level {
        match self {
            DiagnosticLevel::Debug => log::Level::Debug,
            DiagnosticLevel::Info => log::Level::Info,
            DiagnosticLevel::Warn => log::Level::Warn,
            DiagnosticLevel::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Debug => write!(f, "DEBUG"),
            DiagnosticLevel::Info => write!(f, "INFO"),
            DiagnosticLevel::Warn => write!(f, "WARN"),
            DiagnosticLevel::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Messages collected during one extraction or matching pass. Each entry is
/// also forwarded to the `log` facade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: DiagnosticLevel, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: "layout_crosscheck", level.as_log_level(), "{}", message);
        self.entries.push(Diagnostic { level, message });
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Error, message);
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn at_least(&self, level: DiagnosticLevel) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.level >= level)
    }

    pub fn count(&self, level: DiagnosticLevel) -> usize {
        self.entries.iter().filter(|d| d.level == level).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
