// ABOUTME: Structured diagnostics emitted by obtain attempts: template, substitutions, severity, source tag.
// ABOUTME: Provides the DiagnosticSink trait plus tracing-backed and in-memory sinks.

use std::collections::BTreeMap;
use std::fmt;

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// One structured log entry.
///
/// `template` holds `@name` placeholders which `message()` fills from
/// `substitutions`. Longer names are substituted first so `@field` never
/// clobbers `@field_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub template: String,
    pub substitutions: BTreeMap<String, String>,
    pub severity: Severity,
    pub source_tag: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, source_tag: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            substitutions: BTreeMap::new(),
            severity,
            source_tag: source_tag.into(),
        }
    }

    /// Adds a substitution; `key` is given without the leading `@`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.substitutions.insert(key.into(), value.into());
        self
    }

    /// Renders the template with all substitutions applied.
    pub fn message(&self) -> String {
        let mut keys: Vec<&String> = self.substitutions.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let mut out = self.template.clone();
        for key in keys {
            out = out.replace(&format!("@{}", key), &self.substitutions[key]);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.source_tag, self.message())
    }
}

/// Receiver for diagnostics. The engine never aborts on a diagnostic.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, d: Diagnostic) {
        let message = d.message();
        let source = d.source_tag.as_str();
        match d.severity {
            Severity::Debug => tracing::debug!(source, "{}", message),
            Severity::Info => tracing::info!(source, "{}", message),
            Severity::Warning => tracing::warn!(source, "{}", message),
            Severity::Error => tracing::error!(source, "{}", message),
        }
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Vec<Diagnostic>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Entries at exactly `severity`.
    pub fn at(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

/// Binds a sink to the source tag and field of one obtain call.
pub struct Reporter<'a> {
    sink: &'a mut dyn DiagnosticSink,
    source_tag: &'a str,
    field: &'a str,
}

impl<'a> Reporter<'a> {
    pub fn new(sink: &'a mut dyn DiagnosticSink, source_tag: &'a str, field: &'a str) -> Self {
        Self {
            sink,
            source_tag,
            field,
        }
    }

    pub fn field(&self) -> &str {
        self.field
    }

    /// Emits `template` at `severity`; `@field` is always available.
    pub fn report(&mut self, severity: Severity, template: &str, subs: &[(&str, &str)]) {
        let mut d = Diagnostic::new(severity, self.source_tag, template).with("field", self.field);
        for (k, v) in subs {
            d = d.with(*k, *v);
        }
        self.sink.emit(d);
    }

    pub fn debug(&mut self, template: &str, subs: &[(&str, &str)]) {
        self.report(Severity::Debug, template, subs);
    }

    pub fn error(&mut self, template: &str, subs: &[(&str, &str)]) {
        self.report(Severity::Error, template, subs);
    }
}
