// ABOUTME: Error types for the obtainer engine including ErrorCode enum and ObtainError struct.
// ABOUTME: Provides categorized configuration errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of obtain failures.
///
/// None of these describe "no rule matched": an empty outcome is a normal
/// result, not an error. These are configuration or programmer errors that
/// propagate out of `Engine::obtain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unknown obtainer kind or malformed job configuration.
    Config,
    /// A rule was given missing or mistyped arguments.
    Argument,
    /// A CSS selector failed to compile.
    Selector,
    /// An XPath expression is malformed or outside the supported subset.
    XPath,
    /// Reading job or option files failed.
    Io,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Config => "configuration error",
            ErrorCode::Argument => "bad rule argument",
            ErrorCode::Selector => "invalid selector",
            ErrorCode::XPath => "unsupported xpath",
            ErrorCode::Io => "io error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for obtain operations.
#[derive(Debug, thiserror::Error)]
pub struct ObtainError {
    pub code: ErrorCode,
    /// The rule method, selector or field the error concerns.
    pub subject: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ObtainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obtain: {} {}: {}", self.op, self.subject, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ObtainError {
    fn with_code(
        code: ErrorCode,
        subject: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            subject: subject.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Config error.
    pub fn config(
        subject: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Config, subject, op, source)
    }

    /// Create an Argument error.
    pub fn argument(
        subject: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Argument, subject, op, source)
    }

    /// Create a Selector error.
    pub fn selector(
        subject: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Selector, subject, op, source)
    }

    /// Create an XPath error.
    pub fn xpath(
        subject: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::XPath, subject, op, source)
    }

    /// Create an Io error.
    pub fn io(
        subject: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Io, subject, op, source)
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is an Argument error.
    pub fn is_argument(&self) -> bool {
        self.code == ErrorCode::Argument
    }

    /// Returns true if this is a Selector error.
    pub fn is_selector(&self) -> bool {
        self.code == ErrorCode::Selector
    }

    /// Returns true if this is an XPath error.
    pub fn is_xpath(&self) -> bool {
        self.code == ErrorCode::XPath
    }

    /// Returns true if this is an Io error.
    pub fn is_io(&self) -> bool {
        self.code == ErrorCode::Io
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ObtainError>;
