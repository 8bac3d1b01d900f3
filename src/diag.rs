use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub text: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), severity: Severity::Info }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), severity: Severity::Error }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Info => "info",
            Severity::Error => "error",
        };
        write!(f, "{tag}: {}", self.text)
    }
}

/// Outcome of parsing user input: a value, a message, both, or neither.
///
/// An error-severity message never comes with a value; the constructors are
/// the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult<T> {
    value: Option<T>,
    message: Option<Diagnostic>,
}

impl<T> ParseResult<T> {
    pub fn ok(value: T) -> Self {
        Self { value: Some(value), message: None }
    }

    pub fn ok_with_info(value: T, text: impl Into<String>) -> Self {
        Self { value: Some(value), message: Some(Diagnostic::info(text)) }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { value: None, message: Some(Diagnostic::error(text)) }
    }

    /// Input that is not recognisable at all; nothing to report.
    pub fn no_match() -> Self {
        Self { value: None, message: None }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn message(&self) -> Option<&Diagnostic> {
        self.message.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.message.as_ref().is_some_and(Diagnostic::is_error)
    }

    pub fn into_parts(self) -> (Option<T>, Option<Diagnostic>) {
        (self.value, self.message)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U> {
        ParseResult { value: self.value.map(f), message: self.message }
    }
}
