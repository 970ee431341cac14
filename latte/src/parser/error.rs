use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A closing macro with nothing open to close.
    UnopenedMacro,
    /// A pair macro never closed, or closed out of order.
    UnclosedMacro,
    /// A tag whose close delimiter never appears.
    UnterminatedMacro,
    /// A `{* ...` comment without its `*}`.
    UnterminatedComment,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnopenedMacro => "unopened-macro",
            ErrorKind::UnclosedMacro => "unclosed-macro",
            ErrorKind::UnterminatedMacro => "unterminated-macro",
            ErrorKind::UnterminatedComment => "unterminated-comment",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse errors with source location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn error(
        kind: ErrorKind,
        message: impl Into<String>,
        span: Range<usize>,
        file_id: usize,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            span,
            file_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn unopened_macro(name: &str, span: Range<usize>, file_id: usize) -> Self {
        ParseError::error(
            ErrorKind::UnopenedMacro,
            format!("unopened macro: {}", name),
            span,
            file_id,
        )
        .with_note(format!("no `{{{}}}` is open at this point", name))
    }

    pub fn unclosed_macro(name: &str, span: Range<usize>, file_id: usize) -> Self {
        ParseError::error(
            ErrorKind::UnclosedMacro,
            format!("unclosed macro: {}", name),
            span,
            file_id,
        )
        .with_note(format!("add `{{/{}}}` to close this macro", name))
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_code(self.kind.as_str())
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for ParseError {}
