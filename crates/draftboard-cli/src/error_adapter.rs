//! Error adapter for converting DraftboardError to miette diagnostics.
//!
//! Malformed payloads are rendered with a labeled span pointing at the line
//! and column serde_json reported. Every other error is rendered plainly.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use draftboard::DraftboardError;

/// Adapter for a malformed payload, carrying the payload text.
pub struct PayloadAdapter<'a> {
    err: &'a serde_json::Error,
    src: &'a str,
}

impl<'a> PayloadAdapter<'a> {
    pub fn new(err: &'a serde_json::Error, src: &'a str) -> Self {
        Self { err, src }
    }

    /// Byte span of the reported position, if serde_json reported one.
    ///
    /// Errors raised after the text was tokenized (wrong field types, missing
    /// fields in an envelope) carry no position.
    fn span(&self) -> Option<SourceSpan> {
        let line = self.err.line();
        if line == 0 {
            return None;
        }

        let line_start: usize = self
            .src
            .split_inclusive('\n')
            .take(line - 1)
            .map(str::len)
            .sum();
        let offset = (line_start + self.err.column().saturating_sub(1)).min(self.src.len());
        let len = usize::from(offset < self.src.len());
        Some(SourceSpan::new(offset.into(), len))
    }
}

impl fmt::Debug for PayloadAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for PayloadAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed graph payload")
    }
}

impl std::error::Error for PayloadAdapter<'_> {}

impl MietteDiagnostic for PayloadAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err.classify() {
            serde_json::error::Category::Syntax => "draftboard::payload::syntax",
            serde_json::error::Category::Eof => "draftboard::payload::eof",
            serde_json::error::Category::Data => "draftboard::payload::data",
            serde_json::error::Category::Io => "draftboard::payload::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "expected {nodes, edges} or {logicFlow, databaseSchema}",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span()?;
        let label = LabeledSpan::new_primary_with_span(Some(self.err.to_string()), span);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`DraftboardError`] variants without source positions.
pub struct ErrorAdapter<'a>(pub &'a DraftboardError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            DraftboardError::Io(_) => "draftboard::io",
            DraftboardError::Payload { .. } => "draftboard::payload",
            DraftboardError::Config(_) => "draftboard::config",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    Payload(PayloadAdapter<'a>),
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Payload(p) => fmt::Display::fmt(p, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Payload(p) => std::error::Error::source(p),
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Payload(p) => p.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Payload(p) => p.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Payload(p) => p.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Payload(p) => p.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`DraftboardError`] into something miette can render.
pub fn to_reportable(err: &DraftboardError) -> Reportable<'_> {
    match err {
        DraftboardError::Payload { err, src } => Reportable::Payload(PayloadAdapter::new(err, src)),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}
