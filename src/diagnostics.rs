//! Caller-provided log buffer (spec.md §6: "the compiler never writes to
//! standard output; it appends to a caller-provided log buffer").

use std::fmt;

use crate::error::IopError;
use crate::loc::SourceLoc;

/// A non-fatal note: warnings the parser emits but that do not abort
/// compilation (the `@nowarn`-suppressible keyword warning of §4.5, the
/// ambiguous-enum-identifier warning of §9).
#[derive(Debug, Clone)]
pub struct Warning {
    pub loc: SourceLoc,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: warning: {}", self.loc, self.message)
    }
}

/// Accumulates errors and warnings across one compilation. Never panics;
/// never writes to stdout/stderr itself.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    errors: Vec<IopError>,
    warnings: Vec<Warning>,
    notes: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_error(&mut self, err: IopError) {
        self.errors.push(err);
    }

    pub fn push_warning(&mut self, loc: SourceLoc, message: impl Into<String>) {
        self.warnings.push(Warning {
            loc,
            message: message.into(),
        });
    }

    /// Informational tracepoints (e.g. "loaded package pkg.sub from
    /// /include/pkg/sub.iop"); kept separate from warnings so callers can
    /// filter verbosity without a logging crate dependency.
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    pub fn errors(&self) -> &[IopError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&IopError> {
        self.errors.first()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.errors {
            writeln!(f, "{e}")?;
        }
        for w in &self.warnings {
            writeln!(f, "{w}")?;
        }
        Ok(())
    }
}
