//! Unified error taxonomy for the compiler core.
//!
//! Follows the teacher's `parser/infrastructure/error.rs` pattern: one
//! hand-written enum with a hand-written `Display`, no derive-macro error
//! crate. `IopError` is the taxonomy of spec.md §7; narrower phase errors
//! (`LexError`, `FoldError`) convert into it via `From`.

use std::fmt;

use crate::loc::SourceLoc;

/// One entry of the §7 error taxonomy, with its location and message.
#[derive(Debug, Clone)]
pub enum IopError {
    Lexical(SourceLoc, String),
    UnexpectedToken(SourceLoc, String),
    InvalidIdentifier(SourceLoc, String),
    InvalidTag(SourceLoc, String),
    InvalidClassId(SourceLoc, String),
    UnresolvedImport(SourceLoc, String),
    UnresolvedType(SourceLoc, String),
    Arithmetic(SourceLoc, String),
    Attribute(SourceLoc, String),
    Inheritance(SourceLoc, String),
    Constraint(SourceLoc, String),
    Doxygen(SourceLoc, String),
}

impl IopError {
    pub fn loc(&self) -> &SourceLoc {
        match self {
            IopError::Lexical(l, _)
            | IopError::UnexpectedToken(l, _)
            | IopError::InvalidIdentifier(l, _)
            | IopError::InvalidTag(l, _)
            | IopError::InvalidClassId(l, _)
            | IopError::UnresolvedImport(l, _)
            | IopError::UnresolvedType(l, _)
            | IopError::Arithmetic(l, _)
            | IopError::Attribute(l, _)
            | IopError::Inheritance(l, _)
            | IopError::Constraint(l, _)
            | IopError::Doxygen(l, _) => l,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            IopError::Lexical(_, m)
            | IopError::UnexpectedToken(_, m)
            | IopError::InvalidIdentifier(_, m)
            | IopError::InvalidTag(_, m)
            | IopError::InvalidClassId(_, m)
            | IopError::UnresolvedImport(_, m)
            | IopError::UnresolvedType(_, m)
            | IopError::Arithmetic(_, m)
            | IopError::Attribute(_, m)
            | IopError::Inheritance(_, m)
            | IopError::Constraint(_, m)
            | IopError::Doxygen(_, m) => m,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            IopError::Lexical(..) => "LexicalError",
            IopError::UnexpectedToken(..) => "UnexpectedToken",
            IopError::InvalidIdentifier(..) => "InvalidIdentifier",
            IopError::InvalidTag(..) => "InvalidTag",
            IopError::InvalidClassId(..) => "InvalidClassId",
            IopError::UnresolvedImport(..) => "UnresolvedImport",
            IopError::UnresolvedType(..) => "UnresolvedType",
            IopError::Arithmetic(..) => "ArithmeticError",
            IopError::Attribute(..) => "AttributeError",
            IopError::Inheritance(..) => "InheritanceError",
            IopError::Constraint(..) => "ConstraintError",
            IopError::Doxygen(..) => "DoxygenError",
        }
    }
}

impl fmt::Display for IopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.loc(), self.kind_name(), self.message())
    }
}

impl std::error::Error for IopError {}

/// Lexer-phase errors (unterminated strings/comments, invalid literals).
#[derive(Debug, Clone)]
pub enum LexError {
    UnterminatedString(SourceLoc),
    UnterminatedComment(SourceLoc),
    UnterminatedCharLiteral(SourceLoc),
    InvalidNumber(SourceLoc, String),
    InvalidEscape(SourceLoc, String),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedString(l) => write!(f, "{l}: unterminated string literal"),
            LexError::UnterminatedComment(l) => write!(f, "{l}: unterminated comment"),
            LexError::UnterminatedCharLiteral(l) => write!(f, "{l}: unterminated char literal"),
            LexError::InvalidNumber(l, s) => write!(f, "{l}: invalid numeric literal `{s}`"),
            LexError::InvalidEscape(l, s) => write!(f, "{l}: invalid escape sequence `{s}`"),
        }
    }
}

impl std::error::Error for LexError {}

impl From<LexError> for IopError {
    fn from(e: LexError) -> Self {
        let loc = match &e {
            LexError::UnterminatedString(l)
            | LexError::UnterminatedComment(l)
            | LexError::UnterminatedCharLiteral(l)
            | LexError::InvalidNumber(l, _)
            | LexError::InvalidEscape(l, _) => l.clone(),
        };
        IopError::Lexical(loc, e.to_string())
    }
}

/// Constant-folder errors (spec.md §4.2).
#[derive(Debug, Clone)]
pub enum FoldError {
    Overflow(String),
    DivisionByZero,
    ModuloByZero,
    IllFormed(String),
}

impl fmt::Display for FoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldError::Overflow(op) => write!(f, "arithmetic overflow in `{op}`"),
            FoldError::DivisionByZero => write!(f, "division by zero"),
            FoldError::ModuloByZero => write!(f, "modulo by zero"),
            FoldError::IllFormed(s) => write!(f, "ill-formed expression: {s}"),
        }
    }
}

impl std::error::Error for FoldError {}
