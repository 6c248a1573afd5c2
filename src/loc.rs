//! Source locations.
//!
//! Every AST node and every diagnostic carries a [`SourceLoc`] spanning from
//! a start line/column to an end line/column within a single source file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A single line/column position, 1-indexed the way editors display them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A file path plus a start/end span, attached to every AST node for
/// diagnostics (spec.md §3 "Every node carries a source location").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLoc {
    pub file: Rc<PathBuf>,
    pub start: Position,
    pub end: Position,
}

impl SourceLoc {
    pub fn new(file: Rc<PathBuf>, start: Position, end: Position) -> Self {
        Self { file, start, end }
    }

    /// A placeholder location for nodes synthesized without source text
    /// (e.g. the reflective schema builder of §4.8).
    pub fn synthetic() -> Self {
        Self {
            file: Rc::new(PathBuf::from("<reflective>")),
            start: Position::default(),
            end: Position::default(),
        }
    }

    /// Merge two locations in the same file into one spanning both, per the
    /// `iopc_loc_merge`/`iopc_loc_merge2` helpers of the original compiler.
    pub fn merge(&self, other: &SourceLoc) -> SourceLoc {
        let start = self.start.min(other.start);
        let end = self.end.max(other.end);
        SourceLoc {
            file: Rc::clone(&self.file),
            start,
            end,
        }
    }

    pub fn file_path(&self) -> &Path {
        self.file.as_path()
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}",
            self.file.display(),
            self.start,
            self.end
        )
    }
}
