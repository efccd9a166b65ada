//! Source locations within build files.

use std::fmt;
use std::path::{Path, PathBuf};

/// A 1-based line and column; `(0, 0)` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineAndColumn {
    pub line: i32,
    pub column: i32,
}

impl LineAndColumn {
    pub const UNKNOWN: LineAndColumn = LineAndColumn { line: 0, column: 0 };

    pub fn new(line: i32, column: i32) -> Self {
        Self { line, column }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

/// Where an entity was declared.
///
/// Byte offsets and line/column positions are independent; either may be
/// zeroed when the producer did not record it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: PathBuf,
    pub start_offset: i32,
    pub end_offset: i32,
    pub start: LineAndColumn,
    pub end: LineAndColumn,
}

impl Location {
    /// A location that only knows its file.
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            start_offset: 0,
            end_offset: 0,
            start: LineAndColumn::UNKNOWN,
            end: LineAndColumn::UNKNOWN,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.is_known() {
            write!(
                f,
                "{}:{}:{}",
                self.path.display(),
                self.start.line,
                self.start.column
            )
        } else {
            write!(f, "{}", self.path.display())
        }
    }
}
