use std::fmt;

/// A position in the input: 1-based line, 0-based column. The filename is
/// opaque, supplied by the caller and echoed back in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub filename: String,
    pub line: u32,
    pub col: u32,
}

impl Loc {
    pub fn new(filename: impl Into<String>, line: u32, col: u32) -> Self {
        Self { filename: filename.into(), line, col }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {} col {}", self.filename, self.line, self.col)
    }
}
