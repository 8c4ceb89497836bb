use crate::Loc;
use ariadne::{CharSet, Config, Label, Report, ReportKind, Source};
use std::{error::Error as StdError, fmt};

/// A failed parse: where it happened, an optional free-form message, and the
/// ordered set of "expected" fragments describing what would have been
/// accepted there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    loc: Loc,
    message: Option<String>,
    expected: Vec<String>,
}

impl ParseError {
    pub fn new_expected(loc: Loc, fragment: impl Into<String>) -> Self {
        Self { loc, message: None, expected: vec![fragment.into()] }
    }

    pub fn new_expected_set(loc: Loc, fragments: Vec<String>) -> Self {
        Self { loc, message: None, expected: fragments }
    }

    pub fn new_message(loc: Loc, text: impl Into<String>) -> Self {
        Self { loc, message: Some(text.into()), expected: Vec::new() }
    }

    pub fn with_expected(mut self, fragments: Vec<String>) -> Self {
        self.expected = fragments;
        self
    }

    pub fn loc(&self) -> &Loc {
        &self.loc
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    pub fn into_expected(self) -> Vec<String> {
        self.expected
    }

    /// Renders a labelled source snippet around the failure. The canonical
    /// one-line form stays in `Display`; this is the human-friendly report.
    pub fn pretty_print(&self, source: &str) -> String {
        let offset = self.offset_in(source);
        let range = if offset < source.len() { offset..offset + 1 } else { offset..offset };

        let mut buffer = Vec::new();
        Report::build(ReportKind::Error, range.clone())
            .with_message("parse error")
            .with_label(Label::new(range).with_message(self.to_string()))
            .with_config(Config::default().with_color(false).with_char_set(CharSet::Ascii))
            .finish()
            .write(Source::from(source), &mut buffer)
            .unwrap();

        String::from_utf8(buffer).unwrap()
    }

    // Byte offset of the failure, recomputed from line/col.
    fn offset_in(&self, source: &str) -> usize {
        let mut line = 1;
        let mut offset = 0;
        for chunk in source.split_inclusive('\n') {
            if line == self.loc.line {
                break;
            }
            line += 1;
            offset += chunk.len();
        }
        (offset + self.loc.col as usize).min(source.len())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.loc)?;
        match self.expected.as_slice() {
            [] => write!(f, "{}", self.message.as_deref().unwrap_or_default()),
            [one] => match &self.message {
                Some(message) => write!(f, "{}, expected {}", message, one),
                None => write!(f, "expected {}", one),
            },
            many => {
                if let Some(message) = &self.message {
                    write!(f, "{}, ", message)?;
                }
                write!(f, "expected one of {}", many.join(", "))
            }
        }
    }
}

impl StdError for ParseError {}
