use crate::{Loc, Value};

/// The input buffer plus its caller-supplied name. Shared by every stream of
/// a parse, never copied.
#[derive(Debug, Clone, Copy)]
pub struct Input<'s> {
    filename: &'s str,
    source: &'s [u8],
}

impl<'s> Input<'s> {
    pub fn new(filename: &'s str, source: &'s [u8]) -> Self {
        Self { filename, source }
    }

    pub fn filename(&self) -> &'s str {
        self.filename
    }

    pub fn source(&self) -> &'s [u8] {
        self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// An immutable cursor over the input, carrying the value of the most recent
/// successful parser. Advancing yields a new stream; nothing is mutated, so
/// any earlier snapshot stays valid as a backtracking point.
#[derive(Debug, Clone)]
pub struct Stream<'s> {
    input: Input<'s>,
    pos: usize,
    line: u32,
    col: u32,
    value: Value,
}

impl<'s> Stream<'s> {
    pub fn new(filename: &'s str, source: &'s [u8]) -> Self {
        Self { input: Input::new(filename, source), pos: 0, line: 1, col: 0, value: Value::Null }
    }

    pub fn input(&self) -> Input<'s> {
        self.input
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn head(&self) -> Option<u8> {
        self.input.source().get(self.pos).copied()
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The stream one byte further on, with a cleared value slot. At EOF this
    /// yields the stream itself.
    pub fn tail(&self) -> Stream<'s> {
        let head = match self.head() {
            Some(b) => b,
            None => return self.clone(),
        };
        let (line, col) =
            if head == b'\n' { (self.line + 1, 0) } else { (self.line, self.col + 1) };

        Stream { input: self.input, pos: self.pos + 1, line, col, value: Value::Null }
    }

    pub fn with_value(self, value: Value) -> Stream<'s> {
        Stream { value, ..self }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn loc(&self) -> Loc {
        Loc::new(self.input.filename(), self.line, self.col)
    }
}
