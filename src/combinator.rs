use crate::{grammar::SymbolTable, Parse, ParseError, Parser, PResult, Stream, Value};
use anyhow::bail;
use std::sync::Arc;

pub use crate::grammar::{symbol, with_action};

/// Matches the bytes of `target` exactly. The value is `target` itself.
pub fn literal(target: impl Into<String>) -> Parser {
    Arc::new(Literal { target: target.into() })
}

struct Literal {
    target: String,
}

impl Parse for Literal {
    fn parse<'s>(&self, stream: Stream<'s>, _symbols: &SymbolTable) -> PResult<'s> {
        let entry = stream.loc();
        let mut ps = stream;
        for &want in self.target.as_bytes() {
            match ps.head() {
                Some(head) if head == want => ps = ps.tail(),
                _ => {
                    return Err(ParseError::new_expected(
                        entry,
                        format!("literal '{}'", self.target),
                    ))
                }
            }
        }
        Ok(ps.with_value(Value::Str(self.target.clone())))
    }
}

/// Like `literal` but ASCII-case-insensitive. The value is the canonical
/// `target` passed in here, not the spelling found in the input.
pub fn literal_ic(target: impl Into<String>) -> Parser {
    let target = target.into();
    let upcased = target.to_ascii_uppercase();
    Arc::new(LiteralIc { target, upcased })
}

struct LiteralIc {
    target: String,
    upcased: String,
}

impl Parse for LiteralIc {
    fn parse<'s>(&self, stream: Stream<'s>, _symbols: &SymbolTable) -> PResult<'s> {
        let entry = stream.loc();
        let mut ps = stream;
        for &want in self.upcased.as_bytes() {
            match ps.head() {
                Some(head) if head.to_ascii_uppercase() == want => ps = ps.tail(),
                _ => {
                    return Err(ParseError::new_expected(
                        entry,
                        format!("literal '{}'", self.target),
                    ))
                }
            }
        }
        Ok(ps.with_value(Value::Str(self.target.clone())))
    }
}

/// Consumes any single byte, returning it as the value.
pub fn any_char() -> Parser {
    Arc::new(AnyChar)
}

struct AnyChar;

impl Parse for AnyChar {
    fn parse<'s>(&self, stream: Stream<'s>, _symbols: &SymbolTable) -> PResult<'s> {
        match stream.head() {
            Some(head) => Ok(stream.tail().with_value(Value::Byte(head))),
            None => Err(ParseError::new_message(stream.loc(), "unexpected EOF")),
        }
    }
}

/// Consumes one byte from a string of possibilities.
pub fn one_of(options: impl Into<String>) -> Parser {
    Arc::new(OneOf { options: options.into() })
}

struct OneOf {
    options: String,
}

impl Parse for OneOf {
    fn parse<'s>(&self, stream: Stream<'s>, _symbols: &SymbolTable) -> PResult<'s> {
        match stream.head() {
            Some(head) if self.options.as_bytes().contains(&head) => {
                Ok(stream.tail().with_value(Value::Byte(head)))
            }
            Some(_) => Err(ParseError::new_message(
                stream.loc(),
                format!("expected one of: {}", self.options),
            )),
            None => Err(ParseError::new_message(
                stream.loc(),
                format!("unexpected EOF, expected one of '{}'", self.options),
            )),
        }
    }
}

/// Consumes one byte NOT in the blacklist.
pub fn none_of(blacklist: impl Into<String>) -> Parser {
    Arc::new(NoneOf { blacklist: blacklist.into() })
}

struct NoneOf {
    blacklist: String,
}

impl Parse for NoneOf {
    fn parse<'s>(&self, stream: Stream<'s>, _symbols: &SymbolTable) -> PResult<'s> {
        match stream.head() {
            Some(head) if self.blacklist.as_bytes().contains(&head) => Err(
                ParseError::new_message(stream.loc(), format!("unexpected {}", head as char)),
            ),
            Some(head) => Ok(stream.tail().with_value(Value::Byte(head))),
            None => Err(ParseError::new_message(stream.loc(), "unexpected EOF")),
        }
    }
}

/// Consumes one byte in `lo..=hi`. `range(b'a', b'z')` matches any lowercase
/// ASCII letter.
pub fn range(lo: u8, hi: u8) -> Parser {
    Arc::new(ByteRange { lo, hi })
}

struct ByteRange {
    lo: u8,
    hi: u8,
}

impl Parse for ByteRange {
    fn parse<'s>(&self, stream: Stream<'s>, _symbols: &SymbolTable) -> PResult<'s> {
        match stream.head() {
            Some(head) if self.lo <= head && head <= self.hi => {
                Ok(stream.tail().with_value(Value::Byte(head)))
            }
            _ => Err(ParseError::new_expected(
                stream.loc(),
                format!("range({}..{})", self.lo as char, self.hi as char),
            )),
        }
    }
}

/// Succeeds only at end of input, with value `Null`. The driver checks EOF
/// itself; this is for asserting it mid-grammar.
pub fn eoi() -> Parser {
    Arc::new(Eoi)
}

struct Eoi;

impl Parse for Eoi {
    fn parse<'s>(&self, stream: Stream<'s>, _symbols: &SymbolTable) -> PResult<'s> {
        if stream.at_eof() {
            Ok(stream.with_value(Value::Null))
        } else {
            Err(ParseError::new_expected(stream.loc(), "EOF"))
        }
    }
}

/// Tries each child in turn at the same position; the first success wins.
/// When all fail, the error's expected set is the ordered union of the
/// children's expected fragments.
pub fn alt(parsers: impl IntoIterator<Item = Parser>) -> Parser {
    Arc::new(Alt { parsers: parsers.into_iter().collect() })
}

struct Alt {
    parsers: Vec<Parser>,
}

impl Parse for Alt {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        let mut expected = Vec::new();
        for parser in &self.parsers {
            match parser.parse(stream.clone(), symbols) {
                Ok(ps) => return Ok(ps),
                Err(e) => expected.extend(e.into_expected()),
            }
        }
        Err(ParseError::new_expected_set(stream.loc(), expected))
    }
}

/// Runs children in order, threading the stream. The value is the list of
/// their values; any child failure aborts with that child's error.
pub fn seq(parsers: impl IntoIterator<Item = Parser>) -> Parser {
    Arc::new(Seq { parsers: parsers.into_iter().collect() })
}

struct Seq {
    parsers: Vec<Parser>,
}

impl Parse for Seq {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        let mut out = Vec::with_capacity(self.parsers.len());
        let mut ps = stream;
        for parser in &self.parsers {
            ps = parser.parse(ps, symbols)?;
            out.push(ps.value().clone());
        }
        Ok(ps.with_value(Value::List(out)))
    }
}

/// Like `seq`, but the value is the 0-based `index`-th child's value alone.
pub fn seq_at(index: usize, parsers: impl IntoIterator<Item = Parser>) -> Parser {
    let parsers: Vec<Parser> = parsers.into_iter().collect();
    debug_assert!(
        index < parsers.len(),
        "seq_at index {} out of bounds for {} parsers",
        index,
        parsers.len()
    );
    Arc::new(SeqAt { parsers, index })
}

struct SeqAt {
    parsers: Vec<Parser>,
    index: usize,
}

impl Parse for SeqAt {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        let mut picked = Value::Null;
        let mut ps = stream;
        for (i, parser) in self.parsers.iter().enumerate() {
            ps = parser.parse(ps, symbols)?;
            if i == self.index {
                picked = ps.value().clone();
            }
        }
        Ok(ps.with_value(picked))
    }
}

/// Collapses an inner parser's list-of-bytes value into a single string.
pub fn stringify(parser: Parser) -> Parser {
    with_action(parser, |value| {
        let items = match value {
            Value::List(items) => items,
            _ => bail!("stringify requires a list of bytes"),
        };
        let mut bytes = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Byte(b) => bytes.push(b),
                _ => bail!("stringify requires a list of bytes"),
            }
        }
        Ok(Value::Str(String::from_utf8_lossy(&bytes).into_owned()))
    })
}

/// Tries the inner parser; on failure succeeds at the original position with
/// value `Null`. Never fails.
pub fn opt(parser: Parser) -> Parser {
    Arc::new(Opt { inner: parser })
}

struct Opt {
    inner: Parser,
}

impl Parse for Opt {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        match self.inner.parse(stream.clone(), symbols) {
            Ok(ps) => Ok(ps),
            Err(_) => Ok(stream.with_value(Value::Null)),
        }
    }
}

/// Zero or more greedy repetitions; value is the list of inner values.
pub fn many0(parser: Parser) -> Parser {
    many_n(parser, 0)
}

/// One or more greedy repetitions.
pub fn many1(parser: Parser) -> Parser {
    many_n(parser, 1)
}

/// Greedy repetition with a caller-chosen minimum count.
pub fn many_n(parser: Parser, min: usize) -> Parser {
    Arc::new(Many { inner: parser, min, capture: true })
}

/// Like `many0` but discards the results instead of building a list.
pub fn many_drop(parser: Parser) -> Parser {
    Arc::new(Many { inner: parser, min: 0, capture: false })
}

struct Many {
    inner: Parser,
    min: usize,
    capture: bool,
}

impl Parse for Many {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        let mut results = Vec::new();
        let mut found = 0;
        let mut ps = stream;
        let last_err;
        loop {
            match self.inner.parse(ps.clone(), symbols) {
                Ok(next) => {
                    found += 1;
                    if self.capture {
                        results.push(next.value().clone());
                    }
                    ps = next;
                }
                Err(e) => {
                    last_err = e;
                    break;
                }
            }
        }

        if found < self.min {
            return Err(ParseError::new_message(ps.loc(), format!("minimum {}", self.min))
                .with_expected(last_err.into_expected()));
        }

        if self.capture {
            Ok(ps.with_value(Value::List(results)))
        } else {
            Ok(ps.with_value(Value::Null))
        }
    }
}

/// Zero or more of `parser` separated by `sep`. A trailing separator is
/// never consumed: when `sep` matches but the next element does not, the
/// stream rewinds to just after the last element.
pub fn sep0(parser: Parser, sep: Parser) -> Parser {
    Arc::new(SepBy { inner: parser, sep, min: 0 })
}

/// One or more of `parser` separated by `sep`.
pub fn sep1(parser: Parser, sep: Parser) -> Parser {
    Arc::new(SepBy { inner: parser, sep, min: 1 })
}

struct SepBy {
    inner: Parser,
    sep: Parser,
    min: usize,
}

impl Parse for SepBy {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        let mut results = Vec::new();
        // `last` is the rewind point: the stream just after the most recent
        // element, before any separator.
        let mut last = stream.clone();
        let mut ps = stream;
        let last_err;
        loop {
            match self.inner.parse(ps.clone(), symbols) {
                Ok(next) => {
                    results.push(next.value().clone());
                    last = next.clone();
                    ps = next;
                }
                Err(e) => {
                    last_err = e;
                    break;
                }
            }
            match self.sep.parse(ps.clone(), symbols) {
                Ok(next) => ps = next,
                Err(e) => {
                    last_err = e;
                    break;
                }
            }
        }

        if results.len() < self.min {
            return Err(ParseError::new_message(
                last.loc(),
                format!("expected at least {}: {}", self.min, last_err),
            ));
        }

        Ok(last.with_value(Value::List(results)))
    }
}

/// Zero or more of `parser`, each terminated by `sep`. An element whose
/// terminator is missing does not count and is rewound.
pub fn end0(parser: Parser, sep: Parser) -> Parser {
    Arc::new(EndBy { inner: parser, sep, min: 0 })
}

/// One or more of `parser`, each terminated by `sep`.
pub fn end1(parser: Parser, sep: Parser) -> Parser {
    Arc::new(EndBy { inner: parser, sep, min: 1 })
}

struct EndBy {
    inner: Parser,
    sep: Parser,
    min: usize,
}

impl Parse for EndBy {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        let mut results = Vec::new();
        let mut ps = stream;
        let last_err;
        loop {
            let element = match self.inner.parse(ps.clone(), symbols) {
                Ok(next) => next,
                Err(e) => {
                    last_err = e;
                    break;
                }
            };
            match self.sep.parse(element.clone(), symbols) {
                Ok(next) => {
                    results.push(element.into_value());
                    ps = next;
                }
                Err(e) => {
                    last_err = e;
                    break;
                }
            }
        }

        if results.len() < self.min {
            return Err(ParseError::new_message(
                ps.loc(),
                format!("expected at least {}: {}", self.min, last_err),
            ));
        }

        Ok(ps.with_value(Value::List(results)))
    }
}

/// Non-greedy repetition: each iteration first tries `terminator` and
/// finishes (consuming it) as soon as it matches; only then is `body` run.
/// If both fail at the same point, the whole parser fails there.
pub fn many_till(body: Parser, terminator: Parser) -> Parser {
    Arc::new(ManyTill { body, terminator })
}

struct ManyTill {
    body: Parser,
    terminator: Parser,
}

impl Parse for ManyTill {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        let mut results = Vec::new();
        let mut ps = stream;
        loop {
            let term_err = match self.terminator.parse(ps.clone(), symbols) {
                Ok(done) => return Ok(done.with_value(Value::List(results))),
                Err(e) => e,
            };
            match self.body.parse(ps.clone(), symbols) {
                Ok(next) => {
                    results.push(next.value().clone());
                    ps = next;
                }
                Err(body_err) => {
                    let mut expected = term_err.into_expected();
                    expected.extend(body_err.into_expected());
                    return Err(ParseError::new_message(
                        ps.loc(),
                        "both terminator and body failed",
                    )
                    .with_expected(expected));
                }
            }
        }
    }
}
