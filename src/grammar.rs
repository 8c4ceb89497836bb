use crate::{Parse, ParseError, Parser, PResult, Stream, Value};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, trace};

/// Maps rule names to their parsers. Read-only while a parse is running.
#[derive(Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Parser>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Parser> {
        self.symbols.get(name)
    }

    fn insert(&mut self, name: String, parser: Parser) {
        self.symbols.insert(name, parser);
    }
}

/// Runs another grammar rule by name. The lookup happens at parse time, so
/// rules may refer to each other (and to themselves) in any definition
/// order. An undefined name is a bug in the grammar, not in the input, and
/// panics.
pub fn symbol(name: impl Into<String>) -> Parser {
    Arc::new(Symbol { name: name.into() })
}

struct Symbol {
    name: String,
}

impl Parse for Symbol {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        trace!(symbol = %self.name, pos = stream.pos(), "resolving symbol");
        match symbols.get(&self.name) {
            Some(parser) => parser.parse(stream, symbols),
            None => panic!("no symbol named '{}'", self.name),
        }
    }
}

/// A semantic action: takes the wrapped parser's value and produces the
/// value the grammar actually wants, or a domain error.
pub type Action = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// Wraps a parser with an action. On success the inner value is fed through
/// `action`; an `Err` becomes a parse error at the post-match location, with
/// the action error's text as the message.
pub fn with_action(
    parser: Parser,
    action: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
) -> Parser {
    Arc::new(WithAction { inner: parser, action: Arc::new(action) })
}

struct WithAction {
    inner: Parser,
    action: Action,
}

impl Parse for WithAction {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        let ps = self.inner.parse(stream, symbols)?;
        match (self.action)(ps.value().clone()) {
            Ok(value) => Ok(ps.with_value(value)),
            Err(e) => Err(ParseError::new_message(ps.loc(), e.to_string())),
        }
    }
}

/// A complete parsing system: named rules plus the conventional start
/// symbol `START`.
pub struct Grammar {
    symbols: SymbolTable,
    start_symbol: String,
}

impl Grammar {
    pub fn new() -> Self {
        Self { symbols: SymbolTable::new(), start_symbol: "START".to_string() }
    }

    /// Adds or replaces a rule.
    pub fn add_symbol(&mut self, name: impl Into<String>, parser: Parser) {
        self.symbols.insert(name.into(), parser);
    }

    pub fn add_symbols<S>(&mut self, symbols: impl IntoIterator<Item = (S, Parser)>)
    where
        S: Into<String>,
    {
        for (name, parser) in symbols {
            self.add_symbol(name, parser);
        }
    }

    /// Defines a rule and its action in one step, replacing any previous
    /// parser with that name.
    pub fn with_action(
        &mut self,
        name: impl Into<String>,
        parser: Parser,
        action: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        self.symbols.insert(name.into(), with_action(parser, action));
    }

    /// Wraps an existing rule's parser with a further action; actions
    /// compose outside-in, so the rule's own action runs first. Panics if
    /// the rule does not exist.
    pub fn add_action(
        &mut self,
        name: &str,
        action: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        match self.symbols.get(name) {
            Some(parser) => {
                let wrapped = with_action(parser.clone(), action);
                self.symbols.insert(name.to_string(), wrapped);
            }
            None => panic!("no such symbol: '{}'", name),
        }
    }

    /// Parses `input`, starting from the `START` rule. The filename is only
    /// echoed in error locations.
    pub fn parse_string(&self, filename: &str, input: &str) -> Result<Value, ParseError> {
        self.parse_string_with(filename, input, &self.start_symbol)
    }

    /// Parses `input` from an explicit start rule. An undefined start rule
    /// panics. Success requires the whole input to be consumed.
    pub fn parse_string_with(
        &self,
        filename: &str,
        input: &str,
        start: &str,
    ) -> Result<Value, ParseError> {
        debug!(filename, start, len = input.len(), "parsing input");

        let parser = match self.symbols.get(start) {
            Some(parser) => parser,
            None => panic!("start symbol '{}' does not exist", start),
        };

        let stream = Stream::new(filename, input.as_bytes());
        let ps = match parser.parse(stream, &self.symbols) {
            Ok(ps) => ps,
            Err(e) => {
                debug!(error = %e, "parse failed");
                return Err(e);
            }
        };

        if !ps.at_eof() {
            let e = ParseError::new_message(
                ps.loc(),
                "incomplete parse, expected EOF but input remains",
            );
            debug!(error = %e, "parse failed");
            return Err(e);
        }

        Ok(ps.into_value())
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}
