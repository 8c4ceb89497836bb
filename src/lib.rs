#![deny(rust_2018_idioms)]

mod error;
mod grammar;
mod location;
mod stream;
mod value;

pub mod combinator;

pub use self::{
    error::ParseError,
    grammar::{Action, Grammar, SymbolTable},
    location::Loc,
    stream::{Input, Stream},
    value::Value,
};

use std::sync::Arc;

/// Outcome of one parser step: an advanced stream carrying a value, or the
/// error explaining why no progress was possible.
pub type PResult<'s> = Result<Stream<'s>, ParseError>;

/// The uniform contract every parser implements. On success the returned
/// stream's position is at or past the input stream's; on failure nothing
/// observable has changed, so the caller is free to backtrack.
pub trait Parse: Send + Sync {
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s>;
}

/// Parsers are shared immutable values; grammars and combinators clone the
/// handle freely.
pub type Parser = Arc<dyn Parse>;

impl<F> Parse for F
where
    F: for<'s> Fn(Stream<'s>, &SymbolTable) -> PResult<'s> + Send + Sync,
{
    fn parse<'s>(&self, stream: Stream<'s>, symbols: &SymbolTable) -> PResult<'s> {
        self(stream, symbols)
    }
}
