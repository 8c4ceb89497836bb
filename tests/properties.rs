//! Property tests for the library's structural invariants.

use byteparse::{
    combinator::{alt, any_char, literal, many0, many_drop, opt, range, seq, stringify, symbol},
    Grammar, Parser, Stream, SymbolTable, Value,
};
use test_strategy::proptest;

#[proptest]
fn line_col_match_the_offset_formula(
    #[strategy("[ab\\n]{0,64}")] input: String,
    #[strategy(0usize..64)] offset: usize,
) {
    let offset = offset.min(input.len());
    let mut stream = Stream::new("test", input.as_bytes());
    for _ in 0..offset {
        stream = stream.tail();
    }

    let prefix = &input.as_bytes()[..offset];
    let line = 1 + prefix.iter().filter(|&&b| b == b'\n').count() as u32;
    let col = match prefix.iter().rposition(|&b| b == b'\n') {
        Some(newline) => (offset - newline - 1) as u32,
        None => offset as u32,
    };

    let loc = stream.loc();
    assert_eq!((loc.line, loc.col), (line, col));
}

#[proptest]
fn parsing_is_pure(#[strategy("[a-c,\\[\\]]{0,24}")] input: String) {
    let mut g = Grammar::new();
    g.add_symbol(
        "chunk",
        seq(vec![literal("["), stringify(many0(range(b'a', b'z'))), literal("]")]),
    );
    g.add_symbol("START", many_drop(symbol("chunk")));

    let first = g.parse_string("test", &input);
    let second = g.parse_string("test", &input);
    assert_eq!(first, second);
}

#[proptest]
fn opt_never_fails(#[strategy("[a-d]{0,8}")] input: String) {
    let symbols = SymbolTable::new();
    let stream = Stream::new("test", input.as_bytes());

    let result = opt(literal("abc")).parse(stream, &symbols);
    assert!(result.is_ok());
}

#[proptest]
fn successful_parsers_never_move_backwards(
    #[strategy("[a-z]{0,16}")] input: String,
    #[strategy(0usize..16)] start: usize,
) {
    let start = start.min(input.len());
    let symbols = SymbolTable::new();
    let mut stream = Stream::new("test", input.as_bytes());
    for _ in 0..start {
        stream = stream.tail();
    }

    let result = many0(range(b'a', b'z')).parse(stream, &symbols);
    assert!(result.unwrap().pos() >= start);
}

#[proptest]
fn nested_alt_accepts_the_same_inputs_as_flat_alt(#[strategy("[a-f]{0,4}")] input: String) {
    let mut nested = Grammar::new();
    nested.add_symbol(
        "START",
        alt(vec![
            alt(vec![literal("abc"), literal("aaa")]),
            literal("def"),
        ]),
    );

    let mut flat = Grammar::new();
    flat.add_symbol("START", alt(vec![literal("abc"), literal("aaa"), literal("def")]));

    assert_eq!(
        nested.parse_string("test", &input),
        flat.parse_string("test", &input),
    );
}

#[proptest]
fn seq_yields_one_value_per_child(#[strategy(1usize..6)] n: usize) {
    let parsers: Vec<Parser> = (0..n).map(|_| any_char()).collect();
    let mut g = Grammar::new();
    g.add_symbol("START", seq(parsers));

    let input = "x".repeat(n);
    let value = g.parse_string("test", &input).unwrap();
    assert_eq!(value.as_list().unwrap().len(), n);
}

#[proptest]
fn stringify_round_trips_the_consumed_bytes(#[strategy("[ -~]{0,32}")] input: String) {
    let mut g = Grammar::new();
    g.add_symbol("START", stringify(many0(any_char())));

    let value = g.parse_string("test", &input).unwrap();
    assert_eq!(value.as_str(), Some(input.as_str()));
}

#[proptest]
fn the_driver_requires_full_consumption(#[strategy("[a-zC]{0,16}")] input: String) {
    let mut g = Grammar::new();
    g.add_symbol("START", many_drop(range(b'a', b'z')));

    let result = g.parse_string("test", &input);
    assert_eq!(result.is_ok(), input.bytes().all(|b| b.is_ascii_lowercase()));
    if let Ok(value) = result {
        assert_eq!(value, Value::Null);
    }
}
