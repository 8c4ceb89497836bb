//! The example JSON grammar: exercises the whole library end to end.

use anyhow::anyhow;
use byteparse::{
    combinator::{
        alt, any_char, literal, many1, many_drop, many_till, one_of, opt, range, sep0, seq,
        seq_at, stringify, symbol,
    },
    Grammar, Value,
};
use std::collections::HashMap;

#[derive(Debug)]
struct KeyValue {
    key: String,
    value: Value,
}

fn json_grammar() -> Grammar {
    let mut g = Grammar::new();

    g.add_symbol("START", seq_at(1, [symbol("ws"), symbol("value"), symbol("ws")]));
    g.add_symbol(
        "value",
        alt([
            symbol("array"),
            symbol("object"),
            symbol("null"),
            symbol("bool"),
            symbol("string"),
            symbol("number"),
        ]),
    );

    g.add_symbol("ws", many_drop(one_of(" \t\r\n")));

    g.with_action("null", literal("null"), |_| Ok(Value::Null));

    g.with_action("bool", alt([literal("false"), literal("true")]), |value| {
        Ok(Value::Bool(value.as_str() == Some("true")))
    });

    g.add_symbol(
        "string",
        seq_at(1, [literal("\""), stringify(many_till(any_char(), literal("\"")))]),
    );

    g.with_action(
        "number",
        seq([opt(one_of("+-")), stringify(many1(range(b'0', b'9')))]),
        |value| {
            let parts = value.into_list().ok_or_else(|| anyhow!("number: expected a list"))?;
            let negated = parts[0].as_byte() == Some(b'-');
            let digits = parts[1].as_str().ok_or_else(|| anyhow!("number: expected digits"))?;
            let mut total: i64 = 0;
            for digit in digits.bytes() {
                total = 10 * total + i64::from(digit - b'0');
            }
            Ok(Value::Int(if negated { -total } else { total }))
        },
    );

    g.add_symbol("comma", seq([symbol("ws"), literal(","), symbol("ws")]));

    g.with_action(
        "key_value",
        seq([
            symbol("string"),
            symbol("ws"),
            literal(":"),
            symbol("ws"),
            symbol("value"),
        ]),
        |value| {
            let parts = value.into_list().ok_or_else(|| anyhow!("key-value: expected a list"))?;
            let key = parts[0]
                .as_str()
                .ok_or_else(|| anyhow!("key-value: expected a string key"))?
                .to_string();
            let value = parts[4].clone();
            Ok(Value::custom(KeyValue { key, value }))
        },
    );

    g.with_action(
        "object",
        seq_at(
            2,
            [
                literal("{"),
                symbol("ws"),
                sep0(symbol("key_value"), symbol("comma")),
                symbol("ws"),
                literal("}"),
            ],
        ),
        |value| {
            let pairs = value.into_list().ok_or_else(|| anyhow!("object: expected a list"))?;
            let mut map = HashMap::new();
            for pair in &pairs {
                let kv = pair
                    .downcast_ref::<KeyValue>()
                    .ok_or_else(|| anyhow!("object: expected a key-value pair"))?;
                map.insert(kv.key.clone(), kv.value.clone());
            }
            Ok(Value::Map(map))
        },
    );

    g.add_symbol(
        "array",
        seq_at(
            2,
            [
                literal("["),
                symbol("ws"),
                sep0(symbol("value"), symbol("comma")),
                symbol("ws"),
                literal("]"),
            ],
        ),
    );

    g
}

#[test]
fn numbers() {
    let g = json_grammar();
    assert_eq!(g.parse_string("test", "77").unwrap(), Value::Int(77));
    assert_eq!(g.parse_string("test", "-19").unwrap(), Value::Int(-19));
    assert_eq!(g.parse_string("test", "+5").unwrap(), Value::Int(5));
}

#[test]
fn strings() {
    let g = json_grammar();
    let value = g.parse_string("test", "\"some string here \"").unwrap();
    assert_eq!(value.as_str(), Some("some string here "));
}

#[test]
fn booleans() {
    let g = json_grammar();
    assert_eq!(g.parse_string("test", "false").unwrap(), Value::Bool(false));
    assert_eq!(g.parse_string("test", "true").unwrap(), Value::Bool(true));
}

#[test]
fn null_is_a_value() {
    let g = json_grammar();
    assert_eq!(g.parse_string("test", "null").unwrap(), Value::Null);
}

#[test]
fn arrays_hold_mixed_values() {
    let g = json_grammar();
    let value = g.parse_string("test", "   [   77, \"str here\", false   ]   ").unwrap();

    let items = value.as_list().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Value::Int(77));
    assert_eq!(items[1].as_str(), Some("str here"));
    assert_eq!(items[2], Value::Bool(false));
}

#[test]
fn objects_map_keys_to_values() {
    let g = json_grammar();
    let value = g.parse_string("test", "  { \"key1\" :   -19  , \"kek\":\"str\"}  ").unwrap();

    let map = value.as_map().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["key1"], Value::Int(-19));
    assert_eq!(map["kek"].as_str(), Some("str"));
}

#[test]
fn arrays_nest() {
    let g = json_grammar();
    let value = g.parse_string("test", "[ 7, [0, 2] ]").unwrap();

    let items = value.as_list().unwrap();
    assert_eq!(items[0], Value::Int(7));
    let inner = items[1].as_list().unwrap();
    assert_eq!(inner[0], Value::Int(0));
    assert_eq!(inner[1], Value::Int(2));
}

#[test]
fn objects_nest() {
    let g = json_grammar();
    let value = g
        .parse_string("test", "{ \"arr\": [1,-8], \"obj\":{\"k\":\"v\"}, \"empty\"  : {} }")
        .unwrap();

    let map = value.as_map().unwrap();
    assert_eq!(map.len(), 3);

    let arr = map["arr"].as_list().unwrap();
    assert_eq!(arr[0], Value::Int(1));
    assert_eq!(arr[1], Value::Int(-8));

    let obj = map["obj"].as_map().unwrap();
    assert_eq!(obj["k"].as_str(), Some("v"));

    let empty = map["empty"].as_map().unwrap();
    assert!(empty.is_empty());
}

#[test]
fn unterminated_strings_are_rejected() {
    let g = json_grammar();
    assert!(g.parse_string("test", "\"no closing quote").is_err());
}

fn to_serde(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => (*b).into(),
        Value::Int(n) => (*n).into(),
        Value::Str(s) => s.clone().into(),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_serde).collect()),
        Value::Map(map) => {
            serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), to_serde(v))).collect())
        }
        other => panic!("not a JSON value: {:?}", other),
    }
}

#[test]
fn matches_the_reference_parser() {
    let source = r###"
    {
        "hello": "world",
        "x": [true, 12, false, -1, "true"],
        "y": { "zzz": "", "a": [] }
    }
    "###;

    let parsed = json_grammar().parse_string("test", source).unwrap();
    let expected = serde_json::from_str::<serde_json::Value>(source).unwrap();

    assert_eq!(to_serde(&parsed), expected);
}
