//! Proptest strategies for TOKSON token streams.
//!
//! Streams are generated as value trees first and then flattened into
//! well-formed token sequences, so every generated stream is one the
//! encoder will accept. Floats are derived from integers to keep NaN out
//! of equality-based properties.

use num_bigint::BigInt;
use num_traits::Num;
use proptest::prelude::*;
use tokson::Token;

/// A tree-shaped value, flattened into tokens by [`arb_tokens`].
#[derive(Clone, Debug)]
pub enum Value {
    /// A scalar leaf.
    Scalar(Token),
    /// An array of values.
    Array(Vec<Value>),
    /// An object of name/value pairs.
    Object(Vec<(String, Value)>),
}

/// An arbitrary big integer, up to roughly 256 bits, either sign.
pub fn arb_bigint() -> impl Strategy<Value = BigInt> {
    "-?[1-9][0-9]{0,77}".prop_map(|s| {
        BigInt::from_str_radix(&s, 10).unwrap_or_default()
    })
}

/// An arbitrary property name.
pub fn arb_name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,11}"
}

/// An arbitrary scalar token.
pub fn arb_scalar() -> impl Strategy<Value = Token> {
    prop_oneof![
        Just(Token::NullValue),
        any::<bool>().prop_map(Token::from),
        any::<i32>().prop_map(Token::from),
        any::<i64>().prop_map(Token::from),
        any::<i32>().prop_map(|i| Token::FloatValue(i as f32)),
        any::<i64>().prop_map(|i| Token::DoubleValue(i as f64)),
        ".{0,30}".prop_map(Token::from),
        arb_bigint().prop_map(Token::from),
        (arb_bigint(), any::<i32>()).prop_map(|(unscaled, scale)| Token::BigDecimalValue {
            unscaled,
            scale: scale as i64,
        }),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Token::from),
    ]
}

/// An arbitrary value tree.
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_map(Value::Scalar).prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_name(), inner), 0..6).prop_map(Value::Object),
        ]
    })
}

/// An arbitrary well-formed token stream of zero or more root values.
pub fn arb_tokens() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(arb_value(), 0..4).prop_map(|values| {
        let mut out = Vec::new();
        for v in &values {
            flatten(v, &mut out);
        }
        out
    })
}

fn flatten(value: &Value, out: &mut Vec<Token>) {
    match value {
        Value::Scalar(t) => out.push(t.clone()),
        Value::Array(items) => {
            out.push(Token::StartArray);
            for item in items {
                flatten(item, out);
            }
            out.push(Token::EndArray);
        }
        Value::Object(fields) => {
            out.push(Token::StartObject);
            for (name, item) in fields {
                out.push(Token::PropertyName(name.clone()));
                flatten(item, out);
            }
            out.push(Token::EndObject);
        }
    }
}
