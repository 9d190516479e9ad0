//! Externally-decoded JSON to typed values
//!
//! The inverse of the serializer: takes a value already decoded into
//! the generic vocabulary (null, booleans, numbers, strings, sequences,
//! string-keyed mappings) and rebuilds the typed tree, consulting the
//! intern tables at every leaf. Tuned for trees produced by this
//! workspace's own encoding, where nearly every key and most leaves are
//! table hits.

use crate::{Result, TransformError};
use rast_ast::{Number, Term, Value};
use rast_intern as intern;
use serde_json::Value as Json;

/// Convert a decoded generic value into a typed value.
///
/// Numbers are classified by value: anything integral in the small-int
/// range resolves to the shared singletons, other integrals format
/// fresh, and fractional values keep their shortest round-trippable
/// decimal form. A number representable as neither i64, u64, nor a
/// finite f64 is reported as unsupported rather than mangled.
pub fn json_to_value(json: &Json) -> Result<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Boolean(*b)),
        Json::Number(number) => number_to_value(number),
        Json::String(s) => Ok(intern::string_value(s)),
        Json::Array(items) => {
            if items.is_empty() {
                return Ok(Value::empty_array());
            }
            let mut terms = Vec::with_capacity(items.len());
            for item in items {
                terms.push(Term::new(json_to_value(item)?));
            }
            Ok(Value::Array(terms))
        }
        Json::Object(map) => {
            if map.is_empty() {
                return Ok(Value::empty_object());
            }
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                entries.push((intern::key_term(key), Term::new(json_to_value(value)?)));
            }
            Ok(Value::Object(entries))
        }
    }
}

fn number_to_value(number: &serde_json::Number) -> Result<Value> {
    if let Some(i) = number.as_i64() {
        return Ok(intern::int_value(i));
    }
    if let Some(u) = number.as_u64() {
        return Ok(Value::Number(Number::from_text(u.to_string())));
    }

    let Some(f) = number.as_f64() else {
        return Err(TransformError::unsupported_number(number));
    };

    Ok(float_to_value(f))
}

/// Canonical typed value for a float. Integral values collapse to the
/// (possibly interned) integer form — `42.0` and `42` are the same
/// number — and everything else keeps the shortest round-trippable
/// decimal text. The direct serializer normalizes through this same
/// function, so both conversion directions agree byte for byte.
pub(crate) fn float_to_value(f: f64) -> Value {
    let truncated = f as i64;
    if f == truncated as f64 {
        intern::int_value(truncated)
    } else {
        Value::Number(Number::from_f64(f))
    }
}
