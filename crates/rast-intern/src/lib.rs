//! Rast Intern - Shared instances of recurring leaf values
//!
//! A large share of the leaves in any encoded module are drawn from a
//! small alphabet: Rego keywords and builtin names, the wire field
//! names this workspace's own encoding uses, linter vocabulary, and
//! small integers (rows, columns, counts). Sharing one immutable
//! instance per such value removes most leaf allocations and lets hits
//! compare by pointer.
//!
//! All tables are built once on first use and never mutated afterward;
//! `LazyLock` initialization happens-before every read, so concurrent
//! conversions need no locking.
//!
//! Booleans, null, and the empty containers need no table: those
//! values are allocation-free by construction (`Value::Boolean`,
//! `Value::Null`, `Value::empty_array`, `Value::empty_object`).

mod path;

pub use path::*;

use rast_ast::{Number, Term, Value};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Strings commonly found in the AST of any Rego policy: keywords,
/// builtin names, and metadata vocabulary.
const REGO_STRINGS: &[&str] = &[
    "",
    " ",
    ",",
    "/",
    "array",
    "assign",
    "data",
    "description",
    "equal",
    "file",
    "input",
    "internal",
    "member_2",
    "number",
    "object",
    "policy",
    "rego",
    "set",
    "type",
    "var",
    "string",
    "text",
    "union",
    "IE1FVEFEQVRB", // " METADATA" as it appears in encoded comment nodes
    "v0",
    "v1",
    "v0v1",
    "unknown",
];

/// Strings commonly found in linter policies, but not necessarily
/// anywhere else.
const LINTER_STRINGS: &[&str] = &[
    "}",
    "# METADATA",
    "ast",
    "boolean",
    "bugs",
    "call",
    "category",
    "col",
    "config",
    "error",
    "idiomatic",
    "level",
    "location",
    "module",
    "violation",
    "title",
    "term",
    "r",
    "ref",
    "regal",
    "report",
    "result",
    "row",
    "rule",
    "rules",
    "style",
    "value",
    "end",
    "severity",
    "package_path",
    "aggregate_source",
    "aggregate_data",
    "negated_refs",
    "refs",
    "lint",
    "collect",
];

/// The reserved field names of the generic-tree wire shape. These recur
/// on every encoded object, so mapping keys consult this table first.
const WIRE_KEYS: &[&str] = &[
    "alias",
    "assign",
    "authors",
    "body",
    "custom",
    "default",
    "description",
    "else",
    "entrypoint",
    "head",
    "imports",
    "rules",
    "package",
    "annotations",
    "comments",
    "related_resources",
    "scope",
    "symbols",
    "negated",
    "generated",
    "key",
    "term",
    "domain",
    "location",
    "type",
    "value",
    "path",
    "args",
    "name",
    "schema",
    "schemas",
    "terms",
    "text",
    "title",
    "ref",
    "with",
    "target",
    // Lint input metadata keys
    "file",
    "abs",
    "environment",
    "path_separator",
    "lines",
    "operations",
    "regal",
    "rego_version",
];

const SMALL_INT_MAX: i64 = 127;

static KEYS: LazyLock<HashMap<&'static str, Arc<str>>> = LazyLock::new(|| {
    let mut map = HashMap::with_capacity(WIRE_KEYS.len());
    for key in WIRE_KEYS {
        map.entry(*key).or_insert_with(|| Arc::from(*key));
    }
    map
});

static STRINGS: LazyLock<HashMap<&'static str, Arc<str>>> = LazyLock::new(|| {
    let mut map =
        HashMap::with_capacity(REGO_STRINGS.len() + LINTER_STRINGS.len() + WIRE_KEYS.len());
    // Wire keys share the instances of the key table, so key and
    // general interning agree on identity.
    for (key, shared) in KEYS.iter() {
        map.insert(*key, shared.clone());
    }
    for s in REGO_STRINGS.iter().chain(LINTER_STRINGS) {
        map.entry(*s).or_insert_with(|| Arc::from(*s));
    }
    map
});

static SMALL_INTS: LazyLock<Vec<Number>> = LazyLock::new(|| {
    (0..=SMALL_INT_MAX).map(Number::from_i64).collect()
});

static MINUS_ONE: LazyLock<Number> = LazyLock::new(|| Number::from_i64(-1));

fn shared_str(s: &str) -> Arc<str> {
    match STRINGS.get(s) {
        Some(shared) => shared.clone(),
        None => Arc::from(s),
    }
}

/// Shared string value on a table hit, fresh allocation on a miss.
pub fn string_value(s: &str) -> Value {
    Value::String(shared_str(s))
}

/// `string_value` wrapped in a location-free term.
pub fn string_term(s: &str) -> Term {
    Term::new(string_value(s))
}

/// Var value sharing the table's instance when the name is in it.
pub fn var_value(s: &str) -> Value {
    Value::Var(shared_str(s))
}

pub fn var_term(s: &str) -> Term {
    Term::new(var_value(s))
}

/// String value for a mapping key, consulting the reserved wire-key
/// table before the general one.
pub fn key_value(s: &str) -> Value {
    match KEYS.get(s) {
        Some(shared) => Value::String(shared.clone()),
        None => string_value(s),
    }
}

pub fn key_term(s: &str) -> Term {
    Term::new(key_value(s))
}

/// Number value, shared for -1 and 0..=127.
pub fn int_value(i: i64) -> Value {
    Value::Number(int_number(i))
}

pub fn int_term(i: i64) -> Term {
    Term::new(int_value(i))
}

fn int_number(i: i64) -> Number {
    if i == -1 {
        MINUS_ONE.clone()
    } else if (0..=SMALL_INT_MAX).contains(&i) {
        SMALL_INTS[i as usize].clone()
    } else {
        Number::from_i64(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_payload(value: &Value) -> &Arc<str> {
        match value {
            Value::String(s) => s,
            other => panic!("expected string, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_table_hits_share_one_instance() {
        let a = string_value("input");
        let b = string_value("input");
        assert!(Arc::ptr_eq(string_payload(&a), string_payload(&b)));
    }

    #[test]
    fn test_misses_allocate_fresh() {
        let a = string_value("definitely-not-in-the-table");
        let b = string_value("definitely-not-in-the-table");
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(string_payload(&a), string_payload(&b)));
    }

    #[test]
    fn test_every_table_string_is_shared() {
        for s in REGO_STRINGS.iter().chain(LINTER_STRINGS).chain(WIRE_KEYS) {
            let a = string_value(s);
            let b = string_value(s);
            assert!(
                Arc::ptr_eq(string_payload(&a), string_payload(&b)),
                "expected {s:?} to be interned"
            );
        }
    }

    #[test]
    fn test_key_and_string_interning_agree() {
        let from_keys = key_value("location");
        let from_strings = string_value("location");
        assert!(Arc::ptr_eq(
            string_payload(&from_keys),
            string_payload(&from_strings)
        ));
    }

    #[test]
    fn test_small_int_singletons() {
        for i in [-1, 0, 1, 42, 127] {
            let Value::Number(a) = int_value(i) else {
                panic!("expected number");
            };
            let Value::Number(b) = int_value(i) else {
                panic!("expected number");
            };
            assert!(Arc::ptr_eq(&a.0, &b.0), "expected {i} to be shared");
        }
    }

    #[test]
    fn test_out_of_range_ints_are_fresh() {
        for i in [-2, 128, 100_000] {
            let Value::Number(a) = int_value(i) else {
                panic!("expected number");
            };
            let Value::Number(b) = int_value(i) else {
                panic!("expected number");
            };
            assert_eq!(a, b);
            assert!(!Arc::ptr_eq(&a.0, &b.0), "expected {i} to be fresh");
        }
    }

    #[test]
    fn test_int_text() {
        assert_eq!(int_value(42), Value::number("42"));
        assert_eq!(int_value(-1), Value::number("-1"));
        assert_eq!(int_value(128), Value::number("128"));
    }
}
