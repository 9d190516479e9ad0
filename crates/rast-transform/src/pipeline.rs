//! Lint input preparation
//!
//! Composes both conversion directions: a freshly parsed module is
//! encoded to its generic JSON form, decoded back as a generic mapping,
//! converted to a typed value, and augmented with the file and
//! environment metadata the lint rules expect. The text round trip is a
//! deliberate boundary — the consumer on the other side is a generic
//! decoder, not this workspace's own converter.

use crate::{json_to_value, Result, TransformError};
use rast_ast::{Module, Term, Value};
use rast_intern as intern;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;

/// Encode a value to JSON bytes and decode the bytes into another
/// shape.
pub fn json_round_trip<F, T>(from: &F) -> std::result::Result<T, serde_json::Error>
where
    F: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let bytes = serde_json::to_vec(from)?;
    serde_json::from_slice(&bytes)
}

/// Convert any serializable value into a typed input value.
///
/// The value passes through a generic encode/decode pass first, which
/// guarantees the converter only ever sees the primitive/container
/// vocabulary regardless of what the caller hands in.
pub fn to_input_value<T>(x: &T) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    let generic: Json = json_round_trip(x).map_err(|source| TransformError::Encoding {
        stage: "input value",
        source,
    })?;

    json_to_value(&generic)
}

/// Produce the evaluation-ready input value for a parsed module.
///
/// `name` is the file name as given, `content` its source text, and
/// `collect` selects between a lint-only pass and a lint-and-collect
/// pass. The module itself is never mutated.
pub fn to_ast(name: &str, content: &str, module: &Module, collect: bool) -> Result<Value> {
    let prepared: serde_json::Map<String, Json> =
        json_round_trip(module).map_err(|source| TransformError::Encoding {
            stage: "module",
            source,
        })?;

    let value = to_input_value(&prepared)?;

    let Value::Object(mut entries) = value else {
        return Err(TransformError::NotAnObject);
    };

    entries.push((
        intern::key_term("regal"),
        Term::new(lint_metadata(name, content, module, collect)),
    ));

    Ok(Value::Object(entries))
}

fn lint_metadata(name: &str, content: &str, module: &Module, collect: bool) -> Value {
    let abs = std::path::absolute(name)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| name.to_string());

    let file = Value::Object(vec![
        (
            intern::key_term("name"),
            Term::new(intern::string_value(name)),
        ),
        (intern::key_term("lines"), Term::new(lines_array(content))),
        (intern::key_term("abs"), Term::new(intern::string_value(&abs))),
        (
            intern::key_term("rego_version"),
            Term::new(intern::string_value(module.rego_version.as_str())),
        ),
    ]);

    let environment = Value::Object(vec![(
        intern::key_term("path_separator"),
        Term::new(intern::string_value(&std::path::MAIN_SEPARATOR.to_string())),
    )]);

    let mut operations = vec![intern::string_term("lint")];
    if collect {
        operations.push(intern::string_term("collect"));
    }

    Value::Object(vec![
        (intern::key_term("file"), Term::new(file)),
        (intern::key_term("environment"), Term::new(environment)),
        (
            intern::key_term("operations"),
            Term::new(Value::Array(operations)),
        ),
    ])
}

/// Per-line source text, with Windows line endings normalized first.
fn lines_array(content: &str) -> Value {
    let normalized = content.replace("\r\n", "\n");
    let lines = normalized.split('\n').map(intern::string_term).collect();
    Value::Array(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        let Value::Object(entries) = value else {
            return None;
        };
        entries
            .iter()
            .find(|(k, _)| k.value == Value::string(key))
            .map(|(_, v)| &v.value)
    }

    #[test]
    fn test_round_trip_to_generic_map() {
        let module = Module::default();
        let map: serde_json::Map<String, Json> = json_round_trip(&module).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_to_input_value_passes_through_generic_vocabulary() {
        #[derive(serde::Serialize)]
        struct Report {
            level: String,
            row: u32,
        }

        let value = to_input_value(&Report {
            level: "error".to_string(),
            row: 3,
        })
        .unwrap();

        assert_eq!(object_get(&value, "level"), Some(&Value::string("error")));
        assert_eq!(object_get(&value, "row"), Some(&intern::int_value(3)));
    }

    #[test]
    fn test_to_ast_attaches_metadata_to_empty_module() {
        let value = to_ast("p.rego", "", &Module::default(), false).unwrap();
        let regal = object_get(&value, "regal").expect("expected regal metadata");
        assert!(object_get(regal, "file").is_some());
        assert!(object_get(regal, "environment").is_some());
    }

    #[test]
    fn test_lines_array_normalizes_crlf() {
        let Value::Array(lines) = lines_array("a\r\nb\nc") else {
            panic!("expected array");
        };
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].value, Value::string("a"));
        assert_eq!(lines[2].value, Value::string("c"));
    }

    #[test]
    fn test_metadata_operations() {
        let module = Module::default();

        let lint_only = lint_metadata("p.rego", "package p", &module, false);
        let Some(Value::Array(ops)) = object_get(&lint_only, "operations") else {
            panic!("expected operations");
        };
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].value, Value::string("lint"));

        let with_collect = lint_metadata("p.rego", "package p", &module, true);
        let Some(Value::Array(ops)) = object_get(&with_collect, "operations") else {
            panic!("expected operations");
        };
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1].value, Value::string("collect"));
    }
}
