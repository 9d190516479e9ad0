//! Typed modules to generic value trees
//!
//! Walks a module and builds the equivalent generic tree directly,
//! without going through a text format. The shape matches what the
//! serde encoding in `rast-ast` produces byte for byte once encoded,
//! but every key and most leaves here are shared interned instances,
//! which is what makes this the hot path for repeated lint runs.

use crate::json_to_value;
use crate::value::float_to_value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rast_ast::{
    Annotations, Body, Comment, Expr, ExprTerms, Head, Import, Location, Module, Number, Package,
    Rule, Term, Value, With,
};
use rast_intern as intern;

/// Build the generic tree for a module. The input is never mutated.
pub fn module_to_value(module: &Module) -> Value {
    let mut root: Vec<(Term, Term)> = Vec::with_capacity(4);

    if let Some(package) = &module.package {
        root.push((
            intern::key_term("package"),
            Term::new(package_to_value(package, &module.annotations)),
        ));
    }

    if !module.imports.is_empty() {
        let imports = module.imports.iter().map(import_to_term).collect();
        root.push((intern::key_term("imports"), Term::new(Value::Array(imports))));
    }

    if !module.rules.is_empty() {
        let rules = module.rules.iter().map(rule_to_term).collect();
        root.push((intern::key_term("rules"), Term::new(Value::Array(rules))));
    }

    if !module.comments.is_empty() {
        let comments = module.comments.iter().map(comment_to_term).collect();
        root.push((
            intern::key_term("comments"),
            Term::new(Value::Array(comments)),
        ));
    }

    Value::Object(root)
}

fn package_to_value(package: &Package, annotations: &[Annotations]) -> Value {
    let mut entries = object_with_location(&package.location);

    if !package.path.is_empty() {
        entries.push((intern::key_term("path"), path_array(&package.path)));
    }

    let package_annotations: Vec<Term> = annotations
        .iter()
        .filter(|a| a.is_package_scope())
        .map(|a| Term::new(annotations_to_value(a)))
        .collect();
    if !package_annotations.is_empty() {
        entries.push((
            intern::key_term("annotations"),
            Term::new(Value::Array(package_annotations)),
        ));
    }

    Value::Object(entries)
}

/// Package path as term objects, the leading root-document term
/// written without its location.
fn path_array(path: &[Term]) -> Term {
    let mut terms = Vec::with_capacity(path.len());
    for (i, term) in path.iter().enumerate() {
        let include_location = !(i == 0 && term.is_root_document());
        terms.push(term_to_object_loc(term, include_location));
    }
    Term::new(Value::Array(terms))
}

fn import_to_term(import: &Import) -> Term {
    let mut entries = object_with_location(&import.location);
    entries.push((intern::key_term("path"), term_to_object(&import.path)));
    if let Some(alias) = &import.alias {
        if !alias.is_empty() {
            entries.push((
                intern::key_term("alias"),
                Term::new(intern::string_value(alias)),
            ));
        }
    }
    Term::new(Value::Object(entries))
}

fn rule_to_term(rule: &Rule) -> Term {
    let mut entries = object_with_location(&rule.location);

    if !rule.annotations.is_empty() {
        let annotations = rule
            .annotations
            .iter()
            .map(|a| Term::new(annotations_to_value(a)))
            .collect();
        entries.push((
            intern::key_term("annotations"),
            Term::new(Value::Array(annotations)),
        ));
    }

    if rule.default {
        entries.push((intern::key_term("default"), Term::new(Value::Boolean(true))));
    }

    if let Some(head) = &rule.head {
        entries.push((intern::key_term("head"), head_to_term(head)));
    }

    if !rule.body_is_generated() {
        entries.push((intern::key_term("body"), body_to_term(&rule.body)));
    }

    if let Some(else_rule) = &rule.else_rule {
        entries.push((intern::key_term("else"), rule_to_term(else_rule)));
    }

    Term::new(Value::Object(entries))
}

fn head_to_term(head: &Head) -> Term {
    let mut entries = object_with_location(&head.location);

    if !head.reference.is_empty() {
        let reference = head.reference.iter().map(term_to_object).collect();
        entries.push((intern::key_term("ref"), Term::new(Value::Array(reference))));
    }

    if !head.args.is_empty() {
        let args = head.args.iter().map(term_to_object).collect();
        entries.push((intern::key_term("args"), Term::new(Value::Array(args))));
    }

    if head.assign {
        entries.push((intern::key_term("assign"), Term::new(Value::Boolean(true))));
    }

    if let Some(key) = &head.key {
        entries.push((intern::key_term("key"), term_to_object(key)));
    }

    if let Some(value) = &head.value {
        // A value synthesized by the parser shares the head's position;
        // it is encoded without a location, leaving the input alone.
        let include_location = !head.value_location_is_synthesized();
        entries.push((
            intern::key_term("value"),
            term_to_object_loc(value, include_location),
        ));
    }

    Term::new(Value::Object(entries))
}

fn body_to_term(body: &Body) -> Term {
    let mut exprs = Vec::with_capacity(body.len());
    for expr in body.iter() {
        exprs.push(expr_to_term(expr));
    }
    Term::new(Value::Array(exprs))
}

fn expr_to_term(expr: &Expr) -> Term {
    let mut entries = object_with_location(&expr.location);

    if expr.negated {
        entries.push((intern::key_term("negated"), Term::new(Value::Boolean(true))));
    }

    if expr.generated {
        entries.push((
            intern::key_term("generated"),
            Term::new(Value::Boolean(true)),
        ));
    }

    if !expr.with.is_empty() {
        let with = expr.with.iter().map(with_to_term).collect();
        entries.push((intern::key_term("with"), Term::new(Value::Array(with))));
    }

    if let Some(terms) = &expr.terms {
        let terms_value = match terms {
            ExprTerms::Single(term) => term_to_object(term),
            ExprTerms::Sequence(sequence) => {
                Term::new(Value::Array(sequence.iter().map(term_to_object).collect()))
            }
            ExprTerms::Some(decl) => {
                let mut inner = object_with_location(&decl.location);
                inner.push((
                    intern::key_term("symbols"),
                    Term::new(Value::Array(
                        decl.symbols.iter().map(term_to_object).collect(),
                    )),
                ));
                Term::new(Value::Object(inner))
            }
            ExprTerms::Every(every) => {
                let mut inner = object_with_location(&every.location);
                // No key still writes an explicit null; downstream
                // consumers tell `every v` from `every k, v` by it.
                match &every.key {
                    Some(key) => inner.push((intern::key_term("key"), term_to_object(key))),
                    None => inner.push((intern::key_term("key"), Term::new(Value::Null))),
                }
                inner.push((intern::key_term("value"), term_to_object(&every.value)));
                inner.push((intern::key_term("domain"), term_to_object(&every.domain)));
                inner.push((intern::key_term("body"), body_to_term(&every.body)));
                Term::new(Value::Object(inner))
            }
        };
        entries.push((intern::key_term("terms"), terms_value));
    }

    Term::new(Value::Object(entries))
}

fn with_to_term(with: &With) -> Term {
    let mut entries = object_with_location(&with.location);
    entries.push((intern::key_term("target"), term_to_object(&with.target)));
    entries.push((intern::key_term("value"), term_to_object(&with.value)));
    Term::new(Value::Object(entries))
}

fn comment_to_term(comment: &Comment) -> Term {
    let encoded = STANDARD.encode(comment.text.as_bytes());
    let mut entries: Vec<(Term, Term)> = Vec::with_capacity(2);
    entries.push((
        intern::key_term("text"),
        Term::new(intern::string_value(&encoded)),
    ));
    if let Some(location) = &comment.location {
        entries.push(location_entry(location));
    }
    Term::new(Value::Object(entries))
}

fn annotations_to_value(annotations: &Annotations) -> Value {
    let mut entries = object_with_location(&annotations.location);

    if !annotations.scope.is_empty() {
        entries.push((
            intern::key_term("scope"),
            Term::new(intern::string_value(&annotations.scope)),
        ));
    }

    if !annotations.title.is_empty() {
        entries.push((
            intern::key_term("title"),
            Term::new(intern::string_value(&annotations.title)),
        ));
    }

    if annotations.entrypoint {
        entries.push((
            intern::key_term("entrypoint"),
            Term::new(Value::Boolean(true)),
        ));
    }

    if !annotations.description.is_empty() {
        entries.push((
            intern::key_term("description"),
            Term::new(intern::string_value(&annotations.description)),
        ));
    }

    if !annotations.organizations.is_empty() {
        let organizations = annotations
            .organizations
            .iter()
            .map(|org| Term::new(intern::string_value(org)))
            .collect();
        entries.push((
            intern::key_term("organizations"),
            Term::new(Value::Array(organizations)),
        ));
    }

    if !annotations.related_resources.is_empty() {
        let resources = annotations
            .related_resources
            .iter()
            .map(|resource| {
                let mut inner: Vec<(Term, Term)> = Vec::with_capacity(2);
                inner.push((
                    intern::key_term("ref"),
                    Term::new(intern::string_value(&resource.reference)),
                ));
                if !resource.description.is_empty() {
                    inner.push((
                        intern::key_term("description"),
                        Term::new(intern::string_value(&resource.description)),
                    ));
                }
                Term::new(Value::Object(inner))
            })
            .collect();
        entries.push((
            intern::key_term("related_resources"),
            Term::new(Value::Array(resources)),
        ));
    }

    if !annotations.authors.is_empty() {
        let authors = annotations
            .authors
            .iter()
            .map(|author| {
                let mut inner: Vec<(Term, Term)> = Vec::with_capacity(2);
                if !author.name.is_empty() {
                    inner.push((
                        intern::key_term("name"),
                        Term::new(intern::string_value(&author.name)),
                    ));
                }
                if !author.email.is_empty() {
                    inner.push((
                        intern::key_term("email"),
                        Term::new(intern::string_value(&author.email)),
                    ));
                }
                Term::new(Value::Object(inner))
            })
            .collect();
        entries.push((
            intern::key_term("authors"),
            Term::new(Value::Array(authors)),
        ));
    }

    if !annotations.schemas.is_empty() {
        let schemas = annotations
            .schemas
            .iter()
            .map(|schema| {
                let mut inner: Vec<(Term, Term)> = Vec::with_capacity(3);
                if !schema.path.is_empty() {
                    inner.push((intern::key_term("path"), plain_ref(&schema.path)));
                }
                if !schema.schema.is_empty() {
                    inner.push((intern::key_term("schema"), plain_ref(&schema.schema)));
                }
                if let Some(definition) = &schema.definition {
                    inner.push((
                        intern::key_term("definition"),
                        Term::new(contract_json_to_value(definition)),
                    ));
                }
                Term::new(Value::Object(inner))
            })
            .collect();
        entries.push((
            intern::key_term("schemas"),
            Term::new(Value::Array(schemas)),
        ));
    }

    if let Some(custom) = &annotations.custom {
        if !custom.is_empty() {
            let mut inner = Vec::with_capacity(custom.len());
            for (key, value) in custom {
                inner.push((intern::key_term(key), Term::new(contract_json_to_value(value))));
            }
            entries.push((intern::key_term("custom"), Term::new(Value::Object(inner))));
        }
    }

    Value::Object(entries)
}

/// Annotation payloads are produced by the parser and are JSON-shaped
/// by construction; a value the vocabulary cannot hold is a broken
/// producer, not a runtime condition.
fn contract_json_to_value(json: &serde_json::Value) -> Value {
    json_to_value(json).expect("annotation payload outside the JSON value vocabulary")
}

/// A ref flattened to its plain string segments, the shape schema
/// annotation refs use.
fn plain_ref(path: &[Term]) -> Term {
    let segments = path
        .iter()
        .map(|term| Term::new(intern::string_value(&term.value.segment_text())))
        .collect();
    Term::new(Value::Array(segments))
}

fn object_with_location(location: &Option<Location>) -> Vec<(Term, Term)> {
    match location {
        Some(location) => vec![location_entry(location)],
        None => Vec::new(),
    }
}

fn location_entry(location: &Location) -> (Term, Term) {
    (
        intern::key_term("location"),
        Term::new(intern::string_value(&location.compact())),
    )
}

fn term_to_object(term: &Term) -> Term {
    term_to_object_loc(term, true)
}

fn term_to_object_loc(term: &Term, include_location: bool) -> Term {
    let mut entries: Vec<(Term, Term)> = Vec::with_capacity(3);
    if include_location {
        if let Some(location) = &term.location {
            entries.push(location_entry(location));
        }
    }
    entries.push((
        intern::key_term("type"),
        Term::new(intern::string_value(term.value.type_name())),
    ));
    entries.push((intern::key_term("value"), term_value_term(&term.value)));
    Term::new(Value::Object(entries))
}

fn term_value_term(value: &Value) -> Term {
    Term::new(match value {
        Value::Null => Value::Null,
        Value::Boolean(b) => Value::Boolean(*b),
        Value::Number(number) => number_value(number),
        Value::String(s) | Value::Var(s) => intern::string_value(s),
        Value::Ref(terms) | Value::Call(terms) => {
            Value::Array(terms.iter().map(term_to_object).collect())
        }
        Value::Array(terms) => {
            if terms.is_empty() {
                Value::empty_array()
            } else {
                Value::Array(terms.iter().map(term_to_object).collect())
            }
        }
        Value::Object(object_entries) => {
            if object_entries.is_empty() {
                Value::empty_array()
            } else {
                Value::Array(
                    object_entries
                        .iter()
                        .map(|(key, value)| {
                            Term::new(Value::Array(vec![
                                term_to_object(key),
                                term_to_object(value),
                            ]))
                        })
                        .collect(),
                )
            }
        }
        Value::Set(terms) => {
            if terms.is_empty() {
                Value::empty_array()
            } else {
                Value::Array(terms.iter().map(term_to_object).collect())
            }
        }
        Value::ArrayComprehension { term, body } | Value::SetComprehension { term, body } => {
            Value::Object(vec![
                (intern::key_term("term"), term_to_object(term)),
                (intern::key_term("body"), body_to_term(body)),
            ])
        }
        Value::ObjectComprehension { key, value, body } => Value::Object(vec![
            (intern::key_term("key"), term_to_object(key)),
            (intern::key_term("value"), term_to_object(value)),
            (intern::key_term("body"), body_to_term(body)),
        ]),
    })
}

/// Number normalization for the direct tree, mirroring what the
/// generic converter does to the same text after a round trip:
/// integers intern, integral-valued decimals like `42.0` collapse to
/// their integer form, and fractional values keep the shortest
/// round-trippable text.
fn number_value(number: &Number) -> Value {
    let text = number.as_str();
    if let Ok(i) = text.parse::<i64>() {
        return intern::int_value(i);
    }
    if let Ok(u) = text.parse::<u64>() {
        return Value::Number(Number::from_text(u.to_string()));
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => float_to_value(f),
        _ => Value::Number(number.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rast_ast::Author;

    fn object_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        let Value::Object(entries) = value else {
            return None;
        };
        entries
            .iter()
            .find(|(k, _)| k.value == Value::string(key))
            .map(|(_, v)| &v.value)
    }

    fn basic_rule() -> Rule {
        Rule {
            location: Some(Location::with_text(3, 1, "allow if { true }")),
            head: Some(Head {
                reference: vec![Term::with_location(
                    Value::var("allow"),
                    Location::with_text(3, 1, "allow"),
                )],
                value: Some(Term::with_location(
                    Value::Boolean(true),
                    Location::new(3, 1),
                )),
                location: Some(Location::with_text(3, 1, "allow")),
                ..Head::default()
            }),
            body: Body::new(vec![Expr {
                terms: Some(ExprTerms::Single(Term::with_location(
                    Value::Boolean(true),
                    Location::with_text(3, 12, "true"),
                ))),
                location: Some(Location::with_text(3, 12, "true")),
                ..Expr::default()
            }]),
            ..Rule::default()
        }
    }

    #[test]
    fn test_empty_module() {
        assert_eq!(module_to_value(&Module::default()), Value::empty_object());
    }

    #[test]
    fn test_rule_omits_defaults() {
        let module = Module {
            rules: vec![basic_rule()],
            ..Module::default()
        };

        let value = module_to_value(&module);
        let Some(Value::Array(rules)) = object_get(&value, "rules") else {
            panic!("expected rules array");
        };
        let rule = &rules[0].value;

        assert!(object_get(rule, "annotations").is_none());
        assert!(object_get(rule, "default").is_none());
        assert!(object_get(rule, "else").is_none());
        assert!(object_get(rule, "head").is_some());
        assert!(object_get(rule, "body").is_some());
    }

    #[test]
    fn test_synthesized_head_value_loses_location() {
        let module = Module {
            rules: vec![basic_rule()],
            ..Module::default()
        };

        let value = module_to_value(&module);
        let Some(Value::Array(rules)) = object_get(&value, "rules") else {
            panic!("expected rules array");
        };
        let head = object_get(&rules[0].value, "head").unwrap();
        let head_value = object_get(head, "value").unwrap();

        assert!(object_get(head_value, "location").is_none());
        assert_eq!(
            object_get(head_value, "type"),
            Some(&Value::string("boolean"))
        );
        // The module the caller handed in still carries the location.
        assert!(module.rules[0].head.as_ref().unwrap().value.as_ref().unwrap().location.is_some());
    }

    #[test]
    fn test_default_rule_body_omitted() {
        let rule = Rule {
            default: true,
            ..basic_rule()
        };
        let module = Module {
            rules: vec![rule],
            ..Module::default()
        };

        let value = module_to_value(&module);
        let Some(Value::Array(rules)) = object_get(&value, "rules") else {
            panic!("expected rules array");
        };
        assert_eq!(
            object_get(&rules[0].value, "default"),
            Some(&Value::Boolean(true))
        );
        assert!(object_get(&rules[0].value, "body").is_none());
    }

    #[test]
    fn test_package_path_head_loses_location() {
        let module = Module {
            package: Some(Package {
                path: vec![
                    Term::with_location(Value::var("data"), Location::new(1, 9)),
                    Term::with_location(Value::string("p"), Location::with_text(1, 9, "p")),
                ],
                location: Some(Location::with_text(1, 1, "package p")),
            }),
            ..Module::default()
        };

        let value = module_to_value(&module);
        let package = object_get(&value, "package").unwrap();
        let Some(Value::Array(path)) = object_get(package, "path") else {
            panic!("expected path array");
        };

        assert!(object_get(&path[0].value, "location").is_none());
        assert!(object_get(&path[1].value, "location").is_some());
    }

    #[test]
    fn test_object_value_flattens_to_pairs() {
        let object = Value::object_from(vec![(
            Term::new(Value::string("k")),
            Term::new(Value::Number(Number::from_i64(1))),
        )]);
        let encoded = term_value_term(&object);

        let Value::Array(pairs) = &encoded.value else {
            panic!("expected flattened pairs");
        };
        let Value::Array(pair) = &pairs[0].value else {
            panic!("expected a [key, value] pair");
        };
        assert_eq!(object_get(&pair[0].value, "type"), Some(&Value::string("string")));
        assert_eq!(object_get(&pair[1].value, "type"), Some(&Value::string("number")));
    }

    #[test]
    fn test_integral_decimals_collapse_to_integers() {
        // `42.0` and `42` are the same number; the direct tree must
        // agree with what the text round trip produces.
        for (text, expected) in [
            ("42.0", "42"),
            ("100.0", "100"),
            ("1e2", "100"),
            ("-1.0", "-1"),
            ("42", "42"),
            ("3.14", "3.14"),
            ("3.140", "3.14"),
        ] {
            assert_eq!(
                term_value_term(&Value::number(text)).value,
                Value::number(expected),
                "number text {text:?}"
            );
        }
    }

    #[test]
    fn test_empty_containers_flatten_to_empty_array() {
        for value in [Value::empty_object(), Value::empty_array(), Value::Set(vec![])] {
            assert_eq!(term_value_term(&value).value, Value::empty_array());
        }
    }

    #[test]
    fn test_comment_base64() {
        let module = Module {
            comments: vec![Comment::new(" METADATA", Location::with_text(1, 1, "# METADATA"))],
            ..Module::default()
        };

        let value = module_to_value(&module);
        let Some(Value::Array(comments)) = object_get(&value, "comments") else {
            panic!("expected comments array");
        };
        assert_eq!(
            object_get(&comments[0].value, "text"),
            Some(&Value::string("IE1FVEFEQVRB"))
        );
    }

    #[test]
    fn test_annotations_scope_filter_and_fields() {
        let module = Module {
            package: Some(Package {
                path: vec![Term::new(Value::var("data")), Term::new(Value::string("p"))],
                location: None,
            }),
            annotations: vec![
                Annotations {
                    scope: "package".to_string(),
                    title: "package docs".to_string(),
                    entrypoint: true,
                    authors: vec![Author {
                        name: "Jane Doe".to_string(),
                        email: String::new(),
                    }],
                    ..Annotations::default()
                },
                Annotations {
                    scope: "rule".to_string(),
                    ..Annotations::default()
                },
            ],
            ..Module::default()
        };

        let value = module_to_value(&module);
        let package = object_get(&value, "package").unwrap();
        let Some(Value::Array(annotations)) = object_get(package, "annotations") else {
            panic!("expected package annotations");
        };

        assert_eq!(annotations.len(), 1);
        let entry = &annotations[0].value;
        assert_eq!(object_get(entry, "scope"), Some(&Value::string("package")));
        assert_eq!(object_get(entry, "entrypoint"), Some(&Value::Boolean(true)));
        let Some(Value::Array(authors)) = object_get(entry, "authors") else {
            panic!("expected authors");
        };
        assert_eq!(
            object_get(&authors[0].value, "name"),
            Some(&Value::string("Jane Doe"))
        );
        assert!(object_get(&authors[0].value, "email").is_none());
    }

    #[test]
    fn test_every_without_key_is_explicit_null() {
        let every = rast_ast::Every {
            key: None,
            value: Term::new(Value::var("v")),
            domain: Term::new(Value::var("xs")),
            body: Body::default(),
            location: None,
        };
        let expr = Expr {
            terms: Some(ExprTerms::Every(every)),
            ..Expr::default()
        };

        let encoded = expr_to_term(&expr);
        let terms = object_get(&encoded.value, "terms").unwrap();
        assert_eq!(object_get(terms, "key"), Some(&Value::Null));
    }
}
