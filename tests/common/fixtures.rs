use rast::ast::{
    Body, Expr, ExprTerms, Head, Location, Module, Package, RegoVersion, Rule, Term, Value,
};

/// The source text of the reference module used across the integration
/// tests.
pub const POLICY_SOURCE: &str = "package p\n\nallow { true }";

/// Build the module a parser would produce for [`POLICY_SOURCE`]:
/// `package p` followed by one rule with a synthesized `true` head
/// value and a written body.
pub fn policy_module() -> Module {
    Module {
        package: Some(Package {
            path: vec![
                Term::new(Value::var("data")),
                Term::with_location(Value::string("p"), Location::with_text(1, 9, "p")),
            ],
            location: Some(Location::with_text(1, 1, "package p")),
        }),
        rules: vec![Rule {
            location: Some(Location::with_text(3, 1, "allow { true }")),
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
                    Location::with_text(3, 9, "true"),
                ))),
                location: Some(Location::with_text(3, 9, "true")),
                ..Expr::default()
            }]),
            ..Rule::default()
        }],
        rego_version: RegoVersion::V0,
        ..Module::default()
    }
}

/// Look up a key in an object value.
pub fn object_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let Value::Object(entries) = value else {
        return None;
    };
    entries
        .iter()
        .find(|(k, _)| k.value == Value::string(key))
        .map(|(_, v)| &v.value)
}

/// Collect the string elements of an array value.
pub fn string_array(value: &Value) -> Vec<String> {
    let Value::Array(terms) = value else {
        panic!("expected array, got {}", value.type_name());
    };
    terms
        .iter()
        .map(|term| match &term.value {
            Value::String(s) => s.to_string(),
            other => panic!("expected string element, got {}", other.type_name()),
        })
        .collect()
}
