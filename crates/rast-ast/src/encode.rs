//! Wire encoding of the AST
//!
//! Hand-written `Serialize` impls producing the generic tree shape the
//! linter consumes. The `Term` and `Body` impls double as the streaming
//! fast path: any structure embedding a term or body picks them up
//! through serde's type dispatch, so no intermediate tree is built when
//! a module is encoded to JSON.
//!
//! Fields holding an empty or default value are omitted throughout.
//! The two deliberate exceptions: a synthesized head value is still
//! written (without its location), and an `every` without a key writes
//! an explicit `key: null`.

use crate::{
    Annotations, Body, Comment, Every, Expr, ExprTerms, Head, Import, Module, Package, Rule,
    SomeDecl, Term, Value, With,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use std::str::FromStr;

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_term(self, true, serializer)
    }
}

/// A term encoded without its location, for the spots where the
/// location is implied or synthesized.
struct TermSansLocation<'a>(&'a Term);

impl Serialize for TermSansLocation<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_term(self.0, false, serializer)
    }
}

fn serialize_term<S: Serializer>(
    term: &Term,
    include_location: bool,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    if include_location {
        if let Some(location) = &term.location {
            map.serialize_entry("location", &location.compact())?;
        }
    }
    map.serialize_entry("type", term.value.type_name())?;
    map.serialize_entry("value", &term.value)?;
    map.end()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match serde_json::Number::from_str(n.as_str()) {
                Ok(number) => number.serialize(serializer),
                Err(_) => Err(S::Error::custom("number text is not a valid number")),
            },
            Value::String(s) | Value::Var(s) => serializer.serialize_str(s),
            Value::Ref(terms) | Value::Call(terms) | Value::Array(terms) | Value::Set(terms) => {
                terms.serialize(serializer)
            }
            Value::Object(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for (key, value) in entries {
                    seq.serialize_element(&[key, value])?;
                }
                seq.end()
            }
            Value::ArrayComprehension { term, body }
            | Value::SetComprehension { term, body } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("term", term)?;
                map.serialize_entry("body", body)?;
                map.end()
            }
            Value::ObjectComprehension { key, value, body } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("key", key)?;
                map.serialize_entry("value", value)?;
                map.serialize_entry("body", body)?;
                map.end()
            }
        }
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for expr in self.iter() {
            seq.serialize_element(expr)?;
        }
        seq.end()
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        if self.negated {
            map.serialize_entry("negated", &true)?;
        }
        if self.generated {
            map.serialize_entry("generated", &true)?;
        }
        if !self.with.is_empty() {
            map.serialize_entry("with", &self.with)?;
        }
        match &self.terms {
            Some(ExprTerms::Single(term)) => map.serialize_entry("terms", term)?,
            Some(ExprTerms::Sequence(terms)) => map.serialize_entry("terms", terms)?,
            Some(ExprTerms::Some(decl)) => map.serialize_entry("terms", decl)?,
            Some(ExprTerms::Every(every)) => map.serialize_entry("terms", every)?,
            None => {}
        }
        map.end()
    }
}

impl Serialize for With {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        map.serialize_entry("target", &self.target)?;
        map.serialize_entry("value", &self.value)?;
        map.end()
    }
}

impl Serialize for SomeDecl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        map.serialize_entry("symbols", &self.symbols)?;
        map.end()
    }
}

impl Serialize for Every {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        // An absent key is an explicit null, which downstream consumers
        // rely on to tell `every v` from `every k, v`.
        match &self.key {
            Some(key) => map.serialize_entry("key", key)?,
            None => map.serialize_entry("key", &())?,
        }
        map.serialize_entry("value", &self.value)?;
        map.serialize_entry("domain", &self.domain)?;
        map.serialize_entry("body", &self.body)?;
        map.end()
    }
}

impl Serialize for Module {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(package) = &self.package {
            map.serialize_entry(
                "package",
                &PackageWire {
                    package,
                    annotations: &self.annotations,
                },
            )?;
        }
        if !self.imports.is_empty() {
            map.serialize_entry("imports", &self.imports)?;
        }
        if !self.rules.is_empty() {
            map.serialize_entry("rules", &self.rules)?;
        }
        if !self.comments.is_empty() {
            map.serialize_entry("comments", &self.comments)?;
        }
        map.end()
    }
}

struct PackageWire<'a> {
    package: &'a Package,
    annotations: &'a [Annotations],
}

impl Serialize for PackageWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.package.location {
            map.serialize_entry("location", &location.compact())?;
        }
        if !self.package.path.is_empty() {
            map.serialize_entry("path", &PathArray(&self.package.path))?;
        }
        if self.annotations.iter().any(|a| a.is_package_scope()) {
            map.serialize_entry("annotations", &PackageAnnotations(self.annotations))?;
        }
        map.end()
    }
}

/// Package path: term objects, with the leading root-document term
/// written without a location to shrink the fully-qualified common
/// case.
struct PathArray<'a>(&'a [Term]);

impl Serialize for PathArray<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (i, term) in self.0.iter().enumerate() {
            if i == 0 && term.is_root_document() {
                seq.serialize_element(&TermSansLocation(term))?;
            } else {
                seq.serialize_element(term)?;
            }
        }
        seq.end()
    }
}

/// Module annotations filtered down to the ones attached to the
/// package node (document- and rule-scoped entries are emitted with
/// their owning rule instead).
struct PackageAnnotations<'a>(&'a [Annotations]);

impl Serialize for PackageAnnotations<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for annotations in self.0.iter().filter(|a| a.is_package_scope()) {
            seq.serialize_element(annotations)?;
        }
        seq.end()
    }
}

impl Serialize for Import {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        map.serialize_entry("path", &self.path)?;
        if let Some(alias) = &self.alias {
            if !alias.is_empty() {
                map.serialize_entry("alias", alias)?;
            }
        }
        map.end()
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        if !self.annotations.is_empty() {
            map.serialize_entry("annotations", &self.annotations)?;
        }
        if self.default {
            map.serialize_entry("default", &true)?;
        }
        if let Some(head) = &self.head {
            map.serialize_entry("head", head)?;
        }
        if !self.body_is_generated() {
            map.serialize_entry("body", &self.body)?;
        }
        if let Some(else_rule) = &self.else_rule {
            map.serialize_entry("else", else_rule)?;
        }
        map.end()
    }
}

impl Serialize for Head {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        if !self.reference.is_empty() {
            map.serialize_entry("ref", &self.reference)?;
        }
        if !self.args.is_empty() {
            map.serialize_entry("args", &self.args)?;
        }
        if self.assign {
            map.serialize_entry("assign", &true)?;
        }
        if let Some(key) = &self.key {
            map.serialize_entry("key", key)?;
        }
        if let Some(value) = &self.value {
            if self.value_location_is_synthesized() {
                map.serialize_entry("value", &TermSansLocation(value))?;
            } else {
                map.serialize_entry("value", value)?;
            }
        }
        map.end()
    }
}

impl Serialize for Annotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        if !self.scope.is_empty() {
            map.serialize_entry("scope", &self.scope)?;
        }
        if !self.title.is_empty() {
            map.serialize_entry("title", &self.title)?;
        }
        if self.entrypoint {
            map.serialize_entry("entrypoint", &true)?;
        }
        if !self.description.is_empty() {
            map.serialize_entry("description", &self.description)?;
        }
        if !self.organizations.is_empty() {
            map.serialize_entry("organizations", &self.organizations)?;
        }
        if !self.related_resources.is_empty() {
            map.serialize_entry("related_resources", &RelatedResources(&self.related_resources))?;
        }
        if !self.authors.is_empty() {
            map.serialize_entry("authors", &AuthorsWire(&self.authors))?;
        }
        if !self.schemas.is_empty() {
            map.serialize_entry("schemas", &SchemasWire(&self.schemas))?;
        }
        if let Some(custom) = &self.custom {
            if !custom.is_empty() {
                map.serialize_entry("custom", custom)?;
            }
        }
        map.end()
    }
}

struct RelatedResources<'a>(&'a [crate::RelatedResource]);

impl Serialize for RelatedResources<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for resource in self.0 {
            seq.serialize_element(&RelatedResourceWire(resource))?;
        }
        seq.end()
    }
}

struct RelatedResourceWire<'a>(&'a crate::RelatedResource);

impl Serialize for RelatedResourceWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("ref", &self.0.reference)?;
        if !self.0.description.is_empty() {
            map.serialize_entry("description", &self.0.description)?;
        }
        map.end()
    }
}

struct AuthorsWire<'a>(&'a [crate::Author]);

impl Serialize for AuthorsWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for author in self.0 {
            seq.serialize_element(&AuthorWire(author))?;
        }
        seq.end()
    }
}

struct AuthorWire<'a>(&'a crate::Author);

impl Serialize for AuthorWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.0.name.is_empty() {
            map.serialize_entry("name", &self.0.name)?;
        }
        if !self.0.email.is_empty() {
            map.serialize_entry("email", &self.0.email)?;
        }
        map.end()
    }
}

struct SchemasWire<'a>(&'a [crate::SchemaAnnotation]);

impl Serialize for SchemasWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for schema in self.0 {
            seq.serialize_element(&SchemaWire(schema))?;
        }
        seq.end()
    }
}

struct SchemaWire<'a>(&'a crate::SchemaAnnotation);

impl Serialize for SchemaWire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.0.path.is_empty() {
            map.serialize_entry("path", &PlainRef(&self.0.path))?;
        }
        if !self.0.schema.is_empty() {
            map.serialize_entry("schema", &PlainRef(&self.0.schema))?;
        }
        if let Some(definition) = &self.0.definition {
            map.serialize_entry("definition", definition)?;
        }
        map.end()
    }
}

/// A ref flattened to its plain string segments, the shape schema
/// annotations use.
struct PlainRef<'a>(&'a [Term]);

impl Serialize for PlainRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for term in self.0 {
            seq.serialize_element(&term.value.segment_text())?;
        }
        seq.end()
    }
}

impl Serialize for Comment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("text", &STANDARD.encode(self.text.as_bytes()))?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", &location.compact())?;
        }
        map.end()
    }
}
