//! Structured metadata attached to packages and rules

use crate::{Location, Term};

/// Parsed `# METADATA` block contents.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// `package`, `subpackages`, `document`, or `rule`
    pub scope: String,
    pub title: String,
    pub entrypoint: bool,
    pub description: String,
    pub organizations: Vec<String>,
    pub related_resources: Vec<RelatedResource>,
    pub authors: Vec<Author>,
    pub schemas: Vec<SchemaAnnotation>,
    /// Free-form user data under the `custom` key
    pub custom: Option<serde_json::Map<String, serde_json::Value>>,
    pub location: Option<Location>,
}

impl Annotations {
    /// Whether this annotation belongs to the package node when
    /// encoding (document- and rule-scoped annotations belong to their
    /// owning rule).
    pub fn is_package_scope(&self) -> bool {
        self.scope != "document" && self.scope != "rule"
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelatedResource {
    pub reference: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// A `schemas` annotation entry: a ref to attach a schema to, plus
/// either a schema ref or an inline definition.
#[derive(Debug, Clone, Default)]
pub struct SchemaAnnotation {
    pub path: Vec<Term>,
    pub schema: Vec<Term>,
    pub definition: Option<serde_json::Value>,
}
