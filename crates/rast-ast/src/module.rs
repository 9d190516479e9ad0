//! Module structure: package, imports, rules, and rule bodies

use crate::{Annotations, Location, Term};

/// A parsed Rego module.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub package: Option<Package>,
    pub imports: Vec<Import>,
    pub rules: Vec<Rule>,
    pub comments: Vec<Comment>,
    /// All annotations of the module, regardless of scope. Rule-scoped
    /// entries are also referenced from their owning rule.
    pub annotations: Vec<Annotations>,
    pub rego_version: RegoVersion,
}

/// The Rego language version a module was parsed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegoVersion {
    V0,
    #[default]
    V1,
    /// v0 parsed for v1 compatibility
    V0CompatV1,
    Unknown,
}

impl RegoVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegoVersion::V0 => "v0",
            RegoVersion::V1 => "v1",
            RegoVersion::V0CompatV1 => "v0v1",
            RegoVersion::Unknown => "unknown",
        }
    }
}

/// `package` declaration: a root-document-headed path.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub path: Vec<Term>,
    pub location: Option<Location>,
}

/// `import` declaration.
#[derive(Debug, Clone)]
pub struct Import {
    /// A term holding the imported ref
    pub path: Term,
    pub alias: Option<String>,
    pub location: Option<Location>,
}

impl Import {
    pub fn new(path: Term) -> Self {
        Self {
            path,
            alias: None,
            location: None,
        }
    }
}

/// A rule, chained to any `else` alternatives.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub head: Option<Head>,
    pub body: Body,
    pub else_rule: Option<Box<Rule>>,
    pub default: bool,
    pub annotations: Vec<Annotations>,
    pub location: Option<Location>,
}

impl Rule {
    /// Whether the body was synthesized by the parser rather than
    /// written in the source. Synthesized bodies are skipped when
    /// encoding, as they would only add misleading structure.
    ///
    /// A body counts as synthesized for a default rule, an empty body,
    /// a leading expression the parser marked generated, or a leading
    /// expression whose location coincides with the rule or head
    /// (the shape the parser produces for bodiless rules).
    pub fn body_is_generated(&self) -> bool {
        if self.default {
            return true;
        }

        let Some(first) = self.body.exprs().first() else {
            return true;
        };

        if first.generated {
            return true;
        }

        if first.location.is_some() && first.location == self.location {
            return true;
        }

        if let Some(head) = &self.head {
            if first.location.is_some() && first.location == head.location {
                return true;
            }
            if let Some(value) = &head.value {
                if first.location.is_some() && first.location == value.location {
                    return true;
                }
            }
        }

        false
    }
}

/// A rule head: what the rule produces.
#[derive(Debug, Clone, Default)]
pub struct Head {
    /// The ref the rule is defined under (e.g. `allow`, `a.b.c`)
    pub reference: Vec<Term>,
    pub args: Vec<Term>,
    pub assign: bool,
    pub key: Option<Term>,
    pub value: Option<Term>,
    pub location: Option<Location>,
}

impl Head {
    /// Whether the head value was synthesized by the parser (a bare
    /// `allow if { ... }` gets a `true` value sharing the head's own
    /// position). Synthesized values are encoded without a location.
    pub fn value_location_is_synthesized(&self) -> bool {
        match (&self.value, &self.location) {
            (Some(value), Some(head_loc)) => value
                .location
                .as_ref()
                .is_some_and(|vl| vl.row == head_loc.row && vl.col == head_loc.col),
            _ => false,
        }
    }
}

/// An ordered sequence of expressions forming a rule body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body(Vec<Expr>);

impl Body {
    pub fn new(exprs: Vec<Expr>) -> Self {
        Self(exprs)
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.0
    }

    pub fn push(&mut self, expr: Expr) {
        self.0.push(expr);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.0.iter()
    }
}

impl From<Vec<Expr>> for Body {
    fn from(exprs: Vec<Expr>) -> Self {
        Body(exprs)
    }
}

/// A single expression in a rule body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expr {
    pub terms: Option<ExprTerms>,
    pub negated: bool,
    /// Set by the parser for expressions it synthesized
    pub generated: bool,
    pub with: Vec<With>,
    pub location: Option<Location>,
}

impl Expr {
    pub fn new(terms: ExprTerms) -> Self {
        Self {
            terms: Some(terms),
            ..Self::default()
        }
    }
}

/// The payload of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprTerms {
    /// A single term, e.g. `true` or `input.x`
    Single(Term),
    /// An operator term followed by its operands
    Sequence(Vec<Term>),
    Some(SomeDecl),
    Every(Every),
}

/// `with` modifier on an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct With {
    pub target: Term,
    pub value: Term,
    pub location: Option<Location>,
}

/// `some x, y` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SomeDecl {
    pub symbols: Vec<Term>,
    pub location: Option<Location>,
}

/// `every k, v in domain { ... }` quantifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Every {
    pub key: Option<Term>,
    pub value: Term,
    pub domain: Term,
    pub body: Body,
    pub location: Option<Location>,
}

/// A source comment. `text` is the content after the `#` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub location: Option<Location>,
}

impl Comment {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        Self {
            text: text.into(),
            location: Some(location),
        }
    }
}
