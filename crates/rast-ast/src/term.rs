//! Terms and the closed value type

use crate::{Body, Location};
use std::borrow::Cow;
use std::sync::Arc;

/// An arbitrary-precision number kept as decimal text.
///
/// Numbers are never stored as machine floats; the text form is what
/// the parser produced or what a conversion formatted, so values like
/// `1.00000000000000001` survive a round trip untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(pub Arc<str>);

impl Number {
    pub fn from_text(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn from_i64(i: i64) -> Self {
        Self(i.to_string().into())
    }

    /// Shortest round-trippable decimal form of a float.
    pub fn from_f64(f: f64) -> Self {
        Self(f.to_string().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A value with an optional source location.
#[derive(Debug, Clone)]
pub struct Term {
    pub location: Option<Location>,
    pub value: Value,
}

impl Term {
    pub fn new(value: Value) -> Self {
        Self {
            location: None,
            value,
        }
    }

    pub fn with_location(value: Value, location: Location) -> Self {
        Self {
            location: Some(location),
            value,
        }
    }

    /// Whether this term is one of the root document vars.
    pub fn is_root_document(&self) -> bool {
        matches!(&self.value, Value::Var(v) if &**v == "data" || &**v == "input")
    }
}

// Term equality is value equality; locations never participate, so a
// set cannot hold the same value twice just because it was written in
// two places.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Term {}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::new(value)
    }
}

/// The closed set of value kinds a term can hold.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(Number),
    String(Arc<str>),
    /// An identifier
    Var(Arc<str>),
    /// A dotted/indexed path: `data.foo[x]`
    Ref(Vec<Term>),
    /// Operator plus operands
    Call(Vec<Term>),
    Array(Vec<Term>),
    /// Unique keys; iteration follows insertion order
    Object(Vec<(Term, Term)>),
    /// Deduplicated by structural equality; order carries no meaning
    Set(Vec<Term>),
    ArrayComprehension {
        term: Box<Term>,
        body: Body,
    },
    SetComprehension {
        term: Box<Term>,
        body: Body,
    },
    ObjectComprehension {
        key: Box<Term>,
        value: Box<Term>,
        body: Body,
    },
}

impl Value {
    /// The discriminator name used on the wire for this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Var(_) => "var",
            Value::Ref(_) => "ref",
            Value::Call(_) => "call",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Set(_) => "set",
            Value::ArrayComprehension { .. } => "arraycomprehension",
            Value::SetComprehension { .. } => "setcomprehension",
            Value::ObjectComprehension { .. } => "objectcomprehension",
        }
    }

    pub fn string(s: impl Into<Arc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn var(s: impl Into<Arc<str>>) -> Value {
        Value::Var(s.into())
    }

    pub fn number(text: impl Into<Arc<str>>) -> Value {
        Value::Number(Number::from_text(text))
    }

    /// Canonical empty array. `Vec::new` allocates nothing, so every
    /// call yields the one empty representation.
    pub fn empty_array() -> Value {
        Value::Array(Vec::new())
    }

    /// Canonical empty object.
    pub fn empty_object() -> Value {
        Value::Object(Vec::new())
    }

    /// Build an object, later values replacing earlier ones on key
    /// collision.
    pub fn object_from(pairs: impl IntoIterator<Item = (Term, Term)>) -> Value {
        let pairs = pairs.into_iter();
        let mut entries: Vec<(Term, Term)> = Vec::with_capacity(pairs.size_hint().0);
        for (key, value) in pairs {
            if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
                existing.1 = value;
            } else {
                entries.push((key, value));
            }
        }
        Value::Object(entries)
    }

    /// Build a set, dropping structural duplicates.
    pub fn set_from(terms: impl IntoIterator<Item = Term>) -> Value {
        let terms = terms.into_iter();
        let mut out: Vec<Term> = Vec::with_capacity(terms.size_hint().0);
        for term in terms {
            if !out.contains(&term) {
                out.push(term);
            }
        }
        Value::Set(out)
    }

    /// Text form of a ref segment, used where a ref is flattened to a
    /// plain string path (annotation schema refs).
    pub fn segment_text(&self) -> Cow<'_, str> {
        match self {
            Value::String(s) | Value::Var(s) => Cow::Borrowed(s),
            Value::Number(n) => Cow::Borrowed(n.as_str()),
            Value::Boolean(b) => Cow::Owned(b.to_string()),
            Value::Null => Cow::Borrowed("null"),
            other => Cow::Borrowed(other.type_name()),
        }
    }
}

// Objects compare as unordered key/value mappings and sets as unordered
// collections; everything else is positional.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Var(a), Value::Var(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            (Value::Call(a), Value::Call(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().any(|(bk, bv)| bk == k && bv == v))
            }
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|t| b.contains(t))
            }
            (
                Value::ArrayComprehension { term: at, body: ab },
                Value::ArrayComprehension { term: bt, body: bb },
            ) => at == bt && ab == bb,
            (
                Value::SetComprehension { term: at, body: ab },
                Value::SetComprehension { term: bt, body: bb },
            ) => at == bt && ab == bb,
            (
                Value::ObjectComprehension {
                    key: ak,
                    value: av,
                    body: ab,
                },
                Value::ObjectComprehension {
                    key: bk,
                    value: bv,
                    body: bb,
                },
            ) => ak == bk && av == bv && ab == bb,
            _ => false,
        }
    }
}

impl Eq for Value {}
