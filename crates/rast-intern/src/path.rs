//! Ref construction from plain dotted paths
//!
//! A lightweight alternative to parsing for the common case of a simple
//! string path like `data.config.rules`: no vars, numbers, or brackets,
//! just interned string segments behind a root-document head. Suitable
//! for building parsed queries and lookup refs. The returned terms may
//! share interned payloads, so callers must not attach locations or
//! otherwise rework them in place.

use crate::{string_term, var_term};
use rast_ast::Term;

/// Build a ref from a dotted path. The first segment becomes the head
/// var (`data` and `input` resolve to the root documents), the rest
/// become string segments. Empty segments are dropped.
pub fn ref_from_path(path: &str) -> Vec<Term> {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or("");

    let mut terms = Vec::with_capacity(path.matches('.').count() + 1);
    terms.push(var_term(head));

    for segment in segments {
        if !segment.is_empty() {
            terms.push(string_term(segment));
        }
    }

    terms
}

/// The plain string segments of a ref, without the leading root
/// document. `data.foo.bar` yields `["foo", "bar"]`.
pub fn unquoted_path(path: &[Term]) -> Vec<String> {
    path.iter()
        .skip(1)
        .map(|term| term.value.segment_text().into_owned())
        .collect()
}
