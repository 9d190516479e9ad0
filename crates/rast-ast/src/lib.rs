//! Rast AST - Typed representation of parsed Rego modules
//!
//! This crate defines the term/value tree, source locations, and the
//! module structure (package, imports, rules, annotations), along with
//! the serde encoding that produces the linter wire shape.

mod location;
mod term;
mod module;
mod annotations;
mod encode;

pub use location::*;
pub use term::*;
pub use module::*;
pub use annotations::*;
