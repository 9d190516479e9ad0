//! Rast - Rego AST transcoding for lint tooling
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use rast_ast as ast;
pub use rast_intern as intern;
pub use rast_transform as transform;
