//! Shared types for the Tern compiler front end.
//!
//! Every phase reports positions as byte-offset [`Span`]s into the source of
//! the compilation unit; diagnostics turn them into line/column positions.

pub mod span;

pub use span::Span;
