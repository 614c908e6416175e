//! Syntax tree and scope tree for the Tern compiler front end.
//!
//! The type checker consumes a [`CompilationUnit`] whose nodes have been
//! stamped with the [`ScopeId`] they were bound in, plus the [`ScopeTree`]
//! holding every symbol. Parsing is not part of this crate: trees are built
//! by an external parser or with [`build::AstBuilder`], then bound with
//! [`bind::bind`].
//!
//! # Architecture
//!
//! - [`ast`]: expression and statement node types
//! - [`scope`]: scope arena, symbols, and the lookup queries used by inference
//! - [`bind`]: scope binder that declares symbols and stamps scope ids
//! - [`build`]: node constructors with automatically assigned spans

pub mod ast;
pub mod bind;
pub mod build;
pub mod scope;

pub use ast::*;
pub use scope::{ScopeId, ScopeTree, Symbol, SymbolId, SymbolKind};
