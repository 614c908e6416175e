//! Tern type checker: Hindley-Milner type inference with deferred traits.
//!
//! This crate infers a type for every expression of a bound Tern
//! compilation unit, checks builtin trait obligations, and generalizes
//! top-level functions for let-polymorphism:
//!
//! - Hindley-Milner inference with let-polymorphism at the top level
//! - Unification with occurs check over an `ena` union-find table
//! - Deferred `Eq`, `Ord`, `Callable`, `HasField` and `ConvertibleTo`
//!   obligations, discharged once their types are known
//!
//! # Architecture
//!
//! - [`unify`]: Unification engine, generalization and instantiation
//! - [`traits`]: Constraint vocabulary and the pending-obligation queue
//! - [`builtins`]: Compiler-known trait implementations
//! - [`infer`]: The inference visitor
//! - [`solve`]: The worklist solver
//! - [`error`]: Type error types with provenance tracking
//! - [`diagnostics`]: Ariadne rendering of type errors
//! - [`config`]: TOML checker settings

pub mod builtins;
pub mod config;
pub mod diagnostics;
pub mod error;
mod infer;
pub mod solve;
pub mod traits;
pub mod unify;

use rustc_hash::FxHashMap;
use tern_ast::{CompilationUnit, ScopeTree};
use tern_common::Span;
use tern_types::{Scheme, Ty};

use crate::config::{DiagnosticsConfig, TypeckConfig};
use crate::diagnostics::{render_diagnostic, DiagnosticOptions};
use crate::error::TypeError;

/// The result of type checking a Tern compilation unit.
#[derive(Debug)]
pub struct TypeckResult {
    /// Inferred types of literals, field accesses and declarations, keyed
    /// by the span of the node.
    pub types: FxHashMap<Span, Ty>,
    /// Generalized types of top-level functions.
    pub schemes: FxHashMap<String, Scheme>,
    /// Resolved type of every symbol in the root scope that has one.
    pub globals: FxHashMap<String, Scheme>,
    /// Type errors found during checking, one per failed top-level
    /// statement, in source order.
    pub errors: Vec<TypeError>,
    /// The type of the last top-level statement, or `None` if it failed.
    pub result_type: Option<Ty>,
}

impl TypeckResult {
    /// Render every error with ariadne.
    pub fn render_errors(
        &self,
        source: &str,
        filename: &str,
        options: &DiagnosticOptions,
    ) -> Vec<String> {
        self.errors
            .iter()
            .map(|err| render_diagnostic(err, source, filename, options))
            .collect()
    }

    /// Render every error with the `[diagnostics]` settings of a
    /// configuration: its filename and colour switch.
    pub fn render_with_config(&self, source: &str, config: &DiagnosticsConfig) -> Vec<String> {
        self.render_errors(source, &config.filename, &DiagnosticOptions::from(config))
    }

    /// The generalized top-level schemes as a JSON object mapping each
    /// function name to its printed scheme.
    pub fn schemes_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .schemes
            .iter()
            .map(|(name, scheme)| (name.clone(), serde_json::Value::String(scheme.to_string())))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Type-check a bound compilation unit with the default settings.
///
/// This is the main entry point for the type checker. `scopes` must be the
/// tree `unit` was bound against; function symbols receive their
/// generalized schemes.
pub fn check(unit: &CompilationUnit, scopes: &mut ScopeTree) -> TypeckResult {
    check_with_config(unit, scopes, &TypeckConfig::default())
}

/// Type-check a bound compilation unit.
pub fn check_with_config(
    unit: &CompilationUnit,
    scopes: &mut ScopeTree,
    config: &TypeckConfig,
) -> TypeckResult {
    tracing::debug!(statements = unit.stmts.len(), "checking compilation unit");
    infer::infer_unit(unit, scopes, config)
}
