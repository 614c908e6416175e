//! Type representation for the Tern type checker.
//!
//! Defines the core `Ty` enum, nullary type constructors (`TyCon`), struct
//! layouts (`StructTy`), type variables (`TyVar`), and polymorphic type
//! schemes (`Scheme`). Syntax trees carry these types as annotations; the
//! checker in `tern-typeck` owns the unification table that gives type
//! variables their meaning.

pub mod ty;

pub use ty::{Scheme, StructTy, Ty, TyCon, TyVar};
