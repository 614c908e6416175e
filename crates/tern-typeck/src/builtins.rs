//! Compiler-known trait implementations.
//!
//! Registers which builtin types satisfy `Eq` and `Ord`, and which casts
//! between builtin types are allowed. The solver consults this table once an
//! obligation's bound type is concrete.

use rustc_hash::FxHashSet;
use tern_types::{StructTy, Ty};

/// Builtin trait implementations.
#[derive(Clone, Debug)]
pub struct TraitTable {
    eq: FxHashSet<String>,
    ord: FxHashSet<String>,
    conversions: FxHashSet<(String, String)>,
}

impl TraitTable {
    /// The table of implementations every compilation unit starts with:
    ///
    /// - `Eq`: `int`, `bool`, `char`, `unit`, and every pointer
    /// - `Ord`: `int`, `char`
    /// - casts: `int` to `char`, `char` to `int`, `bool` to `int`, any
    ///   pointer to any pointer, and any type to itself
    pub fn builtin() -> Self {
        let mut table = TraitTable {
            eq: FxHashSet::default(),
            ord: FxHashSet::default(),
            conversions: FxHashSet::default(),
        };

        // ── Eq ──────────────────────────────────────────────────────────

        for name in ["int", "bool", "char", "unit"] {
            table.register_eq(name);
        }

        // ── Ord ─────────────────────────────────────────────────────────

        for name in ["int", "char"] {
            table.register_ord(name);
        }

        // ── Conversions ─────────────────────────────────────────────────

        table.register_conversion("int", "char");
        table.register_conversion("char", "int");
        table.register_conversion("bool", "int");

        table
    }

    pub fn register_eq(&mut self, con: &str) {
        self.eq.insert(con.to_string());
    }

    pub fn register_ord(&mut self, con: &str) {
        self.ord.insert(con.to_string());
    }

    pub fn register_conversion(&mut self, from: &str, to: &str) {
        self.conversions.insert((from.to_string(), to.to_string()));
    }

    /// Whether the concrete type `ty` supports equality.
    pub fn satisfies_eq(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Con(c) => self.eq.contains(&c.name),
            Ty::Ptr(_) => true,
            _ => false,
        }
    }

    /// Whether the concrete type `ty` supports ordering.
    pub fn satisfies_ord(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Con(c) => self.ord.contains(&c.name),
            _ => false,
        }
    }

    /// Whether a value of type `from` may be cast to `to`. Both types must
    /// be fully resolved.
    pub fn converts(&self, from: &Ty, to: &Ty) -> bool {
        if from == to {
            return true;
        }
        match (from, to) {
            (Ty::Ptr(_), Ty::Ptr(_)) => true,
            // A declared struct converts to itself under any of its names.
            (
                Ty::Struct(StructTy { name: Some(a), .. }),
                Ty::Struct(StructTy { name: Some(b), .. }),
            ) => a == b,
            (Ty::Struct(StructTy { name: Some(n), .. }), Ty::Con(c))
            | (Ty::Con(c), Ty::Struct(StructTy { name: Some(n), .. })) => c.name == *n,
            (Ty::Con(a), Ty::Con(b)) => self
                .conversions
                .contains(&(a.name.clone(), b.name.clone())),
            _ => false,
        }
    }
}

impl Default for TraitTable {
    fn default() -> Self {
        Self::builtin()
    }
}
