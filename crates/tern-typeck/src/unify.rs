//! Unification engine for Hindley-Milner type inference.
//!
//! Implements the core unification algorithm using `ena`'s union-find table.
//! Supports the occurs check, generalization against the free variables of
//! the surrounding environment, and scheme instantiation.

use ena::unify::InPlaceUnificationTable;
use rustc_hash::{FxHashMap, FxHashSet};
use tern_types::{Scheme, StructTy, Ty, TyVar};

use crate::error::{ConstraintOrigin, TypeError};

/// Fresh variables chosen for a scheme's quantified variables during one
/// instantiation. Sharing the map across several instantiations makes them
/// agree on the substitution.
pub type KnownParams = FxHashMap<TyVar, Ty>;

/// The inference context: owns the unification table.
///
/// Every type variable of a compilation unit is minted here, and all
/// equalities between types are recorded through [`InferCtx::unify`].
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
}

impl InferCtx {
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
        }
    }

    // ── Type Variable Creation ──────────────────────────────────────────

    /// Create a fresh, unbound type variable.
    pub fn fresh_var(&mut self) -> Ty {
        Ty::Var(self.table.new_key(None))
    }

    /// Number of variables minted so far.
    pub fn var_count(&self) -> usize {
        self.table.len()
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Shallow resolution: follow variable links until reaching a
    /// non-variable or an unbound variable's class representative. Children
    /// of the result are left untouched.
    pub fn find_leader(&mut self, ty: &Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(*v) {
                Some(inner) => self.find_leader(&inner),
                None => Ty::Var(self.table.find(*v)),
            },
            other => other.clone(),
        }
    }

    /// Deep resolution: replace every bound variable, at any depth, by its
    /// value. Unbound variables are normalized to their class root so that
    /// unified-but-unbound variables print and generalize as one.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        self.resolve_except(ty, &[])
    }

    /// Resolve the monomorphic part of a scheme. Quantified variables are
    /// kept as they are, so a scheme reads the same however its uses were
    /// unified.
    pub fn resolve_scheme(&mut self, scheme: Scheme) -> Scheme {
        let ty = self.resolve_except(scheme.ty, &scheme.vars);
        Scheme {
            vars: scheme.vars,
            ty,
        }
    }

    fn resolve_except(&mut self, ty: Ty, quantified: &[TyVar]) -> Ty {
        match ty {
            Ty::Var(v) if quantified.contains(&v) => ty,
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve_except(inner, quantified),
                None => Ty::Var(self.table.find(v)),
            },
            Ty::Con(_) => ty,
            Ty::Ptr(inner) => Ty::Ptr(Box::new(self.resolve_except(*inner, quantified))),
            Ty::Fun(params, ret) => {
                let params = params
                    .into_iter()
                    .map(|p| self.resolve_except(p, quantified))
                    .collect();
                let ret = Box::new(self.resolve_except(*ret, quantified));
                Ty::Fun(params, ret)
            }
            Ty::Struct(s) => Ty::Struct(StructTy {
                name: s.name,
                fields: s
                    .fields
                    .into_iter()
                    .map(|(name, t)| (name, self.resolve_except(t, quantified)))
                    .collect(),
            }),
        }
    }

    // ── Occurs Check ────────────────────────────────────────────────────

    /// Whether `var` occurs anywhere within `ty`, following bindings.
    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if self.table.find(*v) == self.table.find(var) {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Con(_) => false,
            Ty::Ptr(inner) => self.occurs_in(var, inner),
            Ty::Fun(params, ret) => {
                params.iter().any(|p| self.occurs_in(var, p)) || self.occurs_in(var, ret)
            }
            Ty::Struct(s) => s.fields.iter().any(|(_, t)| self.occurs_in(var, t)),
        }
    }

    // ── Unification ─────────────────────────────────────────────────────

    /// Unify two types, making them equal.
    ///
    /// Both sides are resolved to their leaders first. Constructors must
    /// match by name; a constructor naming a struct type equals the struct
    /// declared under that name. Structs with the same declaring name are
    /// compared field by field; anonymous layouts are compared structurally.
    pub fn unify(&mut self, a: Ty, b: Ty, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let a = self.find_leader(&a);
        let b = self.find_leader(&b);
        tracing::trace!(%a, %b, "unify");

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            (Ty::Var(v1), Ty::Var(v2)) => {
                self.table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound vars should not fail");
                Ok(())
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(v, &ty) {
                    let ty = self.resolve(ty);
                    return Err(TypeError::OccursCheck { var: v, ty, origin });
                }
                self.table
                    .unify_var_value(v, Some(ty))
                    .expect("binding an unbound var after the occurs check should not fail");
                Ok(())
            }

            (Ty::Con(c1), Ty::Con(c2)) => {
                if c1 == c2 {
                    Ok(())
                } else {
                    Err(TypeError::Mismatch {
                        expected: Ty::Con(c1),
                        found: Ty::Con(c2),
                        origin,
                    })
                }
            }

            (Ty::Ptr(p1), Ty::Ptr(p2)) => self.unify(*p1, *p2, origin),

            (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => {
                if p1.len() != p2.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: p1.len(),
                        found: p2.len(),
                        origin,
                    });
                }
                for (a, b) in p1.into_iter().zip(p2) {
                    self.unify(a, b, origin.clone())?;
                }
                self.unify(*r1, *r2, origin)
            }

            // A by-name reference to a struct type is the struct itself.
            (Ty::Con(ref c), Ty::Struct(StructTy { name: Some(ref n), .. }))
            | (Ty::Struct(StructTy { name: Some(ref n), .. }), Ty::Con(ref c))
                if c.name == *n =>
            {
                Ok(())
            }

            (Ty::Struct(s1), Ty::Struct(s2)) => self.unify_structs(s1, s2, origin),

            (a, b) => Err(TypeError::Mismatch {
                expected: self.resolve(a),
                found: self.resolve(b),
                origin,
            }),
        }
    }

    fn unify_structs(
        &mut self,
        s1: StructTy,
        s2: StructTy,
        origin: ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let same_name = matches!((&s1.name, &s2.name), (Some(a), Some(b)) if a == b);
        let both_named = s1.name.is_some() && s2.name.is_some();
        if both_named && !same_name {
            return Err(TypeError::Mismatch {
                expected: Ty::Struct(s1),
                found: Ty::Struct(s2),
                origin,
            });
        }
        if s1.fields.len() != s2.fields.len() {
            return Err(TypeError::ArityMismatch {
                expected: s1.fields.len(),
                found: s2.fields.len(),
                origin,
            });
        }
        if s1
            .fields
            .iter()
            .zip(&s2.fields)
            .any(|((n1, _), (n2, _))| n1 != n2)
        {
            return Err(TypeError::Mismatch {
                expected: self.resolve(Ty::Struct(s1)),
                found: self.resolve(Ty::Struct(s2)),
                origin,
            });
        }
        for ((_, t1), (_, t2)) in s1.fields.into_iter().zip(s2.fields) {
            self.unify(t1, t2, origin.clone())?;
        }
        Ok(())
    }

    // ── Free Variables ──────────────────────────────────────────────────

    /// Unbound variables of `ty` after resolution, as class roots, in
    /// first-occurrence order.
    pub fn free_vars(&mut self, ty: &Ty) -> Vec<TyVar> {
        self.resolve(ty.clone()).vars()
    }

    /// Free variables of a scheme: those of its type that it does not
    /// quantify over.
    pub fn scheme_free_vars(&mut self, scheme: &Scheme) -> Vec<TyVar> {
        let mut quantified = FxHashSet::default();
        for v in &scheme.vars {
            quantified.insert(*v);
            quantified.insert(self.table.find(*v));
        }
        self.free_vars(&scheme.ty)
            .into_iter()
            .filter(|v| !quantified.contains(v))
            .collect()
    }

    // ── Generalization ──────────────────────────────────────────────────

    /// Generalize `ty` into a scheme quantifying every free variable not in
    /// `env_vars`. `env_vars` must hold class roots, as returned by
    /// [`InferCtx::free_vars`].
    pub fn generalize(&mut self, ty: Ty, env_vars: &FxHashSet<TyVar>) -> Scheme {
        let resolved = self.resolve(ty);
        let vars = resolved
            .vars()
            .into_iter()
            .filter(|v| !env_vars.contains(v))
            .collect();
        Scheme { vars, ty: resolved }
    }

    // ── Instantiation ───────────────────────────────────────────────────

    /// Instantiate a scheme with fresh variables for its quantified
    /// variables.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        let mut known = KnownParams::default();
        self.instantiate_with(scheme, &mut known)
    }

    /// Instantiate a scheme, reusing the substitution recorded in `known`
    /// and extending it for quantified variables seen for the first time.
    pub fn instantiate_with(&mut self, scheme: &Scheme, known: &mut KnownParams) -> Ty {
        if scheme.is_mono() {
            return scheme.ty.clone();
        }
        self.substitute(&scheme.ty, &scheme.vars, known)
    }

    fn substitute(&mut self, ty: &Ty, quantified: &[TyVar], known: &mut KnownParams) -> Ty {
        match ty {
            Ty::Var(v) if quantified.contains(v) => {
                if let Some(fresh) = known.get(v) {
                    return fresh.clone();
                }
                let fresh = self.fresh_var();
                known.insert(*v, fresh.clone());
                fresh
            }
            Ty::Var(v) => match self.table.probe_value(*v) {
                Some(inner) => self.substitute(&inner, quantified, known),
                None => ty.clone(),
            },
            Ty::Con(_) => ty.clone(),
            Ty::Ptr(inner) => Ty::Ptr(Box::new(self.substitute(inner, quantified, known))),
            Ty::Fun(params, ret) => {
                let params = params
                    .iter()
                    .map(|p| self.substitute(p, quantified, known))
                    .collect();
                let ret = Box::new(self.substitute(ret, quantified, known));
                Ty::Fun(params, ret)
            }
            Ty::Struct(s) => Ty::Struct(StructTy {
                name: s.name.clone(),
                fields: s
                    .fields
                    .iter()
                    .map(|(name, t)| (name.clone(), self.substitute(t, quantified, known)))
                    .collect(),
            }),
        }
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
