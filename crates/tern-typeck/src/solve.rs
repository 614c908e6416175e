//! Deferred constraint solver.
//!
//! Discharges the obligations recorded by inference. Each pass visits every
//! pending obligation once: `TypesEq` always unifies, and the remaining
//! traits are decided as soon as their bound type's leader is no longer a
//! variable. An obligation that cannot be decided yet is kept for the next
//! pass. Solving stops once the queue is empty, or when a full pass decides
//! nothing, in which case the first stuck obligation is reported as
//! unresolved.

use tern_ast::{ScopeTree, SymbolKind};
use tern_types::{StructTy, Ty};

use crate::builtins::TraitTable;
use crate::error::{ConstraintOrigin, TypeError};
use crate::traits::{Obligation, Trait};
use crate::unify::InferCtx;

/// Outcome of looking at one obligation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Progress {
    Discharged,
    Deferred,
}

pub struct Solver<'a> {
    ctx: &'a mut InferCtx,
    scopes: &'a ScopeTree,
    traits: &'a TraitTable,
    max_passes: usize,
}

impl<'a> Solver<'a> {
    pub fn new(
        ctx: &'a mut InferCtx,
        scopes: &'a ScopeTree,
        traits: &'a TraitTable,
        max_passes: usize,
    ) -> Self {
        Solver {
            ctx,
            scopes,
            traits,
            max_passes,
        }
    }

    /// Discharge every obligation in `pending`, or fail with the first error.
    pub fn solve(&mut self, mut pending: Vec<Obligation>) -> Result<(), TypeError> {
        tracing::debug!(obligations = pending.len(), "solving constraints");
        let mut passes = 0;
        while !pending.is_empty() {
            passes += 1;
            let mut progressed = false;
            let mut deferred = Vec::new();
            for obligation in pending {
                match self.discharge(&obligation)? {
                    Progress::Discharged => progressed = true,
                    Progress::Deferred => deferred.push(obligation),
                }
            }
            if deferred.is_empty() {
                break;
            }
            if !progressed || passes >= self.max_passes {
                tracing::debug!(
                    passes,
                    stuck = deferred.len(),
                    "solver made no progress"
                );
                let stuck = deferred.remove(0);
                let constraint = stuck.constraint.map_types(|ty| self.ctx.resolve(ty));
                return Err(TypeError::UnresolvedConstraint {
                    constraint: constraint.to_string(),
                    origin: stuck.origin,
                });
            }
            pending = deferred;
        }
        tracing::debug!(passes, "constraints solved");
        Ok(())
    }

    fn discharge(&mut self, obligation: &Obligation) -> Result<Progress, TypeError> {
        let origin = &obligation.origin;
        if let Trait::TypesEq { a, b } = &obligation.constraint {
            self.ctx.unify(a.clone(), b.clone(), origin.clone())?;
            return Ok(Progress::Discharged);
        }

        let Some(bound) = obligation.constraint.bound() else {
            return Ok(Progress::Discharged);
        };
        let leader = self.ctx.find_leader(bound);
        if let Ty::Var(v) = leader {
            tracing::trace!(
                constraint = %obligation.constraint,
                var = v.0,
                "deferring obligation on unbound variable"
            );
            return Ok(Progress::Deferred);
        }

        let satisfied = match &obligation.constraint {
            Trait::TypesEq { .. } => true,
            Trait::Eq { .. } => self.traits.satisfies_eq(&leader),
            Trait::Ord { .. } => self.traits.satisfies_ord(&leader),
            Trait::Callable { .. } => matches!(leader, Ty::Fun(..)),
            Trait::HasField {
                field,
                field_ty,
                scope,
                ..
            } => match self.struct_layout(&leader, *scope) {
                Some(layout) => match layout.field(field) {
                    Some(declared) => {
                        self.ctx
                            .unify(declared.clone(), field_ty.clone(), origin.clone())?;
                        true
                    }
                    None => false,
                },
                None => false,
            },
            Trait::ConvertibleTo { to, .. } => {
                let from = self.ctx.resolve(leader.clone());
                let to = self.ctx.resolve(to.clone());
                self.traits.converts(&from, &to)
            }
        };

        if satisfied {
            Ok(Progress::Discharged)
        } else {
            Err(self.not_satisfied(leader, &obligation.constraint, origin))
        }
    }

    /// The struct layout `ty` denotes: a struct itself, or a non-builtin
    /// constructor naming a struct type visible from `scope`.
    fn struct_layout(&self, ty: &Ty, scope: tern_ast::ScopeId) -> Option<StructTy> {
        match ty {
            Ty::Struct(s) => Some(s.clone()),
            Ty::Con(c) if !c.is_builtin() => {
                let id = self.scopes.retrieve_symbol(scope, &c.name)?;
                let symbol = self.scopes.symbol(id);
                if symbol.kind != SymbolKind::Type {
                    return None;
                }
                match symbol.ty.as_ref().map(|scheme| &scheme.ty) {
                    Some(Ty::Struct(s)) => Some(s.clone()),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn not_satisfied(&mut self, ty: Ty, constraint: &Trait, origin: &ConstraintOrigin) -> TypeError {
        TypeError::TraitNotSatisfied {
            ty: self.ctx.resolve(ty),
            trait_name: constraint.name(),
            origin: origin.clone(),
        }
    }
}
