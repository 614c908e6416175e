//! Constraints recorded during inference.
//!
//! Inference does not unify eagerly. Each construct records [`Trait`]
//! obligations on the types involved; the solver discharges them once enough
//! is known. `TypesEq` is the only obligation that can always be acted on
//! immediately; the others wait for their bound type to become concrete.

use std::fmt;

use tern_ast::ScopeId;
use tern_types::Ty;

use crate::error::ConstraintOrigin;

/// A constraint on one or two types.
#[derive(Clone, Debug, PartialEq)]
pub enum Trait {
    /// `a` and `b` are the same type.
    TypesEq { a: Ty, b: Ty },
    /// `bound` supports `==` and `!=`.
    Eq { bound: Ty },
    /// `bound` supports `<`, `>`, `<=` and `>=`.
    Ord { bound: Ty },
    /// `bound` is a function type.
    Callable { bound: Ty },
    /// `bound` is a struct with a field `field` of type `field_ty`. By-name
    /// struct references are looked up from `scope`.
    HasField {
        bound: Ty,
        field: String,
        field_ty: Ty,
        scope: ScopeId,
    },
    /// `bound` can be cast to `to`.
    ConvertibleTo { bound: Ty, to: Ty },
}

impl Trait {
    /// The name diagnostics use for this trait.
    pub fn name(&self) -> String {
        match self {
            Trait::TypesEq { .. } => "TypesEq".to_string(),
            Trait::Eq { .. } => "Eq".to_string(),
            Trait::Ord { .. } => "Ord".to_string(),
            Trait::Callable { .. } => "Callable".to_string(),
            Trait::HasField { field, .. } => format!("HasField `{}`", field),
            Trait::ConvertibleTo { to, .. } => format!("ConvertibleTo `{}`", to),
        }
    }

    /// The type whose shape decides this obligation. `TypesEq` has none.
    pub fn bound(&self) -> Option<&Ty> {
        match self {
            Trait::TypesEq { .. } => None,
            Trait::Eq { bound }
            | Trait::Ord { bound }
            | Trait::Callable { bound }
            | Trait::HasField { bound, .. }
            | Trait::ConvertibleTo { bound, .. } => Some(bound),
        }
    }

    /// Apply `f` to every type the obligation mentions.
    pub fn map_types(self, mut f: impl FnMut(Ty) -> Ty) -> Trait {
        match self {
            Trait::TypesEq { a, b } => Trait::TypesEq { a: f(a), b: f(b) },
            Trait::Eq { bound } => Trait::Eq { bound: f(bound) },
            Trait::Ord { bound } => Trait::Ord { bound: f(bound) },
            Trait::Callable { bound } => Trait::Callable { bound: f(bound) },
            Trait::HasField {
                bound,
                field,
                field_ty,
                scope,
            } => Trait::HasField {
                bound: f(bound),
                field,
                field_ty: f(field_ty),
                scope,
            },
            Trait::ConvertibleTo { bound, to } => Trait::ConvertibleTo {
                bound: f(bound),
                to: f(to),
            },
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trait::TypesEq { a, b } => write!(f, "TypesEq({}, {})", a, b),
            Trait::Eq { bound } => write!(f, "Eq({})", bound),
            Trait::Ord { bound } => write!(f, "Ord({})", bound),
            Trait::Callable { bound } => write!(f, "Callable({})", bound),
            Trait::HasField {
                bound,
                field,
                field_ty,
                ..
            } => write!(f, "HasField({}, {}: {})", bound, field, field_ty),
            Trait::ConvertibleTo { bound, to } => write!(f, "ConvertibleTo({}, {})", bound, to),
        }
    }
}

/// A trait obligation together with the syntax that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Obligation {
    pub constraint: Trait,
    pub origin: ConstraintOrigin,
}

/// Obligations recorded since the last solve, in recording order.
#[derive(Debug, Default)]
pub struct ConstraintQueue {
    pending: Vec<Obligation>,
}

impl ConstraintQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, constraint: Trait, origin: ConstraintOrigin) {
        self.pending.push(Obligation { constraint, origin });
    }

    /// Record that `a` and `b` must be the same type.
    pub fn push_equal(&mut self, a: Ty, b: Ty, origin: ConstraintOrigin) {
        self.push(Trait::TypesEq { a, b }, origin);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every pending obligation.
    pub fn take(&mut self) -> Vec<Obligation> {
        std::mem::take(&mut self.pending)
    }

    /// Drop every pending obligation.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
