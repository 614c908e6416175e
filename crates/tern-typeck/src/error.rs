//! Type error types with provenance tracking.
//!
//! Every constraint the checker records carries a `ConstraintOrigin` naming
//! the syntax that produced it, so a failure can point at the argument,
//! operand or branch responsible rather than at the whole declaration.

use tern_common::Span;
use tern_types::{Ty, TyVar};
use thiserror::Error;

/// Where in the source a constraint was generated.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintOrigin {
    /// `f(x)`: the argument's type must match the parameter's.
    FnArg {
        call_site: Span,
        arg_span: Span,
        param_idx: usize,
    },
    /// The callee of `f(...)` must be a function of the call's shape.
    Callee { call_site: Span },
    /// `-x` / `!x`: the operand must be `int` / `bool`.
    UnaryOp { op_span: Span, operand_span: Span },
    /// `a + b`: the right operand must be `int`.
    BinOp { op_span: Span, operand_span: Span },
    /// `a < b`: both operands share a type that supports the comparison.
    Comparison { op_span: Span },
    /// The condition of an `if` must be `bool`.
    Condition { cond_span: Span },
    /// Both branches of an `if` have the same type.
    IfBranches {
        if_span: Span,
        then_span: Span,
        else_span: Option<Span>,
    },
    /// `*p`: the operand must be a pointer.
    Deref { span: Span },
    /// `new[n] T`: the size must be `int`.
    AllocSize { span: Span },
    /// A positional value in `Name { ... }` must match the declared field.
    StructField {
        init_span: Span,
        value_span: Span,
        field: String,
    },
    /// `e.field`: the base must be a struct with that field.
    FieldAccess { span: Span },
    /// `e as T`: the source type must convert to `T`.
    Cast { span: Span },
    /// `var x = e`: the variable takes the initializer's type.
    LetBinding { binding_span: Span, value_span: Span },
    /// A formal parameter's symbol matches its slot in the signature.
    Param { param_span: Span },
    /// A function's inferred shape matches its declared symbol type.
    FnSignature { fn_span: Span },
    /// A function's body produces its result type.
    FnBody { fn_span: Span, body_span: Span },
    /// `return e` must match the enclosing function's result type.
    Return { return_span: Span, value_span: Span },
    /// `lhs = rhs`: both sides must have the same type.
    Assignment { lhs_span: Span, rhs_span: Span },
    /// Synthetic origin for checker-internal constraints.
    Builtin,
}

impl ConstraintOrigin {
    /// The span a diagnostic for this constraint should point at.
    pub fn span(&self) -> Option<Span> {
        match self {
            ConstraintOrigin::FnArg { arg_span, .. } => Some(*arg_span),
            ConstraintOrigin::Callee { call_site } => Some(*call_site),
            ConstraintOrigin::UnaryOp { operand_span, .. } => Some(*operand_span),
            ConstraintOrigin::BinOp { operand_span, .. } => Some(*operand_span),
            ConstraintOrigin::Comparison { op_span } => Some(*op_span),
            ConstraintOrigin::Condition { cond_span } => Some(*cond_span),
            ConstraintOrigin::IfBranches {
                else_span,
                then_span,
                ..
            } => Some(else_span.unwrap_or(*then_span)),
            ConstraintOrigin::Deref { span } => Some(*span),
            ConstraintOrigin::AllocSize { span } => Some(*span),
            ConstraintOrigin::StructField { value_span, .. } => Some(*value_span),
            ConstraintOrigin::FieldAccess { span } => Some(*span),
            ConstraintOrigin::Cast { span } => Some(*span),
            ConstraintOrigin::LetBinding { value_span, .. } => Some(*value_span),
            ConstraintOrigin::Param { param_span } => Some(*param_span),
            ConstraintOrigin::FnSignature { fn_span } => Some(*fn_span),
            ConstraintOrigin::FnBody { body_span, .. } => Some(*body_span),
            ConstraintOrigin::Return { value_span, .. } => Some(*value_span),
            ConstraintOrigin::Assignment { rhs_span, .. } => Some(*rhs_span),
            ConstraintOrigin::Builtin => None,
        }
    }

    /// A short label describing what the constraint was checking.
    pub fn describe(&self) -> String {
        match self {
            ConstraintOrigin::FnArg { param_idx, .. } => {
                format!("argument {} of this call", param_idx + 1)
            }
            ConstraintOrigin::Callee { .. } => "callee of this call".to_string(),
            ConstraintOrigin::UnaryOp { .. } => "operand of this unary operator".to_string(),
            ConstraintOrigin::BinOp { .. } => "operand of this arithmetic operator".to_string(),
            ConstraintOrigin::Comparison { .. } => "operands of this comparison".to_string(),
            ConstraintOrigin::Condition { .. } => "condition of this `if`".to_string(),
            ConstraintOrigin::IfBranches { .. } => "branches of this `if`".to_string(),
            ConstraintOrigin::Deref { .. } => "operand of this dereference".to_string(),
            ConstraintOrigin::AllocSize { .. } => "size of this allocation".to_string(),
            ConstraintOrigin::StructField { field, .. } => format!("value for field `{}`", field),
            ConstraintOrigin::FieldAccess { .. } => "this field access".to_string(),
            ConstraintOrigin::Cast { .. } => "this cast".to_string(),
            ConstraintOrigin::LetBinding { .. } => "initializer of this variable".to_string(),
            ConstraintOrigin::Param { .. } => "this parameter".to_string(),
            ConstraintOrigin::FnSignature { .. } => "signature of this function".to_string(),
            ConstraintOrigin::FnBody { .. } => "body of this function".to_string(),
            ConstraintOrigin::Return { .. } => "value of this return".to_string(),
            ConstraintOrigin::Assignment { .. } => "right-hand side of this assignment".to_string(),
            ConstraintOrigin::Builtin => "a builtin constraint".to_string(),
        }
    }
}

/// A type error encountered during checking.
///
/// Each variant carries enough information to produce a clear error message
/// including the source location and the types involved.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TypeError {
    /// A name is used but not declared in any enclosing scope.
    #[error("unbound name `{name}`")]
    UnboundName { name: String, span: Span },

    /// Two types that should be equal are not.
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    Mismatch {
        expected: Ty,
        found: Ty,
        origin: ConstraintOrigin,
    },

    /// Two function or struct types of different shape were unified.
    #[error("arity mismatch: expected {expected}, found {found}")]
    ArityMismatch {
        expected: usize,
        found: usize,
        origin: ConstraintOrigin,
    },

    /// A call passes the wrong number of arguments.
    #[error("`{callee}` takes {expected} argument(s) but {found} were supplied")]
    ArgumentCountMismatch {
        callee: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A struct initializer lists the wrong number of values.
    #[error("struct `{struct_name}` has {expected} field(s) but {found} value(s) were supplied")]
    StructArityMismatch {
        struct_name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A type variable would have to contain itself.
    #[error("infinite type: `?{}` occurs in `{ty}`", .var.0)]
    OccursCheck {
        var: TyVar,
        ty: Ty,
        origin: ConstraintOrigin,
    },

    /// A struct initializer names something that is not a struct type.
    #[error("`{name}` is not a struct type (found `{ty}`)")]
    NotAStruct { name: String, ty: Ty, span: Span },

    /// A concrete type fails a builtin trait.
    #[error("type `{ty}` does not satisfy `{trait_name}`")]
    TraitNotSatisfied {
        ty: Ty,
        trait_name: String,
        origin: ConstraintOrigin,
    },

    /// The solver made no progress with obligations still pending.
    #[error("cannot infer enough type information to resolve `{constraint}`")]
    UnresolvedConstraint {
        constraint: String,
        origin: ConstraintOrigin,
    },
}

impl TypeError {
    /// Primary source location of the error, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            TypeError::UnboundName { span, .. }
            | TypeError::ArgumentCountMismatch { span, .. }
            | TypeError::StructArityMismatch { span, .. }
            | TypeError::NotAStruct { span, .. } => Some(*span),
            TypeError::Mismatch { origin, .. }
            | TypeError::ArityMismatch { origin, .. }
            | TypeError::OccursCheck { origin, .. }
            | TypeError::TraitNotSatisfied { origin, .. }
            | TypeError::UnresolvedConstraint { origin, .. } => origin.span(),
        }
    }

    /// The origin of the failing constraint, for constraint-driven errors.
    pub fn origin(&self) -> Option<&ConstraintOrigin> {
        match self {
            TypeError::Mismatch { origin, .. }
            | TypeError::ArityMismatch { origin, .. }
            | TypeError::OccursCheck { origin, .. }
            | TypeError::TraitNotSatisfied { origin, .. }
            | TypeError::UnresolvedConstraint { origin, .. } => Some(origin),
            _ => None,
        }
    }
}
