//! Inference visitor.
//!
//! Walks a bound compilation unit one top-level statement at a time,
//! synthesizing a type for every construct and recording the equalities and
//! trait obligations that the construct implies. The recorded obligations
//! are handed to the solver at the end of every function body and at the
//! end of every top-level statement.
//!
//! An error aborts the top-level statement it occurred in; it is collected
//! and inference resumes with the next statement.

use rustc_hash::{FxHashMap, FxHashSet};
use tern_ast::*;
use tern_common::Span;
use tern_types::{Scheme, Ty, TyVar};

use crate::builtins::TraitTable;
use crate::config::TypeckConfig;
use crate::error::{ConstraintOrigin, TypeError};
use crate::solve::Solver;
use crate::traits::{ConstraintQueue, Trait};
use crate::unify::{InferCtx, KnownParams};
use crate::TypeckResult;

/// Infer types for every statement of `unit`.
pub(crate) fn infer_unit(
    unit: &CompilationUnit,
    scopes: &mut ScopeTree,
    config: &TypeckConfig,
) -> TypeckResult {
    let mut infer = Infer::new(scopes, config);
    let mut errors = Vec::new();
    let mut result_type = None;

    for stmt in &unit.stmts {
        match infer.infer_top_level(stmt) {
            Ok(ty) => result_type = Some(ty),
            Err(err) => {
                tracing::debug!(error = %err, "top-level statement failed to check");
                infer.queue.clear();
                infer.return_stack.clear();
                errors.push(err);
                result_type = None;
            }
        }
    }

    infer.finish(unit.scope, errors, result_type)
}

struct Infer<'a> {
    ctx: InferCtx,
    scopes: &'a mut ScopeTree,
    config: &'a TypeckConfig,
    traits: TraitTable,
    queue: ConstraintQueue,
    /// Result types of the functions being inferred, innermost last.
    return_stack: Vec<(String, Ty)>,
    types: FxHashMap<Span, Ty>,
    schemes: FxHashMap<String, Scheme>,
}

impl<'a> Infer<'a> {
    fn new(scopes: &'a mut ScopeTree, config: &'a TypeckConfig) -> Self {
        Infer {
            ctx: InferCtx::new(),
            scopes,
            config,
            traits: TraitTable::builtin(),
            queue: ConstraintQueue::new(),
            return_stack: Vec::new(),
            types: FxHashMap::default(),
            schemes: FxHashMap::default(),
        }
    }

    fn infer_top_level(&mut self, stmt: &Stmt) -> Result<Ty, TypeError> {
        let ty = self.infer_stmt(stmt)?;
        if !self.queue.is_empty() {
            self.solve()?;
        }
        Ok(self.ctx.resolve(ty))
    }

    /// Resolve everything recorded so far into the final result.
    fn finish(
        mut self,
        root: ScopeId,
        errors: Vec<TypeError>,
        result_type: Option<Ty>,
    ) -> TypeckResult {
        let types = std::mem::take(&mut self.types)
            .into_iter()
            .map(|(span, ty)| (span, self.ctx.resolve(ty)))
            .collect();

        // Monomorphic parts of a scheme may have been bound by later
        // statements, e.g. the result of a forward-referenced function.
        let schemes: FxHashMap<String, Scheme> = std::mem::take(&mut self.schemes)
            .into_iter()
            .map(|(name, scheme)| (name, self.ctx.resolve_scheme(scheme)))
            .collect();

        let mut globals = FxHashMap::default();
        let bindings: Vec<(String, SymbolId)> = self
            .scopes
            .scope(root)
            .bindings
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        for (name, id) in bindings {
            if let Some(scheme) = self.scopes.symbol(id).ty.clone() {
                globals.insert(name, self.ctx.resolve_scheme(scheme));
            }
        }

        tracing::debug!(
            errors = errors.len(),
            schemes = schemes.len(),
            vars = self.ctx.var_count(),
            "inference finished"
        );

        TypeckResult {
            types,
            schemes,
            globals,
            errors,
            result_type,
        }
    }

    fn solve(&mut self) -> Result<(), TypeError> {
        let pending = self.queue.take();
        Solver::new(
            &mut self.ctx,
            self.scopes,
            &self.traits,
            self.config.solver.max_passes,
        )
        .solve(pending)
    }

    fn push_eq(&mut self, expected: Ty, found: Ty, origin: ConstraintOrigin) {
        self.queue.push_equal(expected, found, origin);
    }

    // ── Symbols ─────────────────────────────────────────────────────────

    /// The type slot of `id`, filled with a fresh variable if empty.
    fn symbol_scheme(&mut self, id: SymbolId) -> Scheme {
        if let Some(scheme) = &self.scopes.symbol(id).ty {
            return scheme.clone();
        }
        let scheme = Scheme::mono(self.ctx.fresh_var());
        self.scopes.set_type(id, scheme.clone());
        scheme
    }

    fn lookup(&self, scope: ScopeId, name: &str, span: Span) -> Result<SymbolId, TypeError> {
        self.scopes
            .retrieve_symbol(scope, name)
            .ok_or_else(|| TypeError::UnboundName {
                name: name.to_string(),
                span,
            })
    }

    /// Free variables of every symbol visible from `scope` other than
    /// `exclude`, as class roots.
    fn env_vars(&mut self, scope: ScopeId, exclude: SymbolId) -> FxHashSet<TyVar> {
        let schemes: Vec<Scheme> = self
            .scopes
            .visible_symbols(scope)
            .filter(|id| *id != exclude)
            .filter_map(|id| self.scopes.symbol(id).ty.clone())
            .collect();
        let mut vars = FxHashSet::default();
        for scheme in &schemes {
            vars.extend(self.ctx.scheme_free_vars(scheme));
        }
        vars
    }

    // ── Statements ──────────────────────────────────────────────────────

    fn infer_stmt(&mut self, stmt: &Stmt) -> Result<Ty, TypeError> {
        match stmt {
            Stmt::Expr(s) => {
                self.infer_expr(&s.expr)?;
                Ok(Ty::unit())
            }
            Stmt::TypeDecl(decl) => {
                let id = self.lookup(decl.scope, &decl.name, decl.span)?;
                let ty = self.symbol_scheme(id).ty;
                self.types.insert(decl.span, ty);
                Ok(Ty::unit())
            }
            Stmt::VarDecl(decl) => {
                let id = match decl.symbol {
                    Some(id) => id,
                    None => self.lookup(decl.scope, &decl.name, decl.span)?,
                };
                let var_ty = self.symbol_scheme(id).ty;
                let value_ty = self.infer_expr(&decl.value)?;
                self.push_eq(
                    var_ty,
                    value_ty,
                    ConstraintOrigin::LetBinding {
                        binding_span: decl.span,
                        value_span: decl.value.span(),
                    },
                );
                Ok(Ty::unit())
            }
            Stmt::FunDecl(decl) => self.infer_fun_decl(decl),
            Stmt::Return(ret) => {
                let result = self.return_type(ret)?;
                let value_ty = self.infer_expr(&ret.value)?;
                self.push_eq(
                    result,
                    value_ty,
                    ConstraintOrigin::Return {
                        return_span: ret.span,
                        value_span: ret.value.span(),
                    },
                );
                Ok(Ty::unit())
            }
            Stmt::Yield(y) => {
                self.infer_expr(&y.value)?;
                Ok(Ty::unit())
            }
            Stmt::Assign(assign) => {
                let value_ty = self.infer_expr(&assign.value)?;
                let target_ty = self.infer_expr(&assign.target)?;
                self.push_eq(
                    target_ty,
                    value_ty,
                    ConstraintOrigin::Assignment {
                        lhs_span: assign.target.span(),
                        rhs_span: assign.value.span(),
                    },
                );
                Ok(Ty::unit())
            }
        }
    }

    fn infer_fun_decl(&mut self, decl: &FunDecl) -> Result<Ty, TypeError> {
        let Some(body) = &decl.body else {
            return Ok(Ty::unit());
        };

        // Each function drains its own obligations; an enclosing function's
        // pending ones wait for its own checkpoint.
        let outer = std::mem::replace(&mut self.queue, ConstraintQueue::new());
        let inferred = self.infer_fun_body(decl, body);
        self.queue = outer;
        inferred
    }

    fn infer_fun_body(&mut self, decl: &FunDecl, body: &Expr) -> Result<Ty, TypeError> {
        let mut params = Vec::with_capacity(decl.formals.len());
        for formal in &decl.formals {
            let param = self.ctx.fresh_var();
            let id = self.lookup(decl.body_scope, &formal.name, formal.span)?;
            let declared = self.symbol_scheme(id).ty;
            self.push_eq(
                declared,
                param.clone(),
                ConstraintOrigin::Param {
                    param_span: formal.span,
                },
            );
            params.push(param);
        }

        let fn_id = self.lookup(decl.scope, &decl.name, decl.span)?;
        let result = self.ctx.fresh_var();
        let fn_ty = Ty::fun(params, result.clone());
        let declared = self.symbol_scheme(fn_id);
        let declared = self.ctx.instantiate(&declared);
        self.push_eq(
            fn_ty.clone(),
            declared,
            ConstraintOrigin::FnSignature { fn_span: decl.span },
        );

        self.return_stack.push((decl.name.clone(), result.clone()));
        let body_ty = self.infer_expr(body);
        self.return_stack.pop();
        let body_ty = body_ty?;
        self.push_eq(
            result,
            body_ty,
            ConstraintOrigin::FnBody {
                fn_span: decl.span,
                body_span: body.span(),
            },
        );

        self.solve()?;

        if self.scopes.level(decl.scope) == 1 {
            let env = self.env_vars(decl.scope, fn_id);
            let scheme = self.ctx.generalize(fn_ty.clone(), &env);
            tracing::debug!(function = %decl.name, scheme = %scheme, "generalized");
            self.scopes.set_type(fn_id, scheme.clone());
            self.schemes.insert(decl.name.clone(), scheme);
        }

        let fn_ty = self.ctx.resolve(fn_ty);
        self.types.insert(decl.span, fn_ty.clone());
        Ok(fn_ty)
    }

    /// Result type of the function a `return` belongs to.
    fn return_type(&mut self, ret: &ReturnStmt) -> Result<Ty, TypeError> {
        let name = match &ret.function {
            Some(name) => name,
            None => panic!("return at {} is not inside a function", ret.span),
        };
        if let Some((_, result)) = self.return_stack.iter().rev().find(|(n, _)| n == name) {
            return Ok(result.clone());
        }
        let id = self.lookup(ret.scope, name, ret.span)?;
        let declared = self.symbol_scheme(id).ty;
        match self.ctx.find_leader(&declared) {
            Ty::Fun(_, result) => Ok(*result),
            other => panic!(
                "return at {} names `{}`, which has non-function type `{}`",
                ret.span, name, other
            ),
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn infer_expr(&mut self, expr: &Expr) -> Result<Ty, TypeError> {
        match expr {
            Expr::Literal(lit) => {
                let ty = match &lit.kind {
                    LiteralKind::Int(_) => Ty::int(),
                    LiteralKind::Str(_) => Ty::string(),
                    LiteralKind::Char(_) => Ty::char(),
                    LiteralKind::Bool(_) => Ty::bool(),
                    LiteralKind::Unit => Ty::unit(),
                };
                self.types.insert(lit.span, ty.clone());
                Ok(ty)
            }

            Expr::Var(access) => {
                let id = access.symbol.ok_or_else(|| TypeError::UnboundName {
                    name: access.name.clone(),
                    span: access.span,
                })?;
                let scheme = self.symbol_scheme(id);
                Ok(self.ctx.instantiate(&scheme))
            }

            Expr::Unary(unary) => {
                let operand = self.infer_expr(&unary.operand)?;
                let expected = match unary.op {
                    UnaryOp::Neg => Ty::int(),
                    UnaryOp::Not => Ty::bool(),
                };
                self.push_eq(
                    expected,
                    operand.clone(),
                    ConstraintOrigin::UnaryOp {
                        op_span: unary.span,
                        operand_span: unary.operand.span(),
                    },
                );
                Ok(operand)
            }

            Expr::Binary(binary) => {
                let left = self.infer_expr(&binary.left)?;
                let right = self.infer_expr(&binary.right)?;
                self.push_eq(
                    Ty::int(),
                    right,
                    ConstraintOrigin::BinOp {
                        op_span: binary.span,
                        operand_span: binary.right.span(),
                    },
                );
                Ok(left)
            }

            Expr::Comparison(cmp) => {
                let left = self.infer_expr(&cmp.left)?;
                let right = self.infer_expr(&cmp.right)?;
                let origin = ConstraintOrigin::Comparison { op_span: cmp.span };
                let (eq, ord) = match cmp.op {
                    CompareOp::Eq | CompareOp::Ne => (true, false),
                    CompareOp::Lt | CompareOp::Gt => (false, true),
                    CompareOp::Le | CompareOp::Ge => (true, true),
                };
                if eq {
                    self.queue.push(Trait::Eq { bound: left.clone() }, origin.clone());
                }
                if ord {
                    self.queue.push(Trait::Ord { bound: left.clone() }, origin.clone());
                }
                self.push_eq(left, right, origin);
                Ok(Ty::bool())
            }

            Expr::If(if_expr) => {
                let cond = self.infer_expr(&if_expr.condition)?;
                self.push_eq(
                    Ty::bool(),
                    cond,
                    ConstraintOrigin::Condition {
                        cond_span: if_expr.condition.span(),
                    },
                );
                let then_ty = self.infer_expr(&if_expr.then_branch)?;
                let else_ty = match &if_expr.else_branch {
                    Some(else_branch) => self.infer_expr(else_branch)?,
                    None => Ty::unit(),
                };
                self.push_eq(
                    then_ty.clone(),
                    else_ty,
                    ConstraintOrigin::IfBranches {
                        if_span: if_expr.span,
                        then_span: if_expr.then_branch.span(),
                        else_span: if_expr.else_branch.as_ref().map(|e| e.span()),
                    },
                );
                Ok(then_ty)
            }

            Expr::Deref(deref) => {
                let operand = self.infer_expr(&deref.operand)?;
                let pointee = self.ctx.fresh_var();
                self.push_eq(
                    Ty::ptr(pointee.clone()),
                    operand,
                    ConstraintOrigin::Deref { span: deref.span },
                );
                Ok(self.ctx.find_leader(&pointee))
            }

            Expr::AddressOf(addr) => Ok(Ty::ptr(self.infer_expr(&addr.operand)?)),

            Expr::New(new) => {
                if let Some(size) = &new.size {
                    let size_ty = self.infer_expr(size)?;
                    self.push_eq(
                        Ty::int(),
                        size_ty,
                        ConstraintOrigin::AllocSize { span: size.span() },
                    );
                }
                Ok(new.ty.clone())
            }

            Expr::Block(block) => {
                for stmt in &block.stmts {
                    self.infer_stmt(stmt)?;
                }
                match &block.final_expr {
                    Some(final_expr) => self.infer_expr(final_expr),
                    None => Ok(Ty::unit()),
                }
            }

            Expr::Call(call) => self.infer_call(call),

            Expr::StructInit(init) => self.infer_struct_init(init),

            Expr::Field(access) => {
                let base = self.infer_expr(&access.base)?;
                let bound = self.ctx.find_leader(&base);
                let field_ty = self.ctx.fresh_var();
                self.queue.push(
                    Trait::HasField {
                        bound,
                        field: access.field.clone(),
                        field_ty: field_ty.clone(),
                        scope: access.scope,
                    },
                    ConstraintOrigin::FieldAccess { span: access.span },
                );
                self.types.insert(access.span, field_ty.clone());
                Ok(field_ty)
            }

            Expr::Cast(cast) => {
                let source = self.infer_expr(&cast.expr)?;
                let target = match &cast.target {
                    Some(target) => target.clone(),
                    None => panic!("cast at {} has no destination type", cast.span),
                };
                let bound = self.ctx.find_leader(&source);
                self.queue.push(
                    Trait::ConvertibleTo {
                        bound,
                        to: target.clone(),
                    },
                    ConstraintOrigin::Cast { span: cast.span },
                );
                Ok(target)
            }
        }
    }

    fn infer_call(&mut self, call: &CallExpr) -> Result<Ty, TypeError> {
        let (name, name_span) = match &call.callee {
            Callee::Named { name, span } => (name, *span),
            Callee::Expr(_) => panic!("call at {} goes through a computed callee", call.span),
        };

        let scope = self
            .scopes
            .find(call.scope, name)
            .ok_or_else(|| TypeError::UnboundName {
                name: name.clone(),
                span: name_span,
            })?;
        let id = self.lookup(scope, name, name_span)?;
        let scheme = self.symbol_scheme(id);

        // One substitution per call site.
        let mut known = KnownParams::default();
        let fn_ty = self.ctx.instantiate_with(&scheme, &mut known);
        let callee_origin = ConstraintOrigin::Callee {
            call_site: call.span,
        };
        self.queue.push(
            Trait::Callable {
                bound: fn_ty.clone(),
            },
            callee_origin.clone(),
        );

        let (params, result) = match self.ctx.find_leader(&fn_ty) {
            Ty::Fun(params, result) => {
                if params.len() != call.args.len() {
                    return Err(TypeError::ArgumentCountMismatch {
                        callee: name.clone(),
                        expected: params.len(),
                        found: call.args.len(),
                        span: call.span,
                    });
                }
                (params, *result)
            }
            Ty::Var(_) => {
                let params: Vec<Ty> = call.args.iter().map(|_| self.ctx.fresh_var()).collect();
                let result = self.ctx.fresh_var();
                self.push_eq(
                    Ty::fun(params.clone(), result.clone()),
                    fn_ty,
                    callee_origin,
                );
                (params, result)
            }
            _ => {
                // Not callable; the CALLABLE obligation reports it.
                for arg in &call.args {
                    self.infer_expr(arg)?;
                }
                return Ok(self.ctx.fresh_var());
            }
        };

        for (idx, (param, arg)) in params.into_iter().zip(&call.args).enumerate() {
            let arg_ty = self.infer_expr(arg)?;
            self.push_eq(
                param,
                arg_ty,
                ConstraintOrigin::FnArg {
                    call_site: call.span,
                    arg_span: arg.span(),
                    param_idx: idx,
                },
            );
        }
        Ok(result)
    }

    fn infer_struct_init(&mut self, init: &StructInitExpr) -> Result<Ty, TypeError> {
        let id = self.lookup(init.scope, &init.struct_name, init.span)?;
        let declared = self.symbol_scheme(id).ty;
        let layout = match self.ctx.find_leader(&declared) {
            Ty::Struct(layout) => layout,
            other => {
                return Err(TypeError::NotAStruct {
                    name: init.struct_name.clone(),
                    ty: self.ctx.resolve(other),
                    span: init.span,
                })
            }
        };
        if layout.fields.len() != init.values.len() {
            return Err(TypeError::StructArityMismatch {
                struct_name: init.struct_name.clone(),
                expected: layout.fields.len(),
                found: init.values.len(),
                span: init.span,
            });
        }
        for ((field, field_ty), value) in layout.fields.iter().zip(&init.values) {
            let value_ty = self.infer_expr(value)?;
            self.push_eq(
                field_ty.clone(),
                value_ty,
                ConstraintOrigin::StructField {
                    init_span: init.span,
                    value_span: value.span(),
                    field: field.clone(),
                },
            );
        }
        Ok(Ty::Struct(layout))
    }
}
