//! Scope binder.
//!
//! Declares every symbol of a compilation unit in a fresh [`ScopeTree`] and
//! stamps each node with the scope it was bound in. Function and type
//! declarations are hoisted within their statement list, so calls may refer
//! to functions declared further down. Variables become visible only after
//! their initializer; each variable read is stamped with the symbol visible
//! at that point.

use tern_types::{Scheme, StructTy, Ty};

use crate::ast::*;
use crate::scope::{ScopeId, ScopeTree, SymbolKind};

/// Bind `unit` and return its scope tree.
pub fn bind(unit: &mut CompilationUnit) -> ScopeTree {
    let mut binder = Binder {
        tree: ScopeTree::new(),
        functions: Vec::new(),
    };
    unit.scope = ScopeId::ROOT;
    binder.bind_stmts(&mut unit.stmts, ScopeId::ROOT);
    tracing::debug!(
        scopes = binder.tree.scope_count(),
        symbols = binder.tree.symbol_count(),
        "bound compilation unit"
    );
    binder.tree
}

struct Binder {
    tree: ScopeTree,
    /// Names of the enclosing function declarations, innermost last.
    functions: Vec<String>,
}

impl Binder {
    fn bind_stmts(&mut self, stmts: &mut [Stmt], scope: ScopeId) {
        for stmt in stmts.iter_mut() {
            match stmt {
                Stmt::FunDecl(decl) => self.declare_fun(decl, scope),
                Stmt::TypeDecl(decl) => self.declare_type(decl, scope),
                _ => {}
            }
        }
        for stmt in stmts.iter_mut() {
            self.bind_stmt(stmt, scope);
        }
    }

    fn declare_fun(&mut self, decl: &mut FunDecl, scope: ScopeId) {
        decl.scope = scope;
        let hint = decl.hint.clone().map(Scheme::mono);
        self.tree
            .declare(scope, decl.name.clone(), SymbolKind::Fun, decl.span, hint);
    }

    fn declare_type(&mut self, decl: &mut TypeDecl, scope: ScopeId) {
        decl.scope = scope;
        // A struct body is named after its declaration.
        if let Ty::Struct(StructTy { name, .. }) = &mut decl.body {
            if name.is_none() {
                *name = Some(decl.name.clone());
            }
        }
        self.tree.declare(
            scope,
            decl.name.clone(),
            SymbolKind::Type,
            decl.span,
            Some(Scheme::mono(decl.body.clone())),
        );
    }

    fn bind_stmt(&mut self, stmt: &mut Stmt, scope: ScopeId) {
        match stmt {
            Stmt::Expr(s) => self.bind_expr(&mut s.expr, scope),
            Stmt::TypeDecl(_) => {}
            Stmt::VarDecl(decl) => {
                self.bind_expr(&mut decl.value, scope);
                decl.scope = scope;
                let annotation = decl.annotation.clone().map(Scheme::mono);
                decl.symbol = Some(self.tree.declare(
                    scope,
                    decl.name.clone(),
                    SymbolKind::Var,
                    decl.span,
                    annotation,
                ));
            }
            Stmt::FunDecl(decl) => {
                let body_scope = self.tree.new_scope(scope);
                decl.body_scope = body_scope;
                for formal in &decl.formals {
                    self.tree.declare(
                        body_scope,
                        formal.name.clone(),
                        SymbolKind::Param,
                        formal.span,
                        None,
                    );
                }
                if let Some(body) = &mut decl.body {
                    self.functions.push(decl.name.clone());
                    self.bind_expr(body, body_scope);
                    self.functions.pop();
                }
            }
            Stmt::Return(ret) => {
                ret.scope = scope;
                ret.function = self.functions.last().cloned();
                self.bind_expr(&mut ret.value, scope);
            }
            Stmt::Yield(y) => self.bind_expr(&mut y.value, scope),
            Stmt::Assign(assign) => {
                self.bind_expr(&mut assign.target, scope);
                self.bind_expr(&mut assign.value, scope);
            }
        }
    }

    fn bind_expr(&mut self, expr: &mut Expr, scope: ScopeId) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Var(v) => {
                v.scope = scope;
                v.symbol = self.tree.retrieve_symbol(scope, &v.name);
            }
            Expr::Unary(u) => self.bind_expr(&mut u.operand, scope),
            Expr::Binary(b) => {
                self.bind_expr(&mut b.left, scope);
                self.bind_expr(&mut b.right, scope);
            }
            Expr::Comparison(c) => {
                self.bind_expr(&mut c.left, scope);
                self.bind_expr(&mut c.right, scope);
            }
            Expr::If(i) => {
                self.bind_expr(&mut i.condition, scope);
                self.bind_expr(&mut i.then_branch, scope);
                if let Some(else_branch) = &mut i.else_branch {
                    self.bind_expr(else_branch, scope);
                }
            }
            Expr::Deref(d) => self.bind_expr(&mut d.operand, scope),
            Expr::AddressOf(a) => self.bind_expr(&mut a.operand, scope),
            Expr::New(n) => {
                if let Some(size) = &mut n.size {
                    self.bind_expr(size, scope);
                }
            }
            Expr::Block(block) => {
                let inner = self.tree.new_scope(scope);
                block.scope = inner;
                self.bind_stmts(&mut block.stmts, inner);
                if let Some(final_expr) = &mut block.final_expr {
                    self.bind_expr(final_expr, inner);
                }
            }
            Expr::Call(call) => {
                call.scope = scope;
                if let Callee::Expr(callee) = &mut call.callee {
                    self.bind_expr(callee, scope);
                }
                for arg in &mut call.args {
                    self.bind_expr(arg, scope);
                }
            }
            Expr::StructInit(init) => {
                init.scope = scope;
                for value in &mut init.values {
                    self.bind_expr(value, scope);
                }
            }
            Expr::Field(field) => {
                field.scope = scope;
                self.bind_expr(&mut field.base, scope);
            }
            Expr::Cast(cast) => self.bind_expr(&mut cast.expr, scope),
        }
    }
}
