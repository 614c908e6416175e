//! Node constructors.
//!
//! [`AstBuilder`] hands out a distinct one-byte span per node, in creation
//! order, so errors can be traced back to the exact node that caused them
//! without a parser in the loop. Scope fields are left at
//! [`ScopeId::ROOT`] for the binder to fill.

use tern_common::Span;
use tern_types::Ty;

use crate::ast::*;
use crate::scope::ScopeId;

#[derive(Debug, Default)]
pub struct AstBuilder {
    next: u32,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start handing out spans at `offset`.
    pub fn starting_at(offset: u32) -> Self {
        AstBuilder { next: offset }
    }

    fn span(&mut self) -> Span {
        let span = Span::new(self.next, self.next + 1);
        self.next += 1;
        span
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn literal(&mut self, kind: LiteralKind) -> Expr {
        Expr::Literal(Literal {
            kind,
            span: self.span(),
        })
    }

    pub fn int(&mut self, value: i64) -> Expr {
        self.literal(LiteralKind::Int(value))
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.literal(LiteralKind::Str(value.to_string()))
    }

    pub fn char(&mut self, value: char) -> Expr {
        self.literal(LiteralKind::Char(value))
    }

    pub fn bool(&mut self, value: bool) -> Expr {
        self.literal(LiteralKind::Bool(value))
    }

    pub fn unit(&mut self) -> Expr {
        self.literal(LiteralKind::Unit)
    }

    pub fn var(&mut self, name: &str) -> Expr {
        Expr::Var(VarAccess {
            name: name.to_string(),
            span: self.span(),
            scope: ScopeId::ROOT,
            symbol: None,
        })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            span: self.span(),
        })
    }

    pub fn neg(&mut self, operand: Expr) -> Expr {
        self.unary(UnaryOp::Neg, operand)
    }

    pub fn not(&mut self, operand: Expr) -> Expr {
        self.unary(UnaryOp::Not, operand)
    }

    pub fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: self.span(),
        })
    }

    pub fn add(&mut self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn compare(&mut self, op: CompareOp, left: Expr, right: Expr) -> Expr {
        Expr::Comparison(ComparisonExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: self.span(),
        })
    }

    pub fn if_else(&mut self, condition: Expr, then_branch: Expr, else_branch: Option<Expr>) -> Expr {
        Expr::If(IfExpr {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
            span: self.span(),
        })
    }

    pub fn deref(&mut self, operand: Expr) -> Expr {
        Expr::Deref(DerefExpr {
            operand: Box::new(operand),
            span: self.span(),
        })
    }

    pub fn address_of(&mut self, operand: Expr) -> Expr {
        Expr::AddressOf(AddressOfExpr {
            operand: Box::new(operand),
            span: self.span(),
        })
    }

    pub fn new_expr(&mut self, ty: Ty, size: Option<Expr>) -> Expr {
        Expr::New(NewExpr {
            ty,
            size: size.map(Box::new),
            span: self.span(),
        })
    }

    pub fn block(&mut self, stmts: Vec<Stmt>, final_expr: Option<Expr>) -> Expr {
        Expr::Block(BlockExpr {
            stmts,
            final_expr: final_expr.map(Box::new),
            span: self.span(),
            scope: ScopeId::ROOT,
        })
    }

    /// A call through a function name.
    pub fn call(&mut self, name: &str, args: Vec<Expr>) -> Expr {
        let name_span = self.span();
        Expr::Call(CallExpr {
            callee: Callee::Named {
                name: name.to_string(),
                span: name_span,
            },
            args,
            span: self.span(),
            scope: ScopeId::ROOT,
        })
    }

    /// A call through a computed callee.
    pub fn call_expr(&mut self, callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call(CallExpr {
            callee: Callee::Expr(Box::new(callee)),
            args,
            span: self.span(),
            scope: ScopeId::ROOT,
        })
    }

    pub fn struct_init(&mut self, struct_name: &str, values: Vec<Expr>) -> Expr {
        Expr::StructInit(StructInitExpr {
            struct_name: struct_name.to_string(),
            values,
            span: self.span(),
            scope: ScopeId::ROOT,
        })
    }

    pub fn field(&mut self, base: Expr, field: &str) -> Expr {
        Expr::Field(FieldAccess {
            base: Box::new(base),
            field: field.to_string(),
            span: self.span(),
            scope: ScopeId::ROOT,
        })
    }

    pub fn cast(&mut self, expr: Expr, target: Option<Ty>) -> Expr {
        Expr::Cast(CastExpr {
            expr: Box::new(expr),
            target,
            span: self.span(),
        })
    }

    // ── Statements ─────────────────────────────────────────────────────

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        Stmt::Expr(ExprStmt { expr })
    }

    pub fn type_decl(&mut self, name: &str, body: Ty) -> Stmt {
        Stmt::TypeDecl(TypeDecl {
            name: name.to_string(),
            body,
            span: self.span(),
            scope: ScopeId::ROOT,
        })
    }

    pub fn var_decl(&mut self, name: &str, annotation: Option<Ty>, value: Expr) -> Stmt {
        Stmt::VarDecl(VarDecl {
            name: name.to_string(),
            annotation,
            value,
            span: self.span(),
            scope: ScopeId::ROOT,
            symbol: None,
        })
    }

    pub fn fun_decl(&mut self, name: &str, formals: &[&str], body: Option<Expr>) -> Stmt {
        self.fun_decl_with_hint(name, formals, body, None)
    }

    pub fn fun_decl_with_hint(
        &mut self,
        name: &str,
        formals: &[&str],
        body: Option<Expr>,
        hint: Option<Ty>,
    ) -> Stmt {
        let formals = formals
            .iter()
            .map(|f| Formal {
                name: f.to_string(),
                span: self.span(),
            })
            .collect();
        Stmt::FunDecl(FunDecl {
            name: name.to_string(),
            formals,
            body,
            hint,
            span: self.span(),
            scope: ScopeId::ROOT,
            body_scope: ScopeId::ROOT,
        })
    }

    pub fn ret(&mut self, value: Expr) -> Stmt {
        Stmt::Return(ReturnStmt {
            value,
            function: None,
            span: self.span(),
            scope: ScopeId::ROOT,
        })
    }

    pub fn yield_stmt(&mut self, value: Expr) -> Stmt {
        Stmt::Yield(YieldStmt {
            value,
            span: self.span(),
        })
    }

    pub fn assign(&mut self, target: Expr, value: Expr) -> Stmt {
        Stmt::Assign(AssignStmt {
            target,
            value,
            span: self.span(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_are_distinct_and_increasing() {
        let mut b = AstBuilder::new();
        let one = b.int(1);
        let two = b.int(2);
        let sum = b.add(one.clone(), two.clone());
        assert_eq!(one.span(), Span::new(0, 1));
        assert_eq!(two.span(), Span::new(1, 2));
        assert_eq!(sum.span(), Span::new(2, 3));
    }

    #[test]
    fn starting_offset_is_respected() {
        let mut b = AstBuilder::starting_at(40);
        assert_eq!(b.unit().span(), Span::new(40, 41));
    }

    #[test]
    fn named_call_gets_callee_and_call_spans() {
        let mut b = AstBuilder::new();
        let call = b.call("f", vec![]);
        match call {
            Expr::Call(CallExpr {
                callee: Callee::Named { span, .. },
                span: call_span,
                ..
            }) => assert_ne!(span, call_span),
            other => panic!("expected named call, got {:?}", other),
        }
    }
}
