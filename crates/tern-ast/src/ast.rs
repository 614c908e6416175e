//! Expression and statement nodes.
//!
//! The tree is a closed set of sum types. Nodes that need name resolution
//! carry the [`ScopeId`] they were bound in; the binder fills those fields,
//! and until then they hold [`ScopeId::ROOT`].

use tern_common::Span;
use tern_types::Ty;

use crate::scope::{ScopeId, SymbolId};

/// The root of one compilation unit.
#[derive(Clone, Debug)]
pub struct CompilationUnit {
    pub stmts: Vec<Stmt>,
    pub scope: ScopeId,
}

impl CompilationUnit {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        CompilationUnit {
            stmts,
            scope: ScopeId::ROOT,
        }
    }
}

// ── Statements ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub enum Stmt {
    Expr(ExprStmt),
    TypeDecl(TypeDecl),
    VarDecl(VarDecl),
    FunDecl(FunDecl),
    Return(ReturnStmt),
    Yield(YieldStmt),
    Assign(AssignStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(s) => s.expr.span(),
            Stmt::TypeDecl(s) => s.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::FunDecl(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Yield(s) => s.span,
            Stmt::Assign(s) => s.span,
        }
    }
}

/// An expression evaluated for its effect.
#[derive(Clone, Debug)]
pub struct ExprStmt {
    pub expr: Expr,
}

/// `type Name = struct { ... };`
#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    /// The declared body. Struct bodies get `name` as their declaring symbol
    /// when bound.
    pub body: Ty,
    pub span: Span,
    pub scope: ScopeId,
}

/// `var name [: annotation] = value;`
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: String,
    pub annotation: Option<Ty>,
    pub value: Expr,
    pub span: Span,
    pub scope: ScopeId,
    /// The symbol this declaration introduced, once bound.
    pub symbol: Option<SymbolId>,
}

/// A formal parameter of a function declaration.
#[derive(Clone, Debug)]
pub struct Formal {
    pub name: String,
    pub span: Span,
}

/// `fun name formals... [: hint] = body;`
///
/// A declaration without a body is an external (forward) declaration.
#[derive(Clone, Debug)]
pub struct FunDecl {
    pub name: String,
    pub formals: Vec<Formal>,
    pub body: Option<Expr>,
    /// Full signature written on the declaration, if any.
    pub hint: Option<Ty>,
    pub span: Span,
    /// Scope the function name is declared in.
    pub scope: ScopeId,
    /// Scope holding the formals; parent of the body.
    pub body_scope: ScopeId,
}

/// `return value;`
#[derive(Clone, Debug)]
pub struct ReturnStmt {
    pub value: Expr,
    /// Name of the enclosing function, stamped by the binder.
    pub function: Option<String>,
    pub span: Span,
    pub scope: ScopeId,
}

/// `yield value;`
#[derive(Clone, Debug)]
pub struct YieldStmt {
    pub value: Expr,
    pub span: Span,
}

/// `target = value;` where `target` is a variable, dereference or field.
#[derive(Clone, Debug)]
pub struct AssignStmt {
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

// ── Expressions ────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub enum Expr {
    Literal(Literal),
    Var(VarAccess),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Comparison(ComparisonExpr),
    If(IfExpr),
    Deref(DerefExpr),
    AddressOf(AddressOfExpr),
    New(NewExpr),
    Block(BlockExpr),
    Call(CallExpr),
    StructInit(StructInitExpr),
    Field(FieldAccess),
    Cast(CastExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Var(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Comparison(e) => e.span,
            Expr::If(e) => e.span,
            Expr::Deref(e) => e.span,
            Expr::AddressOf(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Block(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::StructInit(e) => e.span,
            Expr::Field(e) => e.span,
            Expr::Cast(e) => e.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralKind {
    Int(i64),
    Str(String),
    Char(char),
    Bool(bool),
    Unit,
}

#[derive(Clone, Debug)]
pub struct Literal {
    pub kind: LiteralKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct VarAccess {
    pub name: String,
    pub span: Span,
    pub scope: ScopeId,
    /// The binding visible at this point of the source, once bound. Later
    /// declarations in the same scope do not capture an earlier read.
    pub symbol: Option<SymbolId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

#[derive(Clone, Debug)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Clone, Debug)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Clone, Debug)]
pub struct ComparisonExpr {
    pub op: CompareOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Option<Box<Expr>>,
    pub span: Span,
}

/// `*operand`
#[derive(Clone, Debug)]
pub struct DerefExpr {
    pub operand: Box<Expr>,
    pub span: Span,
}

/// `&operand`
#[derive(Clone, Debug)]
pub struct AddressOfExpr {
    pub operand: Box<Expr>,
    pub span: Span,
}

/// `new[size] T`
#[derive(Clone, Debug)]
pub struct NewExpr {
    /// Type of the whole expression, attached by the parser.
    pub ty: Ty,
    pub size: Option<Box<Expr>>,
    pub span: Span,
}

/// `{ stmts; final }`
#[derive(Clone, Debug)]
pub struct BlockExpr {
    pub stmts: Vec<Stmt>,
    pub final_expr: Option<Box<Expr>>,
    pub span: Span,
    pub scope: ScopeId,
}

#[derive(Clone, Debug)]
pub enum Callee {
    /// A call through a function name.
    Named { name: String, span: Span },
    /// A call through a computed value.
    Expr(Box<Expr>),
}

#[derive(Clone, Debug)]
pub struct CallExpr {
    pub callee: Callee,
    pub args: Vec<Expr>,
    pub span: Span,
    pub scope: ScopeId,
}

/// `Name { values... }`, positional in declared field order.
#[derive(Clone, Debug)]
pub struct StructInitExpr {
    pub struct_name: String,
    pub values: Vec<Expr>,
    pub span: Span,
    pub scope: ScopeId,
}

#[derive(Clone, Debug)]
pub struct FieldAccess {
    pub base: Box<Expr>,
    pub field: String,
    pub span: Span,
    pub scope: ScopeId,
}

/// `expr as T`
#[derive(Clone, Debug)]
pub struct CastExpr {
    pub expr: Box<Expr>,
    pub target: Option<Ty>,
    pub span: Span,
}
