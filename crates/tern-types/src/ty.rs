use std::fmt;

use serde::Serialize;

/// A type variable, identified by a `u32` index into the unification table.
///
/// Variables are only minted by the inference context; `ena` handles the
/// union-find mechanics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TyVar(pub u32);

/// Names of the builtin nullary constructors.
pub const BUILTIN_CONS: [&str; 4] = ["int", "bool", "char", "unit"];

/// A nullary type constructor.
///
/// The builtins are `int`, `bool`, `char` and `unit`. Any other name is a
/// by-name reference to a declared struct type, which unifies with the
/// `Struct` declared under that name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TyCon {
    pub name: String,
}

impl TyCon {
    pub fn new(name: impl Into<String>) -> Self {
        TyCon { name: name.into() }
    }

    /// Whether this constructor is one of the builtin scalar types.
    pub fn is_builtin(&self) -> bool {
        BUILTIN_CONS.contains(&self.name.as_str())
    }
}

impl fmt::Display for TyCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A struct layout: ordered named fields.
///
/// `name` is the declaring type symbol, if the struct was introduced by a
/// type declaration. Two structs with the same name are the same type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct StructTy {
    pub name: Option<String>,
    pub fields: Vec<(String, Ty)>,
}

impl StructTy {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Ty> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| ty)
    }
}

/// A Tern type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Ty {
    /// An inference variable.
    Var(TyVar),
    /// A nullary constructor (`int`, `bool`, `char`, `unit`, or a struct name).
    Con(TyCon),
    /// Pointer to the inner type.
    Ptr(Box<Ty>),
    /// A function type: `(params) -> result`.
    Fun(Vec<Ty>, Box<Ty>),
    /// A struct layout.
    Struct(StructTy),
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Con(TyCon::new("int"))
    }

    pub fn bool() -> Ty {
        Ty::Con(TyCon::new("bool"))
    }

    pub fn char() -> Ty {
        Ty::Con(TyCon::new("char"))
    }

    pub fn unit() -> Ty {
        Ty::Con(TyCon::new("unit"))
    }

    /// `*inner`.
    pub fn ptr(inner: Ty) -> Ty {
        Ty::Ptr(Box::new(inner))
    }

    /// The type of string literals.
    pub fn string() -> Ty {
        Ty::ptr(Ty::char())
    }

    pub fn fun(params: Vec<Ty>, result: Ty) -> Ty {
        Ty::Fun(params, Box::new(result))
    }

    /// A struct declared under `name`.
    pub fn named_struct(name: impl Into<String>, fields: Vec<(String, Ty)>) -> Ty {
        Ty::Struct(StructTy {
            name: Some(name.into()),
            fields,
        })
    }

    /// A struct layout with no declaring symbol.
    pub fn anon_struct(fields: Vec<(String, Ty)>) -> Ty {
        Ty::Struct(StructTy { name: None, fields })
    }

    /// Whether `var` appears syntactically in this type. Does not follow
    /// unification links; the checker's occurs check does that.
    pub fn mentions(&self, var: TyVar) -> bool {
        match self {
            Ty::Var(v) => *v == var,
            Ty::Con(_) => false,
            Ty::Ptr(inner) => inner.mentions(var),
            Ty::Fun(params, ret) => params.iter().any(|p| p.mentions(var)) || ret.mentions(var),
            Ty::Struct(s) => s.fields.iter().any(|(_, t)| t.mentions(var)),
        }
    }

    /// Syntactic type variables, in first-occurrence order, without
    /// duplicates.
    pub fn vars(&self) -> Vec<TyVar> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<TyVar>) {
        match self {
            Ty::Var(v) => {
                if !out.contains(v) {
                    out.push(*v);
                }
            }
            Ty::Con(_) => {}
            Ty::Ptr(inner) => inner.collect_vars(out),
            Ty::Fun(params, ret) => {
                for p in params {
                    p.collect_vars(out);
                }
                ret.collect_vars(out);
            }
            Ty::Struct(s) => {
                for (_, t) in &s.fields {
                    t.collect_vars(out);
                }
            }
        }
    }

    /// Write this type, printing variables found in `names` by their name.
    fn fmt_named(&self, f: &mut fmt::Formatter<'_>, names: &[(TyVar, String)]) -> fmt::Result {
        match self {
            Ty::Var(v) => match names.iter().find(|(n, _)| n == v) {
                Some((_, name)) => f.write_str(name),
                None => write!(f, "?{}", v.0),
            },
            Ty::Con(c) => write!(f, "{}", c),
            Ty::Ptr(inner) => {
                f.write_str("*")?;
                inner.fmt_named(f, names)
            }
            Ty::Fun(params, ret) => {
                f.write_str("(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    p.fmt_named(f, names)?;
                }
                f.write_str(") -> ")?;
                ret.fmt_named(f, names)
            }
            Ty::Struct(StructTy { name: Some(name), .. }) => f.write_str(name),
            Ty::Struct(StructTy { name: None, fields }) => {
                f.write_str("struct {")?;
                for (i, (field, ty)) in fields.iter().enumerate() {
                    f.write_str(if i > 0 { ", " } else { " " })?;
                    write!(f, "{}: ", field)?;
                    ty.fmt_named(f, names)?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_named(f, &[])
    }
}

/// A polymorphic type scheme: a type with universally quantified variables.
///
/// The type of `id` is `forall a. (a) -> a`, represented as
/// `Scheme { vars: [a], ty: Fun([Var(a)], Var(a)) }`. Symbols that are not
/// generic hold a monomorphic scheme with no quantified variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Scheme {
    /// The quantified (generic) type variables.
    pub vars: Vec<TyVar>,
    /// The underlying type (may reference vars).
    pub ty: Ty,
}

impl Scheme {
    /// Create a monomorphic scheme (no quantified variables).
    pub fn mono(ty: Ty) -> Self {
        Scheme {
            vars: Vec::new(),
            ty,
        }
    }

    pub fn is_mono(&self) -> bool {
        self.vars.is_empty()
    }
}

impl fmt::Display for Scheme {
    /// Quantified variables print as `a`, `b`, ... in quantification order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            return write!(f, "{}", self.ty);
        }
        let names: Vec<(TyVar, String)> = self
            .vars
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, var_name(i)))
            .collect();
        f.write_str("forall")?;
        for (_, name) in &names {
            write!(f, " {}", name)?;
        }
        f.write_str(". ")?;
        self.ty.fmt_named(f, &names)
    }
}

/// `a`..`z`, then `a1`, `b1`, ...
fn var_name(index: usize) -> String {
    let letter = (b'a' + (index % 26) as u8) as char;
    match index / 26 {
        0 => letter.to_string(),
        n => format!("{}{}", letter, n),
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}
