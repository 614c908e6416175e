//! Scope tree with symbols.
//!
//! Scopes live in an arena indexed by [`ScopeId`]; each scope knows its
//! parent and its lexical nesting level. The root scope is level 1, which is
//! the only level where the type checker generalizes function types. Lookups
//! walk from a scope outward through its parents, implementing lexical
//! scoping with shadowing.

use rustc_hash::FxHashMap;
use tern_common::Span;
use tern_types::Scheme;

/// Index of a scope in a [`ScopeTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The compilation unit's top-level scope.
    pub const ROOT: ScopeId = ScopeId(0);
}

/// Index of a symbol in a [`ScopeTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Param,
    Fun,
    Type,
}

/// A named entity with a settable type slot.
///
/// An empty slot means nothing was written in the source; the type checker
/// fills it with a fresh type variable on first use.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub span: Span,
    pub ty: Option<Scheme>,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub level: u32,
    pub bindings: FxHashMap<String, SymbolId>,
}

/// Arena of scopes and symbols for one compilation unit.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl ScopeTree {
    /// Create a tree holding only the root scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope {
                parent: None,
                level: 1,
                bindings: FxHashMap::default(),
            }],
            symbols: Vec::new(),
        }
    }

    /// Open a child scope one level deeper than `parent`.
    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        let level = self.scope(parent).level + 1;
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            level,
            bindings: FxHashMap::default(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn level(&self, id: ScopeId) -> u32 {
        self.scope(id).level
    }

    /// Declare `name` in `scope`, shadowing any earlier binding there.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        kind: SymbolKind,
        span: Span,
        ty: Option<Scheme>,
    ) -> SymbolId {
        let name = name.into();
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.clone(),
            kind,
            span,
            ty,
        });
        self.scopes[scope.0 as usize].bindings.insert(name, id);
        id
    }

    /// Resolve `name` from `scope`, searching outward through parents.
    pub fn retrieve_symbol(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let found = self.find(scope, name)?;
        self.scope(found).bindings.get(name).copied()
    }

    /// The nearest scope, starting at `scope`, whose own bindings hold `name`.
    pub fn find(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.ancestors(scope)
            .find(|id| self.scope(*id).bindings.contains_key(name))
    }

    /// `scope` followed by each enclosing scope up to the root.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |id| self.scope(*id).parent)
    }

    /// Every symbol bound in `scope` or an enclosing scope, shadowed ones
    /// included.
    pub fn visible_symbols(&self, scope: ScopeId) -> impl Iterator<Item = SymbolId> + '_ {
        self.ancestors(scope)
            .flat_map(move |id| self.scope(id).bindings.values().copied())
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn set_type(&mut self, id: SymbolId, scheme: Scheme) {
        self.symbols[id.0 as usize].ty = Some(scheme);
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_types::Ty;

    fn declare_var(tree: &mut ScopeTree, scope: ScopeId, name: &str, ty: Ty) -> SymbolId {
        tree.declare(scope, name, SymbolKind::Var, Span::default(), Some(Scheme::mono(ty)))
    }

    #[test]
    fn root_is_level_one() {
        let mut tree = ScopeTree::new();
        assert_eq!(tree.level(ScopeId::ROOT), 1);
        let inner = tree.new_scope(ScopeId::ROOT);
        let innermost = tree.new_scope(inner);
        assert_eq!(tree.level(inner), 2);
        assert_eq!(tree.level(innermost), 3);
    }

    #[test]
    fn lookup_walks_outward() {
        let mut tree = ScopeTree::new();
        let x = declare_var(&mut tree, ScopeId::ROOT, "x", Ty::int());
        let inner = tree.new_scope(ScopeId::ROOT);

        assert_eq!(tree.retrieve_symbol(inner, "x"), Some(x));
        assert_eq!(tree.find(inner, "x"), Some(ScopeId::ROOT));
        assert_eq!(tree.retrieve_symbol(inner, "y"), None);
        assert_eq!(tree.find(inner, "y"), None);
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut tree = ScopeTree::new();
        let outer = declare_var(&mut tree, ScopeId::ROOT, "x", Ty::int());
        let inner_scope = tree.new_scope(ScopeId::ROOT);
        let inner = declare_var(&mut tree, inner_scope, "x", Ty::bool());

        assert_eq!(tree.retrieve_symbol(inner_scope, "x"), Some(inner));
        assert_eq!(tree.retrieve_symbol(ScopeId::ROOT, "x"), Some(outer));
        assert_eq!(tree.symbol(inner).ty.as_ref().map(|s| &s.ty), Some(&Ty::bool()));
    }

    #[test]
    fn sibling_scopes_are_isolated() {
        let mut tree = ScopeTree::new();
        let a = tree.new_scope(ScopeId::ROOT);
        let b = tree.new_scope(ScopeId::ROOT);
        declare_var(&mut tree, a, "only_in_a", Ty::int());
        assert!(tree.retrieve_symbol(b, "only_in_a").is_none());
    }

    #[test]
    fn visible_symbols_include_every_enclosing_binding() {
        let mut tree = ScopeTree::new();
        declare_var(&mut tree, ScopeId::ROOT, "g", Ty::int());
        let inner = tree.new_scope(ScopeId::ROOT);
        declare_var(&mut tree, inner, "l", Ty::bool());

        let mut names: Vec<_> = tree
            .visible_symbols(inner)
            .map(|id| tree.symbol(id).name.clone())
            .collect();
        names.sort();
        assert_eq!(names, vec!["g", "l"]);
        assert_eq!(tree.visible_symbols(ScopeId::ROOT).count(), 1);
    }

    #[test]
    fn set_type_fills_slot() {
        let mut tree = ScopeTree::new();
        let f = tree.declare(ScopeId::ROOT, "f", SymbolKind::Fun, Span::default(), None);
        assert!(tree.symbol(f).ty.is_none());
        tree.set_type(f, Scheme::mono(Ty::unit()));
        assert_eq!(tree.symbol(f).ty, Some(Scheme::mono(Ty::unit())));
    }
}
