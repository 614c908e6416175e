//! Integration tests for deferred trait obligations: comparisons, struct
//! construction and field access, and casts.

use tern_ast::bind::bind;
use tern_ast::build::AstBuilder;
use tern_ast::{CompareOp, CompilationUnit, Stmt};
use tern_typeck::error::TypeError;
use tern_typeck::TypeckResult;
use tern_types::{Ty, TyCon};

// ── Helpers ────────────────────────────────────────────────────────────

fn check_stmts(stmts: Vec<Stmt>) -> TypeckResult {
    let mut unit = CompilationUnit::new(stmts);
    let mut scopes = bind(&mut unit);
    tern_typeck::check(&unit, &mut scopes)
}

fn assert_clean(result: &TypeckResult) {
    assert!(
        result.errors.is_empty(),
        "expected no errors, got: {:?}",
        result.errors
    );
}

fn global(result: &TypeckResult, name: &str) -> String {
    result.globals[name].to_string()
}

/// Assert that the only error is an unsatisfied `trait_name` obligation.
fn assert_unsatisfied(result: &TypeckResult, trait_name: &str) {
    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    match &result.errors[0] {
        TypeError::TraitNotSatisfied { trait_name: name, .. } => assert_eq!(name, trait_name),
        other => panic!("expected `{}` not satisfied, got {:?}", trait_name, other),
    }
}

/// `type Point = struct { x: int, y: char };`
fn point_decl(b: &mut AstBuilder) -> Stmt {
    b.type_decl(
        "Point",
        Ty::anon_struct(vec![("x".into(), Ty::int()), ("y".into(), Ty::char())]),
    )
}

// ── Comparison Tests ───────────────────────────────────────────────────

#[test]
fn ints_are_ordered() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let two = b.int(2);
    let cmp = b.compare(CompareOp::Lt, one, two);
    let r = b.var_decl("r", None, cmp);

    let result = check_stmts(vec![r]);
    assert_clean(&result);
    assert_eq!(global(&result, "r"), "bool");
}

#[test]
fn bools_have_equality_but_no_order() {
    let mut b = AstBuilder::new();
    let t = b.bool(true);
    let f = b.bool(false);
    let eq = b.compare(CompareOp::Eq, t, f);
    let ok = b.var_decl("ok", None, eq);
    let t = b.bool(true);
    let f = b.bool(false);
    let le = b.compare(CompareOp::Le, t, f);
    let bad = b.var_decl("bad", None, le);

    let result = check_stmts(vec![ok, bad]);
    assert_eq!(global(&result, "ok"), "bool");
    assert_unsatisfied(&result, "Ord");
}

#[test]
fn pointers_compare_for_equality() {
    let mut b = AstBuilder::new();
    let s = b.string("a");
    let t = b.string("b");
    let ne = b.compare(CompareOp::Ne, s, t);
    let r = b.var_decl("r", None, ne);

    let result = check_stmts(vec![r]);
    assert_clean(&result);
}

#[test]
fn structs_have_no_equality() {
    let mut b = AstBuilder::new();
    let point = point_decl(&mut b);
    let one = b.int(1);
    let c = b.char('c');
    let left = b.struct_init("Point", vec![one, c]);
    let two = b.int(2);
    let d = b.char('d');
    let right = b.struct_init("Point", vec![two, d]);
    let eq = b.compare(CompareOp::Eq, left, right);
    let r = b.var_decl("r", None, eq);

    let result = check_stmts(vec![point, r]);
    assert_unsatisfied(&result, "Eq");
}

#[test]
fn operands_of_different_types_mismatch() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let c = b.char('c');
    let cmp = b.compare(CompareOp::Gt, one, c);
    let r = b.var_decl("r", None, cmp);

    let result = check_stmts(vec![r]);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], TypeError::Mismatch { .. }));
}

#[test]
fn comparison_fixed_by_body_is_resolved() {
    // fun positive n = n > 0;
    let mut b = AstBuilder::new();
    let n = b.var("n");
    let zero = b.int(0);
    let cmp = b.compare(CompareOp::Gt, n, zero);
    let positive = b.fun_decl("positive", &["n"], Some(cmp));

    let result = check_stmts(vec![positive]);
    assert_clean(&result);
    assert_eq!(result.schemes["positive"].to_string(), "(int) -> bool");
}

#[test]
fn comparison_on_unconstrained_parameter_is_unresolved() {
    // fun same a b = a == b;
    let mut b = AstBuilder::new();
    let a = b.var("a");
    let bv = b.var("b");
    let cmp = b.compare(CompareOp::Eq, a, bv);
    let same = b.fun_decl("same", &["a", "b"], Some(cmp));

    let result = check_stmts(vec![same]);
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        TypeError::UnresolvedConstraint { constraint, .. } => {
            assert!(constraint.starts_with("Eq("), "got: {}", constraint)
        }
        other => panic!("expected unresolved constraint, got {:?}", other),
    }
    assert!(!result.schemes.contains_key("same"));
}

// ── Struct Tests ───────────────────────────────────────────────────────

#[test]
fn struct_init_and_field_access() {
    let mut b = AstBuilder::new();
    let point = point_decl(&mut b);
    let one = b.int(1);
    let c = b.char('c');
    let init = b.struct_init("Point", vec![one, c]);
    let p = b.var_decl("p", None, init);
    let pr = b.var("p");
    let access = b.field(pr, "y");
    let access_span = access.span();
    let y = b.var_decl("y", None, access);

    let result = check_stmts(vec![point, p, y]);
    assert_clean(&result);
    assert_eq!(global(&result, "p"), "Point");
    assert_eq!(global(&result, "y"), "char");
    assert_eq!(result.types[&access_span], Ty::char());
}

#[test]
fn struct_field_value_mismatch() {
    let mut b = AstBuilder::new();
    let point = point_decl(&mut b);
    let one = b.int(1);
    let two = b.int(2);
    let init = b.struct_init("Point", vec![one, two]);
    let p = b.var_decl("p", None, init);

    let result = check_stmts(vec![point, p]);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        &result.errors[0],
        TypeError::Mismatch { expected, found, .. } if *expected == Ty::char() && *found == Ty::int()
    ));
}

#[test]
fn struct_init_with_too_few_values() {
    let mut b = AstBuilder::new();
    let point = point_decl(&mut b);
    let one = b.int(1);
    let init = b.struct_init("Point", vec![one]);
    let p = b.var_decl("p", None, init);

    let result = check_stmts(vec![point, p]);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        &result.errors[0],
        TypeError::StructArityMismatch { struct_name, expected: 2, found: 1, .. } if struct_name == "Point"
    ));
}

#[test]
fn struct_init_of_a_variable_is_not_a_struct() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let n = b.var_decl("n", None, one);
    let two = b.int(2);
    let init = b.struct_init("n", vec![two]);
    let stmt = b.expr_stmt(init);

    let result = check_stmts(vec![n, stmt]);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        &result.errors[0],
        TypeError::NotAStruct { name, ty, .. } if name == "n" && *ty == Ty::int()
    ));
}

#[test]
fn missing_field_is_not_satisfied() {
    let mut b = AstBuilder::new();
    let point = point_decl(&mut b);
    let one = b.int(1);
    let c = b.char('c');
    let init = b.struct_init("Point", vec![one, c]);
    let z = b.field(init, "z");
    let r = b.var_decl("r", None, z);

    let result = check_stmts(vec![point, r]);
    assert_unsatisfied(&result, "HasField `z`");
}

#[test]
fn field_access_on_int_is_not_satisfied() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let x = b.field(one, "x");
    let r = b.var_decl("r", None, x);

    let result = check_stmts(vec![r]);
    assert_unsatisfied(&result, "HasField `x`");
}

#[test]
fn field_access_on_unknown_parameter_is_unresolved() {
    // fun get p = p.x;
    let mut b = AstBuilder::new();
    let p = b.var("p");
    let access = b.field(p, "x");
    let get = b.fun_decl("get", &["p"], Some(access));

    let result = check_stmts(vec![get]);
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        TypeError::UnresolvedConstraint { constraint, .. } => {
            assert!(constraint.starts_with("HasField("), "got: {}", constraint)
        }
        other => panic!("expected unresolved constraint, got {:?}", other),
    }
}

#[test]
fn nested_struct_fields() {
    // type Line = struct { from: Point, to: Point };
    let mut b = AstBuilder::new();
    let point = point_decl(&mut b);
    let line = b.type_decl(
        "Line",
        Ty::anon_struct(vec![
            ("from".into(), Ty::named_struct("Point", vec![
                ("x".into(), Ty::int()),
                ("y".into(), Ty::char()),
            ])),
            ("to".into(), Ty::named_struct("Point", vec![
                ("x".into(), Ty::int()),
                ("y".into(), Ty::char()),
            ])),
        ]),
    );
    let one = b.int(1);
    let c = b.char('c');
    let from = b.struct_init("Point", vec![one, c]);
    let two = b.int(2);
    let d = b.char('d');
    let to = b.struct_init("Point", vec![two, d]);
    let init = b.struct_init("Line", vec![from, to]);
    let l = b.var_decl("l", None, init);
    let lr = b.var("l");
    let to_field = b.field(lr, "to");
    let x_field = b.field(to_field, "x");
    let x = b.var_decl("x", None, x_field);

    let result = check_stmts(vec![point, line, l, x]);
    assert_clean(&result);
    assert_eq!(global(&result, "l"), "Line");
    assert_eq!(global(&result, "x"), "int");
}

// ── Cast Tests ─────────────────────────────────────────────────────────

#[test]
fn int_casts_to_char() {
    let mut b = AstBuilder::new();
    let n = b.int(65);
    let cast = b.cast(n, Some(Ty::char()));
    let c = b.var_decl("c", None, cast);

    let result = check_stmts(vec![c]);
    assert_clean(&result);
    assert_eq!(global(&result, "c"), "char");
}

#[test]
fn bool_casts_to_int_but_not_to_char() {
    let mut b = AstBuilder::new();
    let t = b.bool(true);
    let cast = b.cast(t, Some(Ty::int()));
    let ok = b.var_decl("ok", None, cast);
    let t = b.bool(true);
    let cast = b.cast(t, Some(Ty::char()));
    let bad = b.var_decl("bad", None, cast);

    let result = check_stmts(vec![ok, bad]);
    assert_eq!(global(&result, "ok"), "int");
    assert_unsatisfied(&result, "ConvertibleTo `char`");
}

#[test]
fn pointer_casts_between_pointee_types() {
    let mut b = AstBuilder::new();
    let s = b.string("bytes");
    let cast = b.cast(s, Some(Ty::ptr(Ty::int())));
    let p = b.var_decl("p", None, cast);

    let result = check_stmts(vec![p]);
    assert_clean(&result);
    assert_eq!(global(&result, "p"), "*int");
}

#[test]
fn cast_waits_for_source_type() {
    // fun code(c: char): int = (c as int) + 0;
    let mut b = AstBuilder::new();
    let c = b.var("c");
    let cast = b.cast(c, Some(Ty::int()));
    let zero = b.int(0);
    let sum = b.add(cast, zero);
    let code = b.fun_decl_with_hint(
        "code",
        &["c"],
        Some(sum),
        Some(Ty::fun(vec![Ty::char()], Ty::int())),
    );

    let result = check_stmts(vec![code]);
    assert_clean(&result);
    assert_eq!(result.schemes["code"].to_string(), "(char) -> int");
}

#[test]
fn struct_value_casts_to_its_own_name() {
    let mut b = AstBuilder::new();
    let point = point_decl(&mut b);
    let one = b.int(1);
    let c = b.char('c');
    let init = b.struct_init("Point", vec![one, c]);
    let cast = b.cast(init, Some(Ty::Con(TyCon::new("Point"))));
    let q = b.var_decl("q", None, cast);

    let result = check_stmts(vec![point, q]);
    assert_clean(&result);
    assert_eq!(global(&result, "q"), "Point");
}

#[test]
fn struct_value_does_not_cast_to_another_struct() {
    let mut b = AstBuilder::new();
    let point = point_decl(&mut b);
    let line = b.type_decl("Line", Ty::anon_struct(vec![("len".into(), Ty::int())]));
    let one = b.int(1);
    let c = b.char('c');
    let init = b.struct_init("Point", vec![one, c]);
    let cast = b.cast(init, Some(Ty::Con(TyCon::new("Line"))));
    let q = b.var_decl("q", None, cast);

    let result = check_stmts(vec![point, line, q]);
    assert_unsatisfied(&result, "ConvertibleTo `Line`");
}
