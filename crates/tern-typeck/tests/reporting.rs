//! Integration tests for configuration loading, diagnostic rendering and
//! JSON output of inferred schemes.

use std::io::Write;

use tern_ast::bind::bind;
use tern_ast::build::AstBuilder;
use tern_ast::{CompareOp, CompilationUnit, Stmt};
use tern_common::Span;
use tern_typeck::config::TypeckConfig;
use tern_typeck::diagnostics::DiagnosticOptions;
use tern_typeck::error::TypeError;
use tern_typeck::TypeckResult;

// ── Helpers ────────────────────────────────────────────────────────────

fn check_with(stmts: Vec<Stmt>, config: &TypeckConfig) -> TypeckResult {
    let mut unit = CompilationUnit::new(stmts);
    let mut scopes = bind(&mut unit);
    tern_typeck::check_with_config(&unit, &mut scopes, config)
}

/// `fun small n = n < 1;`
fn small_decl(b: &mut AstBuilder) -> Stmt {
    let n = b.var("n");
    let one = b.int(1);
    let cmp = b.compare(CompareOp::Lt, n, one);
    b.fun_decl("small", &["n"], Some(cmp))
}

// ── Config Tests ───────────────────────────────────────────────────────

#[test]
fn config_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[solver]\nmax_passes = 64\n\n[diagnostics]\nfilename = \"prog.tn\"").unwrap();

    let config = TypeckConfig::from_file(file.path()).unwrap();
    assert_eq!(config.solver.max_passes, 64);
    assert_eq!(config.diagnostics.filename, "prog.tn");
    assert!(!config.diagnostics.color);
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = TypeckConfig::from_file(&dir.path().join("tern.toml")).unwrap_err();
    assert!(err.starts_with("Failed to read"), "got: {}", err);
}

#[test]
fn single_pass_cannot_order_deferred_obligations() {
    // The `Ord` obligation on `n` is deferred in the first pass and only
    // dischargeable in a second one.
    let mut b = AstBuilder::new();
    let small = small_decl(&mut b);
    let config = TypeckConfig::from_str("[solver]\nmax_passes = 1\n").unwrap();
    let result = check_with(vec![small], &config);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0],
        TypeError::UnresolvedConstraint { .. }
    ));

    let mut b = AstBuilder::new();
    let small = small_decl(&mut b);
    let result = check_with(vec![small], &TypeckConfig::default());
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.schemes["small"].to_string(), "(int) -> bool");
}

// ── Diagnostic Tests ───────────────────────────────────────────────────

#[test]
fn rendered_mismatch_points_at_the_value() {
    let source = "var x = 'c' + true;";
    let mut b = AstBuilder::new();
    let c = b.char('c');
    let t = b.bool(true);
    let sum = b.add(c, t);
    let x = b.var_decl("x", None, sum);
    let result = check_with(vec![x], &TypeckConfig::default());
    assert_eq!(result.errors.len(), 1);

    let rendered = result.render_errors(source, "main.tn", &DiagnosticOptions::colorless());
    assert_eq!(rendered.len(), 1);
    let report = &rendered[0];
    assert!(report.contains("E0001"), "{}", report);
    assert!(report.contains("type mismatch: expected `int`, found `bool`"), "{}", report);
    assert!(report.contains("main.tn"), "{}", report);
}

#[test]
fn rendered_unbound_name_uses_configured_filename() {
    let source = "var y = z;";
    let mut b = AstBuilder::starting_at(8);
    let z = b.var("z");
    let y = b.var_decl("y", None, z);
    let config = TypeckConfig::from_str("[diagnostics]\nfilename = \"lib.tn\"\n").unwrap();
    let result = check_with(vec![y], &config);

    let rendered = result.render_with_config(source, &config.diagnostics);
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("E0004"), "{}", rendered[0]);
    assert!(rendered[0].contains("lib.tn"), "{}", rendered[0]);
    assert!(rendered[0].contains("unbound name `z`"), "{}", rendered[0]);
}

#[test]
fn unresolved_constraint_message() {
    let err = TypeError::UnresolvedConstraint {
        constraint: "Eq(?3)".to_string(),
        origin: tern_typeck::error::ConstraintOrigin::Comparison {
            op_span: Span::new(0, 6),
        },
    };
    let report = tern_typeck::diagnostics::render_diagnostic(
        &err,
        "a == b",
        "main.tn",
        &DiagnosticOptions::colorless(),
    );
    assert!(report.contains("E0009"), "{}", report);
    assert!(report.contains("add a type annotation"), "{}", report);
}

// ── JSON Tests ─────────────────────────────────────────────────────────

#[test]
fn schemes_as_json() {
    let mut b = AstBuilder::new();
    let x = b.var("x");
    let id = b.fun_decl("id", &["x"], Some(x));
    let small = small_decl(&mut b);
    let result = check_with(vec![id, small], &TypeckConfig::default());

    assert_eq!(
        result.schemes_json(),
        serde_json::json!({
            "id": "forall a. (a) -> a",
            "small": "(int) -> bool",
        })
    );
}
