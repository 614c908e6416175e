//! Ariadne-based diagnostic rendering for type errors.
//!
//! Renders `TypeError` variants into labeled reports. Each report carries a
//! stable error code, a terse message, a label at the span of the
//! constraint that failed, and a hint when one is useful.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use tern_common::Span;
use tern_types::Ty;

use crate::builtins::TraitTable;
use crate::config::DiagnosticsConfig;
use crate::error::{ConstraintOrigin, TypeError};

/// Rendering switches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticOptions {
    pub color: bool,
}

impl DiagnosticOptions {
    /// Plain text output, as used by tests and log files.
    pub fn colorless() -> Self {
        DiagnosticOptions { color: false }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self::colorless()
    }
}

impl From<&DiagnosticsConfig> for DiagnosticOptions {
    fn from(config: &DiagnosticsConfig) -> Self {
        DiagnosticOptions {
            color: config.color,
        }
    }
}

// ── Error Codes ────────────────────────────────────────────────────────

/// Assign a unique error code to each TypeError variant.
pub fn error_code(err: &TypeError) -> &'static str {
    match err {
        TypeError::Mismatch { .. } => "E0001",
        TypeError::OccursCheck { .. } => "E0002",
        TypeError::ArityMismatch { .. } => "E0003",
        TypeError::UnboundName { .. } => "E0004",
        TypeError::ArgumentCountMismatch { .. } => "E0005",
        TypeError::StructArityMismatch { .. } => "E0006",
        TypeError::NotAStruct { .. } => "E0007",
        TypeError::TraitNotSatisfied { .. } => "E0008",
        TypeError::UnresolvedConstraint { .. } => "E0009",
    }
}

// ── Hints ──────────────────────────────────────────────────────────────

fn mismatch_hint(expected: &Ty, found: &Ty, traits: &TraitTable) -> Option<String> {
    match (expected, found) {
        (Ty::Con(e), Ty::Con(_)) if traits.converts(found, expected) => {
            Some(format!("use `as {}` to convert explicitly", e))
        }
        (Ty::Ptr(_), other) if !matches!(other, Ty::Ptr(_) | Ty::Var(_)) => {
            Some("take the address with `&`".to_string())
        }
        (other, Ty::Ptr(_)) if !matches!(other, Ty::Ptr(_) | Ty::Var(_)) => {
            Some("dereference the pointer with `*`".to_string())
        }
        _ => None,
    }
}

fn trait_hint(trait_name: &str) -> Option<&'static str> {
    match trait_name {
        "Eq" => Some("only scalars and pointers can be compared for equality"),
        "Ord" => Some("only `int` and `char` can be ordered"),
        "Callable" => Some("only functions can be called"),
        name if name.starts_with("HasField") => Some("field access needs a struct with that field"),
        name if name.starts_with("ConvertibleTo") => {
            Some("casts are allowed between `int` and `char`, from `bool` to `int`, and between pointers")
        }
        _ => None,
    }
}

// ── Main Rendering Function ────────────────────────────────────────────

/// Render a type error into a report using ariadne.
///
/// Cast hints are drawn from the compiler-known trait table, the one the
/// checker itself consults.
pub fn render_diagnostic(
    error: &TypeError,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    let config = Config::default().with_color(options.color);
    let traits = TraitTable::builtin();
    let source_len = source.len();

    // Clamp a span to the source bounds; ariadne needs at least one char.
    let clamp = |span: Option<Span>| -> Range<usize> {
        let r = span.map(Span::to_range).unwrap_or(0..0);
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    let span = clamp(error.span());
    let mut builder = Report::build(ReportKind::Error, (filename, span.clone()))
        .with_code(error_code(error))
        .with_message(error.to_string())
        .with_config(config);

    match error {
        TypeError::Mismatch {
            expected,
            found,
            origin,
        } => {
            if let ConstraintOrigin::IfBranches {
                then_span,
                else_span: Some(else_span),
                ..
            } = origin
            {
                builder.add_label(
                    Label::new((filename, clamp(Some(*then_span))))
                        .with_message(format!("this branch is `{}`", expected))
                        .with_color(Color::Red),
                );
                builder.add_label(
                    Label::new((filename, clamp(Some(*else_span))))
                        .with_message(format!("this branch is `{}`", found))
                        .with_color(Color::Blue),
                );
            } else {
                builder.add_label(
                    Label::new((filename, span))
                        .with_message(format!(
                            "{}: expected `{}`, found `{}`",
                            origin.describe(),
                            expected,
                            found
                        ))
                        .with_color(Color::Red),
                );
            }
            if let Some(hint) = mismatch_hint(expected, found, &traits) {
                builder.set_help(hint);
            }
        }

        TypeError::OccursCheck { origin, .. } => {
            builder.add_label(
                Label::new((filename, span))
                    .with_message(format!("recursive type in {}", origin.describe()))
                    .with_color(Color::Red),
            );
            builder.set_help("a value cannot have a type that refers to itself");
        }

        TypeError::ArityMismatch {
            expected, origin, ..
        } => {
            builder.add_label(
                Label::new((filename, span))
                    .with_message(format!("{}: expected {} element(s)", origin.describe(), expected))
                    .with_color(Color::Red),
            );
        }

        TypeError::UnboundName { name, .. } => {
            builder.add_label(
                Label::new((filename, span))
                    .with_message(format!("`{}` is not declared in this scope", name))
                    .with_color(Color::Red),
            );
        }

        TypeError::ArgumentCountMismatch {
            expected, found, ..
        } => {
            builder.add_label(
                Label::new((filename, span))
                    .with_message(format!("expected {} argument(s)", expected))
                    .with_color(Color::Red),
            );
            if expected > found {
                builder.set_help(format!("missing {} argument(s)", expected - found));
            } else {
                builder.set_help(format!("{} extra argument(s)", found - expected));
            }
        }

        TypeError::StructArityMismatch { expected, .. } => {
            builder.add_label(
                Label::new((filename, span))
                    .with_message(format!("expected {} value(s), one per field", expected))
                    .with_color(Color::Red),
            );
        }

        TypeError::NotAStruct { name, .. } => {
            builder.add_label(
                Label::new((filename, span))
                    .with_message(format!("`{}` does not name a struct type", name))
                    .with_color(Color::Red),
            );
        }

        TypeError::TraitNotSatisfied {
            ty,
            trait_name,
            origin,
        } => {
            builder.add_label(
                Label::new((filename, span))
                    .with_message(format!("{} has type `{}`", origin.describe(), ty))
                    .with_color(Color::Red),
            );
            if let Some(hint) = trait_hint(trait_name) {
                builder.set_help(hint);
            }
        }

        TypeError::UnresolvedConstraint { origin, .. } => {
            builder.add_label(
                Label::new((filename, span))
                    .with_message(format!("type of {} is unknown", origin.describe()))
                    .with_color(Color::Red),
            );
            builder.set_help("add a type annotation");
        }
    }

    let mut buf = Vec::new();
    builder
        .finish()
        .write((filename, Source::from(source)), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8_lossy(&buf).into_owned()
}
