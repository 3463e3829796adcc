use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("cannot assign 'f32' to 'i32'")
        .with_label(Span::new(0, 5), "")
        .with_secondary_label(Span::new(10, 12), "'x' declared here")
        .with_note("some context");

    assert_eq!(diag.code, ErrorCode::E2001);
    assert!(diag.is_error());
    assert!(!diag.is_warning());
    assert_eq!(diag.labels.len(), 2);
    assert!(diag.labels[0].is_primary);
    assert!(!diag.labels[1].is_primary);
    assert_eq!(diag.primary_span(), Some(Span::new(0, 5)));
    assert_eq!(
        diag.secondary_messages().collect::<Vec<_>>(),
        vec!["'x' declared here"]
    );
}

#[test]
fn test_display_skips_empty_label_message() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("unknown identifier: 'x'")
        .with_label(Span::new(3, 4), "");

    assert_eq!(
        diag.to_string(),
        "error [E1001]: unknown identifier: 'x'\n  --> 3..4"
    );
}

#[test]
fn test_display_with_secondary_and_note() {
    let diag = Diagnostic::warning(ErrorCode::E2020)
        .with_message("use of deprecated builtin")
        .with_label(Span::new(0, 1), "here")
        .with_secondary_label(Span::new(5, 6), "declared")
        .with_note("see docs");

    assert_eq!(
        diag.to_string(),
        "warning [E2020]: use of deprecated builtin\n  --> 0..1: here\n      5..6: declared\n  = note: see docs"
    );
}

#[test]
fn test_note_severity() {
    let diag = Diagnostic::note(ErrorCode::E2001);
    assert_eq!(diag.severity, Severity::Note);
    assert_eq!(Severity::Note.to_string(), "note");
}
