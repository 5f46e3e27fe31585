//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use lambdavm_foundation::{Error, ErrorContext, ErrorKind, StackKind, ValueKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unbound_symbol() {
    let err = Error::unbound_symbol("foo");
    assert!(matches!(err.kind, ErrorKind::UnboundSymbol(ref name) if name == "foo"));
    assert_eq!(err.to_string(), "unbound symbol: foo");
}

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch(ValueKind::Closure, ValueKind::Address);
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert_eq!(
        err.to_string(),
        "type mismatch: expected closure, got address"
    );
}

#[test]
fn error_stack_exhausted() {
    let err = Error::stack_exhausted(StackKind::Return, 1024);
    assert_eq!(err.to_string(), "return stack exhausted (capacity 1024)");
    assert!(err.is_exhaustion());
}

#[test]
fn error_stack_underflow() {
    let err = Error::stack_underflow(StackKind::Environment);
    assert_eq!(err.to_string(), "environment stack underflow");
    assert!(!err.is_exhaustion());
}

#[test]
fn error_step_limit_is_exhaustion() {
    let err = Error::new(ErrorKind::StepLimitExceeded(500));
    assert!(err.is_exhaustion());
    assert!(err.to_string().contains("500"));
}

#[test]
fn error_malformed_result() {
    let err = Error::new(ErrorKind::MalformedResult { depth: 3 });
    assert!(err.to_string().contains("3 values"));
}

#[test]
fn error_parse_error_display() {
    let err = Error::new(ErrorKind::ParseError {
        message: "unexpected ')'".to_string(),
        line: 2,
        column: 4,
        context: "  ))".to_string(),
    });
    assert_eq!(err.to_string(), "parse error at 2:4: unexpected ')'");
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_without_context() {
    let err = Error::unbound_symbol("x");
    assert!(err.context.is_none());
}

#[test]
fn error_with_full_context() {
    let err = Error::unbound_symbol("x").with_context(
        ErrorContext::new()
            .with_source("church.lam")
            .with_position(3, 9),
    );
    let ctx = err.context.unwrap();
    assert_eq!(ctx.source.as_deref(), Some("church.lam"));
    assert_eq!(ctx.to_string(), "at church.lam:3:9");
}

#[test]
fn error_context_display_variants() {
    assert_eq!(ErrorContext::new().to_string(), "");
    assert_eq!(ErrorContext::new().with_position(1, 2).to_string(), "at 1:2");
    assert_eq!(
        ErrorContext::new().with_source("repl").to_string(),
        "at repl"
    );
}

#[test]
fn error_is_std_error() {
    fn takes_std_error(_: &dyn std::error::Error) {}
    takes_std_error(&Error::new(ErrorKind::Internal("io".to_string())));
}
