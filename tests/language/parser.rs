//! Integration tests for the parser
//!
//! Tests parsing of lambdas, applications, and error reporting.

use lambdavm_foundation::ErrorKind;
use lambdavm_language::{Ast, DEFAULT_MAX_DEPTH, Parser, parse, parse_one};

fn parse_message(source: &str) -> (String, u32, u32) {
    match parse_one(source).unwrap_err().kind {
        ErrorKind::ParseError {
            message,
            line,
            column,
            ..
        } => (message, line, column),
        other => panic!("expected parse error, got {other}"),
    }
}

// =============================================================================
// Well-formed Input
// =============================================================================

#[test]
fn parse_symbol() {
    let ast = parse_one("x").unwrap();
    assert_eq!(ast.as_symbol(), Some("x"));
}

#[test]
fn parse_lambda() {
    let ast = parse_one(r"\x \y x").unwrap();
    match &ast {
        Ast::Lambda(param, body, _) => {
            assert_eq!(param, "x");
            assert!(body.is_lambda());
        }
        other => panic!("expected lambda, got {other}"),
    }
}

#[test]
fn parse_application_takes_two_expressions() {
    let ast = parse_one(r"(\x x \y y)").unwrap();
    match &ast {
        Ast::Application(operator, operand, _) => {
            assert_eq!(operator.to_string(), r"\x x");
            assert_eq!(operand.to_string(), r"\y y");
        }
        other => panic!("expected application, got {other}"),
    }
}

#[test]
fn parse_lambda_body_is_one_expression() {
    // the body of \x is just `x`; `\y y` is the operand
    let ast = parse_one(r"(\x x \y y)").unwrap();
    assert!(ast.is_application());
}

#[test]
fn parse_ignores_layout() {
    let a = parse_one("(\\f\n   \\x\n     (f x)\n  \\a a)").unwrap();
    let b = parse_one(r"(\f \x (f x) \a a)").unwrap();
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn parse_display_is_canonical() {
    let source = r"((\f \x (f (f x)) \a a) \b b)";
    assert_eq!(parse_one(source).unwrap().to_string(), source);
}

#[test]
fn parse_records_spans() {
    let ast = parse_one("  (f x)").unwrap();
    let span = ast.span();
    assert_eq!(span.column, 3);
    assert_eq!(span.start, 2);
    assert_eq!(span.end, 7);
}

#[test]
fn parse_many_top_level_expressions() {
    let exprs = parse("\\a a\n(\\x x \\y y)\nz").unwrap();
    assert_eq!(exprs.len(), 3);
    assert!(exprs[0].is_lambda());
    assert!(exprs[1].is_application());
    assert_eq!(exprs[2].as_symbol(), Some("z"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn parse_one_rejects_trailing_input() {
    let (message, _, column) = parse_message(r"\x x y");
    assert!(message.contains("after expression"), "{message}");
    assert_eq!(column, 6);
}

#[test]
fn parse_rejects_empty_input() {
    let (message, line, column) = parse_message("");
    assert_eq!(message, "unexpected end of input");
    assert_eq!((line, column), (1, 1));
}

#[test]
fn parse_rejects_unterminated_application() {
    let (message, _, column) = parse_message(r"(\x x \y y");
    assert_eq!(message, "unterminated application");
    assert_eq!(column, 1);
}

#[test]
fn parse_rejects_three_element_application() {
    let (message, _, _) = parse_message("(f a b)");
    assert!(message.starts_with("expected ')' to end application"), "{message}");
}

#[test]
fn parse_rejects_lambda_without_parameter() {
    let (message, _, _) = parse_message(r"\(x) x");
    assert!(message.starts_with("expected symbol"), "{message}");
}

#[test]
fn parse_rejects_stray_close_paren() {
    let (message, _, _) = parse_message(")");
    assert_eq!(message, "unexpected ')'");
}

#[test]
fn parse_error_carries_source_line() {
    let err = parse_one("(f\n  (a 1))").unwrap_err();
    match err.kind {
        ErrorKind::ParseError { line, context, .. } => {
            assert_eq!(line, 2);
            assert_eq!(context, "  (a 1))");
        }
        other => panic!("expected parse error, got {other}"),
    }
}

// =============================================================================
// Nesting Limit
// =============================================================================

#[test]
fn parse_accepts_nesting_up_to_the_limit() {
    let depth = DEFAULT_MAX_DEPTH - 1;
    let source = format!(r"{}\x x{}", "(x ".repeat(depth), ")".repeat(depth));
    assert!(parse_one(&source).is_ok());
}

#[test]
fn parse_rejects_pathological_nesting() {
    for source in [
        format!("{}x", r"\x ".repeat(100_000)),
        format!("{}x{}", "(x ".repeat(100_000), ")".repeat(100_000)),
    ] {
        let (message, _, _) = parse_message(&source);
        assert!(message.starts_with("expression nested deeper than"), "{message}");
    }
}

#[test]
fn nesting_limit_is_configurable() {
    let source = r"\a \b \c c";
    assert!(Parser::new(source).with_max_depth(2).parse().is_err());
    assert!(Parser::new(source).with_max_depth(3).parse().is_ok());
    assert_eq!(Parser::new(source).max_depth(), DEFAULT_MAX_DEPTH);
}
