//! Parser for lambda-calculus source text.
//!
//! ```text
//! expr        := lambda | application | symbol
//! lambda      := '\' symbol expr
//! application := '(' expr expr ')'
//! ```
//!
//! The grammar is parsed with an explicit stack of open constructs rather than
//! native recursion, and nesting is capped at [`Parser::max_depth`] so that
//! arbitrarily deep input is reported as an error.

use lambdavm_foundation::{Error, ErrorKind, Result};

use crate::ast::Ast;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Default limit on how many lambdas and applications may enclose a term.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// A construct whose remaining parts are still being parsed.
enum Open {
    /// `\param` seen; waiting for the body.
    Lambda { param: String, start: Span },
    /// `(` seen; waiting for the operator.
    Operator { start: Span },
    /// Operator parsed; waiting for the operand and `)`.
    Operand { operator: Ast, start: Span },
}

impl Open {
    const fn start(&self) -> Span {
        match self {
            Self::Lambda { start, .. } | Self::Operator { start } | Self::Operand { start, .. } => {
                *start
            }
        }
    }
}

/// Parser for lambda-calculus source code.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Source text (for error messages).
    source: &'src str,
    /// Maximum nesting depth.
    max_depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the nesting limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the nesting limit.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parses exactly one expression; anything after it is an error.
    ///
    /// # Errors
    /// Returns an error if the source is not a single well-formed expression.
    pub fn parse(&mut self) -> Result<Ast> {
        let expr = self.parse_expr()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.error(&format!(
                "unexpected {} after expression",
                self.current.kind.name()
            )));
        }
        Ok(expr)
    }

    /// Parses a sequence of top-level expressions.
    ///
    /// # Errors
    /// Returns an error if any expression is malformed.
    pub fn parse_all(&mut self) -> Result<Vec<Ast>> {
        let mut exprs = Vec::new();
        while self.current.kind != TokenKind::Eof {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_expr(&mut self) -> Result<Ast> {
        let mut open: Vec<Open> = Vec::new();

        loop {
            // Descend through lambda and application openers to a symbol.
            let mut expr = loop {
                match &self.current.kind {
                    TokenKind::Backslash => {
                        let start = self.current.span;
                        self.advance();
                        let (param, _) = self.expect_symbol()?;
                        self.push_open(&mut open, Open::Lambda { param, start })?;
                    }
                    TokenKind::LParen => {
                        let start = self.current.span;
                        self.advance();
                        self.push_open(&mut open, Open::Operator { start })?;
                    }
                    TokenKind::Symbol(_) => {
                        let (name, span) = self.expect_symbol()?;
                        break Ast::Symbol(name, span);
                    }
                    TokenKind::Eof => return Err(self.error("unexpected end of input")),
                    TokenKind::Error(msg) => return Err(self.error(msg)),
                    TokenKind::RParen => return Err(self.error("unexpected ')'")),
                }
            };

            // Close every construct the finished expression completes.
            loop {
                match open.pop() {
                    None => return Ok(expr),
                    Some(Open::Lambda { param, start }) => {
                        let span = start.to(expr.span());
                        expr = Ast::Lambda(param, Box::new(expr), span);
                    }
                    Some(Open::Operator { start }) => {
                        open.push(Open::Operand {
                            operator: expr,
                            start,
                        });
                        break;
                    }
                    Some(Open::Operand { operator, start }) => {
                        let end = self.expect_close(start)?;
                        expr = Ast::Application(Box::new(operator), Box::new(expr), start.to(end));
                    }
                }
            }
        }
    }

    fn push_open(&self, open: &mut Vec<Open>, construct: Open) -> Result<()> {
        if open.len() >= self.max_depth {
            return Err(self.error_at(construct.start(), &format!(
                "expression nested deeper than {} levels",
                self.max_depth
            )));
        }
        open.push(construct);
        Ok(())
    }

    /// Consumes the `)` ending an application opened at `start`.
    fn expect_close(&mut self, start: Span) -> Result<Span> {
        match self.current.kind {
            TokenKind::RParen => {}
            TokenKind::Eof => return Err(self.error_at(start, "unterminated application")),
            _ => {
                return Err(self.error(&format!(
                    "expected ')' to end application, found {}",
                    self.current.kind.name()
                )));
            }
        }
        let end = self.current.span;
        self.advance();
        Ok(end)
    }

    fn expect_symbol(&mut self) -> Result<(String, Span)> {
        if let TokenKind::Symbol(name) = &self.current.kind {
            let name = name.clone();
            let span = self.current.span;
            self.advance();
            Ok((name, span))
        } else {
            Err(self.error(&format!(
                "expected symbol, found {}",
                self.current.kind.name()
            )))
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a parse error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.to_string(),
            line: span.line,
            column: span.column,
            context: self.context_at(span),
        })
    }

    /// Returns the source line containing a span.
    fn context_at(&self, span: Span) -> String {
        let line_start = self.source[..span.start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[span.start..]
            .find('\n')
            .map_or(self.source.len(), |i| span.start + i);

        self.source[line_start..line_end].to_string()
    }
}

/// Parses every top-level expression in the source.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse(source: &str) -> Result<Vec<Ast>> {
    Parser::new(source).parse_all()
}

/// Parses source that must contain exactly one expression.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse_one(source: &str) -> Result<Ast> {
    Parser::new(source).parse()
}
