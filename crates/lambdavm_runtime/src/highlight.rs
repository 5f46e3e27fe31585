//! Syntax highlighting for the REPL.

use std::borrow::Cow;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const LAMBDA: &str = "\x1b[1;32m";
const BINDER: &str = "\x1b[34m";
const COMMAND: &str = "\x1b[36m";
const INVALID: &str = "\x1b[31m";

/// Highlighter for lambda-calculus source and REPL commands.
pub struct LambdaHighlighter {}

impl LambdaHighlighter {
    /// Creates a new highlighter.
    pub const fn new() -> Self {
        Self {}
    }

    /// Highlight a line of input.
    #[allow(clippy::unused_self)]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.trim_start().starts_with(':') {
            return Cow::Owned(format!("{COMMAND}{line}{RESET}"));
        }

        let mut result = String::with_capacity(line.len() * 2);
        let mut chars = line.chars().peekable();
        let mut binder_next = false;

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    result.push_str(LAMBDA);
                    result.push(c);
                    result.push_str(RESET);
                    binder_next = true;
                }

                '(' | ')' => {
                    result.push_str(BOLD);
                    result.push(c);
                    result.push_str(RESET);
                    binder_next = false;
                }

                c if c.is_whitespace() => result.push(c),

                // Symbols; the one right after a backslash is a binder.
                c if c.is_alphabetic() => {
                    let mut word = String::from(c);
                    while let Some(&next) = chars.peek() {
                        if next.is_whitespace() || matches!(next, '(' | ')' | '\\') {
                            break;
                        }
                        word.push(next);
                        chars.next();
                    }

                    if binder_next {
                        result.push_str(BINDER);
                        result.push_str(&word);
                        result.push_str(RESET);
                    } else {
                        result.push_str(&word);
                    }
                    binder_next = false;
                }

                // Nothing else can start a token.
                _ => {
                    result.push_str(INVALID);
                    result.push(c);
                    result.push_str(RESET);
                    binder_next = false;
                }
            }
        }

        Cow::Owned(result)
    }
}

impl Default for LambdaHighlighter {
    fn default() -> Self {
        Self::new()
    }
}
