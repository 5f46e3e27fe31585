//! Direct evaluator over the AST.
//!
//! The interpreter evaluates a term by walking its tree, call-by-value with
//! lexically scoped environments, and never compiles it. Its closures pair a
//! lambda node with the bindings in effect when the lambda was evaluated; it
//! reaches the same closure as the VM for every program both finish, which
//! makes it the reference the compiler is checked against.
//!
//! Evaluation keeps its own continuation stack instead of recursing.
//! Nested calls are limited like the VM's saved-environment stack, and an
//! optional step budget counts one step per node evaluated.

use std::fmt;
use std::rc::Rc;

use lambdavm_foundation::{Error, ErrorContext, ErrorKind, Result, StackKind};

use crate::ast::Ast;
use crate::parser::parse;
use crate::vm::{DEFAULT_STACK_CAPACITY, VmConfig};

/// A lambda together with the bindings it closed over.
#[derive(Clone)]
pub struct TermClosure<'a> {
    lambda: &'a Ast,
    param: &'a str,
    body: &'a Ast,
    env: Bindings<'a>,
}

impl<'a> TermClosure<'a> {
    /// Returns the lambda node this closure was made from.
    #[must_use]
    pub const fn lambda(&self) -> &'a Ast {
        self.lambda
    }

    /// Returns the number of bindings captured.
    #[must_use]
    pub fn env_depth(&self) -> usize {
        self.env.depth()
    }

    /// Returns the value bound to `name` in the captured environment.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TermClosure<'a>> {
        self.env.lookup(name)
    }
}

impl fmt::Display for TermClosure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lambda)
    }
}

impl fmt::Debug for TermClosure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TermClosure({}, depth={})", self.lambda, self.env_depth())
    }
}

struct Binding<'a> {
    name: &'a str,
    value: TermClosure<'a>,
    next: Bindings<'a>,
}

/// Name-keyed environment chain, innermost first.
#[derive(Clone, Default)]
struct Bindings<'a>(Option<Rc<Binding<'a>>>);

impl<'a> Bindings<'a> {
    fn bind(&self, name: &'a str, value: TermClosure<'a>) -> Self {
        Self(Some(Rc::new(Binding {
            name,
            value,
            next: self.clone(),
        })))
    }

    fn lookup(&self, name: &str) -> Option<&TermClosure<'a>> {
        let mut cursor = self.0.as_deref();
        while let Some(binding) = cursor {
            if binding.name == name {
                return Some(&binding.value);
            }
            cursor = binding.next.0.as_deref();
        }
        None
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.0.as_deref();
        while let Some(binding) = cursor {
            depth += 1;
            cursor = binding.next.0.as_deref();
        }
        depth
    }
}

impl Drop for Bindings<'_> {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut binding) => next = binding.next.0.take(),
                Err(_) => break,
            }
        }
    }
}

/// Work left to do once the current expression has a value.
enum Continuation<'a> {
    /// The operand is done; evaluate the operator next.
    Operator { operator: &'a Ast, env: Bindings<'a> },
    /// Apply the operator value to this argument.
    Apply { argument: TermClosure<'a> },
    /// A call's body is running; its value is the call's value.
    Return,
}

enum State<'a> {
    Eval(&'a Ast, Bindings<'a>),
    Value(TermClosure<'a>),
}

/// Tree-walking evaluator.
#[derive(Debug, Clone)]
pub struct Interpreter {
    max_calls: usize,
    max_steps: Option<u64>,
    steps: u64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter with the default call depth and no step budget.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_calls: DEFAULT_STACK_CAPACITY,
            max_steps: None,
            steps: 0,
        }
    }

    /// Creates an interpreter with the call depth and step budget of a VM
    /// configuration.
    #[must_use]
    pub const fn with_config(config: &VmConfig) -> Self {
        Self {
            max_calls: config.env_capacity,
            max_steps: config.max_steps,
            steps: 0,
        }
    }

    /// Number of nodes evaluated by the last (or current) run.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Evaluates a closed term to a closure.
    ///
    /// # Errors
    /// Returns an unbound-symbol error if evaluation reaches a free symbol, a
    /// stack-exhausted error if calls nest deeper than the limit, or a
    /// step-limit error once the budget is spent.
    pub fn eval<'a>(&mut self, ast: &'a Ast) -> Result<TermClosure<'a>> {
        self.steps = 0;
        let mut calls = 0usize;
        let mut continuations: Vec<Continuation<'a>> = Vec::new();
        let mut state = State::Eval(ast, Bindings::default());

        loop {
            state = match state {
                State::Eval(node, env) => {
                    self.charge_step()?;
                    match node {
                        Ast::Symbol(name, span) => {
                            let value = env.lookup(name).cloned().ok_or_else(|| {
                                Error::unbound_symbol(name.as_str()).with_context(
                                    ErrorContext::new()
                                        .with_position(span.line as usize, span.column as usize),
                                )
                            })?;
                            State::Value(value)
                        }
                        Ast::Lambda(param, body, _) => State::Value(TermClosure {
                            lambda: node,
                            param,
                            body,
                            env,
                        }),
                        Ast::Application(operator, operand, _) => {
                            continuations.push(Continuation::Operator {
                                operator,
                                env: env.clone(),
                            });
                            State::Eval(operand, env)
                        }
                    }
                }
                State::Value(value) => match continuations.pop() {
                    None => return Ok(value),
                    Some(Continuation::Operator { operator, env }) => {
                        continuations.push(Continuation::Apply { argument: value });
                        State::Eval(operator, env)
                    }
                    Some(Continuation::Apply { argument }) => {
                        if calls >= self.max_calls {
                            return Err(Error::stack_exhausted(
                                StackKind::Environment,
                                self.max_calls,
                            ));
                        }
                        calls += 1;
                        continuations.push(Continuation::Return);
                        State::Eval(value.body, value.env.bind(value.param, argument))
                    }
                    Some(Continuation::Return) => {
                        calls -= 1;
                        State::Value(value)
                    }
                },
            };
        }
    }

    fn charge_step(&mut self) -> Result<()> {
        if let Some(max) = self.max_steps {
            if self.steps >= max {
                return Err(Error::new(ErrorKind::StepLimitExceeded(max)));
            }
        }
        self.steps += 1;
        Ok(())
    }
}

/// Parses `source` and evaluates every expression with the interpreter,
/// returning the last result printed as a lambda term.
///
/// # Errors
/// Returns the first parse or evaluation error.
pub fn interpret(source: &str) -> Result<Option<String>> {
    let exprs = parse(source)?;
    let mut interpreter = Interpreter::new();
    let mut last = None;
    for expr in &exprs {
        last = Some(interpreter.eval(expr)?.to_string());
    }
    Ok(last)
}
