//! Closure-converting compiler from AST to bytecode.
//!
//! Every lambda becomes an inline block guarded by a jump; evaluating the
//! lambda expression builds a closure from the block's address and the
//! environment current at that moment. Every application evaluates the
//! operand, then the operator, then switches into the closure's captured
//! environment extended with the operand before calling it.
//!
//! All addresses are relative to the instruction that uses them, so the code
//! for a subexpression is valid at any offset. The only word written after
//! emission is a lambda's own skip distance, filled in once its body is done.
//!
//! The tree is walked with an explicit work list, so compile depth is not
//! limited by the native stack.

use std::collections::BTreeMap;

use lambdavm_foundation::{Error, ErrorContext, ErrorKind, Result};

use crate::ast::Ast;
use crate::opcode::{Bytecode, Opcode};
use crate::parser::parse_one;
use crate::scope::ScopeChain;
use crate::span::Span;

/// Words in a lambda header: `GET_REL_ADDR d, GET_ENV, MK_CLOSURE, JMP d`.
const LAMBDA_HEADER_LEN: usize = 6;

/// The lambda term behind each closure body address of a compiled program.
#[derive(Clone, Debug, Default)]
pub struct LambdaMap<'a> {
    bodies: BTreeMap<usize, &'a Ast>,
}

impl<'a> LambdaMap<'a> {
    /// Returns the lambda whose body starts at `address`.
    #[must_use]
    pub fn term_at(&self, address: usize) -> Option<&'a Ast> {
        self.bodies.get(&address).copied()
    }

    /// Returns the number of lambdas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if the program has no lambdas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterates over `(body address, lambda)` pairs in address order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Ast)> + '_ {
        self.bodies.iter().map(|(&address, &term)| (address, term))
    }
}

enum Task<'a> {
    Compile(&'a Ast, ScopeChain),
    CloseLambda { jmp: usize },
    CallEpilogue,
}

/// Compiles one expression under the given scope chain.
///
/// # Errors
/// Returns [`ErrorKind::UnboundSymbol`] if a symbol is not bound by any
/// enclosing lambda. No partial bytecode is returned.
pub fn compile_expr(ast: &Ast, scope: &ScopeChain) -> Result<Bytecode> {
    compile_mapped(ast, scope).map(|(code, _)| code)
}

/// Compiles one expression and records where each lambda's body landed.
///
/// # Errors
/// Same as [`compile_expr`].
pub fn compile_mapped<'a>(
    ast: &'a Ast,
    scope: &ScopeChain,
) -> Result<(Bytecode, LambdaMap<'a>)> {
    let mut code = Bytecode::new();
    let mut lambdas = LambdaMap::default();
    let mut tasks = vec![Task::Compile(ast, scope.clone())];

    while let Some(task) = tasks.pop() {
        match task {
            Task::Compile(node, scope) => match node {
                Ast::Symbol(name, span) => emit_lookup(&mut code, name, *span, &scope)?,
                Ast::Lambda(param, body, _) => {
                    let jmp = emit_lambda_header(&mut code)?;
                    lambdas.bodies.insert(code.len(), node);
                    tasks.push(Task::CloseLambda { jmp });
                    tasks.push(Task::Compile(body, scope.bind(param.as_str())));
                }
                Ast::Application(operator, operand, _) => {
                    tasks.push(Task::CallEpilogue);
                    tasks.push(Task::Compile(operator, scope.clone()));
                    tasks.push(Task::Compile(operand, scope));
                }
            },
            Task::CloseLambda { jmp } => {
                code.emit(Opcode::PopEnv);
                code.emit(Opcode::Ret);
                code.patch_operand(jmp, displacement(code.len() - jmp)?);
            }
            Task::CallEpilogue => emit_call_epilogue(&mut code),
        }
    }

    Ok((code, lambdas))
}

/// Parses and compiles a single top-level expression.
///
/// # Errors
/// Returns a parse error or an unbound-symbol error.
pub fn compile(source: &str) -> Result<Bytecode> {
    let ast = parse_one(source)?;
    compile_expr(&ast, &ScopeChain::empty())
}

fn emit_lookup(code: &mut Bytecode, name: &str, span: Span, scope: &ScopeChain) -> Result<()> {
    let Some(hops) = scope.resolve(name) else {
        return Err(Error::unbound_symbol(name).with_context(
            ErrorContext::new().with_position(span.line as usize, span.column as usize),
        ));
    };
    code.emit_with(Opcode::EnvLookup, displacement(hops)?);
    Ok(())
}

/// Emits a lambda header and returns the address of its `JMP`, whose
/// operand is patched when the body is closed.
fn emit_lambda_header(code: &mut Bytecode) -> Result<usize> {
    let start = code.emit_with(Opcode::GetRelAddr, displacement(LAMBDA_HEADER_LEN)?);
    code.emit(Opcode::GetEnv);
    code.emit(Opcode::MkClosure);
    let jmp = code.emit_with(Opcode::Jmp, 0);
    debug_assert_eq!(code.len() - start, LAMBDA_HEADER_LEN);
    Ok(jmp)
}

fn emit_call_epilogue(code: &mut Bytecode) {
    // [arg, closure]
    code.emit(Opcode::Dup); // [arg, closure, closure]
    code.emit(Opcode::GetClosureEnv); // [arg, closure, env]
    code.emit(Opcode::PushEnv); // [arg, closure]; env := captured
    code.emit(Opcode::Swap); // [closure, arg]
    code.emit(Opcode::ExtendEnv); // [closure]; env := captured + arg
    code.emit(Opcode::GetClosureCode); // [address]
    code.emit(Opcode::Call);
}

fn displacement(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| {
        Error::new(ErrorKind::Internal(format!(
            "displacement {n} does not fit in an instruction word"
        )))
    })
}
