//! Source text through parser, compiler, and VM via the facade crate.

use lambdavm::foundation::{ErrorKind, Value};
use lambdavm::language::{Ast, Opcode, ScopeChain, Vm, VmConfig, compile_expr, parse, parse_one};

fn run(source: &str) -> lambdavm::foundation::Result<Value> {
    let ast = parse_one(source)?;
    let code = compile_expr(&ast, &ScopeChain::empty())?;
    Vm::new().execute(&code)
}

#[test]
fn every_outcome_class_is_reachable() {
    assert!(run(r"\x x").is_ok());
    assert!(matches!(
        run("(x").unwrap_err().kind,
        ErrorKind::ParseError { .. }
    ));
    assert!(matches!(
        run("x").unwrap_err().kind,
        ErrorKind::UnboundSymbol(_)
    ));
    assert!(run(r"(\x (x x) \x (x x))").unwrap_err().is_exhaustion());
}

#[test]
fn one_vm_runs_many_programs() {
    let sources = [
        r"\x x",
        r"(\x (x x) \x (x x))",
        r"(\x x \y y)",
        r"((\f \x (f (f x)) \a a) \b b)",
    ];
    let mut vm = Vm::with_config(VmConfig::new().with_stack_capacity(64));
    let results: Vec<_> = parse(&sources.join("\n"))
        .unwrap()
        .iter()
        .map(|ast| vm.execute(&compile_expr(ast, &ScopeChain::empty()).unwrap()))
        .collect();

    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert!(results[3].is_ok());
}

#[test]
fn programs_built_from_ast_constructors_run() {
    // K I I, where K = \x \y x and I = \z z
    let identity = || Ast::lambda("z", Ast::symbol("z"));
    let k = Ast::lambda("x", Ast::lambda("y", Ast::symbol("x")));
    let program = Ast::apply(Ast::apply(k, identity()), identity());

    let code = compile_expr(&program, &ScopeChain::empty()).unwrap();
    let value = Vm::new().execute(&code).unwrap();

    // The operand of the inner application is emitted after the outer one.
    let headers: Vec<_> = code
        .instructions()
        .unwrap()
        .into_iter()
        .filter(|i| i.opcode == Opcode::GetRelAddr)
        .map(|i| i.address + 6)
        .collect();
    assert_eq!(value.as_closure().unwrap().address, headers[1]);
}

#[test]
fn large_church_numeral_runs_in_default_vm() {
    let mut body = String::from("x");
    for _ in 0..500 {
        body = format!("(f {body})");
    }
    let source = format!(r"((\f \x {body} \a a) \b b)");
    assert!(run(&source).unwrap().is_closure());
}
