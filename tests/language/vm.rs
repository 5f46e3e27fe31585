//! Integration tests for the VM
//!
//! Tests closure semantics end to end, configured limits, and tracing.

use lambdavm_foundation::{ErrorKind, StackKind, Value};
use lambdavm_language::{
    Bytecode, Opcode, TraceConfig, Vm, VmConfig, compile, eval,
};

/// Runs `source` and returns the body address of the resulting closure.
fn result_address(source: &str) -> usize {
    let value = eval(source).unwrap();
    value.as_closure().expect("closure result").address
}

/// Body addresses of the lambdas in `source`, in emission order.
fn bodies(source: &str) -> Vec<usize> {
    compile(source)
        .unwrap()
        .instructions()
        .unwrap()
        .into_iter()
        .filter(|i| i.opcode == Opcode::GetRelAddr)
        .map(|i| i.address + usize::try_from(i.operand.unwrap()).unwrap())
        .collect()
}

// =============================================================================
// Closure Semantics
// =============================================================================

#[test]
fn identity_application_matches_argument() {
    let applied = eval(r"(\x x \y y)").unwrap();
    let direct = eval(r"\y y").unwrap();
    assert_eq!(applied, direct);
}

#[test]
fn constant_function_ignores_second_argument() {
    let first = r"((\x \y x \a a) \b b)";
    let other = r"((\x \y x \a a) (\c c \d d))";
    assert_eq!(result_address(first), bodies(first)[1]);
    // Different second argument, same result position relative to \a.
    assert_eq!(result_address(other), bodies(other)[2]);
}

#[test]
fn repeated_calls_get_fresh_frames() {
    let source = r"(\k ((k \a a) (k \b b)) \x \y x)";
    assert_eq!(result_address(source), bodies(source)[4]);
}

#[test]
fn captured_environment_survives_the_call() {
    let value = eval(r"(\x \y x \a a)").unwrap();
    let closure = value.as_closure().unwrap();
    assert_eq!(closure.env.depth(), 1);
    assert!(matches!(closure.env.lookup(0), Some(Value::Closure(_))));
}

#[test]
fn church_numerals_compose() {
    // 2 * 3 applications of the identity still return the final argument.
    let source = r"((((\m \n \f (m (n f)) \f \x (f (f x))) \f \x (f (f (f x)))) \a a) \b b)";
    assert_eq!(result_address(source), bodies(source)[0]);
}

#[test]
fn self_application_of_identity_terminates() {
    let source = r"(\x (x x) \y y)";
    assert_eq!(result_address(source), bodies(source)[0]);
}

// =============================================================================
// Limits
// =============================================================================

#[test]
fn omega_exhausts_environment_stack() {
    let err = eval(r"(\x (x x) \x (x x))").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::StackExhausted {
            stack: StackKind::Environment,
            capacity: 1024
        }
    ));
}

#[test]
fn step_budget_stops_divergence() {
    let code = compile(r"(\x (x x) \x (x x))").unwrap();
    let mut vm = Vm::with_config(VmConfig::new().with_max_steps(1_000));
    let err = vm.execute(&code).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::StepLimitExceeded(1_000)));
    assert_eq!(vm.steps(), 0, "state is reset after a fault");
}

#[test]
fn step_budget_allows_terminating_programs() {
    let code = compile(r"(\x x \y y)").unwrap();
    let mut vm = Vm::new();
    vm.execute(&code).unwrap();
    let needed = vm.steps();

    let mut exact = Vm::with_config(VmConfig::new().with_max_steps(needed));
    assert!(exact.execute(&code).is_ok());

    let mut short = Vm::with_config(VmConfig::new().with_max_steps(needed - 1));
    assert!(short.execute(&code).is_err());
}

#[test]
fn nesting_depth_is_bounded_by_capacity() {
    // Church 3 applied needs only shallow stacks.
    let source = r"((\f \x (f (f (f x))) \a a) \b b)";
    let code = compile(source).unwrap();
    let mut vm = Vm::with_config(VmConfig::new().with_stack_capacity(8));
    assert!(vm.execute(&code).is_ok());

    let mut tight = Vm::with_config(VmConfig::new().with_stack_capacity(2));
    assert!(tight.execute(&code).unwrap_err().is_exhaustion());
}

// =============================================================================
// Hand-assembled Programs
// =============================================================================

#[test]
fn hand_assembled_closure() {
    let mut code = Bytecode::new();
    code.emit(Opcode::GetEnv);
    code.emit_with(Opcode::GetRelAddr, 40);
    code.emit(Opcode::Swap);
    code.emit(Opcode::MkClosure);
    code.emit(Opcode::GetClosureCode);

    assert_eq!(Vm::new().execute(&code).unwrap(), Value::Address(41));
}

#[test]
fn leftover_values_are_malformed() {
    let mut code = Bytecode::new();
    code.emit(Opcode::GetEnv);
    code.emit(Opcode::GetEnv);
    let err = Vm::new().execute(&code).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MalformedResult { depth: 2 }));
}

#[test]
fn truncated_operand_is_reported() {
    let err = Vm::new()
        .execute(&Bytecode::from(vec![Opcode::GetEnv.word(), Opcode::Jmp.word()]))
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TruncatedInstruction { address: 1 }
    ));
}

// =============================================================================
// Tracing
// =============================================================================

#[test]
fn trace_covers_every_step() {
    let code = compile(r"((\x \y x \a a) \b b)").unwrap();
    let mut vm = Vm::with_config(VmConfig::new().with_trace(TraceConfig::new().enabled()));
    vm.execute(&code).unwrap();

    let trace = vm.take_trace();
    assert_eq!(trace.len() as u64, vm.steps());
    for (i, record) in trace.iter().enumerate() {
        assert_eq!(record.step, i as u64);
    }
    assert_eq!(trace[0].instruction.address, 0);
    assert!(vm.tracer().is_empty());
}

#[test]
fn trace_shows_call_depth() {
    let code = compile(r"(\x x \y y)").unwrap();
    let mut vm = Vm::with_config(VmConfig::new().with_trace(TraceConfig::new().enabled()));
    vm.execute(&code).unwrap();

    let lookup = vm
        .tracer()
        .records()
        .find(|r| r.instruction.opcode == Opcode::EnvLookup)
        .copied()
        .unwrap();
    assert_eq!(lookup.return_depth, 1);
    assert_eq!(lookup.env_stack_depth, 1);
    assert_eq!(lookup.env_depth, 1);
}

#[test]
fn eval_rejects_pathological_nesting_without_crashing() {
    let lambdas = format!("{}x", r"\x ".repeat(100_000));
    assert!(matches!(
        eval(&lambdas).unwrap_err().kind,
        ErrorKind::ParseError { .. }
    ));

    let applications = format!(r"(\f {}f{} \y y)", "(f ".repeat(100_000), ")".repeat(100_000));
    assert!(matches!(
        eval(&applications).unwrap_err().kind,
        ErrorKind::ParseError { .. }
    ));
}
