//! Property tests over generated closed terms.

use lambdavm::foundation::{ErrorKind, Value};
use lambdavm::language::{Ast, ScopeChain, Vm, VmConfig, compile_expr};
use proptest::prelude::*;

/// Closed terms: every symbol refers to an enclosing binder.
fn closed_term() -> impl Strategy<Value = Ast> {
    closed_under(Vec::new(), 4)
}

fn closed_under(bound: Vec<String>, depth: u32) -> BoxedStrategy<Ast> {
    let fresh = format!("v{}", bound.len());
    let identity = Just(Ast::lambda(fresh.clone(), Ast::symbol(fresh.clone())));

    let leaf = if bound.is_empty() {
        identity.boxed()
    } else {
        prop_oneof![
            identity,
            proptest::sample::select(bound.clone()).prop_map(Ast::symbol),
        ]
        .boxed()
    };

    if depth == 0 {
        return leaf;
    }

    let mut inner = bound.clone();
    inner.push(fresh.clone());
    let lambda =
        closed_under(inner, depth - 1).prop_map(move |body| Ast::lambda(fresh.clone(), body));
    let apply = (
        closed_under(bound.clone(), depth - 1),
        closed_under(bound, depth - 1),
    )
        .prop_map(|(operator, operand)| Ast::apply(operator, operand));

    prop_oneof![2 => leaf, 2 => lambda, 1 => apply].boxed()
}

fn bounded_vm() -> Vm {
    Vm::with_config(
        VmConfig::new()
            .with_stack_capacity(128)
            .with_max_steps(5_000),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn closed_terms_always_compile(term in closed_term()) {
        prop_assert!(compile_expr(&term, &ScopeChain::empty()).is_ok());
    }

    #[test]
    fn closed_terms_yield_closure_or_exhaustion(term in closed_term()) {
        let code = compile_expr(&term, &ScopeChain::empty()).unwrap();
        match bounded_vm().execute(&code) {
            Ok(value) => prop_assert!(matches!(value, Value::Closure(_))),
            Err(err) => prop_assert!(
                err.is_exhaustion(),
                "unexpected fault {:?} for {}",
                err.kind,
                term
            ),
        }
    }

    #[test]
    fn evaluation_is_deterministic(term in closed_term()) {
        let code = compile_expr(&term, &ScopeChain::empty()).unwrap();
        let first = bounded_vm().execute(&code);
        let second = bounded_vm().execute(&code);
        match (first, second) {
            (Ok(Value::Closure(a)), Ok(Value::Closure(b))) => prop_assert_eq!(a.address, b.address),
            (Err(a), Err(b)) => prop_assert_eq!(
                std::mem::discriminant(&a.kind),
                std::mem::discriminant(&b.kind)
            ),
            (a, b) => prop_assert!(false, "diverging outcomes {:?} / {:?}", a, b),
        }
    }

    #[test]
    fn lambdas_evaluate_without_running_body(term in closed_term()) {
        let wrapped = Ast::lambda("w", term);
        let code = compile_expr(&wrapped, &ScopeChain::empty()).unwrap();
        let mut vm = bounded_vm();
        let value = vm.execute(&code).unwrap();

        prop_assert!(value.is_closure());
        // Header only: GET_REL_ADDR, GET_ENV, MK_CLOSURE, JMP.
        prop_assert_eq!(vm.steps(), 4);
    }

    #[test]
    fn step_limit_is_never_exceeded(term in closed_term(), limit in 1u64..200) {
        let code = compile_expr(&term, &ScopeChain::empty()).unwrap();
        let mut vm = Vm::with_config(VmConfig::new().with_max_steps(limit));
        match vm.execute(&code) {
            Ok(_) => prop_assert!(vm.steps() <= limit),
            Err(err) => prop_assert!(
                matches!(err.kind, ErrorKind::StepLimitExceeded(n) if n == limit)
            ),
        }
    }
}
