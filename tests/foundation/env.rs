//! Integration tests for the runtime environment chain
//!
//! Tests persistence, lookup by hop count, and sharing.

use lambdavm_foundation::{Env, Value};

#[test]
fn empty_env() {
    let env = Env::empty();
    assert!(env.is_empty());
    assert_eq!(env.depth(), 0);
    assert!(env.lookup(0).is_none());
}

#[test]
fn lookup_counts_hops_from_innermost() {
    let env = Env::empty()
        .extend(Value::Address(10))
        .extend(Value::Address(20))
        .extend(Value::Address(30));

    assert_eq!(env.depth(), 3);
    assert_eq!(env.lookup(0), Some(&Value::Address(30)));
    assert_eq!(env.lookup(1), Some(&Value::Address(20)));
    assert_eq!(env.lookup(2), Some(&Value::Address(10)));
    assert_eq!(env.lookup(3), None);
}

#[test]
fn extend_never_mutates() {
    let base = Env::empty().extend(Value::Address(1));
    let left = base.extend(Value::Address(2));
    let right = base.extend(Value::Address(3));

    assert_eq!(base.depth(), 1);
    assert_eq!(left.lookup(0), Some(&Value::Address(2)));
    assert_eq!(right.lookup(0), Some(&Value::Address(3)));
    assert_eq!(left.lookup(1), right.lookup(1));
}

#[test]
fn clones_share_frames() {
    let env = Env::empty().extend(Value::Address(1));
    let copy = env.clone();
    assert!(env.ptr_eq(&copy));
    assert_eq!(env, copy);

    let rebuilt = Env::empty().extend(Value::Address(1));
    assert_ne!(env, rebuilt);
}

#[test]
fn environment_values_nest() {
    let inner = Env::empty().extend(Value::Address(7));
    let outer = Env::empty().extend(Value::Environment(inner.clone()));

    match outer.lookup(0) {
        Some(Value::Environment(found)) => assert!(found.ptr_eq(&inner)),
        other => panic!("expected an environment, got {other:?}"),
    }
}

#[test]
fn long_chain_drops_without_overflow() {
    let mut env = Env::empty();
    for i in 0..200_000 {
        env = env.extend(Value::Address(i));
    }
    assert_eq!(env.depth(), 200_000);
    drop(env);
}
