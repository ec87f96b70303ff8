use rlox::environment::{EnvRef, Environment};
use rlox::error::RuntimeError;
use rlox::value::Value;

fn global_with(name: &str, value: Value) -> EnvRef {
    let env = EnvRef::default();
    env.borrow_mut().define(name, value);
    env
}

#[test]
fn define_then_get() {
    let mut env = Environment::new();
    env.define("a", Value::Number(1.0));

    assert_eq!(env.get("a", 1), Ok(Value::Number(1.0)));
}

#[test]
fn redefinition_overwrites_in_the_same_scope() {
    let mut env = Environment::new();
    env.define("a", Value::Number(1.0));
    env.define("a", Value::string("again"));

    assert_eq!(env.get("a", 1), Ok(Value::string("again")));
}

#[test]
fn lookup_walks_outward() {
    let globals = global_with("a", Value::Bool(true));
    let inner = Environment::child_of(&Environment::child_of(&globals));

    assert_eq!(inner.borrow().get("a", 3), Ok(Value::Bool(true)));
}

#[test]
fn shadowing_does_not_touch_the_outer_binding() {
    let globals = global_with("a", Value::Number(1.0));
    let inner = Environment::child_of(&globals);
    inner.borrow_mut().define("a", Value::Number(2.0));

    assert_eq!(inner.borrow().get("a", 1), Ok(Value::Number(2.0)));
    assert_eq!(globals.borrow().get("a", 1), Ok(Value::Number(1.0)));
}

#[test]
fn assign_updates_the_nearest_binding() {
    let globals = global_with("a", Value::Number(1.0));
    let inner = Environment::child_of(&globals);

    inner
        .borrow_mut()
        .assign("a", Value::Number(5.0), 2)
        .expect("outer binding exists");

    assert_eq!(globals.borrow().get("a", 2), Ok(Value::Number(5.0)));
    assert!(inner.borrow().enclosing().is_some());
}

#[test]
fn undefined_names_report_the_line() {
    let mut env = Environment::new();

    assert_eq!(
        env.get("missing", 7),
        Err(RuntimeError::UndefinedVariable {
            name: "missing".to_string(),
            line: 7,
        })
    );

    // Assignment never creates a binding.
    let err = env.assign("missing", Value::Nil, 8).unwrap_err();
    assert_eq!(err.to_string(), "[line 8] Undefined variable 'missing'.");
    assert!(env.get("missing", 9).is_err());
}
