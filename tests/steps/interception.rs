//! Method interception step definitions.

use std::sync::Arc;

use cucumber::{given, then, when, World};
use interpose::test_utils::{reference_catalog, suffixed, CallCounter};
use interpose::{
    AspectDefinition, BindingTable, ConfigurationError, DispatchError, ProxyHandle, TargetSpec,
    Value,
};
use serde_json::json;

/// Test context for invoke scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct InterceptionWorld {
    calls: CallCounter,
    aspect: Option<AspectDefinition>,
    proxy: Option<ProxyHandle>,
    result: Option<Result<Value, DispatchError>>,
    rejection: Option<ConfigurationError>,
}

impl InterceptionWorld {
    fn new() -> Self {
        Self {
            calls: CallCounter::new(),
            aspect: None,
            proxy: None,
            result: None,
            rejection: None,
        }
    }

    fn aspect(&self) -> &AspectDefinition {
        self.aspect.as_ref().expect("aspect should be created")
    }

    fn proxy(&self) -> &ProxyHandle {
        self.proxy.as_ref().expect("aspect should be materialized")
    }

    fn result(&self) -> &Result<Value, DispatchError> {
        self.result.as_ref().expect("a call should have been made")
    }
}

// --- Given steps ---

#[given(expr = "an aspect over type {string}")]
async fn given_aspect(world: &mut InterceptionWorld, type_name: String) {
    let catalog = Arc::new(reference_catalog(&world.calls));
    let aspect = AspectDefinition::create(TargetSpec::of_type(&catalog, type_name))
        .expect("type should be registered")
        .with_bindings(Arc::new(BindingTable::new()));
    world.aspect = Some(aspect);
}

#[given(expr = "before advice on {string} replacing the first argument with {string}")]
async fn given_before_replacing(world: &mut InterceptionWorld, pattern: String, value: String) {
    world
        .aspect()
        .before_invoke(pattern, move |mut args| {
            if args.is_empty() {
                args.push(Value::Null);
            }
            args[0] = json!(value);
            args
        })
        .expect("advice should register");
}

#[given(expr = "after advice on {string} appending {string}")]
async fn given_after_appending(world: &mut InterceptionWorld, pattern: String, suffix: String) {
    world
        .aspect()
        .after_invoke(pattern, move |ret| suffixed(&ret, &suffix))
        .expect("advice should register");
}

#[given(expr = "around advice on {string} that proceeds and appends {string}")]
async fn given_around_proceeding(world: &mut InterceptionWorld, pattern: String, suffix: String) {
    world
        .aspect()
        .around_invoke(pattern, move |_, proceed, _| {
            Ok(suffixed(&proceed.call()?, &suffix))
        })
        .expect("advice should register");
}

#[given(expr = "around advice on {string} that appends {string} to the carry")]
async fn given_around_carry(world: &mut InterceptionWorld, pattern: String, suffix: String) {
    world
        .aspect()
        .around_invoke(pattern, move |_, _, carry| Ok(suffixed(&carry, &suffix)))
        .expect("advice should register");
}

#[given(expr = "around advice on {string} returning {string}")]
async fn given_around_returning(world: &mut InterceptionWorld, pattern: String, value: String) {
    world
        .aspect()
        .around_invoke(pattern, move |_, _, _| Ok(json!(value)))
        .expect("advice should register");
}

#[given(expr = "exception advice on {string} returning {string}")]
async fn given_exception_returning(world: &mut InterceptionWorld, pattern: String, value: String) {
    world
        .aspect()
        .on_exception(pattern, move |_, _| json!(value))
        .expect("advice should register");
}

// --- When steps ---

#[when(expr = "the aspect is materialized with {string}")]
async fn when_materialized(world: &mut InterceptionWorld, arg: String) {
    let aspect = world.aspect.as_mut().expect("aspect should be created");
    let proxy = aspect
        .materialize(vec![json!(arg)])
        .expect("materialize should succeed");
    world.proxy = Some(proxy);
}

#[when(expr = "I invoke {string} with {string}")]
async fn when_invoke_with(world: &mut InterceptionWorld, name: String, arg: String) {
    world.result = Some(world.proxy().invoke(&name, vec![json!(arg)]));
}

#[when(expr = "I invoke {string} with no arguments")]
async fn when_invoke_bare(world: &mut InterceptionWorld, name: String) {
    world.result = Some(world.proxy().invoke(&name, vec![]));
}

#[when(expr = "I register after advice on {string}")]
async fn when_register_after(world: &mut InterceptionWorld, pattern: String) {
    world.rejection = world.aspect().after_invoke(pattern, |ret| ret).err();
}

// --- Then steps ---

#[then(expr = "the result is {string}")]
async fn then_result_is(world: &mut InterceptionWorld, expected: String) {
    match world.result() {
        Ok(value) => assert_eq!(value, &json!(expected)),
        Err(e) => panic!("expected {:?}, call failed: {}", expected, e),
    }
}

#[then(expr = "the call fails with {string}")]
async fn then_call_fails(world: &mut InterceptionWorld, message: String) {
    match world.result() {
        Ok(value) => panic!("expected failure, got {}", value),
        Err(e) => assert_eq!(e.to_string(), message),
    }
}

#[then(expr = "{string} ran {int} time(s)")]
async fn then_ran_times(world: &mut InterceptionWorld, method: String, times: usize) {
    assert_eq!(world.calls.count(&method), times);
}

#[then("the registration is rejected for an empty pattern")]
async fn then_rejected_empty(world: &mut InterceptionWorld) {
    assert_eq!(world.rejection, Some(ConfigurationError::EmptyPattern));
    assert_eq!(world.aspect().advice_count(), 0);
}
