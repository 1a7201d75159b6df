//! Property read/write step definitions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cucumber::{given, then, when, World};
use interpose::test_utils::{prefixed, reference_object, CallCounter};
use interpose::{AspectDefinition, BindingTable, DispatchError, ProxyHandle, TargetSpec, Value};
use parking_lot::Mutex;
use serde_json::json;

/// Test context for property scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct PropertyWorld {
    aspect: Option<AspectDefinition>,
    proxy: Option<ProxyHandle>,
    result: Option<Result<Value, DispatchError>>,
    reads: Arc<AtomicUsize>,
    written: Arc<Mutex<Vec<Value>>>,
}

impl PropertyWorld {
    fn new() -> Self {
        Self {
            aspect: None,
            proxy: None,
            result: None,
            reads: Arc::new(AtomicUsize::new(0)),
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn aspect(&self) -> &AspectDefinition {
        self.aspect.as_ref().expect("aspect should be created")
    }

    fn proxy(&self) -> &ProxyHandle {
        self.proxy.as_ref().expect("aspect should be materialized")
    }
}

// --- Given steps ---

#[given(expr = "an aspect over an object with x = {string}")]
async fn given_aspect_over_instance(world: &mut PropertyWorld, x: String) {
    let object = reference_object(json!(x), &CallCounter::new());
    let aspect = AspectDefinition::create(TargetSpec::instance(object))
        .expect("instance specs always resolve")
        .with_bindings(Arc::new(BindingTable::new()));
    world.aspect = Some(aspect);
}

#[given(expr = "before-write advice on {string} prefixing {string}")]
async fn given_before_write(world: &mut PropertyWorld, pattern: String, prefix: String) {
    world
        .aspect()
        .before_write(pattern, move |value| prefixed(&prefix, &value))
        .expect("advice should register");
}

#[given(expr = "after-write advice on {string} recording the value")]
async fn given_after_write(world: &mut PropertyWorld, pattern: String) {
    let written = Arc::clone(&world.written);
    world
        .aspect()
        .after_write(pattern, move |value| written.lock().push(value.clone()))
        .expect("advice should register");
}

#[given(expr = "after-read advice on {string} prefixing {string}")]
async fn given_after_read(world: &mut PropertyWorld, pattern: String, prefix: String) {
    world
        .aspect()
        .after_read(pattern, move |value| prefixed(&prefix, &value))
        .expect("advice should register");
}

#[given(expr = "before-read advice on {string} counting reads")]
async fn given_before_read(world: &mut PropertyWorld, pattern: String) {
    let reads = Arc::clone(&world.reads);
    world
        .aspect()
        .before_read(pattern, move || {
            reads.fetch_add(1, Ordering::SeqCst);
        })
        .expect("advice should register");
}

// --- When steps ---

#[when("the aspect is materialized")]
async fn when_materialized(world: &mut PropertyWorld) {
    let aspect = world.aspect.as_mut().expect("aspect should be created");
    world.proxy = Some(aspect.materialize(vec![]).expect("materialize should succeed"));
}

#[when(expr = "I write {string} to {string}")]
async fn when_write(world: &mut PropertyWorld, value: String, name: String) {
    world
        .proxy()
        .write(&name, json!(value))
        .expect("write should succeed");
}

#[when(expr = "I read {string}")]
async fn when_read(world: &mut PropertyWorld, name: String) {
    world.result = Some(world.proxy().read(&name));
}

// --- Then steps ---

#[then(expr = "the value is {string}")]
async fn then_value_is(world: &mut PropertyWorld, expected: String) {
    match world.result.as_ref().expect("a read should have been made") {
        Ok(value) => assert_eq!(value, &json!(expected)),
        Err(e) => panic!("expected {:?}, read failed: {}", expected, e),
    }
}

#[then(expr = "the read fails with {string}")]
async fn then_read_fails(world: &mut PropertyWorld, message: String) {
    match world.result.as_ref().expect("a read should have been made") {
        Ok(value) => panic!("expected failure, got {}", value),
        Err(e) => assert_eq!(e.to_string(), message),
    }
}

#[then(expr = "{int} read(s) observed")]
async fn then_reads_observed(world: &mut PropertyWorld, count: usize) {
    assert_eq!(world.reads.load(Ordering::SeqCst), count);
}

#[then(expr = "after-write advice saw {string}")]
async fn then_after_write_saw(world: &mut PropertyWorld, expected: String) {
    assert_eq!(*world.written.lock(), vec![json!(expected)]);
}
