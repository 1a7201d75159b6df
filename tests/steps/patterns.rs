//! Advice pattern step definitions.

use cucumber::{given, then, World};
use interpose::pattern;
use interpose::{AccessKind, Advice, AdviceKind, AdviceRegistry};
use serde_json::json;

/// Test context for pattern and registry scenarios.
#[derive(Debug, Default, World)]
pub struct PatternWorld {
    registry: AdviceRegistry,
}

#[given(expr = "after advice tagged {string} on {string}")]
async fn given_tagged_advice(world: &mut PatternWorld, tag: String, glob: String) {
    world
        .registry
        .add(
            AdviceKind::After,
            AccessKind::Invoke,
            glob,
            Advice::after_invoke(move |ret| {
                json!(format!("{}{}", ret.as_str().unwrap_or_default(), tag))
            }),
        )
        .expect("advice should register");
}

#[then(expr = "pattern {string} matches {string}")]
async fn then_matches(_world: &mut PatternWorld, glob: String, name: String) {
    assert!(pattern::matches(&glob, &name), "{} should match {}", glob, name);
}

#[then(expr = "pattern {string} does not match {string}")]
async fn then_does_not_match(_world: &mut PatternWorld, glob: String, name: String) {
    assert!(!pattern::matches(&glob, &name), "{} should not match {}", glob, name);
}

#[then(expr = "advice for {string} applies as {string}")]
async fn then_advice_applies(world: &mut PatternWorld, name: String, expected: String) {
    let mut ret = json!("");
    for advice in world.registry.query(AdviceKind::After, AccessKind::Invoke, &name) {
        if let Advice::AfterInvoke(f) = advice {
            ret = f(ret);
        }
    }
    assert_eq!(ret, json!(expected));
}
