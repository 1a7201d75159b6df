//! Test utilities and scripted target implementations.
//!
//! This module provides a target that can be assembled in a test without
//! defining a new type: properties live in a map and methods are closures.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::interfaces::target::{Result, Target, TargetError};
use crate::interfaces::TargetCatalog;

/// Property storage handed to scripted methods.
pub type Properties = BTreeMap<String, Value>;

/// A scripted method body.
pub type Method = Arc<dyn Fn(&mut Properties, Vec<Value>) -> Result<Value> + Send + Sync>;

/// Counts how often each method body actually ran.
///
/// Shared between an object and its copies so a test can observe the copy
/// living behind a proxy.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, method: &str) -> usize {
        self.counts.lock().get(method).copied().unwrap_or(0)
    }

    fn record(&self, method: &str) {
        *self.counts.lock().entry(method.to_string()).or_insert(0) += 1;
    }
}

/// Ordered record of the accesses a target served.
///
/// Entries read `invoke <name>`, `read <name>` or `write <name>`. Tests may
/// push their own entries to interleave advice with target activity.
#[derive(Debug, Clone, Default)]
pub struct AccessLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl AccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// Property bag with closure methods.
#[derive(Clone)]
pub struct ScriptedObject {
    type_name: String,
    properties: Properties,
    methods: HashMap<String, Method>,
    calls: CallCounter,
    log: Option<AccessLog>,
}

impl ScriptedObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Properties::new(),
            methods: HashMap::new(),
            calls: CallCounter::new(),
            log: None,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn with_method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Properties, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(body));
        self
    }

    /// Share `calls` with this object (and every copy made from it).
    pub fn with_counter(mut self, calls: CallCounter) -> Self {
        self.calls = calls;
        self
    }

    /// Record every forwarded access in `log` (shared with copies).
    pub fn with_access_log(mut self, log: AccessLog) -> Self {
        self.log = Some(log);
        self
    }

    fn note(&self, access: &str, name: &str) {
        if let Some(log) = &self.log {
            log.record(format!("{} {}", access, name));
        }
    }

    pub fn counter(&self) -> CallCounter {
        self.calls.clone()
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }
}

impl std::fmt::Debug for ScriptedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedObject")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Target for ScriptedObject {
    fn invoke_member(&mut self, name: &str, args: Vec<Value>) -> Result<Value> {
        let method = self
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| TargetError::NoSuchMember(name.to_string()))?;
        self.calls.record(name);
        self.note("invoke", name);
        method(&mut self.properties, args)
    }

    fn read_member(&self, name: &str) -> Result<Value> {
        self.note("read", name);
        self.properties
            .get(name)
            .cloned()
            .ok_or_else(|| TargetError::NoSuchMember(name.to_string()))
    }

    fn write_member(&mut self, name: &str, value: Value) -> Result<()> {
        self.note("write", name);
        self.properties.insert(name.to_string(), value);
        Ok(())
    }

    fn copy(&self) -> Box<dyn Target> {
        Box::new(self.clone())
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Message raised by the reference class's `throwing` method.
pub const REFERENCE_ERROR: &str = "Error Processing Request";

/// The reference class `A`.
///
/// - constructor `(x)` stores `x`
/// - `func(arg)` returns `arg`
/// - `throwing()` raises [`REFERENCE_ERROR`] with code 1
/// - `around(arg)` returns `arg`
/// - `describe()` returns the stored `x`
/// - property `property` starts as null
pub fn reference_object(x: Value, calls: &CallCounter) -> ScriptedObject {
    ScriptedObject::new("A")
        .with_counter(calls.clone())
        .with_property("x", x)
        .with_property("property", Value::Null)
        .with_method("func", |_, args| Ok(first_arg(args)))
        .with_method("throwing", |_, _| {
            Err(TargetError::raised_with_code(REFERENCE_ERROR, 1))
        })
        .with_method("around", |_, args| Ok(first_arg(args)))
        .with_method("describe", |props, _| {
            Ok(props.get("x").cloned().unwrap_or(Value::Null))
        })
}

/// A catalog with the reference class registered as `A`.
pub fn reference_catalog(calls: &CallCounter) -> TargetCatalog {
    let calls = calls.clone();
    TargetCatalog::new().with("A", move |args: Vec<Value>| {
        let x = args.into_iter().next().unwrap_or(Value::Null);
        Ok(Box::new(reference_object(x, &calls)) as Box<dyn Target>)
    })
}

/// Append `suffix` to a string value (null reads as empty).
pub fn suffixed(value: &Value, suffix: &str) -> Value {
    json!(format!("{}{}", value.as_str().unwrap_or_default(), suffix))
}

/// Prepend `prefix` to a string value (null reads as empty).
pub fn prefixed(prefix: &str, value: &Value) -> Value {
    json!(format!("{}{}", prefix, value.as_str().unwrap_or_default()))
}

fn first_arg(args: Vec<Value>) -> Value {
    args.into_iter().next().unwrap_or(Value::Null)
}
