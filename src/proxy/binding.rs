//! Proxy bindings - which live target and advice a proxy handle dispatches to.
//!
//! Every proxy operation starts by resolving its handle here. An entry is
//! inserted once when an aspect is materialized and removed when the handle
//! is dropped, so the table only ever holds live proxies.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::advice::{AccessKind, Advice, AdviceKind, AdviceRegistry};
use crate::error::{AspectError, DispatchError};
use crate::interfaces::target::{Result as TargetResult, Target};

static GLOBAL_BINDINGS: LazyLock<Arc<BindingTable>> =
    LazyLock::new(|| Arc::new(BindingTable::new()));

/// Identity of a proxy handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyId(Uuid);

impl ProxyId {
    /// Allocate a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProxyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The materialized side of an aspect: live target plus its advice.
pub struct Binding {
    label: String,
    target: Mutex<Box<dyn Target>>,
    advice: Arc<RwLock<AdviceRegistry>>,
    max_reentry_depth: Option<usize>,
}

impl Binding {
    pub(crate) fn new(
        label: String,
        target: Box<dyn Target>,
        advice: Arc<RwLock<AdviceRegistry>>,
        max_reentry_depth: Option<usize>,
    ) -> Self {
        Self {
            label,
            target: Mutex::new(target),
            advice,
            max_reentry_depth,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn max_reentry_depth(&self) -> Option<usize> {
        self.max_reentry_depth
    }

    /// Snapshot of matching advice. The registry lock is released on return.
    pub(crate) fn advice_for(&self, kind: AdviceKind, access: AccessKind, name: &str) -> Vec<Advice> {
        self.advice.read().query(kind, access, name)
    }

    pub(crate) fn invoke_target(&self, name: &str, args: Vec<Value>) -> TargetResult<Value> {
        self.target.lock().invoke_member(name, args)
    }

    pub(crate) fn read_target(&self, name: &str) -> TargetResult<Value> {
        self.target.lock().read_member(name)
    }

    pub(crate) fn write_target(&self, name: &str, value: Value) -> TargetResult<()> {
        self.target.lock().write_member(name, value)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("label", &self.label)
            .field("max_reentry_depth", &self.max_reentry_depth)
            .finish_non_exhaustive()
    }
}

/// Thread-safe map from proxy identity to binding.
///
/// Writes happen once per proxy (bind) and once more when the handle drops
/// (unbind); everything in between is a read.
#[derive(Debug, Default)]
pub struct BindingTable {
    entries: RwLock<HashMap<ProxyId, Arc<Binding>>>,
}

impl BindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table used when no table is injected.
    pub fn global() -> Arc<BindingTable> {
        Arc::clone(&GLOBAL_BINDINGS)
    }

    /// Bind `id` to `binding`. An identity can only be bound once.
    pub fn bind(&self, id: ProxyId, binding: Arc<Binding>) -> Result<(), AspectError> {
        let mut entries = self.entries.write();
        if entries.contains_key(&id) {
            return Err(AspectError::AlreadyBound(id));
        }
        debug!(proxy = %id, target = %binding.label(), "Binding proxy");
        entries.insert(id, binding);
        Ok(())
    }

    /// Look up the binding for `id`.
    pub fn resolve(&self, id: ProxyId) -> Result<Arc<Binding>, DispatchError> {
        self.entries
            .read()
            .get(&id)
            .cloned()
            .ok_or(DispatchError::UnboundProxy(id))
    }

    /// Remove the binding for `id`, returning it if present.
    pub fn unbind(&self, id: ProxyId) -> Option<Arc<Binding>> {
        let removed = self.entries.write().remove(&id);
        if removed.is_some() {
            debug!(proxy = %id, "Unbound proxy");
        }
        removed
    }

    pub fn contains(&self, id: ProxyId) -> bool {
        self.entries.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
