//! Advice: behavior attached to member calls and property access.
//!
//! Each advice value has a fixed shape determined by when it runs
//! ([`AdviceKind`]) and what it intercepts ([`AccessKind`]):
//!
//! | Kind / Access          | Closure                                              |
//! |------------------------|------------------------------------------------------|
//! | Before / Invoke        | `Fn(Vec<Value>) -> Vec<Value>` rewrites the args     |
//! | After / Invoke         | `Fn(Value) -> Value` rewrites the return value       |
//! | Around / Invoke        | `Fn(&[Value], &Proceed, Value) -> Result<Value>`     |
//! | OnException / Invoke   | `Fn(&TargetError, Value) -> Value`                   |
//! | Before / Read          | `Fn()`                                               |
//! | After / Read           | `Fn(Value) -> Value` rewrites the value read         |
//! | Before / Write         | `Fn(Value) -> Value` rewrites the value to assign    |
//! | After / Write          | `Fn(&Value)` observes the assigned value             |
//!
//! Advice is never introspected by the engine, only called.

mod registry;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::interfaces::TargetError;
use crate::proxy::Proceed;

pub use registry::AdviceRegistry;

/// When an advice runs relative to the real operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdviceKind {
    Before,
    After,
    /// Replaces the call; the original is reachable through [`Proceed`].
    Around,
    /// Runs only when the forwarded call fails.
    OnException,
}

/// What kind of member access an advice intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
    Invoke,
}

impl fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdviceKind::Before => "before",
            AdviceKind::After => "after",
            AdviceKind::Around => "around",
            AdviceKind::OnException => "on_exception",
        };
        f.write_str(s)
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
            AccessKind::Invoke => "invoke",
        };
        f.write_str(s)
    }
}

pub type BeforeInvokeFn = dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync;
pub type AfterInvokeFn = dyn Fn(Value) -> Value + Send + Sync;
pub type AroundInvokeFn =
    dyn Fn(&[Value], &Proceed<'_>, Value) -> Result<Value, TargetError> + Send + Sync;
pub type OnExceptionFn = dyn Fn(&TargetError, Value) -> Value + Send + Sync;
pub type BeforeReadFn = dyn Fn() + Send + Sync;
pub type AfterReadFn = dyn Fn(Value) -> Value + Send + Sync;
pub type BeforeWriteFn = dyn Fn(Value) -> Value + Send + Sync;
pub type AfterWriteFn = dyn Fn(&Value) + Send + Sync;

/// A callable attached to the pipeline.
///
/// Cloning is cheap; the closure is shared.
#[derive(Clone)]
pub enum Advice {
    BeforeInvoke(Arc<BeforeInvokeFn>),
    AfterInvoke(Arc<AfterInvokeFn>),
    AroundInvoke(Arc<AroundInvokeFn>),
    OnException(Arc<OnExceptionFn>),
    BeforeRead(Arc<BeforeReadFn>),
    AfterRead(Arc<AfterReadFn>),
    BeforeWrite(Arc<BeforeWriteFn>),
    AfterWrite(Arc<AfterWriteFn>),
}

impl Advice {
    pub fn before_invoke(f: impl Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static) -> Self {
        Self::BeforeInvoke(Arc::new(f))
    }

    pub fn after_invoke(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self::AfterInvoke(Arc::new(f))
    }

    pub fn around_invoke(
        f: impl Fn(&[Value], &Proceed<'_>, Value) -> Result<Value, TargetError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::AroundInvoke(Arc::new(f))
    }

    pub fn on_exception(f: impl Fn(&TargetError, Value) -> Value + Send + Sync + 'static) -> Self {
        Self::OnException(Arc::new(f))
    }

    pub fn before_read(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self::BeforeRead(Arc::new(f))
    }

    pub fn after_read(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self::AfterRead(Arc::new(f))
    }

    pub fn before_write(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self::BeforeWrite(Arc::new(f))
    }

    pub fn after_write(f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        Self::AfterWrite(Arc::new(f))
    }

    /// The (kind, access) pair this advice's shape belongs to.
    pub fn slot(&self) -> (AdviceKind, AccessKind) {
        match self {
            Advice::BeforeInvoke(_) => (AdviceKind::Before, AccessKind::Invoke),
            Advice::AfterInvoke(_) => (AdviceKind::After, AccessKind::Invoke),
            Advice::AroundInvoke(_) => (AdviceKind::Around, AccessKind::Invoke),
            Advice::OnException(_) => (AdviceKind::OnException, AccessKind::Invoke),
            Advice::BeforeRead(_) => (AdviceKind::Before, AccessKind::Read),
            Advice::AfterRead(_) => (AdviceKind::After, AccessKind::Read),
            Advice::BeforeWrite(_) => (AdviceKind::Before, AccessKind::Write),
            Advice::AfterWrite(_) => (AdviceKind::After, AccessKind::Write),
        }
    }

    pub fn kind(&self) -> AdviceKind {
        self.slot().0
    }

    pub fn access(&self) -> AccessKind {
        self.slot().1
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, access) = self.slot();
        write!(f, "Advice({kind}/{access})")
    }
}
