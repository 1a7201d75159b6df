//! Proxy handles and the interception pipeline.
//!
//! A [`ProxyHandle`] stands in for a materialized target. Each operation
//! resolves the handle's binding, asks the advice registry what applies to
//! the member name, and runs:
//!
//! - `invoke`: before → around chain (or direct call) → on-exception recovery → after
//! - `read`: before → read → after
//! - `write`: before → assign → after
//!
//! # Around chain
//!
//! Around advice run in order. Each receives the args, a [`Proceed`] that
//! forwards to the real member, and the carry returned by the previous
//! around advice (`Value::Null` for the first). The last carry is the
//! call's result. Proceed may be called any number of times, including not
//! at all.
//!
//! # Failures
//!
//! A target error raised by the direct call, by Proceed, or by an around
//! advice goes to on-exception advice for the member. If there is any, the
//! error is swallowed and their final value becomes the result; otherwise
//! the error is returned unchanged and after advice is skipped.

pub mod binding;
mod reentry;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::advice::{AccessKind, Advice, AdviceKind};
use crate::error::DispatchError;
use crate::interfaces::TargetError;

pub use binding::{Binding, BindingTable, ProxyId};
use reentry::ReentryGuard;

/// Forwards the intercepted call to the real target.
///
/// Bound to the member name and the args as they stood after before advice.
/// Around advice cannot rewrite those args for later calls: every `call`,
/// from any around advice in the chain, forwards the same args. Advice that
/// needs different args must produce its own result instead.
pub struct Proceed<'a> {
    binding: &'a Binding,
    member: &'a str,
    args: &'a [Value],
}

impl<'a> Proceed<'a> {
    fn new(binding: &'a Binding, member: &'a str, args: &'a [Value]) -> Self {
        Self {
            binding,
            member,
            args,
        }
    }

    /// Call the original member and return its result.
    pub fn call(&self) -> Result<Value, TargetError> {
        self.binding.invoke_target(self.member, self.args.to_vec())
    }

    pub fn member(&self) -> &str {
        self.member
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }
}

impl fmt::Debug for Proceed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proceed")
            .field("member", &self.member)
            .field("args", &self.args)
            .finish()
    }
}

/// The object callers hold in place of the target.
///
/// Carries only its identity and the table it is bound in. Dropping the
/// handle removes its binding.
pub struct ProxyHandle {
    id: ProxyId,
    bindings: Arc<BindingTable>,
}

impl ProxyHandle {
    pub(crate) fn new(id: ProxyId, bindings: Arc<BindingTable>) -> Self {
        Self { id, bindings }
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    /// Call method `name` with `args` through the advice pipeline.
    #[tracing::instrument(name = "proxy.invoke", skip_all, fields(proxy = %self.id, member = %name))]
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        let binding = self.bindings.resolve(self.id)?;
        let guard = ReentryGuard::enter(self.id, name, binding.max_reentry_depth())?;

        let before = binding.advice_for(AdviceKind::Before, AccessKind::Invoke, name);
        let mut args = args;
        for advice in &before {
            if let Advice::BeforeInvoke(f) = advice {
                args = f(args);
            }
        }

        let around = binding.advice_for(AdviceKind::Around, AccessKind::Invoke, name);
        debug!(
            before = before.len(),
            around = around.len(),
            depth = guard.depth(),
            "Dispatching invoke"
        );

        let outcome = if around.is_empty() {
            binding
                .invoke_target(name, args)
                .map_err(|error| (Value::Null, error))
        } else {
            let proceed = Proceed::new(&binding, name, &args);
            run_around(&around, &args, &proceed)
        };

        let mut ret = match outcome {
            Ok(value) => value,
            Err((partial, error)) => recover(&binding, name, partial, error)?,
        };

        let after = binding.advice_for(AdviceKind::After, AccessKind::Invoke, name);
        for advice in &after {
            if let Advice::AfterInvoke(f) = advice {
                ret = f(ret);
            }
        }

        Ok(ret)
    }

    /// Read property `name` through the advice pipeline.
    #[tracing::instrument(name = "proxy.read", skip_all, fields(proxy = %self.id, member = %name))]
    pub fn read(&self, name: &str) -> Result<Value, DispatchError> {
        let binding = self.bindings.resolve(self.id)?;
        let _guard = ReentryGuard::enter(self.id, name, binding.max_reentry_depth())?;

        for advice in &binding.advice_for(AdviceKind::Before, AccessKind::Read, name) {
            if let Advice::BeforeRead(f) = advice {
                f();
            }
        }

        let mut value = binding.read_target(name)?;

        let after = binding.advice_for(AdviceKind::After, AccessKind::Read, name);
        debug!(after = after.len(), "Dispatching read");
        for advice in &after {
            if let Advice::AfterRead(f) = advice {
                value = f(value);
            }
        }

        Ok(value)
    }

    /// Assign property `name` through the advice pipeline.
    #[tracing::instrument(name = "proxy.write", skip_all, fields(proxy = %self.id, member = %name))]
    pub fn write(&self, name: &str, value: Value) -> Result<(), DispatchError> {
        let binding = self.bindings.resolve(self.id)?;
        let _guard = ReentryGuard::enter(self.id, name, binding.max_reentry_depth())?;

        let before = binding.advice_for(AdviceKind::Before, AccessKind::Write, name);
        debug!(before = before.len(), "Dispatching write");
        let mut value = value;
        for advice in &before {
            if let Advice::BeforeWrite(f) = advice {
                value = f(value);
            }
        }

        binding.write_target(name, value.clone())?;

        for advice in &binding.advice_for(AdviceKind::After, AccessKind::Write, name) {
            if let Advice::AfterWrite(f) = advice {
                f(&value);
            }
        }

        Ok(())
    }
}

impl Drop for ProxyHandle {
    fn drop(&mut self) {
        self.bindings.unbind(self.id);
    }
}

impl fmt::Debug for ProxyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyHandle").field("id", &self.id).finish()
    }
}

/// Thread the carry through the around chain.
///
/// On failure, returns the carry as it stood before the failing advice.
fn run_around(
    around: &[Advice],
    args: &[Value],
    proceed: &Proceed<'_>,
) -> Result<Value, (Value, TargetError)> {
    let mut carry = Value::Null;
    for advice in around {
        if let Advice::AroundInvoke(f) = advice {
            match f(args, proceed, carry.clone()) {
                Ok(next) => carry = next,
                Err(error) => return Err((carry, error)),
            }
        }
    }
    Ok(carry)
}

/// Hand a failed call to on-exception advice, or give the error back.
fn recover(
    binding: &Binding,
    name: &str,
    partial: Value,
    error: TargetError,
) -> Result<Value, DispatchError> {
    let handlers = binding.advice_for(AdviceKind::OnException, AccessKind::Invoke, name);
    if handlers.is_empty() {
        debug!(error = %error, "Target error not handled");
        return Err(error.into());
    }

    warn!(error = %error, handlers = handlers.len(), "Recovering from target error");
    let mut ret = partial;
    for advice in &handlers {
        if let Advice::OnException(f) = advice {
            ret = f(&error, ret);
        }
    }
    Ok(ret)
}
