//! Interpose - advice-based interception for dynamic targets.
//!
//! Attach before/after/around/on-exception behavior to the method calls and
//! property accesses of an object without touching the object itself.
//! Build an [`AspectDefinition`], add advice keyed by glob patterns over
//! member names, then [`materialize`](AspectDefinition::materialize) it into
//! a [`ProxyHandle`] and use the handle in place of the object.

pub mod advice;
pub mod aspect;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod pattern;
pub mod proxy;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advice::{AccessKind, Advice, AdviceKind, AdviceRegistry};
pub use aspect::{AspectDefinition, TargetSpec};
pub use config::EngineConfig;
pub use error::{AspectError, ConfigurationError, DispatchError};
pub use interfaces::{Target, TargetCatalog, TargetError};
pub use proxy::{BindingTable, Proceed, ProxyHandle, ProxyId};

pub use serde_json::Value;
