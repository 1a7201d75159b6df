//! Type catalog - constructs targets from a type identifier.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::target::{Result, Target, TargetError};

/// Constructor registered for a type identifier.
pub type Constructor = Arc<dyn Fn(Vec<Value>) -> Result<Box<dyn Target>> + Send + Sync>;

/// Maps type identifiers to constructors.
///
/// A type identifier "resolves" when a constructor is registered for it.
#[derive(Clone, Default)]
pub struct TargetCatalog {
    constructors: HashMap<String, Constructor>,
}

impl TargetCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor, replacing any previous one for `type_name`.
    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Result<Box<dyn Target>> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        debug!(type_name = %type_name, "Registering target constructor");
        self.constructors.insert(type_name, Arc::new(constructor));
        self
    }

    /// Builder-style registration.
    pub fn with<F>(mut self, type_name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Box<dyn Target>> + Send + Sync + 'static,
    {
        self.register(type_name, constructor);
        self
    }

    /// Whether `type_name` can be instantiated.
    pub fn resolves(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Construct a new instance of `type_name`.
    pub fn construct(&self, type_name: &str, args: Vec<Value>) -> Result<Box<dyn Target>> {
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| TargetError::UnknownType(type_name.to_string()))?;
        constructor(args)
    }

    /// Registered type identifiers, in no particular order.
    pub fn type_names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }
}

impl fmt::Debug for TargetCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetCatalog")
            .field("types", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
