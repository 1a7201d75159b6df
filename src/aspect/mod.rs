//! Aspect definitions.
//!
//! An [`AspectDefinition`] owns one target specification and one advice
//! registry. Advice is added with [`AspectDefinition::add_advice`] (or one
//! of the shaped helpers) and the definition is turned into a working proxy
//! exactly once with [`AspectDefinition::materialize`].
//!
//! # Example
//!
//! ```ignore
//! use interpose::{AspectDefinition, TargetSpec};
//! use serde_json::json;
//!
//! let mut aspect = AspectDefinition::create(TargetSpec::of_type(&catalog, "A"))?;
//! aspect.before_invoke("func", |mut args| {
//!     args[0] = json!("im-return");
//!     args
//! })?;
//! aspect.after_invoke("func", |ret| json!(format!("{}_1", ret.as_str().unwrap_or(""))))?;
//!
//! let proxy = aspect.materialize(vec![json!("hello")])?;
//! assert_eq!(proxy.invoke("func", vec![json!("ret")])?, json!("im-return_1"));
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use crate::advice::{AccessKind, Advice, AdviceKind, AdviceRegistry};
use crate::config::EngineConfig;
use crate::error::{AspectError, ConfigurationError};
use crate::interfaces::{Target, TargetCatalog, TargetError};
use crate::proxy::{Binding, BindingTable, Proceed, ProxyHandle, ProxyId};

/// What an aspect wraps.
pub enum TargetSpec {
    /// Construct a fresh instance of a catalogued type at materialization.
    Type {
        catalog: Arc<TargetCatalog>,
        type_name: String,
    },
    /// Copy this instance at materialization. The instance captured here is
    /// the one copied, whatever the caller later does with its own objects.
    Instance(Box<dyn Target>),
}

impl TargetSpec {
    pub fn of_type(catalog: &Arc<TargetCatalog>, type_name: impl Into<String>) -> Self {
        Self::Type {
            catalog: Arc::clone(catalog),
            type_name: type_name.into(),
        }
    }

    pub fn instance(target: impl Target + 'static) -> Self {
        Self::Instance(Box::new(target))
    }

    fn label(&self) -> String {
        match self {
            TargetSpec::Type { type_name, .. } => type_name.clone(),
            TargetSpec::Instance(target) => target.type_name().to_string(),
        }
    }
}

impl fmt::Debug for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::Type { type_name, .. } => {
                f.debug_struct("Type").field("type_name", type_name).finish()
            }
            TargetSpec::Instance(target) => f
                .debug_tuple("Instance")
                .field(&target.type_name())
                .finish(),
        }
    }
}

/// A target plus the advice to run around it.
pub struct AspectDefinition {
    spec: TargetSpec,
    advice: Arc<RwLock<AdviceRegistry>>,
    bindings: Arc<BindingTable>,
    config: EngineConfig,
    materialized: Option<(ProxyId, Arc<Binding>)>,
}

impl AspectDefinition {
    /// Create a definition for `spec`.
    ///
    /// Fails with [`AspectError::InvalidTarget`] when a type identifier is
    /// not in its catalog.
    pub fn create(spec: TargetSpec) -> Result<Self, AspectError> {
        if let TargetSpec::Type { catalog, type_name } = &spec {
            if !catalog.resolves(type_name) {
                return Err(AspectError::InvalidTarget(format!(
                    "type '{}' is not registered",
                    type_name
                )));
            }
        }

        debug!(target = %spec.label(), "Created aspect definition");
        Ok(Self {
            spec,
            advice: Arc::new(RwLock::new(AdviceRegistry::new())),
            bindings: BindingTable::global(),
            config: EngineConfig::default(),
            materialized: None,
        })
    }

    /// Bind proxies in `bindings` instead of the process-wide table.
    pub fn with_bindings(mut self, bindings: Arc<BindingTable>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Apply engine settings.
    ///
    /// Advice already registered is kept; pattern strictness applies to
    /// advice added from here on.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.advice
            .write()
            .set_strict_patterns(config.strict_patterns);
        self.config = config;
        self
    }

    /// Register `advice` under (kind, access, pattern).
    ///
    /// May be called after materialization; the proxy sees new advice on
    /// its next operation.
    pub fn add_advice(
        &self,
        kind: AdviceKind,
        access: AccessKind,
        pattern: impl Into<String>,
        advice: Advice,
    ) -> Result<(), ConfigurationError> {
        let pattern = pattern.into();
        let result = self.advice.write().add(kind, access, pattern.clone(), advice);
        match &result {
            Ok(()) => debug!(%kind, %access, pattern = %pattern, "Added advice"),
            Err(e) => debug!(%kind, %access, pattern = %pattern, error = %e, "Advice rejected"),
        }
        result
    }

    pub fn before_invoke(
        &self,
        pattern: impl Into<String>,
        f: impl Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    ) -> Result<(), ConfigurationError> {
        self.add_advice(
            AdviceKind::Before,
            AccessKind::Invoke,
            pattern,
            Advice::before_invoke(f),
        )
    }

    pub fn after_invoke(
        &self,
        pattern: impl Into<String>,
        f: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<(), ConfigurationError> {
        self.add_advice(
            AdviceKind::After,
            AccessKind::Invoke,
            pattern,
            Advice::after_invoke(f),
        )
    }

    pub fn around_invoke(
        &self,
        pattern: impl Into<String>,
        f: impl Fn(&[Value], &Proceed<'_>, Value) -> Result<Value, TargetError>
            + Send
            + Sync
            + 'static,
    ) -> Result<(), ConfigurationError> {
        self.add_advice(
            AdviceKind::Around,
            AccessKind::Invoke,
            pattern,
            Advice::around_invoke(f),
        )
    }

    pub fn on_exception(
        &self,
        pattern: impl Into<String>,
        f: impl Fn(&TargetError, Value) -> Value + Send + Sync + 'static,
    ) -> Result<(), ConfigurationError> {
        self.add_advice(
            AdviceKind::OnException,
            AccessKind::Invoke,
            pattern,
            Advice::on_exception(f),
        )
    }

    pub fn before_read(
        &self,
        pattern: impl Into<String>,
        f: impl Fn() + Send + Sync + 'static,
    ) -> Result<(), ConfigurationError> {
        self.add_advice(
            AdviceKind::Before,
            AccessKind::Read,
            pattern,
            Advice::before_read(f),
        )
    }

    pub fn after_read(
        &self,
        pattern: impl Into<String>,
        f: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<(), ConfigurationError> {
        self.add_advice(
            AdviceKind::After,
            AccessKind::Read,
            pattern,
            Advice::after_read(f),
        )
    }

    pub fn before_write(
        &self,
        pattern: impl Into<String>,
        f: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<(), ConfigurationError> {
        self.add_advice(
            AdviceKind::Before,
            AccessKind::Write,
            pattern,
            Advice::before_write(f),
        )
    }

    pub fn after_write(
        &self,
        pattern: impl Into<String>,
        f: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Result<(), ConfigurationError> {
        self.add_advice(
            AdviceKind::After,
            AccessKind::Write,
            pattern,
            Advice::after_write(f),
        )
    }

    /// Produce the live target and a proxy bound to it.
    ///
    /// Type specs construct a new instance from `args`; instance specs copy
    /// the captured instance and ignore `args`. A second call fails with
    /// [`AspectError::AlreadyMaterialized`] and changes nothing.
    pub fn materialize(&mut self, args: Vec<Value>) -> Result<ProxyHandle, AspectError> {
        if let Some((id, _)) = &self.materialized {
            return Err(AspectError::AlreadyMaterialized(*id));
        }

        let target = match &self.spec {
            TargetSpec::Type { catalog, type_name } => catalog.construct(type_name, args)?,
            TargetSpec::Instance(instance) => {
                if !args.is_empty() {
                    debug!(
                        ignored = args.len(),
                        "Constructor args ignored for instance target"
                    );
                }
                instance.copy()
            }
        };

        let label = self
            .config
            .label
            .clone()
            .unwrap_or_else(|| self.spec.label());
        let binding = Arc::new(Binding::new(
            label,
            target,
            Arc::clone(&self.advice),
            self.config.max_reentry_depth,
        ));

        let id = ProxyId::new();
        self.bindings.bind(id, Arc::clone(&binding))?;
        info!(proxy = %id, target = %binding.label(), "Materialized aspect");

        self.materialized = Some((id, binding));
        Ok(ProxyHandle::new(id, Arc::clone(&self.bindings)))
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized.is_some()
    }

    /// Identity of the proxy produced by `materialize`, if any.
    pub fn proxy_id(&self) -> Option<ProxyId> {
        self.materialized.as_ref().map(|(id, _)| *id)
    }

    /// Number of advice registered so far.
    pub fn advice_count(&self) -> usize {
        self.advice.read().len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl fmt::Debug for AspectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectDefinition")
            .field("spec", &self.spec)
            .field("advice", &self.advice_count())
            .field("proxy", &self.proxy_id())
            .finish()
    }
}
