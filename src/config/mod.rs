//! Engine configuration.
//!
//! Settings applied to an aspect definition and the proxies it produces.
//! Loaded from YAML files and environment variables.

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "interpose.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "INTERPOSE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "INTERPOSE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "INTERPOSE_LOG";

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration source error: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Settings for one aspect definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject advice patterns with an unterminated `[` class.
    ///
    /// Default: false. Such patterns then treat `[` as a literal.
    pub strict_patterns: bool,

    /// Maximum nested calls into the same proxy on one thread.
    ///
    /// Default: unbounded. Advice that calls back into its own proxy
    /// without a stop condition recurses until the stack runs out.
    pub max_reentry_depth: Option<usize>,

    /// Target name used in logs.
    ///
    /// Default: the type identifier, or the instance's own type name.
    pub label: Option<String>,
}

impl EngineConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `interpose.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
