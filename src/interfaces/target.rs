//! Target access interface.
//!
//! The engine never reaches into a target itself. Everything it forwards
//! (member calls, property reads and writes, copying an instance) goes
//! through this trait.

use serde_json::Value;

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;

/// Errors raised by a target while serving a forwarded operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TargetError {
    #[error("Unknown target type: {0}")]
    UnknownType(String),

    #[error("No such member: {0}")]
    NoSuchMember(String),

    /// The member ran and failed on its own terms.
    #[error("{message}")]
    Raised { message: String, code: i64 },

    #[error("Call rejected: {0}")]
    Rejected(String),
}

impl TargetError {
    /// A raised error with code 0.
    pub fn raised(message: impl Into<String>) -> Self {
        Self::Raised {
            message: message.into(),
            code: 0,
        }
    }

    /// A raised error carrying an application code.
    pub fn raised_with_code(message: impl Into<String>, code: i64) -> Self {
        Self::Raised {
            message: message.into(),
            code,
        }
    }

    /// Returns the error message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            TargetError::UnknownType(msg)
            | TargetError::NoSuchMember(msg)
            | TargetError::Rejected(msg) => msg,
            TargetError::Raised { message, .. } => message,
        }
    }

    /// Returns the application code for raised errors.
    pub fn code(&self) -> Option<i64> {
        match self {
            TargetError::Raised { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// A live object whose public members can be reached by name.
///
/// Implementations:
/// - `ScriptedObject` (test utilities): property bag with closure methods
///
/// Only the proxy's callers go through here. Calls a target makes on
/// itself are invisible to the engine.
pub trait Target: Send {
    /// Call a public method with positional arguments.
    fn invoke_member(&mut self, name: &str, args: Vec<Value>) -> Result<Value>;

    /// Read a public property.
    fn read_member(&self, name: &str) -> Result<Value>;

    /// Assign a public property.
    fn write_member(&mut self, name: &str, value: Value) -> Result<()>;

    /// Produce an independent copy that shares no mutable state with `self`.
    fn copy(&self) -> Box<dyn Target>;

    /// Human-readable type name for logs.
    fn type_name(&self) -> &str {
        "object"
    }
}
