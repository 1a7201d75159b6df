//! Error types for aspect configuration, materialization and dispatch.

use crate::advice::{AccessKind, AdviceKind};
use crate::interfaces::TargetError;
use crate::proxy::ProxyId;

/// Advice registration was refused. Nothing was stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Advice pattern must not be empty")]
    EmptyPattern,

    #[error("Advice shaped for {actual_kind}/{actual_access} registered as {kind}/{access}")]
    SignatureMismatch {
        kind: AdviceKind,
        access: AccessKind,
        actual_kind: AdviceKind,
        actual_access: AccessKind,
    },

    #[error("Malformed pattern: {0}")]
    MalformedPattern(String),
}

/// Errors from creating or materializing an aspect definition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AspectError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Aspect already materialized as proxy {0}")]
    AlreadyMaterialized(ProxyId),

    #[error("Proxy {0} is already bound")]
    AlreadyBound(ProxyId),

    #[error("Target construction failed: {0}")]
    Construction(#[from] TargetError),
}

/// Errors surfaced by a proxy operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("Proxy {0} has no binding")]
    UnboundProxy(ProxyId),

    #[error("Re-entry limit reached calling '{member}' at depth {depth}")]
    ReentryLimit { member: String, depth: usize },

    /// The target's own error, passed through untouched.
    #[error(transparent)]
    Target(#[from] TargetError),
}

impl DispatchError {
    /// Returns the target error if this failure came from the target.
    pub fn target_error(&self) -> Option<&TargetError> {
        match self {
            DispatchError::Target(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_display() {
        let err = ConfigurationError::EmptyPattern;
        assert_eq!(err.to_string(), "Advice pattern must not be empty");
    }

    #[test]
    fn test_signature_mismatch_display() {
        let err = ConfigurationError::SignatureMismatch {
            kind: AdviceKind::After,
            access: AccessKind::Read,
            actual_kind: AdviceKind::Before,
            actual_access: AccessKind::Invoke,
        };
        assert_eq!(
            err.to_string(),
            "Advice shaped for before/invoke registered as after/read"
        );
    }

    #[test]
    fn test_target_error_is_transparent() {
        let err: DispatchError = TargetError::raised("Error Processing Request").into();
        assert_eq!(err.to_string(), "Error Processing Request");
        assert_eq!(
            err.target_error(),
            Some(&TargetError::raised("Error Processing Request"))
        );
    }

    #[test]
    fn test_reentry_limit_has_no_target_error() {
        let err = DispatchError::ReentryLimit {
            member: "func".to_string(),
            depth: 3,
        };
        assert!(err.target_error().is_none());
        assert!(err.to_string().contains("func"));
    }
}
