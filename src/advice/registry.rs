//! Advice registry - ordered advice lists keyed by (kind, access, pattern).

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::trace;

use super::{AccessKind, Advice, AdviceKind};
use crate::error::ConfigurationError;
use crate::pattern;

/// Stores advice grouped by (kind, access, pattern).
///
/// Within one triple, advice keeps registration order. Patterns under a
/// (kind, access) pair keep the order in which each pattern was first
/// registered; a query returns whole per-pattern blocks in that order.
#[derive(Debug, Clone, Default)]
pub struct AdviceRegistry {
    rules: HashMap<(AdviceKind, AccessKind), IndexMap<String, Vec<Advice>>>,
    strict_patterns: bool,
}

impl AdviceRegistry {
    /// Create an empty registry that accepts any non-empty pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that also rejects unterminated `[` classes.
    pub fn strict() -> Self {
        Self {
            strict_patterns: true,
            ..Self::default()
        }
    }

    /// Toggle rejection of unterminated `[` classes for future additions.
    pub fn set_strict_patterns(&mut self, strict: bool) {
        self.strict_patterns = strict;
    }

    pub fn is_strict(&self) -> bool {
        self.strict_patterns
    }

    /// Append `advice` to the list for (kind, access, pattern).
    ///
    /// Rejected without touching state when the pattern is empty, when the
    /// advice's shape does not belong to (kind, access), or (strict mode)
    /// when the pattern is malformed.
    pub fn add(
        &mut self,
        kind: AdviceKind,
        access: AccessKind,
        pattern: impl Into<String>,
        advice: Advice,
    ) -> Result<(), ConfigurationError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(ConfigurationError::EmptyPattern);
        }

        let (actual_kind, actual_access) = advice.slot();
        if (actual_kind, actual_access) != (kind, access) {
            return Err(ConfigurationError::SignatureMismatch {
                kind,
                access,
                actual_kind,
                actual_access,
            });
        }

        if self.strict_patterns && !pattern::is_well_formed(&pattern) {
            return Err(ConfigurationError::MalformedPattern(pattern));
        }

        self.rules
            .entry((kind, access))
            .or_default()
            .entry(pattern)
            .or_default()
            .push(advice);
        Ok(())
    }

    /// All advice for (kind, access) whose pattern matches `name`.
    ///
    /// Empty when `name` is empty or nothing is registered for the pair.
    pub fn query(&self, kind: AdviceKind, access: AccessKind, name: &str) -> Vec<Advice> {
        if name.is_empty() {
            return Vec::new();
        }
        let Some(patterns) = self.rules.get(&(kind, access)) else {
            return Vec::new();
        };

        let matched: Vec<Advice> = patterns
            .iter()
            .filter(|(glob, _)| pattern::matches(glob, name))
            .flat_map(|(_, advice)| advice.iter().cloned())
            .collect();

        trace!(%kind, %access, member = name, count = matched.len(), "Advice query");
        matched
    }

    /// Registered patterns for (kind, access), in first-registration order.
    pub fn patterns(&self, kind: AdviceKind, access: AccessKind) -> Vec<&str> {
        self.rules
            .get(&(kind, access))
            .map(|patterns| patterns.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total number of advice stored.
    pub fn len(&self) -> usize {
        self.rules
            .values()
            .flat_map(|patterns| patterns.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
