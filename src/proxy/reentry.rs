//! Per-thread dispatch depth, counted per proxy.
//!
//! Tracks how many dispatcher frames of each proxy are active on the current
//! thread. A proxy called from another proxy's advice starts at its own
//! depth of zero; only calls back into the same proxy nest. Only consulted
//! when a binding carries a re-entry limit.

use std::cell::RefCell;
use std::collections::HashMap;

use super::ProxyId;
use crate::error::DispatchError;

thread_local! {
    static DEPTH: RefCell<HashMap<ProxyId, usize>> = RefCell::new(HashMap::new());
}

/// Held for the duration of one dispatcher call.
#[derive(Debug)]
pub(crate) struct ReentryGuard {
    proxy: ProxyId,
    depth: usize,
}

impl ReentryGuard {
    /// Enter a dispatcher frame for `proxy`, failing if `limit` frames of
    /// that proxy are already active on this thread.
    pub(crate) fn enter(
        proxy: ProxyId,
        member: &str,
        limit: Option<usize>,
    ) -> Result<Self, DispatchError> {
        let depth = DEPTH.with(|d| d.borrow().get(&proxy).copied().unwrap_or(0));
        if let Some(limit) = limit {
            if depth >= limit {
                return Err(DispatchError::ReentryLimit {
                    member: member.to_string(),
                    depth,
                });
            }
        }
        DEPTH.with(|d| d.borrow_mut().insert(proxy, depth + 1));
        Ok(Self {
            proxy,
            depth: depth + 1,
        })
    }

    /// Frames of this proxy active on this thread, this one included.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for ReentryGuard {
    fn drop(&mut self) {
        let _ = DEPTH.try_with(|d| {
            let mut frames = d.borrow_mut();
            match frames.get(&self.proxy).copied() {
                Some(n) if n > 1 => {
                    frames.insert(self.proxy, n - 1);
                }
                _ => {
                    frames.remove(&self.proxy);
                }
            }
        });
    }
}
