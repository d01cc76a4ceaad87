//! Process-wide response cache.
//!
//! # Design Decisions
//! - Keyed by request path only: method, query and body are not part of the
//!   key, so a cached `GET /` also answers `POST /`
//! - No size bound and no expiry; entries leave only through explicit
//!   invalidation (directives or the admin router)
//! - Only paths accepted by [`is_cacheable`] are ever stored

use std::sync::Arc;

use dashmap::DashMap;

use crate::gateway::OutboundResponse;
use crate::observability::metrics;

/// Exact paths that are always cacheable.
const CACHEABLE_PATHS: &[&str] = &["/", "/rpSys.html"];

/// Static-asset suffixes that are cacheable.
const CACHEABLE_SUFFIXES: &[&str] = &[".png", ".gif", ".css", ".js"];

/// Path fragment marking cacheable help pages.
const CACHEABLE_FRAGMENT: &str = "/help/";

/// Whether a response for `path` may be stored.
pub fn is_cacheable(path: &str) -> bool {
    CACHEABLE_PATHS.contains(&path)
        || CACHEABLE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
        || path.contains(CACHEABLE_FRAGMENT)
}

/// A thread-safe cache of rewritten responses.
#[derive(Clone, Default)]
pub struct ResponseCache {
    inner: Arc<DashMap<String, OutboundResponse>>,
}

impl ResponseCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached response for `path`, if any.
    pub fn get(&self, path: &str) -> Option<OutboundResponse> {
        let hit = self.inner.get(path).map(|r| r.value().clone());
        metrics::record_cache_event(if hit.is_some() { "hit" } else { "miss" });
        hit
    }

    /// Store `response` under `path` if the path is cacheable, replacing any
    /// previous entry. Returns whether it was stored.
    pub fn store(&self, path: &str, response: &OutboundResponse) -> bool {
        if !is_cacheable(path) {
            return false;
        }
        self.inner.insert(path.to_string(), response.clone());
        metrics::record_cache_event("store");
        metrics::record_cache_size(self.inner.len());
        true
    }

    /// Remove the entry for `path`. Returns whether one existed.
    pub fn invalidate(&self, path: &str) -> bool {
        let removed = self.inner.remove(path).is_some();
        if removed {
            tracing::debug!(path = %path, "Cache entry invalidated");
            metrics::record_cache_event("invalidate");
            metrics::record_cache_size(self.inner.len());
        }
        removed
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let count = self.inner.len();
        self.inner.clear();
        metrics::record_cache_size(0);
        count
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Cached paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        paths.sort();
        paths
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.inner.len())
            .finish()
    }
}
