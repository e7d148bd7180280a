//! Space id → space name resolution with a TTL cache.
//!
//! Space names change rarely, so a resolved name is reused for up to an
//! hour before the directory is asked again. The cache is an explicit,
//! constructed object injected into the resolution chains — never ambient
//! module state — so tests and independent server instances stay isolated.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::repositories::SpaceDirectory;

struct CacheEntry {
    name: String,
    resolved_at: Instant,
}

/// TTL-cached resolver for space display names.
///
/// Concurrency: the map sits behind a plain mutex that is never held across
/// an await. Concurrent calls for the same uncached key may each trigger a
/// directory lookup; writes are idempotent and last-write-wins, so the race
/// is wasteful but never incorrect. There is no per-key eviction and no
/// capacity bound — space populations are small and long-lived — only
/// natural TTL expiry and the global `clear`.
pub struct SpaceNameResolver {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SpaceNameResolver {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    /// Build a resolver with a custom entry lifetime.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a `Spaces-<n>` id to its display name.
    ///
    /// A live cache entry answers with zero network calls. Otherwise exactly
    /// one directory lookup runs; on success the entry is stored (replacing
    /// any expired one), on failure nothing is cached and the error
    /// propagates, so the next call retries the real lookup.
    pub async fn resolve(&self, spaces: &dyn SpaceDirectory, space_id: &str) -> Result<String> {
        if let Some(name) = self.cached(space_id) {
            tracing::debug!(space_id, "space name served from cache");
            return Ok(name);
        }

        let space = spaces.get_space(space_id).await?;
        let mut entries = self.lock_entries();
        entries.insert(
            space_id.to_string(),
            CacheEntry {
                name: space.name.clone(),
                resolved_at: Instant::now(),
            },
        );
        Ok(space.name)
    }

    /// Drop every cached entry unconditionally.
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    fn cached(&self, space_id: &str) -> Option<String> {
        let entries = self.lock_entries();
        entries
            .get(space_id)
            .filter(|entry| entry.resolved_at.elapsed() < self.ttl)
            .map(|entry| entry.name.clone())
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned lock only means another thread panicked mid-insert; the
        // map itself is always in a usable state.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SpaceNameResolver {
    fn default() -> Self {
        Self::new()
    }
}
