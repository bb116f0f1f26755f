//! Time-windowed suppression cache for repeated spam.
//!
//! `SuppressionCache` remembers when a key was first seen. Within the window
//! every further sighting is suppressed; once the window elapses the key is
//! treated as new again. Expiry is checked lazily on access, and an optional
//! sweeper task prunes stale keys so unique spam does not accumulate.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shortest sweep period; `tokio::time::interval` rejects zero.
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

use relay_core::GroupId;

/// Concurrent keyed set whose entries expire after a fixed window.
pub struct SuppressionCache {
    /// Key -> instant it was registered.
    entries: DashMap<String, Instant>,
    window: Duration,
}

impl SuppressionCache {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Return `true` if `key` was already registered within the window.
    ///
    /// The first call for a key (or the first after its window elapsed)
    /// registers it and returns `false`. Check and register happen under the
    /// key's shard lock, so two racing callers never both see `false`.
    pub fn should_suppress(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) < self.window {
                    true
                } else {
                    entry.insert(now);
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                false
            }
        }
    }

    /// Drop every expired key. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, seen| now.saturating_duration_since(*seen) < self.window);
        before.saturating_sub(self.entries.len())
    }

    /// Number of keys currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn a background task that calls [`sweep`](Self::sweep) every `every`.
    ///
    /// The task holds only a weak reference and exits once the cache is dropped.
    /// Periods below one millisecond are raised to one millisecond.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let every = every.max(MIN_SWEEP_PERIOD);
        let weak: Weak<Self> = Arc::downgrade(self);
        info!(interval_ms = every.as_millis() as u64, "suppression sweeper started");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    debug!("suppression cache dropped, sweeper exiting");
                    break;
                };
                let removed = cache.sweep();
                if removed > 0 {
                    debug!(removed, remaining = cache.len(), "expired suppression keys pruned");
                }
            }
        })
    }
}

/// Key for a red-envelope text posted to `to`.
///
/// The full text is part of the key: visually different variants of the same
/// spam are deliberately counted as different keys.
pub fn cash_key(to: &GroupId, text: &str) -> String {
    format!("{to}: {text}")
}
