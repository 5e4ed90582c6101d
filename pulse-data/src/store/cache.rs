use super::{DigestStore, SnapshotStore};
use crate::{
    digest::DigestDocument,
    error::DataError,
    snapshot::{Snapshot, SnapshotId},
};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default time-to-live of cached listings (5 minutes).
pub const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(300);

/// Single-value cache with a fixed time-to-live.
///
/// A value stored at `t` is served for every lookup at `now < t + ttl`. The first lookup at or
/// after expiry refreshes it. Failed refreshes are not cached.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Mutex<Option<CacheEntry<T>>>,
}

#[derive(Debug)]
struct CacheEntry<T> {
    stored_at: Instant,
    value: T,
}

impl<T> TtlCache<T>
where
    T: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value if fresh at `now`, otherwise store and return the result of
    /// `refresh`.
    pub fn get_or_try_refresh_at<E, F>(&self, now: Instant, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut entry = self.entry.lock();

        if let Some(cached) = entry.as_ref() {
            if now.saturating_duration_since(cached.stored_at) < self.ttl {
                return Ok(cached.value.clone());
            }
            debug!(ttl_secs = self.ttl.as_secs(), "cached value expired");
        }

        let value = refresh()?;
        *entry = Some(CacheEntry {
            stored_at: now,
            value: value.clone(),
        });
        Ok(value)
    }

    /// [`Self::get_or_try_refresh_at`] using the current [`Instant`].
    pub fn get_or_try_refresh<E, F>(&self, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.get_or_try_refresh_at(Instant::now(), refresh)
    }

    /// Drop the cached value so the next lookup refreshes.
    pub fn invalidate(&self) {
        *self.entry.lock() = None;
    }
}

/// Store wrapper that serves snapshot & digest listings from [`TtlCache`]s. Document loads are
/// passed straight through to the inner store.
#[derive(Debug)]
pub struct CachedStore<Store> {
    inner: Store,
    snapshot_ids: TtlCache<Vec<SnapshotId>>,
    digest_ids: TtlCache<Vec<SnapshotId>>,
}

impl<Store> CachedStore<Store> {
    pub fn new(inner: Store, ttl: Duration) -> Self {
        Self {
            inner,
            snapshot_ids: TtlCache::new(ttl),
            digest_ids: TtlCache::new(ttl),
        }
    }

    pub fn inner(&self) -> &Store {
        &self.inner
    }

    /// Force both listings to refresh on next use.
    pub fn invalidate(&self) {
        self.snapshot_ids.invalidate();
        self.digest_ids.invalidate();
    }
}

impl<Store> SnapshotStore for CachedStore<Store>
where
    Store: SnapshotStore,
{
    fn snapshot_ids(&self) -> Result<Vec<SnapshotId>, DataError> {
        self.snapshot_ids
            .get_or_try_refresh(|| self.inner.snapshot_ids())
    }

    fn load_snapshot(&self, id: SnapshotId) -> Result<Snapshot, DataError> {
        self.inner.load_snapshot(id)
    }
}

impl<Store> DigestStore for CachedStore<Store>
where
    Store: DigestStore,
{
    fn digest_ids(&self) -> Result<Vec<SnapshotId>, DataError> {
        self.digest_ids.get_or_try_refresh(|| self.inner.digest_ids())
    }

    fn load_digest(&self, id: SnapshotId) -> Result<DigestDocument, DataError> {
        self.inner.load_digest(id)
    }
}
