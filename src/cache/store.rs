//! Cache Store Module
//!
//! Concurrent key-value table with optional, lazily enforced TTL expiration.
//!
//! Each key maps to one [`Entry`] holding both the value and its deadline, so a
//! reader can never observe a value without the deadline written alongside it.
//! Expired entries are only detected and removed when a lookup touches them;
//! an expired key that is never read again stays in memory until it is
//! deleted, overwritten or the cache is reset.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::entry::{Entry, MAX_TTL};
use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::config::CacheConfig;

type Table<V> = DashMap<String, Entry<V>>;

// == Expiry Settings ==
/// Expiration flag and TTL, readable and writable from any thread.
#[derive(Debug)]
struct ExpirySettings {
    expirable: AtomicBool,
    ttl_nanos: AtomicU64,
}

impl ExpirySettings {
    fn new(ttl: Option<Duration>) -> Self {
        Self {
            expirable: AtomicBool::new(ttl.is_some()),
            ttl_nanos: AtomicU64::new(ttl.map_or(0, ttl_to_nanos)),
        }
    }

    fn is_expirable(&self) -> bool {
        self.expirable.load(Ordering::Acquire)
    }

    /// TTL to apply to a write happening now, None when expiration is off.
    fn current_ttl(&self) -> Option<Duration> {
        self.is_expirable()
            .then(|| Duration::from_nanos(self.ttl_nanos.load(Ordering::Acquire)))
    }

    fn enable(&self, ttl: Duration) {
        // TTL first so a reader that sees the flag also sees the new value.
        self.ttl_nanos.store(ttl_to_nanos(ttl), Ordering::Release);
        self.expirable.store(true, Ordering::Release);
    }

    fn disable(&self) -> bool {
        self.expirable.swap(false, Ordering::AcqRel)
    }
}

fn ttl_to_nanos(ttl: Duration) -> u64 {
    u64::try_from(ttl.min(MAX_TTL).as_nanos()).unwrap_or(u64::MAX)
}

// == TTL Cache ==
/// Thread-safe key-value cache with an optional cache-wide TTL.
///
/// All operations take `&self`; share the cache between threads with an
/// [`Arc`]. Lookups never fail: absence and expiry are both reported as `None`
/// (or `false` from [`TtlCache::is`]).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ttl_cache::TtlCache;
///
/// let cache = TtlCache::with_ttl(Duration::from_secs(60));
/// cache.set("session", 42);
/// assert_eq!(cache.get("session"), Some(42));
/// assert!(cache.is("session"));
///
/// cache.delete("session");
/// assert_eq!(cache.get("session"), None);
/// ```
pub struct TtlCache<V> {
    /// Current table; `reset` swaps in a fresh one
    table: RwLock<Arc<Table<V>>>,
    /// Expiration flag and TTL
    settings: ExpirySettings,
    /// Lookup counters
    stats: StatsRecorder,
}

impl<V> TtlCache<V> {
    // == Constructors ==
    /// Creates a cache whose entries never expire.
    pub fn new() -> Self {
        Self::from_config(&CacheConfig::default())
    }

    /// Creates a cache where every write expires `ttl` after it happens.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::from_config(&CacheConfig::new().with_ttl(ttl))
    }

    /// Creates a cache from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        debug!(ttl = ?config.ttl, "creating cache");
        Self {
            table: RwLock::new(Arc::new(DashMap::new())),
            settings: ExpirySettings::new(config.ttl),
            stats: StatsRecorder::default(),
        }
    }

    // == Set ==
    /// Stores or overwrites the value for `key`.
    ///
    /// With expiration enabled the entry's deadline becomes now plus the TTL
    /// configured at this moment.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_at(key.into(), value, Instant::now());
    }

    pub(crate) fn set_at(&self, key: String, value: V, now: Instant) {
        let entry = Entry::new(value, now, self.settings.current_ttl());
        self.table.read().insert(key, entry);
    }

    // == Is ==
    /// Returns whether `key` holds a live value.
    ///
    /// Has the same expiry cleanup side effect as [`TtlCache::get`].
    pub fn is(&self, key: &str) -> bool {
        self.is_at(key, Instant::now())
    }

    /// Alias for [`TtlCache::is`].
    pub fn contains_key(&self, key: &str) -> bool {
        self.is(key)
    }

    pub(crate) fn is_at(&self, key: &str, now: Instant) -> bool {
        self.probe_at(key, now, |_| ()).is_some()
    }

    // == Delete ==
    /// Removes `key`. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) {
        self.table.read().remove(key);
    }

    // == Reset ==
    /// Discards every entry. Configuration and statistics are kept.
    ///
    /// Operations racing with a reset act on either the old or the new table.
    pub fn reset(&self) {
        let previous = std::mem::replace(&mut *self.table.write(), Arc::new(DashMap::new()));
        debug!(discarded = previous.len(), "cache reset");
    }

    // == TTL Configuration ==
    /// Enables expiration and sets the TTL used by subsequent writes.
    ///
    /// Deadlines of entries already stored are left as they are. Entries
    /// written while expiration was disabled have no deadline and are treated
    /// as expired on their next lookup.
    pub fn change_ttl(&self, ttl: Duration) {
        self.settings.enable(ttl);
        debug!(?ttl, "cache ttl changed");
    }

    /// Disables expiration, returning whether it was enabled.
    ///
    /// While disabled, every stored entry is visible regardless of deadline.
    pub fn disable_ttl(&self) -> bool {
        let was_enabled = self.settings.disable();
        if was_enabled {
            debug!("cache ttl disabled");
        }
        was_enabled
    }

    /// Returns the TTL applied to new writes, None when expiration is off.
    pub fn ttl(&self) -> Option<Duration> {
        self.settings.current_ttl()
    }

    /// Returns whether lookups currently enforce deadlines.
    pub fn is_expirable(&self) -> bool {
        self.settings.is_expirable()
    }

    // == Length ==
    /// Returns the number of stored entries, including expired entries that
    /// have not been looked up since they expired.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries, expired or not.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    /// Looks up `key` as of `now`, applying `read` to a live value.
    fn probe_at<R>(&self, key: &str, now: Instant, read: impl FnOnce(&V) -> R) -> Option<R> {
        // The guard only blocks `reset`; other lookups share it.
        let table = self.table.read();
        let expirable = self.settings.is_expirable();

        let found = match table.get(key) {
            Some(entry) if expirable && entry.is_expired_at(now) => {
                // Release the shard read lock before removing.
                drop(entry);
                self.expire(&table, key, now);
                None
            }
            Some(entry) => Some(read(&entry.value)),
            None => None,
        };

        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }

    /// Removes `key` if it is still expired; a concurrent refresh survives.
    ///
    /// The check runs under the shard write lock, so a write that landed after
    /// expiration was disabled is never taken for an expired one.
    fn expire(&self, table: &Table<V>, key: &str, now: Instant) {
        if table
            .remove_if(key, |_, entry| {
                self.settings.is_expirable() && entry.is_expired_at(now)
            })
            .is_some()
        {
            self.stats.record_expiration();
            trace!(key, "removed expired entry");
        }
    }
}

impl<V: Clone> TtlCache<V> {
    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// With expiration enabled, an entry past its deadline (or without one) is
    /// removed and `None` is returned.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        self.probe_at(key, now, V::clone)
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &self.len())
            .field("ttl", &self.ttl())
            .finish()
    }
}
