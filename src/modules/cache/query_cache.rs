use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio::time::{sleep, Duration, Instant};

use super::key::QueryKey;

#[derive(Debug, Clone)]
pub struct QueryCacheConfig {
    /// How long a successful result counts as fresh.
    pub stale_after: Duration,
    /// Retries after the first failed loader attempt.
    pub retry_limit: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30),
            retry_limit: 2,
            retry_base_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(8),
        }
    }
}

/// What a consumer sees for one cache key: the last known value (if any), an
/// in-flight marker, and the last loader error (if any). A value and an error
/// can coexist, so the UI can show stale data with an error banner.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub data: Option<Arc<T>>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }
}

impl<T> QuerySnapshot<T> {
    pub fn empty() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn ready(value: T) -> Self {
        Self {
            data: Some(Arc::new(value)),
            is_loading: false,
            error: None,
        }
    }
}

struct Entry {
    value: Option<Arc<dyn Any + Send + Sync>>,
    error: Option<String>,
    fetched_at: Option<Instant>,
    stale: bool,
    loading: bool,
}

impl Entry {
    fn empty() -> Self {
        Self {
            value: None,
            error: None,
            fetched_at: None,
            stale: false,
            loading: false,
        }
    }
}

struct Shared {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    gates: Mutex<HashMap<QueryKey, Arc<tokio::sync::Mutex<()>>>>,
    config: QueryCacheConfig,
    refreshed: broadcast::Sender<QueryKey>,
    offline: AtomicBool,
}

/// Keyed cache of remote reads with stale-while-revalidate semantics and
/// per-key request de-duplication. Constructed once at composition time and
/// handed to every store; cloning shares the same state.
#[derive(Clone)]
pub struct QueryCache {
    shared: Arc<Shared>,
}

enum Plan {
    Hit,
    Revalidate,
    Load,
}

impl QueryCache {
    pub fn new(config: QueryCacheConfig) -> Self {
        let (refreshed, _) = broadcast::channel(64);
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(HashMap::new()),
                gates: Mutex::new(HashMap::new()),
                config,
                refreshed,
                offline: AtomicBool::new(false),
            }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(QueryCacheConfig::default())
    }

    /// Returns the cached snapshot for `key`, loading or revalidating as
    /// needed:
    /// - fresh value: returned as-is, the loader is not called;
    /// - value past the stale window: returned immediately while a background
    ///   refresh runs (stale-while-revalidate);
    /// - no value, or explicitly invalidated: the load is awaited.
    ///
    /// Loader failures never escape; they are stored as the key's error next
    /// to any previously cached value.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, loader: F) -> QuerySnapshot<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, String>> + Send,
    {
        let plan = {
            let entries = self.shared.entries.lock().unwrap();
            match entries.get(&key) {
                Some(entry) if entry.value.is_some() && !entry.stale => {
                    if self.is_fresh(entry) {
                        Plan::Hit
                    } else {
                        Plan::Revalidate
                    }
                }
                _ => Plan::Load,
            }
        };

        match plan {
            Plan::Hit => self.peek(&key),
            Plan::Revalidate => {
                let cache = self.clone();
                let refresh_key = key.clone();
                tokio::spawn(async move {
                    cache.load::<T, F, Fut>(refresh_key, loader).await;
                });
                self.peek(&key)
            }
            Plan::Load => self.load(key, loader).await,
        }
    }

    /// Current snapshot without triggering any load.
    pub fn peek<T>(&self, key: &QueryKey) -> QuerySnapshot<T>
    where
        T: Send + Sync + 'static,
    {
        let entries = self.shared.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) => QuerySnapshot {
                data: entry
                    .value
                    .clone()
                    .and_then(|value| value.downcast::<T>().ok()),
                is_loading: entry.loading,
                error: entry.error.clone(),
            },
            None => QuerySnapshot::empty(),
        }
    }

    /// Flags every entry matching the predicate as stale; the next read for
    /// a flagged key awaits a fresh load.
    pub fn invalidate(&self, predicate: impl Fn(&QueryKey) -> bool) {
        let mut entries = self.shared.entries.lock().unwrap();
        for (key, entry) in entries.iter_mut() {
            if predicate(key) {
                entry.stale = true;
            }
        }
    }

    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        self.invalidate(|key| key.starts_with(prefix));
    }

    /// Drops all cached state. Intended for test isolation.
    pub fn reset(&self) {
        self.shared.entries.lock().unwrap().clear();
        self.shared.gates.lock().unwrap().clear();
    }

    /// While offline, failed loads are not retried.
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::Relaxed);
    }

    /// Receives every key whose load or refresh just completed, so consumers
    /// can re-read affected snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.shared.refreshed.subscribe()
    }

    async fn load<T, F, Fut>(&self, key: QueryKey, loader: F) -> QuerySnapshot<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, String>> + Send,
    {
        let gate = self.gate(&key);
        let _guard = gate.lock().await;

        // Another caller may have completed the same load while we waited on
        // the gate; in that case its result is ours.
        if let Some(snapshot) = self.fresh_snapshot::<T>(&key) {
            return snapshot;
        }

        self.set_loading(&key, true);
        let result = self.run_with_retry(&loader).await;
        {
            let mut entries = self.shared.entries.lock().unwrap();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::empty);
            entry.loading = false;
            match result {
                Ok(value) => {
                    entry.value = Some(Arc::new(value));
                    entry.error = None;
                    entry.fetched_at = Some(Instant::now());
                    entry.stale = false;
                }
                Err(message) => {
                    // The previous value stays visible next to the error.
                    entry.error = Some(message);
                }
            }
        }
        let _ = self.shared.refreshed.send(key.clone());
        self.peek(&key)
    }

    async fn run_with_retry<T, F, Fut>(&self, loader: &F) -> Result<T, String>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, String>> + Send,
    {
        let mut attempt: u32 = 0;
        loop {
            match loader().await {
                Ok(value) => return Ok(value),
                Err(message) => {
                    let offline = self.shared.offline.load(Ordering::Relaxed);
                    if offline || attempt >= self.shared.config.retry_limit {
                        return Err(message);
                    }
                    let delay = std::cmp::min(
                        self.shared.config.retry_base_delay * 2u32.saturating_pow(attempt),
                        self.shared.config.retry_max_delay,
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn gate(&self, key: &QueryKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self.shared.gates.lock().unwrap();
        gates
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        entry
            .fetched_at
            .map_or(false, |at| at.elapsed() < self.shared.config.stale_after)
    }

    fn fresh_snapshot<T>(&self, key: &QueryKey) -> Option<QuerySnapshot<T>>
    where
        T: Send + Sync + 'static,
    {
        let entries = self.shared.entries.lock().unwrap();
        let entry = entries.get(key)?;
        if entry.value.is_some() && !entry.stale && self.is_fresh(entry) {
            Some(QuerySnapshot {
                data: entry
                    .value
                    .clone()
                    .and_then(|value| value.downcast::<T>().ok()),
                is_loading: entry.loading,
                error: entry.error.clone(),
            })
        } else {
            None
        }
    }

    fn set_loading(&self, key: &QueryKey, loading: bool) {
        let mut entries = self.shared.entries.lock().unwrap();
        entries
            .entry(key.clone())
            .or_insert_with(Entry::empty)
            .loading = loading;
    }
}
