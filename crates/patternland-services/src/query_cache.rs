//! Keyed cache of query results with prefix invalidation.
//!
//! Keys are ordered JSON segments such as `["patterns", {"page": 2}]`.
//! Invalidating `["patterns"]` marks every key that starts with that segment as
//! stale; the next [`QueryCache::fetch`] of a stale key runs its loader again.
//! An invalidation that lands while a loader is running also applies to the
//! value that loader returns. There is no eviction and no background refetch.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use patternland_core::AppError;
use serde::Serialize;
use tokio::sync::RwLock;

/// Ordered list of JSON segments identifying a query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: &str) -> Self {
        Self(vec![segment(&root)])
    }

    /// Append a segment (any serializable value).
    pub fn with(mut self, part: impl Serialize) -> Self {
        self.0.push(segment(&part));
        self
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn patterns() -> Self {
        Self::new("patterns")
    }

    pub fn users() -> Self {
        Self::new("users")
    }

    pub fn current_user() -> Self {
        Self::new("currentUser")
    }
}

fn segment(value: &impl Serialize) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(","))
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    stale: bool,
}

#[derive(Default)]
struct Store {
    entries: HashMap<QueryKey, Entry>,
    /// Bumped on every invalidation of the key, including keys still loading.
    generations: HashMap<QueryKey, u64>,
}

impl Store {
    fn bump(&mut self, matches: impl Fn(&QueryKey) -> bool) {
        for (key, generation) in self.generations.iter_mut() {
            if matches(key) {
                *generation += 1;
            }
        }
    }
}

/// Shared query cache; clones share the same storage
#[derive(Clone, Default)]
pub struct QueryCache {
    store: Arc<RwLock<Store>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the fresh cached value for `key`, or run `loader` and cache its
    /// result. Loader errors are returned and not cached. If `key` is
    /// invalidated while the loader runs, the result is returned but cached as
    /// stale; if the cache is cleared meanwhile, it is not cached at all.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, loader: F) -> Result<T, AppError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        {
            let store = self.store.read().await;
            if let Some(entry) = store.entries.get(key) {
                if !entry.stale {
                    if let Some(value) = entry.value.downcast_ref::<T>() {
                        tracing::trace!(key = %key, "Query cache hit");
                        return Ok(value.clone());
                    }
                }
            }
        }

        let started = {
            let mut store = self.store.write().await;
            *store.generations.entry(key.clone()).or_insert(0)
        };

        tracing::debug!(key = %key, "Query cache miss, fetching");
        let value = loader().await?;

        let mut store = self.store.write().await;
        match store.generations.get(key).copied() {
            Some(current) => {
                let stale = current != started;
                if stale {
                    tracing::debug!(key = %key, "Query invalidated while fetching");
                }
                store.entries.insert(
                    key.clone(),
                    Entry {
                        value: Arc::new(value.clone()),
                        stale,
                    },
                );
            }
            None => {
                tracing::debug!(key = %key, "Query cache cleared while fetching");
            }
        }
        Ok(value)
    }

    /// Store a fresh value.
    pub async fn set<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let mut store = self.store.write().await;
        store.generations.entry(key.clone()).or_insert(0);
        store.entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                stale: false,
            },
        );
    }

    /// Cached value for `key`, stale or not, without fetching.
    pub async fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let store = self.store.read().await;
        store
            .entries
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    /// Whether `key` is missing or marked stale.
    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        let store = self.store.read().await;
        store
            .entries
            .get(key)
            .map(|entry| entry.stale)
            .unwrap_or(true)
    }

    /// Mark every key starting with `prefix` as stale. Returns how many were marked.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut store = self.store.write().await;
        store.bump(|key| key.starts_with(prefix));
        let mut marked = 0;
        for (key, entry) in store.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                marked += 1;
            }
        }
        tracing::debug!(prefix = %prefix, marked, "Invalidated queries");
        marked
    }

    /// Mark every cached query as stale.
    pub async fn invalidate_all(&self) -> usize {
        let mut store = self.store.write().await;
        store.bump(|_| true);
        for entry in store.entries.values_mut() {
            entry.stale = true;
        }
        let marked = store.entries.len();
        tracing::debug!(marked, "Invalidated all queries");
        marked
    }

    /// Drop everything, e.g. on logout.
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        store.entries.clear();
        store.generations.clear();
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn key_prefixes() {
        let page_two = QueryKey::patterns().with(json!({"page": 2}));
        assert!(page_two.starts_with(&QueryKey::patterns()));
        assert!(page_two.starts_with(&page_two));
        assert!(!page_two.starts_with(&QueryKey::users()));
        assert!(!QueryKey::patterns().starts_with(&page_two));
        assert_eq!(page_two.to_string(), r#"["patterns",{"page":2}]"#);
    }

    #[tokio::test]
    async fn fetch_caches_until_invalidated() {
        let cache = QueryCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let key = QueryKey::patterns().with(json!({"page": 1}));

        let load = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(vec!["Tee Shirt".to_string()])
        };

        assert_eq!(cache.fetch(&key, load).await.unwrap().len(), 1);
        assert_eq!(cache.fetch(&key, load).await.unwrap().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(cache.invalidate(&QueryKey::patterns()).await, 1);
        assert!(cache.is_stale(&key).await);
        cache.fetch(&key, load).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.is_stale(&key).await);
    }

    #[tokio::test]
    async fn loader_errors_are_not_cached() {
        let cache = QueryCache::new();
        let key = QueryKey::current_user();

        let err = cache
            .fetch(&key, || async {
                Err::<String, _>(AppError::api(401, r#"{"detail":"Not authenticated"}"#))
            })
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn invalidation_during_fetch_keeps_result_stale() {
        let cache = QueryCache::new();
        let key = QueryKey::patterns().with(json!({"page": 1}));
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let fetching = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, AppError>(vec!["Tee Shirt".to_string()])
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        // Nothing is cached yet, but the running load is still affected.
        assert_eq!(cache.invalidate(&QueryKey::patterns()).await, 0);
        release_tx.send(()).unwrap();

        let loaded = fetching.await.unwrap().unwrap();
        assert_eq!(loaded, vec!["Tee Shirt".to_string()]);
        assert!(cache.is_stale(&key).await);
        assert_eq!(cache.get::<Vec<String>>(&key).await, Some(loaded));

        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let refreshed = cache
            .fetch(&key, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, AppError>(vec!["Tee Shirt".to_string(), "Wrap Dress".to_string()])
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(refreshed.len(), 2);
        assert!(!cache.is_stale(&key).await);
    }

    #[tokio::test]
    async fn clear_during_fetch_drops_result() {
        let cache = QueryCache::new();
        let key = QueryKey::current_user();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let fetching = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, AppError>("me".to_string())
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.clear().await;
        release_tx.send(()).unwrap();

        assert_eq!(fetching.await.unwrap().unwrap(), "me");
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn invalidate_only_matching_prefix() {
        let cache = QueryCache::new();
        cache.set(QueryKey::patterns().with(json!({"page": 1})), 1u32).await;
        cache.set(QueryKey::patterns().with(json!({"page": 2})), 2u32).await;
        cache.set(QueryKey::current_user(), "me".to_string()).await;

        assert_eq!(cache.invalidate(&QueryKey::patterns()).await, 2);
        assert!(!cache.is_stale(&QueryKey::current_user()).await);

        // Stale values stay readable.
        assert_eq!(
            cache
                .get::<u32>(&QueryKey::patterns().with(json!({"page": 2})))
                .await,
            Some(2)
        );

        assert_eq!(cache.invalidate_all().await, 3);
        assert!(cache.is_stale(&QueryKey::current_user()).await);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
