//! Stale-time query cache.
//!
//! Responses are cached as JSON under hierarchical keys and served until
//! their stale time passes. Concurrent misses on one key are single-flight:
//! callers queued behind an in-flight fetch reuse its result.

use client_core::error::ApiError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Hierarchical cache key, e.g. `["chat", "messages", <chat_id>, <page>]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

/// Key factory, one constructor per cached query family.
pub mod keys {
    use super::QueryKey;

    pub fn auth_profile() -> QueryKey {
        QueryKey::new(["auth", "profile"])
    }

    pub fn users() -> QueryKey {
        QueryKey::new(["users"])
    }

    pub fn user_list(page: u32, limit: u32) -> QueryKey {
        QueryKey::new([
            "users".to_string(),
            "list".to_string(),
            page.to_string(),
            limit.to_string(),
        ])
    }

    pub fn user_detail(id: &str) -> QueryKey {
        QueryKey::new(["users", "detail", id])
    }

    pub fn chats() -> QueryKey {
        QueryKey::new(["chat"])
    }

    pub fn chat_history(page: u32, limit: u32) -> QueryKey {
        QueryKey::new([
            "chat".to_string(),
            "history".to_string(),
            page.to_string(),
            limit.to_string(),
        ])
    }

    pub fn chat_detail(id: &str) -> QueryKey {
        QueryKey::new(["chat", "detail", id])
    }

    pub fn chat_messages(chat_id: &str, page: u32) -> QueryKey {
        QueryKey::new([
            "chat".to_string(),
            "messages".to_string(),
            chat_id.to_string(),
            page.to_string(),
        ])
    }

    pub fn resource_list(module: &str) -> QueryKey {
        QueryKey::new(["resource", module])
    }
}

/// Stale times for the three cache tiers.
pub mod stale {
    use std::time::Duration;

    pub const SHORT: Duration = Duration::from_secs(60);
    pub const MEDIUM: Duration = Duration::from_secs(5 * 60);
    pub const LONG: Duration = Duration::from_secs(30 * 60);
}

struct Entry {
    value: serde_json::Value,
    fetched_at: Instant,
}

#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<QueryKey, Entry>,
    in_flight: DashMap<QueryKey, Arc<Mutex<()>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value if it is younger than `stale_after`.
    pub fn get_fresh<T: DeserializeOwned>(
        &self,
        key: &QueryKey,
        stale_after: Duration,
    ) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.fetched_at.elapsed() >= stale_after {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub fn insert<T: Serialize>(&self, key: QueryKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.insert(
                    key,
                    Entry {
                        value,
                        fetched_at: Instant::now(),
                    },
                );
            }
            Err(e) => tracing::warn!(error = %e, "Unserializable value not cached"),
        }
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    /// Drop every entry under a key prefix, e.g. all chat queries after a
    /// chat is deleted.
    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Serve from cache or run `fetch`, deduplicating concurrent misses.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        stale_after: Duration,
        fetch: F,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(value) = self.get_fresh(&key, stale_after) {
            return Ok(value);
        }

        let gate = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = gate.lock().await;

        // Re-check: the fetch we queued behind may have filled the entry.
        if let Some(value) = self.get_fresh(&key, stale_after) {
            return Ok(value);
        }

        // Reclaim the gate entry whether the fetch succeeded or not, so a
        // persistently failing key does not pin its gate forever.
        let result = fetch().await;
        if let Ok(value) = &result {
            self.insert(key.clone(), value);
        }

        drop(guard);
        self.in_flight.remove(&key);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_fresh_hit_and_stale_miss() {
        let cache = QueryCache::new();
        let key = keys::chat_detail("c1");

        cache.insert(key.clone(), &42u32);
        assert_eq!(cache.get_fresh::<u32>(&key, stale::MEDIUM), Some(42));
        // Zero stale time means everything is already stale.
        assert_eq!(cache.get_fresh::<u32>(&key, Duration::ZERO), None);
    }

    #[test]
    fn test_invalidate_prefix() {
        let cache = QueryCache::new();
        cache.insert(keys::chat_detail("c1"), &1u32);
        cache.insert(keys::chat_messages("c1", 1), &2u32);
        cache.insert(keys::user_detail("u1"), &3u32);

        cache.invalidate_prefix(&keys::chats());

        assert_eq!(
            cache.get_fresh::<u32>(&keys::chat_detail("c1"), stale::LONG),
            None
        );
        assert_eq!(
            cache.get_fresh::<u32>(&keys::chat_messages("c1", 1), stale::LONG),
            None
        );
        assert_eq!(
            cache.get_fresh::<u32>(&keys::user_detail("u1"), stale::LONG),
            Some(3)
        );
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let cache = Arc::new(QueryCache::new());
        let fetches = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let fetches = fetches.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(keys::auth_profile(), stale::SHORT, || async {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ApiError>("profile".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "profile");
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_not_cached() {
        let cache = QueryCache::new();
        let key = keys::user_detail("u1");

        let result: Result<u32, _> = cache
            .get_or_fetch(key.clone(), stale::SHORT, || async {
                Err(ApiError::NotFound("no such user".into()))
            })
            .await;
        assert!(result.is_err());

        assert_eq!(cache.get_fresh::<u32>(&key, stale::SHORT), None);
    }

    #[tokio::test]
    async fn test_failed_fetch_releases_gate() {
        let cache = QueryCache::new();
        let key = keys::chat_detail("c1");

        let result: Result<u32, _> = cache
            .get_or_fetch(key.clone(), stale::SHORT, || async {
                Err(ApiError::Stream("connection reset".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.in_flight.is_empty());

        // The key is fetchable again once the backend recovers.
        let value = cache
            .get_or_fetch(key.clone(), stale::SHORT, || async { Ok::<_, ApiError>(7u32) })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(cache.get_fresh::<u32>(&key, stale::SHORT), Some(7));
    }
}
