//! Single-flight memoized fetch primitive.
//!
//! `RequestCache` deduplicates concurrent fetches of the same resource:
//! while a fetch is in flight every caller awaits the same shared future,
//! and once a value has been stored readers get it without refetching until
//! an explicit reset.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

use truthlens_core::error::Result;

type InflightFuture<T> = Shared<BoxFuture<'static, Result<T>>>;

struct CacheState<T> {
    value: T,
    initialized: bool,
    /// Bumped on every reset so a fetch started before the reset cannot
    /// repopulate the cache with stale data when it finally resolves.
    generation: u64,
    inflight: Option<InflightFuture<T>>,
}

/// A cache holding one value, refreshed by at most one in-flight fetch at
/// a time.
///
/// Cloning is cheap and shares the underlying state, so one cache instance
/// can back every consumer of a resource.
pub struct RequestCache<T: Clone> {
    state: Arc<Mutex<CacheState<T>>>,
}

impl<T: Clone> Clone for RequestCache<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> RequestCache<T> {
    /// Creates an uninitialized cache holding `initial` as its placeholder
    /// value.
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                value: initial,
                initialized: false,
                generation: 0,
                inflight: None,
            })),
        }
    }

    /// Returns the cached value, fetching it if necessary.
    ///
    /// - Initialized: returns a clone of the stored value without invoking
    ///   `fetch`.
    /// - Fetch in flight: awaits the same future as every other caller;
    ///   exactly one underlying call happens.
    /// - Otherwise: starts `fetch()`. On success the value is stored and
    ///   the cache becomes initialized; on failure the in-flight slot is
    ///   cleared, the error propagates to all waiters, and the cache stays
    ///   uninitialized so a later call retries.
    ///
    /// The cache never retries on its own.
    pub async fn get<F, Fut>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let shared = {
            let mut state = self.state.lock().await;
            if state.initialized {
                return Ok(state.value.clone());
            }
            if let Some(inflight) = &state.inflight {
                inflight.clone()
            } else {
                let generation = state.generation;
                let slot = Arc::clone(&self.state);
                let future = fetch();
                let inflight: InflightFuture<T> = async move {
                    let result = future.await;
                    let mut state = slot.lock().await;
                    if state.generation == generation {
                        if let Ok(value) = &result {
                            state.value = value.clone();
                            state.initialized = true;
                        }
                        state.inflight = None;
                    }
                    result
                }
                .boxed()
                .shared();
                state.inflight = Some(inflight.clone());
                inflight
            }
        };
        shared.await
    }

    /// Clears the cache back to `initial`.
    ///
    /// Safe to call while a fetch is in flight: the generation bump makes
    /// the eventual resolution a no-op for the cache (its waiters still
    /// receive their result).
    pub async fn reset(&self, initial: T) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.value = initial;
        state.initialized = false;
        state.inflight = None;
    }

    /// Stores a value directly and marks the cache initialized, discarding
    /// any in-flight fetch. Used after a mutation whose response already
    /// carries the fresh value.
    pub async fn prime(&self, value: T) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.value = value;
        state.initialized = true;
        state.inflight = None;
    }

    /// Snapshot of the current value, initialized or not.
    pub async fn peek(&self) -> T {
        self.state.lock().await.value.clone()
    }

    /// Whether a fetched value is stored.
    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use truthlens_core::TruthlensError;

    fn counting_fetch(
        calls: Arc<AtomicUsize>,
        value: i32,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<i32>> {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(value)
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_gets_trigger_one_fetch() {
        let cache = RequestCache::new(0);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache.get(counting_fetch(calls, 7)).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialized_value_served_without_fetch() {
        let cache = RequestCache::new(0);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get(counting_fetch(Arc::clone(&calls), 7)).await.unwrap();
        let value = cache.get(counting_fetch(Arc::clone(&calls), 99)).await.unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_initialized().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_forces_refetch() {
        let cache = RequestCache::new(0);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get(counting_fetch(Arc::clone(&calls), 7)).await.unwrap();
        cache.reset(0).await;
        assert!(!cache.is_initialized().await);
        assert_eq!(cache.peek().await, 0);

        let value = cache.get(counting_fetch(Arc::clone(&calls), 8)).await.unwrap();
        assert_eq!(value, 8);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_leaves_cache_retriable() {
        let cache: RequestCache<i32> = RequestCache::new(0);
        let calls = Arc::new(AtomicUsize::new(0));

        let failing_calls = Arc::clone(&calls);
        let err = cache
            .get(move || {
                failing_calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TruthlensError::network("connection refused")) }.boxed()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TruthlensError::Network(_)));
        assert!(!cache.is_initialized().await);

        let value = cache.get(counting_fetch(Arc::clone(&calls), 5)).await.unwrap();
        assert_eq!(value, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_flight_is_not_resurrected() {
        let cache = RequestCache::new(0);
        let gate = Arc::new(tokio::sync::Notify::new());

        let fetch_gate = Arc::clone(&gate);
        let pending = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get(move || {
                        async move {
                            fetch_gate.notified().await;
                            Ok(42)
                        }
                        .boxed()
                    })
                    .await
            })
        };

        tokio::task::yield_now().await;
        cache.reset(-1).await;
        gate.notify_waiters();

        // The waiter still receives the fetched value...
        assert_eq!(pending.await.unwrap().unwrap(), 42);
        // ...but the stale resolution does not repopulate the reset cache.
        assert!(!cache.is_initialized().await);
        assert_eq!(cache.peek().await, -1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prime_discards_inflight_fetch() {
        let cache = RequestCache::new(0);
        cache.prime(3).await;
        assert!(cache.is_initialized().await);

        let calls = Arc::new(AtomicUsize::new(0));
        let value = cache.get(counting_fetch(Arc::clone(&calls), 9)).await.unwrap();
        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
