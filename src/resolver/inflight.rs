//! In-flight registry request coalescing.
//!
//! If two logical callers ask for the same package's dependency list while a
//! request is already running, the second caller awaits the first's shared
//! future instead of issuing a duplicate network call.

use crate::registry::{DeclaredDependency, RegistryLookup};
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

type SharedLookup = Shared<BoxFuture<'static, Option<Vec<DeclaredDependency>>>>;

/// Registry front-end that de-duplicates identical concurrent requests and
/// caps every call with a timeout that resolves to "no data".
pub struct CoalescingFetcher {
    registry: Arc<dyn RegistryLookup>,
    timeout: Duration,
    inflight: DashMap<String, SharedLookup>,
}

impl CoalescingFetcher {
    /// Wrap a registry collaborator.
    pub fn new(registry: Arc<dyn RegistryLookup>, timeout: Duration) -> Self {
        Self {
            registry,
            timeout,
            inflight: DashMap::new(),
        }
    }

    /// Declared dependencies of one package version, coalesced.
    pub async fn dependencies_of(
        &self,
        name: &str,
        version: &str,
        ecosystem: &str,
    ) -> Option<Vec<DeclaredDependency>> {
        let request_key = format!("{ecosystem}:{name}@{version}");

        let shared = {
            let registry = Arc::clone(&self.registry);
            let timeout = self.timeout;
            let (name, version, ecosystem) =
                (name.to_string(), version.to_string(), ecosystem.to_string());
            self.inflight
                .entry(request_key.clone())
                .or_insert_with(|| {
                    async move {
                        match tokio::time::timeout(
                            timeout,
                            registry.dependencies_of(&name, &version, &ecosystem),
                        )
                        .await
                        {
                            Ok(result) => result,
                            Err(_) => {
                                tracing::warn!(%name, %ecosystem, "registry query timed out");
                                None
                            }
                        }
                    }
                    .boxed()
                    .shared()
                })
                .clone()
        };

        let result = shared.await;
        self.inflight.remove(&request_key);
        result
    }

    /// Number of requests currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Registry that counts calls and answers slowly.
    struct CountingRegistry {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl RegistryLookup for CountingRegistry {
        async fn latest_version(&self, _name: &str, _ecosystem: &str) -> Option<String> {
            None
        }

        async fn dependencies_of(
            &self,
            _name: &str,
            _version: &str,
            _ecosystem: &str,
        ) -> Option<Vec<DeclaredDependency>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Some(vec![DeclaredDependency::new("child", None)])
        }
    }

    #[tokio::test]
    async fn test_concurrent_identical_requests_issue_one_call() {
        let registry = Arc::new(CountingRegistry {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(50),
        });
        let fetcher = CoalescingFetcher::new(registry.clone(), Duration::from_secs(1));

        let (a, b) = tokio::join!(
            fetcher.dependencies_of("lodash", "4.17.21", "npm"),
            fetcher.dependencies_of("lodash", "4.17.21", "npm"),
        );

        assert_eq!(a, b);
        assert!(a.is_some());
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_distinct_requests_are_not_coalesced() {
        let registry = Arc::new(CountingRegistry {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(10),
        });
        let fetcher = CoalescingFetcher::new(registry.clone(), Duration::from_secs(1));

        tokio::join!(
            fetcher.dependencies_of("lodash", "4.17.21", "npm"),
            fetcher.dependencies_of("lodash", "3.10.1", "npm"),
        );

        assert_eq!(registry.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_resolves_to_none() {
        let registry = Arc::new(CountingRegistry {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(5),
        });
        let fetcher = CoalescingFetcher::new(registry, Duration::from_millis(20));

        let result = fetcher.dependencies_of("slow", "1.0.0", "npm").await;
        assert!(result.is_none());
    }
}
