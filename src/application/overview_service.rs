// Narrative overview cache - keyed, single-flight
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tokio::sync::OnceCell;

use crate::application::sources::OverviewProvider;
use crate::domain::client::Client;
use crate::domain::metrics::Kpi;
use crate::domain::overview::{Overview, OverviewKey};
use crate::domain::range::DateRange;
use crate::error::ReportError;

const CACHE_CAPACITY: usize = 64;

/// Caches generated overviews per (client, range) and guarantees at most one
/// generation in flight per key. A failed generation leaves its cell empty so
/// the next request retries; errors are never cached.
pub struct OverviewService {
    provider: Arc<dyn OverviewProvider>,
    cells: Mutex<LruCache<OverviewKey, Arc<OnceCell<Overview>>>>,
}

impl OverviewService {
    pub fn new(provider: Arc<dyn OverviewProvider>) -> Self {
        Self {
            provider,
            cells: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).expect("capacity must be non-zero"),
            )),
        }
    }

    /// Return the cached overview for this key or generate it exactly once,
    /// however many callers arrive while generation is in flight. The
    /// narrative covers the full metric set the caller aggregated,
    /// independent of what is currently visible.
    pub async fn get_or_generate(
        &self,
        client: &Client,
        range: DateRange,
        metrics: &[Kpi],
    ) -> Result<Overview, ReportError> {
        let key = OverviewKey {
            client_id: client.id.clone(),
            range,
        };
        let cell = {
            let mut cells = self.cells.lock().unwrap();
            cells.get_or_insert(key, || Arc::new(OnceCell::new())).clone()
        };

        let overview = cell
            .get_or_try_init(|| async {
                tracing::debug!(client = %client.id, "generating overview");
                self.provider.generate(client, range, metrics).await
            })
            .await
            .map_err(ReportError::OverviewFailed)?;

        Ok(overview.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use tokio::sync::Notify;

    use super::*;

    fn acme() -> Client {
        Client {
            id: "acme".to_string(),
            name: "Acme Outdoor".to_string(),
            slug: None,
            traffic_site: None,
            seo_site: None,
            mention_project: None,
        }
    }

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn overview(text: &str) -> Overview {
        Overview {
            text: text.to_string(),
            metrics: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OverviewProvider for CountingProvider {
        async fn generate(
            &self,
            _client: &Client,
            _range: DateRange,
            _metrics: &[Kpi],
        ) -> anyhow::Result<Overview> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(overview(&format!("generation {call}")))
        }
    }

    struct GatedProvider {
        started: Arc<Notify>,
        release: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl OverviewProvider for GatedProvider {
        async fn generate(
            &self,
            _client: &Client,
            _range: DateRange,
            _metrics: &[Kpi],
        ) -> anyhow::Result<Overview> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            self.release.notified().await;
            Ok(overview("slow narrative"))
        }
    }

    struct FlakyProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OverviewProvider for FlakyProvider {
        async fn generate(
            &self,
            _client: &Client,
            _range: DateRange,
            _metrics: &[Kpi],
        ) -> anyhow::Result<Overview> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("generator hiccup");
            }
            Ok(overview("second try"))
        }
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_generation() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let service = Arc::new(OverviewService::new(Arc::new(GatedProvider {
            started: started.clone(),
            release: release.clone(),
            calls: calls.clone(),
        })));

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.get_or_generate(&acme(), march(), &[]).await })
        };
        // Wait until the first generation is definitely in flight.
        started.notified().await;

        let second = {
            let service = service.clone();
            tokio::spawn(async move { service.get_or_generate(&acme(), march(), &[]).await })
        };

        release.notify_one();
        let a = first.await.unwrap().unwrap();
        let b = second.await.unwrap().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.text, b.text);
    }

    #[tokio::test]
    async fn cached_overview_is_reused_regardless_of_visible_metrics() {
        let service = OverviewService::new(Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        }));
        let metrics = vec![Kpi {
            key: "visitors".to_string(),
            label: "Unique visitors".to_string(),
            source: crate::domain::metrics::Source::Traffic,
            value: crate::domain::metrics::KpiValue::Number { value: 10.0 },
            change: None,
        }];

        let first = service.get_or_generate(&acme(), march(), &metrics).await.unwrap();
        // Different metric slice, same key: still the cached narrative.
        let second = service.get_or_generate(&acme(), march(), &[]).await.unwrap();

        assert_eq!(first.text, "generation 0");
        assert_eq!(second.text, "generation 0");
    }

    #[tokio::test]
    async fn shifting_the_range_by_one_day_generates_fresh() {
        let service = OverviewService::new(Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        }));

        let range = march();
        let shifted = DateRange::new(range.start, range.end + chrono::Duration::days(1)).unwrap();

        let first = service.get_or_generate(&acme(), range, &[]).await.unwrap();
        let second = service.get_or_generate(&acme(), shifted, &[]).await.unwrap();

        assert_eq!(first.text, "generation 0");
        assert_eq!(second.text, "generation 1");
    }

    #[tokio::test]
    async fn another_client_gets_its_own_overview() {
        let service = OverviewService::new(Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        }));
        let mut other = acme();
        other.id = "northwind".to_string();

        let first = service.get_or_generate(&acme(), march(), &[]).await.unwrap();
        let second = service.get_or_generate(&other, march(), &[]).await.unwrap();

        assert_ne!(first.text, second.text);
    }

    #[tokio::test]
    async fn failed_generation_is_not_cached_and_retries() {
        let service = OverviewService::new(Arc::new(FlakyProvider {
            calls: AtomicUsize::new(0),
        }));

        let err = service.get_or_generate(&acme(), march(), &[]).await.unwrap_err();
        assert!(matches!(err, ReportError::OverviewFailed(_)));

        let retry = service.get_or_generate(&acme(), march(), &[]).await.unwrap();
        assert_eq!(retry.text, "second try");
    }
}
