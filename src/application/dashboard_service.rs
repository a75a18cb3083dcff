// Dashboard aggregation - concurrent source fan-out with graceful degradation
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::sources::{MentionProvider, SeoProvider, SourcePayload, TrafficProvider};
use crate::domain::catalog;
use crate::domain::client::Client;
use crate::domain::range::DateRange;
use crate::domain::snapshot::{DashboardSnapshot, SourceHealth, SourceStatus};
use crate::error::ReportError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct SnapshotKey {
    client_id: String,
    range: DateRange,
}

/// The last installed snapshot, tagged with the generation that produced it.
/// A completion whose generation is no longer current is discarded instead of
/// installed, so switching client or range can never mix old and new data.
#[derive(Default)]
struct Holder {
    generation: u64,
    key: Option<SnapshotKey>,
    snapshot: Option<DashboardSnapshot>,
}

pub struct DashboardService {
    traffic: Arc<dyn TrafficProvider>,
    seo: Arc<dyn SeoProvider>,
    mentions: Arc<dyn MentionProvider>,
    holder: Mutex<Holder>,
}

impl DashboardService {
    pub fn new(
        traffic: Arc<dyn TrafficProvider>,
        seo: Arc<dyn SeoProvider>,
        mentions: Arc<dyn MentionProvider>,
    ) -> Self {
        Self {
            traffic,
            seo,
            mentions,
            holder: Mutex::new(Holder::default()),
        }
    }

    /// Aggregate one (client, range) pair.
    ///
    /// All three sources are fetched concurrently. A failing or empty source
    /// degrades to a diagnostic flag on the snapshot instead of blocking the
    /// others; the call fails only when every source errored and no snapshot
    /// for this same key is held.
    pub async fn aggregate(
        &self,
        client: &Client,
        range: DateRange,
    ) -> Result<DashboardSnapshot, ReportError> {
        let key = SnapshotKey {
            client_id: client.id.clone(),
            range,
        };
        let generation = self.begin(&key).await;

        let (traffic, seo, mentions) = tokio::join!(
            self.fetch_traffic(client, range),
            self.fetch_seo(client, range),
            self.fetch_mentions(client, range),
        );

        let sources = SourceHealth {
            traffic: traffic.0,
            seo: seo.0,
            mentions: mentions.0,
        };

        if sources.all_failed() {
            return match self.held_for(&key).await {
                Some(snapshot) => {
                    tracing::warn!(client = %client.id, "all sources failed, serving held snapshot");
                    Ok(snapshot)
                }
                None => Err(ReportError::SourcesUnavailable),
            };
        }

        let mut kpis = Vec::new();
        let mut charts = Vec::new();
        for payload in [traffic.1, seo.1, mentions.1].into_iter().flatten() {
            kpis.extend(payload.kpis);
            charts.extend(payload.charts);
        }
        // Merge order is the catalog order, not source completion order.
        kpis.sort_by_key(|k| catalog::kpi_position(&k.key));
        charts.sort_by_key(|c| catalog::chart_position(&c.key));

        let snapshot = DashboardSnapshot {
            client_id: client.id.clone(),
            range,
            kpis,
            charts,
            sources,
        };
        self.install(generation, key, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Start a new aggregation: bump the generation and, when the key
    /// changed, drop the held snapshot before any fetch resolves.
    async fn begin(&self, key: &SnapshotKey) -> u64 {
        let mut holder = self.holder.lock().await;
        holder.generation += 1;
        if holder.key.as_ref() != Some(key) {
            holder.key = Some(key.clone());
            holder.snapshot = None;
        }
        holder.generation
    }

    async fn held_for(&self, key: &SnapshotKey) -> Option<DashboardSnapshot> {
        let holder = self.holder.lock().await;
        if holder.key.as_ref() == Some(key) {
            holder.snapshot.clone()
        } else {
            None
        }
    }

    /// Install a finished snapshot unless a later aggregation superseded it.
    async fn install(&self, generation: u64, key: SnapshotKey, snapshot: DashboardSnapshot) {
        let mut holder = self.holder.lock().await;
        if holder.generation != generation {
            tracing::debug!(client = %key.client_id, "discarding superseded aggregation result");
            return;
        }
        holder.key = Some(key);
        holder.snapshot = Some(snapshot);
    }

    async fn fetch_traffic(
        &self,
        client: &Client,
        range: DateRange,
    ) -> (SourceStatus, Option<SourcePayload>) {
        let Some(site) = client.traffic_site.as_deref() else {
            return (SourceStatus::NoData, None);
        };
        Self::outcome("traffic", self.traffic.fetch(site, range).await)
    }

    async fn fetch_seo(
        &self,
        client: &Client,
        range: DateRange,
    ) -> (SourceStatus, Option<SourcePayload>) {
        let Some(site) = client.seo_site.as_deref() else {
            return (SourceStatus::NoData, None);
        };
        Self::outcome("seo", self.seo.fetch(site, range).await)
    }

    async fn fetch_mentions(
        &self,
        client: &Client,
        range: DateRange,
    ) -> (SourceStatus, Option<SourcePayload>) {
        let Some(project) = client.mention_project.as_deref() else {
            return (SourceStatus::NoData, None);
        };
        Self::outcome("mentions", self.mentions.fetch(project, range).await)
    }

    fn outcome(
        source: &str,
        fetched: anyhow::Result<Option<SourcePayload>>,
    ) -> (SourceStatus, Option<SourcePayload>) {
        match fetched {
            Ok(Some(payload)) => (SourceStatus::Populated, Some(payload)),
            Ok(None) => (SourceStatus::NoData, None),
            Err(e) => {
                tracing::warn!("{source} fetch failed: {e:#}");
                (SourceStatus::Failed, None)
            }
        }
    }
}
