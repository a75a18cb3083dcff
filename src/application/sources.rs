// Provider contracts for the upstream analytics sources
use async_trait::async_trait;

use crate::domain::client::Client;
use crate::domain::metrics::{ChartData, Kpi};
use crate::domain::overview::Overview;
use crate::domain::range::DateRange;

/// What one source contributes to a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SourcePayload {
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartData>,
}

/// Web-traffic analytics.
///
/// `Ok(None)` means the source answered but has nothing for this site and
/// range; an `Err` is a real fetch failure. The aggregator treats the two
/// very differently, so providers must not blur them.
#[async_trait]
pub trait TrafficProvider: Send + Sync {
    async fn fetch(&self, site: &str, range: DateRange) -> anyhow::Result<Option<SourcePayload>>;
}

/// Search-performance analytics.
#[async_trait]
pub trait SeoProvider: Send + Sync {
    async fn fetch(&self, site: &str, range: DateRange) -> anyhow::Result<Option<SourcePayload>>;
}

/// AI brand-mention analytics.
#[async_trait]
pub trait MentionProvider: Send + Sync {
    async fn fetch(&self, project: &str, range: DateRange)
        -> anyhow::Result<Option<SourcePayload>>;
}

/// Narrative overview generation over the full aggregated metric set.
#[async_trait]
pub trait OverviewProvider: Send + Sync {
    async fn generate(
        &self,
        client: &Client,
        range: DateRange,
        metrics: &[Kpi],
    ) -> anyhow::Result<Overview>;
}
