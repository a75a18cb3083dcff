// Aggregated dashboard snapshot
use serde::Serialize;

use super::metrics::{ChartData, Kpi, Source};
use super::range::DateRange;
use super::visibility::VisibilityView;

/// How one source contributed to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// Data present.
    Populated,
    /// Reachable but nothing for this client and range.
    NoData,
    /// The fetch failed; the rest of the dashboard still renders.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceHealth {
    pub traffic: SourceStatus,
    pub seo: SourceStatus,
    pub mentions: SourceStatus,
}

impl SourceHealth {
    pub fn status(&self, source: Source) -> SourceStatus {
        match source {
            Source::Traffic => self.traffic,
            Source::Seo => self.seo,
            Source::Mentions => self.mentions,
        }
    }

    pub fn all_failed(&self) -> bool {
        self.traffic == SourceStatus::Failed
            && self.seo == SourceStatus::Failed
            && self.mentions == SourceStatus::Failed
    }
}

/// Everything one aggregation pass produced for a (client, range) pair.
/// Snapshots always carry the full metric set; visibility filtering happens
/// at render time via [`DashboardSnapshot::filtered`].
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub client_id: String,
    pub range: DateRange,
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartData>,
    pub sources: SourceHealth,
}

impl DashboardSnapshot {
    /// Empty-state snapshot served when every source failed and nothing is
    /// held for the key.
    pub fn empty(client_id: String, range: DateRange) -> Self {
        Self {
            client_id,
            range,
            kpis: Vec::new(),
            charts: Vec::new(),
            sources: SourceHealth {
                traffic: SourceStatus::Failed,
                seo: SourceStatus::Failed,
                mentions: SourceStatus::Failed,
            },
        }
    }

    /// Drop everything the view hides. Aggregation fetched all sources
    /// regardless; this is the rendering gate.
    pub fn filtered(&self, view: &VisibilityView) -> DashboardSnapshot {
        DashboardSnapshot {
            client_id: self.client_id.clone(),
            range: self.range,
            kpis: self
                .kpis
                .iter()
                .filter(|k| view.shows_kpi(&k.key))
                .cloned()
                .collect(),
            charts: self
                .charts
                .iter()
                .filter(|c| view.shows_chart(&c.key))
                .cloned()
                .collect(),
            sources: self.sources,
        }
    }
}
