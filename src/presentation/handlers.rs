// HTTP request handlers
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::catalog;
use crate::domain::client::Client;
use crate::domain::metrics::{ChartData, Kpi, Source};
use crate::domain::overview::Overview;
use crate::domain::range::DateRange;
use crate::domain::snapshot::{DashboardSnapshot, SourceHealth, SourceStatus};
use crate::domain::visibility::{DashboardConfig, VisibilityEditor, VisibilityView};
use crate::error::ReportError;
use crate::presentation::app_state::AppState;

const DEFAULT_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeQuery {
    fn resolve(&self) -> Result<DateRange, ReportError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => DateRange::new(start, end)
                .ok_or_else(|| ReportError::InvalidRange(format!("{start} is after {end}"))),
            (None, None) => Ok(DateRange::last_days(DEFAULT_WINDOW_DAYS)),
            _ => Err(ReportError::InvalidRange(
                "start and end must be given together".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveConfigRequest {
    pub selected_kpis: Vec<String>,
    pub visible_sections: Vec<String>,
    pub selected_charts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClientRef {
    pub id: String,
    pub name: String,
}

/// Per-source health block of the dashboard payload, labelled for display.
#[derive(Debug, Serialize)]
pub struct SourceReport {
    pub source: Source,
    pub label: &'static str,
    pub status: SourceStatus,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub client: ClientRef,
    pub range: DateRange,
    pub sections: Vec<&'static str>,
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartData>,
    pub sources: Vec<SourceReport>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Static section catalog, for building the visibility edit tree.
pub async fn get_catalog() -> impl IntoResponse {
    let sections: Vec<_> = catalog::SECTIONS
        .iter()
        .map(|s| {
            json!({
                "key": s.key,
                "title": s.title,
                "source": s.source,
                "kpis": s.kpis,
                "charts": s.charts,
            })
        })
        .collect();
    Json(sections)
}

/// List clients, optionally filtered by a search query.
pub async fn list_clients(
    Query(query): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ReportError> {
    let clients = match query.q.as_deref() {
        Some(q) => state.directory.search(q).await?,
        None => state.directory.list().await?,
    };
    let summaries: Vec<_> = clients
        .into_iter()
        .map(|c| json!({ "id": c.id, "name": c.name, "slug": c.slug }))
        .collect();
    Ok(Json(summaries))
}

/// Operator dashboard. The resolved view for an operator is fully open, so
/// nothing is filtered out.
pub async fn client_dashboard(
    Path(id): Path<String>,
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ReportError> {
    let range = range.resolve()?;
    let viewer = state.access.operator(&id).await?;

    let view = state.configs.view_for(&viewer).await;
    let snapshot = dashboard_or_empty(&state, &viewer.client, range).await?;
    Ok(Json(dashboard_response(&viewer.client, snapshot, &view)))
}

/// Public dashboard: gated by the share link, filtered by the persisted
/// visibility configuration.
pub async fn share_dashboard(
    Path(slug): Path<String>,
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ReportError> {
    let range = range.resolve()?;
    let viewer = state.access.public(&slug).await?;

    let (snapshot, view) = tokio::join!(
        dashboard_or_empty(&state, &viewer.client, range),
        state.configs.view_for(&viewer),
    );
    Ok(Json(dashboard_response(&viewer.client, snapshot?, &view)))
}

/// Operator overview for a client and range.
pub async fn client_overview(
    Path(id): Path<String>,
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Overview>, ReportError> {
    let range = range.resolve()?;
    let viewer = state.access.operator(&id).await?;
    overview_response(&state, &viewer.client, range).await
}

/// Public overview behind a share link.
pub async fn share_overview(
    Path(slug): Path<String>,
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Overview>, ReportError> {
    let range = range.resolve()?;
    let viewer = state.access.public(&slug).await?;
    overview_response(&state, &viewer.client, range).await
}

/// Committed visibility configuration plus the draft's per-section
/// visibility and toggle states for the edit tree.
pub async fn get_config(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ReportError> {
    state.access.operator(&id).await?;

    let editor = VisibilityEditor::new(state.configs.load(&id).await);
    let draft = editor.draft_view();
    let sections: Vec<_> = catalog::SECTIONS
        .iter()
        .map(|s| {
            json!({
                "key": s.key,
                "visible": draft.shows_section(s.key),
                "kpis": editor.section_kpi_state(s.key),
                "charts": editor.section_chart_state(s.key),
            })
        })
        .collect();

    Ok(Json(json!({
        "config": editor.committed(),
        "sections": sections,
    })))
}

/// Persist a submitted visibility draft. The three sets are normalized
/// through the editor and saved verbatim, empty sets included.
pub async fn put_config(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveConfigRequest>,
) -> Result<Json<DashboardConfig>, ReportError> {
    state.access.operator(&id).await?;

    let mut editor = VisibilityEditor::new(state.configs.load(&id).await);
    editor.replace_draft(
        request.selected_kpis,
        request.visible_sections,
        request.selected_charts,
    );
    let (kpis, sections, charts) = editor.save_payload();

    let saved = state.configs.save(&id, kpis, sections, charts).await?;
    editor.mark_saved(saved);
    Ok(Json(editor.committed().clone()))
}

/// Aggregate, degrading total source failure to an empty-state snapshot so
/// the page itself still renders.
async fn dashboard_or_empty(
    state: &AppState,
    client: &Client,
    range: DateRange,
) -> Result<DashboardSnapshot, ReportError> {
    match state.dashboards.aggregate(client, range).await {
        Ok(snapshot) => Ok(snapshot),
        Err(ReportError::SourcesUnavailable) => {
            tracing::warn!(client = %client.id, "serving empty dashboard, all sources failed");
            Ok(DashboardSnapshot::empty(client.id.clone(), range))
        }
        Err(e) => Err(e),
    }
}

async fn overview_response(
    state: &AppState,
    client: &Client,
    range: DateRange,
) -> Result<Json<Overview>, ReportError> {
    // The narrative is always generated over the full metric set, never the
    // filtered one.
    let snapshot = state.dashboards.aggregate(client, range).await?;
    let overview = state
        .overviews
        .get_or_generate(client, range, &snapshot.kpis)
        .await?;
    Ok(Json(overview))
}

fn dashboard_response(
    client: &Client,
    snapshot: DashboardSnapshot,
    view: &VisibilityView,
) -> DashboardResponse {
    let filtered = snapshot.filtered(view);
    DashboardResponse {
        client: ClientRef {
            id: client.id.clone(),
            name: client.name.clone(),
        },
        range: filtered.range,
        sections: view.visible_sections(),
        kpis: filtered.kpis,
        charts: filtered.charts,
        sources: source_reports(&filtered.sources),
    }
}

fn source_reports(health: &SourceHealth) -> Vec<SourceReport> {
    [Source::Traffic, Source::Seo, Source::Mentions]
        .into_iter()
        .map(|source| SourceReport {
            source,
            label: source.label(),
            status: health.status(source),
        })
        .collect()
}
