// AI brand-mention analytics API client
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::application::sources::{MentionProvider, SourcePayload};
use crate::domain::metrics::{
    percent_change, CategoryRow, ChartBody, ChartData, Kpi, KpiValue, Series, SeriesPoint, Source,
};
use crate::domain::range::DateRange;

#[derive(Debug, Clone)]
pub struct MentionsApi {
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct MentionSummaryResponse {
    totals: MentionTotals,
    #[serde(default)]
    previous: Option<MentionTotals>,
    #[serde(default)]
    daily: Vec<MentionDay>,
    #[serde(default)]
    assistants: Vec<AssistantRow>,
}

#[derive(Debug, Deserialize)]
struct MentionTotals {
    mentions: f64,
    share_of_voice: f64,
    positive: f64,
    neutral: f64,
    negative: f64,
}

#[derive(Debug, Deserialize)]
struct MentionDay {
    date: NaiveDate,
    mentions: f64,
}

#[derive(Debug, Deserialize)]
struct AssistantRow {
    name: String,
    mentions: f64,
}

impl MentionSummaryResponse {
    fn has_data(&self) -> bool {
        !self.daily.is_empty() || self.totals.mentions > 0.0
    }
}

impl MentionsApi {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn build_summary_url(&self, project: &str, range: DateRange) -> String {
        let previous = range.previous();
        format!(
            "{}/api/v1/projects/{}/mentions/summary?start={}&end={}&prev_start={}&prev_end={}",
            self.base_url,
            urlencoding::encode(project),
            range.start,
            range.end,
            previous.start,
            previous.end
        )
    }

    async fn fetch_summary(
        &self,
        project: &str,
        range: DateRange,
    ) -> Result<Option<MentionSummaryResponse>> {
        let url = self.build_summary_url(project, range);

        let client = reqwest::Client::new();
        let response = client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to mentions API")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Mentions API request failed with status {}: {}",
                status,
                body
            );
        }

        let data = response
            .json::<MentionSummaryResponse>()
            .await
            .context("Failed to parse mentions API response")?;

        Ok(Some(data))
    }
}

#[async_trait]
impl MentionProvider for MentionsApi {
    async fn fetch(&self, project: &str, range: DateRange) -> Result<Option<SourcePayload>> {
        let Some(summary) = self.fetch_summary(project, range).await? else {
            return Ok(None);
        };
        if !summary.has_data() {
            return Ok(None);
        }
        Ok(Some(build_payload(summary)))
    }
}

fn build_payload(summary: MentionSummaryResponse) -> SourcePayload {
    let totals = &summary.totals;
    let previous = summary.previous.as_ref();

    let kpis = vec![
        Kpi {
            key: "mentions".to_string(),
            label: "Brand mentions".to_string(),
            source: Source::Mentions,
            value: KpiValue::Number {
                value: totals.mentions,
            },
            change: previous.and_then(|p| percent_change(totals.mentions, p.mentions)),
        },
        Kpi {
            key: "mention_share_of_voice".to_string(),
            label: "Share of voice".to_string(),
            source: Source::Mentions,
            value: KpiValue::Percent {
                value: totals.share_of_voice,
            },
            change: previous.and_then(|p| percent_change(totals.share_of_voice, p.share_of_voice)),
        },
        Kpi {
            key: "mention_sentiment".to_string(),
            label: "Sentiment".to_string(),
            source: Source::Mentions,
            value: KpiValue::Sentiment {
                positive: totals.positive,
                neutral: totals.neutral,
                negative: totals.negative,
            },
            change: None,
        },
    ];

    let mut charts = Vec::new();

    if !summary.daily.is_empty() {
        charts.push(ChartData {
            key: "mention_trend".to_string(),
            title: "Mentions over time".to_string(),
            source: Source::Mentions,
            body: ChartBody::Lines {
                series: vec![Series {
                    label: "Mentions".to_string(),
                    points: summary
                        .daily
                        .iter()
                        .map(|d| SeriesPoint {
                            date: d.date,
                            value: d.mentions,
                        })
                        .collect(),
                }],
            },
        });
    }
    if !summary.assistants.is_empty() {
        charts.push(ChartData {
            key: "assistant_breakdown".to_string(),
            title: "Mentions by assistant".to_string(),
            source: Source::Mentions,
            body: ChartBody::Categories {
                rows: summary
                    .assistants
                    .into_iter()
                    .map(|a| CategoryRow {
                        label: a.name,
                        value: a.mentions,
                    })
                    .collect(),
            },
        });
    }

    SourcePayload { kpis, charts }
}
