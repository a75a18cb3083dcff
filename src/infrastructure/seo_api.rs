// Search-performance analytics API client
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::application::sources::{SeoProvider, SourcePayload};
use crate::domain::metrics::{
    percent_change, CategoryRow, ChartBody, ChartData, Kpi, KpiValue, Series, SeriesPoint, Source,
};
use crate::domain::range::DateRange;

#[derive(Debug, Clone)]
pub struct SeoApi {
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct PerformanceResponse {
    totals: PerformanceTotals,
    #[serde(default)]
    previous: Option<PerformanceTotals>,
    #[serde(default)]
    daily: Vec<PerformanceDay>,
    #[serde(default)]
    queries: Vec<QueryRow>,
    #[serde(default)]
    keywords: Option<KeywordCounts>,
    #[serde(default)]
    position_buckets: Vec<BucketRow>,
}

#[derive(Debug, Deserialize)]
struct PerformanceTotals {
    clicks: f64,
    impressions: f64,
    ctr: f64,
    avg_position: f64,
}

#[derive(Debug, Deserialize)]
struct PerformanceDay {
    date: NaiveDate,
    clicks: f64,
    impressions: f64,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    query: String,
    clicks: f64,
}

#[derive(Debug, Deserialize)]
struct KeywordCounts {
    ranked: f64,
    top_ten: f64,
    #[serde(default)]
    previous_ranked: Option<f64>,
    #[serde(default)]
    previous_top_ten: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BucketRow {
    bucket: String,
    count: f64,
}

impl PerformanceResponse {
    fn has_data(&self) -> bool {
        !self.daily.is_empty() || self.totals.impressions > 0.0
    }
}

impl SeoApi {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn build_performance_url(&self, site: &str, range: DateRange) -> String {
        let previous = range.previous();
        format!(
            "{}/api/v1/properties/{}/performance?start={}&end={}&prev_start={}&prev_end={}",
            self.base_url,
            urlencoding::encode(site),
            range.start,
            range.end,
            previous.start,
            previous.end
        )
    }

    async fn fetch_performance(
        &self,
        site: &str,
        range: DateRange,
    ) -> Result<Option<PerformanceResponse>> {
        let url = self.build_performance_url(site, range);

        let client = reqwest::Client::new();
        let response = client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to SEO API")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("SEO API request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<PerformanceResponse>()
            .await
            .context("Failed to parse SEO API response")?;

        Ok(Some(data))
    }
}

#[async_trait]
impl SeoProvider for SeoApi {
    async fn fetch(&self, site: &str, range: DateRange) -> Result<Option<SourcePayload>> {
        let Some(performance) = self.fetch_performance(site, range).await? else {
            return Ok(None);
        };
        if !performance.has_data() {
            return Ok(None);
        }
        Ok(Some(build_payload(performance)))
    }
}

fn build_payload(performance: PerformanceResponse) -> SourcePayload {
    let totals = &performance.totals;
    let previous = performance.previous.as_ref();

    let change = |current: f64, pick: fn(&PerformanceTotals) -> f64| {
        previous.and_then(|p| percent_change(current, pick(p)))
    };

    let mut kpis = vec![
        Kpi {
            key: "clicks".to_string(),
            label: "Clicks".to_string(),
            source: Source::Seo,
            value: KpiValue::Number {
                value: totals.clicks,
            },
            change: change(totals.clicks, |t| t.clicks),
        },
        Kpi {
            key: "impressions".to_string(),
            label: "Impressions".to_string(),
            source: Source::Seo,
            value: KpiValue::Number {
                value: totals.impressions,
            },
            change: change(totals.impressions, |t| t.impressions),
        },
        Kpi {
            key: "ctr".to_string(),
            label: "Click-through rate".to_string(),
            source: Source::Seo,
            value: KpiValue::Percent { value: totals.ctr },
            change: change(totals.ctr, |t| t.ctr),
        },
        Kpi {
            key: "avg_position".to_string(),
            label: "Avg. position".to_string(),
            source: Source::Seo,
            value: KpiValue::Number {
                value: totals.avg_position,
            },
            change: change(totals.avg_position, |t| t.avg_position),
        },
    ];

    if let Some(keywords) = &performance.keywords {
        kpis.push(Kpi {
            key: "ranked_keywords".to_string(),
            label: "Ranked keywords".to_string(),
            source: Source::Seo,
            value: KpiValue::Number {
                value: keywords.ranked,
            },
            change: keywords
                .previous_ranked
                .and_then(|p| percent_change(keywords.ranked, p)),
        });
        kpis.push(Kpi {
            key: "top_ten_keywords".to_string(),
            label: "Top-10 keywords".to_string(),
            source: Source::Seo,
            value: KpiValue::Number {
                value: keywords.top_ten,
            },
            change: keywords
                .previous_top_ten
                .and_then(|p| percent_change(keywords.top_ten, p)),
        });
    }

    let mut charts = Vec::new();

    if !performance.daily.is_empty() {
        charts.push(ChartData {
            key: "search_trend".to_string(),
            title: "Search performance over time".to_string(),
            source: Source::Seo,
            body: ChartBody::Lines {
                series: vec![
                    Series {
                        label: "Clicks".to_string(),
                        points: performance
                            .daily
                            .iter()
                            .map(|d| SeriesPoint {
                                date: d.date,
                                value: d.clicks,
                            })
                            .collect(),
                    },
                    Series {
                        label: "Impressions".to_string(),
                        points: performance
                            .daily
                            .iter()
                            .map(|d| SeriesPoint {
                                date: d.date,
                                value: d.impressions,
                            })
                            .collect(),
                    },
                ],
            },
        });
    }
    if !performance.queries.is_empty() {
        charts.push(ChartData {
            key: "top_queries".to_string(),
            title: "Top queries".to_string(),
            source: Source::Seo,
            body: ChartBody::Categories {
                rows: performance
                    .queries
                    .into_iter()
                    .map(|q| CategoryRow {
                        label: q.query,
                        value: q.clicks,
                    })
                    .collect(),
            },
        });
    }
    if !performance.position_buckets.is_empty() {
        charts.push(ChartData {
            key: "position_buckets".to_string(),
            title: "Ranking positions".to_string(),
            source: Source::Seo,
            body: ChartBody::Categories {
                rows: performance
                    .position_buckets
                    .into_iter()
                    .map(|b| CategoryRow {
                        label: b.bucket,
                        value: b.count,
                    })
                    .collect(),
            },
        });
    }

    SourcePayload { kpis, charts }
}
