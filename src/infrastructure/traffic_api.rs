// Web-traffic analytics API client
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::application::sources::{SourcePayload, TrafficProvider};
use crate::domain::metrics::{
    percent_change, CategoryRow, ChartBody, ChartData, Kpi, KpiValue, Series, SeriesPoint, Source,
};
use crate::domain::range::DateRange;

#[derive(Debug, Clone)]
pub struct TrafficApi {
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    totals: Totals,
    #[serde(default)]
    previous: Option<Totals>,
    #[serde(default)]
    daily: Vec<DailyRow>,
    #[serde(default)]
    channels: Vec<NamedValue>,
    #[serde(default)]
    devices: Vec<NamedValue>,
    #[serde(default)]
    top_pages: Vec<NamedValue>,
}

#[derive(Debug, Deserialize)]
struct Totals {
    visitors: f64,
    sessions: f64,
    pageviews: f64,
    bounce_rate: f64,
    avg_session_duration: f64,
    #[serde(default)]
    new_visitors: f64,
    // Reported only for sites with e-commerce tracking.
    #[serde(default)]
    revenue: f64,
}

#[derive(Debug, Deserialize)]
struct DailyRow {
    date: NaiveDate,
    visitors: f64,
    sessions: f64,
}

#[derive(Debug, Deserialize)]
struct NamedValue {
    name: String,
    value: f64,
}

impl SummaryResponse {
    fn has_data(&self) -> bool {
        !self.daily.is_empty() || self.totals.sessions > 0.0 || self.totals.pageviews > 0.0
    }
}

impl TrafficApi {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn build_summary_url(&self, site: &str, range: DateRange) -> String {
        // The comparison window is derived here so every source is measured
        // against the same previous period.
        let previous = range.previous();
        format!(
            "{}/api/v1/sites/{}/summary?start={}&end={}&prev_start={}&prev_end={}",
            self.base_url,
            urlencoding::encode(site),
            range.start,
            range.end,
            previous.start,
            previous.end
        )
    }

    async fn fetch_summary(&self, site: &str, range: DateRange) -> Result<Option<SummaryResponse>> {
        let url = self.build_summary_url(site, range);

        let client = reqwest::Client::new();
        let response = client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to traffic API")?;

        // An unknown site is no-data for this client, not a failure.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Traffic API request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<SummaryResponse>()
            .await
            .context("Failed to parse traffic API response")?;

        Ok(Some(data))
    }
}

#[async_trait]
impl TrafficProvider for TrafficApi {
    async fn fetch(&self, site: &str, range: DateRange) -> Result<Option<SourcePayload>> {
        let Some(summary) = self.fetch_summary(site, range).await? else {
            return Ok(None);
        };
        if !summary.has_data() {
            return Ok(None);
        }
        Ok(Some(build_payload(summary)))
    }
}

fn build_payload(summary: SummaryResponse) -> SourcePayload {
    let totals = &summary.totals;
    let previous = summary.previous.as_ref();

    let change = |current: f64, pick: fn(&Totals) -> f64| {
        previous.and_then(|p| percent_change(current, pick(p)))
    };

    let pages_per_session = ratio(totals.pageviews, totals.sessions);
    let prev_pages_per_session = previous.map(|p| ratio(p.pageviews, p.sessions));
    let new_visitor_share = share(totals.new_visitors, totals.visitors);
    let prev_new_visitor_share = previous.map(|p| share(p.new_visitors, p.visitors));

    let mut kpis = vec![
        Kpi {
            key: "visitors".to_string(),
            label: "Unique visitors".to_string(),
            source: Source::Traffic,
            value: KpiValue::Number {
                value: totals.visitors,
            },
            change: change(totals.visitors, |t| t.visitors),
        },
        Kpi {
            key: "sessions".to_string(),
            label: "Sessions".to_string(),
            source: Source::Traffic,
            value: KpiValue::Number {
                value: totals.sessions,
            },
            change: change(totals.sessions, |t| t.sessions),
        },
        Kpi {
            key: "pageviews".to_string(),
            label: "Pageviews".to_string(),
            source: Source::Traffic,
            value: KpiValue::Number {
                value: totals.pageviews,
            },
            change: change(totals.pageviews, |t| t.pageviews),
        },
        Kpi {
            key: "bounce_rate".to_string(),
            label: "Bounce rate".to_string(),
            source: Source::Traffic,
            value: KpiValue::Percent {
                value: totals.bounce_rate,
            },
            change: change(totals.bounce_rate, |t| t.bounce_rate),
        },
        Kpi {
            key: "avg_session_duration".to_string(),
            label: "Avg. session duration".to_string(),
            source: Source::Traffic,
            value: KpiValue::Duration {
                seconds: totals.avg_session_duration,
            },
            change: change(totals.avg_session_duration, |t| t.avg_session_duration),
        },
        Kpi {
            key: "pages_per_session".to_string(),
            label: "Pages per session".to_string(),
            source: Source::Traffic,
            value: KpiValue::Number {
                value: pages_per_session,
            },
            change: prev_pages_per_session.and_then(|p| percent_change(pages_per_session, p)),
        },
        Kpi {
            key: "new_visitor_share".to_string(),
            label: "New visitor share".to_string(),
            source: Source::Traffic,
            value: KpiValue::Percent {
                value: new_visitor_share,
            },
            change: prev_new_visitor_share.and_then(|p| percent_change(new_visitor_share, p)),
        },
    ];

    if totals.revenue > 0.0 {
        kpis.push(Kpi {
            key: "revenue".to_string(),
            label: "Revenue".to_string(),
            source: Source::Traffic,
            value: KpiValue::Currency {
                value: totals.revenue,
            },
            change: change(totals.revenue, |t| t.revenue),
        });
    }

    let mut charts = Vec::new();

    if !summary.daily.is_empty() {
        charts.push(ChartData {
            key: "traffic_trend".to_string(),
            title: "Traffic over time".to_string(),
            source: Source::Traffic,
            body: ChartBody::Lines {
                series: vec![
                    Series {
                        label: "Visitors".to_string(),
                        points: summary
                            .daily
                            .iter()
                            .map(|d| SeriesPoint {
                                date: d.date,
                                value: d.visitors,
                            })
                            .collect(),
                    },
                    Series {
                        label: "Sessions".to_string(),
                        points: summary
                            .daily
                            .iter()
                            .map(|d| SeriesPoint {
                                date: d.date,
                                value: d.sessions,
                            })
                            .collect(),
                    },
                ],
            },
        });
    }
    if let Some(chart) = category_chart("channel_breakdown", "Traffic by channel", summary.channels)
    {
        charts.push(chart);
    }
    if let Some(chart) = category_chart("device_breakdown", "Traffic by device", summary.devices) {
        charts.push(chart);
    }
    if let Some(chart) = category_chart("top_pages", "Top pages", summary.top_pages) {
        charts.push(chart);
    }

    SourcePayload { kpis, charts }
}

// Only emit a chart when it has at least one row.
fn category_chart(key: &str, title: &str, rows: Vec<NamedValue>) -> Option<ChartData> {
    if rows.is_empty() {
        return None;
    }
    Some(ChartData {
        key: key.to_string(),
        title: title.to_string(),
        source: Source::Traffic,
        body: ChartBody::Categories {
            rows: rows
                .into_iter()
                .map(|r| CategoryRow {
                    label: r.name,
                    value: r.value,
                })
                .collect(),
        },
    })
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn share(part: f64, whole: f64) -> f64 {
    ratio(part, whole) * 100.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn summary_body() -> serde_json::Value {
        json!({
            "totals": {
                "visitors": 1200.0,
                "sessions": 1500.0,
                "pageviews": 4500.0,
                "bounce_rate": 42.0,
                "avg_session_duration": 95.0,
                "new_visitors": 300.0,
                "revenue": 2400.0
            },
            "previous": {
                "visitors": 1000.0,
                "sessions": 1250.0,
                "pageviews": 4000.0,
                "bounce_rate": 40.0,
                "avg_session_duration": 100.0,
                "new_visitors": 250.0,
                "revenue": 2000.0
            },
            "daily": [
                { "date": "2025-03-01", "visitors": 40.0, "sessions": 50.0 },
                { "date": "2025-03-02", "visitors": 42.0, "sessions": 51.0 }
            ],
            "channels": [
                { "name": "Organic", "value": 800.0 },
                { "name": "Direct", "value": 400.0 }
            ],
            "devices": [
                { "name": "Mobile", "value": 700.0 }
            ],
            "top_pages": []
        })
    }

    #[tokio::test]
    async fn maps_summary_into_kpis_and_charts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sites/acme-outdoor.example/summary"))
            .and(query_param("start", "2025-03-01"))
            .and(query_param("end", "2025-03-31"))
            .and(query_param("prev_start", "2025-01-29"))
            .and(query_param("prev_end", "2025-02-28"))
            .and(header("Authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
            .mount(&server)
            .await;

        let api = TrafficApi::new(server.uri(), "token".to_string());
        let payload = api
            .fetch("acme-outdoor.example", march())
            .await
            .unwrap()
            .unwrap();

        let visitors = payload.kpis.iter().find(|k| k.key == "visitors").unwrap();
        assert_eq!(visitors.value, KpiValue::Number { value: 1200.0 });
        assert_eq!(visitors.change, Some(20.0));

        let pages_per_session = payload
            .kpis
            .iter()
            .find(|k| k.key == "pages_per_session")
            .unwrap();
        assert_eq!(pages_per_session.value, KpiValue::Number { value: 3.0 });

        let revenue = payload.kpis.iter().find(|k| k.key == "revenue").unwrap();
        assert_eq!(revenue.value, KpiValue::Currency { value: 2400.0 });
        assert_eq!(revenue.change, Some(20.0));

        let chart_keys: Vec<&str> = payload.charts.iter().map(|c| c.key.as_str()).collect();
        // top_pages came back empty and is dropped.
        assert_eq!(
            chart_keys,
            vec!["traffic_trend", "channel_breakdown", "device_breakdown"]
        );
    }

    #[tokio::test]
    async fn unknown_site_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = TrafficApi::new(server.uri(), "token".to_string());
        let payload = api.fetch("ghost.example", march()).await.unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn empty_summary_is_no_data() {
        let server = MockServer::start().await;
        let body = json!({
            "totals": {
                "visitors": 0.0,
                "sessions": 0.0,
                "pageviews": 0.0,
                "bounce_rate": 0.0,
                "avg_session_duration": 0.0
            },
            "daily": []
        });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let api = TrafficApi::new(server.uri(), "token".to_string());
        let payload = api.fetch("quiet.example", march()).await.unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn server_error_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let api = TrafficApi::new(server.uri(), "token".to_string());
        assert!(api.fetch("acme-outdoor.example", march()).await.is_err());
    }
}
