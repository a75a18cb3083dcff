// Narrative overview generation API client
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::application::sources::OverviewProvider;
use crate::domain::client::Client;
use crate::domain::metrics::Kpi;
use crate::domain::overview::Overview;
use crate::domain::range::DateRange;

#[derive(Debug, Clone)]
pub struct OverviewApi {
    base_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    client_name: &'a str,
    start: NaiveDate,
    end: NaiveDate,
    metrics: &'a [Kpi],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    summary: String,
}

impl OverviewApi {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }
}

#[async_trait]
impl OverviewProvider for OverviewApi {
    async fn generate(
        &self,
        client: &Client,
        range: DateRange,
        metrics: &[Kpi],
    ) -> Result<Overview> {
        let request = GenerateRequest {
            client_name: &client.name,
            start: range.start,
            end: range.end,
            metrics,
        };

        let http = reqwest::Client::new();
        let response = http
            .post(format!("{}/api/v1/overviews", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to overview API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Overview API request failed with status {}: {}",
                status,
                body
            );
        }

        let data = response
            .json::<GenerateResponse>()
            .await
            .context("Failed to parse overview API response")?;

        // An empty narrative must not end up cached as a success.
        if data.summary.trim().is_empty() {
            anyhow::bail!("Overview API returned an empty summary");
        }

        Ok(Overview {
            text: data.summary,
            metrics: metrics.to_vec(),
            generated_at: Utc::now(),
        })
    }
}
