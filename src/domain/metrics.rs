// KPI and chart models shared by every analytics source
use chrono::NaiveDate;
use serde::Serialize;

/// One independent upstream analytics source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Traffic,
    Seo,
    Mentions,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::Traffic => "web traffic",
            Source::Seo => "search performance",
            Source::Mentions => "AI mentions",
        }
    }
}

/// Metric value together with how it should be rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum KpiValue {
    Number { value: f64 },
    Percent { value: f64 },
    Currency { value: f64 },
    Duration { seconds: f64 },
    /// Mention-specific composite: sentiment split in percent.
    Sentiment { positive: f64, neutral: f64, negative: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub key: String,
    pub label: String,
    pub source: Source,
    pub value: KpiValue,
    /// Percent change against the preceding period, when the source has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBody {
    Lines { series: Vec<Series> },
    Categories { rows: Vec<CategoryRow> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub key: String,
    pub title: String,
    pub source: Source,
    pub body: ChartBody,
}

/// Percent change against a previous-period value. `None` when there is no
/// meaningful baseline.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}
