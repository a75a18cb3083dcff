// Generated narrative overview
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::metrics::Kpi;
use super::range::DateRange;

/// Cache key for one generated overview. A different client or a shifted
/// range is a different overview.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverviewKey {
    pub client_id: String,
    pub range: DateRange,
}

/// A generated narrative together with the metrics it was derived from.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub text: String,
    pub metrics: Vec<Kpi>,
    pub generated_at: DateTime<Utc>,
}
