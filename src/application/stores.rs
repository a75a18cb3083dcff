// Persistence contracts
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::client::Client;
use crate::domain::visibility::DashboardConfig;

/// Public share link as stored. Enablement and expiry are interpreted by the
/// access service, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    pub slug: String,
    pub client_id: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn enabled_by_default() -> bool {
    true
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self, client_id: &str) -> anyhow::Result<Option<DashboardConfig>>;

    /// Replace the stored configuration as one record. Readers must never
    /// observe a partial update across the three selection sets.
    async fn save(&self, client_id: &str, config: &DashboardConfig) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ShareLinkStore: Send + Sync {
    async fn find(&self, slug: &str) -> anyhow::Result<Option<ShareLink>>;
}

#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Client>>;
    async fn search(&self, query: &str) -> anyhow::Result<Vec<Client>>;
    async fn find(&self, client_id: &str) -> anyhow::Result<Option<Client>>;
}
