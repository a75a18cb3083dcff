// Committed-configuration service
use std::sync::Arc;

use chrono::Utc;

use crate::application::access_service::{Viewer, ViewerMode};
use crate::application::stores::ConfigStore;
use crate::domain::visibility::{DashboardConfig, VisibilityView};
use crate::error::ReportError;

/// Loads and saves the per-client visibility configuration.
pub struct ConfigService {
    store: Arc<dyn ConfigStore>,
}

impl ConfigService {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Committed configuration for a client. A missing record is the
    /// never-saved default, and so is a record that failed to load: the
    /// public page must keep rendering, so load failures degrade to
    /// default-open instead of propagating.
    pub async fn load(&self, client_id: &str) -> DashboardConfig {
        match self.store.load(client_id).await {
            Ok(Some(config)) => config,
            Ok(None) => DashboardConfig::default(),
            Err(e) => {
                tracing::warn!(
                    client = client_id,
                    "config load failed, falling back to default-open: {e:#}"
                );
                DashboardConfig::default()
            }
        }
    }

    /// Resolved visibility for the public page.
    pub async fn public_view(&self, client_id: &str) -> VisibilityView {
        VisibilityView::from_config(&self.load(client_id).await)
    }

    /// Resolved visibility for a request. Operators always see everything;
    /// a public viewer gets the persisted selections.
    pub async fn view_for(&self, viewer: &Viewer) -> VisibilityView {
        match viewer.mode {
            ViewerMode::Operator => VisibilityView::open(),
            ViewerMode::Public => self.public_view(&viewer.client.id).await,
        }
    }

    /// Persist the three selection sets verbatim, empty sets included, and
    /// stamp `updated_at`. Save failures propagate so the caller can keep
    /// its draft and tell the operator.
    pub async fn save(
        &self,
        client_id: &str,
        kpis: Vec<String>,
        sections: Vec<String>,
        charts: Vec<String>,
    ) -> Result<DashboardConfig, ReportError> {
        let config = DashboardConfig {
            selected_kpis: Some(kpis),
            visible_sections: Some(sections),
            selected_charts: Some(charts),
            updated_at: Some(Utc::now()),
        };
        self.store
            .save(client_id, &config)
            .await
            .map_err(ReportError::SaveFailed)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct FailingStore;

    #[async_trait]
    impl ConfigStore for FailingStore {
        async fn load(&self, _client_id: &str) -> anyhow::Result<Option<DashboardConfig>> {
            anyhow::bail!("store is down")
        }

        async fn save(
            &self,
            _client_id: &str,
            _config: &DashboardConfig,
        ) -> anyhow::Result<()> {
            anyhow::bail!("store is down")
        }
    }

    #[tokio::test]
    async fn load_failure_degrades_to_default_open() {
        let service = ConfigService::new(Arc::new(FailingStore));
        let view = service.public_view("acme").await;

        assert!(view.shows_kpi("visitors"));
        assert!(view.shows_section("web_analytics"));
    }

    #[tokio::test]
    async fn save_failure_propagates() {
        let service = ConfigService::new(Arc::new(FailingStore));
        let err = service
            .save("acme", vec![], vec![], vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::SaveFailed(_)));
    }

    #[tokio::test]
    async fn save_stamps_updated_at_and_keeps_empty_sets() {
        use std::sync::Mutex;

        struct RecordingStore(Mutex<Option<DashboardConfig>>);

        #[async_trait]
        impl ConfigStore for RecordingStore {
            async fn load(&self, _client_id: &str) -> anyhow::Result<Option<DashboardConfig>> {
                Ok(self.0.lock().unwrap().clone())
            }

            async fn save(
                &self,
                _client_id: &str,
                config: &DashboardConfig,
            ) -> anyhow::Result<()> {
                *self.0.lock().unwrap() = Some(config.clone());
                Ok(())
            }
        }

        let store = Arc::new(RecordingStore(Mutex::new(None)));
        let service = ConfigService::new(store.clone());

        let saved = service
            .save("acme", vec![], vec!["web_analytics".into()], vec![])
            .await
            .unwrap();

        assert!(saved.updated_at.is_some());
        assert_eq!(saved.selected_kpis, Some(vec![]));

        // An explicit empty KPI set must round-trip as empty, not unset.
        let loaded = service.load("acme").await;
        let view = VisibilityView::from_config(&loaded);
        assert!(!view.shows_kpi("visitors"));
        assert!(view.shows_section("web_analytics"));
    }

    #[tokio::test]
    async fn viewer_mode_gates_the_resolved_view() {
        use crate::domain::client::Client;

        struct LockedDown;

        #[async_trait]
        impl ConfigStore for LockedDown {
            async fn load(&self, _client_id: &str) -> anyhow::Result<Option<DashboardConfig>> {
                Ok(Some(DashboardConfig {
                    selected_kpis: Some(vec!["clicks".into()]),
                    visible_sections: Some(vec!["seo_analytics".into()]),
                    selected_charts: Some(vec![]),
                    updated_at: Some(Utc::now()),
                }))
            }

            async fn save(
                &self,
                _client_id: &str,
                _config: &DashboardConfig,
            ) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let service = ConfigService::new(Arc::new(LockedDown));
        let client = Client {
            id: "acme".to_string(),
            name: "Acme Outdoor".to_string(),
            slug: None,
            traffic_site: None,
            seo_site: None,
            mention_project: None,
        };

        let operator = service
            .view_for(&Viewer {
                mode: ViewerMode::Operator,
                client: client.clone(),
            })
            .await;
        let public = service
            .view_for(&Viewer {
                mode: ViewerMode::Public,
                client,
            })
            .await;

        assert!(operator.shows_kpi("visitors"));
        assert!(public.shows_kpi("clicks"));
        assert!(!public.shows_kpi("visitors"));
    }
}
