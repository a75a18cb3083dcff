// In-memory registry backing the persistence contracts
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::stores::{ClientDirectory, ConfigStore, ShareLink, ShareLinkStore};
use crate::domain::client::Client;
use crate::domain::visibility::DashboardConfig;

/// Single-process registry seeded from `config/clients.toml`.
///
/// Configuration saves replace the whole record under one write lock, so a
/// reader can never observe a partially-updated selection tuple.
pub struct MemoryRegistry {
    clients: Vec<Client>,
    links: HashMap<String, ShareLink>,
    configs: RwLock<HashMap<String, DashboardConfig>>,
}

impl MemoryRegistry {
    pub fn new(clients: Vec<Client>, links: Vec<ShareLink>) -> Self {
        let links = links.into_iter().map(|l| (l.slug.clone(), l)).collect();
        Self {
            clients,
            links,
            configs: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ClientDirectory for MemoryRegistry {
    async fn list(&self) -> anyhow::Result<Vec<Client>> {
        Ok(self.clients.clone())
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<Client>> {
        Ok(self
            .clients
            .iter()
            .filter(|c| c.matches(query))
            .cloned()
            .collect())
    }

    async fn find(&self, client_id: &str) -> anyhow::Result<Option<Client>> {
        Ok(self.clients.iter().find(|c| c.id == client_id).cloned())
    }
}

#[async_trait]
impl ShareLinkStore for MemoryRegistry {
    async fn find(&self, slug: &str) -> anyhow::Result<Option<ShareLink>> {
        Ok(self.links.get(slug).cloned())
    }
}

#[async_trait]
impl ConfigStore for MemoryRegistry {
    async fn load(&self, client_id: &str) -> anyhow::Result<Option<DashboardConfig>> {
        Ok(self.configs.read().await.get(client_id).cloned())
    }

    async fn save(&self, client_id: &str, config: &DashboardConfig) -> anyhow::Result<()> {
        self.configs
            .write()
            .await
            .insert(client_id.to_string(), config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn client(id: &str, name: &str) -> Client {
        Client {
            id: id.to_string(),
            name: name.to_string(),
            slug: None,
            traffic_site: None,
            seo_site: None,
            mention_project: None,
        }
    }

    fn registry() -> MemoryRegistry {
        MemoryRegistry::new(
            vec![
                client("acme", "Acme Outdoor"),
                client("northwind", "Northwind Coffee"),
            ],
            vec![ShareLink {
                slug: "acme-outdoor".to_string(),
                client_id: "acme".to_string(),
                enabled: true,
                expires_at: None,
            }],
        )
    }

    #[tokio::test]
    async fn search_filters_by_name_and_id() {
        let registry = registry();

        let hits = registry.search("coffee").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "northwind");

        let all = registry.search("").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn looks_up_clients_and_links() {
        let registry = registry();

        let found = ClientDirectory::find(&registry, "acme").await.unwrap();
        assert!(found.is_some());

        let link = ShareLinkStore::find(&registry, "acme-outdoor").await.unwrap();
        assert_eq!(link.unwrap().client_id, "acme");

        assert!(ClientDirectory::find(&registry, "ghost").await.unwrap().is_none());
        assert!(ShareLinkStore::find(&registry, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn config_save_replaces_the_whole_record() {
        let registry = registry();
        assert!(registry.load("acme").await.unwrap().is_none());

        let first = DashboardConfig {
            selected_kpis: Some(vec!["visitors".into()]),
            visible_sections: Some(vec!["web_analytics".into()]),
            selected_charts: Some(vec!["traffic_trend".into()]),
            updated_at: Some(Utc::now()),
        };
        registry.save("acme", &first).await.unwrap();

        let second = DashboardConfig {
            selected_kpis: Some(vec![]),
            visible_sections: Some(vec![]),
            selected_charts: Some(vec![]),
            updated_at: Some(Utc::now()),
        };
        registry.save("acme", &second).await.unwrap();

        let loaded = registry.load("acme").await.unwrap().unwrap();
        assert_eq!(loaded.selected_kpis, Some(vec![]));
        assert_eq!(loaded.visible_sections, Some(vec![]));
    }
}
