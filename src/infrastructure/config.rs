use serde::Deserialize;

use crate::application::stores::ShareLink;
use crate::domain::client::Client;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub traffic: UpstreamSettings,
    pub seo: UpstreamSettings,
    pub mentions: UpstreamSettings,
    pub overview: UpstreamSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub token: String,
}

/// Client roster and share links, seeded into the in-memory registry at
/// startup.
#[derive(Debug, Deserialize, Clone)]
pub struct ClientsConfig {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub share_links: Vec<ShareLink>,
}

pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/service"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_clients_config() -> anyhow::Result<ClientsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/clients"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clients_and_share_links() {
        let toml = r#"
            [[clients]]
            id = "acme"
            name = "Acme Outdoor"
            slug = "acme-outdoor"
            traffic_site = "acme-outdoor.example"

            [[clients]]
            id = "northwind"
            name = "Northwind Coffee"

            [[share_links]]
            slug = "acme-outdoor"
            client_id = "acme"
        "#;

        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap();
        let parsed: ClientsConfig = settings.try_deserialize().unwrap();

        assert_eq!(parsed.clients.len(), 2);
        assert_eq!(parsed.clients[0].traffic_site.as_deref(), Some("acme-outdoor.example"));
        assert!(parsed.clients[1].traffic_site.is_none());

        // Enablement defaults to true, expiry to none.
        assert_eq!(parsed.share_links.len(), 1);
        assert!(parsed.share_links[0].enabled);
        assert!(parsed.share_links[0].expires_at.is_none());
    }
}
