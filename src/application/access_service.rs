// Mode gate - decides who is viewing and which client they see
use std::sync::Arc;

use chrono::Utc;

use crate::application::stores::{ClientDirectory, ShareLinkStore};
use crate::domain::client::Client;
use crate::error::ReportError;

/// How the dashboard was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerMode {
    /// Operator session: full data, writable visibility configuration.
    Operator,
    /// Public share link: read-only, filtered by the persisted selections.
    Public,
}

/// A resolved request context.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub mode: ViewerMode,
    pub client: Client,
}

/// Resolves operator ids and public slugs into viewers. The gate holds no
/// provider references, so a rejected slug can never trigger a source fetch.
pub struct AccessService {
    clients: Arc<dyn ClientDirectory>,
    links: Arc<dyn ShareLinkStore>,
}

impl AccessService {
    pub fn new(clients: Arc<dyn ClientDirectory>, links: Arc<dyn ShareLinkStore>) -> Self {
        Self { clients, links }
    }

    /// Resolve an operator request by internal client id.
    pub async fn operator(&self, client_id: &str) -> Result<Viewer, ReportError> {
        let client = self
            .clients
            .find(client_id)
            .await?
            .ok_or_else(|| ReportError::UnknownClient(client_id.to_string()))?;
        Ok(Viewer {
            mode: ViewerMode::Operator,
            client,
        })
    }

    /// Resolve a public slug. Not-found, disabled, and expired are three
    /// distinct terminal outcomes; callers surface them with different
    /// status codes and none of them reaches a source.
    pub async fn public(&self, slug: &str) -> Result<Viewer, ReportError> {
        let link = self
            .links
            .find(slug)
            .await?
            .ok_or(ReportError::LinkNotFound)?;

        if !link.enabled {
            return Err(ReportError::LinkDisabled);
        }
        if let Some(expires_at) = link.expires_at {
            if expires_at <= Utc::now() {
                return Err(ReportError::LinkExpired);
            }
        }

        // A link pointing at a client that no longer exists reads as absent.
        let client = self
            .clients
            .find(&link.client_id)
            .await?
            .ok_or(ReportError::LinkNotFound)?;
        Ok(Viewer {
            mode: ViewerMode::Public,
            client,
        })
    }
}
