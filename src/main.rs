// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::access_service::AccessService;
use crate::application::dashboard_service::DashboardService;
use crate::application::overview_service::OverviewService;
use crate::application::visibility_service::ConfigService;
use crate::infrastructure::config::{load_clients_config, load_service_config};
use crate::infrastructure::memory_store::MemoryRegistry;
use crate::infrastructure::mentions_api::MentionsApi;
use crate::infrastructure::overview_api::OverviewApi;
use crate::infrastructure::seo_api::SeoApi;
use crate::infrastructure::traffic_api::TrafficApi;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    client_dashboard, client_overview, get_catalog, get_config, health_check, list_clients,
    put_config, share_dashboard, share_overview,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brand_reporting=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let service_config = load_service_config()?;
    let clients_config = load_clients_config()?;

    // Create registry and upstream clients (infrastructure layer)
    let registry = Arc::new(MemoryRegistry::new(
        clients_config.clients,
        clients_config.share_links,
    ));
    let traffic = Arc::new(TrafficApi::new(
        service_config.traffic.base_url,
        service_config.traffic.token,
    ));
    let seo = Arc::new(SeoApi::new(
        service_config.seo.base_url,
        service_config.seo.token,
    ));
    let mentions = Arc::new(MentionsApi::new(
        service_config.mentions.base_url,
        service_config.mentions.token,
    ));
    let overview = Arc::new(OverviewApi::new(
        service_config.overview.base_url,
        service_config.overview.token,
    ));

    // Create services (application layer)
    let state = Arc::new(AppState {
        access: AccessService::new(registry.clone(), registry.clone()),
        dashboards: DashboardService::new(traffic, seo, mentions),
        overviews: OverviewService::new(overview),
        configs: ConfigService::new(registry.clone()),
        directory: registry,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/catalog", get(get_catalog))
        .route("/clients", get(list_clients))
        .route("/clients/:id/dashboard", get(client_dashboard))
        .route("/clients/:id/overview", get(client_overview))
        .route("/clients/:id/config", get(get_config).put(put_config))
        .route("/share/:slug/dashboard", get(share_dashboard))
        .route("/share/:slug/overview", get(share_overview))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = service_config.server.listen_addr.parse()?;
    tracing::info!("Starting brand-reporting service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
