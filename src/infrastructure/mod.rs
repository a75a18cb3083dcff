// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod memory_store;
pub mod mentions_api;
pub mod overview_api;
pub mod seo_api;
pub mod traffic_api;
