// Application layer - Services and collaborator contracts
pub mod access_service;
pub mod dashboard_service;
pub mod overview_service;
pub mod sources;
pub mod stores;
pub mod visibility_service;
