// Domain layer - Core reporting models
pub mod catalog;
pub mod client;
pub mod metrics;
pub mod overview;
pub mod range;
pub mod snapshot;
pub mod visibility;
