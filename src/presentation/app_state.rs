// Application state for HTTP handlers
use std::sync::Arc;

use crate::application::access_service::AccessService;
use crate::application::dashboard_service::DashboardService;
use crate::application::overview_service::OverviewService;
use crate::application::stores::ClientDirectory;
use crate::application::visibility_service::ConfigService;

pub struct AppState {
    pub access: AccessService,
    pub dashboards: DashboardService,
    pub overviews: OverviewService,
    pub configs: ConfigService,
    pub directory: Arc<dyn ClientDirectory>,
}
