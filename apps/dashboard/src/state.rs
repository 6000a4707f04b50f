use std::sync::Arc;

use crate::config::Config;
use crate::dashboard::DashboardController;
use crate::jobs::JobBoard;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DashboardController>,
    pub jobs: Arc<JobBoard>,
    pub config: Config,
}
