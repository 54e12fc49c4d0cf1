use std::sync::Arc;

use crate::config::{AppConfig, JobsQuantityConfig, SecurityConfig};
use crate::database::{ProjectStore, UserStore};
use crate::notify::Notifier;

/// Shared handles injected into every account handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub notifier: Arc<dyn Notifier>,
    pub security: Arc<SecurityConfig>,
    pub jobs_quantity_on_page: Arc<JobsQuantityConfig>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        projects: Arc<dyn ProjectStore>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        Self {
            users,
            projects,
            notifier,
            security: Arc::new(config.security.clone()),
            jobs_quantity_on_page: Arc::new(config.jobs_quantity_on_page.clone()),
        }
    }
}
