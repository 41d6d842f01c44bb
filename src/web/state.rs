use crate::config::AppConfig;
use crate::session::controller::SessionController;
use minijinja::Environment;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub template_env: Environment<'static>,
    pub controller: SessionController,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        template_env: Environment<'static>,
        controller: SessionController,
    ) -> Self {
        Self {
            config,
            template_env,
            controller,
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (chrono::Utc::now() - self.startup_time).num_seconds()
    }
}
