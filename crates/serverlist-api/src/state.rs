//! Application state

use serverlist_auth::JwtManager;
use serverlist_core::RegistryManager;
use std::sync::Arc;

/// Prometheus recorder handle used to render `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<RegistryManager>,
    pub jwt: Arc<JwtManager>,
    pub auth_enabled: bool,
}

impl AppState {
    pub fn new(manager: Arc<RegistryManager>, jwt: Arc<JwtManager>, auth_enabled: bool) -> Self {
        Self {
            manager,
            jwt,
            auth_enabled,
        }
    }
}
