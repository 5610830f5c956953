//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`AuthenticatedClient`](crate::AuthenticatedClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash
    pub base_url: String,
    /// Path of the parameterless session refresh endpoint
    pub refresh_path: String,
    /// Route the host navigates to after a terminal session failure
    pub login_route: String,
    /// Per-request timeout in seconds (also bounds the refresh call)
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With refresh endpoint path
    #[inline]
    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// With login route
    #[inline]
    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            login_route: "/login".to_string(),
            timeout_secs: 15,
            user_agent: concat!("classroom/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
