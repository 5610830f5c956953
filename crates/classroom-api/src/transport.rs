//! HTTP transport seam
//!
//! The client never talks to reqwest directly; it goes through [`Transport`]
//! so tests can script server behavior.

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::request::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

/// Performs a single HTTP exchange with credentials attached
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request` and return whatever status the server answered with
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport with a cookie store
///
/// Session credentials are cookies: the refresh endpoint rotates them and
/// the store picks the new ones up for every later request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport from configuration
    ///
    /// # Errors
    /// Fails when the TLS backend cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self::with_client(http, config.base_url.clone()))
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request.path());
        let mut builder = self.http.request(request.method().into(), &url);
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?.to_vec();

        tracing::trace!(%url, status, bytes = body.len(), "transport exchange");

        Ok(ApiResponse::new(status, body).with_content_type(content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_path() {
        let transport = ReqwestTransport::with_client(
            reqwest::Client::new(),
            "https://school.example/api/",
        );
        assert_eq!(
            transport.url_for("/auth/refresh"),
            "https://school.example/api/auth/refresh"
        );
        assert_eq!(
            transport.url_for("quizzes"),
            "https://school.example/api/quizzes"
        );
    }

    #[test]
    fn builds_from_config() {
        let config = ClientConfig::new().with_base_url("https://school.example/api");
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(transport.base_url, "https://school.example/api");
    }
}
