//! Authenticated API client
//!
//! Sends requests through a [`Transport`] and recovers from an expired
//! session exactly once per request:
//!
//! 1. A 401 on a fresh request enters the [`RefreshCoordinator`]
//! 2. The first entrant refreshes; later entrants queue
//! 3. On success the leader and everything queued retry once
//! 4. On failure the queue is rejected, the identity cleared and the host
//!    redirected to login

use crate::config::ClientConfig;
use crate::error::{ClientError, RefreshError, TransportError};
use crate::refresh::{RefreshCoordinator, Ticket};
use crate::request::{ApiRequest, ApiResponse};
use crate::session::{CachedSessionHost, IdentityCache, SessionHost};
use crate::transport::{ReqwestTransport, Transport};
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// HTTP client with transparent single-flight session refresh
pub struct AuthenticatedClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionHost>,
    refresh: RefreshCoordinator,
}

impl AuthenticatedClient {
    /// Create client over explicit collaborators
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionHost>,
    ) -> Self {
        Self {
            config,
            transport,
            session,
            refresh: RefreshCoordinator::new(),
        }
    }

    /// Create a reqwest-backed client with a [`CachedSessionHost`]
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built.
    pub fn from_config(
        config: ClientConfig,
        identity: Arc<IdentityCache>,
    ) -> Result<(Self, Arc<CachedSessionHost>), TransportError> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        let host = Arc::new(CachedSessionHost::new(identity));
        let client = Self::new(config, transport, Arc::clone(&host) as Arc<dyn SessionHost>);
        Ok((client, host))
    }

    /// Client configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Refresh coordinator owned by this client
    #[inline]
    #[must_use]
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    /// Send a request, refreshing the session once on 401
    ///
    /// # Errors
    /// - `ClientError::Unauthorized` when the retried request is still
    ///   rejected, or when this request drove a refresh that failed
    /// - `ClientError::RefreshFailed` when the refresh this request was
    ///   queued behind failed
    /// - `ClientError::Status` for every other non-success status
    /// - `ClientError::Transport` when the exchange itself failed
    pub fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        self.dispatch(request).boxed()
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        tracing::debug!(
            request = %request.id(),
            method = %request.method(),
            path = request.path(),
            retry = request.is_retry(),
            "sending request"
        );

        let response = self.transport.execute(&request).await?;

        if !response.is_unauthorized() {
            return classify(&request, response);
        }

        if request.is_retry() {
            tracing::debug!(request = %request.id(), "retried request rejected again");
            return Err(unauthorized(&request));
        }

        match self.refresh.enter(request.id()) {
            Ticket::Lead(lease) => match self.refresh_session().await {
                Ok(()) => {
                    let released = lease.succeed();
                    tracing::info!(request = %request.id(), released, "session refreshed");
                    self.send(request.into_retry()).await
                }
                Err(err) => {
                    let rejected = lease.fail(Arc::new(err));
                    tracing::warn!(request = %request.id(), rejected, "session refresh failed, logging out");
                    self.session.clear_identity();
                    self.session.redirect_to_login(&self.config.login_route);
                    Err(unauthorized(&request))
                }
            },
            Ticket::Wait(outcome) => match outcome.await {
                Ok(Ok(())) => {
                    tracing::debug!(request = %request.id(), "replaying after refresh");
                    self.send(request.into_retry()).await
                }
                Ok(Err(err)) => Err(ClientError::RefreshFailed(err)),
                Err(_) => Err(ClientError::RefreshFailed(Arc::new(RefreshError::Abandoned))),
            },
        }
    }

    /// Call the refresh endpoint directly, bypassing the 401 handling
    async fn refresh_session(&self) -> Result<(), RefreshError> {
        let request = ApiRequest::post(self.config.refresh_path.clone());
        let response = self.transport.execute(&request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(RefreshError::Rejected {
                status: response.status(),
            })
        }
    }

    /// GET and decode a JSON body
    ///
    /// # Errors
    /// See [`send`](Self::send); additionally `ClientError::Decode`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(ApiRequest::get(path)).await?;
        Ok(response.json()?)
    }

    /// POST a JSON body
    ///
    /// # Errors
    /// See [`send`](Self::send); additionally `ClientError::Decode` when the
    /// body does not serialize.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let body = serde_json::to_value(body)?;
        self.send(ApiRequest::post(path).with_json(body)).await
    }

    /// PUT a JSON body
    ///
    /// # Errors
    /// See [`post_json`](Self::post_json).
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let body = serde_json::to_value(body)?;
        self.send(ApiRequest::put(path).with_json(body)).await
    }

    /// DELETE a resource
    ///
    /// # Errors
    /// See [`send`](Self::send).
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.send(ApiRequest::delete(path)).await
    }
}

impl fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("config", &self.config)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

fn classify(request: &ApiRequest, response: ApiResponse) -> Result<ApiResponse, ClientError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            status: response.status(),
            path: request.path().to_string(),
            response,
        })
    }
}

fn unauthorized(request: &ApiRequest) -> ClientError {
    ClientError::Unauthorized {
        path: request.path().to_string(),
    }
}
