//! Classroom API client
//!
//! Cookie-session REST client for the classroom backend. Every domain call
//! (exercises, quizzes, analytics, feedback, users) goes through
//! [`AuthenticatedClient::send`], which recovers from an expired session
//! with a single shared refresh.
//!
//! # Core Concepts
//!
//! - [`AuthenticatedClient`]: request/refresh/retry protocol
//! - [`RefreshCoordinator`]: single-flight gate plus FIFO queue of parked requests
//! - [`Transport`]: the HTTP seam ([`ReqwestTransport`] in production)
//! - [`SessionHost`]: host hooks for forced logout
//!
//! # Example
//!
//! ```rust,ignore
//! use classroom_api::{AuthenticatedClient, ClientConfig, IdentityCache};
//! use std::sync::Arc;
//!
//! let config = ClientConfig::new().with_base_url("https://school.example/api");
//! let (client, host) = AuthenticatedClient::from_config(config, Arc::new(IdentityCache::new()))?;
//!
//! let quizzes: serde_json::Value = client.get("/quizzes").await?;
//! if let Some(route) = host.take_redirect() {
//!     // navigate to `route`
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod error;
pub mod refresh;
pub mod request;
pub mod session;
pub mod transport;

// Re-exports
pub use client::AuthenticatedClient;
pub use config::ClientConfig;
pub use error::{ClientError, RefreshError, TransportError};
pub use refresh::{RefreshCoordinator, RefreshLease, RefreshOutcome, Ticket};
pub use request::{ApiRequest, ApiResponse, Method, RequestId};
pub use session::{CachedSessionHost, Identity, IdentityCache, SessionHost};
pub use transport::{ReqwestTransport, Transport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the API client
    pub use crate::{
        ApiRequest, ApiResponse, AuthenticatedClient, ClientConfig, ClientError, SessionHost,
        Transport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
