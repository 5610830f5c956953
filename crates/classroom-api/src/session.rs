//! Host-side session hooks
//!
//! After a terminal refresh failure the client clears the cached identity and
//! asks the host to navigate to the login route.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Host collaborator notified on forced logout
#[cfg_attr(test, mockall::automock)]
pub trait SessionHost: Send + Sync {
    /// Drop any locally cached identity record
    fn clear_identity(&self);

    /// Perform a full navigation to the login entry point
    fn redirect_to_login(&self, route: &str);
}

/// The signed-in user's cached record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User id assigned by the API
    pub user_id: String,
    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Role (student, teacher, admin)
    #[serde(default)]
    pub role: Option<String>,
}

/// In-memory identity cache shared between the client and the host
#[derive(Debug, Default)]
pub struct IdentityCache {
    inner: RwLock<Option<Identity>>,
}

impl IdentityCache {
    /// Create an empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the identity returned by a sign-in
    pub fn store(&self, identity: Identity) {
        *self.inner.write() = Some(identity);
    }

    /// Current identity, if signed in
    #[must_use]
    pub fn get(&self) -> Option<Identity> {
        self.inner.read().clone()
    }

    /// Whether an identity is cached
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Forget the cached identity
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

/// Default host: clears an [`IdentityCache`] and records the redirect for
/// the host loop to pick up with [`take_redirect`](Self::take_redirect).
#[derive(Debug, Default)]
pub struct CachedSessionHost {
    identity: Arc<IdentityCache>,
    redirect: Mutex<Option<String>>,
}

impl CachedSessionHost {
    /// Create host over a shared identity cache
    #[must_use]
    pub fn new(identity: Arc<IdentityCache>) -> Self {
        Self {
            identity,
            redirect: Mutex::new(None),
        }
    }

    /// Shared identity cache
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &Arc<IdentityCache> {
        &self.identity
    }

    /// Take the pending login redirect, if one was requested
    pub fn take_redirect(&self) -> Option<String> {
        self.redirect.lock().take()
    }
}

impl SessionHost for CachedSessionHost {
    fn clear_identity(&self) {
        self.identity.clear();
    }

    fn redirect_to_login(&self, route: &str) {
        tracing::warn!(route, "session expired, redirecting to login");
        *self.redirect.lock() = Some(route.to_string());
    }
}
