//! Testing utilities for the classroom workspace
//!
//! Shared fakes and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use classroom_api::{ApiRequest, ApiResponse, SessionHost, Transport, TransportError};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const REFRESH_PATH: &str = "/auth/refresh";

/// One exchange observed by [`FakeApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub path: String,
    pub retry: bool,
    pub status: u16,
}

/// Cookie-session server double
///
/// Answers 401 until the refresh endpoint succeeds, 200 afterwards. The
/// refresh call can be held open with a gate so tests can pile requests up
/// behind it.
#[derive(Debug)]
pub struct FakeApi {
    authenticated: AtomicBool,
    refresh_status: u16,
    refresh_gate: Option<Arc<Notify>>,
    refresh_calls: AtomicUsize,
    overrides: HashMap<String, u16>,
    exchanges: Mutex<Vec<Exchange>>,
}

impl FakeApi {
    /// Server whose session cookie has expired
    pub fn expired() -> Self {
        Self {
            authenticated: AtomicBool::new(false),
            refresh_status: 200,
            refresh_gate: None,
            refresh_calls: AtomicUsize::new(0),
            overrides: HashMap::new(),
            exchanges: Mutex::new(Vec::new()),
        }
    }

    /// Server with a valid session
    pub fn signed_in() -> Self {
        let api = Self::expired();
        api.authenticated.store(true, Ordering::SeqCst);
        api
    }

    /// Status answered by the refresh endpoint
    pub fn with_refresh_status(mut self, status: u16) -> Self {
        self.refresh_status = status;
        self
    }

    /// Hold the refresh call open until `gate` is notified
    pub fn with_refresh_gate(mut self, gate: Arc<Notify>) -> Self {
        self.refresh_gate = Some(gate);
        self
    }

    /// Always answer `status` for `path`
    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.overrides.insert(path.to_string(), status);
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Every non-refresh exchange in arrival order
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges.lock().clone()
    }

    /// Paths that were answered 200
    pub fn served_paths(&self) -> Vec<String> {
        self.exchanges
            .lock()
            .iter()
            .filter(|e| e.status == 200)
            .map(|e| e.path.clone())
            .collect()
    }

    async fn refresh(&self) -> ApiResponse {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.refresh_gate {
            gate.notified().await;
        }
        if (200..300).contains(&self.refresh_status) {
            self.authenticated.store(true, Ordering::SeqCst);
        }
        ApiResponse::new(self.refresh_status, Vec::new())
    }
}

#[async_trait]
impl Transport for FakeApi {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        if request.path() == REFRESH_PATH {
            return Ok(self.refresh().await);
        }

        let status = self.overrides.get(request.path()).copied().unwrap_or(
            if self.authenticated.load(Ordering::SeqCst) {
                200
            } else {
                401
            },
        );

        self.exchanges.lock().push(Exchange {
            path: request.path().to_string(),
            retry: request.is_retry(),
            status,
        });

        if status == 200 {
            Ok(ApiResponse::json_ok(&json!({ "path": request.path() })))
        } else {
            Ok(ApiResponse::new(status, Vec::new()))
        }
    }
}

/// Session host that records what the client asked of it
#[derive(Debug, Default)]
pub struct RecordingSessionHost {
    cleared: AtomicUsize,
    redirects: Mutex<Vec<String>>,
}

impl RecordingSessionHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cleared(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }
}

impl SessionHost for RecordingSessionHost {
    fn clear_identity(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }

    fn redirect_to_login(&self, route: &str) {
        self.redirects.lock().push(route.to_string());
    }
}

/// Two fillable shapes and one line-art outline
pub const SIMPLE_SVG: &str = include_str!("../fixtures/simple.svg");

/// Coloring page with nested groups, inline styles and non-shape nodes
pub const HOUSE_SVG: &str = include_str!("../fixtures/house.svg");
