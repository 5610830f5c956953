//! Single-flight refresh protocol against a cookie-session server double
//!
//! Run with: cargo test --package classroom-api --test refresh_protocol

use classroom_api::{ApiRequest, AuthenticatedClient, ClientConfig, ClientError, RefreshError};
use classroom_test_utils::{FakeApi, RecordingSessionHost};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Notify;

fn client_for(api: &Arc<FakeApi>, host: &Arc<RecordingSessionHost>) -> AuthenticatedClient {
    AuthenticatedClient::new(ClientConfig::new(), Arc::clone(api) as _, Arc::clone(host) as _)
}

#[tokio::test]
async fn three_concurrent_401s_share_one_refresh_and_replay_in_order() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(FakeApi::expired().with_refresh_gate(Arc::clone(&gate)));
    let host = RecordingSessionHost::new();
    let client = client_for(&api, &host);

    let requests = join_all(
        ["/r1", "/r2", "/r3"]
            .into_iter()
            .map(|path| client.send(ApiRequest::get(path))),
    );
    let release = async {
        tokio::task::yield_now().await;
        assert!(client.coordinator().is_refreshing());
        assert_eq!(client.coordinator().queued(), 2);
        gate.notify_one();
    };

    let (results, ()) = tokio::join!(requests, release);

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(api.refresh_calls(), 1);
    assert_eq!(api.served_paths(), vec!["/r1", "/r2", "/r3"]);

    let exchanges = api.exchanges();
    assert_eq!(exchanges.len(), 6);
    assert!(exchanges[..3].iter().all(|e| e.status == 401 && !e.retry));
    // Every replay carries the retry flag.
    assert!(exchanges[3..].iter().all(|e| e.status == 200 && e.retry));

    assert_eq!(host.cleared(), 0);
    assert!(!client.coordinator().is_refreshing());
}

#[tokio::test]
async fn n_concurrent_requests_issue_exactly_one_refresh() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(FakeApi::expired().with_refresh_gate(Arc::clone(&gate)));
    let host = RecordingSessionHost::new();
    let client = client_for(&api, &host);

    let paths: Vec<String> = (0..16).map(|i| format!("/exercises/{i}")).collect();
    let requests = join_all(paths.iter().map(|p| client.send(ApiRequest::get(p.as_str()))));
    let release = async {
        tokio::task::yield_now().await;
        gate.notify_one();
    };

    let (results, ()) = tokio::join!(requests, release);

    assert_eq!(api.refresh_calls(), 1);
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(api.served_paths(), paths);
}

#[tokio::test]
async fn refresh_failure_rejects_whole_batch_and_logs_out() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(
        FakeApi::expired()
            .with_refresh_status(401)
            .with_refresh_gate(Arc::clone(&gate)),
    );
    let host = RecordingSessionHost::new();
    let client = client_for(&api, &host);

    let requests = join_all(
        ["/quizzes", "/analytics", "/feedback"]
            .into_iter()
            .map(|path| client.send(ApiRequest::get(path))),
    );
    let release = async {
        tokio::task::yield_now().await;
        gate.notify_one();
    };

    let (results, ()) = tokio::join!(requests, release);

    assert_eq!(api.refresh_calls(), 1);

    // The request that drove the refresh receives its original failure.
    assert!(matches!(
        &results[0],
        Err(ClientError::Unauthorized { path }) if path == "/quizzes"
    ));
    // Everything queued behind it receives the refresh error.
    for result in &results[1..] {
        match result {
            Err(ClientError::RefreshFailed(err)) => {
                assert!(matches!(**err, RefreshError::Rejected { status: 401 }));
            }
            other => panic!("expected refresh failure, got {other:?}"),
        }
    }

    assert_eq!(host.cleared(), 1);
    assert_eq!(host.redirects(), vec!["/login"]);
    assert!(api.served_paths().is_empty());
}

#[tokio::test]
async fn retried_request_failing_again_is_not_queued() {
    let api = Arc::new(FakeApi::expired().with_status("/admin/users", 401));
    let host = RecordingSessionHost::new();
    let client = client_for(&api, &host);

    let err = client
        .send(ApiRequest::get("/admin/users"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized { .. }));
    assert_eq!(api.refresh_calls(), 1);

    let exchanges = api.exchanges();
    assert_eq!(exchanges.len(), 2);
    assert!(!exchanges[0].retry);
    assert!(exchanges[1].retry);
    assert_eq!(client.coordinator().queued(), 0);
    assert_eq!(host.cleared(), 0);
}

#[tokio::test]
async fn queued_request_rejected_after_refresh_is_not_retried_again() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(
        FakeApi::expired()
            .with_refresh_gate(Arc::clone(&gate))
            .with_status("/r2", 401),
    );
    let host = RecordingSessionHost::new();
    let client = client_for(&api, &host);

    let requests = join_all(
        ["/r1", "/r2", "/r3"]
            .into_iter()
            .map(|path| client.send(ApiRequest::get(path))),
    );
    let release = async {
        tokio::task::yield_now().await;
        gate.notify_one();
    };

    let (results, ()) = tokio::join!(requests, release);

    assert_eq!(api.refresh_calls(), 1);
    assert!(results[0].is_ok() && results[2].is_ok());
    assert!(matches!(
        &results[1],
        Err(ClientError::Unauthorized { path }) if path == "/r2"
    ));

    let r2: Vec<_> = api
        .exchanges()
        .into_iter()
        .filter(|e| e.path == "/r2")
        .map(|e| (e.retry, e.status))
        .collect();
    assert_eq!(r2, vec![(false, 401), (true, 401)]);

    assert_eq!(host.cleared(), 0);
    assert!(host.redirects().is_empty());
    assert!(!client.coordinator().is_refreshing());
}

#[tokio::test]
async fn signed_in_session_never_refreshes() {
    let api = Arc::new(FakeApi::signed_in().with_status("/quizzes/404", 404));
    let host = RecordingSessionHost::new();
    let client = client_for(&api, &host);

    assert!(client.send(ApiRequest::get("/quizzes")).await.is_ok());
    let err = client
        .send(ApiRequest::get("/quizzes/404"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Status { status: 404, .. }));
    assert_eq!(api.refresh_calls(), 0);
}

#[tokio::test]
async fn separate_clients_refresh_independently() {
    let api_a = Arc::new(FakeApi::expired());
    let api_b = Arc::new(FakeApi::expired());
    let host = RecordingSessionHost::new();
    let a = client_for(&api_a, &host);
    let b = client_for(&api_b, &host);

    let (ra, rb) = tokio::join!(
        a.send(ApiRequest::get("/exercises")),
        b.send(ApiRequest::get("/exercises"))
    );

    assert!(ra.is_ok() && rb.is_ok());
    assert_eq!(api_a.refresh_calls(), 1);
    assert_eq!(api_b.refresh_calls(), 1);
}
