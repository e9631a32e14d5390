//! Tracked-operation flow against a scripted status endpoint.

use std::time::{Duration, Instant};

use graylink_client::{GraylinkClient, OperationState, TrackerConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn status_body(state: &str, progress: u8) -> serde_json::Value {
    json!({
        "code": 0, "message": "",
        "data": {"state": state, "progress": progress}
    })
}

/// Mount one status response that matches exactly once. Mocks match in
/// mount order, so consecutive calls walk the script.
async fn script_status(server: &MockServer, state: &str, progress: u8) {
    Mock::given(method("GET"))
        .and(path("/emby/refresh/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(state, progress)))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_tracked_refresh_reaches_success_monotonically() {
    let server = MockServer::start().await;
    script_status(&server, "running", 30).await;
    script_status(&server, "running", 20).await;
    Mock::given(method("GET"))
        .and(path("/emby/refresh/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("succeeded", 100)))
        .mount(&server)
        .await;

    let client = GraylinkClient::with_base_url(server.uri());
    let tracker = client.track_status_endpoint(
        "emby-refresh",
        "/emby/refresh/status",
        TrackerConfig {
            poll_interval: Duration::from_millis(50),
            max_check_failures: 3,
        },
    );

    // Sample progress until the operation settles; the observed series
    // must never decrease even though the server reported 30 then 20.
    let mut observed = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !tracker.is_terminal() && Instant::now() < deadline {
        observed.push(tracker.progress());
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(tracker.state(), OperationState::Succeeded);
    assert_eq!(tracker.progress(), 100);
    assert!(
        observed.windows(2).all(|w| w[0] <= w[1]),
        "progress went backwards: {observed:?}"
    );
    assert!(!tracker.is_polling());
    assert_eq!(client.operations().progress_of("emby-refresh"), Some(100));
}

#[tokio::test]
async fn test_tracked_operation_fails_after_repeated_check_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/symlink/rebuild/status"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 5000, "message": "rebuild worker gone"
        })))
        .mount(&server)
        .await;

    let client = GraylinkClient::with_base_url(server.uri());
    let tracker = client.track_status_endpoint(
        "symlink-rebuild",
        "/symlink/rebuild/status",
        TrackerConfig {
            poll_interval: Duration::from_millis(30),
            max_check_failures: 2,
        },
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while !tracker.is_terminal() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(tracker.state(), OperationState::Failed);
    let err = tracker.last_error().expect("terminal failure keeps its cause");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_cancel_stops_polling_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/monitor/scan/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("running", 10)))
        .mount(&server)
        .await;

    let client = GraylinkClient::with_base_url(server.uri());
    let tracker = client.track_status_endpoint(
        "monitor-scan",
        "/monitor/scan/status",
        TrackerConfig {
            poll_interval: Duration::from_millis(30),
            max_check_failures: 3,
        },
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    tracker.cancel();
    let progress_at_cancel = tracker.progress();
    let polled_at_cancel = tracker.last_polled_at();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(tracker.state(), OperationState::Failed);
    assert_eq!(tracker.progress(), progress_at_cancel);
    assert_eq!(tracker.last_polled_at(), polled_at_cancel);
    assert!(!tracker.is_polling());
}
