use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde_json::json;
use std::time::Duration;
use task_status_monitor::app::PageState;
use task_status_monitor::config::{PollConfig, Variant};
use task_status_monitor::status::{
    HttpStatusSource, PollOutcome, Poller, StateLabel, StatusSource,
};
use task_status_monitor::PollError;

fn session_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static("sessionid=abc"));
    headers
}

#[tokio::test]
async fn test_fetch_decodes_envelope_and_forwards_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/check-status/")
        .match_header("cookie", "sessionid=abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "PROGRESS", "result": {"current": 2, "total": 8}}"#)
        .create_async()
        .await;

    let mut source = HttpStatusSource::new(
        format!("{}/check-status/", server.url()),
        session_headers(),
    );
    let response = source.fetch().await.unwrap();

    assert_eq!(response.status, "PROGRESS");
    assert_eq!(response.result, json!({"current": 2, "total": 8}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_reports_http_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/check-task-status/")
        .with_status(500)
        .with_body("KeyError: 'id'")
        .create_async()
        .await;

    let mut source = HttpStatusSource::new(
        format!("{}/check-task-status/", server.url()),
        HeaderMap::new(),
    );
    let err = source.fetch().await.unwrap_err();

    assert!(err.is_transient());
    match err {
        PollError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "KeyError: 'id'");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_rejects_non_json() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/check-status/")
        .with_status(200)
        .with_body("<html>login</html>")
        .create_async()
        .await;

    let mut source =
        HttpStatusSource::new(format!("{}/check-status/", server.url()), HeaderMap::new());
    let err = source.fetch().await.unwrap_err();

    assert!(matches!(err, PollError::Decode(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_results_poller_stops_after_cap_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/check-status/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "PENDING", "result": null}"#)
        .expect(50)
        .create_async()
        .await;

    let config = PollConfig::for_variant(Variant::Results, &server.url())
        .with_interval(Duration::from_millis(1));
    let source = HttpStatusSource::from_config(&config);
    let mut poller = Poller::new(source, config);
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert_eq!(outcome, PollOutcome::Exhausted { attempts: 50 });
    assert_eq!(page.state_label, Some(StateLabel::TimedOut));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_task_poller_reads_reference_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/check-task-status/")
        .match_header("cookie", "sessionid=abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "SUCCESS", "result": {"error": null, "s3_path": "uploads/data.csv"}}"#)
        .expect(1)
        .create_async()
        .await;

    let config = PollConfig::for_variant(Variant::Task, &server.url())
        .with_headers(session_headers())
        .with_interval(Duration::from_millis(1));
    let source = HttpStatusSource::from_config(&config);
    let mut poller = Poller::new(source, config);
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert_eq!(outcome, PollOutcome::Finished { attempts: 1 });
    assert_eq!(page.reference.as_deref(), Some("uploads/data.csv"));
    assert!(page.continue_enabled);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_is_surfaced() {
    let config = PollConfig::for_variant(Variant::Task, "http://127.0.0.1:1")
        .with_interval(Duration::from_millis(1))
        .with_max_transport_retries(1);
    let source = HttpStatusSource::from_config(&config);
    let mut poller = Poller::new(source, config);
    let mut page = PageState::default();

    let outcome = poller.run(&mut page).await;

    assert!(matches!(
        outcome,
        PollOutcome::RequestFailed { attempts: 2, .. }
    ));
    assert_eq!(page.state_label, Some(StateLabel::RequestFailed));
    assert!(!page.progress_active);
}
