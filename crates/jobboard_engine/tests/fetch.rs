use std::time::Duration;

use jobboard_core::JobId;
use jobboard_engine::{FailureKind, FetchSettings, PageFetcher, ReqwestPageFetcher};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    board_logging::initialize_for_tests();
}

fn fetcher_for(server: &MockServer) -> ReqwestPageFetcher {
    ReqwestPageFetcher::new(FetchSettings {
        base_url: format!("{}/jobs", server.uri()),
        ..FetchSettings::default()
    })
}

#[tokio::test]
async fn fetches_page_with_paging_query() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"id":11,"title":"Rust Engineer","company":"Ferris"},{"id":"x-12"}]"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let jobs = fetcher_for(&server)
        .fetch_page(2, 10)
        .await
        .expect("fetch ok");

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, JobId::from(11));
    assert_eq!(jobs[0].company(), Some("Ferris"));
    assert_eq!(jobs[1].id, JobId::Text("x-12".to_string()));
}

#[tokio::test]
async fn server_errors_map_to_http_status() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_page(1, 10).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(err.message, "Server error (503)");
}

#[tokio::test]
async fn malformed_payload_is_a_parse_failure() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"jobs":[]}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_page(1, 10).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Parse);
    assert_eq!(err.to_string(), "Unexpected response from server");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    init_logging();
    let server = MockServer::start().await;
    let body = format!("[{}]", vec![r#"{"id":1}"#; 64].join(","));
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let fetcher = ReqwestPageFetcher::new(FetchSettings {
        base_url: format!("{}/jobs", server.uri()),
        max_bytes: 32,
        ..FetchSettings::default()
    });
    let err = fetcher.fetch_page(1, 10).await.unwrap_err();
    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 32, .. }
    ));
}

#[tokio::test]
async fn slow_server_times_out() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("[]", "application/json")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestPageFetcher::new(FetchSettings {
        base_url: format!("{}/jobs", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    });
    let err = fetcher.fetch_page(1, 10).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert_eq!(err.message, "Request timed out");
}

#[tokio::test]
async fn invalid_base_url_fails_before_request() {
    init_logging();
    let fetcher = ReqwestPageFetcher::new(FetchSettings {
        base_url: "not a url".to_string(),
        ..FetchSettings::default()
    });
    let err = fetcher.fetch_page(1, 10).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
