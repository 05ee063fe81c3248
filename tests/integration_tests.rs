// Integration tests: HTTP endpoints

mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{FakeCgroups, FakeInspector, FakeSource, W_OUTPUT, collector, unavailable};
use logged_users_exporter::error::Dataset;
use logged_users_exporter::routes;
use std::sync::Arc;
use tower::ServiceExt;

const IO_OUTPUT: &str = "42 be/4 bob 12.50 K/s 3.00 K/s ?unavailable? sleep 10";
const PS_OUTPUT: &str = "\
root        2  0.0      0     0 [kthreadd]
bob        42  1.5  20000  4000 sleep 10";

fn test_app(source: FakeSource) -> axum::Router {
    let cgroups = FakeCgroups::default().with(42, "0::/docker/abc123\n");
    let inspector = FakeInspector::default().with("abc123", "/myapp");
    routes::app(Arc::new(collector(source, cgroups, inspector)))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_app(FakeSource::new(W_OUTPUT, IO_OUTPUT, PS_OUTPUT));
    let (status, content_type, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(body.contains("# TYPE logged_in_users gauge"));
    assert!(body.contains("logged_in_users{hostname=\"web1\",os=\"linux\",os_version=\"6.8.0\"} 1"));
    assert!(body.contains("user=\"alice\""));
    assert!(body.contains("what=\"vim \\\"notes.txt\\\"\""));
    assert!(body.contains(
        "process_read_in_KB{hostname=\"web1\",os=\"linux\",os_version=\"6.8.0\",process_id=\"42\",username=\"bob\",command=\"sleep 10\",container_name=\"myapp\",container_id=\"abc123\"} 12.5"
    ));
    assert!(body.contains("container_id=\"abc123\"} 3.0"));
    assert!(body.contains("process_cpu_percent{"));
    assert!(!body.contains("kthreadd"));
}

#[tokio::test]
async fn test_metrics_reports_failed_io_dataset() {
    let mut source = FakeSource::new(W_OUTPUT, "", PS_OUTPUT);
    source.process_io = Err(unavailable(Dataset::ProcessIo));
    let (status, _, body) = get(test_app(source), "/metrics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error fetching process\n");
}

#[tokio::test]
async fn test_metrics_reports_failed_sessions_dataset() {
    let mut source = FakeSource::new("", IO_OUTPUT, PS_OUTPUT);
    source.sessions = Err(unavailable(Dataset::Sessions));
    let (status, _, body) = get(test_app(source), "/metrics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error fetching logged-in users\n");
}

#[tokio::test]
async fn test_metrics_with_no_processes() {
    let app = test_app(FakeSource::new(W_OUTPUT, "", ""));
    let (status, _, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# HELP logged_in_user"));
    assert!(!body.contains("process_read_in_KB"));
    assert!(!body.contains("process_rss"));
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = test_app(FakeSource::new(W_OUTPUT, "", ""));
    let (status, _, body) = get(app, "/version").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["name"], "logged-users-exporter");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_api_info_endpoint() {
    let app = test_app(FakeSource::new(W_OUTPUT, "", ""));
    let (status, _, body) = get(app, "/api/info").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["hostname"], "web1");
    assert_eq!(json["os"], "linux");
    assert_eq!(json["osVersion"], "6.8.0");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app(FakeSource::new(W_OUTPUT, "", ""));
    let (status, _, _) = get(app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
