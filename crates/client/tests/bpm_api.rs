//! HTTP-level tests for the diagram and case status clients.
//!
//! Each test serves the BPM endpoints from an ephemeral axum server bound
//! to a random local port.

use assert_matches::assert_matches;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use overlay_client::{BpmApi, CaseStatusClient, DiagramSourceClient};
use overlay_core::{CaseStatusSource, Counter, DiagramSource, FetchError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const BPMN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <bpmn:process id="P1"><bpmn:userTask id="e1" name="Review"/></bpmn:process>
</bpmn:definitions>"#;

async fn diagram(Path(process_id): Path<String>) -> Response {
    match process_id.as_str() {
        "P1" => BPMN.into_response(),
        "forbidden" => StatusCode::FORBIDDEN.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn case_info(Path(case_id): Path<String>) -> Response {
    match case_id.as_str() {
        "I1" => axum::Json(serde_json::json!({
            "id": "I1",
            "flowNodeStatesCounters": {
                "Review": { "ready": 1 },
                "Submit": { "completed": 2, "failed": 0 },
            }
        }))
        .into_response(),
        "empty" => axum::Json(serde_json::json!({ "flowNodeStatesCounters": {} })).into_response(),
        "garbled" => "<html>login</html>".into_response(),
        "missing-field" => axum::Json(serde_json::json!({ "id": "x" })).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Start the fake backend and return its API base URL.
async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/API/bpm/diagram/{process_id}", get(diagram))
        .route("/API/bpm/caseInfo/{case_id}", get(case_info));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("local addr should be known");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });

    format!("http://{addr}/API/bpm")
}

// ---------------------------------------------------------------------------
// Diagram source
// ---------------------------------------------------------------------------

#[tokio::test]
async fn diagram_success_returns_raw_body() {
    let base = spawn_backend().await;
    let client = DiagramSourceClient::new(BpmApi::new(&base));

    let definition = client.load("P1").await.expect("diagram should load");

    assert_eq!(definition.process_id, "P1");
    assert_eq!(definition.body, BPMN);
    assert_eq!(definition.source_url, format!("{base}/diagram/P1"));
}

#[tokio::test]
async fn diagram_non_success_carries_status_and_url() {
    let base = spawn_backend().await;
    let client = DiagramSourceClient::new(BpmApi::new(&base));

    let err = client.load("unknown").await.unwrap_err();
    assert_matches!(
        err,
        FetchError::Remote { status: 404, ref url } if *url == format!("{base}/diagram/unknown")
    );

    let err = client.load("forbidden").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

// ---------------------------------------------------------------------------
// Case status source
// ---------------------------------------------------------------------------

#[tokio::test]
async fn case_info_counters_are_parsed() {
    let base = spawn_backend().await;
    let client = CaseStatusClient::new(BpmApi::new(&base));

    let snapshot = client.load("I1").await.expect("case info should load");

    assert_eq!(snapshot.instance_id, "I1");
    assert_eq!(snapshot.len(), 2);
    let review = snapshot.get("Review").expect("Review should be reported");
    assert!(review.ready.is_set());
    assert!(!review.completed.is_set());
    let submit = snapshot.get("Submit").expect("Submit should be reported");
    assert_eq!(submit.completed, Counter(2));
}

#[tokio::test]
async fn case_info_with_no_nodes_is_empty() {
    let base = spawn_backend().await;
    let client = CaseStatusClient::new(BpmApi::new(&base));

    let snapshot = client.load("empty").await.expect("case info should load");
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn case_info_server_error_is_remote_error() {
    let base = spawn_backend().await;
    let client = CaseStatusClient::new(BpmApi::new(&base));

    let err = client.load("I9").await.unwrap_err();
    assert_matches!(err, FetchError::Remote { status: 500, .. });
    assert_eq!(err.url(), format!("{base}/caseInfo/I9"));
}

#[tokio::test]
async fn case_info_malformed_body_is_decode_error() {
    let base = spawn_backend().await;
    let client = CaseStatusClient::new(BpmApi::new(&base));

    assert_matches!(
        client.load("garbled").await,
        Err(FetchError::Decode { .. })
    );
    assert_matches!(
        client.load("missing-field").await,
        Err(FetchError::Decode { .. })
    );
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Reserve a port, then release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("local addr should be known");
    drop(listener);

    let client = CaseStatusClient::new(BpmApi::new(format!("http://{addr}/API/bpm")));
    assert_matches!(
        client.load("I1").await,
        Err(FetchError::Transport { .. })
    );
}
