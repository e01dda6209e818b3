//! Integration tests for the HTTP API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rugscan::server::{router, AppState};
use rugscan::{AnalyzerConfig, StaticAnalyzer};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app() -> Router {
    app_with(AnalyzerConfig::default())
}

fn app_with(config: AnalyzerConfig) -> Router {
    let analyzer = StaticAnalyzer::with_config(config).unwrap();
    router(Arc::new(AppState::with_analyzer(analyzer)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn submit(app: &Router, body: Value) -> String {
    let (status, json) = post_json(app, "/api/analyze", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["success"], true);
    json["jobId"].as_str().unwrap().to_string()
}

/// Poll until the job leaves pending/analyzing; returns the final body and
/// every progress value seen.
async fn poll(app: &Router, job_id: &str) -> (Value, Vec<u64>) {
    let uri = format!("/api/analyze/status/{}", job_id);
    let mut progress = Vec::new();
    for _ in 0..500 {
        let (status, json) = get(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        if let Some(p) = json["progress"].as_u64() {
            progress.push(p);
        }
        match json["status"].as_str() {
            Some("pending") | Some("analyzing") => {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            _ => return (json, progress),
        }
    }
    panic!("job {} never finished", job_id);
}

#[tokio::test]
async fn test_example_contract_endpoint() {
    let app = app();
    let (status, json) = get(&app, "/api/examples/contract").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["contractCode"]
        .as_str()
        .unwrap()
        .contains("contract RiskyToken"));
}

#[tokio::test]
async fn test_analysis_lifecycle() {
    let app = app();
    let (_, example) = get(&app, "/api/examples/contract").await;
    let job_id = submit(&app, json!({ "contractCode": example["contractCode"] })).await;

    let (json, progress) = poll(&app, &job_id).await;
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{:?}", progress);

    assert_eq!(json["success"], true);
    assert_eq!(json["status"], "completed");
    assert_eq!(json["progress"], 100);
    assert_eq!(json["jobId"], job_id.as_str());

    let result = &json["result"];
    assert_eq!(result["contractName"], "RiskyToken");
    assert_eq!(result["overallRisk"], "critical");
    assert!(result["criticalCount"].as_u64().unwrap() >= 1);
    assert!(result["scanTime"].is_string());
    assert!(result["scanDuration"].is_u64());

    let first = &result["vulnerabilities"][0];
    assert!(first["type"].is_string());
    assert!(first["lineStart"].as_u64().unwrap() >= 1);
    assert!(first["recommendations"].is_string());

    // The stored result is retrievable by id.
    let id = result["id"].as_u64().unwrap();
    let (status, stored) = get(&app, &format!("/api/analysis/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["success"], true);
    assert_eq!(&stored["result"], result);
}

#[tokio::test]
async fn test_options_gate_categories() {
    let app = app();
    let body = json!({
        "contractCode": "contract T { function pause() external {} function blacklist(address a) external {} }",
        "contractName": "Gated",
        "options": { "detectPrivileged": false }
    });
    let job_id = submit(&app, body).await;
    let (json, _) = poll(&app, &job_id).await;

    assert_eq!(json["status"], "completed");
    assert_eq!(json["result"]["contractName"], "Gated");
    assert_eq!(json["result"]["vulnerabilities"], json!([]));
    assert_eq!(json["result"]["overallRisk"], "low");
}

#[tokio::test]
async fn test_missing_contract_code_is_rejected() {
    let app = app();
    for body in [r#"{}"#, r#"{"contractCode": "   "}"#, r#"{"contractName": "X"}"#] {
        let (status, json) = post_json(&app, "/api/analyze", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(
            json["error"],
            "Validation error: Contract code is required at \"contractCode\""
        );
    }
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = app();
    for body in ["not json", r#"{"contractCode": 42}"#] {
        let (status, json) = post_json(&app, "/api/analyze", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Validation error: "));
    }
}

#[tokio::test]
async fn test_unknown_job() {
    let app = app();
    let (status, json) = get(&app, "/api/analyze/status/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "success": false, "error": "Analysis job not found" }));
}

#[tokio::test]
async fn test_unknown_result() {
    let app = app();
    for uri in ["/api/analysis/999", "/api/analysis/abc", "/api/analysis/-1"] {
        let (status, json) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(json, json!({ "success": false, "error": "Analysis result not found" }));
    }
}

#[tokio::test]
async fn test_failed_job_reports_error() {
    let app = app_with(AnalyzerConfig {
        max_source_bytes: 16,
        ..Default::default()
    });
    let job_id = submit(&app, json!({ "contractCode": "contract Big { uint256 a; }" })).await;
    let (json, _) = poll(&app, &job_id).await;

    assert_eq!(json["success"], false);
    assert_eq!(json["status"], "failed");
    assert_eq!(json["jobId"], job_id.as_str());
    assert!(json["error"].as_str().unwrap().contains("exceeds"));
    assert!(json.get("result").is_none());
}

#[tokio::test]
async fn test_rules_endpoint() {
    let app = app();
    let (status, json) = get(&app, "/api/rules").await;

    assert_eq!(status, StatusCode::OK);
    let rules = json["rules"].as_array().unwrap();
    assert!(!rules.is_empty());
    assert_eq!(rules[0]["id"], "BACKDOOR-001");
    assert!(rules.iter().any(|r| r["deepScan"] == true));
    assert!(rules.iter().any(|r| r["category"] == "two-factor"));
}
