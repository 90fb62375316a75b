//! HTTP API tests, driving the router directly.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sightline::server::{AppState, router};
use sightline::store::ReportStore;
use tower::ServiceExt;

mod common;

async fn get(uri: &str) -> (StatusCode, Value) {
    let project = common::create_temp_project();
    let config = common::project_config(project.path());
    let store = ReportStore::open(&config).expect("Failed to open store");
    let app = router(AppState::new(store, &config));

    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health() {
    let (status, body) = get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn kinds_lists_loaded_reports() {
    let (status, body) = get("/api/kinds").await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["statement-coverage", "mutation-test"]);
    assert_eq!(body[0]["defaultSort"], "name:asc");
}

#[tokio::test]
async fn rows_default_page_and_sort() {
    let (status, body) = get("/api/statement-coverage/rows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["lastPage"], 2);
    assert_eq!(body["totalCount"], 4);
    assert_eq!(body["data"][0]["name"], "recipeA");
    assert_eq!(body["data"][1]["name"], "recipeB");
}

#[tokio::test]
async fn rows_sorted_and_clamped() {
    let (status, body) = get("/api/statement-coverage/rows?page=9&size=3&sort=coverage:desc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
    assert_eq!(body["data"][0]["name"], "recipeC");
    assert_eq!(body["data"][0]["values"]["coverage"]["available"], false);
}

#[tokio::test]
async fn rows_reject_bad_parameters() {
    let (status, body) = get("/api/statement-coverage/rows?page=two").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, _) = get("/api/statement-coverage/rows?sort=coverage:sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get("/api/no-such-kind/rows").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get("/api/complexity/rows").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn file_with_findings() {
    let (status, body) = get("/api/statement-coverage/file?path=recipeA%2Fmain.c").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "recipeA/main.c");
    assert!(body["content"].as_str().unwrap().starts_with("int line1 = 1;"));
    assert_eq!(body["findings"].as_array().unwrap().len(), 2);
    assert_eq!(body["findings"][1]["type"], "line");
    assert_eq!(body["findings"][1]["covered"], false);
}

#[tokio::test]
async fn file_errors() {
    let (status, _) = get("/api/statement-coverage/file").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        get("/api/statement-coverage/file?path=..%2Freports%2Fmutation-test.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
