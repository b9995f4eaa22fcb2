//! API integration tests
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use consult_tally::api::{build_router, AppState};
use consult_tally::config::{COUNTRIES, OTHER_LABEL, TOPICS};
use consult_tally::dashboard::Dashboard;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn app(dir: &TempDir) -> (Router, Dashboard) {
    let dashboard = Dashboard::new(dir.path().join("book.xlsx"));
    let router = build_router(Arc::new(AppState::new(dashboard.clone())));
    (router, dashboard)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["request_id"].as_str().is_some());
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let endpoints = body["data"]["endpoints"].as_array().unwrap();
    assert!(endpoints
        .iter()
        .any(|e| e["path"] == "/api/v1/entries" && e["method"] == "POST"));
}

#[tokio::test]
async fn test_version() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);
    let (_, body) = get(app, "/version").await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_options() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);
    let (status, body) = get(app, "/api/v1/options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["countries"].as_array().unwrap().len(),
        COUNTRIES.len()
    );
    assert_eq!(body["data"]["topics"].as_array().unwrap().len(), TOPICS.len());
    assert_eq!(body["data"]["other_label"], OTHER_LABEL);
}

// ═══════════════════════════════════════════════════════════════════════════
// DASHBOARD ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_matrix_on_empty_workbook() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);
    let (status, body) = get(app, "/api/v1/matrix").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(
        body["data"]["countries"].as_array().unwrap().len(),
        COUNTRIES.len() + 1
    );
}

#[tokio::test]
async fn test_record_entry_updates_everything() {
    let dir = TempDir::new().unwrap();
    let (app, dashboard) = app(&dir);

    let (status, body) = post(
        app.clone(),
        "/api/v1/entries",
        json!({
            "country": "Österreich",
            "topic": "Relocation",
            "employee": "Behrenz",
            "company_name": " Alpen GmbH ",
            "ident_number": "A-17"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["country"], "Österreich");
    assert_eq!(body["data"]["country_total"], 1);
    assert_eq!(body["data"]["record"]["company_name"], "Alpen GmbH");

    let (_, counts) = get(app.clone(), "/api/v1/counts").await;
    assert_eq!(counts["data"]["rows"][0]["country"], "Österreich");
    assert_eq!(counts["data"]["total"], 1);

    let (_, sheets) = get(app.clone(), "/api/v1/sheets").await;
    assert_eq!(sheets["data"]["sheets"], json!(["Österreich"]));

    let (_, entries) = get(app.clone(), "/api/v1/entries/%C3%96sterreich").await;
    assert_eq!(entries["data"]["entries"][0]["ident_number"], "A-17");

    let matrix = dashboard.build_matrix();
    assert_eq!(matrix.get(OTHER_LABEL, "Österreich"), Some(1));
}

#[tokio::test]
async fn test_record_without_company_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let (app, dashboard) = app(&dir);

    let (status, body) = post(
        app,
        "/api/v1/entries",
        json!({"country": "USA", "topic": "XXX", "employee": "Li"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Company name"));
    // Rejected before the counter is touched
    assert!(dashboard.read_counts().is_empty());
}

#[tokio::test]
async fn test_record_with_invalid_country_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let (app, dashboard) = app(&dir);

    for country in ["A/B", "Ein Land mit einem viel zu langen Namen"] {
        let (status, _) = post(
            app.clone(),
            "/api/v1/entries",
            json!({"country": country, "topic": "XXX", "employee": "Li", "company_name": "X"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", country);
    }

    assert!(dashboard.read_counts().is_empty());
    assert!(dashboard.list_detail_sheets().is_empty());
}

#[tokio::test]
async fn test_record_with_case_colliding_country_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let (app, dashboard) = app(&dir);
    let entry = |country: &str| {
        json!({"country": country, "topic": "XXX", "employee": "Li", "company_name": "X"})
    };

    let (status, _) = post(app.clone(), "/api/v1/entries", entry("USA")).await;
    assert_eq!(status, StatusCode::OK);

    for country in ["usa", "zaehlungen"] {
        let (status, body) = post(app.clone(), "/api/v1/entries", entry(country)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", country);
        assert!(body["error"].as_str().unwrap().contains("Invalid sheet name"));
    }

    let counts = dashboard.read_counts();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].count, 1);
}

#[tokio::test]
async fn test_entries_for_unknown_country_is_empty() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);
    let (status, body) = get(app, "/api/v1/entries/GB").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["entries"], json!([]));
}

#[tokio::test]
async fn test_concurrent_records_are_all_counted() {
    let dir = TempDir::new().unwrap();
    let (app, dashboard) = app(&dir);

    let mut tasks = Vec::new();
    for n in 0..8 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            post(
                app,
                "/api/v1/entries",
                json!({
                    "country": "USA",
                    "topic": "XXX",
                    "employee": "Li",
                    "company_name": format!("Firma {}", n)
                }),
            )
            .await
        }));
    }
    for task in tasks {
        let (status, _) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(dashboard.read_counts()[0].count, 8);
    assert_eq!(dashboard.detail_records("USA").len(), 8);
}
