// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{acme_site, coordinator};
use axum::http::StatusCode;
use axum_test::TestServer;
use mailharvest::application::use_cases::batch_coordinator::BatchOptions;
use mailharvest::engines::traits::PageSource;
use mailharvest::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;

fn test_server() -> TestServer {
    let coordinator = coordinator(
        vec![Arc::new(acme_site())],
        BatchOptions {
            deadline: None,
            ..BatchOptions::default()
        },
    );
    TestServer::new(routes::routes(Arc::new(coordinator))).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_version() {
    let server = test_server();

    let response = server.get("/v1/version").await;

    response.assert_status_ok();
    response.assert_text(env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_scrape_returns_emails_and_debug_records() {
    let server = test_server();

    let response = server
        .post("/v1/emails/scrape")
        .json(&json!({ "domains": ["acme.com", "http://beta.com", "  "] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["emails"], json!(["info@acme.com"]));
    assert_eq!(body["message"], "Emails scraped successfully");
    assert_eq!(body["debug"][0]["url"], "https://acme.com");
    assert_eq!(body["debug"][0]["status"], "success");
    assert_eq!(body["debug"][0]["emailsFound"], json!(["info@acme.com"]));
    assert_eq!(body["debug"][1]["url"], "https://beta.com");
    assert_eq!(body["debug"][1]["emailsFiltered"], json!([]));
    assert!(body["debug"][1]["error"].is_null());
}

#[tokio::test]
async fn test_missing_domains_is_bad_request() {
    let server = test_server();

    let response = server.post("/v1/emails/scrape").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "No domains supplied" }));
}

#[tokio::test]
async fn test_no_valid_domains_is_bad_request() {
    let server = test_server();

    let response = server
        .post("/v1/emails/scrape")
        .json(&json!({ "domains": ["", "   ", 7] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "No valid domains found in the input" }));
}

#[tokio::test]
async fn test_batch_crash_returns_internal_error_envelope() {
    let source: Arc<dyn PageSource> = Arc::new(acme_site().with_broken_name());
    let coordinator = coordinator(
        vec![source],
        BatchOptions {
            deadline: None,
            ..BatchOptions::default()
        },
    );
    let server = TestServer::new(routes::routes(Arc::new(coordinator))).unwrap();

    let response = server
        .post("/v1/emails/scrape")
        .json(&json!({ "domains": ["acme.com"] }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Failed to process the request", "debug": [] }));
}
