//! Shared helpers for command tests

#![allow(dead_code)]

use std::sync::Arc;

use capture_app::AppContext;
use capture_domain::{ApiConfig, Config, PipelineConfig, RetryPolicyConfig, UserCredentials};
use capture_infra::InMemoryCredentialsStore;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestApp {
    pub server: MockServer,
    pub ctx: AppContext,
    pub credentials: Arc<InMemoryCredentialsStore>,
}

pub fn test_config(server: &MockServer) -> Config {
    Config {
        api: ApiConfig {
            base_url: server.uri(),
            user_center_url: server.uri(),
            client_id: "capture-client".into(),
            client_secret: "client-secret".into(),
            email_domain: "capture.test".into(),
        },
        retry: RetryPolicyConfig { initial_timeout_ms: 500, max_retries: 0, backoff_multiplier: 1.0 },
        pipeline: PipelineConfig { poll_interval_ms: 10, max_poll_duration_ms: 2_000 },
        ..Config::default()
    }
}

/// Context with a known stored user that the mock server accepts
pub async fn test_app() -> TestApp {
    let server = MockServer::start().await;
    let credentials = Arc::new(InMemoryCredentialsStore::with_credentials(UserCredentials::new(
        "known@capture.test",
        "known-password",
    )));
    let ctx = AppContext::with_credentials_store(test_config(&server), credentials.clone())
        .expect("context builds");

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-1",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    TestApp { server, ctx, credentials }
}

pub fn extractions_body() -> serde_json::Value {
    json!({
        "extractions": {
            "amountToPay": { "entity": "amount", "value": "12.99:EUR" },
            "paymentRecipient": { "entity": "companyname", "value": "Acme GmbH" }
        },
        "compoundExtractions": {
            "lineItems": [
                { "description": { "entity": "text", "value": "Shirt" } },
                { "description": { "entity": "text", "value": "Socks" } }
            ]
        }
    })
}

/// Upload, a completed document and its extractions for `doc-1`
pub async fn mount_completed_document(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/documents/"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/documents/doc-1", server.uri())),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/documents/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "doc-1",
            "name": "invoice.pdf",
            "progress": "COMPLETED",
            "pageCount": 2
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/documents/doc-1/extractions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(extractions_body()))
        .mount(server)
        .await;
}
