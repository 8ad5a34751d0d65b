//! Shared helpers for infra integration tests
//!
//! Builds the real HTTP stack (user center client, document API client and
//! in-memory credentials) against a single `wiremock` server.

#![allow(dead_code)]

use std::sync::Arc;

use capture_core::{AnalysisPipeline, DedicatedThreadExecutor, SessionProvider, UiExecutor};
use capture_domain::{ApiConfig, PipelineConfig, RetryPolicy, RetryPolicyConfig, UserCredentials};
use capture_infra::{ApiClient, InMemoryCredentialsStore, UserCenterClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "capture-client";
pub const CLIENT_SECRET: &str = "client-secret";
pub const EMAIL_DOMAIN: &str = "capture.test";

/// Fully wired pipeline talking to a mock backend
pub struct Stack {
    pub server: MockServer,
    pub sessions: SessionProvider,
    pub pipeline: AnalysisPipeline,
    pub credentials: Arc<InMemoryCredentialsStore>,
}

/// Retry policy with short timeouts so failing tests stay fast
pub fn fast_policy(max_retries: i64) -> RetryPolicy {
    RetryPolicy::new(RetryPolicyConfig {
        initial_timeout_ms: 500,
        max_retries,
        backoff_multiplier: 1.0,
    })
    .expect("valid retry policy")
}

pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        user_center_url: server.uri(),
        client_id: CLIENT_ID.to_string(),
        client_secret: CLIENT_SECRET.to_string(),
        email_domain: EMAIL_DOMAIN.to_string(),
    }
}

pub fn ui_executor() -> Arc<dyn UiExecutor> {
    Arc::new(DedicatedThreadExecutor::spawn("capture-ui-test").expect("spawn UI thread"))
}

/// Build the stack with the given stored credentials and retry budget
pub async fn stack(stored: Option<UserCredentials>, max_retries: i64) -> Stack {
    let server = MockServer::start().await;
    let config = api_config(&server);
    let policy = fast_policy(max_retries);

    let auth = UserCenterClient::new(&config, policy).expect("user center client");
    let documents = ApiClient::new(&config.base_url, policy).expect("document client");
    let credentials = Arc::new(match stored {
        Some(credentials) => InMemoryCredentialsStore::with_credentials(credentials),
        None => InMemoryCredentialsStore::new(),
    });

    let sessions = SessionProvider::new(Arc::new(auth), credentials.clone(), EMAIL_DOMAIN);
    let pipeline = AnalysisPipeline::new(
        sessions.clone(),
        Arc::new(documents),
        ui_executor(),
        PipelineConfig { poll_interval_ms: 10, max_poll_duration_ms: 2_000 },
    );

    Stack { server, sessions, pipeline, credentials }
}

pub fn known_user() -> UserCredentials {
    UserCredentials::new("known@capture.test", "known-password")
}

pub fn token_body(token: &str) -> serde_json::Value {
    json!({ "access_token": token, "token_type": "bearer", "expires_in": 3600 })
}

/// Accept every password login with `token`
pub async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
        .mount(server)
        .await;
}

/// Client token and user creation endpoints
pub async fn mount_user_creation(server: &MockServer, expected_users: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("grant_type", "client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("client-token")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(201))
        .expect(expected_users)
        .mount(server)
        .await;
}

pub fn document_body(id: &str, progress: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "invoice.pdf",
        "progress": progress,
        "pageCount": 1,
        "creationDate": 1_700_000_000_000_i64,
        "origin": "UPLOAD",
        "sourceClassification": "SCANNED"
    })
}

pub fn extractions_body() -> serde_json::Value {
    json!({
        "extractions": {
            "amountToPay": { "entity": "amount", "value": "12.99:EUR" },
            "paymentRecipient": { "entity": "companyname", "value": "Acme GmbH" }
        },
        "compoundExtractions": {},
        "candidates": {}
    })
}
