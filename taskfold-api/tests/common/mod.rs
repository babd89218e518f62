/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An in-memory store behind a fully wired router
/// - Test user registration through the public endpoint
/// - JSON request helpers

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use taskfold_api::app::{build_router, AppState};
use taskfold_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskfold_shared::store::MemoryStore;
use tower::Service;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "Tasks4ever";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub config: Config,
}

/// A registered user and their access token
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
    pub refresh_token: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            production: false,
            cors_origins: vec!["http://localhost:3000".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_ttl_seconds: 3600,
            refresh_ttl_seconds: 86_400,
        },
        run_migrations: false,
    }
}

impl TestContext {
    /// Creates a new test context over an empty in-memory store
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = test_config();
        let app = build_router(AppState::new(store.clone(), config.clone()));

        TestContext { store, app, config }
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// An empty body parses as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a user through `POST /v1/auth/register`
    pub async fn register(&self, email: &str) -> TestUser {
        let (status, body) = self
            .request(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(serde_json::json!({ "email": email, "password": TEST_PASSWORD })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "register failed: {}", body);

        TestUser {
            id: body["user_id"].as_str().unwrap().parse().unwrap(),
            token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a folder owned by `owner` and returns its ID
    pub async fn create_folder(&self, owner: &TestUser, name: &str) -> Uuid {
        let (status, body) = self
            .post("/v1/folders", &owner.token, serde_json::json!({ "name": name }))
            .await;

        assert_eq!(status, StatusCode::OK, "create folder failed: {}", body);
        body["folder"]["id"].as_str().unwrap().parse().unwrap()
    }

    /// Adds `member` to a folder with `role`, acting as `owner`
    pub async fn add_member(&self, owner: &TestUser, folder_id: Uuid, member: &TestUser, role: &str) {
        let (status, body) = self
            .post(
                &format!("/v1/folders/{}/members", folder_id),
                &owner.token,
                serde_json::json!({ "user_id": member.id, "role": role }),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "add member failed: {}", body);
    }
}
