use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::app::{app, AppState};
use crate::auth::{CookiePolicy, JwtSessions, SessionTokens};
use crate::config::{AppConfig, DatabaseConfig, Environment, SecurityConfig, DEFAULT_PORT};
use crate::database::{Collection, DocumentStore, MemoryStore};

/// In-process app over a fresh in-memory store, driven with `oneshot`
pub struct TestContext {
    pub store: MemoryStore,
    pub tokens: Arc<JwtSessions>,
    router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let store = MemoryStore::new();
        let tokens = Arc::new(
            JwtSessions::new(
                &config.security.token_secret,
                Duration::from_secs(config.security.token_ttl_secs),
                CookiePolicy { secure: false },
            )
            .expect("test token service"),
        );

        let state = AppState::new(Arc::new(store.clone()), tokens.clone(), config);
        Self {
            store,
            tokens,
            router: app(state),
        }
    }

    /// `token=<jwt>` pair for a `Cookie` header
    pub fn session_cookie(&self, email: &str) -> String {
        let issued = self.tokens.issue(email).expect("issue token");
        format!("token={}", issued.token)
    }

    /// Insert a valid food listing and return its id
    pub async fn seed_food(&self, name: &str, owner: &str) -> String {
        let doc = json!({
            "name": name,
            "category": "Bangla",
            "price": 5.0,
            "userEmail": owner,
        });
        self.store
            .insert_one(Collection::Foods, doc.as_object().cloned().unwrap_or_default())
            .await
            .expect("seed food")
            .inserted_id
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (status, _, body) = self.call(builder.body(Body::empty()).expect("request")).await;
        (status, body)
    }

    /// Send `body` as JSON; `Value::Null` sends no body
    pub async fn send(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.call(json_request(method, uri, body)).await;
        (status, body)
    }

    /// POST and return the `Set-Cookie` header alongside the body
    pub async fn post_for_cookie(&self, uri: &str, body: Value) -> (StatusCode, Option<String>, Value) {
        self.call(json_request("POST", uri, body)).await
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, cookie, body)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = if body.is_null() {
        builder.body(Body::empty())
    } else {
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
    };
    request.expect("request")
}

fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        port: DEFAULT_PORT,
        database: DatabaseConfig {
            user: String::new(),
            password: String::new(),
            host: "localhost".to_string(),
            name: "test".to_string(),
            uri: None,
        },
        security: SecurityConfig {
            token_secret: "test-secret".to_string(),
            token_ttl_secs: 60,
            cors_origins: vec!["http://localhost:5173".to_string()],
            secure_cookies: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_is_plain_text() {
        let ctx = TestContext::new();
        let (status, body) = ctx.get("/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("Bangla Restaurant Server is Running".to_string()));
    }
}
