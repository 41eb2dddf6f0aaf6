#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bangla_restaurant_api::{
    app::{app, AppState},
    auth::{CookiePolicy, JwtSessions},
    config::{AppConfig, DatabaseConfig, Environment, SecurityConfig},
    database::MemoryStore,
};
use reqwest::{header, Response, StatusCode};

/// A real HTTP server over the in-memory store, bound to a free port
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Tokens live for one second, as in the deployed configuration
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_ttl(1).await
    }

    pub async fn spawn_with_ttl(ttl_secs: u64) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = config(port, ttl_secs);
        let tokens = JwtSessions::new(
            &config.security.token_secret,
            Duration::from_secs(ttl_secs),
            CookiePolicy { secure: false },
        )?;
        let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(tokens), config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /jwt and return the `token=...` pair to send back as a cookie
    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/jwt"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        set_cookie_pair(&res).context("no session cookie set")
    }

    pub async fn get_cart(&self, email: &str, cookie: Option<&str>) -> Result<Response> {
        let mut req = self.client.get(self.url(&format!("/addCart?email={}", email)));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        Ok(req.send().await?)
    }
}

/// `name=value` part of the response's `Set-Cookie` header
pub fn set_cookie_pair(res: &Response) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|pair| pair.trim().to_string())
}

fn config(port: u16, ttl_secs: u64) -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        port,
        database: DatabaseConfig {
            user: String::new(),
            password: String::new(),
            host: "localhost".to_string(),
            name: "integration".to_string(),
            uri: None,
        },
        security: SecurityConfig {
            token_secret: "integration-secret".to_string(),
            token_ttl_secs: ttl_secs,
            cors_origins: vec!["http://localhost:5173".to_string()],
            secure_cookies: false,
        },
    }
}
