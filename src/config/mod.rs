use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Default listen port when neither `PORT` nor `--port` is given
pub const DEFAULT_PORT: u16 = 5000;

const DEFAULT_DB_HOST: &str = "cluster0.rqj5bqq.mongodb.net";
const DEFAULT_DB_NAME: &str = "BanglaRestaurant";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Could not build database URI: {0}")]
    DatabaseUri(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub name: String,
    /// Full connection string; wins over user/password/host when set
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub token_secret: String,
    pub token_ttl_secs: u64,
    pub cors_origins: Vec<String>,
    pub secure_cookies: bool,
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// Database credentials and the token secret are required; their absence
    /// is reported here so the server never starts half-configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();

        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        };

        config.database.user = required("DB_USER")?;
        config.database.password = required("DB_PASS")?;
        config.security.token_secret = required("ACCESS_TOKEN_SECRET")?;

        config.with_env_overrides()
    }

    /// Configuration for running against the in-memory store.
    ///
    /// Only the token secret is needed; an ephemeral one is used when
    /// `ACCESS_TOKEN_SECRET` is unset.
    pub fn for_memory_store() -> Result<Self, ConfigError> {
        let mut config = match Environment::from_env() {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        };

        config.security.token_secret = env::var("ACCESS_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("dev-secret-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()));

        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = env::var("PORT") {
            self.port = parse_var("PORT", v)?;
        }

        // Database overrides
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("MONGODB_URI") {
            self.database.uri = Some(v);
        }

        // Security overrides
        if let Ok(v) = env::var("TOKEN_TTL_SECS") {
            self.security.token_ttl_secs = parse_var("TOKEN_TTL_SECS", v)?;
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURE_COOKIES") {
            self.security.secure_cookies = parse_var("SECURE_COOKIES", v)?;
        }

        Ok(self)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Connection string for the document database.
    ///
    /// Credentials are percent-encoded so passwords containing `@` or `:`
    /// survive the round trip.
    pub fn database_uri(&self) -> Result<String, ConfigError> {
        if let Some(uri) = &self.database.uri {
            return Ok(uri.clone());
        }

        let mut url = url::Url::parse(&format!("mongodb+srv://{}/", self.database.host))
            .map_err(|e| ConfigError::DatabaseUri(e.to_string()))?;
        url.set_username(&self.database.user)
            .map_err(|_| ConfigError::DatabaseUri("username rejected".to_string()))?;
        url.set_password(Some(&self.database.password))
            .map_err(|_| ConfigError::DatabaseUri("password rejected".to_string()))?;
        url.set_query(Some("retryWrites=true&w=majority"));

        Ok(url.into())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            port: DEFAULT_PORT,
            database: DatabaseConfig::defaults(),
            security: SecurityConfig {
                token_secret: String::new(),
                token_ttl_secs: 1,
                cors_origins: vec!["http://localhost:5173".to_string()],
                secure_cookies: false,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            port: DEFAULT_PORT,
            database: DatabaseConfig::defaults(),
            security: SecurityConfig {
                token_secret: String::new(),
                token_ttl_secs: 1,
                cors_origins: vec!["http://localhost:5173".to_string()],
                secure_cookies: true,
            },
        }
    }
}

impl Environment {
    /// `APP_ENV` first, then the `NODE_ENV` name the frontend deploys with
    fn from_env() -> Self {
        let mode = env::var("APP_ENV").or_else(|_| env::var("NODE_ENV"));
        match mode.as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl DatabaseConfig {
    fn defaults() -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            host: DEFAULT_DB_HOST.to_string(),
            name: DEFAULT_DB_NAME.to_string(),
            uri: None,
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
