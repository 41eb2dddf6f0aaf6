use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AppConfig;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "token";

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signing secret is empty")]
    InvalidSecret,
    #[error("JWT generation error: {0}")]
    Generation(String),
    /// Missing, malformed, badly signed, or expired. Deliberately opaque.
    #[error("Invalid session token")]
    Invalid,
}

/// Cookie attributes for the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Production: `Secure; SameSite=None`. Otherwise `SameSite=Strict`.
    pub secure: bool,
}

impl CookiePolicy {
    fn attributes(&self) -> &'static str {
        if self.secure {
            "HttpOnly; Path=/; Secure; SameSite=None"
        } else {
            "HttpOnly; Path=/; SameSite=Strict"
        }
    }

    /// `Set-Cookie` value carrying a freshly issued token
    pub fn session_cookie(&self, token: &str) -> String {
        format!("{}={}; {}", SESSION_COOKIE, token, self.attributes())
    }

    /// `Set-Cookie` value that makes the browser drop the session cookie
    pub fn clearing_cookie(&self) -> String {
        format!("{}=; Max-Age=0; {}", SESSION_COOKIE, self.attributes())
    }
}

/// Stateless session tokens.
///
/// Verification is pure: no I/O and no server-side session table. Revoking
/// only tells the client to discard its cookie; a captured token stays
/// valid until it expires.
pub trait SessionTokens: Send + Sync {
    /// Issue a token for `email`, returned as a ready `Set-Cookie` value
    /// alongside the raw token.
    fn issue(&self, email: &str) -> Result<IssuedToken, TokenError>;

    fn verify(&self, token: &str) -> Result<Claims, TokenError>;

    /// `Set-Cookie` value that clears the session
    fn revoke(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub cookie: String,
}

/// HS256 JWT implementation of [`SessionTokens`]
pub struct JwtSessions {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    cookie_policy: CookiePolicy,
}

impl JwtSessions {
    pub fn new(secret: &str, ttl: Duration, cookie_policy: CookiePolicy) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            cookie_policy,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TokenError> {
        Self::new(
            &config.security.token_secret,
            Duration::from_secs(config.security.token_ttl_secs),
            CookiePolicy {
                secure: config.security.secure_cookies,
            },
        )
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Lifetimes are a second or two; the default 60s leeway would swamp them
        validation.leeway = 0;
        validation
    }
}

impl SessionTokens for JwtSessions {
    fn issue(&self, email: &str) -> Result<IssuedToken, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: email.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))?;
        let cookie = self.cookie_policy.session_cookie(&token);

        Ok(IssuedToken { token, cookie })
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Invalid);
        }

        decode::<Claims>(token, &self.decoding_key, &Self::validation())
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }

    fn revoke(&self) -> String {
        self.cookie_policy.clearing_cookie()
    }
}
