pub mod auth;
pub mod identity;

pub use auth::{extract_session_cookie, session_auth_middleware, SessionUser};
pub use identity::{identity_match_middleware, VerifiedIdentity};
