use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::SessionTokens;
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::handlers::{protected, public};
use crate::middleware::{identity_match_middleware, session_auth_middleware};

/// Process-wide state, built once at startup and handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<dyn SessionTokens>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        tokens: Arc<dyn SessionTokens>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .merge(food_routes())
        .merge(cart_routes(state.clone()))
        .merge(session_routes())
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn food_routes() -> Router<AppState> {
    use public::foods;

    Router::new()
        .route("/foods", get(foods::list).post(foods::create))
        .route("/foodsCount", get(foods::count))
        .route("/foods/:id", get(foods::show))
        .route("/userAddFoods", get(foods::list_by_owner))
        .route("/updateFoods/:id", put(foods::update))
}

/// `GET /addCart` is the one gated route: session gate first, then the
/// identity gate. The other cart methods stay public.
fn cart_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/addCart",
            get(protected::cart::list)
                .route_layer(from_fn(identity_match_middleware))
                .route_layer(from_fn_with_state(state, session_auth_middleware))
                .post(public::cart::add),
        )
        .route("/addCart/:id", delete(public::cart::remove))
}

fn session_routes() -> Router<AppState> {
    use public::session;

    Router::new()
        .route("/jwt", post(session::issue))
        .route("/logOut", post(session::log_out))
}

/// Only the configured origins, with cookies allowed
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unparseable CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}
