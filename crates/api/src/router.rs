//! Application router assembly.
//!
//! [`build_app_router`] is the single entry point used by `main.rs` and by
//! the integration tests, so both run behind identical middleware.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::handlers;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full application [`Router`].
///
/// Route tree:
///
/// ```text
/// /health                 service + database + upload root status
/// /{panoramas,images,videos}/*   uploaded media, served from disk
/// /api/...                JSON API, see `routes::api_routes`
/// *                       404 envelope
/// ```
pub fn build_app_router(state: AppState) -> Router {
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::media::router(&state.media))
        .nest("/api", routes::api_routes())
        .fallback(handlers::not_found);

    with_middleware(app, &state.config).with_state(state)
}

/// Wrap `app` in the shared middleware stack. Layers listed later run first:
/// CORS sees the request before anything else, panics are caught closest to
/// the handlers.
fn with_middleware(app: Router<AppState>, config: &ServerConfig) -> Router<AppState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    app.layer(CatchPanicLayer::new())
        // Covers upload bodies too.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
}

/// CORS for the configured browser origins.
///
/// Credentials are allowed because the refresh token travels as a cookie,
/// which rules out a wildcard origin. An unparsable origin aborts startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|origin| match origin.parse() {
            Ok(value) => value,
            Err(e) => panic!("CORS_ORIGINS entry '{origin}' is not a valid header value: {e}"),
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
