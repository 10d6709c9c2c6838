//! Router construction.

use crate::api::handlers::{
    health_handler, metrics_handler, openapi_handler, relay_handler, AppState,
};
use crate::core::{request_id_middleware, MetricsMiddleware, RelayError};
use axum::{
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// Path the chat UI posts questions to.
pub const RELAY_PATH: &str = "/api/gemini";

/// Versioned alias of [`RELAY_PATH`].
pub const RELAY_ALIAS_PATH: &str = "/v1/relay";

/// Build the router with all endpoints and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route(RELAY_PATH, any(relay_handler))
        .route(RELAY_ALIAS_PATH, any(relay_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .with_state(state);

    with_middleware(routes)
}

/// Wrap routes in the relay's middleware stack.
///
/// Layers, outermost first: trace, CORS, request id, metrics, panic catcher.
pub fn with_middleware(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Turn a caught panic into an `internal-error` response.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %message, "Request handler panicked");
    RelayError::Internal(message).into_response()
}
