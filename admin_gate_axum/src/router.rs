//! Routes served by the gate itself

use axum::{Router, routing::get, routing::post};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::pages::{login_page, login_submit, logout_submit};

/// Login and logout pages, to be nested under `ADMIN_ROUTE_PREFIX`:
/// - GET/POST {ADMIN_ROUTE_PREFIX}/login
/// - POST {ADMIN_ROUTE_PREFIX}/logout
///
/// The application router must carry `session_middleware`.
pub fn admin_gate_router() -> Router {
    admin_gate_router_no_trace().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same routes as [`admin_gate_router`] without HTTP tracing.
pub fn admin_gate_router_no_trace() -> Router {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", post(logout_submit))
}
