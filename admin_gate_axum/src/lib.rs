//! axum integration for `admin-gate`.
//!
//! Install [`session_middleware`] on the outermost router so every request
//! has a loaded session, put [`require_login`] in front of console pages, and
//! nest [`admin_gate_router`] under [`ADMIN_ROUTE_PREFIX`] for the login and
//! logout pages.
//!
//! ```no_run
//! use axum::{Router, middleware::from_fn, routing::get};
//! use admin_gate_axum::{ADMIN_ROUTE_PREFIX, AuthUser, admin_gate_router, require_login, session_middleware};
//!
//! async fn dashboard(user: AuthUser) -> String {
//!     format!("Hello, {}!", user.display_name)
//! }
//!
//! let app: Router = Router::new()
//!     .route("/console", get(dashboard))
//!     .route_layer(from_fn(require_login))
//!     .nest(ADMIN_ROUTE_PREFIX.as_str(), admin_gate_router())
//!     .layer(from_fn(session_middleware));
//! ```

mod config;
mod error;
mod middleware;
mod pages;
mod router;
mod session;

#[cfg(test)]
mod test_utils;

pub use config::{
    ADMIN_LOGIN_URL, ADMIN_LOGOUT_URL, ADMIN_REDIRECT_AFTER_LOGIN, ADMIN_TRUST_FORWARDED_FOR,
};
pub use error::{AuthRejection, IntoResponseError};
pub use middleware::{require_login, session_middleware};
pub use router::{admin_gate_router, admin_gate_router_no_trace};
pub use session::{AuthUser, ClientAddress, SessionHandle, SessionLiveness};

pub use admin_gate::{ADMIN_ROUTE_PREFIX, init};
