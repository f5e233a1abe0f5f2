//! Login, logout and page gating built on the session primitives.

mod config;
mod errors;
mod gate;
mod login;
mod types;

pub use config::{
    ADMIN_BOOTSTRAP_MODE, DEFAULT_BOOTSTRAP_PASSWORD, LOGIN_ACTION, LOGIN_MAX_ATTEMPTS,
    LOGIN_POLICY, LOGIN_WINDOW_SECONDS,
};
pub use errors::AuthError;
pub use gate::{authorize, logout, require_role};
pub use login::{CredentialStore, login, login_with};
pub use types::{BootstrapCredential, Credentials, GateOutcome, LoginPolicy};
