use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use admin_gate::{NewUser, Role, UserStore};
use admin_gate_axum::{ADMIN_ROUTE_PREFIX, admin_gate_router, require_login, session_middleware};

mod content;
mod pages;
mod server;

#[cfg(test)]
mod test_utils;

use crate::{
    content::ContentStore,
    pages::{
        dashboard, faq_create, faq_delete, faq_edit, faq_list, faq_update, index, settings_form,
        settings_save,
    },
    server::{Ports, init_tracing, spawn_http_server, spawn_https_server},
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) content: ContentStore,
}

/// Create the first administrator account when credentials are provided and it does not exist yet.
async fn seed_admin() -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(username), Ok(password)) = (
        std::env::var("ADMIN_SEED_USERNAME"),
        std::env::var("ADMIN_SEED_PASSWORD"),
    ) else {
        return Ok(());
    };

    if UserStore::get_user_by_username(&username).await?.is_some() {
        tracing::debug!("Seed admin account already exists");
        return Ok(());
    }

    let user = UserStore::create_user(&NewUser {
        username,
        password,
        display_name: "Administrator".to_string(),
        role: Role::Admin,
    })
    .await?;
    tracing::info!(user_id = user.id, "Seeded administrator account");
    Ok(())
}

fn console_router(state: AppState) -> Router {
    Router::new()
        .route("/console", get(dashboard))
        .route("/console/faqs", get(faq_list).post(faq_create))
        .route("/console/faqs/{id}", get(faq_edit).post(faq_update))
        .route("/console/faqs/{id}/delete", post(faq_delete))
        .route("/console/settings", get(settings_form).post(settings_save))
        .route_layer(from_fn(require_login))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install default CryptoProvider")?;

    dotenvy::dotenv().ok();
    init_tracing("demo_console");

    admin_gate_axum::init().await?;
    seed_admin().await?;

    let content_url = std::env::var("CONTENT_DB_URL")
        .unwrap_or_else(|_| "sqlite:./demo-console.db".to_string());
    let state = AppState {
        content: ContentStore::connect(&content_url).await?,
    };

    let app = Router::new()
        .route("/", get(index))
        .merge(console_router(state))
        .nest(ADMIN_ROUTE_PREFIX.as_str(), admin_gate_router())
        .layer(from_fn(session_middleware));

    let ports = Ports {
        http: 3001,
        https: 3443,
    };

    let http_server = spawn_http_server(ports.http, app.clone());
    match (
        std::env::var("TLS_CERT_PATH"),
        std::env::var("TLS_KEY_PATH"),
    ) {
        (Ok(cert), Ok(key)) => {
            let https_server = spawn_https_server(ports.https, app, &cert, &key).await?;
            tokio::try_join!(http_server, https_server)?;
        }
        _ => {
            tracing::info!("TLS_CERT_PATH/TLS_KEY_PATH not set; serving HTTP only");
            http_server.await?;
        }
    }
    Ok(())
}
