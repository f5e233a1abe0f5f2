//! Shared setup for tests that touch the process-wide stores.

use std::sync::Once;

const TEST_DEFAULTS: &[(&str, &str)] = &[
    ("GENERIC_CACHE_STORE_TYPE", "memory"),
    ("GENERIC_CACHE_STORE_URL", "memory"),
    ("GENERIC_DATA_STORE_TYPE", "sqlite"),
    ("GENERIC_DATA_STORE_URL", "sqlite:/tmp/admin_gate_test.db"),
];

/// Load `.env_test` once, fill in any missing store settings, and create tables.
///
/// Tests calling this must be `#[serial]` when they read or write shared state.
pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        for (key, value) in TEST_DEFAULTS {
            if std::env::var(key).is_err() {
                // Runs once, before any test reads the environment.
                unsafe { std::env::set_var(key, value) };
            }
        }

        if let Some(db_path) = sqlite_file_path() {
            let _ = std::fs::remove_file(db_path);
        }
    });

    if let Err(e) = crate::userdb::UserStore::init().await {
        eprintln!("Warning: Failed to initialize UserStore: {e}");
    }
}

fn sqlite_file_path() -> Option<String> {
    let url = std::env::var("GENERIC_DATA_STORE_URL").ok()?;
    let path = url.strip_prefix("sqlite:")?.trim_start_matches("//");
    let path = path.split('?').next()?;
    (!path.is_empty() && !path.contains(":memory:")).then(|| path.to_string())
}
