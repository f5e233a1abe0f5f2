//! Account database selected by `GENERIC_DATA_STORE_TYPE`.

use std::{env, str::FromStr, sync::LazyLock};

use sqlx::{PgPool, SqlitePool, sqlite::SqliteConnectOptions};

static GENERIC_DATA_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_DATA_STORE_TYPE").expect("GENERIC_DATA_STORE_TYPE must be set")
});

static GENERIC_DATA_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_DATA_STORE_URL").expect("GENERIC_DATA_STORE_URL must be set")
});

/// Prefix for every table this crate creates. Default: "adm_"
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "adm_".to_string()));

/// Connection pool for one of the supported databases. Pools are shared and
/// internally synchronized, so the static needs no lock.
#[derive(Clone, Debug)]
pub(crate) enum Database {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl Database {
    fn connect_lazy(store_type: &str, url: &str) -> Result<Self, String> {
        match store_type {
            "sqlite" => {
                let opts = SqliteConnectOptions::from_str(url)
                    .map_err(|e| format!("Invalid SQLite URL: {e}"))?
                    .create_if_missing(true);
                Ok(Self::Sqlite(SqlitePool::connect_lazy_with(opts)))
            }
            "postgres" => PgPool::connect_lazy(url)
                .map(Self::Postgres)
                .map_err(|e| format!("Invalid Postgres URL: {e}")),
            t => Err(format!(
                "Unsupported data store type: {t}. Supported types are 'sqlite' and 'postgres'"
            )),
        }
    }
}

pub(crate) static DATABASE: LazyLock<Database> = LazyLock::new(|| {
    let store_type = GENERIC_DATA_STORE_TYPE.as_str();
    tracing::info!("Opening {} account database", store_type);

    Database::connect_lazy(store_type, GENERIC_DATA_STORE_URL.as_str())
        .unwrap_or_else(|e| panic!("{e}"))
});
