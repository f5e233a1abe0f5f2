//! FAQ and site-settings tables backing the demo screens.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub(crate) const SETTING_SITE_NAME: &str = "site_name";
pub(crate) const SETTING_CONTACT_EMAIL: &str = "contact_email";
pub(crate) const SETTING_SITE_URL: &str = "site_url";

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Faq {
    pub(crate) id: i64,
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) sort_order: i64,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Validated FAQ fields ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FaqInput {
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) sort_order: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SiteSettings {
    pub(crate) site_name: String,
    pub(crate) contact_email: String,
    pub(crate) site_url: String,
}

#[derive(Clone)]
pub(crate) struct ContentStore {
    pool: SqlitePool,
}

impl ContentStore {
    pub(crate) async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faqs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS site_settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) async fn list_faqs(&self) -> Result<Vec<Faq>, sqlx::Error> {
        sqlx::query_as::<_, Faq>(
            "SELECT id, question, answer, sort_order, updated_at FROM faqs ORDER BY sort_order, id",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub(crate) async fn count_faqs(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM faqs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) async fn get_faq(&self, id: i64) -> Result<Option<Faq>, sqlx::Error> {
        sqlx::query_as::<_, Faq>(
            "SELECT id, question, answer, sort_order, updated_at FROM faqs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    #[tracing::instrument(skip(self, input))]
    pub(crate) async fn create_faq(&self, input: &FaqInput) -> Result<i64, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO faqs (question, answer, sort_order, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.question)
        .bind(&input.answer)
        .bind(input.sort_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Returns false when no FAQ has this id.
    #[tracing::instrument(skip(self, input))]
    pub(crate) async fn update_faq(&self, id: i64, input: &FaqInput) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE faqs SET question = ?, answer = ?, sort_order = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&input.question)
        .bind(&input.answer)
        .bind(input.sort_order)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) async fn delete_faq(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn load_settings(&self) -> Result<SiteSettings, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM site_settings")
            .fetch_all(&self.pool)
            .await?;

        let mut settings = SiteSettings::default();
        for (key, value) in rows {
            match key.as_str() {
                SETTING_SITE_NAME => settings.site_name = value,
                SETTING_CONTACT_EMAIL => settings.contact_email = value,
                SETTING_SITE_URL => settings.site_url = value,
                _ => {}
            }
        }
        Ok(settings)
    }

    #[tracing::instrument(skip(self, settings))]
    pub(crate) async fn save_settings(&self, settings: &SiteSettings) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in [
            (SETTING_SITE_NAME, &settings.site_name),
            (SETTING_CONTACT_EMAIL, &settings.contact_email),
            (SETTING_SITE_URL, &settings.site_url),
        ] {
            sqlx::query(
                "INSERT INTO site_settings (key, value) VALUES (?, ?) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }
}
