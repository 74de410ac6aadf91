//! `SQLite` implementation of [`SettingsRepository`].
//!
//! Flat and structured settings share the `settings` table; a flat value is
//! a row whose `type`, `version` and `sync_status` are left empty.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use structura_app::ports::SettingsRepository;
use structura_domain::error::StructuraError;
use structura_domain::setting::Setting;

use crate::error::StorageError;

struct Wrapper(Setting);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Setting {
            identifier: row.try_get("key")?,
            value: row.try_get("value")?,
            setting_type: row.try_get("type")?,
            version: row.try_get("version")?,
            sync_status: row.try_get("sync_status")?,
        }))
    }
}

const SELECT_BY_KEY: &str = "SELECT * FROM settings WHERE key = ?";
const SELECT_VALUE_BY_KEY: &str = "SELECT value FROM settings WHERE key = ?";

const UPSERT_VALUE: &str = r"
    INSERT INTO settings (key, value) VALUES (?, ?)
    ON CONFLICT (key) DO UPDATE SET value = excluded.value
";

const UPSERT_SETTING: &str = r"
    INSERT OR REPLACE INTO settings (key, value, type, version, sync_status)
    VALUES (?, ?, ?, ?, ?)
";

/// `SQLite`-backed settings repository.
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SettingsRepository for SqliteSettingsRepository {
    fn get_setting(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<Setting>, StructuraError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_KEY)
                .bind(identifier)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StructuraError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<(String,)> = sqlx::query_as(SELECT_VALUE_BY_KEY)
                .bind(key)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|(value,)| value))
        }
    }

    fn put(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StructuraError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT_VALUE)
                .bind(key)
                .bind(value)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn put_setting(
        &self,
        setting: &Setting,
    ) -> impl Future<Output = Result<(), StructuraError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT_SETTING)
                .bind(&setting.identifier)
                .bind(&setting.value)
                .bind(setting.setting_type.as_deref())
                .bind(setting.version.as_deref())
                .bind(setting.sync_status.as_deref())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
