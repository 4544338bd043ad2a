use async_trait::async_trait;
use sqlx::PgPool;

use super::{is_valid_table_name, MoodStore, StoreError};
use crate::models::mood::{MoodEntry, MoodRecord};

/// One row per user in a configurable table: `"user"` is the primary key,
/// `mood_data` holds the entry sequence as JSONB.
#[derive(Clone)]
pub struct PgMoodStore {
    pool: PgPool,
    table: Option<String>,
}

impl PgMoodStore {
    /// `table: None` is accepted; every storage call then fails with
    /// [`StoreError::TableNotConfigured`].
    pub fn new(pool: PgPool, table: Option<String>) -> Result<Self, StoreError> {
        if let Some(name) = &table {
            if !is_valid_table_name(name) {
                return Err(StoreError::InvalidTableName(name.clone()));
            }
        }
        Ok(Self { pool, table })
    }

    fn table(&self) -> Result<&str, StoreError> {
        self.table.as_deref().ok_or(StoreError::TableNotConfigured)
    }

    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        let table = self.table()?;
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                "user" TEXT PRIMARY KEY,
                mood_data JSONB NOT NULL DEFAULT '[]'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        tracing::info!(table = %table, "Mood table ready");
        Ok(())
    }
}

#[async_trait]
impl MoodStore for PgMoodStore {
    async fn get(&self, user: &str) -> Result<Option<MoodRecord>, StoreError> {
        let table = self.table()?;
        let sql = format!(r#"SELECT mood_data FROM "{table}" WHERE "user" = $1"#);

        let stored = sqlx::query_scalar::<_, serde_json::Value>(&sql)
            .bind(user)
            .fetch_optional(&self.pool)
            .await?;

        match stored {
            Some(value) => Ok(Some(MoodRecord {
                user: user.to_owned(),
                mood_data: serde_json::from_value(value)?,
            })),
            None => Ok(None),
        }
    }

    async fn put(&self, record: &MoodRecord) -> Result<(), StoreError> {
        let table = self.table()?;
        let sql = format!(
            r#"
            INSERT INTO "{table}" ("user", mood_data, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT ("user") DO UPDATE SET
                mood_data = EXCLUDED.mood_data,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            "#
        );

        sqlx::query(&sql)
            .bind(&record.user)
            .bind(serde_json::to_value(&record.mood_data)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_mood_data(
        &self,
        user: &str,
        mood_data: &[Option<MoodEntry>],
    ) -> Result<(), StoreError> {
        let table = self.table()?;
        let sql = format!(
            r#"
            INSERT INTO "{table}" ("user", mood_data)
            VALUES ($1, $2)
            ON CONFLICT ("user") DO UPDATE SET
                mood_data = EXCLUDED.mood_data,
                updated_at = NOW()
            "#
        );

        sqlx::query(&sql)
            .bind(user)
            .bind(serde_json::to_value(mood_data)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
