//! Record storage for per-user mood data.
//!
//! [`MoodStore`] is the key-value seam: one item per `user`, read with
//! `get`, overwritten whole with `put`, or patched on its single attribute
//! with `update_mood_data`. [`MoodRepository`] shapes domain calls into
//! those primitives.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::mood::{MoodData, MoodEntry, MoodRecord};

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryMoodStore;
pub use postgres::PgMoodStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Mood table is not configured")]
    TableNotConfigured,

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Mood data could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StoreError {
    /// Text safe to hand back to callers. Backend details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            StoreError::TableNotConfigured | StoreError::InvalidTableName(_) => self.to_string(),
            StoreError::Database(_) | StoreError::Codec(_) => "Internal server error".into(),
        }
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
pub trait MoodStore: Send + Sync {
    async fn get(&self, user: &str) -> Result<Option<MoodRecord>, StoreError>;

    /// Writes the full item, replacing any existing one for the same user.
    async fn put(&self, record: &MoodRecord) -> Result<(), StoreError>;

    /// Sets the `moodData` attribute, creating the item when absent.
    async fn update_mood_data(
        &self,
        user: &str,
        mood_data: &[Option<MoodEntry>],
    ) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub type SharedMoodStore = Arc<dyn MoodStore>;

#[derive(Clone)]
pub struct MoodRepository {
    store: SharedMoodStore,
}

impl MoodRepository {
    pub fn new(store: SharedMoodStore) -> Self {
        Self { store }
    }

    /// A user with no record reads as an empty sequence.
    pub async fn read_mood_data(&self, user: &str) -> Result<MoodData, StoreError> {
        match self.store.get(user).await? {
            Some(record) => Ok(record.mood_data),
            None => {
                tracing::debug!(user = %user, "No mood record yet, returning empty sequence");
                Ok(Vec::new())
            }
        }
    }

    pub async fn replace_mood_data(
        &self,
        user: &str,
        mood_data: MoodData,
    ) -> Result<MoodData, StoreError> {
        self.store.update_mood_data(user, &mood_data).await?;
        Ok(mood_data)
    }

    pub async fn create_mood_data(
        &self,
        user: &str,
        mood_data: MoodData,
    ) -> Result<MoodData, StoreError> {
        let record = MoodRecord {
            user: user.to_owned(),
            mood_data,
        };
        self.store.put(&record).await?;
        Ok(record.mood_data)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> MoodRepository {
        MoodRepository::new(Arc::new(MemoryMoodStore::new()))
    }

    #[test]
    fn test_table_name_validation() {
        assert!(is_valid_table_name("mood_data"));
        assert!(is_valid_table_name("_moods2"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("2moods"));
        assert!(!is_valid_table_name("moods; DROP TABLE users"));
        assert!(!is_valid_table_name("mood\"data"));
        assert!(!is_valid_table_name(&"a".repeat(64)));
    }

    #[test]
    fn test_client_message_hides_backend_details() {
        assert_eq!(
            StoreError::TableNotConfigured.client_message(),
            "Mood table is not configured"
        );

        let codec = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert_eq!(StoreError::Codec(codec).client_message(), "Internal server error");

        let database = StoreError::Database(sqlx::Error::RowNotFound);
        assert_eq!(database.client_message(), "Internal server error");
    }

    #[tokio::test]
    async fn test_read_without_record_is_empty() {
        let repo = repository();
        assert!(repo.read_mood_data("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_returns_input_and_reads_back() {
        let repo = repository();
        let entries = vec![
            Some(MoodEntry::new("2024-01-01", "ok")),
            Some(MoodEntry::new("2024-01-02", "great")),
        ];

        let returned = repo.create_mood_data("alice", entries.clone()).await.unwrap();
        assert_eq!(returned, entries);
        assert_eq!(repo.read_mood_data("alice").await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_replace_on_first_write_creates_record() {
        let repo = repository();
        let entries = vec![Some(MoodEntry::new("2024-03-01", "meh"))];

        let returned = repo.replace_mood_data("bob", entries.clone()).await.unwrap();
        assert_eq!(returned, entries);
        assert_eq!(repo.read_mood_data("bob").await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_replace_overwrites_without_merging() {
        let repo = repository();
        repo.create_mood_data(
            "alice",
            vec![Some(MoodEntry::new("2024-01-01", "ok")), Some(MoodEntry::new("2024-01-02", "ok"))],
        )
        .await
        .unwrap();

        let replacement = vec![Some(MoodEntry::new("2024-02-01", "bad"))];
        repo.replace_mood_data("alice", replacement.clone()).await.unwrap();

        assert_eq!(repo.read_mood_data("alice").await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_round_trip_keeps_empty_strings_nulls_and_duplicates() {
        let repo = repository();
        let entries = vec![
            Some(MoodEntry::new("", "")),
            Some(MoodEntry::default()),
            None,
            Some(MoodEntry::new("2024-01-01", "ok")),
            Some(MoodEntry::new("2024-01-01", "ok")),
        ];

        repo.create_mood_data("carol", entries.clone()).await.unwrap();
        assert_eq!(repo.read_mood_data("carol").await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_create_then_replace_with_empty_sequence() {
        let repo = repository();
        let entries = vec![Some(MoodEntry::new("2024-01-01", "ok"))];

        repo.create_mood_data("alice", entries.clone()).await.unwrap();
        assert_eq!(repo.read_mood_data("alice").await.unwrap(), entries);

        let returned = repo.replace_mood_data("alice", Vec::new()).await.unwrap();
        assert!(returned.is_empty());
        assert!(repo.read_mood_data("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let repo = repository();
        repo.create_mood_data("alice", vec![Some(MoodEntry::new("2024-01-01", "ok"))])
            .await
            .unwrap();

        assert!(repo.read_mood_data("bob").await.unwrap().is_empty());
    }
}
