use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{MoodStore, StoreError};
use crate::models::mood::{MoodEntry, MoodRecord};

/// In-process store for single-instance development and tests.
/// Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryMoodStore {
    records: Arc<RwLock<HashMap<String, MoodRecord>>>,
}

impl MemoryMoodStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MoodStore for MemoryMoodStore {
    async fn get(&self, user: &str) -> Result<Option<MoodRecord>, StoreError> {
        Ok(self.records.read().await.get(user).cloned())
    }

    async fn put(&self, record: &MoodRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.user.clone(), record.clone());
        Ok(())
    }

    async fn update_mood_data(
        &self,
        user: &str,
        mood_data: &[Option<MoodEntry>],
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records
            .entry(user.to_owned())
            .and_modify(|record| record.mood_data = mood_data.to_vec())
            .or_insert_with(|| MoodRecord {
                user: user.to_owned(),
                mood_data: mood_data.to_vec(),
            });
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
