use async_graphql::{InputObject, SimpleObject};
use serde::{Deserialize, Serialize};

/// One dated status label. Both fields are opaque and stored as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, SimpleObject, InputObject)]
#[graphql(input_name = "MoodEntryInput")]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub entry_date: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
impl MoodEntry {
    pub fn new(entry_date: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            entry_date: Some(entry_date.into()),
            status: Some(status.into()),
        }
    }
}

/// Entries as written by the caller. Null elements are kept in place.
pub type MoodData = Vec<Option<MoodEntry>>;

/// The single stored item for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodRecord {
    pub user: String,
    pub mood_data: MoodData,
}
