//! GraphQL surface: one query field and two mutation fields over the
//! per-user mood record. Field, argument and type checking is left to
//! `async-graphql`; resolvers only forward to [`MoodRepository`].

use async_graphql::{Context, EmptySubscription, Object, Schema};

use crate::db::{MoodRepository, StoreError};
use crate::models::mood::MoodData;

pub type MoodSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Built once at startup and cloned into each request.
pub fn build_schema(repository: MoodRepository) -> MoodSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(repository)
        .finish()
}

pub struct QueryRoot;

#[Object(name = "RootQueryType")]
impl QueryRoot {
    /// Entries last written for `user`, or an empty list if none were.
    async fn mood_data(
        &self,
        ctx: &Context<'_>,
        user: String,
    ) -> async_graphql::Result<Option<MoodData>> {
        let repository = ctx.data::<MoodRepository>()?;
        repository
            .read_mood_data(&user)
            .await
            .map(Some)
            .map_err(|e| store_failure("moodData", &user, e))
    }
}

pub struct MutationRoot;

#[Object(name = "RootMutationType")]
impl MutationRoot {
    /// Sets the user's entries, creating the record when absent.
    async fn update_mood_data(
        &self,
        ctx: &Context<'_>,
        user: String,
        mood_data: Option<MoodData>,
    ) -> async_graphql::Result<Option<MoodData>> {
        let repository = ctx.data::<MoodRepository>()?;
        repository
            .replace_mood_data(&user, mood_data.unwrap_or_default())
            .await
            .map(Some)
            .map_err(|e| store_failure("updateMoodData", &user, e))
    }

    /// Writes the whole record, overwriting any existing one.
    async fn create_mood_data(
        &self,
        ctx: &Context<'_>,
        user: String,
        mood_data: Option<MoodData>,
    ) -> async_graphql::Result<Option<MoodData>> {
        let repository = ctx.data::<MoodRepository>()?;
        repository
            .create_mood_data(&user, mood_data.unwrap_or_default())
            .await
            .map(Some)
            .map_err(|e| store_failure("createMoodData", &user, e))
    }
}

fn store_failure(operation: &str, user: &str, error: StoreError) -> async_graphql::Error {
    tracing::error!(operation = %operation, user = %user, error = %error, "Mood store call failed");
    async_graphql::Error::new(error.client_message())
}
