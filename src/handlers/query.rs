use async_graphql::Variables;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::graphql::MoodSchema;
use crate::models::invocation::{
    GraphqlRequestBody, InvocationEvent, InvocationResponse, QueryResult,
};
use crate::AppState;

/// Runs one invocation: decode the body, execute it, wrap the result.
///
/// Query and resolver failures land in the body's `errors` and the status
/// stays 200. A body that is missing, not JSON, or not a query object is
/// returned as [`AppError::MalformedRequest`] before the schema is touched.
pub async fn handle_invocation(
    schema: &MoodSchema,
    event: InvocationEvent,
) -> AppResult<InvocationResponse> {
    let span = tracing::info_span!("invocation", request_id = %Uuid::new_v4());
    async move {
        tracing::debug!(event = ?event, "Received invocation");

        let request = parse_body(event.body.as_deref())?;
        let result = QueryResult::from_response(schema.execute(request).await)?;

        if !result.errors.is_empty() {
            tracing::warn!(errors = result.errors.len(), "Query finished with errors");
        }
        let body = serde_json::to_string(&result)?;
        tracing::debug!(body = %body, "Invocation result");

        Ok::<_, AppError>(InvocationResponse::ok(body))
    }
    .instrument(span)
    .await
}

fn parse_body(body: Option<&str>) -> AppResult<async_graphql::Request> {
    let body = body.ok_or_else(|| AppError::MalformedRequest("request body is missing".into()))?;

    let parsed: GraphqlRequestBody = serde_json::from_str(body)
        .map_err(|e| AppError::MalformedRequest(format!("invalid request body: {e}")))?;
    parsed
        .validate()
        .map_err(|e| AppError::MalformedRequest(e.to_string()))?;

    let mut request = async_graphql::Request::new(parsed.query);
    if let Some(variables) = parsed.variables {
        request = request.variables(Variables::from_json(serde_json::Value::Object(variables)));
    }
    if let Some(operation_name) = parsed.operation_name {
        request = request.operation_name(operation_name);
    }
    Ok(request)
}

/// POST /invoke: takes the full envelope, returns the full envelope.
pub async fn invoke(
    State(state): State<AppState>,
    payload: Result<Json<InvocationEvent>, JsonRejection>,
) -> AppResult<Json<InvocationResponse>> {
    let Json(event) = payload.map_err(|rejection| {
        AppError::MalformedRequest(format!("invalid envelope: {}", rejection.body_text()))
    })?;
    let response = handle_invocation(&state.schema, event).await?;
    Ok(Json(response))
}

/// POST /graphql: takes the query object as the raw body and answers with
/// the result JSON directly.
pub async fn graphql(State(state): State<AppState>, body: String) -> AppResult<Response> {
    let response = handle_invocation(&state.schema, InvocationEvent::with_body(body)).await?;
    Ok((StatusCode::OK, [(CONTENT_TYPE, "application/json")], response.body).into_response())
}

/// GET /graphql/schema
pub async fn schema_sdl(State(state): State<AppState>) -> String {
    state.schema.sdl()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::db::{MemoryMoodStore, MoodRepository, PgMoodStore};
    use crate::graphql::build_schema;

    fn schema() -> MoodSchema {
        build_schema(MoodRepository::new(Arc::new(MemoryMoodStore::new())))
    }

    fn event(query: &str) -> InvocationEvent {
        InvocationEvent::with_body(json!({ "query": query }).to_string())
    }

    async fn invoke_ok(schema: &MoodSchema, event: InvocationEvent) -> Value {
        let response = handle_invocation(schema, event).await.unwrap();
        assert_eq!(response.status_code, 200);
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_alice_scenario() {
        let schema = schema();

        invoke_ok(
            &schema,
            event(r#"mutation { createMoodData(user: "alice", moodData: [{entryDate: "2024-01-01", status: "ok"}]) { entryDate status } }"#),
        )
        .await;

        let read = invoke_ok(&schema, event(r#"{ moodData(user: "alice") { entryDate status } }"#)).await;
        assert_eq!(
            read,
            json!({ "data": { "moodData": [{ "entryDate": "2024-01-01", "status": "ok" }] } })
        );

        let replaced = invoke_ok(
            &schema,
            event(r#"mutation { updateMoodData(user: "alice", moodData: []) { status } }"#),
        )
        .await;
        assert_eq!(replaced, json!({ "data": { "updateMoodData": [] } }));

        let read = invoke_ok(&schema, event(r#"{ moodData(user: "alice") { status } }"#)).await;
        assert_eq!(read, json!({ "data": { "moodData": [] } }));
    }

    #[tokio::test]
    async fn test_unknown_field_yields_errors_with_status_200() {
        let body = invoke_ok(&schema(), event(r#"{ moodData(user: "a", since: "x") { status } }"#)).await;

        let errors = body["errors"].as_array().unwrap();
        assert!(!errors.is_empty());
        assert!(errors[0]["message"].is_string());
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_variables_and_operation_name() {
        let schema = schema();
        let body = json!({
            "query": r#"
                mutation Save($user: String!, $entries: [MoodEntryInput!]) {
                    createMoodData(user: $user, moodData: $entries) { status }
                }
                query Load($user: String!) { moodData(user: $user) { entryDate status } }
            "#,
            "variables": { "user": "hana", "entries": [{ "entryDate": "2024-06-01", "status": "calm" }] },
            "operationName": "Save"
        });
        invoke_ok(&schema, InvocationEvent::with_body(body.to_string())).await;

        let body = json!({
            "query": r#"query Load($user: String!) { moodData(user: $user) { entryDate status } }"#,
            "variables": { "user": "hana" }
        });
        let read = invoke_ok(&schema, InvocationEvent::with_body(body.to_string())).await;
        assert_eq!(
            read["data"]["moodData"],
            json!([{ "entryDate": "2024-06-01", "status": "calm" }])
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let result = handle_invocation(&schema(), InvocationEvent::with_body("not json")).await;
        assert!(matches!(result, Err(AppError::MalformedRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_body_is_malformed() {
        let result = handle_invocation(&schema(), InvocationEvent::default()).await;
        assert!(matches!(result, Err(AppError::MalformedRequest(_))));
    }

    #[tokio::test]
    async fn test_body_without_query_is_malformed() {
        let result =
            handle_invocation(&schema(), InvocationEvent::with_body(r#"{"q":"{ x }"}"#)).await;
        assert!(matches!(result, Err(AppError::MalformedRequest(_))));

        let result = handle_invocation(&schema(), InvocationEvent::with_body(r#"{"query":""}"#)).await;
        assert!(matches!(result, Err(AppError::MalformedRequest(_))));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_in_errors() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/moodlog_unused")
            .unwrap();
        let store = PgMoodStore::new(pool, None).unwrap();
        let schema = build_schema(MoodRepository::new(Arc::new(store)));

        let body = invoke_ok(&schema, event(r#"{ moodData(user: "alice") { status } }"#)).await;

        let message = body["errors"][0]["message"].as_str().unwrap();
        assert!(message.contains("not configured"), "got: {message}");
    }
}
