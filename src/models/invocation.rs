//! Envelopes exchanged with the hosting environment.
//!
//! - `InvocationEvent`: one inbound invocation (body plus transport metadata)
//! - `GraphqlRequestBody`: the decoded `body` string
//! - `QueryResult`: what gets serialized back into the response body
//! - `InvocationResponse`: the outbound envelope

use std::collections::HashMap;

use async_graphql::ServerError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Status code placed on every response envelope. Logical failures are
/// reported inside the body.
pub const SUCCESS_STATUS: u16 = 200;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl InvocationEvent {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GraphqlRequestBody {
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,
    #[serde(default)]
    pub variables: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub operation_name: Option<String>,
}

/// Either `{ "data": ... }`, `{ "errors": [...] }`, or both for a partial
/// result.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ServerError>,
}

impl QueryResult {
    pub fn from_response(response: async_graphql::Response) -> serde_json::Result<Self> {
        let data = response.data.into_json()?;
        Ok(Self {
            data: (!data.is_null()).then_some(data),
            errors: response.errors,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status_code: SUCCESS_STATUS,
            body,
        }
    }
}
