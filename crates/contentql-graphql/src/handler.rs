//! Axum HTTP handlers for GraphQL endpoints.
//!
//! - `POST /graphql` - JSON body `{query, operationName, variables}`
//! - `GET /graphql` - query, operation name and variables as URL params
//!
//! The caller's [`AccessToken`] is read from request extensions, where
//! authentication middleware puts it. Without one, the public token is used.

use std::sync::Arc;

use async_graphql::Variables;
use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::error::GraphQLError;
use crate::execution::ContentRequest;
use crate::service::GraphQLService;
use crate::token::AccessToken;

/// State shared across GraphQL handlers.
#[derive(Clone)]
pub struct GraphQLState {
    pub service: Arc<GraphQLService>,
}

impl GraphQLState {
    #[must_use]
    pub fn new(service: GraphQLService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// GraphQL request body.
#[derive(Debug, Deserialize)]
pub struct GraphQLRequest {
    pub query: String,

    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    pub variables: Option<serde_json::Value>,
}

/// Query parameters for GET requests.
#[derive(Debug, Deserialize)]
pub struct GraphQLQueryParams {
    pub query: Option<String>,

    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Variables as a JSON string.
    pub variables: Option<String>,
}

/// Handles `POST /graphql`.
pub async fn graphql_handler(
    State(state): State<GraphQLState>,
    token: Option<Extension<AccessToken>>,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    let token = token.map(|Extension(t)| t).unwrap_or_default();
    debug!(token = %token.id, "Processing GraphQL request");
    execute_graphql(&state, token, &headers, request).await
}

/// Handles `GET /graphql`.
pub async fn graphql_handler_get(
    State(state): State<GraphQLState>,
    token: Option<Extension<AccessToken>>,
    headers: HeaderMap,
    Query(params): Query<GraphQLQueryParams>,
) -> Response {
    let request = match params_to_request(params) {
        Ok(request) => request,
        Err(e) => {
            return error_response(&GraphQLError::InvalidQuery(format!(
                "variables are not valid JSON: {e}"
            )));
        }
    };

    let token = token.map(|Extension(t)| t).unwrap_or_default();
    debug!(token = %token.id, "Processing GraphQL GET request");
    execute_graphql(&state, token, &headers, request).await
}

async fn execute_graphql(
    state: &GraphQLState,
    token: AccessToken,
    headers: &HeaderMap,
    request: GraphQLRequest,
) -> Response {
    let service = &state.service;

    let schema = match service.schema(&token) {
        Ok(schema) => schema,
        Err(e) => {
            error!(token = %token.id, error = %e, "GraphQL schema build failed");
            return error_response(&e);
        }
    };

    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut content_request = ContentRequest::new(request.query);
    if let Some(name) = request.operation_name {
        content_request = content_request.with_operation_name(name);
    }
    if let Some(variables) = request.variables {
        content_request = content_request.with_variables(Variables::from_json(variables));
    }

    match service
        .execute_request(&schema, content_request, request_id)
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            Json(result),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "GraphQL execution failed");
            error_response(&e)
        }
    }
}

/// Converts GET query params to a GraphQL request.
fn params_to_request(params: GraphQLQueryParams) -> Result<GraphQLRequest, serde_json::Error> {
    let variables = match params.variables {
        Some(raw) if !raw.is_empty() => Some(serde_json::from_str(&raw)?),
        _ => None,
    };

    Ok(GraphQLRequest {
        query: params.query.unwrap_or_default(),
        operation_name: params.operation_name,
        variables,
    })
}

fn error_response(error: &GraphQLError) -> Response {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error.to_response_body()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_request_deserialize() {
        let json = r#"{
            "query": "query Latest { entries(limit: 1) { title } }",
            "operationName": "Latest",
            "variables": {"section": ["news"]}
        }"#;

        let request: GraphQLRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.operation_name.as_deref(), Some("Latest"));
        assert!(request.variables.is_some());
    }

    #[test]
    fn test_graphql_request_minimal() {
        let request: GraphQLRequest = serde_json::from_str(r#"{"query": "{ ping }"}"#).unwrap();
        assert_eq!(request.query, "{ ping }");
        assert!(request.operation_name.is_none());
        assert!(request.variables.is_none());
    }

    #[test]
    fn test_params_to_request() {
        let params = GraphQLQueryParams {
            query: Some("{ ping }".to_string()),
            operation_name: None,
            variables: Some(r#"{"limit": 2}"#.to_string()),
        };

        let request = params_to_request(params).unwrap();
        assert_eq!(request.query, "{ ping }");
        assert_eq!(request.variables.unwrap()["limit"], 2);
    }

    #[test]
    fn test_params_to_request_empty_variables() {
        let params = GraphQLQueryParams {
            query: None,
            operation_name: None,
            variables: Some(String::new()),
        };

        let request = params_to_request(params).unwrap();
        assert_eq!(request.query, "");
        assert!(request.variables.is_none());
    }

    #[test]
    fn test_params_to_request_invalid_variables() {
        let params = GraphQLQueryParams {
            query: Some("{ ping }".to_string()),
            operation_name: None,
            variables: Some("not valid json".to_string()),
        };
        assert!(params_to_request(params).is_err());
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(&GraphQLError::InvalidQuery("bad".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(&GraphQLError::DuplicateType {
            name: "news".into(),
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
