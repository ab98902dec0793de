//! Query execution.
//!
//! Runs a query against a [`ContentSchema`]: `@date` directives are stripped,
//! async-graphql parses, validates (depth and complexity included) and
//! executes, then dates are formatted and resolver errors are shaped for the
//! runtime mode.

use async_graphql::{PathSegment, Request, Response, ServerError, Variables};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::context::ContentContext;
use crate::error::GraphQLError;
use crate::schema::{ContentSchema, PreparedQuery};

/// Message that replaces resolver errors outside development mode.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// A query with its operation name and variables.
#[derive(Debug, Clone, Default)]
pub struct ContentRequest {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: Variables,
}

impl ContentRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }
}

/// Outcome of an execution: `{data, errors}`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ServerError>,
}

impl ExecutionResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages of all errors, in order.
    #[must_use]
    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

/// Executes `request` against `schema`.
///
/// # Errors
///
/// In development mode, the first resolver error is returned as
/// [`GraphQLError::Execution`]. Validation errors never fail the call; they
/// travel in [`ExecutionResult::errors`].
#[instrument(skip_all, fields(operation = request.operation_name.as_deref()))]
pub async fn execute(
    schema: &ContentSchema,
    context: ContentContext,
    request: ContentRequest,
    dev_mode: bool,
) -> Result<ExecutionResult, GraphQLError> {
    let prepared = PreparedQuery::prepare(&request.query);

    let mut gql_request = Request::new(prepared.query()).variables(request.variables.clone());
    if let Some(name) = &request.operation_name {
        gql_request = gql_request.operation_name(name.clone());
    }
    gql_request = gql_request.data(context);

    debug!(query = %request.query, "Executing GraphQL query");
    let mut response = schema.inner().execute(gql_request).await;

    if prepared.has_dates() {
        prepared.apply(
            &mut response,
            schema.registry(),
            request.operation_name.as_deref(),
            &request.variables,
        );
    }

    shape_response(response, dev_mode)
}

/// Argument errors raised by resolvers, which reach the caller unchanged.
fn is_argument_error(error: &ServerError) -> bool {
    let code = GraphQLError::QueryValidation(String::new()).error_code();
    error
        .extensions
        .as_ref()
        .and_then(|extensions| extensions.get("code"))
        .is_some_and(|value| *value == async_graphql::Value::from(code))
}

/// Errors from a failing resolver: they carry a path and are not argument
/// errors.
fn is_internal_error(error: &ServerError) -> bool {
    !error.path.is_empty() && !is_argument_error(error)
}

fn shape_response(mut response: Response, dev_mode: bool) -> Result<ExecutionResult, GraphQLError> {
    if dev_mode {
        if let Some(error) = response.errors.iter().find(|e| is_internal_error(e)) {
            return Err(GraphQLError::Execution {
                message: error.message.clone(),
                path: path_string(&error.path),
            });
        }
    } else {
        for error in response.errors.iter_mut().filter(|e| is_internal_error(e)) {
            warn!(
                path = %path_string(&error.path),
                error = %error.message,
                "Resolver failed"
            );
            error.message = INTERNAL_ERROR_MESSAGE.to_string();
            error.source = None;
            error.extensions = None;
        }
    }

    let data = response.data.into_json().unwrap_or(serde_json::Value::Null);
    Ok(ExecutionResult {
        data,
        errors: response.errors,
    })
}

/// Renders a response path as `entries.0.related`.
fn path_string(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Field(name) => name.clone(),
            PathSegment::Index(index) => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{Pos, Value};

    fn response_with(errors: Vec<ServerError>) -> Response {
        let mut response = Response::new(Value::from_json(serde_json::json!({"ping": "pong"})).unwrap());
        response.errors = errors;
        response
    }

    fn resolver_error(message: &str) -> ServerError {
        let mut error = ServerError::new(message, Some(Pos { line: 1, column: 3 }));
        error.path = vec![
            PathSegment::Field("entries".into()),
            PathSegment::Index(0),
            PathSegment::Field("related".into()),
        ];
        error
    }

    #[test]
    fn test_path_string() {
        assert_eq!(path_string(&resolver_error("x").path), "entries.0.related");
        assert_eq!(path_string(&[]), "");
    }

    #[test]
    fn test_production_sanitizes_resolver_errors() {
        let validation = ServerError::new("Query is nested too deep.", None);
        let response = response_with(vec![resolver_error("store offline"), validation]);

        let result = shape_response(response, false).unwrap();
        assert_eq!(
            result.error_messages(),
            vec![INTERNAL_ERROR_MESSAGE, "Query is nested too deep."]
        );
        assert_eq!(result.data["ping"], "pong");
        assert_eq!(result.errors[0].path.len(), 3);
    }

    #[test]
    fn test_development_returns_first_resolver_error() {
        let response = response_with(vec![
            ServerError::new("unrelated", None),
            resolver_error("store offline"),
        ]);

        let err = shape_response(response, true).unwrap_err();
        assert!(matches!(
            err,
            GraphQLError::Execution { message, path }
                if message == "store offline" && path == "entries.0.related"
        ));
    }

    fn argument_error() -> ServerError {
        let mut error = GraphQLError::QueryValidation("Argument \"limit\" must not be negative".into())
            .into_field_error()
            .into_server_error(Pos { line: 1, column: 3 });
        error.path = vec![PathSegment::Field("entries".into())];
        error
    }

    #[test]
    fn test_argument_errors_are_never_sanitized() {
        let result = shape_response(response_with(vec![argument_error()]), false).unwrap();
        assert_eq!(
            result.error_messages(),
            vec!["Argument \"limit\" must not be negative"]
        );
        assert!(result.errors[0].extensions.is_some());

        let result = shape_response(response_with(vec![argument_error()]), true).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert!(is_argument_error(&result.errors[0]));
    }

    #[test]
    fn test_development_keeps_validation_errors() {
        let response = response_with(vec![ServerError::new("Query is too complex.", None)]);
        let result = shape_response(response, true).unwrap();
        assert_eq!(result.error_messages(), vec!["Query is too complex."]);
        assert!(!result.is_ok());
    }

    #[test]
    fn test_request_builder() {
        let request = ContentRequest::new("{ ping }").with_operation_name("Ping");
        assert_eq!(request.query, "{ ping }");
        assert_eq!(request.operation_name.as_deref(), Some("Ping"));
        assert!(request.variables.is_empty());
    }
}
