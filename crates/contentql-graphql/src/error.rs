//! Error types for GraphQL operations.
//!
//! Schema build errors (duplicate or unresolvable types, invalid names) are
//! defects in the content model or in an extension and abort the build.
//! Validation and execution errors are user-facing and normally travel in
//! the `errors` list of a response instead.

use std::fmt;

use async_graphql::ErrorExtensions;
use contentql_core::{CoreError, RepositoryError};

/// Errors that can occur during GraphQL operations.
#[derive(Debug, Clone)]
pub enum GraphQLError {
    /// A repository was read before it was loaded.
    NotLoaded(String),

    /// Content store or repository failure.
    Repository(String),

    /// A type name was registered twice with different descriptors.
    DuplicateType {
        /// The conflicting type name.
        name: String,
    },

    /// The type loader was asked for a name that was never registered.
    UnresolvableType {
        /// The (namespace qualified) type name.
        name: String,
    },

    /// A handle is not a valid GraphQL type name.
    InvalidTypeName {
        /// The rejected name.
        name: String,
    },

    /// A descriptor was registered under a name other than its own.
    TypeNameMismatch {
        /// The name it was registered under.
        expected: String,
        /// The descriptor's own name.
        actual: String,
    },

    /// Schema build failed inside async-graphql.
    SchemaBuildFailed(String),

    /// Invalid query syntax.
    InvalidQuery(String),

    /// A field argument was rejected, e.g. a negative `limit`. Carried in
    /// the response `errors` with its message, never sanitized.
    QueryValidation(String),

    /// A field resolver failed.
    Execution {
        /// The original error message.
        message: String,
        /// Response path of the failing field, e.g. `entries.0.related`.
        path: String,
    },

    /// Internal server error.
    Internal(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded(msg) => {
                write!(f, "Content not loaded: {msg}")
            }
            Self::Repository(msg) => {
                write!(f, "Repository error: {msg}")
            }
            Self::DuplicateType { name } => {
                write!(f, "Type \"{name}\" is already registered")
            }
            Self::UnresolvableType { name } => {
                write!(f, "Type \"{name}\" could not be found")
            }
            Self::InvalidTypeName { name } => {
                write!(f, "\"{name}\" is not a valid GraphQL name")
            }
            Self::TypeNameMismatch { expected, actual } => {
                write!(
                    f,
                    "Type \"{actual}\" cannot be registered under the name \"{expected}\""
                )
            }
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::InvalidQuery(msg) => {
                write!(f, "Invalid GraphQL query: {msg}")
            }
            Self::QueryValidation(msg) => {
                write!(f, "Query validation failed: {msg}")
            }
            Self::Execution { message, path } => {
                if path.is_empty() {
                    write!(f, "Execution error: {message}")
                } else {
                    write!(f, "Execution error at {path}: {message}")
                }
            }
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidQuery(_) | Self::QueryValidation(_) => 400,
            Self::NotLoaded(_)
            | Self::Repository(_)
            | Self::DuplicateType { .. }
            | Self::UnresolvableType { .. }
            | Self::InvalidTypeName { .. }
            | Self::TypeNameMismatch { .. }
            | Self::SchemaBuildFailed(_)
            | Self::Execution { .. }
            | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotLoaded(_) => "NOT_LOADED",
            Self::Repository(_) => "REPOSITORY_ERROR",
            Self::DuplicateType { .. } => "DUPLICATE_TYPE",
            Self::UnresolvableType { .. } => "UNRESOLVABLE_TYPE",
            Self::InvalidTypeName { .. } => "INVALID_TYPE_NAME",
            Self::TypeNameMismatch { .. } => "TYPE_NAME_MISMATCH",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::QueryValidation(_) => "VALIDATION_ERROR",
            Self::Execution { .. } => "EXECUTION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error means the schema itself is broken.
    #[must_use]
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateType { .. }
                | Self::UnresolvableType { .. }
                | Self::InvalidTypeName { .. }
                | Self::TypeNameMismatch { .. }
                | Self::SchemaBuildFailed(_)
        )
    }

    /// Converts the error for a field resolver, tagging it with
    /// `extensions.code`.
    #[must_use]
    pub fn into_field_error(self) -> async_graphql::Error {
        let code = self.error_code();
        let message = match self {
            Self::QueryValidation(message) => message,
            other => other.to_string(),
        };
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }

    /// Converts the error to a GraphQL-style error body.
    #[must_use]
    pub fn to_response_body(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": [{
                "message": self.to_string(),
                "extensions": {
                    "code": self.error_code()
                }
            }]
        })
    }
}

impl From<RepositoryError> for GraphQLError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotLoaded { .. } => Self::NotLoaded(err.to_string()),
            RepositoryError::Core(core) => Self::from(core),
        }
    }
}

impl From<CoreError> for GraphQLError {
    fn from(err: CoreError) -> Self {
        Self::Repository(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentql_core::ContentCategory;

    #[test]
    fn test_into_field_error_keeps_argument_message() {
        let error = GraphQLError::QueryValidation("Argument \"limit\" must not be negative".into())
            .into_field_error();
        assert_eq!(error.message, "Argument \"limit\" must not be negative");
        let extensions = error.extensions.unwrap();
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("VALIDATION_ERROR"))
        );

        let error = GraphQLError::Internal("boom".into()).into_field_error();
        assert_eq!(error.message, "Internal error: boom");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GraphQLError::InvalidQuery("test".into()).status_code(), 400);
        assert_eq!(
            GraphQLError::QueryValidation("too deep".into()).status_code(),
            400
        );
        assert_eq!(
            GraphQLError::DuplicateType {
                name: "news".into()
            }
            .status_code(),
            500
        );
        assert_eq!(GraphQLError::Internal("test".into()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GraphQLError::UnresolvableType {
                name: "contentql::Missing".into()
            }
            .error_code(),
            "UNRESOLVABLE_TYPE"
        );
        assert_eq!(
            GraphQLError::Execution {
                message: "boom".into(),
                path: "entries".into()
            }
            .error_code(),
            "EXECUTION_ERROR"
        );
    }

    #[test]
    fn test_unresolvable_message() {
        let err = GraphQLError::UnresolvableType {
            name: "contentql::Missing".into(),
        };
        assert_eq!(
            err.to_string(),
            "Type \"contentql::Missing\" could not be found"
        );
        assert!(err.is_build_error());
    }

    #[test]
    fn test_from_repository_error() {
        let err: GraphQLError = RepositoryError::not_loaded(ContentCategory::Volume).into();
        assert!(matches!(err, GraphQLError::NotLoaded(_)));
        assert!(err.to_string().contains("volume repository"));

        let err: GraphQLError = RepositoryError::from(CoreError::store("offline")).into();
        assert!(matches!(err, GraphQLError::Repository(_)));
        assert!(!err.is_build_error());
    }

    #[test]
    fn test_response_body() {
        let body = GraphQLError::SchemaBuildFailed("bad".into()).to_response_body();
        assert_eq!(body["errors"][0]["extensions"]["code"], "SCHEMA_BUILD_FAILED");
        assert_eq!(
            body["errors"][0]["message"],
            "Failed to build GraphQL schema: bad"
        );
    }
}
