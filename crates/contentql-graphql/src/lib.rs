//! # contentql-graphql
//!
//! GraphQL API layer for ContentQL.
//!
//! The schema is not known at compile time: it is assembled from the host's
//! content model every time [`GraphQLService::schema`] is called, so adding a
//! section or a tag group shows up in the next schema without a restart.
//!
//! ## Overview
//!
//! Each build creates a fresh [`TypeRegistry`]. Type factories translate
//! content definitions into [`TypeDescriptor`]s and register them under their
//! handle; the assembler then resolves every referenced type through the
//! registry's type loader and hands the result to async-graphql's dynamic
//! schema API.
//!
//! ## Endpoints
//!
//! - `POST /graphql` - GraphQL endpoint
//! - `GET /graphql` - GraphQL (query via URL param)
//!
//! ## Configuration
//!
//! ```toml
//! [graphql]
//! enabled = true
//! max_query_depth = 10
//! max_query_complexity = false
//! introspection = true
//! dev_mode = false
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`registry`] - Per-build type registry and type descriptors
//! - [`factories`] - Content definition to GraphQL type translation
//! - [`types`] - Content-independent types (interfaces, scalars, enums)
//! - [`schema`] - Schema assembly, the Query root and the `@date` directive
//! - [`service`] - Bootstrap, schema builds and execution entry points
//! - [`handler`] - Axum HTTP handlers
//! - [`error`] - Error types for GraphQL operations

pub mod config;
pub mod context;
pub mod error;
pub mod execution;
pub mod factories;
pub mod handler;
pub mod loaders;
pub mod registry;
pub mod resolvers;
pub mod schema;
pub mod service;
pub mod token;
pub mod types;

// Re-export main types
pub use config::GraphQLConfig;
pub use context::{ContentContext, ContentContextBuilder};
pub use error::GraphQLError;
pub use execution::{ContentRequest, ExecutionResult};
pub use handler::{GraphQLState, graphql_handler, graphql_handler_get};
pub use registry::{TypeDescriptor, TypeRegistry};
pub use schema::{
    AssemblerConfig, ContentSchema, QueryBuilder, QuerySafetyLimits, QuerySchemaHook,
    SchemaAssembler,
};
pub use service::GraphQLService;
pub use token::{AccessToken, Scope};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
