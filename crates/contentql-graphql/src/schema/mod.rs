//! Schema assembly.
//!
//! A schema is assembled per request from the current content snapshot:
//!
//! 1. A fresh [`TypeRegistry`] is created, scoped to the caller's token
//! 2. The Query root is built and every [`QuerySchemaHook`] may alter it
//! 3. Definition types are registered under their handles
//! 4. Every referenced name is resolved through the type loader and the
//!    result is handed to async-graphql
//!
//! ## Components
//!
//! - [`SchemaAssembler`] - Runs the steps above
//! - [`QueryBuilder`] - Mutable Query root handed to hooks
//! - [`ContentSchema`] - The finished schema with its registry
//! - [`directives`] - The `@date` directive

mod assembler;
pub mod directives;
mod hooks;
pub mod query;

pub use assembler::SchemaAssembler;
pub use directives::{DATE_DIRECTIVE_SDL, PreparedQuery, SUPPORTED_DIRECTIVES};
pub use hooks::QuerySchemaHook;
pub use query::{QUERY, QueryBuilder};

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use contentql_core::ContentSnapshot;

use crate::error::GraphQLError;
use crate::registry::{TypeDescriptor, TypeRegistry};
use crate::token::AccessToken;

/// Default namespace of type names in diagnostics.
pub const NAMESPACE: &str = "contentql";

/// Validation thresholds applied to every schema.
///
/// `None` disables a limit. Fixed at bootstrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuerySafetyLimits {
    pub max_depth: Option<usize>,
    pub max_complexity: Option<usize>,
}

/// Settings shared by every schema build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblerConfig {
    pub limits: QuerySafetyLimits,
    pub introspection_enabled: bool,
    /// Development mode: resolver errors keep their detail and fail the
    /// execution instead of being sanitized.
    pub dev_mode: bool,
}

/// A finished schema together with the registry it was resolved from.
#[derive(Clone)]
pub struct ContentSchema {
    schema: Schema,
    registry: Arc<TypeRegistry>,
    types: Vec<Arc<TypeDescriptor>>,
    type_list: Vec<String>,
    snapshot: ContentSnapshot,
    token: AccessToken,
}

impl ContentSchema {
    pub(crate) fn new(
        schema: Schema,
        registry: TypeRegistry,
        types: Vec<Arc<TypeDescriptor>>,
        type_list: Vec<String>,
        snapshot: ContentSnapshot,
    ) -> Self {
        let token = registry.token().clone();
        Self {
            schema,
            registry: Arc::new(registry),
            types,
            type_list,
            snapshot,
            token,
        }
    }

    /// The async-graphql schema.
    #[must_use]
    pub fn inner(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Descriptors of every type in the schema, Query first.
    #[must_use]
    pub fn types(&self) -> &[Arc<TypeDescriptor>] {
        &self.types
    }

    /// The exported type list of the build.
    #[must_use]
    pub fn type_list(&self) -> &[String] {
        &self.type_list
    }

    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.registry.get_type(name)
    }

    /// Resolves a type by name through the build's type loader.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvableType` for names the build never registered.
    pub fn load_type(&self, name: &str) -> Result<Arc<TypeDescriptor>, GraphQLError> {
        self.registry.load_type(name)
    }

    /// The content snapshot the schema was built from.
    #[must_use]
    pub fn snapshot(&self) -> &ContentSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Names of the supported directives.
    #[must_use]
    pub fn directives(&self) -> &'static [&'static str] {
        &SUPPORTED_DIRECTIVES
    }

    /// Schema SDL, including the `@date` directive definition.
    #[must_use]
    pub fn sdl(&self) -> String {
        let mut sdl = self.schema.sdl();
        sdl.push_str(DATE_DIRECTIVE_SDL);
        sdl
    }
}

impl std::fmt::Debug for ContentSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSchema")
            .field("token", &self.token.id)
            .field("types", &self.types.len())
            .field("type_list", &self.type_list)
            .finish_non_exhaustive()
    }
}
