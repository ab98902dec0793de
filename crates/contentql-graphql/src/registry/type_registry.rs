//! Per-build type registry.
//!
//! The registry maps type names to descriptors for the lifetime of one schema
//! build. Each name can be bound to exactly one descriptor instance:
//! registering the same `Arc` again is a no-op, registering a different one
//! fails with [`GraphQLError::DuplicateType`].

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::Regex;
use tracing::trace;

use super::descriptor::{BUILTIN_SCALARS, TypeDescriptor};
use crate::error::GraphQLError;
use crate::token::AccessToken;

/// GraphQL name pattern.
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("Invalid name regex"));

/// Checks if a name is valid for GraphQL.
///
/// Names starting with `__` are reserved for introspection.
#[must_use]
pub fn is_valid_graphql_name(name: &str) -> bool {
    NAME_REGEX.is_match(name) && !name.starts_with("__")
}

/// Builder record of a root type.
///
/// Tracks the concrete object types reachable through the root's polymorphic
/// fields, so they can be appended to the exported type list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeBuilder {
    pub name: String,
    pub concrete_types: Vec<String>,
}

/// Name to descriptor map of one schema build.
#[derive(Debug)]
pub struct TypeRegistry {
    token: AccessToken,
    namespace: Option<String>,
    types: IndexMap<String, Arc<TypeDescriptor>>,
    builders: IndexMap<String, TypeBuilder>,
}

impl TypeRegistry {
    /// Creates an empty registry scoped to `token`.
    #[must_use]
    pub fn new(token: AccessToken) -> Self {
        Self {
            token,
            namespace: None,
            types: IndexMap::new(),
            builders: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Sets the default namespace used to qualify unqualified names.
    pub fn register_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = Some(namespace.into());
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Qualifies `name` with the default namespace, unless it already is.
    #[must_use]
    pub fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(namespace) if !name.contains("::") => format!("{namespace}::{name}"),
            _ => name.to_string(),
        }
    }

    /// Binds `name` to `descriptor`.
    ///
    /// # Errors
    ///
    /// - `InvalidTypeName` if `name` is not a GraphQL name
    /// - `TypeNameMismatch` if the descriptor carries a different name
    /// - `DuplicateType` if `name` is bound to another descriptor instance or
    ///   is one of the built-in scalars
    pub fn register_type(
        &mut self,
        name: &str,
        descriptor: Arc<TypeDescriptor>,
    ) -> Result<(), GraphQLError> {
        if !is_valid_graphql_name(name) {
            return Err(GraphQLError::InvalidTypeName {
                name: name.to_string(),
            });
        }
        if descriptor.name() != name {
            return Err(GraphQLError::TypeNameMismatch {
                expected: name.to_string(),
                actual: descriptor.name().to_string(),
            });
        }

        if BUILTIN_SCALARS.contains(&name) {
            return Err(GraphQLError::DuplicateType {
                name: name.to_string(),
            });
        }

        if let Some(existing) = self.types.get(name) {
            if Arc::ptr_eq(existing, &descriptor) {
                return Ok(());
            }
            return Err(GraphQLError::DuplicateType {
                name: name.to_string(),
            });
        }

        trace!(name = %name, kind = descriptor.kind(), "Registered type");
        self.types.insert(name.to_string(), descriptor);
        Ok(())
    }

    /// Returns the descriptor bound to `name`, if any.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).cloned()
    }

    /// Type loader: like [`get_type`](Self::get_type) but a missing name is
    /// a hard failure.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvableType` with the namespace qualified name.
    pub fn load_type(&self, name: &str) -> Result<Arc<TypeDescriptor>, GraphQLError> {
        self.get_type(name)
            .ok_or_else(|| GraphQLError::UnresolvableType {
                name: self.qualify(name),
            })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Stores the builder record of a root type.
    pub fn register_type_builder(&mut self, builder: TypeBuilder) {
        self.builders.insert(builder.name.clone(), builder);
    }

    /// Returns the builder record of a root type such as `Query`.
    #[must_use]
    pub fn get_type_builder(&self, name: &str) -> Option<&TypeBuilder> {
        self.builders.get(name)
    }
}
