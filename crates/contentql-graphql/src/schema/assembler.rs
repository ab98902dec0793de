//! Per-request schema assembly.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use async_graphql::dynamic::Schema;
use contentql_core::ContentSnapshot;
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::hooks::QuerySchemaHook;
use super::query::{QUERY, QueryBuilder};
use super::{AssemblerConfig, ContentSchema, NAMESPACE};
use crate::error::GraphQLError;
use crate::factories::enums::register_content_enums;
use crate::registry::{SchemaRequest, TypeDescriptor, TypeRegistry};
use crate::token::AccessToken;
use crate::types::{DATE_FORMAT_TYPES, date_format_types_enum, register_base_types};

/// Assembles a [`ContentSchema`] from a content snapshot.
///
/// The assembler itself is immutable and shared: every call to
/// [`assemble`](Self::assemble) works on its own [`SchemaRequest`].
#[derive(Clone)]
pub struct SchemaAssembler {
    config: AssemblerConfig,
    hooks: Vec<Arc<dyn QuerySchemaHook>>,
}

impl SchemaAssembler {
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            config,
            hooks: Vec::new(),
        }
    }

    /// Adds a hook fired on every build, after the hooks added before it.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn QuerySchemaHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Builds the schema visible to `token`.
    ///
    /// # Errors
    ///
    /// - `DuplicateType` if two definitions (or a definition and a built-in
    ///   type) share a name
    /// - `UnresolvableType` if a type references a name nobody registered
    /// - `InvalidTypeName` for handles that are not GraphQL names
    /// - `SchemaBuildFailed` if async-graphql rejects the result
    /// - any error returned by a hook
    pub fn assemble(
        &self,
        token: AccessToken,
        snapshot: ContentSnapshot,
    ) -> Result<ContentSchema, GraphQLError> {
        let started = Instant::now();
        debug!(token = %token.id, "Starting GraphQL schema build");

        let mut request = SchemaRequest::new(token.clone(), snapshot.clone());
        register_base_types(request.registry_mut())?;
        register_content_enums(request.registry_mut(), &snapshot)?;

        let mut query = QueryBuilder::new(request.registry(), &snapshot);
        for hook in &self.hooks {
            hook.alter(&mut query, &token)?;
            trace!(hook = hook.name(), "Applied query schema hook");
        }

        request.registry_mut().register_namespace(NAMESPACE);

        let (root, builder, contributed) = query.finish();
        let registry = request.registry_mut();
        registry.register_type(QUERY, Arc::new(TypeDescriptor::Object(root)))?;
        registry.register_type_builder(builder);
        for descriptor in contributed {
            let name = descriptor.name().to_string();
            registry.register_type(&name, descriptor)?;
        }

        request.register_definitions()?;
        request
            .registry_mut()
            .register_type(DATE_FORMAT_TYPES, Arc::new(date_format_types_enum()))?;

        let type_list = request.type_list()?;
        let registry = request.into_registry();
        let types = resolve_types(&registry, &type_list)?;
        let schema = self.finish(&types)?;

        debug!(
            token = %token.id,
            types = types.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "GraphQL schema build complete"
        );
        Ok(ContentSchema::new(schema, registry, types, type_list, snapshot))
    }

    fn finish(&self, types: &[Arc<TypeDescriptor>]) -> Result<Schema, GraphQLError> {
        let mut builder = Schema::build(QUERY, None, None);
        for descriptor in types {
            builder = descriptor.register_into(builder);
        }

        let limits = self.config.limits;
        if let Some(depth) = limits.max_depth {
            builder = builder.limit_depth(depth);
        }
        if let Some(complexity) = limits.max_complexity {
            builder = builder.limit_complexity(complexity);
        }
        if !self.config.introspection_enabled {
            builder = builder.disable_introspection();
        }

        builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))
    }
}

/// Resolves Query, the type list and everything they reference through the
/// type loader, breadth first. Unknown names fail the build.
fn resolve_types(
    registry: &TypeRegistry,
    type_list: &[String],
) -> Result<Vec<Arc<TypeDescriptor>>, GraphQLError> {
    let mut queue: VecDeque<String> = std::iter::once(QUERY.to_string())
        .chain(type_list.iter().cloned())
        .collect();
    let mut resolved: IndexMap<String, Arc<TypeDescriptor>> = IndexMap::new();

    while let Some(name) = queue.pop_front() {
        if resolved.contains_key(&name) {
            continue;
        }
        let descriptor = registry.load_type(&name)?;
        for referenced in descriptor.referenced_types() {
            if !resolved.contains_key(&referenced) {
                queue.push_back(referenced);
            }
        }
        resolved.insert(name, descriptor);
    }

    Ok(resolved.into_values().collect())
}
