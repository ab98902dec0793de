//! GraphQL service.
//!
//! The service owns the content repositories and the schema assembler. It is
//! the entry point for hosts: build a schema for a token, execute a query
//! against it, reload content after the host changed its model.

use std::sync::Arc;
use std::time::Instant;

use async_graphql::Variables;
use contentql_core::{ContentRepositories, DynContentStore};
use tracing::{debug, info};

use crate::config::GraphQLConfig;
use crate::context::ContentContext;
use crate::error::GraphQLError;
use crate::execution::{self, ContentRequest, ExecutionResult};
use crate::schema::{AssemblerConfig, ContentSchema, QuerySafetyLimits, QuerySchemaHook, SchemaAssembler};
use crate::token::AccessToken;

/// Schema builds and query execution over one content store.
#[derive(Clone)]
pub struct GraphQLService {
    store: DynContentStore,
    repositories: Arc<ContentRepositories>,
    assembler: Arc<SchemaAssembler>,
}

impl GraphQLService {
    /// Loads every repository and fixes limits and runtime mode for the
    /// lifetime of the service.
    ///
    /// # Errors
    ///
    /// Returns the first store error hit while loading.
    pub async fn bootstrap(
        store: DynContentStore,
        config: &GraphQLConfig,
    ) -> Result<Self, GraphQLError> {
        let started = Instant::now();
        let repositories = ContentRepositories::new(store.clone());
        repositories.load_all().await?;

        let assembler_config = config.to_assembler_config();
        info!(
            backend = store.backend_name(),
            max_depth = ?assembler_config.limits.max_depth,
            max_complexity = ?assembler_config.limits.max_complexity,
            dev_mode = assembler_config.dev_mode,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "GraphQL service bootstrapped"
        );

        Ok(Self {
            store,
            repositories: Arc::new(repositories),
            assembler: Arc::new(SchemaAssembler::new(assembler_config)),
        })
    }

    /// Registers a hook fired on every later schema build.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn QuerySchemaHook>) -> Self {
        debug!(hook = hook.name(), "Registered query schema hook");
        let assembler = SchemaAssembler::clone(&self.assembler).with_hook(hook);
        self.assembler = Arc::new(assembler);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AssemblerConfig {
        self.assembler.config()
    }

    #[must_use]
    pub fn limits(&self) -> QuerySafetyLimits {
        self.config().limits
    }

    #[must_use]
    pub fn is_dev_mode(&self) -> bool {
        self.config().dev_mode
    }

    #[must_use]
    pub fn repositories(&self) -> &ContentRepositories {
        &self.repositories
    }

    /// Builds the schema visible to `token` from the current content model.
    ///
    /// # Errors
    ///
    /// Returns build errors such as `DuplicateType` or `UnresolvableType`.
    pub fn schema(&self, token: &AccessToken) -> Result<ContentSchema, GraphQLError> {
        let snapshot = self.repositories.snapshot()?;
        self.assembler.assemble(token.clone(), snapshot)
    }

    /// Re-fetches every repository. Schemas built afterwards see the change;
    /// schemas already built keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first store error.
    pub async fn reload_content(&self) -> Result<(), GraphQLError> {
        self.repositories.reload_all().await?;
        Ok(())
    }

    /// Executes `query` with `variables` against `schema`.
    ///
    /// # Errors
    ///
    /// In development mode, the first resolver error.
    pub async fn execute(
        &self,
        schema: &ContentSchema,
        query: &str,
        variables: Variables,
    ) -> Result<ExecutionResult, GraphQLError> {
        let request = ContentRequest::new(query).with_variables(variables);
        self.execute_request(schema, request, None).await
    }

    /// Executes a full request, tagging the context with `request_id`.
    ///
    /// # Errors
    ///
    /// In development mode, the first resolver error.
    pub async fn execute_request(
        &self,
        schema: &ContentSchema,
        request: ContentRequest,
        request_id: Option<String>,
    ) -> Result<ExecutionResult, GraphQLError> {
        let mut builder = ContentContext::builder()
            .with_store(self.store.clone())
            .with_snapshot(schema.snapshot().clone())
            .with_token(schema.token().clone());
        if let Some(id) = request_id {
            builder = builder.with_request_id(id);
        }
        let context = builder
            .build()
            .map_err(|e| GraphQLError::Internal(e.to_string()))?;

        execution::execute(schema, context, request, self.is_dev_mode()).await
    }
}

impl std::fmt::Debug for GraphQLService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLService")
            .field("backend", &self.store.backend_name())
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}
