//! GraphQL execution context.
//!
//! The context holds what resolvers need while a request executes: the
//! content store, the definition snapshot the schema was built from, the
//! caller's token and the per-request DataLoaders.
//!
//! # Example
//!
//! ```ignore
//! use contentql_graphql::ContentContextBuilder;
//!
//! let context = ContentContextBuilder::new()
//!     .with_store(store.clone())
//!     .with_snapshot(schema.snapshot().clone())
//!     .with_token(token)
//!     .build()?;
//! ```

use contentql_core::{ContentSnapshot, DynContentStore, Element, ElementOwner};

use crate::loaders::DataLoaders;
use crate::token::AccessToken;

/// Per-request resolver context.
#[derive(Clone)]
pub struct ContentContext {
    /// Host content store.
    pub store: DynContentStore,

    /// Definitions the executing schema was built from.
    ///
    /// Resolvers map handles and owner ids through this snapshot rather than
    /// the live repositories, so a reload during execution cannot make a
    /// response disagree with its schema.
    pub snapshot: ContentSnapshot,

    pub token: AccessToken,

    /// Request ID for tracing and correlation.
    pub request_id: Option<String>,

    pub loaders: DataLoaders,
}

impl ContentContext {
    /// Creates a new builder for ContentContext.
    #[must_use]
    pub fn builder() -> ContentContextBuilder {
        ContentContextBuilder::default()
    }

    /// Name of the concrete GraphQL type of an element: the handle of its
    /// entry type, volume, group or global set.
    #[must_use]
    pub fn type_name_of(&self, element: &Element) -> Option<String> {
        let snapshot = &self.snapshot;
        let handle = match element.owner {
            ElementOwner::Entry { entry_type_id, .. } => snapshot
                .entry_types
                .iter()
                .find(|d| d.id == entry_type_id)
                .map(|d| &d.handle),
            ElementOwner::Asset { volume_id } => snapshot
                .volumes
                .iter()
                .find(|d| d.id == volume_id)
                .map(|d| &d.handle),
            ElementOwner::Category { group_id } => snapshot
                .category_groups
                .iter()
                .find(|d| d.id == group_id)
                .map(|d| &d.handle),
            ElementOwner::Tag { group_id } => snapshot
                .tag_groups
                .iter()
                .find(|d| d.id == group_id)
                .map(|d| &d.handle),
            ElementOwner::GlobalSet { global_set_id } => snapshot
                .global_sets
                .iter()
                .find(|d| d.id == global_set_id)
                .map(|d| &d.handle),
        };
        handle.cloned()
    }
}

impl std::fmt::Debug for ContentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentContext")
            .field("backend", &self.store.backend_name())
            .field("token", &self.token)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing ContentContext.
#[derive(Default)]
pub struct ContentContextBuilder {
    store: Option<DynContentStore>,
    snapshot: Option<ContentSnapshot>,
    token: Option<AccessToken>,
    request_id: Option<String>,
}

impl ContentContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_store(mut self, store: DynContentStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_snapshot(mut self, snapshot: ContentSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Sets the caller's token. Defaults to the public token.
    #[must_use]
    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Builds the ContentContext with a fresh set of DataLoaders.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or the snapshot is missing.
    pub fn build(self) -> Result<ContentContext, ContextBuilderError> {
        let store = self.store.ok_or(ContextBuilderError::MissingField("store"))?;
        let snapshot = self
            .snapshot
            .ok_or(ContextBuilderError::MissingField("snapshot"))?;

        let loaders = DataLoaders::new(store.clone());

        Ok(ContentContext {
            store,
            snapshot,
            token: self.token.unwrap_or_default(),
            request_id: self.request_id,
            loaders,
        })
    }
}

/// Errors that can occur when building a ContentContext.
#[derive(Debug, thiserror::Error)]
pub enum ContextBuilderError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use contentql_core::{ContentRepositories, InMemoryContentStore};

    const MODEL: &str = r#"{
        "sections": [{"id": 1, "name": "News", "handle": "news", "entry_types": [10]}],
        "entry_types": [{"id": 10, "section_id": 1, "name": "Article", "handle": "article"}],
        "tag_groups": [{"id": 3, "name": "Topics", "handle": "topics"}]
    }"#;

    #[test]
    fn test_builder_missing_store() {
        let result = ContentContextBuilder::new().with_request_id("req-1").build();
        assert!(matches!(
            result,
            Err(ContextBuilderError::MissingField("store"))
        ));
    }

    #[tokio::test]
    async fn test_type_name_of() {
        let store: DynContentStore = Arc::new(InMemoryContentStore::from_json_str(MODEL).unwrap());
        let repositories = ContentRepositories::new(store.clone());
        repositories.load_all().await.unwrap();

        let context = ContentContext::builder()
            .with_store(store)
            .with_snapshot(repositories.snapshot().unwrap())
            .build()
            .unwrap();

        let element = |owner| Element {
            id: 1,
            owner,
            title: "x".into(),
            slug: None,
            uri: None,
            date_created: time::OffsetDateTime::UNIX_EPOCH,
            date_updated: time::OffsetDateTime::UNIX_EPOCH,
            post_date: None,
            fields: Default::default(),
        };

        assert_eq!(
            context.type_name_of(&element(ElementOwner::Entry {
                section_id: 1,
                entry_type_id: 10
            })),
            Some("article".to_string())
        );
        assert_eq!(
            context.type_name_of(&element(ElementOwner::Tag { group_id: 3 })),
            Some("topics".to_string())
        );
        assert_eq!(
            context.type_name_of(&element(ElementOwner::Asset { volume_id: 9 })),
            None
        );
        assert!(context.token.can(crate::token::Scope::Tags));
    }
}
