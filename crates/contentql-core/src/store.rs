//! Host content store contract.
//!
//! The store is the only way ContentQL reaches the host CMS. Definitions are
//! fetched in bulk by repositories; elements are queried by resolvers while a
//! GraphQL request executes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::element::{Element, ElementId, ElementKind};
use crate::error::CoreError;
use crate::model::{
    CategoryGroup, DefinitionId, EntryType, FieldDefinition, GlobalSet, Section, TagGroup, Volume,
};

/// Criteria for listing elements.
///
/// Empty filter lists mean "no restriction".
#[derive(Debug, Clone, PartialEq)]
pub struct ElementQuery {
    pub kind: ElementKind,
    /// Owning section, volume, group or global set ids.
    pub owners: Vec<DefinitionId>,
    /// Entry type ids (entries only).
    pub entry_types: Vec<DefinitionId>,
    pub ids: Vec<ElementId>,
    pub slug: Option<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ElementQuery {
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            owners: Vec::new(),
            entry_types: Vec::new(),
            ids: Vec::new(),
            slug: None,
            limit: None,
            offset: 0,
        }
    }

    #[must_use]
    pub fn with_owners(mut self, owners: impl IntoIterator<Item = DefinitionId>) -> Self {
        self.owners.extend(owners);
        self
    }

    #[must_use]
    pub fn with_entry_types(mut self, ids: impl IntoIterator<Item = DefinitionId>) -> Self {
        self.entry_types.extend(ids);
        self
    }

    #[must_use]
    pub fn with_ids(mut self, ids: impl IntoIterator<Item = ElementId>) -> Self {
        self.ids.extend(ids);
        self
    }

    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether an element satisfies every filter of this query.
    ///
    /// Pagination (`limit`/`offset`) is not considered.
    #[must_use]
    pub fn matches(&self, element: &Element) -> bool {
        if element.kind() != self.kind {
            return false;
        }
        if !self.owners.is_empty() && !self.owners.contains(&element.owner.owner_id()) {
            return false;
        }
        if !self.entry_types.is_empty() {
            match element.owner {
                crate::element::ElementOwner::Entry { entry_type_id, .. }
                    if self.entry_types.contains(&entry_type_id) => {}
                _ => return false,
            }
        }
        if !self.ids.is_empty() && !self.ids.contains(&element.id) {
            return false;
        }
        if let Some(slug) = &self.slug
            && element.slug.as_deref() != Some(slug.as_str())
        {
            return false;
        }
        true
    }
}

/// The host content store.
///
/// Implementations must be thread-safe. Definition lists are returned in
/// host order; element queries are returned ordered by element id.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn sections(&self) -> Result<Vec<Section>, CoreError>;

    async fn entry_types(&self) -> Result<Vec<EntryType>, CoreError>;

    async fn volumes(&self) -> Result<Vec<Volume>, CoreError>;

    async fn category_groups(&self) -> Result<Vec<CategoryGroup>, CoreError>;

    async fn tag_groups(&self) -> Result<Vec<TagGroup>, CoreError>;

    async fn global_sets(&self) -> Result<Vec<GlobalSet>, CoreError>;

    /// Global custom field definitions.
    async fn fields(&self) -> Result<Vec<FieldDefinition>, CoreError>;

    /// Lists elements matching the query.
    async fn query_elements(&self, query: &ElementQuery) -> Result<Vec<Element>, CoreError>;

    /// Reads a single element by id.
    ///
    /// Returns `None` if the element does not exist.
    async fn element(&self, id: ElementId) -> Result<Option<Element>, CoreError>;

    /// Reads several elements by id, skipping missing ones.
    async fn elements(&self, ids: &[ElementId]) -> Result<Vec<Element>, CoreError> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(element) = self.element(*id).await? {
                found.push(element);
            }
        }
        Ok(found)
    }

    /// Name of the backend, for logging.
    fn backend_name(&self) -> &'static str;
}

/// Type alias for a shareable content store.
pub type DynContentStore = Arc<dyn ContentStore>;
