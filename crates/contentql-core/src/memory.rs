//! In-memory content store.
//!
//! The definition model is published through [`ArcSwap`] so readers always see
//! a complete model while a writer replaces it. Elements live in a
//! [`DashMap`] keyed by id.
//!
//! # Example
//!
//! ```ignore
//! use contentql_core::{InMemoryContentStore, ContentStore};
//!
//! let store = InMemoryContentStore::from_json_str(include_str!("content.json"))?;
//! let sections = store.sections().await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::{Element, ElementId};
use crate::error::CoreError;
use crate::model::{
    CategoryGroup, ContentModel, EntryType, FieldDefinition, GlobalSet, Section, TagGroup, Volume,
};
use crate::store::{ContentStore, ElementQuery};

/// Serialized form of a full content store: the model plus its elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentFixture {
    #[serde(flatten)]
    pub model: ContentModel,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Content store held entirely in memory.
pub struct InMemoryContentStore {
    model: ArcSwap<ContentModel>,
    elements: DashMap<ElementId, Element>,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: ArcSwap::from_pointee(ContentModel::default()),
            elements: DashMap::new(),
        }
    }

    /// Creates a store from a fixture, validating the model.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidModel` if the model fails validation.
    pub fn from_fixture(fixture: ContentFixture) -> Result<Self, CoreError> {
        fixture.model.validate()?;
        let store = Self {
            model: ArcSwap::from_pointee(fixture.model),
            elements: DashMap::with_capacity(fixture.elements.len()),
        };
        for element in fixture.elements {
            store.insert_element(element);
        }
        Ok(store)
    }

    /// Parses a JSON fixture.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or an invalid model.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let fixture: ContentFixture = serde_json::from_str(json)?;
        Self::from_fixture(fixture)
    }

    /// Reads a JSON fixture from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            elements = store.elements.len(),
            "Loaded content fixture"
        );
        Ok(store)
    }

    /// Returns the current model snapshot.
    #[must_use]
    pub fn model(&self) -> Arc<ContentModel> {
        self.model.load_full()
    }

    /// Replaces the model after applying `change` to a copy of it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidModel` and keeps the previous model if the
    /// changed model fails validation.
    pub fn update_model(&self, change: impl FnOnce(&mut ContentModel)) -> Result<(), CoreError> {
        let mut next = ContentModel::clone(&self.model.load());
        change(&mut next);
        next.validate()?;
        self.model.store(Arc::new(next));
        Ok(())
    }

    /// Inserts or replaces an element.
    pub fn insert_element(&self, element: Element) {
        self.elements.insert(element.id, element);
    }

    /// Removes an element, returning it if present.
    pub fn remove_element(&self, id: ElementId) -> Option<Element> {
        self.elements.remove(&id).map(|(_, element)| element)
    }

    /// Number of stored elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn sections(&self) -> Result<Vec<Section>, CoreError> {
        Ok(self.model.load().sections.clone())
    }

    async fn entry_types(&self) -> Result<Vec<EntryType>, CoreError> {
        Ok(self.model.load().entry_types.clone())
    }

    async fn volumes(&self) -> Result<Vec<Volume>, CoreError> {
        Ok(self.model.load().volumes.clone())
    }

    async fn category_groups(&self) -> Result<Vec<CategoryGroup>, CoreError> {
        Ok(self.model.load().category_groups.clone())
    }

    async fn tag_groups(&self) -> Result<Vec<TagGroup>, CoreError> {
        Ok(self.model.load().tag_groups.clone())
    }

    async fn global_sets(&self) -> Result<Vec<GlobalSet>, CoreError> {
        Ok(self.model.load().global_sets.clone())
    }

    async fn fields(&self) -> Result<Vec<FieldDefinition>, CoreError> {
        Ok(self.model.load().fields.clone())
    }

    async fn query_elements(&self, query: &ElementQuery) -> Result<Vec<Element>, CoreError> {
        let mut matched: Vec<Element> = self
            .elements
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by_key(|element| element.id);

        let page = matched.into_iter().skip(query.offset);
        Ok(match query.limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        })
    }

    async fn element(&self, id: ElementId) -> Result<Option<Element>, CoreError> {
        Ok(self.elements.get(&id).map(|entry| entry.value().clone()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, ElementOwner};
    use crate::model::TagGroup;
    use time::macros::datetime;

    fn tag(id: ElementId, group_id: u64) -> Element {
        Element {
            id,
            owner: ElementOwner::Tag { group_id },
            title: format!("Tag {id}"),
            slug: None,
            uri: None,
            date_created: datetime!(2024-01-01 0:00 UTC),
            date_updated: datetime!(2024-01-01 0:00 UTC),
            post_date: None,
            fields: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_query_pagination_is_ordered_by_id() {
        let store = InMemoryContentStore::new();
        for id in [5, 1, 3, 2, 4] {
            store.insert_element(tag(id, 1));
        }

        let query = ElementQuery::new(ElementKind::Tag)
            .with_offset(1)
            .with_limit(2);
        let ids: Vec<_> = store
            .query_elements(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_update_model_is_visible_to_readers() {
        let store = InMemoryContentStore::new();
        assert!(store.tag_groups().await.unwrap().is_empty());

        store
            .update_model(|model| {
                model.tag_groups.push(TagGroup {
                    id: 1,
                    name: "Topics".into(),
                    handle: "topics".into(),
                    field_layout: vec![],
                })
            })
            .unwrap();

        let groups = store.tag_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].handle, "topics");
    }

    #[tokio::test]
    async fn test_invalid_update_keeps_previous_model() {
        let store = InMemoryContentStore::new();
        let result = store.update_model(|model| {
            model.tag_groups.push(TagGroup {
                id: 1,
                name: "Topics".into(),
                handle: "topics".into(),
                field_layout: vec!["missing".into()],
            })
        });
        assert!(result.is_err());
        assert!(store.tag_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_elements_skips_missing() {
        let store = InMemoryContentStore::new();
        store.insert_element(tag(1, 1));
        store.insert_element(tag(3, 1));

        let found = store.elements(&[3, 2, 1]).await.unwrap();
        let ids: Vec<_> = found.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_from_path() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"tag_groups": [{"id": 6, "name": "Keywords", "handle": "keywords"}]}"#)
            .unwrap();

        let store = InMemoryContentStore::from_path(file.path()).unwrap();
        assert_eq!(store.model().tag_groups[0].handle, "keywords");
        assert_eq!(store.element_count(), 0);

        assert!(InMemoryContentStore::from_path(file.path().with_extension("missing")).is_err());
    }

    #[test]
    fn test_from_json_str_rejects_invalid_model() {
        let json = r#"{
            "entry_types": [{"id": 1, "section_id": 9, "name": "A", "handle": "a"}]
        }"#;
        assert!(matches!(
            InMemoryContentStore::from_json_str(json),
            Err(CoreError::InvalidModel(_))
        ));
    }
}
