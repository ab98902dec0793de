//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use contentql_core::{
    CategoryGroup, ContentStore, CoreError, DynContentStore, Element, ElementId, ElementQuery,
    EntryType, FieldDefinition, GlobalSet, InMemoryContentStore, Section, TagGroup, Volume,
};
use contentql_graphql::{GraphQLConfig, GraphQLService};

/// Two sections, three entry types, one volume, one category group, one tag
/// group and one global set, with a handful of elements.
pub const FIXTURE: &str = r#"{
    "fields": [
        {"id": 1, "name": "Body", "handle": "body", "type": "rich_text"},
        {"id": 2, "name": "Featured", "handle": "featured", "type": "lightswitch"},
        {"id": 3, "name": "Related", "handle": "related", "type": "entries"},
        {"id": 4, "name": "Topics", "handle": "topics", "type": "tags"},
        {"id": 5, "name": "Hero image", "handle": "heroImage", "type": "assets"},
        {"id": 6, "name": "Rating", "handle": "rating", "type": "number", "required": true},
        {"id": 7, "name": "Event date", "handle": "eventDate", "type": "date"}
    ],
    "sections": [
        {"id": 1, "name": "News", "handle": "news", "kind": "channel", "entry_types": [10, 11], "has_urls": true},
        {"id": 2, "name": "Pages", "handle": "pages", "kind": "single", "entry_types": [12]}
    ],
    "entry_types": [
        {"id": 10, "section_id": 1, "name": "Article", "handle": "article",
         "field_layout": ["body", "featured", "related", "topics", "heroImage", "eventDate"]},
        {"id": 11, "section_id": 1, "name": "Video", "handle": "video", "field_layout": ["rating"]},
        {"id": 12, "section_id": 2, "name": "About", "handle": "about", "field_layout": ["body"]}
    ],
    "volumes": [
        {"id": 4, "name": "Images", "handle": "images"}
    ],
    "category_groups": [
        {"id": 5, "name": "Regions", "handle": "regions"}
    ],
    "tag_groups": [
        {"id": 6, "name": "Keywords", "handle": "keywords"}
    ],
    "global_sets": [
        {"id": 7, "name": "Site info", "handle": "siteInfo", "field_layout": ["body"]}
    ],
    "elements": [
        {
            "id": 100,
            "owner": {"kind": "entry", "section_id": 1, "entry_type_id": 10},
            "title": "Hello world",
            "slug": "hello-world",
            "uri": "news/hello-world",
            "date_created": "2024-03-01T08:00:00Z",
            "date_updated": "2024-03-02T08:00:00Z",
            "post_date": "2024-03-05T10:30:00Z",
            "fields": {
                "body": "<p>Hi</p>",
                "featured": true,
                "related": [102, 101, 999],
                "topics": [300],
                "heroImage": [200],
                "eventDate": "2024-04-01T18:00:00Z"
            }
        },
        {
            "id": 101,
            "owner": {"kind": "entry", "section_id": 1, "entry_type_id": 11},
            "title": "Launch video",
            "slug": "launch-video",
            "date_created": "2024-03-03T08:00:00Z",
            "date_updated": "2024-03-03T08:00:00Z",
            "fields": {"rating": 4.5}
        },
        {
            "id": 102,
            "owner": {"kind": "entry", "section_id": 2, "entry_type_id": 12},
            "title": "About us",
            "slug": "about",
            "uri": "about",
            "date_created": "2024-01-01T00:00:00Z",
            "date_updated": "2024-01-01T00:00:00Z",
            "fields": {"body": "<p>We write things.</p>"}
        },
        {
            "id": 200,
            "owner": {"kind": "asset", "volume_id": 4},
            "title": "Cover",
            "uri": "images/cover.jpg",
            "date_created": "2024-02-01T00:00:00Z",
            "date_updated": "2024-02-01T00:00:00Z"
        },
        {
            "id": 300,
            "owner": {"kind": "tag", "group_id": 6},
            "title": "Rust",
            "slug": "rust",
            "date_created": "2024-02-01T00:00:00Z",
            "date_updated": "2024-02-01T00:00:00Z"
        },
        {
            "id": 400,
            "owner": {"kind": "category", "group_id": 5},
            "title": "Europe",
            "slug": "europe",
            "date_created": "2024-02-01T00:00:00Z",
            "date_updated": "2024-02-01T00:00:00Z"
        },
        {
            "id": 500,
            "owner": {"kind": "global_set", "global_set_id": 7},
            "title": "Site info",
            "date_created": "2024-02-01T00:00:00Z",
            "date_updated": "2024-02-01T00:00:00Z",
            "fields": {"body": "ContentQL demo"}
        }
    ]
}"#;

pub fn fixture_store() -> Arc<InMemoryContentStore> {
    Arc::new(InMemoryContentStore::from_json_str(FIXTURE).unwrap())
}

/// Bootstraps a service over `store` with `config`.
pub async fn service_with(store: DynContentStore, config: &GraphQLConfig) -> GraphQLService {
    GraphQLService::bootstrap(store, config).await.unwrap()
}

/// Bootstraps a service over the fixture with default settings.
pub async fn fixture_service() -> (Arc<InMemoryContentStore>, GraphQLService) {
    let store = fixture_store();
    let service = service_with(store.clone(), &GraphQLConfig::default()).await;
    (store, service)
}

// =============================================================================
// Failing Store
// =============================================================================

/// Serves definitions from the fixture but fails every element query.
pub struct OfflineElementStore {
    inner: InMemoryContentStore,
}

impl OfflineElementStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryContentStore::from_json_str(FIXTURE).unwrap(),
        }
    }
}

#[async_trait]
impl ContentStore for OfflineElementStore {
    async fn sections(&self) -> Result<Vec<Section>, CoreError> {
        self.inner.sections().await
    }

    async fn entry_types(&self) -> Result<Vec<EntryType>, CoreError> {
        self.inner.entry_types().await
    }

    async fn volumes(&self) -> Result<Vec<Volume>, CoreError> {
        self.inner.volumes().await
    }

    async fn category_groups(&self) -> Result<Vec<CategoryGroup>, CoreError> {
        self.inner.category_groups().await
    }

    async fn tag_groups(&self) -> Result<Vec<TagGroup>, CoreError> {
        self.inner.tag_groups().await
    }

    async fn global_sets(&self) -> Result<Vec<GlobalSet>, CoreError> {
        self.inner.global_sets().await
    }

    async fn fields(&self) -> Result<Vec<FieldDefinition>, CoreError> {
        self.inner.fields().await
    }

    async fn query_elements(&self, _query: &ElementQuery) -> Result<Vec<Element>, CoreError> {
        Err(CoreError::store("element index offline"))
    }

    async fn element(&self, _id: ElementId) -> Result<Option<Element>, CoreError> {
        Err(CoreError::store("element index offline"))
    }

    fn backend_name(&self) -> &'static str {
        "offline"
    }
}
