//! Integration tests for content repositories over the in-memory store.

use std::sync::Arc;

use contentql_core::{
    ContentCategory, ContentRepositories, DynContentStore, EntryType, InMemoryContentStore,
    Repository, RepositoryError, Section, SectionKind, TagGroup,
};

const FIXTURE: &str = r#"{
    "sections": [
        {"id": 1, "name": "News", "handle": "news", "kind": "channel", "entry_types": [10, 11]}
    ],
    "entry_types": [
        {"id": 10, "section_id": 1, "name": "Article", "handle": "article", "field_layout": ["body"]},
        {"id": 11, "section_id": 1, "name": "Link", "handle": "link"}
    ],
    "volumes": [
        {"id": 1, "name": "Images", "handle": "images"}
    ],
    "tag_groups": [
        {"id": 2, "name": "Topics", "handle": "topics"},
        {"id": 1, "name": "Keywords", "handle": "keywords"}
    ],
    "fields": [
        {"id": 100, "name": "Body", "handle": "body", "type": "rich_text"}
    ]
}"#;

fn fixture_store() -> Arc<InMemoryContentStore> {
    Arc::new(InMemoryContentStore::from_json_str(FIXTURE).expect("fixture should parse"))
}

#[tokio::test]
async fn test_all_before_load_fails() {
    let store: DynContentStore = fixture_store();
    let repository: Repository<TagGroup> = Repository::new(store);

    let err = repository.all().unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::NotLoaded {
            category: ContentCategory::TagGroup
        }
    ));
    assert!(repository.find("topics").is_err());
}

#[tokio::test]
async fn test_load_preserves_host_order() {
    let store: DynContentStore = fixture_store();
    let repository: Repository<TagGroup> = Repository::new(store);
    repository.load().await.unwrap();

    let handles: Vec<_> = repository
        .all()
        .unwrap()
        .iter()
        .map(|g| g.handle.clone())
        .collect();
    assert_eq!(handles, vec!["topics", "keywords"]);
    assert_eq!(repository.get(1).unwrap().unwrap().handle, "keywords");
}

#[tokio::test]
async fn test_load_is_idempotent_until_reload() {
    let memory = fixture_store();
    let store: DynContentStore = memory.clone();
    let repository: Repository<TagGroup> = Repository::new(store);
    repository.load().await.unwrap();

    memory
        .update_model(|model| {
            model.tag_groups.push(TagGroup {
                id: 3,
                name: "Moods".into(),
                handle: "moods".into(),
                field_layout: vec![],
            })
        })
        .unwrap();

    repository.load().await.unwrap();
    assert_eq!(repository.all().unwrap().len(), 2);

    repository.reload().await.unwrap();
    assert_eq!(repository.all().unwrap().len(), 3);
    assert!(repository.find("moods").unwrap().is_some());
}

#[tokio::test]
async fn test_repositories_snapshot() {
    let store: DynContentStore = fixture_store();
    let repositories = ContentRepositories::new(store);
    assert!(repositories.snapshot().is_err());

    repositories.load_all().await.unwrap();
    let snapshot = repositories.snapshot().unwrap();

    assert_eq!(snapshot.sections.len(), 1);
    assert_eq!(snapshot.entry_types.len(), 2);
    assert_eq!(snapshot.volumes.len(), 1);
    assert!(snapshot.category_groups.is_empty());
    assert_eq!(snapshot.tag_groups.len(), 2);
    assert!(snapshot.global_sets.is_empty());
    assert!(snapshot.field("body").is_some());
    assert_eq!(snapshot.section(1).unwrap().handle, "news");
}

#[tokio::test]
async fn test_snapshot_changes_only_with_reload_all() {
    let memory = fixture_store();
    let store: DynContentStore = memory.clone();
    let repositories = ContentRepositories::new(store);
    repositories.load_all().await.unwrap();

    memory
        .update_model(|model| {
            model.sections.push(Section {
                id: 3,
                name: "Blog".into(),
                handle: "blog".into(),
                kind: SectionKind::Channel,
                entry_types: vec![30],
                has_urls: true,
            });
            model.entry_types.push(EntryType {
                id: 30,
                section_id: 3,
                name: "Post".into(),
                handle: "post".into(),
                field_layout: vec![],
            });
        })
        .unwrap();

    // A lone repository reload refreshes that cache, not the snapshot.
    repositories.entry_types.reload().await.unwrap();
    assert_eq!(repositories.entry_types.all().unwrap().len(), 3);
    let snapshot = repositories.snapshot().unwrap();
    assert_eq!(snapshot.entry_types.len(), 2);
    assert_eq!(snapshot.sections.len(), 1);

    repositories.load_all().await.unwrap();
    assert_eq!(repositories.snapshot().unwrap().entry_types.len(), 2);

    repositories.reload_all().await.unwrap();
    let snapshot = repositories.snapshot().unwrap();
    assert_eq!(snapshot.entry_types.len(), 3);
    assert_eq!(snapshot.sections.len(), 2);
    assert!(snapshot.section(3).is_some());
    assert!(repositories.sections.find("blog").unwrap().is_some());
}

#[tokio::test]
async fn test_snapshot_before_load_names_category() {
    let store: DynContentStore = fixture_store();
    let repositories = ContentRepositories::new(store);
    assert!(matches!(
        repositories.snapshot(),
        Err(RepositoryError::NotLoaded {
            category: ContentCategory::Section
        })
    ));
}
