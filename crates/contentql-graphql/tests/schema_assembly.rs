//! Integration tests for per-request schema assembly.

mod common;

use std::sync::Arc;

use async_graphql::dynamic::TypeRef;
use contentql_core::{EntryType, Section, SectionKind, TagGroup, Volume};
use contentql_graphql::registry::FieldDescriptor;
use contentql_graphql::types::DateFormat;
use contentql_graphql::{AccessToken, GraphQLError, QueryBuilder, QuerySchemaHook, Scope};

use common::fixture_service;

// =============================================================================
// Registry
// =============================================================================

#[tokio::test]
async fn test_registered_types_are_returned_by_identity() {
    let (_, service) = fixture_service().await;
    let schema = service.schema(&AccessToken::public()).unwrap();

    for name in ["article", "news", "images", "keywords", "EntryInterface", "Query"] {
        let first = schema.get_type(name).unwrap();
        let second = schema.get_type(name).unwrap();
        assert!(Arc::ptr_eq(&first, &second), "{name}");
    }
}

#[tokio::test]
async fn test_type_loader_round_trip() {
    let (_, service) = fixture_service().await;
    let schema = service.schema(&AccessToken::public()).unwrap();

    assert!(!schema.types().is_empty());
    for descriptor in schema.types() {
        let loaded = schema.load_type(descriptor.name()).unwrap();
        assert!(Arc::ptr_eq(&loaded, descriptor), "{}", descriptor.name());
    }
}

#[tokio::test]
async fn test_unknown_type_fails_to_load() {
    let (_, service) = fixture_service().await;
    let schema = service.schema(&AccessToken::public()).unwrap();

    assert!(schema.get_type("Missing").is_none());
    let err = schema.load_type("Missing").unwrap_err();
    assert_eq!(err.to_string(), "Type \"contentql::Missing\" could not be found");
}

#[tokio::test]
async fn test_builds_are_independent() {
    let (_, service) = fixture_service().await;
    let first = service.schema(&AccessToken::public()).unwrap();
    let second = service.schema(&AccessToken::public()).unwrap();

    let a = first.get_type("article").unwrap();
    let b = second.get_type("article").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

// =============================================================================
// Type List
// =============================================================================

#[tokio::test]
async fn test_type_list() {
    let (_, service) = fixture_service().await;
    let schema = service.schema(&AccessToken::public()).unwrap();

    assert_eq!(
        schema.type_list(),
        &[
            "article",
            "video",
            "about",
            "images",
            "regions",
            "keywords",
            "news",
            "pages",
            "DateFormatTypes",
            "siteInfo",
            "SectionInfo",
        ]
    );
}

#[tokio::test]
async fn test_query_builder_record() {
    let (_, service) = fixture_service().await;
    let schema = service.schema(&AccessToken::public()).unwrap();

    let builder = schema.registry().get_type_builder("Query").unwrap();
    assert!(builder.concrete_types.contains(&"article".to_string()));
    assert!(builder.concrete_types.contains(&"siteInfo".to_string()));
}

#[tokio::test]
async fn test_entry_type_implements_section_interface() {
    let (_, service) = fixture_service().await;
    let schema = service.schema(&AccessToken::public()).unwrap();

    let article = schema.get_type("article").unwrap();
    let object = article.as_object().unwrap();
    assert_eq!(object.interfaces, vec!["EntryInterface", "news"]);
    assert!(object.get_field("related").is_some());
    assert!(object.get_field("rating").is_none());

    let news = schema.get_type("news").unwrap();
    assert_eq!(news.kind(), "INTERFACE");
}

// =============================================================================
// Collisions
// =============================================================================

#[tokio::test]
async fn test_handle_collision_fails_the_build() {
    let (store, service) = fixture_service().await;
    store
        .update_model(|model| {
            model.volumes.push(Volume {
                id: 9,
                name: "News images".into(),
                handle: "news".into(),
                field_layout: vec![],
            });
        })
        .unwrap();
    service.reload_content().await.unwrap();

    let err = service.schema(&AccessToken::public()).unwrap_err();
    assert!(matches!(&err, GraphQLError::DuplicateType { name } if name == "news"), "{err}");
    assert!(err.is_build_error());
}

#[tokio::test]
async fn test_handle_shadowing_builtin_type_fails() {
    let (store, service) = fixture_service().await;
    store
        .update_model(|model| {
            model.tag_groups.push(TagGroup {
                id: 9,
                name: "Timestamp".into(),
                handle: "Timestamp".into(),
                field_layout: vec![],
            });
        })
        .unwrap();
    service.reload_content().await.unwrap();

    let err = service.schema(&AccessToken::public()).unwrap_err();
    assert!(matches!(err, GraphQLError::DuplicateType { name } if name == "Timestamp"));
}

#[tokio::test]
async fn test_handle_shadowing_builtin_scalar_fails() {
    let (store, service) = fixture_service().await;
    store
        .update_model(|model| {
            model.tag_groups.push(TagGroup {
                id: 9,
                name: "Strings".into(),
                handle: "String".into(),
                field_layout: vec![],
            });
        })
        .unwrap();
    service.reload_content().await.unwrap();

    let err = service.schema(&AccessToken::public()).unwrap_err();
    assert!(matches!(&err, GraphQLError::DuplicateType { name } if name == "String"), "{err}");
}

// =============================================================================
// Enums
// =============================================================================

#[tokio::test]
async fn test_date_format_types_values() {
    let (_, service) = fixture_service().await;
    let schema = service.schema(&AccessToken::public()).unwrap();

    let descriptor = schema.get_type("DateFormatTypes").unwrap();
    let values = descriptor.as_enum().unwrap().value_names();
    let expected: Vec<&str> = DateFormat::ALL.iter().map(DateFormat::as_str).collect();
    assert_eq!(values, expected);
    assert!(values.contains(&"atom"));
    assert!(values.contains(&"rfc3339"));
}

#[tokio::test]
async fn test_tag_groups_enum_follows_reload() {
    let (store, service) = fixture_service().await;
    let before = service.schema(&AccessToken::public()).unwrap();

    store
        .update_model(|model| {
            model.tag_groups.push(TagGroup {
                id: 8,
                name: "Colors".into(),
                handle: "colors".into(),
                field_layout: vec![],
            });
        })
        .unwrap();

    let stale = service.schema(&AccessToken::public()).unwrap();
    let values = stale.get_type("TagGroupsEnum").unwrap();
    assert_eq!(values.as_enum().unwrap().value_names(), vec!["keywords"]);

    service.reload_content().await.unwrap();
    let after = service.schema(&AccessToken::public()).unwrap();
    let values = after.get_type("TagGroupsEnum").unwrap();
    assert_eq!(
        values.as_enum().unwrap().value_names(),
        vec!["keywords", "colors"]
    );

    let values = before.get_type("TagGroupsEnum").unwrap();
    assert_eq!(values.as_enum().unwrap().value_names(), vec!["keywords"]);
}

#[tokio::test]
async fn test_partial_reload_does_not_leak_into_schema() {
    let (store, service) = fixture_service().await;
    store
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

    // Entry types fetched, sections not yet.
    service.repositories().entry_types.reload().await.unwrap();
    let schema = service.schema(&AccessToken::public()).unwrap();
    assert!(schema.get_type("post").is_none());
    assert!(schema.get_type("blog").is_none());

    service.reload_content().await.unwrap();
    let schema = service.schema(&AccessToken::public()).unwrap();
    assert!(schema.get_type("post").is_some());
    assert_eq!(schema.get_type("blog").unwrap().kind(), "INTERFACE");
}

#[tokio::test]
async fn test_empty_category_has_no_enum() {
    let (store, service) = fixture_service().await;
    store
        .update_model(|model| model.category_groups.clear())
        .unwrap();
    service.reload_content().await.unwrap();

    let schema = service.schema(&AccessToken::public()).unwrap();
    assert!(schema.get_type("CategoryGroupsEnum").is_none());
    assert!(schema.get_type("SectionsEnum").is_some());
}

// =============================================================================
// Query Root
// =============================================================================

#[tokio::test]
async fn test_query_fields_follow_token_scopes() {
    let (_, service) = fixture_service().await;

    let schema = service.schema(&AccessToken::public()).unwrap();
    let query = schema.get_type("Query").unwrap();
    let names: Vec<&str> = query.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ping",
            "entries",
            "entry",
            "assets",
            "categories",
            "tags",
            "globals",
            "sections"
        ]
    );

    let token = AccessToken::with_scopes("reader", [Scope::Tags, Scope::Sections]);
    let schema = service.schema(&token).unwrap();
    let query = schema.get_type("Query").unwrap();
    let names: Vec<&str> = query.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["ping", "tags", "sections"]);
    assert_eq!(schema.token().id, "reader");
}

struct StatsHook;

impl QuerySchemaHook for StatsHook {
    fn name(&self) -> &str {
        "stats"
    }

    fn alter(&self, query: &mut QueryBuilder, token: &AccessToken) -> Result<(), GraphQLError> {
        if token.can(Scope::Entries) {
            query.add_field(FieldDescriptor::new(
                "entryCount",
                TypeRef::named_nn(TypeRef::INT),
            ));
        }
        query.remove_field("ping");
        Ok(())
    }
}

struct GhostHook;

impl QuerySchemaHook for GhostHook {
    fn name(&self) -> &str {
        "ghost"
    }

    fn alter(&self, query: &mut QueryBuilder, _token: &AccessToken) -> Result<(), GraphQLError> {
        query.add_field(FieldDescriptor::new("ghost", TypeRef::named("Ghost")));
        Ok(())
    }
}

#[tokio::test]
async fn test_hook_alters_query_root() {
    let (_, service) = fixture_service().await;
    let service = service.with_hook(Arc::new(StatsHook));

    let schema = service.schema(&AccessToken::public()).unwrap();
    let query = schema.get_type("Query").unwrap();
    let names: Vec<&str> = query.fields().iter().map(|f| f.name.as_str()).collect();
    assert!(names.contains(&"entryCount"));
    assert!(!names.contains(&"ping"));

    let token = AccessToken::with_scopes("reader", [Scope::Tags]);
    let schema = service.schema(&token).unwrap();
    let query = schema.get_type("Query").unwrap();
    assert!(query.fields().iter().all(|f| f.name != "entryCount"));
}

#[tokio::test]
async fn test_hook_referencing_unknown_type_fails() {
    let (_, service) = fixture_service().await;
    let service = service.with_hook(Arc::new(GhostHook));

    let err = service.schema(&AccessToken::public()).unwrap_err();
    assert!(
        matches!(&err, GraphQLError::UnresolvableType { name } if name == "contentql::Ghost"),
        "{err}"
    );
}

// =============================================================================
// SDL
// =============================================================================

#[tokio::test]
async fn test_sdl_and_directives() {
    let (_, service) = fixture_service().await;
    let schema = service.schema(&AccessToken::public()).unwrap();

    let sdl = schema.sdl();
    assert!(sdl.contains("interface EntryInterface"));
    assert!(sdl.contains("type article"));
    assert!(sdl.contains("enum TagGroupsEnum"));
    assert!(sdl.contains("directive @date"));

    let directives = schema.directives();
    for name in ["include", "skip", "deprecated", "specifiedBy", "oneOf", "date"] {
        assert!(directives.contains(&name), "{name}");
    }
}
