//! The Query root type.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, TypeRef};
use contentql_core::{ContentSnapshot, ElementKind};
use indexmap::IndexMap;

use crate::factories::enums::{
    CATEGORY_GROUPS_ENUM, ENTRY_TYPES_ENUM, SECTIONS_ENUM, TAG_GROUPS_ENUM, VOLUMES_ENUM,
};
use crate::registry::{
    ArgumentDescriptor, FieldDescriptor, ObjectDescriptor, TypeBuilder, TypeDescriptor, TypeOrigin,
    TypeRegistry,
};
use crate::resolvers::{resolve_element, resolve_elements, resolve_sections};
use crate::token::Scope;
use crate::types::interfaces::interface_name;
use crate::types::section_info::SECTION_INFO;

/// Name of the query root type.
pub const QUERY: &str = "Query";

fn pagination(field: FieldDescriptor) -> FieldDescriptor {
    field
        .argument(
            ArgumentDescriptor::new("limit", TypeRef::named(TypeRef::INT))
                .description("Maximum number of results"),
        )
        .argument(
            ArgumentDescriptor::new("offset", TypeRef::named(TypeRef::INT))
                .description("Number of results to skip"),
        )
}

fn ids(field: FieldDescriptor) -> FieldDescriptor {
    field.argument(
        ArgumentDescriptor::new("id", TypeRef::named_list(TypeRef::INT))
            .description("Only return elements with these ids"),
    )
}

fn slug(field: FieldDescriptor) -> FieldDescriptor {
    field.argument(ArgumentDescriptor::new("slug", TypeRef::named(TypeRef::STRING)))
}

/// Adds an enum filter argument if the enum exists in this build.
fn enum_filter(
    field: FieldDescriptor,
    registry: &TypeRegistry,
    name: &str,
    enum_name: &str,
    description: &str,
) -> FieldDescriptor {
    if !registry.contains(enum_name) {
        return field;
    }
    field.argument(
        ArgumentDescriptor::new(name, TypeRef::named_list(enum_name)).description(description),
    )
}

/// Builder of the Query root.
///
/// Created with the standard fields the caller's token may see, then handed
/// to every [`QuerySchemaHook`](super::QuerySchemaHook) before it is
/// registered. Hooks may add, replace or remove fields and contribute extra
/// types.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    fields: IndexMap<String, FieldDescriptor>,
    concrete_types: Vec<String>,
    types: Vec<Arc<TypeDescriptor>>,
}

impl QueryBuilder {
    /// Creates a builder without any field.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a builder with the standard root fields.
    ///
    /// A field is present when the registry's token grants its scope and its
    /// category has at least one definition. `ping` is always present.
    #[must_use]
    pub fn new(registry: &TypeRegistry, snapshot: &ContentSnapshot) -> Self {
        let token = registry.token();
        let mut builder = Self::empty();

        builder.add_field(
            FieldDescriptor::new("ping", TypeRef::named_nn(TypeRef::STRING))
                .description("Responds with \"pong\"")
                .resolve(|_| FieldFuture::from_value(Some(Value::String("pong".to_string())))),
        );

        if token.can(Scope::Entries) && !snapshot.entry_types.is_empty() {
            let list = FieldDescriptor::new(
                "entries",
                TypeRef::named_nn_list_nn(interface_name(ElementKind::Entry)),
            )
            .description("Entries matching the given filters")
            .resolve(|ctx| resolve_elements(ctx, ElementKind::Entry));
            let list = entry_filters(slug(ids(pagination(list))), registry);
            builder.add_field(list);

            let single = FieldDescriptor::new("entry", TypeRef::named(interface_name(ElementKind::Entry)))
                .description("The first entry matching the given filters")
                .argument(ArgumentDescriptor::new("id", TypeRef::named(TypeRef::INT)))
                .resolve(|ctx| resolve_element(ctx, ElementKind::Entry));
            builder.add_field(entry_filters(slug(single), registry));

            for entry_type in snapshot.entry_types.iter() {
                builder.add_concrete_type(&entry_type.handle);
            }
        }

        if token.can(Scope::Assets) && !snapshot.volumes.is_empty() {
            let field = FieldDescriptor::new(
                "assets",
                TypeRef::named_nn_list_nn(interface_name(ElementKind::Asset)),
            )
            .description("Assets matching the given filters")
            .resolve(|ctx| resolve_elements(ctx, ElementKind::Asset));
            let field = enum_filter(
                ids(pagination(field)),
                registry,
                "volume",
                VOLUMES_ENUM,
                "Only return assets of these volumes",
            );
            builder.add_field(field);
            for volume in snapshot.volumes.iter() {
                builder.add_concrete_type(&volume.handle);
            }
        }

        if token.can(Scope::Categories) && !snapshot.category_groups.is_empty() {
            let field = FieldDescriptor::new(
                "categories",
                TypeRef::named_nn_list_nn(interface_name(ElementKind::Category)),
            )
            .description("Categories matching the given filters")
            .resolve(|ctx| resolve_elements(ctx, ElementKind::Category));
            let field = enum_filter(
                slug(ids(pagination(field))),
                registry,
                "group",
                CATEGORY_GROUPS_ENUM,
                "Only return categories of these groups",
            );
            builder.add_field(field);
            for group in snapshot.category_groups.iter() {
                builder.add_concrete_type(&group.handle);
            }
        }

        if token.can(Scope::Tags) && !snapshot.tag_groups.is_empty() {
            let field = FieldDescriptor::new(
                "tags",
                TypeRef::named_nn_list_nn(interface_name(ElementKind::Tag)),
            )
            .description("Tags matching the given filters")
            .resolve(|ctx| resolve_elements(ctx, ElementKind::Tag));
            let field = enum_filter(
                slug(ids(pagination(field))),
                registry,
                "group",
                TAG_GROUPS_ENUM,
                "Only return tags of these groups",
            );
            builder.add_field(field);
            for group in snapshot.tag_groups.iter() {
                builder.add_concrete_type(&group.handle);
            }
        }

        if token.can(Scope::Globals) && !snapshot.global_sets.is_empty() {
            builder.add_field(
                FieldDescriptor::new(
                    "globals",
                    TypeRef::named_nn_list_nn(interface_name(ElementKind::GlobalSet)),
                )
                .description("Content of global sets")
                .argument(
                    ArgumentDescriptor::new("handle", TypeRef::named_list(TypeRef::STRING))
                        .description("Only return these global sets"),
                )
                .resolve(|ctx| resolve_elements(ctx, ElementKind::GlobalSet)),
            );
            for global in snapshot.global_sets.iter() {
                builder.add_concrete_type(&global.handle);
            }
        }

        if token.can(Scope::Sections) && !snapshot.sections.is_empty() {
            let field = FieldDescriptor::new("sections", TypeRef::named_nn_list_nn(SECTION_INFO))
                .description("Sections of the content model")
                .resolve(resolve_sections);
            builder.add_field(enum_filter(
                field,
                registry,
                "handle",
                SECTIONS_ENUM,
                "Only return these sections",
            ));
            builder.add_concrete_type(SECTION_INFO);
        }

        builder
    }

    /// Adds a field, replacing any field of the same name.
    pub fn add_field(&mut self, field: FieldDescriptor) -> &mut Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn remove_field(&mut self, name: &str) -> Option<FieldDescriptor> {
        self.fields.shift_remove(name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Records a concrete object type reachable through a polymorphic field.
    pub fn add_concrete_type(&mut self, name: &str) -> &mut Self {
        if !self.concrete_types.iter().any(|n| n == name) {
            self.concrete_types.push(name.to_string());
        }
        self
    }

    #[must_use]
    pub fn concrete_types(&self) -> &[String] {
        &self.concrete_types
    }

    /// Contributes a type registered together with the Query root.
    pub fn add_type(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.push(Arc::new(descriptor));
        self
    }

    /// Splits the builder into the root descriptor, its builder record and
    /// the contributed types.
    #[must_use]
    pub fn finish(self) -> (ObjectDescriptor, TypeBuilder, Vec<Arc<TypeDescriptor>>) {
        let mut object = ObjectDescriptor::new(QUERY, TypeOrigin::Root);
        for (_, field) in self.fields {
            object = object.field(field);
        }
        let builder = TypeBuilder {
            name: QUERY.to_string(),
            concrete_types: self.concrete_types,
        };
        (object, builder, self.types)
    }
}

fn entry_filters(field: FieldDescriptor, registry: &TypeRegistry) -> FieldDescriptor {
    let field = enum_filter(
        field,
        registry,
        "section",
        SECTIONS_ENUM,
        "Only return entries of these sections",
    );
    enum_filter(
        field,
        registry,
        "type",
        ENTRY_TYPES_ENUM,
        "Only return entries of these entry types",
    )
}
