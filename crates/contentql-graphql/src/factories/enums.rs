//! Enums of definition handles, built from live data on every build.

use std::sync::Arc;

use contentql_core::{ContentDefinition, ContentSnapshot};
use tracing::warn;

use crate::error::GraphQLError;
use crate::registry::{EnumDescriptor, TypeDescriptor, TypeOrigin, TypeRegistry, is_valid_graphql_name};

pub const SECTIONS_ENUM: &str = "SectionsEnum";
pub const ENTRY_TYPES_ENUM: &str = "EntryTypesEnum";
pub const VOLUMES_ENUM: &str = "VolumesEnum";
pub const CATEGORY_GROUPS_ENUM: &str = "CategoryGroupsEnum";
pub const TAG_GROUPS_ENUM: &str = "TagGroupsEnum";

/// Builds an enum with one value per definition handle, described by the
/// definition's name.
///
/// Returns `None` when no definition yields a usable value, since GraphQL
/// enums cannot be empty. `true`, `false` and `null` are not valid enum
/// values and are skipped.
#[must_use]
pub fn definition_enum<D: ContentDefinition>(
    name: &str,
    definitions: &[D],
) -> Option<TypeDescriptor> {
    let mut descriptor = EnumDescriptor::new(name, TypeOrigin::Builtin)
        .description(format!("Handles of every {}", D::CATEGORY));
    for definition in definitions {
        let handle = definition.handle();
        if !is_valid_graphql_name(handle) || matches!(handle, "true" | "false" | "null") {
            warn!(enum_name = name, handle = %handle, "Handle is not a valid enum value, skipping");
            continue;
        }
        descriptor = descriptor.value(handle, Some(definition.name().to_string()));
    }
    if descriptor.values.is_empty() {
        return None;
    }
    Some(TypeDescriptor::Enum(descriptor))
}

/// Registers the handle enums of every non-empty category.
///
/// # Errors
///
/// Fails if an enum name is already taken.
pub fn register_content_enums(
    registry: &mut TypeRegistry,
    snapshot: &ContentSnapshot,
) -> Result<(), GraphQLError> {
    let enums = [
        definition_enum(SECTIONS_ENUM, &snapshot.sections),
        definition_enum(ENTRY_TYPES_ENUM, &snapshot.entry_types),
        definition_enum(VOLUMES_ENUM, &snapshot.volumes),
        definition_enum(CATEGORY_GROUPS_ENUM, &snapshot.category_groups),
        definition_enum(TAG_GROUPS_ENUM, &snapshot.tag_groups),
    ];
    for descriptor in enums.into_iter().flatten() {
        let name = descriptor.name().to_string();
        registry.register_type(&name, Arc::new(descriptor))?;
    }
    Ok(())
}
