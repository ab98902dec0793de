//! `SectionInfo`: sections as data, for the `sections` root field.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, TypeRef};
use contentql_core::{ContentSnapshot, Section};
use serde_json::json;

use crate::registry::{FieldDescriptor, ObjectDescriptor, TypeDescriptor, TypeOrigin};

pub const SECTION_INFO: &str = "SectionInfo";

/// Resolves a field by key from a parent `Value::Object`.
fn value_field(name: &'static str, ty: TypeRef) -> FieldDescriptor {
    FieldDescriptor::new(name, ty).resolve(move |ctx| {
        FieldFuture::new(async move {
            if let Some(Value::Object(obj)) = ctx.parent_value.as_value() {
                return Ok(obj.get(name).cloned());
            }
            Ok(None)
        })
    })
}

#[must_use]
pub fn section_info_object() -> TypeDescriptor {
    TypeDescriptor::Object(
        ObjectDescriptor::new(SECTION_INFO, TypeOrigin::Builtin)
            .description("A section of the content model")
            .field(value_field("id", TypeRef::named_nn(TypeRef::ID)))
            .field(value_field("name", TypeRef::named_nn(TypeRef::STRING)))
            .field(value_field("handle", TypeRef::named_nn(TypeRef::STRING)))
            .field(value_field("type", TypeRef::named_nn(TypeRef::STRING)))
            .field(value_field("hasUrls", TypeRef::named_nn(TypeRef::BOOLEAN)))
            .field(value_field(
                "entryTypes",
                TypeRef::named_nn_list_nn(TypeRef::STRING),
            )),
    )
}

/// Parent value of a `SectionInfo` object.
#[must_use]
pub fn section_info_value(section: &Section, snapshot: &ContentSnapshot) -> Value {
    let entry_types: Vec<&str> = section
        .entry_types
        .iter()
        .filter_map(|id| snapshot.entry_types.iter().find(|et| et.id == *id))
        .map(|et| et.handle.as_str())
        .collect();

    let json = json!({
        "id": section.id.to_string(),
        "name": section.name,
        "handle": section.handle,
        "type": section.kind.as_str(),
        "hasUrls": section.has_urls,
        "entryTypes": entry_types,
    });
    Value::from_json(json).unwrap_or(Value::Null)
}
