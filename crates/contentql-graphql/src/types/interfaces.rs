//! Element interfaces.
//!
//! Every element kind has one interface listing the fields all of its
//! concrete types share. Concrete types are built by the type factories from
//! the same field list, so an object always matches the interfaces it
//! implements field for field.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, TypeRef};
use contentql_core::{Element, ElementKind};
use time::OffsetDateTime;

use super::scalars::TIMESTAMP;
use crate::registry::{FieldDescriptor, InterfaceDescriptor, TypeDescriptor, TypeOrigin};
use crate::resolvers::parent_element;

pub const ENTRY_INTERFACE: &str = "EntryInterface";
pub const ASSET_INTERFACE: &str = "AssetInterface";
pub const CATEGORY_INTERFACE: &str = "CategoryInterface";
pub const TAG_INTERFACE: &str = "TagInterface";
pub const GLOBAL_SET_INTERFACE: &str = "GlobalSetInterface";

/// Interface implemented by every concrete type of `kind`.
#[must_use]
pub fn interface_name(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Entry => ENTRY_INTERFACE,
        ElementKind::Asset => ASSET_INTERFACE,
        ElementKind::Category => CATEGORY_INTERFACE,
        ElementKind::Tag => TAG_INTERFACE,
        ElementKind::GlobalSet => GLOBAL_SET_INTERFACE,
    }
}

/// Interface fields whose value is a property of the owning definition
/// rather than of the element. Objects resolve them to constants.
#[must_use]
pub fn owner_field_names(kind: ElementKind) -> &'static [&'static str] {
    match kind {
        ElementKind::Entry => &["sectionHandle", "typeHandle"],
        ElementKind::Asset => &["volumeHandle"],
        ElementKind::Category | ElementKind::Tag => &["groupHandle"],
        ElementKind::GlobalSet => &["name", "handle"],
    }
}

fn timestamp(value: OffsetDateTime) -> Value {
    Value::Number(value.unix_timestamp().into())
}

fn element_field(
    name: &'static str,
    ty: TypeRef,
    description: &'static str,
    get: fn(&Element) -> Option<Value>,
) -> FieldDescriptor {
    FieldDescriptor::new(name, ty)
        .description(description)
        .resolve(move |ctx| {
            FieldFuture::new(async move {
                let element = parent_element(&ctx)?;
                Ok(get(element))
            })
        })
}

fn owner_field(name: &'static str, description: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(name, TypeRef::named_nn(TypeRef::STRING)).description(description)
}

fn id_field() -> FieldDescriptor {
    element_field("id", TypeRef::named_nn(TypeRef::ID), "Element id", |e| {
        Some(Value::String(e.id.to_string()))
    })
}

fn title_field() -> FieldDescriptor {
    element_field("title", TypeRef::named_nn(TypeRef::STRING), "Title", |e| {
        Some(Value::String(e.title.clone()))
    })
}

fn slug_field() -> FieldDescriptor {
    element_field("slug", TypeRef::named(TypeRef::STRING), "URL slug", |e| {
        e.slug.clone().map(Value::String)
    })
}

fn uri_field() -> FieldDescriptor {
    element_field("uri", TypeRef::named(TypeRef::STRING), "URI", |e| {
        e.uri.clone().map(Value::String)
    })
}

fn date_fields() -> [FieldDescriptor; 2] {
    [
        element_field(
            "dateCreated",
            TypeRef::named_nn(TIMESTAMP),
            "Creation time",
            |e| Some(timestamp(e.date_created)),
        ),
        element_field(
            "dateUpdated",
            TypeRef::named_nn(TIMESTAMP),
            "Last update time",
            |e| Some(timestamp(e.date_updated)),
        ),
    ]
}

/// Fields of the interface of `kind`, with resolvers reading the parent
/// [`Element`]. Owner fields carry no resolver; see [`object_fields`].
#[must_use]
pub fn interface_fields(kind: ElementKind) -> Vec<FieldDescriptor> {
    match kind {
        ElementKind::Entry => {
            let [created, updated] = date_fields();
            vec![
                id_field(),
                title_field(),
                slug_field(),
                uri_field(),
                created,
                updated,
                element_field(
                    "postDate",
                    TypeRef::named(TIMESTAMP),
                    "Publication time",
                    |e| e.post_date.map(timestamp),
                ),
                owner_field("sectionHandle", "Handle of the entry's section"),
                owner_field("typeHandle", "Handle of the entry's type"),
            ]
        }
        ElementKind::Asset => {
            let [created, updated] = date_fields();
            vec![
                id_field(),
                title_field(),
                uri_field(),
                created,
                updated,
                owner_field("volumeHandle", "Handle of the asset's volume"),
            ]
        }
        ElementKind::Category => {
            let [created, updated] = date_fields();
            vec![
                id_field(),
                title_field(),
                slug_field(),
                uri_field(),
                created,
                updated,
                owner_field("groupHandle", "Handle of the category group"),
            ]
        }
        ElementKind::Tag => {
            let [created, updated] = date_fields();
            vec![
                id_field(),
                title_field(),
                slug_field(),
                created,
                updated,
                owner_field("groupHandle", "Handle of the tag group"),
            ]
        }
        ElementKind::GlobalSet => vec![
            id_field(),
            owner_field("name", "Name of the global set"),
            owner_field("handle", "Handle of the global set"),
        ],
    }
}

/// Interface fields with owner fields bound to constant values.
///
/// `owner_values` pairs owner field names with their value; every name in
/// [`owner_field_names`] must be present.
#[must_use]
pub fn object_fields(kind: ElementKind, owner_values: &[(&str, &str)]) -> Vec<FieldDescriptor> {
    interface_fields(kind)
        .into_iter()
        .map(|field| {
            match owner_values.iter().find(|(name, _)| *name == field.name) {
                Some((_, value)) => {
                    let value = value.to_string();
                    field.resolve(move |_| FieldFuture::from_value(Some(Value::String(value.clone()))))
                }
                None => field,
            }
        })
        .collect()
}

/// Descriptor of the interface of `kind`.
#[must_use]
pub fn interface_descriptor(kind: ElementKind) -> TypeDescriptor {
    let description = match kind {
        ElementKind::Entry => "Fields shared by every entry type",
        ElementKind::Asset => "Fields shared by every volume",
        ElementKind::Category => "Fields shared by every category group",
        ElementKind::Tag => "Fields shared by every tag group",
        ElementKind::GlobalSet => "Fields shared by every global set",
    };
    let mut interface =
        InterfaceDescriptor::new(interface_name(kind), TypeOrigin::Builtin).description(description);
    for field in interface_fields(kind) {
        interface = interface.field(field);
    }
    TypeDescriptor::Interface(interface)
}
