//! Volumes, category groups, tag groups and global sets.
//!
//! All four map to one object per definition implementing the interface of
//! their element kind, with owner fields bound to the definition and the
//! custom fields of its layout appended.

use std::marker::PhantomData;
use std::sync::Arc;

use contentql_core::{
    CategoryGroup, ContentDefinition, ElementKind, FieldDefinition, GlobalSet, TagGroup, Volume,
};

use super::{TypeFactory, custom_fields, definition_origin};
use crate::error::GraphQLError;
use crate::registry::{ObjectDescriptor, TypeDescriptor, TypeRegistry};
use crate::types::interfaces::{interface_name, object_fields, owner_field_names};

/// Definitions that own elements of a single kind through a field layout.
pub trait LayoutDefinition: ContentDefinition {
    const KIND: ElementKind;

    fn field_layout(&self) -> &[String];
}

macro_rules! layout_definition {
    ($ty:ty, $kind:expr) => {
        impl LayoutDefinition for $ty {
            const KIND: ElementKind = $kind;

            fn field_layout(&self) -> &[String] {
                &self.field_layout
            }
        }
    };
}

layout_definition!(Volume, ElementKind::Asset);
layout_definition!(CategoryGroup, ElementKind::Category);
layout_definition!(TagGroup, ElementKind::Tag);
layout_definition!(GlobalSet, ElementKind::GlobalSet);

/// Factory shared by every [`LayoutDefinition`].
pub struct GroupFactory<D> {
    fields: Arc<Vec<FieldDefinition>>,
    _definition: PhantomData<fn() -> D>,
}

impl<D> GroupFactory<D> {
    #[must_use]
    pub fn new(fields: Arc<Vec<FieldDefinition>>) -> Self {
        Self {
            fields,
            _definition: PhantomData,
        }
    }
}

pub type VolumeFactory = GroupFactory<Volume>;
pub type CategoryGroupFactory = GroupFactory<CategoryGroup>;
pub type TagGroupFactory = GroupFactory<TagGroup>;
pub type GlobalSetFactory = GroupFactory<GlobalSet>;

impl<D: LayoutDefinition> TypeFactory for GroupFactory<D> {
    type Definition = D;

    fn build(
        &self,
        definition: &D,
        _registry: &mut TypeRegistry,
    ) -> Result<TypeDescriptor, GraphQLError> {
        let owner_values: Vec<(&str, &str)> = owner_field_names(D::KIND)
            .iter()
            .map(|&field| match field {
                "name" => (field, definition.name()),
                _ => (field, definition.handle()),
            })
            .collect();

        let builtin = object_fields(D::KIND, &owner_values);
        let custom = custom_fields(
            definition.handle(),
            definition.field_layout(),
            &self.fields,
            &builtin,
        )?;

        let mut object = ObjectDescriptor::new(definition.handle(), definition_origin(definition))
            .description(format!("{} \"{}\"", D::CATEGORY, definition.name()))
            .implement(interface_name(D::KIND));
        for field in builtin.into_iter().chain(custom) {
            object = object.field(field);
        }
        Ok(TypeDescriptor::Object(object))
    }
}
