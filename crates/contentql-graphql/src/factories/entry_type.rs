use std::sync::Arc;

use contentql_core::{ElementKind, EntryType, FieldDefinition, Section};

use super::section::SectionFactory;
use super::{TypeFactory, custom_fields, definition_origin, ensure_definition_type};
use crate::error::GraphQLError;
use crate::registry::{ObjectDescriptor, TypeDescriptor, TypeRegistry};
use crate::types::interfaces::{ENTRY_INTERFACE, object_fields};

/// Builds one object per entry type, implementing `EntryInterface` and the
/// interface of its section.
pub struct EntryTypeFactory {
    sections: Arc<Vec<Section>>,
    fields: Arc<Vec<FieldDefinition>>,
}

impl EntryTypeFactory {
    #[must_use]
    pub fn new(sections: Arc<Vec<Section>>, fields: Arc<Vec<FieldDefinition>>) -> Self {
        Self { sections, fields }
    }
}

impl TypeFactory for EntryTypeFactory {
    type Definition = EntryType;

    fn build(
        &self,
        entry_type: &EntryType,
        registry: &mut TypeRegistry,
    ) -> Result<TypeDescriptor, GraphQLError> {
        let section = self
            .sections
            .iter()
            .find(|s| s.id == entry_type.section_id)
            .ok_or_else(|| {
                GraphQLError::Internal(format!(
                    "Entry type \"{}\" belongs to unknown section {}",
                    entry_type.handle, entry_type.section_id
                ))
            })?;
        let section_type = ensure_definition_type(&SectionFactory, section, registry)?;

        let builtin = object_fields(
            ElementKind::Entry,
            &[
                ("sectionHandle", section.handle.as_str()),
                ("typeHandle", entry_type.handle.as_str()),
            ],
        );
        let custom = custom_fields(&entry_type.handle, &entry_type.field_layout, &self.fields, &builtin)?;

        let mut object = ObjectDescriptor::new(entry_type.handle.clone(), definition_origin(entry_type))
            .description(format!("{} entries of the \"{}\" section", entry_type.name, section.name))
            .implement(ENTRY_INTERFACE)
            .implement(section_type.name());
        for field in builtin.into_iter().chain(custom) {
            object = object.field(field);
        }
        Ok(TypeDescriptor::Object(object))
    }
}
