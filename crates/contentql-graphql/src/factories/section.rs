use contentql_core::{ElementKind, Section};

use super::{TypeFactory, definition_origin};
use crate::error::GraphQLError;
use crate::registry::{InterfaceDescriptor, TypeDescriptor, TypeRegistry};
use crate::types::interfaces::interface_fields;

/// Sections become interfaces carrying the `EntryInterface` fields, so a
/// query can select `... on news { title }` across every entry type of the
/// section.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionFactory;

impl TypeFactory for SectionFactory {
    type Definition = Section;

    fn build(
        &self,
        section: &Section,
        _registry: &mut TypeRegistry,
    ) -> Result<TypeDescriptor, GraphQLError> {
        let mut interface = InterfaceDescriptor::new(section.handle.clone(), definition_origin(section))
            .description(format!("Entries of the \"{}\" section", section.name));
        for field in interface_fields(ElementKind::Entry) {
            interface = interface.field(field);
        }
        Ok(TypeDescriptor::Interface(interface))
    }
}
