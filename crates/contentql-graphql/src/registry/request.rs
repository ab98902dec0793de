//! State of one schema build.

use contentql_core::ContentSnapshot;

use super::type_registry::TypeRegistry;
use crate::error::GraphQLError;
use crate::factories::{
    CategoryGroupFactory, EntryTypeFactory, FactoryAdapter, GlobalSetFactory, SectionFactory,
    TagGroupFactory, VolumeFactory,
};
use crate::schema::query::QUERY;
use crate::token::AccessToken;
use crate::types::date_format::DATE_FORMAT_TYPES;

/// A fresh registry plus the factory adapters of every category, bound to
/// one snapshot of the content model. Dropped when the build ends.
pub struct SchemaRequest {
    registry: TypeRegistry,
    snapshot: ContentSnapshot,
    category_groups: FactoryAdapter<CategoryGroupFactory>,
    entry_types: FactoryAdapter<EntryTypeFactory>,
    volumes: FactoryAdapter<VolumeFactory>,
    sections: FactoryAdapter<SectionFactory>,
    tag_groups: FactoryAdapter<TagGroupFactory>,
    globals: FactoryAdapter<GlobalSetFactory>,
    type_list: Option<Vec<String>>,
}

impl SchemaRequest {
    /// Creates the registry scoped to `token` and attaches the adapters.
    #[must_use]
    pub fn new(token: AccessToken, snapshot: ContentSnapshot) -> Self {
        let fields = snapshot.fields.clone();
        Self {
            registry: TypeRegistry::new(token),
            category_groups: FactoryAdapter::new(
                CategoryGroupFactory::new(fields.clone()),
                snapshot.category_groups.clone(),
            ),
            entry_types: FactoryAdapter::new(
                EntryTypeFactory::new(snapshot.sections.clone(), fields.clone()),
                snapshot.entry_types.clone(),
            ),
            volumes: FactoryAdapter::new(
                VolumeFactory::new(fields.clone()),
                snapshot.volumes.clone(),
            ),
            sections: FactoryAdapter::new(SectionFactory, snapshot.sections.clone()),
            tag_groups: FactoryAdapter::new(
                TagGroupFactory::new(fields.clone()),
                snapshot.tag_groups.clone(),
            ),
            globals: FactoryAdapter::new(GlobalSetFactory::new(fields), snapshot.global_sets.clone()),
            snapshot,
            type_list: None,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn snapshot(&self) -> &ContentSnapshot {
        &self.snapshot
    }

    /// Registers the type of every definition under its handle: entry types,
    /// volumes, global sets, then category groups. Section interfaces are
    /// registered on the way by the entry types that implement them.
    ///
    /// # Errors
    ///
    /// `DuplicateType` on the first handle collision, across categories.
    pub fn register_definitions(&mut self) -> Result<(), GraphQLError> {
        self.entry_types.types(&mut self.registry)?;
        self.volumes.types(&mut self.registry)?;
        self.globals.types(&mut self.registry)?;
        self.category_groups.types(&mut self.registry)?;
        Ok(())
    }

    /// Names of the types exported with the schema, computed once per build:
    /// entry types, volumes, category groups, tag groups, sections,
    /// `DateFormatTypes`, then the concrete types of the Query root.
    ///
    /// # Errors
    ///
    /// Fails if building a remaining adapter hits a collision.
    pub fn type_list(&mut self) -> Result<Vec<String>, GraphQLError> {
        if let Some(list) = &self.type_list {
            return Ok(list.clone());
        }

        let registry = &mut self.registry;
        let mut names = self.entry_types.type_names(registry)?;
        names.extend(self.volumes.type_names(registry)?);
        names.extend(self.category_groups.type_names(registry)?);
        names.extend(self.tag_groups.type_names(registry)?);
        names.extend(self.sections.type_names(registry)?);
        names.push(DATE_FORMAT_TYPES.to_string());
        if let Some(query) = registry.get_type_builder(QUERY) {
            names.extend(query.concrete_types.iter().cloned());
        }

        let mut list: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !list.contains(&name) {
                list.push(name);
            }
        }
        self.type_list = Some(list.clone());
        Ok(list)
    }

    /// Ends the build, keeping the registry.
    #[must_use]
    pub fn into_registry(self) -> TypeRegistry {
        self.registry
    }
}
