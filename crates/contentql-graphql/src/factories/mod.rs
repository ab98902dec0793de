//! Type factories.
//!
//! A factory turns one content definition into a [`TypeDescriptor`]. It may
//! register nested types it discovers on the way (an entry type registers
//! its section's interface) but never registers the descriptor it returns;
//! that is the job of [`ensure_definition_type`], which also makes sure a
//! definition is built only once per schema build.

mod entry_type;
pub mod enums;
mod fields;
mod groups;
mod section;

pub use entry_type::EntryTypeFactory;
pub use fields::{custom_fields, field_type};
pub use groups::{
    CategoryGroupFactory, GlobalSetFactory, GroupFactory, LayoutDefinition, TagGroupFactory,
    VolumeFactory,
};
pub use section::SectionFactory;

use std::sync::Arc;

use contentql_core::ContentDefinition;
use tracing::debug;

use crate::error::GraphQLError;
use crate::registry::{TypeDescriptor, TypeOrigin, TypeRegistry};

/// Builds the GraphQL type of a content definition.
pub trait TypeFactory: Send + Sync {
    type Definition: ContentDefinition;

    /// Produces the descriptor of `definition`, named by its handle.
    ///
    /// # Errors
    ///
    /// Fails if a nested type cannot be registered or a custom field handle
    /// is not a valid GraphQL name.
    fn build(
        &self,
        definition: &Self::Definition,
        registry: &mut TypeRegistry,
    ) -> Result<TypeDescriptor, GraphQLError>;
}

/// Origin recorded on descriptors built from `definition`.
#[must_use]
pub fn definition_origin<D: ContentDefinition>(definition: &D) -> TypeOrigin {
    TypeOrigin::Definition {
        category: D::CATEGORY,
        id: definition.id(),
    }
}

/// Returns the registered type of `definition`, building and registering it
/// on first use.
///
/// # Errors
///
/// `DuplicateType` if the handle is already taken by a type that was not
/// built from this definition, plus any error of the factory.
pub fn ensure_definition_type<F: TypeFactory>(
    factory: &F,
    definition: &F::Definition,
    registry: &mut TypeRegistry,
) -> Result<Arc<TypeDescriptor>, GraphQLError> {
    let handle = definition.handle();
    if let Some(existing) = registry.get_type(handle) {
        if existing.origin() == definition_origin(definition) {
            return Ok(existing);
        }
        return Err(GraphQLError::DuplicateType {
            name: handle.to_string(),
        });
    }

    let descriptor = Arc::new(factory.build(definition, registry)?);
    registry.register_type(handle, descriptor.clone())?;
    Ok(descriptor)
}

/// A factory bound to the definitions of its category for one build.
///
/// Descriptors are built lazily, on the first call to
/// [`types`](Self::types), and reused afterwards.
pub struct FactoryAdapter<F: TypeFactory> {
    factory: F,
    definitions: Arc<Vec<F::Definition>>,
    built: Option<Vec<Arc<TypeDescriptor>>>,
}

impl<F: TypeFactory> FactoryAdapter<F> {
    #[must_use]
    pub fn new(factory: F, definitions: Arc<Vec<F::Definition>>) -> Self {
        Self {
            factory,
            definitions,
            built: None,
        }
    }

    #[must_use]
    pub fn definitions(&self) -> &[F::Definition] {
        &self.definitions
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Descriptors of every definition, in host order.
    ///
    /// # Errors
    ///
    /// Returns the first build or registration error.
    pub fn types(
        &mut self,
        registry: &mut TypeRegistry,
    ) -> Result<Vec<Arc<TypeDescriptor>>, GraphQLError> {
        if let Some(built) = &self.built {
            return Ok(built.clone());
        }

        let mut built = Vec::with_capacity(self.definitions.len());
        for definition in self.definitions.iter() {
            built.push(ensure_definition_type(&self.factory, definition, registry)?);
        }
        debug!(
            category = %F::Definition::CATEGORY,
            count = built.len(),
            "Built definition types"
        );
        self.built = Some(built.clone());
        Ok(built)
    }

    /// Names of the descriptors returned by [`types`](Self::types).
    ///
    /// # Errors
    ///
    /// Same as [`types`](Self::types).
    pub fn type_names(&mut self, registry: &mut TypeRegistry) -> Result<Vec<String>, GraphQLError> {
        Ok(self
            .types(registry)?
            .iter()
            .map(|t| t.name().to_string())
            .collect())
    }
}
