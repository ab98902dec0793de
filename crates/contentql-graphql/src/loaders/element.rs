//! Element DataLoader.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::Loader;
use contentql_core::{DynContentStore, Element, ElementId};
use tracing::{debug, instrument};

use crate::error::GraphQLError;

/// Batches element lookups by id into one store call.
pub struct ElementLoader {
    store: DynContentStore,
}

impl ElementLoader {
    #[must_use]
    pub fn new(store: DynContentStore) -> Self {
        Self { store }
    }
}

impl Loader<ElementId> for ElementLoader {
    type Value = Element;
    type Error = Arc<GraphQLError>;

    #[instrument(skip(self, keys), fields(key_count = keys.len()))]
    async fn load(&self, keys: &[ElementId]) -> Result<HashMap<ElementId, Element>, Self::Error> {
        let elements = self
            .store
            .elements(keys)
            .await
            .map_err(|e| Arc::new(GraphQLError::from(e)))?;

        debug!(
            requested = keys.len(),
            found = elements.len(),
            backend = self.store.backend_name(),
            "Element batch load complete"
        );

        Ok(elements.into_iter().map(|e| (e.id, e)).collect())
    }
}
