//! DataLoaders for batched element loading.
//!
//! Loaders are created per request and stored in the [`ContentContext`], so
//! batching and caching never span two requests.
//!
//! [`ContentContext`]: crate::context::ContentContext

mod element;

pub use element::ElementLoader;

use std::sync::Arc;

use async_graphql::dataloader::DataLoader;
use contentql_core::DynContentStore;

/// Collection of all DataLoaders for a GraphQL request.
#[derive(Clone)]
pub struct DataLoaders {
    /// Loader for fetching elements by id.
    pub elements: Arc<DataLoader<ElementLoader>>,
}

impl DataLoaders {
    #[must_use]
    pub fn new(store: DynContentStore) -> Self {
        Self {
            elements: Arc::new(DataLoader::new(ElementLoader::new(store), tokio::spawn)),
        }
    }
}

impl std::fmt::Debug for DataLoaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoaders")
            .field("elements", &"DataLoader<ElementLoader>")
            .finish()
    }
}
