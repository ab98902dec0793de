//! Content repositories.
//!
//! A repository is a read-only, cached accessor over one definition category
//! of the [`ContentStore`]. `load()` populates the cache once; `reload()`
//! refreshes it after the host model changed. Reads before the first load
//! fail with [`RepositoryError::NotLoaded`] rather than loading implicitly.
//!
//! [`ContentRepositories`] publishes a whole [`ContentSnapshot`] at once,
//! after every category has been fetched, so schema builds never mix
//! definitions from before and after a reload.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::RepositoryError;
use crate::model::{
    CategoryGroup, ContentCategory, ContentDefinition, DefinitionId, EntryType, FieldDefinition, GlobalSet, Section,
    TagGroup, Volume,
};
use crate::store::DynContentStore;

/// Cached list of definitions of one category.
pub struct Repository<D: ContentDefinition> {
    store: DynContentStore,
    items: ArcSwapOption<Vec<D>>,
}

impl<D: ContentDefinition> Repository<D> {
    #[must_use]
    pub fn new(store: DynContentStore) -> Self {
        Self {
            store,
            items: ArcSwapOption::empty(),
        }
    }

    /// Populates the cache if it is empty. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn load(&self) -> Result<(), RepositoryError> {
        if self.is_loaded() {
            return Ok(());
        }
        self.reload().await
    }

    /// Re-fetches the definitions from the store, replacing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails; the previous cache is kept.
    pub async fn reload(&self) -> Result<(), RepositoryError> {
        let items = self.fetch().await?;
        self.publish(items);
        Ok(())
    }

    /// Fetches the definitions without touching the cache.
    async fn fetch(&self) -> Result<Arc<Vec<D>>, RepositoryError> {
        let items = D::fetch(self.store.as_ref()).await?;
        debug!(
            category = %D::CATEGORY,
            count = items.len(),
            backend = self.store.backend_name(),
            "Loaded content definitions"
        );
        Ok(Arc::new(items))
    }

    fn publish(&self, items: Arc<Vec<D>>) {
        self.items.store(Some(items));
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.items.load().is_some()
    }

    /// Returns the loaded definitions in host order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotLoaded` before the first `load()`.
    pub fn all(&self) -> Result<Arc<Vec<D>>, RepositoryError> {
        self.items
            .load_full()
            .ok_or_else(|| RepositoryError::not_loaded(D::CATEGORY))
    }

    /// Looks up a definition by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotLoaded` before the first `load()`.
    pub fn get(&self, id: DefinitionId) -> Result<Option<D>, RepositoryError> {
        Ok(self.all()?.iter().find(|d| d.id() == id).cloned())
    }

    /// Looks up a definition by handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotLoaded` before the first `load()`.
    pub fn find(&self, handle: &str) -> Result<Option<D>, RepositoryError> {
        Ok(self.all()?.iter().find(|d| d.handle() == handle).cloned())
    }
}

/// A consistent view of every repository, taken at one point in time.
#[derive(Debug, Clone)]
pub struct ContentSnapshot {
    pub sections: Arc<Vec<Section>>,
    pub entry_types: Arc<Vec<EntryType>>,
    pub volumes: Arc<Vec<Volume>>,
    pub category_groups: Arc<Vec<CategoryGroup>>,
    pub tag_groups: Arc<Vec<TagGroup>>,
    pub global_sets: Arc<Vec<GlobalSet>>,
    pub fields: Arc<Vec<FieldDefinition>>,
}

impl ContentSnapshot {
    /// Returns the custom field with the given handle.
    #[must_use]
    pub fn field(&self, handle: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.handle == handle)
    }

    #[must_use]
    pub fn section(&self, id: DefinitionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// All repositories of a host, loaded and reloaded together.
///
/// Reloading an individual repository refreshes its own cache only; the
/// published [`ContentSnapshot`] changes with [`reload_all`](Self::reload_all).
pub struct ContentRepositories {
    pub sections: Repository<Section>,
    pub entry_types: Repository<EntryType>,
    pub volumes: Repository<Volume>,
    pub category_groups: Repository<CategoryGroup>,
    pub tag_groups: Repository<TagGroup>,
    pub global_sets: Repository<GlobalSet>,
    pub fields: Repository<FieldDefinition>,
    published: ArcSwapOption<ContentSnapshot>,
    reload_lock: Mutex<()>,
}

impl ContentRepositories {
    #[must_use]
    pub fn new(store: DynContentStore) -> Self {
        Self {
            sections: Repository::new(store.clone()),
            entry_types: Repository::new(store.clone()),
            volumes: Repository::new(store.clone()),
            category_groups: Repository::new(store.clone()),
            tag_groups: Repository::new(store.clone()),
            global_sets: Repository::new(store.clone()),
            fields: Repository::new(store),
            published: ArcSwapOption::empty(),
            reload_lock: Mutex::new(()),
        }
    }

    /// Loads every repository and publishes the first snapshot. A no-op once
    /// a snapshot is published.
    ///
    /// # Errors
    ///
    /// Returns the first store error.
    pub async fn load_all(&self) -> Result<(), RepositoryError> {
        if self.published.load().is_some() {
            return Ok(());
        }
        self.reload_all().await
    }

    /// Re-fetches every repository, then swaps all caches and the snapshot.
    /// Nothing changes if any fetch fails.
    ///
    /// # Errors
    ///
    /// Returns the first store error.
    pub async fn reload_all(&self) -> Result<(), RepositoryError> {
        let _guard = self.reload_lock.lock().await;
        let (volumes, category_groups, tag_groups, entry_types, sections, global_sets, fields) =
            futures_util::try_join!(
                self.volumes.fetch(),
                self.category_groups.fetch(),
                self.tag_groups.fetch(),
                self.entry_types.fetch(),
                self.sections.fetch(),
                self.global_sets.fetch(),
                self.fields.fetch(),
            )?;

        let snapshot = ContentSnapshot {
            sections: sections.clone(),
            entry_types: entry_types.clone(),
            volumes: volumes.clone(),
            category_groups: category_groups.clone(),
            tag_groups: tag_groups.clone(),
            global_sets: global_sets.clone(),
            fields: fields.clone(),
        };
        self.sections.publish(sections);
        self.entry_types.publish(entry_types);
        self.volumes.publish(volumes);
        self.category_groups.publish(category_groups);
        self.tag_groups.publish(tag_groups);
        self.global_sets.publish(global_sets);
        self.fields.publish(fields);
        self.published.store(Some(Arc::new(snapshot)));

        info!("Content repositories reloaded");
        Ok(())
    }

    /// Returns the last published snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotLoaded` before the first `load_all()`.
    pub fn snapshot(&self) -> Result<ContentSnapshot, RepositoryError> {
        self.published
            .load_full()
            .map(|snapshot| ContentSnapshot::clone(&snapshot))
            .ok_or_else(|| RepositoryError::not_loaded(ContentCategory::Section))
    }
}
