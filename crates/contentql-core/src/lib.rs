//! # contentql-core
//!
//! Content model and content access layer for ContentQL.
//!
//! This crate knows nothing about GraphQL. It describes the runtime-defined
//! schema of the host CMS (sections, entry types, volumes, category groups,
//! tag groups, global sets and custom fields), the content itself
//! ([`Element`]), and the [`ContentStore`] trait through which the host is
//! reached.
//!
//! ## Modules
//!
//! - [`model`] - Content definitions and custom field definitions
//! - [`element`] - Content records
//! - [`store`] - The host content store contract
//! - [`memory`] - In-memory content store used by tests and the demo server
//! - [`repository`] - Cached, read-only accessors over the store
//! - [`error`] - Error types

pub mod element;
pub mod error;
pub mod memory;
pub mod model;
pub mod repository;
pub mod store;

pub use element::{Element, ElementId, ElementKind, ElementOwner};
pub use error::{CoreError, RepositoryError, Result};
pub use memory::{ContentFixture, InMemoryContentStore};
pub use model::{
    CategoryGroup, ContentCategory, ContentDefinition, ContentModel, DefinitionId, EntryType,
    FieldDefinition, FieldKind, GlobalSet, Section, SectionKind, TagGroup, Volume,
};
pub use repository::{ContentRepositories, ContentSnapshot, Repository};
pub use store::{ContentStore, DynContentStore, ElementQuery};
