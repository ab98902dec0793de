//! Content-independent GraphQL types.
//!
//! - [`interfaces`] - One interface per element kind
//! - [`scalars`] - The `Timestamp` scalar
//! - [`date_format`] - The fixed `DateFormatTypes` enum
//! - [`section_info`] - Sections exposed as data

pub mod date_format;
pub mod interfaces;
pub mod scalars;
pub mod section_info;

pub use date_format::{DATE_FORMAT_TYPES, DateFormat, date_format_types_enum};
pub use interfaces::{
    ASSET_INTERFACE, CATEGORY_INTERFACE, ENTRY_INTERFACE, GLOBAL_SET_INTERFACE, TAG_INTERFACE,
    interface_descriptor, interface_name,
};
pub use scalars::{TIMESTAMP, timestamp_scalar};
pub use section_info::{SECTION_INFO, section_info_object};

use std::sync::Arc;

use contentql_core::ElementKind;

use crate::error::GraphQLError;
use crate::registry::TypeRegistry;

/// Registers the interfaces, scalars and data objects every build needs.
///
/// # Errors
///
/// Fails if one of the names is already taken.
pub fn register_base_types(registry: &mut TypeRegistry) -> Result<(), GraphQLError> {
    let kinds = [
        ElementKind::Entry,
        ElementKind::Asset,
        ElementKind::Category,
        ElementKind::Tag,
        ElementKind::GlobalSet,
    ];
    for kind in kinds {
        registry.register_type(interface_name(kind), Arc::new(interface_descriptor(kind)))?;
    }
    registry.register_type(TIMESTAMP, Arc::new(timestamp_scalar()))?;
    registry.register_type(SECTION_INFO, Arc::new(section_info_object()))?;
    Ok(())
}
