//! Per-build type registry.
//!
//! - [`descriptor`] - Type descriptors and their conversion to dynamic types
//! - [`type_registry`] - Name to descriptor map with identity checks
//! - [`request`] - Everything one schema build needs: registry, snapshot
//!   and factory adapters

pub mod descriptor;
pub mod request;
pub mod type_registry;

pub use descriptor::{
    ArgumentDescriptor, BUILTIN_SCALARS, EnumDescriptor, FieldDescriptor, InterfaceDescriptor,
    ObjectDescriptor, Resolver, ScalarDescriptor, TypeDescriptor, TypeOrigin, named_type,
};
pub use request::SchemaRequest;
pub use type_registry::{TypeBuilder, TypeRegistry, is_valid_graphql_name};
