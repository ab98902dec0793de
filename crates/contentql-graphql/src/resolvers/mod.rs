//! Field resolvers.
//!
//! - `elements`: root list and single element fields (`entries`, `entry`, ...)
//! - `relations`: custom relation fields, batched through the element loader
//! - `sections`: the `sections` root field

mod elements;
mod relations;
mod sections;

pub use elements::{ElementArgs, resolve_element, resolve_elements};
pub use relations::resolve_relation;
pub use sections::resolve_sections;

use async_graphql::Error;
use async_graphql::dynamic::{FieldValue, ResolverContext};
use contentql_core::Element;
use tracing::warn;

use crate::context::ContentContext;

/// Helper to extract the content context from resolver context.
pub(crate) fn content_context<'a>(
    ctx: &'a ResolverContext<'_>,
) -> Result<&'a ContentContext, Error> {
    ctx.data::<ContentContext>()
        .map_err(|_| Error::new("Content context not available"))
}

/// Returns the element a field is being resolved on.
pub(crate) fn parent_element<'a>(ctx: &'a ResolverContext<'_>) -> Result<&'a Element, Error> {
    ctx.parent_value
        .try_downcast_ref::<Element>()
        .map_err(|_| Error::new("Parent value is not an element"))
}

/// Wraps elements as polymorphic field values, tagged with their concrete
/// type. Elements whose owner is not part of the schema are dropped.
pub(crate) fn element_values(
    context: &ContentContext,
    elements: Vec<Element>,
) -> Vec<FieldValue<'static>> {
    elements
        .into_iter()
        .filter_map(|element| match context.type_name_of(&element) {
            Some(type_name) => Some(FieldValue::owned_any(element).with_type(type_name)),
            None => {
                warn!(id = element.id, kind = ?element.kind(), "Element owner has no type");
                None
            }
        })
        .collect()
}
