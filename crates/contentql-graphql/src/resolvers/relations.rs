//! Relation field resolver.

use async_graphql::Error;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use contentql_core::{Element, ElementKind};
use tracing::trace;

use super::{content_context, element_values, parent_element};

/// Resolves a relation field of the parent element.
///
/// Related ids are loaded through the per-request element loader, so sibling
/// elements asking for overlapping relations share one store round trip.
/// Related elements keep the order stored on the parent; missing ones and
/// ones of another kind are skipped.
pub fn resolve_relation(ctx: ResolverContext<'_>, handle: String, kind: ElementKind) -> FieldFuture<'_> {
    FieldFuture::new(async move {
        let element = parent_element(&ctx)?;
        let ids = element.related_ids(&handle);
        if ids.is_empty() {
            return Ok(Some(FieldValue::list(Vec::<FieldValue>::new())));
        }

        let context = content_context(&ctx)?;
        let loaded = context
            .loaders
            .elements
            .load_many(ids.iter().copied())
            .await
            .map_err(|e| Error::new(format!("Relation resolution failed: {e}")))?;

        let related: Vec<Element> = ids
            .iter()
            .filter_map(|id| loaded.get(id))
            .filter(|related| related.kind() == kind)
            .cloned()
            .collect();
        trace!(
            field = %handle,
            requested = ids.len(),
            resolved = related.len(),
            "Resolved relation"
        );
        Ok(Some(FieldValue::list(element_values(context, related))))
    })
}
