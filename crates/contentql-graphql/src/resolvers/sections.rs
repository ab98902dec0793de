use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};

use super::content_context;
use crate::types::section_info::section_info_value;

/// Resolves `sections(handle: [SectionsEnum])` from the build's snapshot.
pub fn resolve_sections(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
    FieldFuture::new(async move {
        let context = content_context(&ctx)?;
        let handles: Option<Vec<String>> = match ctx.args.get("handle").filter(|v| !v.is_null()) {
            Some(value) => Some(
                value
                    .list()?
                    .iter()
                    .map(|item| item.enum_name().map(str::to_string))
                    .collect::<Result<_, _>>()?,
            ),
            None => None,
        };

        let snapshot = &context.snapshot;
        let values: Vec<FieldValue> = snapshot
            .sections
            .iter()
            .filter(|section| {
                handles
                    .as_ref()
                    .is_none_or(|handles| handles.contains(&section.handle))
            })
            .map(|section| FieldValue::value(section_info_value(section, snapshot)))
            .collect();
        Ok(Some(FieldValue::list(values)))
    })
}
