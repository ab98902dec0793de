//! Root element fields.

use async_graphql::Error;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext, ValueAccessor};
use contentql_core::{ContentDefinition, DefinitionId, ElementId, ElementKind, ElementQuery};
use tracing::{debug, trace};

use super::{content_context, element_values};
use crate::context::ContentContext;
use crate::error::GraphQLError;

fn invalid_argument(name: &str) -> Error {
    GraphQLError::QueryValidation(format!("Argument \"{name}\" must not be negative"))
        .into_field_error()
}

/// Filters read from the arguments of an element field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementArgs {
    pub limit: Option<usize>,
    pub offset: usize,
    pub ids: Vec<ElementId>,
    /// Owner ids selected through the category filter. `Some(empty)` means
    /// the filter was given but named nothing that exists.
    pub owners: Option<Vec<DefinitionId>>,
    pub entry_types: Option<Vec<DefinitionId>>,
    pub slug: Option<String>,
}

fn arg<'a>(ctx: &'a ResolverContext<'_>, name: &str) -> Option<ValueAccessor<'a>> {
    ctx.args.get(name).filter(|value| !value.is_null())
}

fn non_negative(ctx: &ResolverContext<'_>, name: &str) -> Result<Option<usize>, Error> {
    match arg(ctx, name) {
        Some(value) => {
            let n = value.i64()?;
            usize::try_from(n)
                .map(Some)
                .map_err(|_| invalid_argument(name))
        }
        None => Ok(None),
    }
}

/// Reads a list of handles (enum values or strings) and maps them to ids.
fn handle_filter<D: ContentDefinition>(
    ctx: &ResolverContext<'_>,
    name: &str,
    definitions: &[D],
) -> Result<Option<Vec<DefinitionId>>, Error> {
    let Some(value) = arg(ctx, name) else {
        return Ok(None);
    };
    let mut ids = Vec::new();
    for item in value.list()?.iter() {
        let handle = match item.enum_name() {
            Ok(handle) => handle,
            Err(_) => item.string()?,
        };
        if let Some(definition) = definitions.iter().find(|d| d.handle() == handle) {
            ids.push(definition.id());
        }
    }
    Ok(Some(ids))
}

impl ElementArgs {
    /// Reads the arguments of a field returning elements of `kind`.
    ///
    /// # Errors
    ///
    /// Fails on negative pagination values or malformed lists.
    pub fn from_resolver(
        ctx: &ResolverContext<'_>,
        context: &ContentContext,
        kind: ElementKind,
    ) -> Result<Self, Error> {
        let snapshot = &context.snapshot;
        let mut args = Self {
            limit: non_negative(ctx, "limit")?,
            offset: non_negative(ctx, "offset")?.unwrap_or(0),
            slug: arg(ctx, "slug").map(|v| v.string().map(str::to_string)).transpose()?,
            ..Self::default()
        };

        if let Some(value) = arg(ctx, "id") {
            let ids = match value.list() {
                Ok(list) => list
                    .iter()
                    .map(|item| item.i64())
                    .collect::<Result<Vec<_>, _>>()?,
                Err(_) => vec![value.i64()?],
            };
            args.ids = ids
                .into_iter()
                .map(|id| u64::try_from(id).map_err(|_| invalid_argument("id")))
                .collect::<Result<_, _>>()?;
        }

        match kind {
            ElementKind::Entry => {
                if let Some(ids) = handle_filter(ctx, "section", &snapshot.sections)? {
                    args.owners = Some(ids);
                }
                args.entry_types = handle_filter(ctx, "type", &snapshot.entry_types)?;
            }
            ElementKind::Asset => {
                if let Some(ids) = handle_filter(ctx, "volume", &snapshot.volumes)? {
                    args.owners = Some(ids);
                }
            }
            ElementKind::Category => {
                if let Some(ids) = handle_filter(ctx, "group", &snapshot.category_groups)? {
                    args.owners = Some(ids);
                }
            }
            ElementKind::Tag => {
                if let Some(ids) = handle_filter(ctx, "group", &snapshot.tag_groups)? {
                    args.owners = Some(ids);
                }
            }
            ElementKind::GlobalSet => {
                if let Some(ids) = handle_filter(ctx, "handle", &snapshot.global_sets)? {
                    args.owners = Some(ids);
                }
            }
        }
        Ok(args)
    }

    /// Builds the store query, or `None` if a filter rules out every element.
    #[must_use]
    pub fn into_query(self, kind: ElementKind) -> Option<ElementQuery> {
        if matches!(&self.owners, Some(owners) if owners.is_empty())
            || matches!(&self.entry_types, Some(types) if types.is_empty())
        {
            return None;
        }
        let mut query = ElementQuery::new(kind)
            .with_ids(self.ids)
            .with_owners(self.owners.unwrap_or_default())
            .with_entry_types(self.entry_types.unwrap_or_default())
            .with_offset(self.offset);
        if let Some(limit) = self.limit {
            query = query.with_limit(limit);
        }
        if let Some(slug) = self.slug {
            query = query.with_slug(slug);
        }
        Some(query)
    }
}

async fn fetch(
    ctx: &ResolverContext<'_>,
    context: &ContentContext,
    kind: ElementKind,
    single: bool,
) -> Result<Vec<contentql_core::Element>, Error> {
    let args = ElementArgs::from_resolver(ctx, context, kind)?;
    let Some(mut query) = args.into_query(kind) else {
        trace!(?kind, "Filters match nothing");
        return Ok(Vec::new());
    };
    if single {
        query = query.with_limit(1);
    }
    debug!(?kind, ?query, "Querying elements");
    context
        .store
        .query_elements(&query)
        .await
        .map_err(|e| Error::new(e.to_string()))
}

/// Resolves a list field such as `entries` or `tags`.
pub fn resolve_elements(ctx: ResolverContext<'_>, kind: ElementKind) -> FieldFuture<'_> {
    FieldFuture::new(async move {
        let context = content_context(&ctx)?;
        let elements = fetch(&ctx, context, kind, false).await?;
        Ok(Some(FieldValue::list(element_values(context, elements))))
    })
}

/// Resolves a single element field such as `entry`: the first match or null.
pub fn resolve_element(ctx: ResolverContext<'_>, kind: ElementKind) -> FieldFuture<'_> {
    FieldFuture::new(async move {
        let context = content_context(&ctx)?;
        let elements = fetch(&ctx, context, kind, true).await?;
        Ok(element_values(context, elements).into_iter().next())
    })
}
